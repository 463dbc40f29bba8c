//! Parallel task runner for `paralelo { ... }` blocks
//!
//! Each call or print line becomes one thread. All threads start in textual
//! order and the block returns only after every one has finished. Tasks share
//! the interpreter's context; an error inside a task is reported by that task
//! and does not affect its siblings.

use crate::executor::Interpreter;
use crate::grammar::{classify, Statement};
use crate::loader::is_skipped;
use std::thread;

/// One unit of concurrent work, owning its own line data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// `name();`
    Call(String),
    /// `print(argument);`
    Print(String),
}

/// Turn block lines into tasks; lines that are neither calls nor prints are
/// not tasks and are dropped
pub fn collect_tasks(body: &[String]) -> Vec<Task> {
    body.iter()
        .filter(|line| !is_skipped(line))
        .filter_map(|line| match classify(line) {
            Some(Statement::Call { name }) => Some(Task::Call(name)),
            Some(Statement::Print { argument }) => Some(Task::Print(argument)),
            _ => {
                tracing::debug!("Not a parallel task: {}", line.trim());
                None
            }
        })
        .collect()
}

impl Interpreter {
    /// Run a parallel block body and wait for every task
    pub fn run_parallel(&self, body: &[String]) {
        let tasks = collect_tasks(body);
        tracing::debug!("Spawning {} parallel tasks", tasks.len());

        thread::scope(|scope| {
            let handles: Vec<_> = tasks
                .into_iter()
                .map(|task| scope.spawn(move || self.run_task(task)))
                .collect();

            for handle in handles {
                if handle.join().is_err() {
                    tracing::error!("Parallel task panicked");
                }
            }
        });

        tracing::debug!("Parallel block joined");
    }

    fn run_task(&self, task: Task) {
        match task {
            Task::Call(name) => {
                if let Err(err) = self.call_function(&name) {
                    self.report(&err);
                }
            }
            Task::Print(argument) => self.print(&argument),
        }
    }
}
