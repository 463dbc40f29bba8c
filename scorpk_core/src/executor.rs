//! Statement evaluator for Scorpk programs
//!
//! One engine drives every nesting level: the top-level program, function
//! bodies, intent state actions and the bodies of conditionals and loops are
//! all executed by [`Interpreter::execute_lines`]. Block bodies are captured as
//! text and only classified when they run.

use crate::block::{
    dedent, indent_of, is_else_header, scan_block, scan_block_until, CLOSE, CLOSE_ELSE,
};
use crate::config::InterpreterConfig;
use crate::context::ExecutionContext;
use crate::error::{Result, ScorpkError};
use crate::expr::{evaluate_condition, evaluate_expression};
use crate::grammar::{classify, Condition, Grammar, Statement};
use crate::loader::{is_skipped, Program};
use crate::output::OutputSink;
use crate::types::{Intent, IntentState, TypeTag, Value, Variable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Summary of one program run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Statements dispatched, at every nesting level
    pub statements: usize,
    /// Error lines reported
    pub errors: usize,
    /// Run duration in milliseconds
    pub duration_ms: f64,
}

/// Evaluates Scorpk statements against a shared execution context
pub struct Interpreter {
    context: ExecutionContext,
    sink: Arc<dyn OutputSink>,
    config: InterpreterConfig,
    statements: AtomicUsize,
    errors: AtomicUsize,
}

impl Interpreter {
    /// Create an interpreter with default configuration
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self::with_config(InterpreterConfig::default(), sink)
    }

    /// Create an interpreter with the given configuration
    pub fn with_config(config: InterpreterConfig, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            context: ExecutionContext::new(),
            sink,
            config,
            statements: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }

    /// The shared execution context
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run a whole program once
    pub fn run(&self, program: &Program) -> RunSummary {
        let start = std::time::Instant::now();
        let statements_before = self.statements.load(Ordering::Relaxed);
        let errors_before = self.errors.load(Ordering::Relaxed);

        self.execute_lines(program.lines());

        let summary = RunSummary {
            statements: self.statements.load(Ordering::Relaxed) - statements_before,
            errors: self.errors.load(Ordering::Relaxed) - errors_before,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!(
            "Run finished: {} statements, {} errors in {:.3}ms",
            summary.statements,
            summary.errors,
            summary.duration_ms
        );
        summary
    }

    /// Drive a line sequence from start to end
    pub fn execute_lines(&self, lines: &[String]) {
        let mut i = 0;
        while i < lines.len() {
            if is_skipped(&lines[i]) {
                i += 1;
                continue;
            }
            i = self.execute_line(lines, i);
        }
    }

    /// Classify and evaluate the line at `index`, returning where to resume
    ///
    /// Errors are reported here and never propagate. An incomplete block
    /// resumes at end of input.
    pub fn execute_line(&self, lines: &[String], index: usize) -> usize {
        let line = lines[index].trim();
        self.statements.fetch_add(1, Ordering::Relaxed);

        let Some(stmt) = classify(line) else {
            self.report(&ScorpkError::UnrecognizedStatement(line.to_string()));
            return index + 1;
        };

        tracing::debug!("Executing {} at line {}: {}", stmt.kind(), index + 1, line);
        match self.dispatch(stmt, lines, index) {
            Ok(next) => next,
            Err(err @ ScorpkError::IncompleteBlock(_)) => {
                self.report(&err);
                lines.len()
            }
            Err(err) => {
                self.report(&err);
                index + 1
            }
        }
    }

    fn dispatch(&self, stmt: Statement, lines: &[String], index: usize) -> Result<usize> {
        let header = &lines[index];
        let next = index + 1;

        match stmt {
            Statement::TypedDeclaration { name, ty, literal } => {
                self.declare(&name, &literal, Some(ty))?;
                Ok(next)
            }
            Statement::Declaration { name, literal } => {
                self.declare(&name, &literal, None)?;
                Ok(next)
            }
            Statement::Coercion { name, ty } => {
                self.coerce(&name, ty)?;
                Ok(next)
            }
            Statement::Assignment { name, expr } => {
                self.assign(&name, &expr)?;
                Ok(next)
            }
            Statement::Lock { name } => {
                self.context.lock(&name)?;
                Ok(next)
            }
            Statement::FunctionHeader { name } => {
                let block = scan_block(lines, next, header)?;
                self.context.declare_function(&name, block.body);
                Ok(block.next)
            }
            Statement::IntentHeader { name } => {
                let block = scan_block(lines, next, header)?;
                self.context.declare_intent(build_intent(&name, &block.body));
                Ok(block.next)
            }
            Statement::Activation { intent, state } => {
                self.activate(&intent, &state)?;
                Ok(next)
            }
            Statement::InlineIf { cond, action } => {
                if evaluate_condition(&cond, &self.context)? {
                    self.inline_action(&action)?;
                }
                Ok(next)
            }
            Statement::IfHeader { cond } => self.if_block(&cond, lines, index),
            Statement::WhileHeader { cond } => {
                let block = scan_block(lines, next, header)?;
                self.while_loop(&cond, &block.body);
                Ok(block.next)
            }
            Statement::ForHeader { var, start, end } => {
                let block = scan_block(lines, next, header)?;
                self.for_loop(&var, start, end, &block.body);
                Ok(block.next)
            }
            Statement::ParallelHeader => {
                let block = scan_block(lines, next, header)?;
                self.run_parallel(&block.body);
                Ok(block.next)
            }
            Statement::Call { name } => {
                self.call_function(&name)?;
                Ok(next)
            }
            Statement::Print { argument } => {
                self.print(&argument);
                Ok(next)
            }
        }
    }

    /// Emit one transcript line
    pub(crate) fn emit(&self, line: &str) {
        self.sink.emit(line);
    }

    /// Report an error to the transcript and absorb it
    pub(crate) fn report(&self, err: &ScorpkError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{}", err);
        self.sink.emit(&format!("{}{}", self.config.error_prefix, err));
    }

    fn declare(&self, name: &str, literal: &str, declared: Option<TypeTag>) -> Result<()> {
        if self.context.is_locked(name) {
            return Err(ScorpkError::LockedVariable(name.to_string()));
        }
        let (value, ty) = match (parse_literal(literal), declared) {
            (Ok(parsed), _) => parsed,
            // A typed declaration names what it expected, so an unreadable
            // literal is a mismatch rather than an unsupported literal.
            (Err(_), Some(expected)) => {
                return Err(ScorpkError::TypeMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    actual: literal.trim().to_string(),
                })
            }
            (Err(err), None) => return Err(err),
        };
        if let Some(expected) = declared {
            if expected != ty {
                return Err(ScorpkError::TypeMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    actual: ty.to_string(),
                });
            }
        }
        self.context.redeclare_variable(name, value, ty)
    }

    fn coerce(&self, name: &str, target: TypeTag) -> Result<()> {
        self.context.modify_variable(name, |var| {
            let actual = var.value.kind();
            if actual != target {
                return Err(ScorpkError::IncompatibleCoercion {
                    name: name.to_string(),
                    target: target.to_string(),
                    actual: actual.to_string(),
                });
            }
            Ok(Variable {
                ty: target,
                ..var.clone()
            })
        })
    }

    fn assign(&self, name: &str, expr: &str) -> Result<()> {
        self.context.read_variable_type(name)?;
        if self.context.is_locked(name) {
            return Err(ScorpkError::LockedVariable(name.to_string()));
        }
        let value = evaluate_expression(expr, &self.context)?;

        self.context.modify_variable(name, |var| {
            if var.ty == TypeTag::Int && value.kind() != TypeTag::Int {
                return Err(ScorpkError::TypeMismatch {
                    name: name.to_string(),
                    expected: TypeTag::Int.to_string(),
                    actual: value.kind().to_string(),
                });
            }
            Ok(Variable {
                value: value.clone(),
                ..var.clone()
            })
        })
    }

    /// Execute one state of an intent
    pub fn activate(&self, intent: &str, state: &str) -> Result<()> {
        let found = self.context.intent_state(intent, state)?;
        if self.config.announce_states {
            self.emit(&format!("Entering state {} of intent {}", state, intent));
        }
        self.execute_lines(&found.actions);
        Ok(())
    }

    /// Invoke a zero-argument function
    pub fn call_function(&self, name: &str) -> Result<()> {
        let function = self.context.function(name)?;
        tracing::debug!("Calling {} ({} lines)", name, function.body.len());
        self.execute_lines(&function.body);
        Ok(())
    }

    /// Print a quoted literal, a variable's value, or the argument text itself
    pub fn print(&self, argument: &str) {
        let text = match unquote(argument) {
            Some(inner) => inner.to_string(),
            None => match self.context.read_variable(argument) {
                Ok(value) => value.to_string(),
                Err(_) => argument.to_string(),
            },
        };
        self.emit(&text);
    }

    // Activation and call actions are dispatched directly; anything else goes
    // through the generic statement path.
    fn inline_action(&self, action: &str) -> Result<()> {
        match classify(action) {
            Some(Statement::Activation { intent, state }) => self.activate(&intent, &state),
            Some(Statement::Call { name }) => self.call_function(&name),
            _ => {
                self.execute_line(&[action.to_string()], 0);
                Ok(())
            }
        }
    }

    fn if_block(&self, cond: &Condition, lines: &[String], index: usize) -> Result<usize> {
        let header = &lines[index];
        let then_block = scan_block_until(lines, index + 1, header, &[CLOSE, CLOSE_ELSE])?;

        let (else_body, next) = if then_block.closed_by == CLOSE_ELSE {
            let else_header = &lines[then_block.next - 1];
            let block = scan_block(lines, then_block.next, else_header)?;
            (block.body, block.next)
        } else if lines
            .get(then_block.next)
            .is_some_and(|l| is_else_header(l, indent_of(header)))
        {
            let else_header = &lines[then_block.next];
            let block = scan_block(lines, then_block.next + 1, else_header)?;
            (block.body, block.next)
        } else {
            (Vec::new(), then_block.next)
        };

        match evaluate_condition(cond, &self.context) {
            Ok(true) => self.execute_lines(&then_block.body),
            Ok(false) => self.execute_lines(&else_body),
            Err(err) => self.report(&err),
        }
        Ok(next)
    }

    // No iteration cap: an always-true guard loops forever.
    fn while_loop(&self, cond: &Condition, body: &[String]) {
        loop {
            match evaluate_condition(cond, &self.context) {
                Ok(true) => self.execute_lines(body),
                Ok(false) => break,
                Err(err) => {
                    self.report(&err);
                    break;
                }
            }
        }
    }

    fn for_loop(&self, var: &str, start: i64, end: i64, body: &[String]) {
        for i in start..=end {
            if let Err(err) = self
                .context
                .redeclare_variable(var, Value::Int(i), TypeTag::Int)
            {
                self.report(&err);
                break;
            }
            self.execute_lines(body);
        }
    }
}

/// Strip a matching pair of `"` or `'` quotes
pub fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].iter().find_map(|&q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

/// Infer value and type of a declaration literal: all digits is `int`, a
/// quoted literal is `string`
pub fn parse_literal(literal: &str) -> Result<(Value, TypeTag)> {
    let literal = literal.trim();
    if !literal.is_empty() && literal.bytes().all(|b| b.is_ascii_digit()) {
        return literal
            .parse()
            .map(|n| (Value::Int(n), TypeTag::Int))
            .map_err(|_| ScorpkError::UnsupportedLiteral(literal.to_string()));
    }
    match unquote(literal) {
        Some(inner) => Ok((Value::Text(inner.to_string()), TypeTag::String)),
        None => Err(ScorpkError::UnsupportedLiteral(literal.to_string())),
    }
}

/// Group intent body lines under their `estado <name>:` headers
///
/// Each state's actions are dedented together so a block inside an action
/// list keeps its closer at the same column as its header.
fn build_intent(name: &str, body: &[String]) -> Intent {
    let grammar = Grammar::get();
    let mut intent = Intent::new(name);
    let mut current: Option<IntentState> = None;

    let finish = |intent: &mut Intent, state: IntentState| {
        intent.insert_state(IntentState {
            actions: dedent(&state.actions),
            ..state
        });
    };

    for line in body {
        if let Some(state) = grammar.state_header(line) {
            if let Some(done) = current.take() {
                finish(&mut intent, done);
            }
            current = Some(IntentState {
                name: state,
                actions: Vec::new(),
            });
        } else if is_skipped(line) {
            continue;
        } else if let Some(state) = current.as_mut() {
            state.actions.push(line.clone());
        } else {
            tracing::debug!("Ignoring line outside any estado in intent {}: {}", name, line.trim());
        }
    }
    if let Some(done) = current {
        finish(&mut intent, done);
    }

    tracing::debug!("Registered intent {} with {} states", name, intent.states.len());
    intent
}
