//! Scorpk Core
//!
//! Statement recognizer and block evaluator for the Scorpk scripting
//! language: typed and lockable variables, zero-argument functions,
//! intents with named states, conditionals, loops and fork-join
//! `paralelo` blocks.

pub mod block;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod expr;
pub mod grammar;
pub mod loader;
pub mod output;
pub mod parallel;
pub mod types;

pub use config::InterpreterConfig;
pub use context::{ContextSnapshot, ExecutionContext};
pub use error::{Result, ScorpkError};
pub use executor::{Interpreter, RunSummary};
pub use grammar::{classify, Statement};
pub use loader::{Program, ScriptLoader};
pub use output::{BufferSink, OutputSink, StdoutSink};
pub use types::{TypeTag, Value};
