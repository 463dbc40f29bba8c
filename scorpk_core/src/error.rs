//! Error types for Scorpk Core

use thiserror::Error;

/// Result type for Scorpk operations
pub type Result<T> = std::result::Result<T, ScorpkError>;

/// Errors that can occur while loading or evaluating a Scorpk program
#[derive(Error, Debug)]
pub enum ScorpkError {
    /// Variable read before any declaration
    #[error("Variable {0} is not defined")]
    UndefinedVariable(String),

    /// Call to a function that was never declared
    #[error("Function {0} is not defined")]
    UndefinedFunction(String),

    /// Activation of an unknown intent
    #[error("Intent {0} is not defined")]
    UndefinedIntent(String),

    /// Activation of a known intent with an unknown state
    #[error("State {state} is not defined in intent {intent}")]
    UndefinedState { intent: String, state: String },

    /// Mutation attempt on a locked variable
    #[error("Cannot modify {0}, it is locked")]
    LockedVariable(String),

    /// Value or variable of the wrong type
    #[error("Type mismatch for {name}: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Literal that is neither all digits nor quote-delimited
    #[error("Unsupported literal: {0}")]
    UnsupportedLiteral(String),

    /// Coercion whose target does not match the runtime value
    #[error("Cannot coerce {name} to {target}: current value is {actual}")]
    IncompatibleCoercion {
        name: String,
        target: String,
        actual: String,
    },

    /// Right-hand side outside the `identifier op integer` grammar
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Block header without a closing delimiter before end of input
    #[error("Incomplete block: {0}")]
    IncompleteBlock(String),

    /// Line matching none of the statement shapes
    #[error("Unrecognized line: {0}")]
    UnrecognizedStatement(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
