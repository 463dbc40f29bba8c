//! Runtime data model for Scorpk programs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The type tag this value is representable as
    pub fn kind(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Text(_) => TypeTag::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Declared type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Int,
    String,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Int => f.write_str("int"),
            TypeTag::String => f.write_str("string"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "int" => Ok(TypeTag::Int),
            "string" => Ok(TypeTag::String),
            other => Err(format!("unknown type {other}")),
        }
    }
}

/// A variable binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Current value
    pub value: Value,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeTag,
    /// Set once by `lock(name);`, never cleared
    pub locked: bool,
}

/// A zero-argument function: its body lines, captured verbatim
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub body: Arc<[String]>,
}

/// One `estado` branch of an intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentState {
    pub name: String,
    pub actions: Vec<String>,
}

/// A named set of states, kept in declaration order
#[derive(Debug, Clone, Default)]
pub struct Intent {
    pub name: String,
    pub states: Vec<IntentState>,
}

impl Intent {
    /// Create an empty intent
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
        }
    }

    /// Add a state, replacing any earlier state with the same name in place
    pub fn insert_state(&mut self, state: IntentState) {
        match self.states.iter_mut().find(|s| s.name == state.name) {
            Some(existing) => *existing = state,
            None => self.states.push(state),
        }
    }

    /// Look up a state by name
    pub fn state(&self, name: &str) -> Option<&IntentState> {
        self.states.iter().find(|s| s.name == name)
    }
}
