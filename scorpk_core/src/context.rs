//! Execution context: variable store, function table and intent table
//!
//! One context lives for the whole run and is shared by every nesting level
//! and every parallel task. Each table sits behind its own `RwLock`, held only
//! for the duration of a single table operation, so concurrent tasks interleave
//! at statement granularity. Two tasks writing the same variable still race;
//! the last write wins.

use crate::error::{Result, ScorpkError};
use crate::types::{Function, Intent, IntentState, TypeTag, Value, Variable};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared state of a running program
#[derive(Default)]
pub struct ExecutionContext {
    variables: RwLock<HashMap<String, Variable>>,
    functions: RwLock<HashMap<String, Function>>,
    intents: RwLock<HashMap<String, Intent>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl ExecutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a variable. Does not consult the lock flag.
    pub fn declare_variable(&self, name: &str, value: Value, ty: TypeTag, locked: bool) {
        write(&self.variables).insert(name.to_string(), Variable { value, ty, locked });
    }

    /// Create or replace a variable unless an existing binding is locked
    pub fn redeclare_variable(&self, name: &str, value: Value, ty: TypeTag) -> Result<()> {
        let mut variables = write(&self.variables);
        if variables.get(name).is_some_and(|v| v.locked) {
            return Err(ScorpkError::LockedVariable(name.to_string()));
        }
        variables.insert(
            name.to_string(),
            Variable {
                value,
                ty,
                locked: false,
            },
        );
        Ok(())
    }

    /// Mutate an existing, unlocked variable in place
    ///
    /// The closure runs under the store's write lock; if it fails the binding
    /// is left exactly as it was.
    pub fn modify_variable<F>(&self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&Variable) -> Result<Variable>,
    {
        let mut variables = write(&self.variables);
        let var = variables
            .get_mut(name)
            .ok_or_else(|| ScorpkError::UndefinedVariable(name.to_string()))?;
        if var.locked {
            return Err(ScorpkError::LockedVariable(name.to_string()));
        }
        *var = f(var)?;
        Ok(())
    }

    /// Get a full copy of a variable binding
    pub fn variable(&self, name: &str) -> Option<Variable> {
        read(&self.variables).get(name).cloned()
    }

    /// Read a variable's current value
    pub fn read_variable(&self, name: &str) -> Result<Value> {
        read(&self.variables)
            .get(name)
            .map(|v| v.value.clone())
            .ok_or_else(|| ScorpkError::UndefinedVariable(name.to_string()))
    }

    /// Read a variable's declared type
    pub fn read_variable_type(&self, name: &str) -> Result<TypeTag> {
        read(&self.variables)
            .get(name)
            .map(|v| v.ty)
            .ok_or_else(|| ScorpkError::UndefinedVariable(name.to_string()))
    }

    /// Whether the variable exists and is locked
    pub fn is_locked(&self, name: &str) -> bool {
        read(&self.variables).get(name).is_some_and(|v| v.locked)
    }

    /// Set the immutability flag
    pub fn lock(&self, name: &str) -> Result<()> {
        write(&self.variables)
            .get_mut(name)
            .map(|v| v.locked = true)
            .ok_or_else(|| ScorpkError::UndefinedVariable(name.to_string()))
    }

    /// Register a function, replacing any previous body under the same name
    pub fn declare_function(&self, name: &str, body: Vec<String>) {
        let function = Function {
            name: name.to_string(),
            body: body.into(),
        };
        write(&self.functions).insert(name.to_string(), function);
    }

    /// Resolve a function for invocation
    pub fn function(&self, name: &str) -> Result<Function> {
        read(&self.functions)
            .get(name)
            .cloned()
            .ok_or_else(|| ScorpkError::UndefinedFunction(name.to_string()))
    }

    /// Register an intent, replacing any previous one under the same name
    pub fn declare_intent(&self, intent: Intent) {
        write(&self.intents).insert(intent.name.clone(), intent);
    }

    /// Look up all states of an intent
    pub fn intent(&self, name: &str) -> Result<Intent> {
        read(&self.intents)
            .get(name)
            .cloned()
            .ok_or_else(|| ScorpkError::UndefinedIntent(name.to_string()))
    }

    /// Look up one state of an intent
    pub fn intent_state(&self, intent: &str, state: &str) -> Result<IntentState> {
        let intents = read(&self.intents);
        let found = intents
            .get(intent)
            .ok_or_else(|| ScorpkError::UndefinedIntent(intent.to_string()))?;
        found
            .state(state)
            .cloned()
            .ok_or_else(|| ScorpkError::UndefinedState {
                intent: intent.to_string(),
                state: state.to_string(),
            })
    }

    /// Take a sorted, serializable copy of all three tables
    pub fn snapshot(&self) -> ContextSnapshot {
        let variables = read(&self.variables)
            .iter()
            .map(|(name, var)| (name.clone(), var.clone()))
            .collect();
        let functions = read(&self.functions)
            .values()
            .map(|f| (f.name.clone(), f.body.len()))
            .collect();
        let intents = read(&self.intents)
            .values()
            .map(|i| {
                let states = i.states.iter().map(|s| s.name.clone()).collect();
                (i.name.clone(), states)
            })
            .collect();

        ContextSnapshot {
            variables,
            functions,
            intents,
        }
    }
}

/// Point-in-time view of an execution context
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    /// Variable bindings by name
    pub variables: BTreeMap<String, Variable>,
    /// Function names with the number of body lines
    pub functions: BTreeMap<String, usize>,
    /// Intent names with their state names in declaration order
    pub intents: BTreeMap<String, Vec<String>>,
}
