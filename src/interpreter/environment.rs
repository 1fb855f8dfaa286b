// File: src/interpreter/environment.rs
//
// Flat symbol table for the DCL interpreter.
// DCL has a single global scope: every identifier maps to a number,
// later writes replace earlier ones and nothing is ever removed.

use crate::errors::{LangError, SourceLocation};
use ahash::AHashMap;

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    values: AHashMap<String, f64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Like `get`, but an unbound name is an error
    pub fn lookup(&self, name: &str, location: &SourceLocation) -> Result<f64, LangError> {
        self.get(name)
            .ok_or_else(|| LangError::unbound_identifier(name, &self.names(), location.clone()))
    }

    pub fn set(&mut self, name: &str, value: f64) {
        // Avoid reallocating the key on rebinding
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
