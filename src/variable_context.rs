//! Design-variable resolution cache
//!
//! Paints in a source tree can be bound to design variables (colour tokens).
//! The cache maps a variable reference to the literal CSS value it stands for.
//! Normalizers consult it read-only; it is populated by whoever loads the tree.

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;

/// Read-only lookup from a variable reference to its literal value
pub trait VariableResolver {
    fn resolve(&self, reference: &str) -> Option<&str>;
}

/// Resolver that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _reference: &str) -> Option<&str> {
        None
    }
}

impl VariableResolver for HashMap<String, String> {
    fn resolve(&self, reference: &str) -> Option<&str> {
        self.get(reference).map(String::as_str)
    }
}

/// A cached variable with its human name
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub id: String,
    pub name: Option<String>,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Literal(String),
    Named { name: Option<String>, value: String },
}

/// Variable cache keyed by variable id
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    variables: HashMap<String, VariableEntry>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) -> Option<VariableEntry> {
        let id = id.into();
        self.insert_entry(VariableEntry {
            id,
            name: None,
            value: value.into(),
        })
    }

    /// Add or replace a variable, returning the entry it replaced
    pub fn insert_entry(&mut self, entry: VariableEntry) -> Option<VariableEntry> {
        let previous = self.variables.insert(entry.id.clone(), entry);
        if let Some(old) = &previous {
            log::debug!("Variable '{}' redefined, using latest value", old.id);
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&VariableEntry> {
        self.variables.get(id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Load from a JSON object whose values are either literal strings or
    /// `{ "name": ..., "value": ... }` records.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, RawEntry> = serde_json::from_str(json)?;
        let mut context = Self::new();
        for (id, entry) in raw {
            let (name, value) = match entry {
                RawEntry::Literal(value) => (None, value),
                RawEntry::Named { name, value } => (name, value),
            };
            context.insert_entry(VariableEntry { id, name, value });
        }
        Ok(context)
    }
}

impl VariableResolver for VariableContext {
    fn resolve(&self, reference: &str) -> Option<&str> {
        self.variables.get(reference).map(|entry| entry.value.as_str())
    }
}
