//! Typed command arguments.
//!
//! The command parser hands every shim an [`Args`] map. Lookups come in three
//! flavours: required (`get_*`, an error when absent), optional with default
//! (`try_*` taking a default) and optional-nullable (`try_str`).

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A single parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// String argument.
    Str(String),
    /// Integer argument.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
}

/// Option name to value mapping for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    map: BTreeMap<String, ArgValue>,
}

impl Args {
    /// An empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string argument.
    #[must_use]
    pub fn with_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ArgValue::Str(value.into()));
        self
    }

    /// Add an integer argument.
    #[must_use]
    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, ArgValue::Int(value));
        self
    }

    /// Add a boolean argument.
    #[must_use]
    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, ArgValue::Bool(value));
        self
    }

    /// Insert or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.map.insert(name.into(), value);
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.map.get(name)
    }

    /// Required string argument.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        match self.map.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            Some(_) => Err(wrong_type(name, "a string")),
            None => Err(Error::missing(name)),
        }
    }

    /// Optional string argument; `None` when absent or not a string.
    #[must_use]
    pub fn try_str(&self, name: &str) -> Option<&str> {
        match self.map.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Required integer argument.
    pub fn get_int(&self, name: &str) -> Result<i64> {
        match self.map.get(name) {
            Some(ArgValue::Int(v)) => Ok(*v),
            Some(_) => Err(wrong_type(name, "an integer")),
            None => Err(Error::missing(name)),
        }
    }

    /// Optional integer argument.
    #[must_use]
    pub fn try_int(&self, name: &str) -> Option<i64> {
        match self.map.get(name) {
            Some(ArgValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Optional boolean argument with a default.
    #[must_use]
    pub fn try_bool(&self, name: &str, default: bool) -> bool {
        match self.map.get(name) {
            Some(ArgValue::Bool(v)) => *v,
            _ => default,
        }
    }
}

fn wrong_type(name: &str, expected: &'static str) -> Error {
    Error::InvalidArgumentType {
        name: name.to_string(),
        expected,
    }
}
