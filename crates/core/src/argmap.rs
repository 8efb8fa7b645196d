// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamically-typed command argument container.
//!
//! Commands carry a wide, mostly-optional surface of arguments. Rather than
//! a struct per command kind, arguments live in a single string-keyed
//! container; each executor decodes only the keys it understands and
//! produces a structured [`ArgError`] on a missing or mistyped key instead
//! of panicking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Dynamically-typed, string-keyed argument map attached to a [`crate::Command`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgMap(pub HashMap<String, Value>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("missing required argument '{0}'")]
    Missing(String),
    #[error("argument '{key}' has the wrong type: expected {expected}, got {actual}")]
    WrongType { key: String, expected: &'static str, actual: &'static str },
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Result<&str, ArgError> {
        let v = self.0.get(key).ok_or_else(|| ArgError::Missing(key.to_string()))?;
        v.as_str().ok_or_else(|| ArgError::WrongType {
            key: key.to_string(),
            expected: "string",
            actual: kind_name(v),
        })
    }

    pub fn get_str_opt(&self, key: &str) -> Result<Option<&str>, ArgError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_str().map(Some).ok_or_else(|| ArgError::WrongType {
                key: key.to_string(),
                expected: "string",
                actual: kind_name(v),
            }),
        }
    }

    /// Accepts a JSON integer or a JSON number that coerces losslessly to i64
    /// (spec §4.F: exposure container ports arrive as either shape).
    pub fn get_i64(&self, key: &str) -> Result<i64, ArgError> {
        let v = self.0.get(key).ok_or_else(|| ArgError::Missing(key.to_string()))?;
        v.as_i64().or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)).ok_or_else(
            || ArgError::WrongType { key: key.to_string(), expected: "integer", actual: kind_name(v) },
        )
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ArgError> {
        let v = self.0.get(key).ok_or_else(|| ArgError::Missing(key.to_string()))?;
        v.as_bool().ok_or_else(|| ArgError::WrongType {
            key: key.to_string(),
            expected: "bool",
            actual: kind_name(v),
        })
    }

    pub fn get_bool_opt(&self, key: &str, default: bool) -> Result<bool, ArgError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(_) => self.get_bool(key),
        }
    }

    pub fn get_object(&self, key: &str) -> Result<&serde_json::Map<String, Value>, ArgError> {
        let v = self.0.get(key).ok_or_else(|| ArgError::Missing(key.to_string()))?;
        v.as_object().ok_or_else(|| ArgError::WrongType {
            key: key.to_string(),
            expected: "object",
            actual: kind_name(v),
        })
    }

    pub fn get_str_vec(&self, key: &str) -> Result<Vec<String>, ArgError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => {
                let arr = v.as_array().ok_or_else(|| ArgError::WrongType {
                    key: key.to_string(),
                    expected: "array",
                    actual: kind_name(v),
                })?;
                arr.iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| ArgError::WrongType {
                            key: key.to_string(),
                            expected: "array of strings",
                            actual: kind_name(item),
                        })
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> ArgMap {
        let mut m = ArgMap::new();
        for (k, v) in pairs {
            m.insert(*k, v.clone());
        }
        m
    }

    #[test]
    fn get_str_missing_is_structured_error() {
        let m = ArgMap::new();
        assert_eq!(m.get_str("id"), Err(ArgError::Missing("id".into())));
    }

    #[test]
    fn get_str_wrong_type_names_both_sides() {
        let m = map(&[("id", Value::from(5))]);
        assert_eq!(
            m.get_str("id"),
            Err(ArgError::WrongType { key: "id".into(), expected: "string", actual: "number" })
        );
    }

    #[test]
    fn get_i64_accepts_coercible_float() {
        let m = map(&[("port", Value::from(8080.0))]);
        assert_eq!(m.get_i64("port"), Ok(8080));
    }

    #[test]
    fn get_i64_rejects_fractional_float() {
        let m = map(&[("port", Value::from(8080.5))]);
        assert!(m.get_i64("port").is_err());
    }

    #[test]
    fn get_str_vec_defaults_to_empty_when_absent() {
        let m = ArgMap::new();
        assert_eq!(m.get_str_vec("tags"), Ok(Vec::new()));
    }

    #[test]
    fn get_bool_opt_returns_default_when_absent() {
        let m = ArgMap::new();
        assert_eq!(m.get_bool_opt("flag", true), Ok(true));
    }
}
