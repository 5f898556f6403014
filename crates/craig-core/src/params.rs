//! Solver parameter bag
//!
//! Parameters are forwarded untouched from callers to the prover. Keys are
//! case-sensitive strings; values are Booleans, unsigned integers or
//! strings.

use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Bool(bool),
    UInt(u64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::UInt(n) => write!(f, "{n}"),
            ParamValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Ordered parameter set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.values.insert(key.into(), ParamValue::Bool(value));
        self
    }

    pub fn set_uint(&mut self, key: impl Into<String>, value: u64) -> &mut Self {
        self.values.insert(key.into(), ParamValue::UInt(value));
        self
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), ParamValue::Str(value.into()));
        self
    }

    /// Builder-style variant of [`Params::set_bool`]
    pub fn with_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set_bool(key, value);
        self
    }

    /// Builder-style variant of [`Params::set_uint`]
    pub fn with_uint(mut self, key: impl Into<String>, value: u64) -> Self {
        self.set_uint(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ParamValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_uint(&self, key: &str) -> Option<u64> {
        match self.values.get(key) {
            Some(ParamValue::UInt(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ParamValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of `self` with every entry of `other` layered on top
    pub fn merged(&self, other: &Params) -> Params {
        let mut values = self.values.clone();
        for (k, v) in &other.values {
            values.insert(k.clone(), v.clone());
        }
        Params { values }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(params")?;
        for (k, v) in &self.values {
            write!(f, " :{k} {v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut p = Params::new();
        p.set_bool("incremental", true)
            .set_uint("timeout", 500)
            .set_str("engine", "fm");
        assert_eq!(p.get_bool("incremental"), Some(true));
        assert_eq!(p.get_uint("timeout"), Some(500));
        assert_eq!(p.get_str("engine"), Some("fm"));
        // Wrong type reads as absent
        assert_eq!(p.get_uint("incremental"), None);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn test_merged_overrides() {
        let base = Params::new().with_uint("timeout", 10).with_bool("incremental", false);
        let over = Params::new().with_bool("incremental", true);
        let merged = base.merged(&over);
        assert_eq!(merged.get_bool("incremental"), Some(true));
        assert_eq!(merged.get_uint("timeout"), Some(10));
        assert_eq!(merged.to_string(), "(params :incremental true :timeout 10)");
    }
}
