//! Per-call sequence options.
//!
//! Options arrive as a flat mapping (typically straight out of a migration
//! file), so [`SequenceOptions`] deserializes leniently: aliases are
//! accepted, unknown keys are ignored, and the exists flags treat any
//! non-boolean value as "not given".

use crate::error::SequenceResult;
use serde::{Deserialize, Deserializer, Serialize};

pub const IF_EXISTS: &str = "IF EXISTS";
pub const IF_NOT_EXISTS: &str = "IF NOT EXISTS";

/// Default `start` value.
pub const DEFAULT_START: i64 = 1;
/// Default `increment`/`step`.
pub const DEFAULT_INCREMENT: i64 = 1;
/// Default `numeric_label`, the value stored in the `fiction` column.
pub const DEFAULT_LABEL: i64 = 0;

/// Maps an exists flag to its DDL guard clause.
///
/// `Some(true)` → `IF EXISTS`, `Some(false)` → `IF NOT EXISTS`, anything
/// else (no flag, or a non-boolean value in the raw options) → `None`.
pub fn build_exists_condition(flag: Option<bool>) -> Option<&'static str> {
    match flag {
        Some(true) => Some(IF_EXISTS),
        Some(false) => Some(IF_NOT_EXISTS),
        None => None,
    }
}

/// Recognised sequence options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    /// Initial value (default 1)
    pub start: Option<i64>,
    /// Step between values (alias `step`, default 1)
    #[serde(alias = "step")]
    pub increment: Option<i64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub if_exists: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    pub if_not_exists: Option<bool>,
    /// Label written to the `fiction` column by emulated backends (alias `num_label`)
    #[serde(alias = "num_label")]
    pub numeric_label: Option<i64>,
    pub minvalue: Option<i64>,
    pub maxvalue: Option<i64>,
    pub cache: Option<i64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub cycle: Option<bool>,
    /// `table.column` owning the sequence (PostgreSQL)
    pub owned_by: Option<String>,
    /// `AS <data_type>` (e.g. `bigint`)
    pub data_type: Option<String>,
}

impl SequenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of options.
    pub fn from_json(value: serde_json::Value) -> SequenceResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_increment(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn with_if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = Some(if_exists);
        self
    }

    pub fn with_if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = Some(if_not_exists);
        self
    }

    pub fn with_numeric_label(mut self, label: i64) -> Self {
        self.numeric_label = Some(label);
        self
    }

    pub fn with_minvalue(mut self, minvalue: i64) -> Self {
        self.minvalue = Some(minvalue);
        self
    }

    pub fn with_maxvalue(mut self, maxvalue: i64) -> Self {
        self.maxvalue = Some(maxvalue);
        self
    }

    pub fn with_cache(mut self, cache: i64) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cycle(mut self, cycle: bool) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn with_owned_by(mut self, owned_by: impl Into<String>) -> Self {
        self.owned_by = Some(owned_by.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn start_value(&self) -> i64 {
        self.start.unwrap_or(DEFAULT_START)
    }

    pub fn increment_value(&self) -> i64 {
        self.increment.unwrap_or(DEFAULT_INCREMENT)
    }

    pub fn label(&self) -> i64 {
        self.numeric_label.unwrap_or(DEFAULT_LABEL)
    }

    /// The effective exists flag; `if_exists` wins over `if_not_exists`.
    pub fn exists_flag(&self) -> Option<bool> {
        self.if_exists.or(self.if_not_exists.map(|v| !v))
    }

    /// Guard for a CREATE statement.
    ///
    /// Any explicit flag asks for a guarded create (`IF EXISTS` is not valid
    /// on CREATE); without one the backend default decides.
    pub fn create_guard(&self, guard_by_default: bool) -> Option<&'static str> {
        match build_exists_condition(self.exists_flag()) {
            Some(_) => Some(IF_NOT_EXISTS),
            None if guard_by_default => Some(IF_NOT_EXISTS),
            None => None,
        }
    }

    /// Guard for a DROP statement: `IF EXISTS` unless the caller explicitly
    /// passed `if_exists: false`, which asks for a strict drop.
    pub fn drop_guard(&self) -> Option<&'static str> {
        match build_exists_condition(self.exists_flag()) {
            Some(IF_NOT_EXISTS) => None,
            _ => Some(IF_EXISTS),
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}
