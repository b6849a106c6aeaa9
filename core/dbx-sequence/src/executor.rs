//! Execution collaborator — the only way this crate touches a database.
//!
//! The surrounding connection layer implements [`Executor`]; the sequence
//! backends only ever hand it raw SQL strings and read scalars back out of
//! the returned [`Row`]s.

use crate::error::{SequenceError, SequenceResult};
use crate::logging::SQL_TARGET;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 결과 셀 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Boolean(bool),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Reads the cell as a sequence value.
    ///
    /// `NULL` maps to `None`. Drivers that hand integers back as text
    /// (MySQL `SHOW`/aggregate results, for one) are parsed.
    pub fn as_i64(&self) -> SequenceResult<Option<i64>> {
        match self {
            ScalarValue::Null => Ok(None),
            ScalarValue::Int64(v) => Ok(Some(*v)),
            ScalarValue::Utf8(s) => {
                s.trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| SequenceError::TypeMismatch {
                        expected: "Int64".to_string(),
                        actual: format!("Utf8({s})"),
                    })
            }
            ScalarValue::Float64(v) if v.fract() == 0.0 => Ok(Some(*v as i64)),
            other => Err(SequenceError::TypeMismatch {
                expected: "Int64".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Utf8(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "Null",
            ScalarValue::Int64(_) => "Int64",
            ScalarValue::Float64(_) => "Float64",
            ScalarValue::Utf8(_) => "Utf8",
            ScalarValue::Boolean(_) => "Boolean",
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("NULL"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Utf8(v) => f.write_str(v),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int64(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int64(i64::from(v))
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Utf8(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Utf8(v)
    }
}

/// One result row, indexable by column name in select-list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, ScalarValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<ScalarValue>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Column lookup; exact match first, then ASCII case-insensitive.
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
            })
            .map(|(_, value)| value)
    }

    /// First column of the row, whatever it is called.
    pub fn first(&self) -> Option<(&str, &ScalarValue)> {
        self.columns.first().map(|(n, v)| (n.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Execution collaborator implemented by the database connection layer.
///
/// # Contract
///
/// - `execute`: runs one or more statements, fails with
///   [`SequenceError::Execution`] on malformed SQL or constraint violation.
/// - `fetch`: runs a query and returns every row (finite, eager).
/// - `log_warning`: best-effort diagnostic sink, never fails.
pub trait Executor: Send {
    fn execute(&self, sql: &str) -> SequenceResult<()>;

    fn fetch(&self, sql: &str) -> SequenceResult<Vec<Row>>;

    fn log_warning(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, sql: &str) -> SequenceResult<()> {
        (**self).execute(sql)
    }

    fn fetch(&self, sql: &str) -> SequenceResult<Vec<Row>> {
        (**self).fetch(sql)
    }

    fn log_warning(&self, message: &str) {
        (**self).log_warning(message)
    }
}

/// Runs a statement with SQL logging.
pub(crate) fn run(executor: &dyn Executor, sql: &str) -> SequenceResult<()> {
    tracing::debug!(target: SQL_TARGET, sql = %sql, "execute");
    executor.execute(sql)
}

/// Runs a query with SQL logging.
pub(crate) fn query(executor: &dyn Executor, sql: &str) -> SequenceResult<Vec<Row>> {
    tracing::debug!(target: SQL_TARGET, sql = %sql, "fetch");
    executor.fetch(sql)
}

/// Reads one integer cell from the last row of a query.
///
/// No rows, or a `NULL` cell, yields `None`. A row without the column is an
/// error: that means the statement and the reader disagree.
pub(crate) fn query_i64(
    executor: &dyn Executor,
    sql: &str,
    column: &str,
) -> SequenceResult<Option<i64>> {
    let rows = query(executor, sql)?;
    match rows.last() {
        None => Ok(None),
        Some(row) => match row.get(column) {
            Some(value) => value.as_i64(),
            None => Err(SequenceError::MissingColumn {
                column: column.to_string(),
                sql: sql.to_string(),
            }),
        },
    }
}
