//! Backend module — the sequence capability contract.
//!
//! Every backend implements [`SequenceBackend`]. Each operation defaults to
//! [`SequenceError::NotSupported`], so a backend only overrides what it can
//! actually do and every capability gap fails fast with the same error.

pub mod emulated;
pub mod mariadb;
pub mod postgres;
pub mod unsupported;

pub use emulated::{EmulatedSequences, EmulationStrategy};
pub use emulated::mysql::MySqlStrategy;
pub use emulated::sqlite::SqliteStrategy;
pub use mariadb::MariaDbSequences;
pub use postgres::PostgresSequences;
pub use unsupported::UnsupportedSequences;

use crate::diagnostics::{self, Diagnostic};
use crate::dialect::{Capabilities, Dialect};
use crate::error::{SequenceError, SequenceResult};
use crate::executor::{Executor, Row};
use crate::naming;
use crate::options::{self, SequenceOptions};

/// Core sequence interface — all backends implement this trait.
///
/// # Contract
///
/// - `create_sequence`: never moves an existing sequence backwards.
/// - `currval`/`lastval`: `None` means "uninitialised", never zero.
/// - `setval`: a value below the current one is refused with a warning and
///   the unchanged current value is returned.
/// - `drop_sequence_if_custom`: only touches sequences this crate created.
pub trait SequenceBackend: Send {
    fn dialect(&self) -> Dialect;

    /// The collaborator this backend runs its statements through.
    fn executor(&self) -> &dyn Executor;

    fn capabilities(&self) -> Capabilities {
        self.dialect().capabilities()
    }

    /// Quotes one identifier part (no dot splitting).
    fn quote_column_name(&self, _raw: &str) -> SequenceResult<String> {
        Err(self.not_supported("quote_column_name"))
    }

    /// Quotes one sequence-name part the way sequence functions expect it.
    fn quote_sequence_literal(&self, _raw: &str) -> SequenceResult<String> {
        Err(self.not_supported("quote_sequence_literal"))
    }

    /// Quotes a possibly dot-qualified table/column identifier.
    fn quote_name(&self, name: &str) -> SequenceResult<String> {
        naming::quote_qualified(name, |part| self.quote_column_name(part))
    }

    /// Quotes a possibly dot-qualified sequence name for sequence functions.
    fn quote(&self, name: &str) -> SequenceResult<String> {
        naming::quote_qualified(name, |part| self.quote_sequence_literal(part))
    }

    /// Enumerates every sequence the backend knows about.
    fn check_sequences(&self) -> SequenceResult<Vec<Row>> {
        Err(self.not_supported("check_sequences"))
    }

    /// Column of a [`check_sequences`](Self::check_sequences) record holding
    /// the display name; `None` means "the first column".
    fn sequence_name_key(&self) -> Option<&'static str> {
        None
    }

    /// Display names of every known sequence, in backend order.
    fn sequence_names(&self) -> SequenceResult<Vec<String>> {
        let key = self.sequence_name_key();
        let names = self
            .check_sequences()?
            .iter()
            .filter_map(|row| match key {
                Some(key) => row.get(key),
                None => row.first().map(|(_, value)| value),
            })
            .filter(|value| !value.is_null())
            .map(|value| value.to_string())
            .collect();
        Ok(names)
    }

    /// `true` if `name` was created through this crate.
    fn custom_sequence(&self, _name: &str) -> SequenceResult<bool> {
        Err(self.not_supported("custom_sequence"))
    }

    fn create_sequence(&self, _name: &str, _options: &SequenceOptions) -> SequenceResult<()> {
        Err(self.not_supported("create_sequence"))
    }

    /// Hard reset: unconditionally drops `name`, then creates it.
    fn recreate_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        self.drop_sequence(name, &SequenceOptions::default())?;
        self.create_sequence(name, options)
    }

    fn drop_sequence(&self, _name: &str, _options: &SequenceOptions) -> SequenceResult<()> {
        Err(self.not_supported("drop_sequence"))
    }

    /// Drops every name for which [`custom_sequence`](Self::custom_sequence)
    /// holds and silently skips the rest. Returns the names dropped.
    fn drop_sequence_if_custom(&self, names: &[&str]) -> SequenceResult<Vec<String>> {
        let mut dropped = Vec::new();
        for name in names {
            if self.custom_sequence(name)? {
                self.drop_sequence(name, &SequenceOptions::default())?;
                dropped.push((*name).to_string());
            } else {
                tracing::debug!(sequence = %name, "not a custom sequence, skipping drop");
            }
        }
        Ok(dropped)
    }

    fn nextval(&self, _name: &str) -> SequenceResult<i64> {
        Err(self.not_supported("nextval"))
    }

    /// `nextval` that tags the issued row with `label`.
    fn nextval_with_label(&self, _name: &str, _label: i64) -> SequenceResult<i64> {
        Err(self.not_supported("nextval_with_label"))
    }

    fn currval(&self, _name: &str) -> SequenceResult<Option<i64>> {
        Err(self.not_supported("currval"))
    }

    fn lastval(&self, name: &str) -> SequenceResult<Option<i64>> {
        self.currval(name)
    }

    fn setval(&self, _name: &str, _value: i64) -> SequenceResult<i64> {
        Err(self.not_supported("setval"))
    }

    /// Makes `table.column` draw its value from `sequence` on insert.
    fn set_column_default_nextval(
        &self,
        _table: &str,
        _column: &str,
        _sequence: &str,
    ) -> SequenceResult<()> {
        Err(self.not_supported("set_column_default_nextval"))
    }

    /// Deletes every emulation row except the current maximum.
    fn delete_to_currval(&self, _name: &str) -> SequenceResult<()> {
        Err(self.not_supported("delete_to_currval"))
    }

    fn build_exists_condition(&self, flag: Option<bool>) -> Option<&'static str> {
        options::build_exists_condition(flag)
    }

    /// Flags options this backend cannot honour and reports them as warnings.
    fn check_options(&self, options: &SequenceOptions) -> Vec<Diagnostic> {
        let found = diagnostics::check_options(options, &self.capabilities());
        diagnostics::report(self.executor(), &found);
        found
    }

    #[doc(hidden)]
    fn not_supported(&self, operation: &'static str) -> SequenceError {
        SequenceError::not_supported(operation, self.dialect().as_str())
    }
}

/// Refuses a decrease: warns and hands back the unchanged value.
pub(crate) fn reject_regression(
    executor: &dyn Executor,
    sequence: &str,
    requested: i64,
    current: i64,
) -> i64 {
    diagnostics::report(
        executor,
        &[Diagnostic::RegressionRejected {
            sequence: sequence.to_string(),
            requested,
            current,
        }],
    );
    current
}

/// Optional `CREATE SEQUENCE` clauses shared by the native adapters, in the
/// order PostgreSQL's grammar lists them.
///
/// `no_cycle` is the dialect's spelling of the negated cycle flag.
pub(crate) fn native_sequence_clauses(
    options: &SequenceOptions,
    no_cycle: &str,
) -> SequenceResult<Vec<String>> {
    let mut clauses = Vec::new();
    if let Some(data_type) = options.data_type.as_deref() {
        clauses.push(format!("AS {}", validate_data_type(data_type)?));
    }
    if let Some(increment) = options.increment {
        clauses.push(format!("INCREMENT BY {increment}"));
    }
    if let Some(minvalue) = options.minvalue {
        clauses.push(format!("MINVALUE {minvalue}"));
    }
    if let Some(maxvalue) = options.maxvalue {
        clauses.push(format!("MAXVALUE {maxvalue}"));
    }
    if let Some(start) = options.start {
        clauses.push(format!("START WITH {start}"));
    }
    if let Some(cache) = options.cache {
        clauses.push(format!("CACHE {cache}"));
    }
    match options.cycle {
        Some(true) => clauses.push("CYCLE".to_string()),
        Some(false) => clauses.push(no_cycle.to_string()),
        None => {}
    }
    Ok(clauses)
}

/// Rejects anything that is not a plain type name (`bigint`, `int unsigned`, ...).
pub(crate) fn validate_data_type(data_type: &str) -> SequenceResult<&str> {
    let trimmed = data_type.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
    {
        return Err(SequenceError::InvalidArguments(format!(
            "invalid sequence data type {data_type:?}"
        )));
    }
    Ok(trimmed)
}
