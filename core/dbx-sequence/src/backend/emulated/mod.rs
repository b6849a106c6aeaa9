//! Emulated sequences — for backends without a `SEQUENCE` object.
//!
//! Every sequence is backed by its own table named after the sequence:
//!
//! ```text
//! <sequence> (id: auto-increment primary key, fiction: integer label, default 0)
//! ```
//!
//! `MAX(id)` of that table is the sequence's current value (its watermark).
//! `nextval` inserts one row and lets auto-increment pick the id; `setval`
//! and `create_sequence` insert an explicit seed row. Seed rows go through a
//! single guarded statement that only inserts while the watermark is still
//! below the target, so a concurrent writer can never be pushed backwards
//! and the primary key never collides.
//!
//! What differs between backends (DDL, how the issued id is read back,
//! auxiliary bookkeeping) lives behind [`EmulationStrategy`].

pub mod mysql;
pub mod sqlite;

use crate::backend::{SequenceBackend, reject_regression};
use crate::dialect::Dialect;
use crate::error::{SequenceError, SequenceResult};
use crate::executor::{Executor, Row, run};
use crate::naming::NameCache;
use crate::options::{DEFAULT_LABEL, SequenceOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Quoted and raw names of a column-default wiring.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDefault<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub sequence: &'a str,
    pub raw_table: &'a str,
    pub raw_column: &'a str,
    pub raw_sequence: &'a str,
}

/// Backend-specific half of the emulation engine.
///
/// `table` arguments are already-quoted identifiers; `name` arguments are
/// the raw sequence names (used in catalog lookups and bookkeeping rows).
pub trait EmulationStrategy: Send {
    fn dialect(&self) -> Dialect;

    fn quote_column_name(&self, raw: &str) -> String;

    fn quote_sequence_literal(&self, raw: &str) -> String;

    /// DDL for the per-sequence table.
    fn create_table_sql(&self, table: &str, guard: Option<&str>) -> String;

    fn drop_table_sql(&self, table: &str, guard: Option<&str>) -> String {
        match guard {
            Some(guard) => format!("DROP TABLE {guard} {table};"),
            None => format!("DROP TABLE {table};"),
        }
    }

    /// Inserts a row with id `target` only while the watermark is below it.
    ///
    /// The watermark is read through a derived table, which both SQLite and
    /// MySQL accept for `INSERT ... SELECT` on the target table.
    fn advance_to_sql(&self, table: &str, target: i64, label: i64) -> String {
        format!(
            "INSERT INTO {table} (id, fiction) \
             SELECT {target}, {label} FROM (SELECT MAX(id) AS top FROM {table}) AS w \
             WHERE w.top IS NULL OR w.top < {target};"
        )
    }

    /// Plain advance: auto-increment assigns the id.
    fn insert_label_sql(&self, table: &str, label: i64) -> String {
        format!("INSERT INTO {table} (fiction) VALUES ({label});")
    }

    fn delete_to_currval_sql(&self, table: &str) -> String;

    /// Current value of the sequence, `None` when absent or empty.
    fn watermark(&self, executor: &dyn Executor, name: &str, table: &str)
    -> SequenceResult<Option<i64>>;

    /// Runs after a seed row may have been written (create, setval).
    fn after_seed(&self, _executor: &dyn Executor, _name: &str, _table: &str) -> SequenceResult<()> {
        Ok(())
    }

    /// Runs after a plain advance and returns the id it issued.
    fn issued_value(&self, executor: &dyn Executor, name: &str, table: &str)
    -> SequenceResult<Option<i64>>;

    fn after_drop(&self, _executor: &dyn Executor, _name: &str) -> SequenceResult<()> {
        Ok(())
    }

    fn check_sequences(&self, executor: &dyn Executor) -> SequenceResult<Vec<Row>>;

    fn custom_sequence(&self, executor: &dyn Executor, name: &str) -> SequenceResult<bool>;

    /// Trigger DDL wiring `target.column` to the sequence.
    fn column_default_sql(&self, target: &ColumnDefault<'_>) -> Vec<String>;
}

/// The emulation engine, generic over the backend strategy.
pub struct EmulatedSequences<E, S> {
    executor: E,
    strategy: S,
    names: NameCache,
}

impl<E: Executor, S: EmulationStrategy> EmulatedSequences<E, S> {
    pub fn new(executor: E, strategy: S) -> Self {
        Self {
            executor,
            strategy,
            names: NameCache::new(),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    fn table(&self, name: &str) -> SequenceResult<Arc<str>> {
        self.names
            .quoted(name, |part| Ok(self.strategy.quote_column_name(part)))
    }

    fn exec(&self) -> &dyn Executor {
        &self.executor
    }

    /// Writes a guarded seed row, then lets the strategy sync its bookkeeping.
    fn advance_to(&self, name: &str, table: &str, target: i64, label: i64) -> SequenceResult<()> {
        run(self.exec(), &self.strategy.advance_to_sql(table, target, label))?;
        self.strategy.after_seed(self.exec(), name, table)
    }
}

impl<E: Executor, S: EmulationStrategy> SequenceBackend for EmulatedSequences<E, S> {
    fn dialect(&self) -> Dialect {
        self.strategy.dialect()
    }

    fn executor(&self) -> &dyn Executor {
        &self.executor
    }

    fn quote_column_name(&self, raw: &str) -> SequenceResult<String> {
        Ok(self.strategy.quote_column_name(raw))
    }

    fn quote_sequence_literal(&self, raw: &str) -> SequenceResult<String> {
        Ok(self.strategy.quote_sequence_literal(raw))
    }

    fn check_sequences(&self) -> SequenceResult<Vec<Row>> {
        self.strategy.check_sequences(self.exec())
    }

    fn sequence_name_key(&self) -> Option<&'static str> {
        Some("name")
    }

    fn custom_sequence(&self, name: &str) -> SequenceResult<bool> {
        self.strategy.custom_sequence(self.exec(), name)
    }

    fn create_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        self.check_options(options);
        let start = options.start_value();

        if let Some(current) = self.currval(name)? {
            if current >= start {
                debug!(sequence = %name, current, start, "sequence already at or past start");
                return Ok(());
            }
        }

        let table = self.table(name)?;
        run(
            self.exec(),
            &self
                .strategy
                .create_table_sql(&table, options.create_guard(true)),
        )?;
        self.advance_to(name, &table, start, options.label())?;
        info!(sequence = %name, start, backend = %self.dialect(), "sequence created");
        Ok(())
    }

    fn drop_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        let table = self.table(name)?;
        run(
            self.exec(),
            &self.strategy.drop_table_sql(&table, options.drop_guard()),
        )?;
        self.strategy.after_drop(self.exec(), name)?;
        info!(sequence = %name, backend = %self.dialect(), "sequence dropped");
        Ok(())
    }

    fn nextval(&self, name: &str) -> SequenceResult<i64> {
        self.nextval_with_label(name, DEFAULT_LABEL)
    }

    fn nextval_with_label(&self, name: &str, label: i64) -> SequenceResult<i64> {
        let table = self.table(name)?;
        run(self.exec(), &self.strategy.insert_label_sql(&table, label))?;
        self.strategy
            .issued_value(self.exec(), name, &table)?
            .ok_or_else(|| {
                SequenceError::execution(
                    format!("sequence '{name}' issued no value"),
                    self.strategy.insert_label_sql(&table, label),
                )
            })
    }

    fn currval(&self, name: &str) -> SequenceResult<Option<i64>> {
        let table = self.table(name)?;
        self.strategy.watermark(self.exec(), name, &table)
    }

    fn setval(&self, name: &str, value: i64) -> SequenceResult<i64> {
        match self.currval(name)? {
            None => {
                debug!(sequence = %name, value, "setval on absent sequence, creating it");
                self.create_sequence(name, &SequenceOptions::new().with_start(value))?;
                Ok(value)
            }
            Some(current) if value < current => {
                Ok(reject_regression(self.exec(), name, value, current))
            }
            Some(current) if value == current => Ok(current),
            Some(_) => {
                let table = self.table(name)?;
                self.advance_to(name, &table, value, DEFAULT_LABEL)?;
                Ok(self.currval(name)?.unwrap_or(value))
            }
        }
    }

    fn set_column_default_nextval(
        &self,
        table: &str,
        column: &str,
        sequence: &str,
    ) -> SequenceResult<()> {
        let quoted_table = self.quote_name(table)?;
        let quoted_column = self.quote_name(column)?;
        let quoted_sequence = self.table(sequence)?;
        let target = ColumnDefault {
            table: &quoted_table,
            column: &quoted_column,
            sequence: &quoted_sequence,
            raw_table: table,
            raw_column: column,
            raw_sequence: sequence,
        };
        for sql in self.strategy.column_default_sql(&target) {
            run(self.exec(), &sql)?;
        }
        Ok(())
    }

    fn delete_to_currval(&self, name: &str) -> SequenceResult<()> {
        let table = self.table(name)?;
        run(self.exec(), &self.strategy.delete_to_currval_sql(&table))
    }
}

/// Treats "table does not exist" as the empty result.
///
/// Used for best-effort bookkeeping and for watermark reads, where an absent
/// table simply means an absent sequence. Every other error propagates.
pub(crate) fn tolerate_missing_table<T: Default>(result: SequenceResult<T>) -> SequenceResult<T> {
    match result {
        Err(err) if err.is_missing_table() => {
            debug!(error = %err, "missing table tolerated");
            Ok(T::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerate_missing_table_swallows_only_missing_table() {
        let missing: SequenceResult<Option<i64>> =
            Err(SequenceError::execution("no such table: position", "SELECT 1"));
        assert_eq!(tolerate_missing_table(missing).unwrap(), None);

        let other: SequenceResult<Option<i64>> =
            Err(SequenceError::execution("disk I/O error", "SELECT 1"));
        assert!(tolerate_missing_table(other).is_err());

        let ok: SequenceResult<Option<i64>> = Ok(Some(3));
        assert_eq!(tolerate_missing_table(ok).unwrap(), Some(3));
    }
}
