//! MariaDB 10.3+ native sequences.

use crate::backend::{SequenceBackend, native_sequence_clauses, reject_regression};
use crate::config::SequenceConfig;
use crate::dialect::Dialect;
use crate::error::{SequenceError, SequenceResult};
use crate::executor::{Executor, Row, query, query_i64, run};
use crate::naming::{backtick_ident, backtick_stripped, string_literal, validate_name};
use crate::options::SequenceOptions;
use tracing::{debug, info};

pub struct MariaDbSequences<E> {
    executor: E,
    comment: String,
}

impl<E: Executor> MariaDbSequences<E> {
    pub fn new(executor: E, config: &SequenceConfig) -> Self {
        Self {
            executor,
            comment: config.ownership_comment.clone(),
        }
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Sequence name for the sequence functions; empty names never reach SQL.
    fn sequence(&self, name: &str) -> SequenceResult<String> {
        self.quote(validate_name(name)?)
    }

    fn create_sequence_sql(&self, name: &str, options: &SequenceOptions) -> SequenceResult<String> {
        let mut sql = vec!["CREATE SEQUENCE".to_string()];
        if let Some(guard) = options.create_guard(true) {
            sql.push(guard.to_string());
        }
        sql.push(self.quote_name(validate_name(name)?)?);
        sql.extend(native_sequence_clauses(options, "NOCYCLE")?);
        sql.push(format!("COMMENT = {}", string_literal(&self.comment)));
        Ok(format!("{};", sql.join(" ")))
    }

    fn value_of(&self, sql: &str, column: &str) -> SequenceResult<i64> {
        query_i64(self.executor(), sql, column)?
            .ok_or_else(|| SequenceError::execution(format!("{column} returned no value"), sql))
    }
}

impl<E: Executor> SequenceBackend for MariaDbSequences<E> {
    fn dialect(&self) -> Dialect {
        Dialect::MariaDb
    }

    fn executor(&self) -> &dyn Executor {
        &self.executor
    }

    fn quote_column_name(&self, raw: &str) -> SequenceResult<String> {
        Ok(backtick_ident(raw))
    }

    fn quote_sequence_literal(&self, raw: &str) -> SequenceResult<String> {
        Ok(backtick_stripped(raw))
    }

    /// Rows are `(Tables_in_<db>, Table_type)`; the name column is the first.
    fn check_sequences(&self) -> SequenceResult<Vec<Row>> {
        query(self.executor(), "SHOW FULL TABLES WHERE Table_type = 'SEQUENCE';")
    }

    fn custom_sequence(&self, name: &str) -> SequenceResult<bool> {
        let (schema, table) = match name.split_once('.') {
            Some((schema, table)) => (string_literal(schema), table),
            None => ("DATABASE()".to_string(), name),
        };
        let sql = format!(
            "SELECT TABLE_COMMENT AS comment FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = {schema} AND TABLE_NAME = {} AND TABLE_TYPE = 'SEQUENCE';",
            string_literal(table)
        );
        let rows = query(self.executor(), &sql)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("comment").and_then(|value| value.as_str()))
            .any(|comment| comment == self.comment))
    }

    fn create_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        self.check_options(options);
        run(self.executor(), &self.create_sequence_sql(name, options)?)?;
        info!(sequence = %name, backend = "mariadb", "sequence created");
        Ok(())
    }

    fn drop_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        let sql = match options.drop_guard() {
            Some(guard) => format!("DROP SEQUENCE {guard} {};", self.sequence(name)?),
            None => format!("DROP SEQUENCE {};", self.sequence(name)?),
        };
        run(self.executor(), &sql)?;
        info!(sequence = %name, backend = "mariadb", "sequence dropped");
        Ok(())
    }

    fn nextval(&self, name: &str) -> SequenceResult<i64> {
        let sql = format!("SELECT nextval({}) AS nextval;", self.sequence(name)?);
        self.value_of(&sql, "nextval")
    }

    fn currval(&self, name: &str) -> SequenceResult<Option<i64>> {
        self.lastval(name)
    }

    /// `lastval` is `NULL` until the session draws a value; that case is
    /// answered with exactly one `nextval`.
    fn lastval(&self, name: &str) -> SequenceResult<Option<i64>> {
        let sql = format!("SELECT lastval({}) AS lastval;", self.sequence(name)?);
        match query_i64(self.executor(), &sql, "lastval")? {
            Some(value) => Ok(Some(value)),
            None => {
                debug!(sequence = %name, "lastval is NULL in session, drawing nextval");
                self.nextval(name).map(Some)
            }
        }
    }

    /// MariaDB's `setval` marks the value as already used, so the sequence is
    /// set one below and the value itself is then drawn.
    fn setval(&self, name: &str, value: i64) -> SequenceResult<i64> {
        if let Some(current) = self.lastval(name)? {
            if value < current {
                return Ok(reject_regression(self.executor(), name, value, current));
            }
            if value == current {
                return Ok(current);
            }
        }
        let sql = format!(
            "SELECT setval({}, {}) AS setval;",
            self.sequence(name)?,
            value.saturating_sub(1)
        );
        query(self.executor(), &sql)?;
        self.nextval(name)
    }

    fn set_column_default_nextval(
        &self,
        table: &str,
        column: &str,
        sequence: &str,
    ) -> SequenceResult<()> {
        let sql = format!(
            "ALTER TABLE IF EXISTS {} ALTER COLUMN {} SET DEFAULT nextval({});",
            self.quote_name(table)?,
            self.quote_name(column)?,
            self.sequence(sequence)?
        );
        run(self.executor(), &sql)
    }
}
