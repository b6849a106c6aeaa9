//! PostgreSQL native sequences.
//!
//! Every operation is one statement against the catalog `SEQUENCE`. The
//! sequence functions take a `regclass` text literal, so names are quoted as
//! identifiers first and then wrapped as a string: `'"public"."position"'`.

use crate::backend::{SequenceBackend, native_sequence_clauses, reject_regression};
use crate::config::SequenceConfig;
use crate::dialect::Dialect;
use crate::error::{SequenceError, SequenceResult};
use crate::executor::{Executor, Row, query, query_i64, run};
use crate::naming::{NameCache, double_quote_ident, string_literal};
use crate::options::SequenceOptions;
use std::sync::Arc;
use tracing::{debug, info};

pub struct PostgresSequences<E> {
    executor: E,
    names: NameCache,
    comment: String,
}

impl<E: Executor> PostgresSequences<E> {
    pub fn new(executor: E, config: &SequenceConfig) -> Self {
        Self {
            executor,
            names: NameCache::new(),
            comment: config.ownership_comment.clone(),
        }
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Quoted identifier, cached per name.
    fn ident(&self, name: &str) -> SequenceResult<Arc<str>> {
        self.names.quoted(name, |part| Ok(double_quote_ident(part)))
    }

    /// `regclass` text literal for the sequence functions.
    fn regclass(&self, name: &str) -> SequenceResult<String> {
        Ok(string_literal(&self.ident(name)?))
    }

    fn create_sequence_sql(&self, name: &str, options: &SequenceOptions) -> SequenceResult<String> {
        let mut sql = vec!["CREATE SEQUENCE".to_string()];
        if let Some(guard) = options.create_guard(false) {
            sql.push(guard.to_string());
        }
        sql.push(self.ident(name)?.to_string());
        sql.extend(native_sequence_clauses(options, "NO CYCLE")?);
        if let Some(owner) = options.owned_by.as_deref() {
            if owner.eq_ignore_ascii_case("none") {
                sql.push("OWNED BY NONE".to_string());
            } else {
                sql.push(format!("OWNED BY {}", self.quote_name(owner)?));
            }
        }
        Ok(format!("{};", sql.join(" ")))
    }

    fn value_of(&self, sql: &str, column: &str) -> SequenceResult<i64> {
        query_i64(self.executor(), sql, column)?
            .ok_or_else(|| SequenceError::execution(format!("{column} returned no value"), sql))
    }
}

impl<E: Executor> SequenceBackend for PostgresSequences<E> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn executor(&self) -> &dyn Executor {
        &self.executor
    }

    fn quote_column_name(&self, raw: &str) -> SequenceResult<String> {
        Ok(double_quote_ident(raw))
    }

    fn quote_sequence_literal(&self, raw: &str) -> SequenceResult<String> {
        Ok(string_literal(raw))
    }

    fn check_sequences(&self) -> SequenceResult<Vec<Row>> {
        query(
            self.executor(),
            "SELECT * FROM information_schema.sequences ORDER BY sequence_name;",
        )
    }

    fn sequence_name_key(&self) -> Option<&'static str> {
        Some("sequence_name")
    }

    /// A missing relation (or any other failure) reads as "not ours".
    fn custom_sequence(&self, name: &str) -> SequenceResult<bool> {
        let sql = format!(
            "SELECT obj_description({}::regclass, 'pg_class') AS obj_description;",
            self.regclass(name)?
        );
        match query(self.executor(), &sql) {
            Ok(rows) => Ok(rows
                .last()
                .and_then(|row| row.get("obj_description"))
                .and_then(|value| value.as_str())
                .is_some_and(|comment| comment == self.comment)),
            Err(SequenceError::Execution { message, .. }) => {
                debug!(sequence = %name, error = %message, "obj_description failed");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    fn create_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        self.check_options(options);
        let create = self.create_sequence_sql(name, options)?;
        run(self.executor(), &create)?;
        run(
            self.executor(),
            &format!(
                "COMMENT ON SEQUENCE {} IS {};",
                self.ident(name)?,
                string_literal(&self.comment)
            ),
        )?;
        info!(sequence = %name, backend = "postgres", "sequence created");
        Ok(())
    }

    fn drop_sequence(&self, name: &str, options: &SequenceOptions) -> SequenceResult<()> {
        let sql = match options.drop_guard() {
            Some(guard) => format!("DROP SEQUENCE {guard} {};", self.ident(name)?),
            None => format!("DROP SEQUENCE {};", self.ident(name)?),
        };
        run(self.executor(), &sql)?;
        info!(sequence = %name, backend = "postgres", "sequence dropped");
        Ok(())
    }

    fn nextval(&self, name: &str) -> SequenceResult<i64> {
        let sql = format!("SELECT nextval({}) AS nextval;", self.regclass(name)?);
        self.value_of(&sql, "nextval")
    }

    /// `currval` is session-scoped: before the first `nextval` of the session
    /// it fails, and that one failure is answered with a single `nextval`.
    fn currval(&self, name: &str) -> SequenceResult<Option<i64>> {
        let sql = format!("SELECT currval({}) AS currval;", self.regclass(name)?);
        match query_i64(self.executor(), &sql, "currval") {
            Err(err) if err.is_currval_undefined() => {
                debug!(sequence = %name, "currval undefined in session, drawing nextval");
                self.nextval(name).map(Some)
            }
            other => other,
        }
    }

    /// Single statement: the comparison against `last_value` and the
    /// `setval` call cannot be split by a concurrent `nextval`.
    fn setval(&self, name: &str, value: i64) -> SequenceResult<i64> {
        let sql = format!(
            "SELECT CASE WHEN {value} >= last_value THEN setval({}, {value}) \
             ELSE last_value END AS setval FROM {};",
            self.regclass(name)?,
            self.ident(name)?
        );
        let result = self.value_of(&sql, "setval")?;
        if result > value {
            return Ok(reject_regression(self.executor(), name, value, result));
        }
        Ok(result)
    }

    fn set_column_default_nextval(
        &self,
        table: &str,
        column: &str,
        sequence: &str,
    ) -> SequenceResult<()> {
        let sql = format!(
            "ALTER TABLE IF EXISTS {} ALTER COLUMN {} SET DEFAULT nextval({}::regclass);",
            self.quote_name(table)?,
            self.quote_name(column)?,
            self.regclass(sequence)?
        );
        run(self.executor(), &sql)
    }
}
