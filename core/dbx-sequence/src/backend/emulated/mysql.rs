//! MySQL emulation strategy.
//!
//! MySQL's `AUTO_INCREMENT` counter is not something `MAX(id)` can be trusted
//! to reproduce after deletes, so the last issued value of every sequence is
//! also cached in one shared bookkeeping table (`mysql_sequence` by default):
//!
//! ```text
//! mysql_sequence (name VARCHAR(64), seq BIGINT)   -- at most one row per name
//! ```
//!
//! Bookkeeping rows are replaced delete-then-insert. The bookkeeping table
//! may not exist yet, so deleting from it tolerates "table doesn't exist".

use super::{ColumnDefault, EmulationStrategy, tolerate_missing_table};
use crate::config::SequenceConfig;
use crate::dialect::Dialect;
use crate::error::{SequenceError, SequenceResult};
use crate::executor::{Executor, Row, query, query_i64, run};
use crate::naming::{backtick_ident, backtick_stripped, derived_name, string_literal};

#[derive(Debug, Clone)]
pub struct MySqlStrategy {
    /// Quoted bookkeeping table name
    bookkeeping: String,
    name_width: u32,
}

impl Default for MySqlStrategy {
    fn default() -> Self {
        Self::new(&SequenceConfig::default())
    }
}

impl MySqlStrategy {
    pub fn new(config: &SequenceConfig) -> Self {
        Self {
            bookkeeping: backtick_ident(&config.bookkeeping_table),
            name_width: config.bookkeeping_name_width,
        }
    }

    pub fn bookkeeping_table(&self) -> &str {
        &self.bookkeeping
    }

    fn create_bookkeeping_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (name VARCHAR({}), seq BIGINT);",
            self.bookkeeping, self.name_width
        )
    }

    fn delete_bookkeeping_sql(&self, name: &str) -> String {
        format!(
            "DELETE QUICK IGNORE FROM {} WHERE name = {};",
            self.bookkeeping,
            string_literal(name)
        )
    }

    /// Best-effort removal of the bookkeeping row.
    fn forget(&self, executor: &dyn Executor, name: &str) -> SequenceResult<()> {
        tolerate_missing_table(run(executor, &self.delete_bookkeeping_sql(name)))
    }
}

impl EmulationStrategy for MySqlStrategy {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote_column_name(&self, raw: &str) -> String {
        backtick_ident(raw)
    }

    fn quote_sequence_literal(&self, raw: &str) -> String {
        backtick_stripped(raw)
    }

    fn create_table_sql(&self, table: &str, guard: Option<&str>) -> String {
        let guard = guard.map(|g| format!("{g} ")).unwrap_or_default();
        format!(
            "CREATE TABLE {guard}{table} \
             (id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, fiction BIGINT DEFAULT 0);"
        )
    }

    fn delete_to_currval_sql(&self, table: &str) -> String {
        // MySQL refuses a subquery on the DELETE target unless it is materialised.
        format!(
            "DELETE FROM {table} WHERE id < \
             (SELECT top FROM (SELECT MAX(id) AS top FROM {table}) AS w);"
        )
    }

    fn watermark(
        &self,
        executor: &dyn Executor,
        name: &str,
        _table: &str,
    ) -> SequenceResult<Option<i64>> {
        let sql = format!(
            "SELECT MAX(seq) AS id FROM {} WHERE name = {};",
            self.bookkeeping,
            string_literal(name)
        );
        tolerate_missing_table(query_i64(executor, &sql, "id"))
    }

    /// Re-derives the bookkeeping row from the sequence table.
    fn after_seed(&self, executor: &dyn Executor, name: &str, table: &str) -> SequenceResult<()> {
        run(executor, &self.create_bookkeeping_sql())?;
        self.forget(executor, name)?;
        run(
            executor,
            &format!(
                "INSERT INTO {} (name, seq) SELECT {}, MAX(id) FROM {table};",
                self.bookkeeping,
                string_literal(name)
            ),
        )
    }

    /// Records and returns the id this session's insert was given.
    fn issued_value(
        &self,
        executor: &dyn Executor,
        name: &str,
        _table: &str,
    ) -> SequenceResult<Option<i64>> {
        self.forget(executor, name)?;
        run(
            executor,
            &format!(
                "INSERT INTO {} (name, seq) VALUES ({}, LAST_INSERT_ID());",
                self.bookkeeping,
                string_literal(name)
            ),
        )?;
        query_i64(executor, "SELECT LAST_INSERT_ID() AS id;", "id")
    }

    fn after_drop(&self, executor: &dyn Executor, name: &str) -> SequenceResult<()> {
        self.forget(executor, name)
    }

    fn check_sequences(&self, executor: &dyn Executor) -> SequenceResult<Vec<Row>> {
        let sql = format!(
            "SELECT name, seq FROM {} ORDER BY name;",
            self.bookkeeping
        );
        tolerate_missing_table(query(executor, &sql))
    }

    fn custom_sequence(&self, executor: &dyn Executor, name: &str) -> SequenceResult<bool> {
        let sql = format!(
            "SELECT name FROM {} WHERE name = {};",
            self.bookkeeping,
            string_literal(name)
        );
        match query(executor, &sql) {
            Ok(rows) => Ok(!rows.is_empty()),
            Err(SequenceError::Execution { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Two chained triggers: MySQL cannot assign a value computed by a
    /// multi-statement body to `NEW.column` in the same trigger.
    fn column_default_sql(&self, target: &ColumnDefault<'_>) -> Vec<String> {
        let advance = backtick_ident(&derived_name(&[target.raw_table, target.raw_sequence]));
        let assign = backtick_ident(&derived_name(&[target.raw_table, target.raw_column]));
        let book = &self.bookkeeping;
        let name = string_literal(target.raw_sequence);
        let ColumnDefault {
            table,
            column,
            sequence,
            ..
        } = *target;

        vec![
            format!(
                "CREATE TRIGGER IF NOT EXISTS {advance} BEFORE INSERT ON {table}\n\
                 FOR EACH ROW BEGIN\n\
                 \x20 DELETE QUICK IGNORE FROM {book} WHERE name = {name};\n\
                 \x20 INSERT INTO {sequence} SET fiction = 0;\n\
                 \x20 INSERT INTO {book} SET name = {name}, seq = LAST_INSERT_ID();\n\
                 END;"
            ),
            format!(
                "CREATE TRIGGER IF NOT EXISTS {assign} BEFORE INSERT ON {table}\n\
                 FOR EACH ROW FOLLOWS {advance}\n\
                 SET NEW.{column} = (SELECT MAX(seq) FROM {book} WHERE name = {name});"
            ),
        ]
    }
}
