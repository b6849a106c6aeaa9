//! SQLite emulation strategy.
//!
//! The per-sequence table is an `AUTOINCREMENT` table, so SQLite itself
//! remembers every table's high-water mark in `sqlite_sequence`; that
//! catalog is what enumeration reads. The watermark itself is `MAX(id)` of
//! the sequence table.

use super::{ColumnDefault, EmulationStrategy, tolerate_missing_table};
use crate::dialect::Dialect;
use crate::error::SequenceResult;
use crate::executor::{Executor, Row, query, query_i64};
use crate::naming::{bare_name, derived_name, double_quote_ident, string_literal};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStrategy;

impl SqliteStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl EmulationStrategy for SqliteStrategy {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn quote_column_name(&self, raw: &str) -> String {
        double_quote_ident(raw)
    }

    fn quote_sequence_literal(&self, raw: &str) -> String {
        string_literal(raw)
    }

    fn create_table_sql(&self, table: &str, guard: Option<&str>) -> String {
        let guard = guard.map(|g| format!("{g} ")).unwrap_or_default();
        format!(
            "CREATE TABLE {guard}{table} \
             (id INTEGER PRIMARY KEY AUTOINCREMENT, fiction INTEGER DEFAULT 0);"
        )
    }

    fn delete_to_currval_sql(&self, table: &str) -> String {
        format!("DELETE FROM {table} WHERE id < (SELECT MAX(id) FROM {table});")
    }

    fn watermark(
        &self,
        executor: &dyn Executor,
        _name: &str,
        table: &str,
    ) -> SequenceResult<Option<i64>> {
        let sql = format!("SELECT MAX(id) AS id FROM {table};");
        tolerate_missing_table(query_i64(executor, &sql, "id"))
    }

    /// The rowid this connection just inserted. `MAX(id)` could already
    /// belong to another connection's insert.
    fn issued_value(
        &self,
        executor: &dyn Executor,
        _name: &str,
        _table: &str,
    ) -> SequenceResult<Option<i64>> {
        query_i64(executor, "SELECT last_insert_rowid() AS id;", "id")
    }

    fn check_sequences(&self, executor: &dyn Executor) -> SequenceResult<Vec<Row>> {
        // Only AUTOINCREMENT tables shaped like a sequence table qualify.
        let sql = "SELECT s.name AS name, s.seq AS seq \
                   FROM sqlite_sequence AS s \
                   JOIN pragma_table_info(s.name) AS p ON p.name = 'fiction' \
                   ORDER BY s.name;";
        tolerate_missing_table(query(executor, sql))
    }

    fn custom_sequence(&self, executor: &dyn Executor, name: &str) -> SequenceResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM pragma_table_info({}) WHERE name = 'fiction';",
            string_literal(bare_name(name))
        );
        let found = tolerate_missing_table(query_i64(executor, &sql, "n"))?;
        Ok(found.unwrap_or(0) > 0)
    }

    fn column_default_sql(&self, target: &ColumnDefault<'_>) -> Vec<String> {
        let trigger = double_quote_ident(&derived_name(&[target.raw_table, target.raw_sequence]));
        let ColumnDefault {
            table,
            column,
            sequence,
            ..
        } = *target;
        vec![format!(
            "CREATE TRIGGER IF NOT EXISTS {trigger} AFTER INSERT ON {table}\n\
             BEGIN\n\
             \x20 INSERT INTO {sequence} (fiction) VALUES (0);\n\
             \x20 UPDATE {table} SET {column} = (SELECT MAX(id) FROM {sequence}) \
             WHERE rowid = NEW.rowid;\n\
             END;"
        )]
    }
}
