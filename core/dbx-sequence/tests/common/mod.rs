// 통합 테스트 공용 실행기
//
// SqliteExecutor: 실제 in-memory SQLite (rusqlite)
// ScriptedExecutor: SQL 기록 + 미리 정한 응답 재생 (MySQL / PostgreSQL / MariaDB)

#![allow(dead_code)]

use dbx_sequence::executor::{Executor, Row, ScalarValue};
use dbx_sequence::{SequenceError, SequenceResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use std::sync::Arc;

/// Shared handle over one in-memory SQLite connection.
///
/// Clones talk to the same database, so a test can hand one clone to the
/// backend and keep another for direct inspection.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
    warnings: Arc<Mutex<Vec<String>>>,
}

impl SqliteExecutor {
    pub fn open_in_memory() -> Self {
        let conn = Connection::open_in_memory().expect("open in-memory sqlite");
        Self {
            conn: Arc::new(Mutex::new(conn)),
            warnings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    /// Reads one integer column of every row.
    pub fn column_i64(&self, sql: &str) -> Vec<Option<i64>> {
        self.fetch(sql)
            .expect("query")
            .iter()
            .map(|row| {
                row.first()
                    .and_then(|(_, value)| value.as_i64().expect("integer cell"))
            })
            .collect()
    }

    pub fn row_count(&self, table: &str) -> i64 {
        self.column_i64(&format!("SELECT COUNT(*) FROM {table};"))[0].unwrap_or(0)
    }
}

fn sqlite_error(err: rusqlite::Error, sql: &str) -> SequenceError {
    SequenceError::execution(err.to_string(), sql)
}

impl Executor for SqliteExecutor {
    fn execute(&self, sql: &str) -> SequenceResult<()> {
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| sqlite_error(e, sql))
    }

    fn fetch(&self, sql: &str) -> SequenceResult<Vec<Row>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(|e| sqlite_error(e, sql))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([]).map_err(|e| sqlite_error(e, sql))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| sqlite_error(e, sql))? {
            let mut record = Row::new();
            for (i, name) in names.iter().enumerate() {
                let value = match row.get_ref(i).map_err(|e| sqlite_error(e, sql))? {
                    ValueRef::Null | ValueRef::Blob(_) => ScalarValue::Null,
                    ValueRef::Integer(v) => ScalarValue::Int64(v),
                    ValueRef::Real(v) => ScalarValue::Float64(v),
                    ValueRef::Text(t) => ScalarValue::Utf8(String::from_utf8_lossy(t).into_owned()),
                };
                record.push(name.clone(), value);
            }
            out.push(record);
        }
        Ok(out)
    }

    fn log_warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }
}

/// Canned answer for statements containing a pattern.
#[derive(Debug, Clone)]
pub enum Reply {
    Rows(Vec<Row>),
    Fail(String),
}

impl Reply {
    /// One row with one integer column.
    pub fn value(column: &str, value: i64) -> Self {
        Reply::Rows(vec![Row::new().with(column, value)])
    }

    pub fn null(column: &str) -> Self {
        Reply::Rows(vec![Row::new().with(column, ScalarValue::Null)])
    }
}

#[derive(Default)]
struct Script {
    log: Vec<String>,
    once: Vec<(String, Reply)>,
    always: Vec<(String, Reply)>,
    warnings: Vec<String>,
}

impl Script {
    fn reply_for(&mut self, sql: &str) -> Option<Reply> {
        if let Some(pos) = self.once.iter().position(|(p, _)| sql.contains(p.as_str())) {
            return Some(self.once.remove(pos).1);
        }
        self.always
            .iter()
            .rev()
            .find(|(p, _)| sql.contains(p.as_str()))
            .map(|(_, reply)| reply.clone())
    }
}

/// Records every statement and replays scripted replies.
///
/// Unmatched `execute` succeeds; unmatched `fetch` returns no rows.
/// `once` replies are consumed in registration order and win over `always`.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn once(&self, pattern: &str, reply: Reply) -> &Self {
        self.script.lock().once.push((pattern.to_string(), reply));
        self
    }

    pub fn always(&self, pattern: &str, reply: Reply) -> &Self {
        self.script.lock().always.push((pattern.to_string(), reply));
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.script.lock().log.clone()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.script
            .lock()
            .log
            .iter()
            .filter(|sql| sql.contains(pattern))
            .count()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.script.lock().warnings.clone()
    }

    pub fn clear_log(&self) {
        self.script.lock().log.clear();
    }

    fn dispatch(&self, sql: &str) -> SequenceResult<Vec<Row>> {
        let mut script = self.script.lock();
        script.log.push(sql.to_string());
        match script.reply_for(sql) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(message)) => Err(SequenceError::execution(message, sql)),
            None => Ok(Vec::new()),
        }
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, sql: &str) -> SequenceResult<()> {
        self.dispatch(sql).map(|_| ())
    }

    fn fetch(&self, sql: &str) -> SequenceResult<Vec<Row>> {
        self.dispatch(sql)
    }

    fn log_warning(&self, message: &str) {
        self.script.lock().warnings.push(message.to_string());
    }
}
