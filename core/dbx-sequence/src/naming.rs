//! Identifier normalisation and quoting.
//!
//! Names may be dot-qualified (`schema.table`). They are split on the first
//! dot only and every part is quoted on its own, so `a.b.c` becomes
//! `"a"."b.c"` rather than three parts.

use crate::error::{SequenceError, SequenceResult};
use dashmap::DashMap;
use std::sync::Arc;

/// Splits on the first dot and quotes every part with `quote`.
pub fn quote_qualified<F>(name: &str, quote: F) -> SequenceResult<String>
where
    F: Fn(&str) -> SequenceResult<String>,
{
    let mut quoted = Vec::with_capacity(2);
    for part in name.splitn(2, '.') {
        quoted.push(quote(part)?);
    }
    Ok(quoted.join("."))
}

/// ANSI identifier quoting: `"name"`, embedded `"` doubled (PostgreSQL, SQLite).
pub fn double_quote_ident(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// MySQL/MariaDB identifier quoting: `` `name` ``, embedded backticks doubled.
pub fn backtick_ident(raw: &str) -> String {
    format!("`{}`", raw.replace('`', "``"))
}

/// MySQL/MariaDB sequence-name quoting: backticks with every quote
/// character stripped from the name.
pub fn backtick_stripped(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '`' | '"' | '\'')).collect();
    format!("`{cleaned}`")
}

/// Standard SQL string literal, embedded `'` doubled.
pub fn string_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

/// The unqualified part of a name: everything after the first dot.
///
/// Catalog tables (`sqlite_sequence`, `information_schema`) key rows by the
/// bare table name.
pub fn bare_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((_, rest)) => rest,
        None => name,
    }
}

/// Derived object name (triggers) built from several names.
///
/// Dots become underscores so the result is always a single identifier.
pub fn derived_name(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.replace('.', "_"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Rejects names that cannot denote any table or sequence.
pub fn validate_name(name: &str) -> SequenceResult<&str> {
    if name.trim().is_empty() {
        return Err(SequenceError::InvalidArguments(
            "sequence name must not be empty".to_string(),
        ));
    }
    if name.contains('\0') {
        return Err(SequenceError::InvalidArguments(format!(
            "sequence name {name:?} contains a NUL byte"
        )));
    }
    Ok(name)
}

/// Per-instance cache of normalised names and their quoted forms.
///
/// Purely a memo: quoting is deterministic, so a miss only costs a
/// recomputation.
#[derive(Debug, Default)]
pub struct NameCache {
    quoted: DashMap<String, Arc<str>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the quoted identifier for `name`, computing it once.
    pub fn quoted<F>(&self, name: &str, quote: F) -> SequenceResult<Arc<str>>
    where
        F: Fn(&str) -> SequenceResult<String>,
    {
        if let Some(hit) = self.quoted.get(name) {
            return Ok(Arc::clone(hit.value()));
        }
        let value: Arc<str> = quote_qualified(validate_name(name)?, quote)?.into();
        self.quoted.insert(name.to_string(), Arc::clone(&value));
        Ok(value)
    }
}
