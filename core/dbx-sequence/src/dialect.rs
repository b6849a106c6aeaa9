//! Dialect tag and per-backend capability flags.
//!
//! The dialect is resolved once, when the connection is set up, and never
//! changes afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 백엔드 방언
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL — 네이티브 SEQUENCE
    Postgres,
    /// MySQL (또는 10.3 이전 MariaDB) — 테이블 기반 에뮬레이션
    MySql,
    /// MariaDB 10.3+ — 네이티브 SEQUENCE
    MariaDb,
    /// SQLite — 테이블 기반 에뮬레이션
    Sqlite,
    /// 시퀀스를 지원하지 않는 백엔드
    Unsupported,
}

/// First MariaDB release with `CREATE SEQUENCE`.
const MARIADB_SEQUENCE_VERSION: (u32, u32) = (10, 3);

impl Dialect {
    /// Dialect를 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
            Dialect::Sqlite => "sqlite",
            Dialect::Unsupported => "unsupported",
        }
    }

    /// 문자열에서 Dialect 파싱
    pub fn parse_dialect(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "mysql" | "mysql2" => Some(Dialect::MySql),
            "mariadb" => Some(Dialect::MariaDb),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "unsupported" | "mock" => Some(Dialect::Unsupported),
            _ => None,
        }
    }

    /// Resolves the dialect from the negotiated adapter name and the server
    /// version string reported by the connection.
    ///
    /// MySQL-protocol servers are only treated as native-sequence MariaDB when
    /// the version string says `MariaDB` and is at least 10.3.
    pub fn detect(adapter: &str, server_version: &str) -> Self {
        match adapter.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Dialect::Postgres,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "mysql" | "mysql2" | "mariadb" => {
                if is_sequence_capable_mariadb(server_version) {
                    Dialect::MariaDb
                } else {
                    Dialect::MySql
                }
            }
            _ => Dialect::Unsupported,
        }
    }

    /// Backends without a `SEQUENCE` object, served by the emulation engine.
    pub fn is_emulated(&self) -> bool {
        matches!(self, Dialect::MySql | Dialect::Sqlite)
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Dialect::Postgres => Capabilities {
                native_sequences: true,
                supports_increment: true,
                supports_labels: false,
                supports_owned_by: true,
                supports_data_type: true,
            },
            Dialect::MariaDb => Capabilities {
                native_sequences: true,
                supports_increment: true,
                supports_labels: false,
                supports_owned_by: false,
                supports_data_type: true,
            },
            Dialect::MySql | Dialect::Sqlite => Capabilities {
                native_sequences: false,
                supports_increment: false,
                supports_labels: true,
                supports_owned_by: false,
                supports_data_type: false,
            },
            Dialect::Unsupported => Capabilities::default(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a backend can actually honour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Backed by a catalog `SEQUENCE` object
    pub native_sequences: bool,
    /// `increment`/`step` other than 1 is applied
    pub supports_increment: bool,
    /// `nextval_with_label` stores the label
    pub supports_labels: bool,
    /// `OWNED BY` clause
    pub supports_owned_by: bool,
    /// `AS <data_type>` clause
    pub supports_data_type: bool,
}

fn is_sequence_capable_mariadb(server_version: &str) -> bool {
    if !server_version.to_ascii_lowercase().contains("mariadb") {
        return false;
    }
    // MariaDB may prefix its version with the "5.5.5-" replication marker.
    let version = server_version
        .strip_prefix("5.5.5-")
        .unwrap_or(server_version);
    parse_major_minor(version)
        .map(|v| v >= MARIADB_SEQUENCE_VERSION)
        .unwrap_or(false)
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split(|c: char| !c.is_ascii_digit());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
