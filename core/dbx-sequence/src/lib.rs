//! # DBX Sequence — Named Sequence Generators
//!
//! DBX Sequence는 여러 관계형 백엔드 위에서 이름 있는 시퀀스(단조 증가 정수 생성기)를
//! 하나의 인터페이스로 다룹니다. 네이티브 `SEQUENCE`가 있는 백엔드는 SQL을 그대로
//! 전달하고, 없는 백엔드는 auto-increment 테이블로 시퀀스를 에뮬레이션합니다.
//!
//! ## 주요 특징
//!
//! - **네이티브 어댑터**: PostgreSQL, MariaDB 10.3+
//! - **에뮬레이션 엔진**: SQLite, MySQL (시퀀스별 테이블 + bookkeeping 테이블)
//! - **역행 금지**: `setval`은 현재 값보다 작은 값을 거부하고 경고만 남깁니다
//! - **원자적 전진**: 시드 행은 단일 조건부 `INSERT … SELECT`로 기록됩니다
//!
//! ## 빠른 시작
//!
//! The connection layer supplies an [`Executor`]; everything else is SQL text.
//!
//! ```rust
//! use dbx_sequence::{Dialect, Row, SequenceOptions, SequenceResult, Sequences};
//! use dbx_sequence::executor::Executor;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<String>>);
//!
//! impl Executor for Recorder {
//!     fn execute(&self, sql: &str) -> SequenceResult<()> {
//!         self.0.lock().unwrap().push(sql.to_string());
//!         Ok(())
//!     }
//!     fn fetch(&self, _sql: &str) -> SequenceResult<Vec<Row>> {
//!         Ok(vec![Row::new().with("nextval", 100)])
//!     }
//! }
//!
//! # fn main() -> SequenceResult<()> {
//! let seq = Sequences::connect(Recorder::default(), Dialect::Postgres);
//! seq.create_sequence("position", &SequenceOptions::new().with_start(100))?;
//! assert_eq!(seq.nextval("position")?, 100);
//! # Ok(())
//! # }
//! ```
//!
//! ## 에뮬레이션 테이블
//!
//! ```text
//! <sequence>      (id AUTO_INCREMENT PRIMARY KEY, fiction INTEGER DEFAULT 0)
//! mysql_sequence  (name VARCHAR(64), seq BIGINT)      -- MySQL only
//! ```
//!
//! ## 모듈 구조
//!
//! - [`sequences`] — 방언별 백엔드를 고르는 façade ([`Sequences`])
//! - [`backend`] — 시퀀스 계약 ([`SequenceBackend`]) 과 구현들
//! - [`executor`] — DB 연결 계층과의 경계 ([`Executor`])
//! - [`options`] / [`diagnostics`] — 호출별 옵션과 경고
//! - [`naming`] — 식별자 인용
//! - [`config`] — 설정 (기본값 → 파일 → 환경 변수)

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod naming;
pub mod options;
pub mod sequences;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use backend::SequenceBackend;
pub use config::SequenceConfig;
pub use dialect::{Capabilities, Dialect};
pub use error::{SequenceError, SequenceResult};
pub use executor::{Executor, Row, ScalarValue};
pub use options::SequenceOptions;
pub use sequences::Sequences;
