//! 시퀀스 레이어 설정
//!
//! 우선순위: 기본값 → 설정 파일 (JSON) → 환경 변수

use crate::dialect::Dialect;
use crate::error::{SequenceError, SequenceResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 기본 bookkeeping 테이블 이름 (MySQL 에뮬레이션)
pub const DEFAULT_BOOKKEEPING_TABLE: &str = "mysql_sequence";

/// 네이티브 시퀀스에 남기는 소유 표시 주석
pub const DEFAULT_OWNERSHIP_COMMENT: &str = "created by dbx-sequence";

/// bookkeeping `name` 컬럼 폭
pub const DEFAULT_BOOKKEEPING_NAME_WIDTH: u32 = 64;

const ENV_BOOKKEEPING_TABLE: &str = "DBX_SEQUENCE_BOOKKEEPING_TABLE";
const ENV_OWNERSHIP_COMMENT: &str = "DBX_SEQUENCE_OWNERSHIP_COMMENT";
const ENV_DIALECT: &str = "DBX_SEQUENCE_DIALECT";
const ENV_BOOKKEEPING_NAME_WIDTH: &str = "DBX_SEQUENCE_BOOKKEEPING_NAME_WIDTH";

/// 시퀀스 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// MySQL 에뮬레이션용 공유 bookkeeping 테이블
    pub bookkeeping_table: String,

    /// `custom_sequence` 판별에 쓰는 주석 태그
    pub ownership_comment: String,

    /// 감지된 방언 대신 강제로 사용할 방언
    pub dialect: Option<Dialect>,

    /// bookkeeping `name VARCHAR(n)` 폭
    pub bookkeeping_name_width: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            bookkeeping_table: DEFAULT_BOOKKEEPING_TABLE.to_string(),
            ownership_comment: DEFAULT_OWNERSHIP_COMMENT.to_string(),
            dialect: None,
            bookkeeping_name_width: DEFAULT_BOOKKEEPING_NAME_WIDTH,
        }
    }
}

impl SequenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기본값 위에 환경 변수 적용
    pub fn from_env() -> SequenceResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 환경 변수 덮어쓰기
    pub fn apply_env(&mut self) -> SequenceResult<()> {
        if let Ok(table) = env::var(ENV_BOOKKEEPING_TABLE) {
            self.bookkeeping_table = table;
        }
        if let Ok(comment) = env::var(ENV_OWNERSHIP_COMMENT) {
            self.ownership_comment = comment;
        }
        if let Ok(dialect) = env::var(ENV_DIALECT) {
            self.dialect = Some(Dialect::parse_dialect(&dialect).ok_or_else(|| {
                SequenceError::Config(format!("{ENV_DIALECT}: unknown dialect '{dialect}'"))
            })?);
        }
        if let Ok(width) = env::var(ENV_BOOKKEEPING_NAME_WIDTH) {
            self.bookkeeping_name_width = width.trim().parse().map_err(|_| {
                SequenceError::Config(format!(
                    "{ENV_BOOKKEEPING_NAME_WIDTH}: expected a positive integer, got '{width}'"
                ))
            })?;
        }
        self.validate()
    }

    /// 파일에서 로드
    pub fn load_from_file(path: impl AsRef<Path>) -> SequenceResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: SequenceConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// 파일에 저장
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> SequenceResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        // 디렉토리 생성
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        Ok(())
    }

    pub fn with_bookkeeping_table(mut self, table: impl Into<String>) -> Self {
        self.bookkeeping_table = table.into();
        self
    }

    pub fn with_ownership_comment(mut self, comment: impl Into<String>) -> Self {
        self.ownership_comment = comment.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_bookkeeping_name_width(mut self, width: u32) -> Self {
        self.bookkeeping_name_width = width;
        self
    }

    /// 설정 검증
    pub fn validate(&self) -> SequenceResult<()> {
        if self.bookkeeping_table.trim().is_empty() {
            return Err(SequenceError::Config(
                "bookkeeping_table must not be empty".to_string(),
            ));
        }
        if self.bookkeeping_name_width == 0 {
            return Err(SequenceError::Config(
                "bookkeeping_name_width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
