//! Sequences façade — one backend per connection, chosen once.

use crate::backend::{
    EmulatedSequences, MariaDbSequences, MySqlStrategy, PostgresSequences, SequenceBackend,
    SqliteStrategy, UnsupportedSequences,
};
use crate::config::SequenceConfig;
use crate::dialect::Dialect;
use crate::error::SequenceResult;
use crate::executor::Executor;
use std::fmt;
use std::ops::Deref;
use tracing::{info, instrument};

/// 연결에 바인딩된 시퀀스 API
///
/// 방언은 연결 시점에 한 번 결정되며 이후 바뀌지 않습니다. 모든 연산은
/// [`SequenceBackend`]를 통해 호출합니다 (`Deref`).
///
/// # 예제
///
/// ```rust
/// use dbx_sequence::{Dialect, Row, SequenceResult, Sequences};
/// use dbx_sequence::executor::Executor;
///
/// struct Offline;
///
/// impl Executor for Offline {
///     fn execute(&self, _sql: &str) -> SequenceResult<()> {
///         Ok(())
///     }
///     fn fetch(&self, _sql: &str) -> SequenceResult<Vec<Row>> {
///         Ok(Vec::new())
///     }
/// }
///
/// let seq = Sequences::connect(Offline, Dialect::Unsupported);
/// assert!(seq.nextval("position").unwrap_err().is_not_supported());
/// assert_eq!(seq.build_exists_condition(Some(true)), Some("IF EXISTS"));
/// ```
pub struct Sequences {
    dialect: Dialect,
    backend: Box<dyn SequenceBackend>,
}

impl Sequences {
    /// 기본 설정으로 연결
    pub fn connect<E: Executor + 'static>(executor: E, dialect: Dialect) -> Self {
        Self::connect_with_config(executor, dialect, &SequenceConfig::default())
    }

    /// 설정을 적용해 연결합니다. `config.dialect`가 있으면 `dialect`보다 우선합니다.
    #[instrument(skip(executor, config))]
    pub fn connect_with_config<E: Executor + 'static>(
        executor: E,
        dialect: Dialect,
        config: &SequenceConfig,
    ) -> Self {
        let dialect = config.dialect.unwrap_or(dialect);
        let backend: Box<dyn SequenceBackend> = match dialect {
            Dialect::Postgres => Box::new(PostgresSequences::new(executor, config)),
            Dialect::MariaDb => Box::new(MariaDbSequences::new(executor, config)),
            Dialect::MySql => Box::new(EmulatedSequences::new(executor, MySqlStrategy::new(config))),
            Dialect::Sqlite => Box::new(EmulatedSequences::new(executor, SqliteStrategy::new())),
            Dialect::Unsupported => Box::new(UnsupportedSequences::new(executor)),
        };
        info!(dialect = %dialect, emulated = dialect.is_emulated(), "sequence backend bound");
        Self { dialect, backend }
    }

    /// 어댑터 이름과 서버 버전으로 방언을 감지해 연결
    pub fn detect<E: Executor + 'static>(
        executor: E,
        adapter: &str,
        server_version: &str,
        config: &SequenceConfig,
    ) -> SequenceResult<Self> {
        config.validate()?;
        let dialect = Dialect::detect(adapter, server_version);
        Ok(Self::connect_with_config(executor, dialect, config))
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn backend(&self) -> &dyn SequenceBackend {
        self.backend.as_ref()
    }
}

impl Deref for Sequences {
    type Target = dyn SequenceBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Sequences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequences")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}
