//! Bare contract backend.
//!
//! Bound when the connection's dialect has no sequence support at all.
//! Every data operation answers [`SequenceError::NotSupported`]; only the
//! pure helpers (`build_exists_condition`, `check_options`) do anything.
//!
//! [`SequenceError::NotSupported`]: crate::error::SequenceError::NotSupported

use crate::backend::SequenceBackend;
use crate::dialect::Dialect;
use crate::executor::Executor;

pub struct UnsupportedSequences<E> {
    executor: E,
}

impl<E: Executor> UnsupportedSequences<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn into_executor(self) -> E {
        self.executor
    }
}

impl<E: Executor> SequenceBackend for UnsupportedSequences<E> {
    fn dialect(&self) -> Dialect {
        Dialect::Unsupported
    }

    fn executor(&self) -> &dyn Executor {
        &self.executor
    }
}
