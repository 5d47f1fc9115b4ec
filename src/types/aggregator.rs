//! ErrorAggregator - thread-safe collector of non-fatal errors

use super::SyncError;
use std::sync::{Mutex, MutexGuard};

/// Errors recorded by concurrent scan and mirror tasks of a single run.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Mutex<Vec<SyncError>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error; also logged at warn level
    pub fn record(&self, error: SyncError) {
        tracing::warn!("{}", error);
        self.lock().push(error);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every recorded error, leaving the aggregator empty
    pub fn drain(&self) -> Vec<SyncError> {
        std::mem::take(&mut *self.lock())
    }

    pub fn into_inner(self) -> Vec<SyncError> {
        match self.errors.into_inner() {
            Ok(errors) => errors,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // A panicking task must not hide the errors gathered by the others.
    fn lock(&self) -> MutexGuard<'_, Vec<SyncError>> {
        match self.errors.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
