//! A cloneable, task-safe handle to [`Storage`].

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

use super::Storage;

/// Shared ownership of one [`Storage`] across async tasks.
///
/// Closures passed to [`SharedStorage::run`] execute on tokio's blocking
/// pool while holding the storage lock, so only one of them touches the
/// connection at a time.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<Storage>>,
}

impl SharedStorage {
    /// Wrap an opened storage.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Run `f` with exclusive access to the storage.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or [`Error::Internal`] if the lock is
    /// poisoned or the blocking task panicked.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut storage = inner
                .lock()
                .map_err(|_| Error::internal("storage lock poisoned"))?;
            f(&mut storage)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}
