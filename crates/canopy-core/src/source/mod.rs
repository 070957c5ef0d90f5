pub mod cache;
pub mod directory;
pub mod fetch;
pub mod memory;
pub mod retry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CanopyError, Result};
use crate::scene::{SceneCollection, SceneQuery};

pub use cache::{CacheKey, CachedSource};
pub use directory::DirectorySource;
pub use fetch::{fetch_windows, WindowCollections};
pub use memory::MemorySource;
pub use retry::{RetryPolicy, RetryingSource};

/// Cooperative cancellation flag shared between a caller and an analysis run.
///
/// Clones observe the same flag. A superseded run is cancelled by the caller;
/// long-running work polls [`CancelToken::check`] between steps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CanopyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Supplies filtered, date-ordered scenes for a region.
///
/// Implementations must honour every filter of the query and should return
/// `Cancelled` promptly once `cancel` fires. Transport failures map to
/// `SourceUnavailable`.
pub trait SceneSource: Send + Sync {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection>;

    /// Short human-readable name for logs.
    fn name(&self) -> &str;
}

impl<S: SceneSource + ?Sized> SceneSource for Arc<S> {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        (**self).query(query, cancel)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
