use tracing::info;

use crate::error::{CanopyError, Result};
use crate::scene::{SceneCollection, SceneQuery};

use super::{CancelToken, SceneSource};

/// Collections for the two analysis windows.
#[derive(Clone, Debug)]
pub struct WindowCollections {
    pub baseline: SceneCollection,
    pub current: SceneCollection,
}

/// Query both windows concurrently on a pool of at most `workers` threads.
///
/// If the token is cancelled before both queries finish, whatever was fetched
/// is dropped and `Cancelled` is returned.
pub fn fetch_windows(
    source: &dyn SceneSource,
    baseline: &SceneQuery,
    current: &SceneQuery,
    workers: usize,
    cancel: &CancelToken,
) -> Result<WindowCollections> {
    cancel.check()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("canopy-fetch-{i}"))
        .build()
        .map_err(|e| CanopyError::InvalidConfig(format!("fetch pool: {e}")))?;

    let (b, c) = pool.install(|| {
        rayon::join(
            || source.query(baseline, cancel),
            || source.query(current, cancel),
        )
    });

    // A superseded run must not hand back a partial pair.
    cancel.check()?;
    let collections = WindowCollections {
        baseline: b?,
        current: c?,
    };
    info!(
        source = source.name(),
        baseline = collections.baseline.len(),
        current = collections.current.len(),
        "Fetched scene collections"
    );
    Ok(collections)
}
