use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
    debug,
    error::{AppError, Result},
    management::liked::{CacheKey, CacheSummary, LikedSongsCache},
    spotify::Catalog,
    store::Store,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyInProgress,
}

/// Result of [`ensure_cached`] as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheStatus {
    /// A fresh snapshot existed; nothing was built.
    AlreadyCached {
        #[serde(flatten)]
        summary: CacheSummary,
    },
    /// A new snapshot was built and published.
    Cached {
        #[serde(flatten)]
        summary: CacheSummary,
    },
    /// Another build for the same key is running.
    CachingInProgress { count: usize },
}

/// Tracks which cache keys have a build running and how far along it is.
///
/// The in-progress map has its own mutex, separate from the cache map, and
/// is never held across an await.
#[derive(Default)]
pub struct CachingCoordinator {
    in_progress: Mutex<HashMap<CacheKey, usize>>,
}

impl CachingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_progress(&self) -> MutexGuard<'_, HashMap<CacheKey, usize>> {
        self.in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically marks `key` as building unless it already is.
    pub fn start(&self, key: &CacheKey) -> StartOutcome {
        let mut in_progress = self.in_progress();
        if in_progress.contains_key(key) {
            return StartOutcome::AlreadyInProgress;
        }
        in_progress.insert(key.clone(), 0);
        StartOutcome::Started
    }

    /// Clears the marker for `key`, whether or not it was set.
    pub fn finish(&self, key: &CacheKey) {
        self.in_progress().remove(key);
    }

    /// Like [`CachingCoordinator::start`], but returns a guard that finishes
    /// the build when dropped. The guard owns a handle to the coordinator so
    /// it can move into a spawned task.
    pub fn begin(self: &Arc<Self>, key: &CacheKey) -> Option<BuildGuard> {
        match self.start(key) {
            StartOutcome::Started => Some(BuildGuard {
                coordinator: Arc::clone(self),
                key: key.clone(),
            }),
            StartOutcome::AlreadyInProgress => None,
        }
    }

    /// Records how many songs the running build has cached so far.
    pub fn report(&self, key: &CacheKey, count: usize) {
        if let Some(current) = self.in_progress().get_mut(key) {
            *current = count;
        }
    }

    /// Songs cached so far by the running build, `None` when idle.
    pub fn progress(&self, key: &CacheKey) -> Option<usize> {
        self.in_progress().get(key).copied()
    }

    pub fn is_in_progress(&self, key: &CacheKey) -> bool {
        self.in_progress().contains_key(key)
    }
}

/// Keeps a cache key marked as building for as long as it lives.
pub struct BuildGuard {
    coordinator: Arc<CachingCoordinator>,
    key: CacheKey,
}

impl BuildGuard {
    pub fn report(&self, count: usize) {
        self.coordinator.report(&self.key, count);
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        self.coordinator.finish(&self.key);
    }
}

/// Makes sure a usable snapshot exists for `key`.
///
/// A fresh snapshot short-circuits without touching the in-progress map
/// unless `force` is set. Otherwise a build is started; if one is already
/// running the caller gets its progress instead. A failed build returns the
/// error, releases the key and leaves any previous snapshot in place.
///
/// The build runs on its own task. Dropping the returned future stops the
/// wait, not the build, which still publishes its snapshot.
pub async fn ensure_cached<C>(
    key: &CacheKey,
    cache: &Arc<LikedSongsCache>,
    coordinator: &Arc<CachingCoordinator>,
    catalog: C,
    store: &Arc<Store>,
    force: bool,
) -> Result<CacheStatus>
where
    C: Catalog + Send + Sync + 'static,
{
    if !force {
        if let Some(entry) = cache.get(key) {
            if entry.is_fresh(Utc::now()) {
                debug!("Using fresh liked songs cache for {}", key);
                return Ok(CacheStatus::AlreadyCached {
                    summary: entry.summary(),
                });
            }
        }
    }

    let Some(guard) = coordinator.begin(key) else {
        return Ok(CacheStatus::CachingInProgress {
            count: coordinator.progress(key).unwrap_or(0),
        });
    };

    let key = key.clone();
    let cache = Arc::clone(cache);
    let store = Arc::clone(store);
    let build = tokio::spawn(async move {
        let entry = cache
            .build(&key, &catalog, &store, |count| guard.report(count))
            .await;
        drop(guard);
        entry
    });

    let entry = build
        .await
        .map_err(|err| AppError::RemoteUnavailable(format!("cache build stopped: {}", err)))??;

    Ok(CacheStatus::Cached {
        summary: entry.summary(),
    })
}
