use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rustc_hash::FxHashMap;

use super::import::import_scene;
use super::source::AssetSource;
use crate::error::AssetError;
use crate::scene::SceneGraph;

/// Where fetch-and-parse work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One named thread per fetch; `request` returns immediately.
    Background,
    /// Inside `request`, before it returns.
    Inline,
}

/// Observable state of one cache entry.
#[derive(Debug, Clone)]
pub enum AssetStatus {
    /// Never requested.
    Missing,
    /// Fetch in flight.
    Pending,
    /// Parsed and cached.
    Ready(Arc<SceneGraph>),
    /// Fetch or parse failed; stays failed until [`AssetCache::retry`].
    Failed(AssetError),
}

impl AssetStatus {
    /// Whether the entry holds a scene.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Ready(Arc<SceneGraph>),
    Failed(AssetError),
}

impl From<&Slot> for AssetStatus {
    fn from(slot: &Slot) -> Self {
        match slot {
            Slot::Pending => Self::Pending,
            Slot::Ready(scene) => Self::Ready(Arc::clone(scene)),
            Slot::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

struct Shared {
    source: Arc<dyn AssetSource>,
    mode: LoadMode,
    slots: Mutex<FxHashMap<String, Slot>>,
    settled: Condvar,
    fetches: AtomicUsize,
}

impl Shared {
    fn slots(&self) -> MutexGuard<'_, FxHashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, path: &str) {
        log::debug!("fetching asset {path}");
        let result = self
            .source
            .fetch(path)
            .and_then(|bytes| import_scene(path, &bytes));
        let slot = match result {
            Ok(scene) => {
                log::info!("asset ready: {path}");
                Slot::Ready(Arc::new(scene))
            }
            Err(e) => {
                log::error!("asset failed: {e}");
                Slot::Failed(e)
            }
        };
        let _ = self.slots().insert(path.to_owned(), slot);
        self.settled.notify_all();
    }
}

/// Process-wide, path-keyed cache of parsed model scenes.
///
/// Cloning the cache clones a handle; all clones share the same entries.
/// Concurrent requests for one path coalesce into a single fetch. Entries
/// are never evicted, and cached scenes are immutable: consumers take a
/// [`crate::scene::display_copy`] before tweaking anything.
#[derive(Clone)]
pub struct AssetCache {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("mode", &self.shared.mode)
            .field("entries", &self.shared.slots().len())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}

impl AssetCache {
    /// Create a cache reading from `source`.
    #[must_use]
    pub fn new(source: impl AssetSource + 'static, mode: LoadMode) -> Self {
        Self {
            shared: Arc::new(Shared {
                source: Arc::new(source),
                mode,
                slots: Mutex::new(FxHashMap::default()),
                settled: Condvar::new(),
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Ensure `path` is loaded or loading and report its status.
    ///
    /// Only the first request for a path starts a fetch; later requests see
    /// `Pending`, `Ready` or `Failed`.
    pub fn request(&self, path: &str) -> AssetStatus {
        {
            let mut slots = self.shared.slots();
            if let Some(slot) = slots.get(path) {
                return AssetStatus::from(slot);
            }
            let _ = slots.insert(path.to_owned(), Slot::Pending);
        }
        self.start(path);
        self.status(path)
    }

    /// Request every path up front.
    pub fn preload<S: AsRef<str>>(&self, paths: &[S]) {
        for path in paths {
            let _ = self.request(path.as_ref());
        }
    }

    /// Current status without starting a fetch.
    #[must_use]
    pub fn status(&self, path: &str) -> AssetStatus {
        self.shared
            .slots()
            .get(path)
            .map_or(AssetStatus::Missing, AssetStatus::from)
    }

    /// The cached scene, if resolved.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<SceneGraph>> {
        match self.shared.slots().get(path) {
            Some(Slot::Ready(scene)) => Some(Arc::clone(scene)),
            _ => None,
        }
    }

    /// Block until `path` settles or `timeout` elapses.
    ///
    /// Returns `None` on timeout or when the path was never requested.
    #[must_use]
    pub fn wait(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Option<Result<Arc<SceneGraph>, AssetError>> {
        let slots = self.shared.slots();
        let (slots, _) = self
            .shared
            .settled
            .wait_timeout_while(slots, timeout, |s| {
                matches!(s.get(path), Some(Slot::Pending))
            })
            .unwrap_or_else(PoisonError::into_inner);
        match slots.get(path)? {
            Slot::Pending => None,
            Slot::Ready(scene) => Some(Ok(Arc::clone(scene))),
            Slot::Failed(e) => Some(Err(e.clone())),
        }
    }

    /// Restart a failed fetch. Returns whether a new fetch was started.
    ///
    /// Nothing retries on its own; failed sections keep their placeholder
    /// until a host calls this.
    pub fn retry(&self, path: &str) -> bool {
        {
            let mut slots = self.shared.slots();
            match slots.get_mut(path) {
                Some(slot) if matches!(slot, Slot::Failed(_)) => *slot = Slot::Pending,
                _ => return false,
            }
        }
        log::info!("retrying asset {path}");
        self.start(path);
        true
    }

    /// Number of fetches started since creation.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.shared.fetches.load(Ordering::Relaxed)
    }

    fn start(&self, path: &str) {
        let _ = self.shared.fetches.fetch_add(1, Ordering::Relaxed);
        match self.shared.mode {
            LoadMode::Inline => self.shared.load(path),
            LoadMode::Background => {
                let shared = Arc::clone(&self.shared);
                let owned = path.to_owned();
                let spawned = std::thread::Builder::new()
                    .name("asset-loader".to_owned())
                    .spawn(move || shared.load(&owned));
                if let Err(e) = spawned {
                    log::error!("failed to spawn asset loader for {path}: {e}");
                    let failed = Slot::Failed(AssetError::LoaderSpawn(Arc::new(e)));
                    let _ = self.shared.slots().insert(path.to_owned(), failed);
                    self.shared.settled.notify_all();
                }
            }
        }
    }
}
