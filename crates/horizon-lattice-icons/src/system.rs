//! The icon request pipeline.
//!
//! [`IconSystem`] is the entry point of the crate. It owns a bounded cache of
//! decoded icons, a FIFO queue of pending requests and one worker thread that
//! decodes queued requests in the background.
//!
//! # Example
//!
//! ```no_run
//! use horizon_lattice_icons::IconSystem;
//!
//! let icons = IconSystem::new()?;
//!
//! // Asynchronous: returns immediately
//! let request = icons.request("Settings", 2.0);
//!
//! // Blocking: waits for the worker (or hits the cache)
//! let image = icons.get("Close", 1.0);
//! assert!(image.is_some());
//!
//! let settings = request.future.wait().unwrap();
//! assert_eq!(settings.size(), (32, 32));
//! # Ok::<(), horizon_lattice_icons::IconError>(())
//! ```
//!
//! # Cancellation
//!
//! Requests that are still queued can be cancelled by id. Their futures
//! resolve to `None`. A request the worker has already started always runs to
//! completion.
//!
//! # Shutdown
//!
//! Dropping the system (or calling [`IconSystem::shutdown`]) stops and joins
//! the worker. Every request still queued resolves to `None`, and requests
//! made afterwards resolve to `None` immediately.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::config::IconSystemConfig;
use crate::error::IconResult;
use crate::icon_image::IconImage;
use crate::logging::targets;
use crate::lru_cache::CacheStats;
use crate::queue::resolve_unavailable;
use crate::request::{IconKey, IconRequest, Request, promise_pair};
use crate::source::{IconSource, VectorIconSource};
use crate::worker::{self, WorkerShared};

/// Asynchronous icon loader with a shared LRU cache.
///
/// All methods take `&self`; the system can be shared between threads behind
/// an `Arc`.
pub struct IconSystem<S: IconSource = VectorIconSource> {
    shared: Arc<WorkerShared<S>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IconSystem<VectorIconSource> {
    /// Create a system serving the built-in icon set with default settings.
    ///
    /// # Errors
    ///
    /// Fails only if the worker thread cannot be spawned.
    pub fn new() -> IconResult<Self> {
        Self::with_config(IconSystemConfig::default())
    }

    /// Create a system serving the built-in icon set.
    pub fn with_config(config: IconSystemConfig) -> IconResult<Self> {
        Self::with_source(VectorIconSource::builtin(), config)
    }

    /// Register or replace a vector icon.
    ///
    /// Images already cached for `name` are kept; call
    /// [`clear_cache`](Self::clear_cache) to have the new data picked up at
    /// every scale.
    pub fn add(&self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.shared.source.add(name, data);
    }
}

impl<S: IconSource> IconSystem<S> {
    /// Create a system serving `source` and start its worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::WorkerSpawn`](crate::IconError::WorkerSpawn) if the
    /// worker thread cannot be spawned.
    pub fn with_source(source: S, config: IconSystemConfig) -> IconResult<Self> {
        let shared = Arc::new(WorkerShared::new(source, config));
        let handle = worker::spawn(Arc::clone(&shared))?;

        tracing::info!(
            target: targets::ICONS,
            capacity = shared.config.cache_capacity,
            icons = shared.source.names().len(),
            "icon system started"
        );

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// The icon source.
    pub fn source(&self) -> &S {
        &self.shared.source
    }

    /// The configuration the system was created with.
    pub fn config(&self) -> &IconSystemConfig {
        &self.shared.config
    }

    /// Load an icon, blocking until it is available.
    ///
    /// Returns `None` if the icon is unknown or cannot be decoded.
    pub fn get(&self, name: &str, display_scale: f32) -> Option<Arc<IconImage>> {
        self.request(name, display_scale).future.wait()
    }

    /// Request an icon without blocking.
    ///
    /// A cached result resolves the returned future immediately. Otherwise the
    /// request is queued for the worker. Ids increase by one per call.
    pub fn request(&self, name: &str, display_scale: f32) -> IconRequest {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let key = IconKey::new(name, display_scale);
        let (promise, future) = promise_pair();

        let mut state = self.shared.state.lock();
        let cached = state.cache.get(&key);
        if let Some(outcome) = cached {
            drop(state);
            tracing::trace!(target: targets::SYSTEM, id, name, display_scale, "cache hit");
            promise.resolve(outcome);
            return IconRequest { id, future };
        }

        let queued = state.queue.push(Request { id, key, promise });
        let pending = state.queue.len();
        drop(state);

        match queued {
            Ok(()) => {
                tracing::trace!(
                    target: targets::SYSTEM,
                    id,
                    name,
                    display_scale,
                    pending,
                    "queued icon request"
                );
                self.shared.wakeup.notify_one();
            }
            Err(rejected) => {
                tracing::debug!(
                    target: targets::SYSTEM,
                    id,
                    name,
                    "icon requested after shutdown"
                );
                rejected.promise.resolve(None);
            }
        }

        IconRequest { id, future }
    }

    /// Cancel queued requests by id.
    ///
    /// Cancelled futures resolve to `None`. Unknown ids and requests already
    /// being decoded are ignored. Returns the number of requests cancelled.
    pub fn cancel_requests(&self, ids: &[u64]) -> usize {
        let cancelled = self.shared.state.lock().queue.cancel(ids);
        self.finish_cancel(cancelled)
    }

    /// Cancel every queued request. Returns the number cancelled.
    pub fn cancel_all_requests(&self) -> usize {
        let cancelled = self.shared.state.lock().queue.cancel_all();
        self.finish_cancel(cancelled)
    }

    fn finish_cancel(&self, cancelled: Vec<Request>) -> usize {
        let count = cancelled.len();
        if count > 0 {
            tracing::debug!(target: targets::SYSTEM, count, "cancelled icon requests");
        }
        resolve_unavailable(cancelled);
        count
    }

    /// Names of every icon the source can load, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.shared.source.names();
        names.sort();
        names
    }

    /// Number of cached results.
    pub fn cache_size(&self) -> usize {
        self.shared.state.lock().cache.len()
    }

    /// How full the cache is, from 0.0 to 100.0.
    pub fn cache_percentage(&self) -> f32 {
        self.shared.state.lock().cache.percentage()
    }

    /// Snapshot of the cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.shared.state.lock().cache.stats()
    }

    /// Drop every cached result, successful or not.
    pub fn clear_cache(&self) {
        self.shared.state.lock().cache.clear();
        tracing::debug!(target: targets::SYSTEM, "icon cache cleared");
    }

    /// Number of requests waiting for the worker.
    pub fn pending_requests(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Stop the worker from taking new requests off the queue.
    ///
    /// Requests keep queueing up and stay cancellable until
    /// [`resume`](Self::resume) is called. Shutdown still works while paused.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
    }

    /// Let a paused worker continue.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        self.shared.wake_all();
    }

    /// Check if the worker is paused.
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Check if the worker is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Queued requests resolve to `None`. Calling this more than once is a
    /// no-op.
    pub fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };

        self.shared.running.store(false, Ordering::Release);
        self.shared.wake_all();

        if handle.join().is_err() {
            tracing::warn!(target: targets::SYSTEM, "icon worker panicked");
            resolve_unavailable(self.shared.state.lock().queue.stop());
        }

        tracing::info!(target: targets::ICONS, "icon system stopped");
    }
}

impl<S: IconSource> Drop for IconSystem<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: IconSource> std::fmt::Debug for IconSystem<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("IconSystem")
            .field("running", &self.is_running())
            .field("stopped", &state.queue.is_stopped())
            .field("pending", &state.queue.len())
            .field("cache", &state.cache)
            .finish_non_exhaustive()
    }
}
