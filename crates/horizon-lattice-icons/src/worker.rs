//! The background decode thread.
//!
//! One worker runs per [`IconSystem`](crate::IconSystem). It sleeps on a
//! condition variable until a request is queued (or the wait timeout elapses),
//! takes up to `batch_size` requests from the front of the queue and decodes
//! them outside the lock. Every result, including failures, is cached before
//! the request's future is resolved.
//!
//! When the worker stops it marks the queue stopped and resolves whatever is
//! still queued with `None`, so no future is left pending after shutdown.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::config::IconSystemConfig;
use crate::logging::targets;
use crate::lru_cache::LruCache;
use crate::queue::{RequestQueue, resolve_unavailable};
use crate::request::{IconKey, IconOutcome, Request};
use crate::source::IconSource;

/// Everything guarded by the pipeline mutex.
pub(crate) struct PipelineState {
    pub(crate) queue: RequestQueue,
    pub(crate) cache: LruCache<IconKey, IconOutcome>,
}

/// State shared between the facade and the worker thread.
pub(crate) struct WorkerShared<S> {
    pub(crate) source: S,
    pub(crate) state: Mutex<PipelineState>,
    /// Signalled when a request is queued, on resume, and on shutdown.
    pub(crate) wakeup: Condvar,
    pub(crate) running: AtomicBool,
    pub(crate) paused: AtomicBool,
    pub(crate) next_id: AtomicU64,
    pub(crate) config: IconSystemConfig,
}

impl<S: IconSource> WorkerShared<S> {
    pub(crate) fn new(source: S, config: IconSystemConfig) -> Self {
        Self {
            source,
            state: Mutex::new(PipelineState {
                queue: RequestQueue::new(),
                cache: LruCache::new(config.cache_capacity),
            }),
            wakeup: Condvar::new(),
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            config,
        }
    }

    /// Wake every waiter while holding the lock, so the signal cannot slip in
    /// between a waiter's condition check and its sleep.
    pub(crate) fn wake_all(&self) {
        let _guard = self.state.lock();
        self.wakeup.notify_all();
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

/// Start the worker thread.
pub(crate) fn spawn<S: IconSource>(shared: Arc<WorkerShared<S>>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(shared.config.thread_name.clone())
        .spawn(move || worker_loop(&shared))
}

fn worker_loop<S: IconSource>(shared: &WorkerShared<S>) {
    let timeout = shared.config.request_timeout();
    let batch_size = shared.config.effective_batch_size();

    tracing::debug!(
        target: targets::WORKER,
        thread = %shared.config.thread_name,
        batch_size,
        timeout_ms = shared.config.request_timeout_ms,
        "icon worker started"
    );

    while shared.is_running() {
        let batch = {
            let mut state = shared.state.lock();
            shared.wakeup.wait_while_for(
                &mut state,
                |state| shared.is_running() && (shared.is_paused() || state.queue.is_empty()),
                timeout,
            );
            if !shared.is_running() || shared.is_paused() {
                Vec::new()
            } else {
                state.queue.pop_batch(batch_size)
            }
        };

        for request in batch {
            process(shared, request);
        }
    }

    let leftovers = shared.state.lock().queue.stop();
    if !leftovers.is_empty() {
        tracing::debug!(
            target: targets::WORKER,
            count = leftovers.len(),
            "resolving queued requests at shutdown"
        );
    }
    resolve_unavailable(leftovers);

    tracing::debug!(target: targets::WORKER, "icon worker stopped");
}

/// Serve one request: from the cache if another request already produced the
/// result, otherwise by decoding.
fn process<S: IconSource>(shared: &WorkerShared<S>, request: Request) {
    let Request { id, key, promise } = request;

    // The caller already counted this lookup as a miss
    let cached = shared.state.lock().cache.touch(&key);
    let outcome = match cached {
        Some(outcome) => {
            tracing::trace!(target: targets::WORKER, id, name = key.name(), "served from cache");
            outcome
        }
        None => {
            let outcome = decode(&shared.source, id, &key);
            shared.state.lock().cache.add(key, outcome.clone());
            outcome
        }
    };

    promise.resolve(outcome);
}

/// Run the source, turning errors and panics into `None`.
pub(crate) fn decode<S: IconSource>(source: &S, id: u64, key: &IconKey) -> IconOutcome {
    let name = key.name();
    let display_scale = key.display_scale();

    let loaded = panic::catch_unwind(AssertUnwindSafe(|| source.load(name, display_scale)));
    match loaded {
        Ok(Ok(Some(image))) => {
            tracing::debug!(
                target: targets::WORKER,
                id,
                name,
                display_scale,
                width = image.width(),
                height = image.height(),
                "decoded icon"
            );
            Some(Arc::new(image))
        }
        Ok(Ok(None)) => {
            tracing::debug!(target: targets::WORKER, id, name, "unknown icon");
            None
        }
        Ok(Err(err)) => {
            tracing::debug!(
                target: targets::WORKER,
                id,
                name,
                display_scale,
                error = %err,
                "icon decode failed"
            );
            None
        }
        Err(payload) => {
            tracing::warn!(
                target: targets::WORKER,
                id,
                name,
                display_scale,
                panic = panic_message(payload.as_ref()),
                "icon source panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IconError, IconResult};
    use crate::icon_image::IconImage;
    use crate::request::{IconState, promise_pair};
    use std::time::Duration;

    struct ScriptedSource;

    impl IconSource for ScriptedSource {
        fn names(&self) -> Vec<String> {
            vec!["ok".into(), "broken".into(), "panics".into()]
        }

        fn load(&self, name: &str, _display_scale: f32) -> IconResult<Option<IconImage>> {
            match name {
                "ok" => IconImage::solid(3, 3, [0; 4]).map(Some),
                "broken" => Err(IconError::InvalidDimensions {
                    width: 0,
                    height: 0,
                }),
                "panics" => panic!("decoder exploded"),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_decode_outcomes() {
        let ok = decode(&ScriptedSource, 0, &IconKey::new("ok", 1.0));
        assert_eq!(ok.map(|image| image.size()), Some((3, 3)));

        assert!(decode(&ScriptedSource, 1, &IconKey::new("broken", 1.0)).is_none());
        assert!(decode(&ScriptedSource, 2, &IconKey::new("missing", 1.0)).is_none());
        assert!(decode(&ScriptedSource, 3, &IconKey::new("panics", 1.0)).is_none());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_worker_caches_then_stops() {
        let shared = Arc::new(WorkerShared::new(ScriptedSource, IconSystemConfig::default()));
        let handle = spawn(Arc::clone(&shared)).unwrap();

        let (promise, future) = promise_pair();
        shared
            .state
            .lock()
            .queue
            .push(Request {
                id: 0,
                key: IconKey::new("broken", 1.0),
                promise,
            })
            .unwrap();
        shared.wakeup.notify_one();

        assert!(future.wait().is_none());
        assert!(shared.state.lock().cache.contains(&IconKey::new("broken", 1.0)));

        shared.running.store(false, Ordering::Release);
        shared.wake_all();
        handle.join().unwrap();
        assert!(shared.state.lock().queue.is_stopped());
    }

    #[test]
    fn test_paused_worker_resolves_leftovers_on_stop() {
        let shared = Arc::new(WorkerShared::new(ScriptedSource, IconSystemConfig::default()));
        shared.paused.store(true, Ordering::Release);
        let handle = spawn(Arc::clone(&shared)).unwrap();

        let (promise, mut future) = promise_pair();
        shared
            .state
            .lock()
            .queue
            .push(Request {
                id: 0,
                key: IconKey::new("ok", 1.0),
                promise,
            })
            .unwrap();
        shared.wakeup.notify_one();

        // Paused: nothing is taken from the queue
        std::thread::sleep(Duration::from_millis(30));
        assert!(matches!(future.state(), IconState::Pending));
        assert_eq!(shared.state.lock().queue.len(), 1);

        shared.running.store(false, Ordering::Release);
        shared.wake_all();
        handle.join().unwrap();
        assert!(matches!(future.state(), IconState::Unavailable));
    }
}
