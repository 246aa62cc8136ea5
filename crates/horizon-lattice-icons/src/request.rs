//! Icon requests and their promise/future pair.
//!
//! Every call to [`IconSystem::request`](crate::IconSystem::request) produces an
//! [`IconRequest`] holding a request id and an [`IconFuture`]. The matching
//! [`IconPromise`] travels with the queued request and is resolved exactly once:
//! with the decoded image, or with `None` when the icon is unknown, failed to
//! decode, was cancelled, or the pipeline shut down.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use horizon_lattice_icons::{IconState, IconSystem};
//!
//! let icons = IconSystem::new().unwrap();
//! let mut request = icons.request("Settings", 2.0);
//!
//! // Poll from a render loop...
//! if let IconState::Ready(image) = request.future.state() {
//!     println!("{}x{}", image.width(), image.height());
//! }
//!
//! // ...or block for a bounded time
//! let state = request.future.wait_timeout(Duration::from_millis(50));
//! println!("{state:?}");
//! ```

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};

use crate::icon_image::IconImage;

/// Result delivered to a future: the image, or `None` if it is unavailable.
pub type IconOutcome = Option<Arc<IconImage>>;

/// Cache and lookup key: an icon name at a display scale.
///
/// The scale is stored as its bit pattern so that the key can be hashed.
/// Two requests share a cache entry only when their scales are bit-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconKey {
    name: String,
    scale_bits: u32,
}

impl IconKey {
    /// Create a key for `name` at `display_scale`.
    pub fn new(name: impl Into<String>, display_scale: f32) -> Self {
        // -0.0 and 0.0 compare equal, so they share an entry
        let display_scale = if display_scale == 0.0 { 0.0 } else { display_scale };
        Self {
            name: name.into(),
            scale_bits: display_scale.to_bits(),
        }
    }

    /// The icon name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display scale.
    pub fn display_scale(&self) -> f32 {
        f32::from_bits(self.scale_bits)
    }
}

/// A queued request owned by the pipeline until its promise is resolved.
pub(crate) struct Request {
    pub(crate) id: u64,
    pub(crate) key: IconKey,
    pub(crate) promise: IconPromise,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// The producer half of a request; consumed when resolved.
pub(crate) struct IconPromise {
    sender: Sender<IconOutcome>,
}

impl IconPromise {
    /// Fulfil the request. A future that was already dropped is ignored.
    pub(crate) fn resolve(self, outcome: IconOutcome) {
        let _ = self.sender.send(outcome);
    }
}

/// Create a connected promise and future.
pub(crate) fn promise_pair() -> (IconPromise, IconFuture) {
    let (sender, receiver) = bounded(1);
    (
        IconPromise { sender },
        IconFuture {
            receiver,
            resolved: None,
        },
    )
}

/// State of an [`IconFuture`].
#[derive(Debug, Clone)]
pub enum IconState {
    /// The request is still queued or being decoded.
    Pending,
    /// The icon was decoded.
    Ready(Arc<IconImage>),
    /// The icon is unknown, failed to decode, was cancelled, or the pipeline
    /// shut down.
    Unavailable,
}

impl IconState {
    /// Check if the request has finished, successfully or not.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The consumer half of a request.
///
/// The future resolves exactly once and then keeps reporting that result.
pub struct IconFuture {
    receiver: Receiver<IconOutcome>,
    resolved: Option<IconOutcome>,
}

impl IconFuture {
    /// Get the current state without blocking.
    pub fn state(&mut self) -> IconState {
        self.poll();
        self.current()
    }

    /// Check if the request has finished without blocking.
    pub fn is_ready(&mut self) -> bool {
        self.poll();
        self.resolved.is_some()
    }

    /// Try to get the image without blocking.
    ///
    /// Returns `None` both while pending and when the icon is unavailable; use
    /// [`state`](Self::state) to tell them apart.
    pub fn try_get(&mut self) -> Option<Arc<IconImage>> {
        self.poll();
        self.resolved.clone().flatten()
    }

    /// Block until the request finishes and return the image.
    pub fn wait(self) -> IconOutcome {
        match self.resolved {
            Some(outcome) => outcome,
            None => self.receiver.recv().ok().flatten(),
        }
    }

    /// Block for at most `timeout` and return the resulting state.
    pub fn wait_timeout(&mut self, timeout: Duration) -> IconState {
        if self.resolved.is_none() {
            match self.receiver.recv_timeout(timeout) {
                Ok(outcome) => self.resolved = Some(outcome),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.resolved = Some(None),
            }
        }
        self.current()
    }

    fn poll(&mut self) {
        if self.resolved.is_some() {
            return;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => self.resolved = Some(outcome),
            Err(TryRecvError::Empty) => {}
            // The promise was dropped without being resolved
            Err(TryRecvError::Disconnected) => self.resolved = Some(None),
        }
    }

    fn current(&self) -> IconState {
        match &self.resolved {
            None => IconState::Pending,
            Some(Some(image)) => IconState::Ready(Arc::clone(image)),
            Some(None) => IconState::Unavailable,
        }
    }
}

impl std::fmt::Debug for IconFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconFuture")
            .field("state", &self.current())
            .finish()
    }
}

/// Handle returned by [`IconSystem::request`](crate::IconSystem::request).
#[derive(Debug)]
pub struct IconRequest {
    /// Identifier usable with [`IconSystem::cancel_requests`](crate::IconSystem::cancel_requests).
    pub id: u64,
    /// Future that resolves to the image.
    pub future: IconFuture,
}
