//! FIFO queue of pending icon requests.
//!
//! The queue is not synchronized on its own; the pipeline keeps it next to the
//! cache behind a single mutex. Requests taken out of the queue are resolved by
//! the caller after the lock is released.

use std::collections::VecDeque;

use crate::request::Request;

/// Pending requests plus the stopped flag.
#[derive(Debug, Default)]
pub(crate) struct RequestQueue {
    pending: VecDeque<Request>,
    stopped: bool,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the worker has stopped accepting requests.
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Append a request. Once stopped, the request is handed back.
    pub(crate) fn push(&mut self, request: Request) -> Result<(), Request> {
        if self.stopped {
            return Err(request);
        }
        self.pending.push_back(request);
        Ok(())
    }

    /// Take up to `max` requests from the front.
    pub(crate) fn pop_batch(&mut self, max: usize) -> Vec<Request> {
        let count = max.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    /// Remove every queued request whose id is in `ids`.
    pub(crate) fn cancel(&mut self, ids: &[u64]) -> Vec<Request> {
        if ids.is_empty() {
            return Vec::new();
        }
        let (cancelled, kept): (VecDeque<Request>, VecDeque<Request>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|request| ids.contains(&request.id));
        self.pending = kept;
        cancelled.into_iter().collect()
    }

    /// Remove every queued request.
    pub(crate) fn cancel_all(&mut self) -> Vec<Request> {
        self.pending.drain(..).collect()
    }

    /// Mark the queue stopped and take everything left in it.
    pub(crate) fn stop(&mut self) -> Vec<Request> {
        self.stopped = true;
        self.cancel_all()
    }
}

/// Resolve each request with `None`. Call without holding the pipeline lock.
pub(crate) fn resolve_unavailable(requests: Vec<Request>) {
    for request in requests {
        request.promise.resolve(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{IconFuture, IconKey, IconState, promise_pair};

    fn request(id: u64) -> (Request, IconFuture) {
        let (promise, future) = promise_pair();
        (
            Request {
                id,
                key: IconKey::new(format!("icon{id}"), 1.0),
                promise,
            },
            future,
        )
    }

    fn filled(count: u64) -> (RequestQueue, Vec<IconFuture>) {
        let mut queue = RequestQueue::new();
        let mut futures = Vec::new();
        for id in 0..count {
            let (req, future) = request(id);
            queue.push(req).unwrap();
            futures.push(future);
        }
        (queue, futures)
    }

    #[test]
    fn test_fifo_batches() {
        let (mut queue, _futures) = filled(5);
        assert_eq!(queue.len(), 5);

        let first = queue.pop_batch(1);
        assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0]);

        let rest = queue.pop_batch(10);
        assert_eq!(rest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(queue.is_empty());
        assert!(queue.pop_batch(3).is_empty());
    }

    #[test]
    fn test_cancel_by_id() {
        let (mut queue, _futures) = filled(4);

        let cancelled = queue.cancel(&[1, 3, 99]);
        assert_eq!(cancelled.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

        let kept = queue.pop_batch(10);
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 2]);
        assert!(queue.cancel(&[]).is_empty());
    }

    #[test]
    fn test_cancel_all_resolves_none() {
        let (mut queue, futures) = filled(3);

        resolve_unavailable(queue.cancel_all());
        assert!(queue.is_empty());
        for mut future in futures {
            assert!(matches!(future.state(), IconState::Unavailable));
        }
    }

    #[test]
    fn test_stop_rejects_push() {
        let (mut queue, _futures) = filled(2);

        let drained = queue.stop();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_stopped());

        let (req, _future) = request(7);
        let rejected = queue.push(req).unwrap_err();
        assert_eq!(rejected.id, 7);
        assert!(queue.is_empty());
    }
}
