//! Request/reply correlation for the session transport.
//!
//! Outbound commands carry a request id; the matching reply resolves the
//! oneshot channel registered under that id. Requests that never get a
//! reply are dropped from the table when their wait times out, so the
//! table cannot grow without bound.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{TrainerError, TrainerResult};

/// Identifier stamped on an outbound request and echoed in its reply.
pub type RequestId = u64;

/// Pending-request table keyed by request id.
pub struct CorrelationTable<T> {
    pending: Mutex<HashMap<RequestId, oneshot::Sender<T>>>,
    next_id: AtomicU64,
    reply_timeout: Duration,
}

impl<T: Send + 'static> CorrelationTable<T> {
    /// Create a table whose waits give up after `reply_timeout`.
    pub fn new(reply_timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            reply_timeout,
        }
    }

    /// Allocate a request id and register a slot for its reply.
    pub fn register(&self) -> (RequestId, oneshot::Receiver<T>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Deliver a reply to the request it answers. Returns false when no
    /// request is waiting under that id (already timed out, or unsolicited).
    pub fn resolve(&self, id: RequestId, value: T) -> bool {
        let Some(tx) = self.pending.lock().unwrap().remove(&id) else {
            warn!("reply for unknown request id {}", id);
            return false;
        };
        // A receiver dropped between timeout and this send is harmless.
        tx.send(value).is_ok()
    }

    /// Await the reply registered under `id`, giving up after the table's
    /// reply timeout. The pending entry is removed on every exit path.
    pub async fn wait(&self, id: RequestId, reply: oneshot::Receiver<T>) -> TrainerResult<T> {
        match tokio::time::timeout(self.reply_timeout, reply).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                self.cancel(id);
                Err(TrainerError::upstream(format!(
                    "reply channel for request {} closed",
                    id
                )))
            }
            Err(_) => {
                self.cancel(id);
                debug!("request {} timed out after {:?}", id, self.reply_timeout);
                Err(TrainerError::UpstreamTimeout(self.reply_timeout))
            }
        }
    }

    /// Drop a pending request. Returns whether it was still registered.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.pending.lock().unwrap().remove(&id).is_some()
    }

    /// Number of requests still awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}
