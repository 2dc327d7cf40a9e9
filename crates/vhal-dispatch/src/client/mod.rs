//! Connected clients: one per accepted get or set batch.
//!
//! A [`BatchClient`] collects one result per accepted request id from three
//! sources: validation failures recorded up front, hardware results and
//! timeout results routed through the pending pool. When the last result
//! lands it delivers the whole batch to the caller's callback, once.
//!
//! ```text
//!   Created ──start()──► AwaitingResults ──last result──► Flushed
//!      │
//!      └────────abandon()─────────► Abandoned
//! ```
//!
//! Results recorded while `Created` are kept; the flush waits for `start()`,
//! which runs only after the batch has been handed to hardware.

pub mod registry;
pub mod request_kind;

pub use registry::{CallbackKey, ClientRegistry, LiveClient};
pub use request_kind::{BatchRequest, RequestKind};

use crate::codec;
use crate::domain::batch::BatchResult;
use crate::domain::pending::PendingOwner;
use crate::ports::VehicleCallback;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use vhal_types::LargeParcelable;

/// Life cycle of a batch client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// Results may arrive but are not flushed yet.
    Created,
    AwaitingResults,
    /// The callback has been invoked.
    Flushed,
    /// Hardware rejected the batch. No callback will be invoked.
    Abandoned,
}

struct BatchState<R> {
    phase: ClientPhase,
    /// One slot per request, in request order.
    slots: Vec<Option<R>>,
    index: HashMap<i64, usize>,
    unresolved: usize,
}

impl<R> BatchState<R> {
    /// Move to `Flushed` and hand out the results if every slot is filled.
    fn take_if_complete(&mut self) -> Option<Vec<R>> {
        if self.phase != ClientPhase::AwaitingResults || self.unresolved > 0 {
            return None;
        }
        self.phase = ClientPhase::Flushed;
        Some(self.slots.drain(..).flatten().collect())
    }
}

/// Aggregates the results of one batch and flushes them to the callback.
pub struct BatchClient<Q: BatchRequest> {
    id: u64,
    callback: Arc<dyn VehicleCallback>,
    callback_key: CallbackKey,
    threshold: usize,
    registry: Weak<ClientRegistry>,
    state: Mutex<BatchState<Q::Result>>,
}

impl<Q: BatchRequest> BatchClient<Q> {
    /// A client expecting one result for each of `request_ids`.
    pub fn new(
        id: u64,
        callback: Arc<dyn VehicleCallback>,
        request_ids: &[i64],
        threshold: usize,
        registry: Weak<ClientRegistry>,
    ) -> Arc<Self> {
        let index = request_ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect();

        Arc::new(Self {
            id,
            callback_key: callback_key(&callback),
            callback,
            threshold,
            registry,
            state: Mutex::new(BatchState {
                phase: ClientPhase::Created,
                slots: request_ids.iter().map(|_| None).collect(),
                index,
                unresolved: request_ids.len(),
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn callback_key(&self) -> CallbackKey {
        self.callback_key
    }

    pub fn phase(&self) -> ClientPhase {
        self.state.lock().phase
    }

    /// Requests still waiting for a result.
    pub fn unresolved(&self) -> usize {
        self.state.lock().unresolved
    }

    /// Store results. Flushes if this fills the last slot after `start()`.
    ///
    /// Returns the number of results that filled an empty slot.
    pub fn record(&self, results: Vec<Q::Result>) -> usize {
        let mut accepted = 0;
        let complete = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if matches!(state.phase, ClientPhase::Flushed | ClientPhase::Abandoned) {
                debug!(
                    client_id = self.id,
                    phase = ?state.phase,
                    count = results.len(),
                    "Dropping results for finished client"
                );
                return 0;
            }

            for result in results {
                let request_id = result.request_id();
                match state.index.get(&request_id) {
                    Some(&slot) if state.slots[slot].is_none() => {
                        state.slots[slot] = Some(result);
                        state.unresolved -= 1;
                        accepted += 1;
                    }
                    Some(_) => warn!(
                        client_id = self.id,
                        request_id = request_id,
                        "Ignoring second result for request"
                    ),
                    None => warn!(
                        client_id = self.id,
                        request_id = request_id,
                        "Ignoring result for request not in batch"
                    ),
                }
            }
            state.take_if_complete()
        };

        if let Some(results) = complete {
            self.flush(results);
        }
        accepted
    }

    /// The batch has been handed to hardware; allow the flush.
    pub fn start(&self) {
        let complete = {
            let mut state = self.state.lock();
            if state.phase != ClientPhase::Created {
                return;
            }
            state.phase = ClientPhase::AwaitingResults;
            state.take_if_complete()
        };

        if let Some(results) = complete {
            self.flush(results);
        }
    }

    /// Give up on the batch without invoking the callback.
    pub fn abandon(&self) {
        {
            let mut state = self.state.lock();
            if state.phase == ClientPhase::Flushed {
                return;
            }
            state.phase = ClientPhase::Abandoned;
        }
        self.release();
    }

    fn flush(&self, results: Vec<Q::Result>) {
        let count = results.len();
        let batch = match codec::to_shared_memory(&results, self.threshold) {
            Ok(Some(memory)) => LargeParcelable::shared(memory),
            Ok(None) => LargeParcelable::inline(results),
            Err(e) => {
                warn!(
                    client_id = self.id,
                    error = %e,
                    "Failed to encode results, delivering inline"
                );
                LargeParcelable::inline(results)
            }
        };

        debug!(
            client_id = self.id,
            kind = %Q::KIND,
            count = count,
            shared = batch.is_shared(),
            "Flushing batch results"
        );
        Q::deliver(self.callback.as_ref(), batch);
        self.release();
    }

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.release(self.callback_key, self.id);
        }
    }
}

impl<Q: BatchRequest> PendingOwner<Q::Result> for BatchClient<Q> {
    fn on_results(&self, results: Vec<Q::Result>) -> usize {
        self.record(results)
    }
}

impl<Q: BatchRequest> LiveClient for BatchClient<Q> {
    fn kind(&self) -> RequestKind {
        Q::KIND
    }
}

/// Identity of the callback object behind `callback`.
pub fn callback_key(callback: &Arc<dyn VehicleCallback>) -> CallbackKey {
    Arc::as_ptr(callback) as *const () as usize
}
