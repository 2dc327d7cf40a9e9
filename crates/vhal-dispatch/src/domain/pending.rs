//! Pending Request Pool - in-flight request ids with deadlines.
//!
//! The pool is the single owner of the "is this id still pending" fact. An id
//! leaves the pool exactly once, through one of:
//!
//! 1. `complete()` when hardware delivers a result for it,
//! 2. `sweep_expired()` when its deadline passes (a TRY_AGAIN result is
//!    synthesized),
//! 3. `finish_requests()` when the owner already has a result for it.
//!
//! Each path removes the entry under the pool lock before acting on it, so the
//! path that loses the race finds nothing to remove and does nothing.

use super::batch::BatchResult;
use super::error::PoolError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};
use vhal_types::StatusCode;

/// Receiver of results claimed from the pool.
pub trait PendingOwner<R>: Send + Sync {
    /// Returns how many of `results` the owner kept.
    fn on_results(&self, results: Vec<R>) -> usize;
}

struct PendingEntry<R> {
    owner_id: u64,
    owner: Weak<dyn PendingOwner<R>>,
    deadline: Instant,
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStats {
    /// Ids reserved by `add_requests`.
    pub registered: u64,
    /// Ids claimed by a hardware result.
    pub completed: u64,
    /// Ids claimed by the timeout sweep.
    pub timed_out: u64,
    /// Ids released by `finish_requests`.
    pub finished: u64,
    /// Results that arrived for an id no longer pending.
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct PendingCounters {
    registered: AtomicU64,
    completed: AtomicU64,
    timed_out: AtomicU64,
    finished: AtomicU64,
    discarded: AtomicU64,
}

type Claimed<R> = HashMap<u64, (Weak<dyn PendingOwner<R>>, Vec<R>)>;

/// Pending request pool for one operation kind.
///
/// Get and set requests live in separate pools, so the same id may be pending
/// in both at once.
pub struct PendingRequestPool<R> {
    kind: &'static str,
    pending: Mutex<HashMap<i64, PendingEntry<R>>>,
    timeout_nanos: AtomicU64,
    notify: Arc<Notify>,
    counters: PendingCounters,
}

impl<R: BatchResult> PendingRequestPool<R> {
    pub fn new(kind: &'static str, timeout: Duration) -> Self {
        Self {
            kind,
            pending: Mutex::new(HashMap::new()),
            timeout_nanos: AtomicU64::new(duration_to_nanos(timeout)),
            notify: Arc::new(Notify::new()),
            counters: PendingCounters::default(),
        }
    }

    /// Deadline applied to newly registered requests.
    pub fn timeout(&self) -> Duration {
        Duration::from_nanos(self.timeout_nanos.load(Ordering::Relaxed))
    }

    /// Change the deadline for requests registered from now on.
    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_nanos
            .store(duration_to_nanos(timeout), Ordering::Relaxed);
    }

    /// Reserve `ids` for `owner`.
    ///
    /// All-or-nothing: if any id is already pending, or appears twice in
    /// `ids`, nothing is reserved.
    pub fn add_requests(
        &self,
        owner_id: u64,
        owner: Weak<dyn PendingOwner<R>>,
        ids: &[i64],
    ) -> Result<(), PoolError> {
        let deadline = Instant::now() + self.timeout();
        {
            let mut pending = self.pending.lock();
            let mut seen = HashSet::with_capacity(ids.len());
            if let Some(&duplicate) = ids
                .iter()
                .find(|&&id| pending.contains_key(&id) || !seen.insert(id))
            {
                warn!(
                    kind = self.kind,
                    request_id = duplicate,
                    "Rejected request id already pending"
                );
                return Err(PoolError::DuplicateRequestId(duplicate));
            }

            for &id in ids {
                pending.insert(
                    id,
                    PendingEntry {
                        owner_id,
                        owner: owner.clone(),
                        deadline,
                    },
                );
            }
        }

        self.counters
            .registered
            .fetch_add(ids.len() as u64, Ordering::Relaxed);
        self.notify.notify_one();

        debug!(
            kind = self.kind,
            owner_id = owner_id,
            count = ids.len(),
            "Registered pending requests"
        );
        Ok(())
    }

    /// Release `ids` without delivering anything.
    ///
    /// Ids no longer pending are skipped. Returns the ids actually released.
    pub fn finish_requests(&self, ids: &[i64]) -> Vec<i64> {
        let finished: Vec<i64> = {
            let mut pending = self.pending.lock();
            ids.iter()
                .copied()
                .filter(|id| pending.remove(id).is_some())
                .collect()
        };
        self.counters
            .finished
            .fetch_add(finished.len() as u64, Ordering::Relaxed);
        finished
    }

    /// Claim pending ids for hardware results and hand them to their owners.
    ///
    /// Results for ids that are not pending (timed out, or never registered)
    /// are dropped. Returns the number of results their owners kept.
    pub fn complete(&self, results: Vec<R>) -> usize {
        let mut claimed: Claimed<R> = HashMap::new();
        let mut discarded = 0u64;
        {
            let mut pending = self.pending.lock();
            for result in results {
                let request_id = result.request_id();
                match pending.remove(&request_id) {
                    Some(entry) => {
                        claimed
                            .entry(entry.owner_id)
                            .or_insert_with(|| (entry.owner, Vec::new()))
                            .1
                            .push(result);
                    }
                    None => {
                        discarded += 1;
                        debug!(
                            kind = self.kind,
                            request_id = request_id,
                            "Dropped result for request no longer pending"
                        );
                    }
                }
            }
        }

        if discarded > 0 {
            self.counters
                .discarded
                .fetch_add(discarded, Ordering::Relaxed);
        }
        let delivered = deliver(self.kind, claimed);
        self.counters
            .completed
            .fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Claim every expired id and deliver TRY_AGAIN for it.
    ///
    /// Returns the earliest deadline still pending, if any.
    pub fn sweep_expired(&self) -> Option<Instant> {
        let now = Instant::now();
        let mut expired: Claimed<R> = HashMap::new();
        let mut next_deadline: Option<Instant> = None;
        {
            let mut pending = self.pending.lock();
            pending.retain(|&request_id, entry| {
                if entry.deadline > now {
                    next_deadline = Some(match next_deadline {
                        Some(current) => current.min(entry.deadline),
                        None => entry.deadline,
                    });
                    return true;
                }
                expired
                    .entry(entry.owner_id)
                    .or_insert_with(|| (entry.owner.clone(), Vec::new()))
                    .1
                    .push(R::from_status(request_id, StatusCode::TryAgain));
                false
            });
        }

        if !expired.is_empty() {
            let timed_out = deliver(self.kind, expired);
            self.counters
                .timed_out
                .fetch_add(timed_out as u64, Ordering::Relaxed);
            warn!(
                kind = self.kind,
                count = timed_out,
                "Timed out pending requests"
            );
        }
        next_deadline
    }

    /// Number of ids currently pending.
    pub fn count_pending_requests(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_pending(&self, request_id: i64) -> bool {
        self.pending.lock().contains_key(&request_id)
    }

    pub fn stats(&self) -> PendingStats {
        PendingStats {
            registered: self.counters.registered.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
            finished: self.counters.finished.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    /// Spawn the timeout sweeper on `handle`.
    ///
    /// The sweeper sleeps until the earliest pending deadline, or until a new
    /// registration wakes it. It exits once the pool is dropped and it next
    /// wakes up.
    pub fn spawn_sweeper(self: &Arc<Self>, handle: &Handle) -> JoinHandle<()> {
        let pool = Arc::downgrade(self);
        let notify = Arc::clone(&self.notify);
        let kind = self.kind;

        handle.spawn(async move {
            debug!(kind = kind, "Timeout sweeper started");
            loop {
                let next_deadline = match pool.upgrade() {
                    Some(pool) => pool.sweep_expired(),
                    None => break,
                };

                match next_deadline {
                    Some(deadline) => {
                        tokio::select! {
                            _ = tokio::time::sleep_until(deadline) => {}
                            _ = notify.notified() => {}
                        }
                    }
                    None => notify.notified().await,
                }
            }
            debug!(kind = kind, "Timeout sweeper stopped");
        })
    }
}

fn deliver<R: BatchResult>(kind: &'static str, claimed: Claimed<R>) -> usize {
    let mut delivered = 0;
    for (owner_id, (owner, results)) in claimed {
        match owner.upgrade() {
            Some(owner) => delivered += owner.on_results(results),
            None => trace!(
                kind = kind,
                owner_id = owner_id,
                count = results.len(),
                "Owner gone, dropping results"
            ),
        }
    }
    delivered
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
