//! Live client accounting, keyed by callback identity.

use super::request_kind::RequestKind;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Identity of a caller's callback object.
pub type CallbackKey = usize;

/// A batch client as seen by the registry.
pub trait LiveClient: Send + Sync {
    fn kind(&self) -> RequestKind;
}

/// Clients with at least one request outstanding.
///
/// The registry holds the only long-lived strong reference to a client; the
/// pending pool holds weak ones. A client removes itself once it has flushed
/// or been abandoned.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<CallbackKey, HashMap<u64, Arc<dyn LiveClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: CallbackKey, client_id: u64, client: Arc<dyn LiveClient>) {
        trace!(client_id = client_id, kind = %client.kind(), "Registered live client");
        self.clients.entry(key).or_default().insert(client_id, client);
    }

    /// Drop a client. Callbacks left with no clients are forgotten.
    pub fn release(&self, key: CallbackKey, client_id: u64) {
        let removed = self.clients.remove_if_mut(&key, |_, clients| {
            clients.remove(&client_id);
            clients.is_empty()
        });
        if removed.is_some() {
            trace!(client_id = client_id, "Released last client for callback");
        }
    }

    /// Number of live clients across all callbacks.
    pub fn count(&self) -> usize {
        self.clients.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of live clients of one kind.
    pub fn count_kind(&self, kind: RequestKind) -> usize {
        self.clients
            .iter()
            .map(|entry| entry.value().values().filter(|c| c.kind() == kind).count())
            .sum()
    }
}
