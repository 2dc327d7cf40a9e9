//! # Batch Envelope
//!
//! A batch travels in one of two shapes:
//!
//! - **inline**: `payloads` holds the items and `shared_memory` is `None`;
//! - **out-of-band**: `payloads` is empty and `shared_memory` holds the
//!   serialized batch.
//!
//! Converting between the two is the job of the large-payload codec in the
//! dispatcher crate; this module only defines the shapes.

use crate::config::VehiclePropConfig;
use crate::request::{GetValueRequest, GetValueResult, SetValueRequest, SetValueResult};
use bytes::Bytes;
use std::fmt;

/// Read-only shared memory region holding a serialized batch.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedMemory {
    region: Bytes,
}

impl SharedMemory {
    /// Wrap raw bytes as a shared memory region.
    pub fn from_bytes(region: impl Into<Bytes>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.region
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

impl fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemory")
            .field("len", &self.region.len())
            .finish()
    }
}

/// A batch of items, carried inline or through shared memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LargeParcelable<T> {
    pub payloads: Vec<T>,
    pub shared_memory: Option<SharedMemory>,
}

impl<T> LargeParcelable<T> {
    /// An inline batch.
    pub fn inline(payloads: Vec<T>) -> Self {
        Self {
            payloads,
            shared_memory: None,
        }
    }

    /// An out-of-band batch.
    pub fn shared(shared_memory: SharedMemory) -> Self {
        Self {
            payloads: Vec::new(),
            shared_memory: Some(shared_memory),
        }
    }

    pub fn is_shared(&self) -> bool {
        self.shared_memory.is_some()
    }
}

impl<T> Default for LargeParcelable<T> {
    fn default() -> Self {
        Self::inline(Vec::new())
    }
}

pub type GetValueRequests = LargeParcelable<GetValueRequest>;
pub type SetValueRequests = LargeParcelable<SetValueRequest>;
pub type GetValueResults = LargeParcelable<GetValueResult>;
pub type SetValueResults = LargeParcelable<SetValueResult>;
pub type VehiclePropConfigs = LargeParcelable<VehiclePropConfig>;
