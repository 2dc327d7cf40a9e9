//! Large payload codec.
//!
//! A batch whose `bincode` encoding exceeds the threshold is carried in a
//! [`SharedMemory`] region with empty `payloads`; smaller batches stay inline.
//! Decoding accepts either shape.

use crate::domain::error::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vhal_types::{LargeParcelable, SharedMemory};

/// Encode `payloads` into shared memory if they exceed `threshold` bytes.
///
/// Returns `None` when the batch is small enough to travel inline.
pub fn to_shared_memory<T: Serialize>(
    payloads: &[T],
    threshold: usize,
) -> Result<Option<SharedMemory>, CodecError> {
    let encoded = bincode::serialize(payloads).map_err(CodecError::Encode)?;
    if encoded.len() <= threshold {
        return Ok(None);
    }
    Ok(Some(SharedMemory::from_bytes(encoded)))
}

/// Wrap `payloads` in the envelope shape their encoded size calls for.
pub fn to_large_parcelable<T: Serialize>(
    payloads: Vec<T>,
    threshold: usize,
) -> Result<LargeParcelable<T>, CodecError> {
    Ok(match to_shared_memory(&payloads, threshold)? {
        Some(memory) => LargeParcelable::shared(memory),
        None => LargeParcelable::inline(payloads),
    })
}

/// Recover the batch from either envelope shape.
pub fn from_large_parcelable<T: DeserializeOwned>(
    batch: LargeParcelable<T>,
) -> Result<Vec<T>, CodecError> {
    match batch.shared_memory {
        None => Ok(batch.payloads),
        Some(memory) => bincode::deserialize(memory.as_bytes()).map_err(CodecError::Decode),
    }
}
