//! # Vehicle HAL Types
//!
//! Data model shared between the request dispatcher, hardware backends and
//! clients of the vehicle property service.
//!
//! ## Contents
//!
//! - **Property values**: [`PropertyValue`] and its raw value union.
//! - **Property ids**: the group / area / type bit fields packed into every id.
//! - **Configs**: [`VehiclePropConfig`] with per-area value ranges.
//! - **Requests and results**: get/set requests, their results and [`StatusCode`].
//! - **Batch envelope**: [`LargeParcelable`], carrying a batch either inline or
//!   through a [`SharedMemory`] region.

pub mod config;
pub mod parcelable;
pub mod property;
pub mod request;

pub use config::*;
pub use parcelable::*;
pub use property::*;
pub use request::*;
