//! Vehicle HAL request dispatch.
//!
//! Batched get/set access to vehicle properties on top of an asynchronous
//! hardware backend, with per-request timeouts.
//!
//! # Architecture
//!
//! ```text
//!   caller ──get_values / set_values──► DefaultVehicleHal
//!                                          │ decode batch (inline or shared memory)
//!                                          │ reject duplicate ids / targets
//!                                          │ validate each value
//!                                          ▼
//!                                     BatchClient ◄──────────────┐
//!                                          │ reserve ids          │ results
//!                                          ▼                      │
//!                                  PendingRequestPool ────────────┤
//!                                     ▲          │ deadline       │
//!                        ResultSink   │          └─► TRY_AGAIN ───┘
//!                                     │
//!                                  VehicleHardware
//! ```
//!
//! Every accepted request id resolves exactly once: with a validation error,
//! a hardware result or TRY_AGAIN. The pool decides the race between hardware
//! and the timeout by removing the id under its lock; whoever removes it
//! delivers, the other side finds nothing.
//!
//! # Usage
//!
//! ```ignore
//! use vhal_dispatch::{DefaultVehicleHal, VhalConfig};
//!
//! let vhal = DefaultVehicleHal::with_config(hardware, VhalConfig::from_env())?;
//! vhal.get_values(&callback, requests)?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod codec;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;

pub use client::{BatchClient, BatchRequest, ClientPhase, RequestKind};
pub use domain::{
    CodecError, ConfigError, PendingRequestPool, PendingStats, PoolError, VhalConfig, VhalError,
    VhalResult,
};
pub use ports::{ResultSink, VehicleCallback, VehicleHardware};
pub use service::DefaultVehicleHal;
pub use telemetry::{init_tracing, TracingConfig};
