//! Ports to the collaborators around the dispatcher.

pub mod outbound;

pub use outbound::{ResultSink, VehicleCallback, VehicleHardware};
