//! Outbound ports: the hardware backend and the caller's callback.

use crate::domain::batch::BatchResult;
use crate::domain::pending::PendingRequestPool;
use std::sync::Arc;
use vhal_types::{
    GetValueRequest, GetValueResult, GetValueResults, SetValueRequest, SetValueResult,
    SetValueResults, StatusCode, VehiclePropConfig,
};

/// Hardware backend performing the actual property access.
///
/// Submission must not block on hardware latency. Per-request results are
/// handed to the [`ResultSink`] later, from any thread, in any order and in
/// any number of deliveries. An `Err` from a submission call fails the whole
/// batch and nothing may be delivered for it afterwards.
pub trait VehicleHardware: Send + Sync {
    /// Full property config catalog. Read once when the service starts.
    fn get_all_property_configs(&self) -> Vec<VehiclePropConfig>;

    fn get_values(
        &self,
        sink: ResultSink<GetValueResult>,
        requests: Vec<GetValueRequest>,
    ) -> Result<(), StatusCode>;

    fn set_values(
        &self,
        sink: ResultSink<SetValueResult>,
        requests: Vec<SetValueRequest>,
    ) -> Result<(), StatusCode>;
}

/// Caller-supplied callback. Each accepted batch is answered exactly once.
pub trait VehicleCallback: Send + Sync {
    fn on_get_values(&self, results: GetValueResults);

    fn on_set_values(&self, results: SetValueResults);
}

/// Completion handle given to hardware with each submitted batch.
///
/// Results are routed through the pending pool, so a result for a request
/// that already timed out is dropped here.
pub struct ResultSink<R> {
    pool: Arc<PendingRequestPool<R>>,
}

impl<R: BatchResult> ResultSink<R> {
    pub fn new(pool: Arc<PendingRequestPool<R>>) -> Self {
        Self { pool }
    }

    /// Hand results back to the dispatcher.
    pub fn deliver(&self, results: Vec<R>) {
        self.pool.complete(results);
    }
}

impl<R> Clone for ResultSink<R> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}
