//! What differs between the get and set flows.
//!
//! Everything else (dedup, pending registration, timeouts, flush) is shared
//! through [`BatchClient`](super::BatchClient) and the dispatcher.

use crate::domain::batch::BatchResult;
use crate::domain::property_store::PropertyConfigStore;
use crate::domain::validation::{self, ValueError};
use crate::ports::{ResultSink, VehicleCallback, VehicleHardware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use vhal_types::{
    GetValueRequest, GetValueResult, LargeParcelable, SetValueRequest, SetValueResult, StatusCode,
};

/// Operation kind. Each kind has its own request id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Get,
    Set,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request type the dispatcher can batch.
pub trait BatchRequest: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Result: BatchResult + Serialize;

    const KIND: RequestKind;

    fn request_id(&self) -> i64;

    /// `(prop, area_id)` pair the request addresses.
    fn target(&self) -> (i32, i32);

    fn validate(&self, store: &PropertyConfigStore) -> Result<(), ValueError>;

    fn submit(
        hardware: &dyn VehicleHardware,
        sink: ResultSink<Self::Result>,
        requests: Vec<Self>,
    ) -> Result<(), StatusCode>;

    fn deliver(callback: &dyn VehicleCallback, results: LargeParcelable<Self::Result>);
}

impl BatchRequest for GetValueRequest {
    type Result = GetValueResult;

    const KIND: RequestKind = RequestKind::Get;

    fn request_id(&self) -> i64 {
        self.request_id
    }

    fn target(&self) -> (i32, i32) {
        self.prop.target()
    }

    fn validate(&self, store: &PropertyConfigStore) -> Result<(), ValueError> {
        validation::validate_get(&self.prop, store)
    }

    fn submit(
        hardware: &dyn VehicleHardware,
        sink: ResultSink<GetValueResult>,
        requests: Vec<Self>,
    ) -> Result<(), StatusCode> {
        hardware.get_values(sink, requests)
    }

    fn deliver(callback: &dyn VehicleCallback, results: LargeParcelable<GetValueResult>) {
        callback.on_get_values(results);
    }
}

impl BatchRequest for SetValueRequest {
    type Result = SetValueResult;

    const KIND: RequestKind = RequestKind::Set;

    fn request_id(&self) -> i64 {
        self.request_id
    }

    fn target(&self) -> (i32, i32) {
        self.value.target()
    }

    fn validate(&self, store: &PropertyConfigStore) -> Result<(), ValueError> {
        validation::validate_set(&self.value, store)
    }

    fn submit(
        hardware: &dyn VehicleHardware,
        sink: ResultSink<SetValueResult>,
        requests: Vec<Self>,
    ) -> Result<(), StatusCode> {
        hardware.set_values(sink, requests)
    }

    fn deliver(callback: &dyn VehicleCallback, results: LargeParcelable<SetValueResult>) {
        callback.on_set_values(results);
    }
}
