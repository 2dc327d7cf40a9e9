//! Per-request results shared by the get and set flows.

use vhal_types::{GetValueResult, SetValueResult, StatusCode};

/// A per-request result the dispatcher can route and synthesize.
pub trait BatchResult: Send + Sync + 'static {
    fn request_id(&self) -> i64;

    fn status(&self) -> StatusCode;

    /// Result carrying only a status, used for validation failures and
    /// timeouts.
    fn from_status(request_id: i64, status: StatusCode) -> Self;
}

impl BatchResult for GetValueResult {
    fn request_id(&self) -> i64 {
        self.request_id
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn from_status(request_id: i64, status: StatusCode) -> Self {
        GetValueResult::error(request_id, status)
    }
}

impl BatchResult for SetValueResult {
    fn request_id(&self) -> i64 {
        self.request_id
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn from_status(request_id: i64, status: StatusCode) -> Self {
        SetValueResult::new(request_id, status)
    }
}
