//! # Get/Set Requests and Results

use crate::property::PropertyValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single get or set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    /// Hardware did not answer before the request deadline.
    TryAgain = 1,
    /// The request failed structural or semantic validation.
    InvalidArg = 2,
    NotAvailable = 3,
    AccessDenied = 4,
    /// Hardware reported a failure.
    InternalError = 5,
}

impl StatusCode {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Numeric code as carried in service-specific errors.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::TryAgain => "TRY_AGAIN",
            Self::InvalidArg => "INVALID_ARG",
            Self::NotAvailable => "NOT_AVAILABLE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}

/// Request to read one property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueRequest {
    /// Caller-chosen id, unique among pending get requests.
    pub request_id: i64,
    /// Property and area to read. The payload is ignored.
    pub prop: PropertyValue,
}

/// Result of a get request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueResult {
    pub request_id: i64,
    pub status: StatusCode,
    /// Present only when `status` is OK.
    pub prop: Option<PropertyValue>,
}

impl GetValueResult {
    pub fn ok(request_id: i64, prop: PropertyValue) -> Self {
        Self {
            request_id,
            status: StatusCode::Ok,
            prop: Some(prop),
        }
    }

    pub fn error(request_id: i64, status: StatusCode) -> Self {
        Self {
            request_id,
            status,
            prop: None,
        }
    }
}

/// Request to write one property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequest {
    /// Caller-chosen id, unique among pending set requests.
    pub request_id: i64,
    pub value: PropertyValue,
}

/// Result of a set request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueResult {
    pub request_id: i64,
    pub status: StatusCode,
}

impl SetValueResult {
    pub fn new(request_id: i64, status: StatusCode) -> Self {
        Self { request_id, status }
    }
}
