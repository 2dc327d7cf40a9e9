//! # Property Configuration
//!
//! Static description of a property: which areas it exists in and, per area,
//! the allowed value range.

use serde::{Deserialize, Serialize};

/// Per-area configuration of a property.
///
/// A `(min, max)` pair of `(0, 0)` means no range is configured for that
/// value kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleAreaConfig {
    pub area_id: i32,
    pub min_int32_value: i32,
    pub max_int32_value: i32,
    pub min_int64_value: i64,
    pub max_int64_value: i64,
    pub min_float_value: f32,
    pub max_float_value: f32,
}

impl VehicleAreaConfig {
    pub fn new(area_id: i32) -> Self {
        Self {
            area_id,
            ..Self::default()
        }
    }

    pub fn with_int32_range(mut self, min: i32, max: i32) -> Self {
        self.min_int32_value = min;
        self.max_int32_value = max;
        self
    }

    pub fn with_int64_range(mut self, min: i64, max: i64) -> Self {
        self.min_int64_value = min;
        self.max_int64_value = max;
        self
    }

    pub fn with_float_range(mut self, min: f32, max: f32) -> Self {
        self.min_float_value = min;
        self.max_float_value = max;
        self
    }

    /// Configured int32 range, if any.
    pub fn int32_range(&self) -> Option<(i32, i32)> {
        (self.min_int32_value != 0 || self.max_int32_value != 0)
            .then_some((self.min_int32_value, self.max_int32_value))
    }

    /// Configured int64 range, if any.
    pub fn int64_range(&self) -> Option<(i64, i64)> {
        (self.min_int64_value != 0 || self.max_int64_value != 0)
            .then_some((self.min_int64_value, self.max_int64_value))
    }

    /// Configured float range, if any.
    pub fn float_range(&self) -> Option<(f32, f32)> {
        (self.min_float_value != 0.0 || self.max_float_value != 0.0)
            .then_some((self.min_float_value, self.max_float_value))
    }
}

/// Configuration of a single property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePropConfig {
    pub prop: i32,
    /// Ordered area configs. Empty for a global property without ranges.
    pub area_configs: Vec<VehicleAreaConfig>,
    /// Property-specific configuration flags.
    pub config_array: Vec<i32>,
    pub config_string: String,
}

impl VehiclePropConfig {
    pub fn new(prop: i32) -> Self {
        Self {
            prop,
            ..Self::default()
        }
    }

    pub fn with_area(mut self, area: VehicleAreaConfig) -> Self {
        self.area_configs.push(area);
        self
    }
}
