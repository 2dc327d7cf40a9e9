//! # Property Values and Property Ids
//!
//! Every property id packs three bit fields:
//!
//! ```text
//!  31      28 27     24 23            16 15                 0
//! ┌──────────┬─────────┬────────────────┬────────────────────┐
//! │  group   │  area   │   value type   │     unique id      │
//! └──────────┴─────────┴────────────────┴────────────────────┘
//! ```
//!
//! The declared value type of a property is read from its id, never from a
//! separate catalog entry.

use serde::{Deserialize, Serialize};

/// Mask selecting the property group bits.
pub const PROPERTY_GROUP_MASK: i32 = 0xf000_0000_u32 as i32;
/// Mask selecting the area type bits.
pub const AREA_TYPE_MASK: i32 = 0x0f00_0000;
/// Mask selecting the value type bits.
pub const PROPERTY_TYPE_MASK: i32 = 0x00ff_0000;

/// Property group (system-defined or vendor-defined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VehiclePropertyGroup {
    System = 0x1000_0000,
    Vendor = 0x2000_0000,
}

/// Kind of area a property is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VehicleArea {
    Global = 0x0100_0000,
    Window = 0x0300_0000,
    Mirror = 0x0400_0000,
    Seat = 0x0500_0000,
    Door = 0x0600_0000,
    Wheel = 0x0700_0000,
}

impl VehicleArea {
    /// Decode the area type from a property id.
    pub fn from_prop_id(prop: i32) -> Option<Self> {
        match prop & AREA_TYPE_MASK {
            0x0100_0000 => Some(Self::Global),
            0x0300_0000 => Some(Self::Window),
            0x0400_0000 => Some(Self::Mirror),
            0x0500_0000 => Some(Self::Seat),
            0x0600_0000 => Some(Self::Door),
            0x0700_0000 => Some(Self::Wheel),
            _ => None,
        }
    }
}

/// Window area ids used by window-scoped properties.
pub mod area_window {
    pub const FRONT_WINDSHIELD: i32 = 0x10;
    pub const REAR_WINDSHIELD: i32 = 0x20;
    pub const ROW_1_LEFT: i32 = 0x1;
    pub const ROW_1_RIGHT: i32 = 0x4;
    pub const ROW_2_LEFT: i32 = 0x100;
    pub const ROW_2_RIGHT: i32 = 0x400;
}

/// Declared value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VehiclePropertyType {
    String = 0x0010_0000,
    Boolean = 0x0020_0000,
    Int32 = 0x0040_0000,
    Int32Vec = 0x0041_0000,
    Int64 = 0x0050_0000,
    Int64Vec = 0x0051_0000,
    Float = 0x0060_0000,
    FloatVec = 0x0061_0000,
    Bytes = 0x0070_0000,
    Mixed = 0x00e0_0000,
}

impl VehiclePropertyType {
    /// Decode the value type from a property id.
    ///
    /// Returns `None` for an id whose type bits name no known type.
    pub fn from_prop_id(prop: i32) -> Option<Self> {
        match prop & PROPERTY_TYPE_MASK {
            0x0010_0000 => Some(Self::String),
            0x0020_0000 => Some(Self::Boolean),
            0x0040_0000 => Some(Self::Int32),
            0x0041_0000 => Some(Self::Int32Vec),
            0x0050_0000 => Some(Self::Int64),
            0x0051_0000 => Some(Self::Int64Vec),
            0x0060_0000 => Some(Self::Float),
            0x0061_0000 => Some(Self::FloatVec),
            0x0070_0000 => Some(Self::Bytes),
            0x00e0_0000 => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Whether the property applies to the whole vehicle rather than to areas.
pub fn is_global_prop(prop: i32) -> bool {
    VehicleArea::from_prop_id(prop) == Some(VehicleArea::Global)
}

/// Availability of a property value as reported by hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[default]
    Available,
    Unavailable,
    Error,
}

/// Raw value storage. Which fields are meaningful depends on the property type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPropValues {
    pub int32_values: Vec<i32>,
    pub float_values: Vec<f32>,
    pub int64_values: Vec<i64>,
    pub byte_values: Vec<u8>,
    pub string_value: String,
}

impl RawPropValues {
    /// Values holding only int32 entries.
    pub fn int32s(values: impl Into<Vec<i32>>) -> Self {
        Self {
            int32_values: values.into(),
            ..Self::default()
        }
    }

    /// Values holding only int64 entries.
    pub fn int64s(values: impl Into<Vec<i64>>) -> Self {
        Self {
            int64_values: values.into(),
            ..Self::default()
        }
    }

    /// Values holding only float entries.
    pub fn floats(values: impl Into<Vec<f32>>) -> Self {
        Self {
            float_values: values.into(),
            ..Self::default()
        }
    }
}

/// A property value: which property, which area, and the value itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Elapsed-realtime nanoseconds when the value was sampled.
    pub timestamp: i64,
    /// Area id; 0 for global properties.
    pub area_id: i32,
    pub prop: i32,
    pub status: PropertyStatus,
    pub value: RawPropValues,
}

impl PropertyValue {
    /// A value that names a property and area but carries no payload.
    pub fn new(prop: i32, area_id: i32) -> Self {
        Self {
            prop,
            area_id,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: RawPropValues) -> Self {
        self.value = value;
        self
    }

    /// The `(prop, area_id)` pair this value addresses.
    pub fn target(&self) -> (i32, i32) {
        (self.prop, self.area_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // VehiclePropertyGroup:SYSTEM, VehicleArea:WINDOW, VehiclePropertyType:INT32
    const INT32_WINDOW_PROP: i32 = 10001 + 0x1000_0000 + 0x0300_0000 + 0x0040_0000;
    // VehiclePropertyGroup:SYSTEM, VehicleArea:GLOBAL, VehiclePropertyType:INT32_VEC
    const INT32_VEC_GLOBAL_PROP: i32 = 7 + 0x1000_0000 + 0x0100_0000 + 0x0041_0000;

    #[test]
    fn test_decode_property_type() {
        assert_eq!(
            VehiclePropertyType::from_prop_id(INT32_WINDOW_PROP),
            Some(VehiclePropertyType::Int32)
        );
        assert_eq!(
            VehiclePropertyType::from_prop_id(INT32_VEC_GLOBAL_PROP),
            Some(VehiclePropertyType::Int32Vec)
        );
        assert_eq!(VehiclePropertyType::from_prop_id(0), None);
    }

    #[test]
    fn test_decode_area_type() {
        assert_eq!(
            VehicleArea::from_prop_id(INT32_WINDOW_PROP),
            Some(VehicleArea::Window)
        );
        assert!(is_global_prop(INT32_VEC_GLOBAL_PROP));
        assert!(!is_global_prop(INT32_WINDOW_PROP));
        assert!(!is_global_prop(0));
    }

    #[test]
    fn test_group_mask_covers_vendor_bit() {
        let vendor_prop = 1 + VehiclePropertyGroup::Vendor as i32 + 0x0100_0000;
        assert_eq!(
            vendor_prop & PROPERTY_GROUP_MASK,
            VehiclePropertyGroup::Vendor as i32
        );
    }

    #[test]
    fn test_target_pairs_prop_and_area() {
        let value = PropertyValue::new(INT32_WINDOW_PROP, area_window::ROW_1_LEFT)
            .with_value(RawPropValues::int32s([3]));
        assert_eq!(value.target(), (INT32_WINDOW_PROP, area_window::ROW_1_LEFT));
        assert_eq!(value.value.int32_values, vec![3]);
    }
}
