//! Request validation against the property config catalog.
//!
//! Structural checks (duplicate ids, duplicate targets) reject a whole batch.
//! Per-value checks reject only the offending entry; it never reaches hardware
//! and resolves with INVALID_ARG.

use super::property_store::PropertyConfigStore;
use std::collections::HashSet;
use std::hash::Hash;
use thiserror::Error;
use vhal_types::{
    is_global_prop, PropertyValue, StatusCode, VehicleAreaConfig, VehiclePropConfig,
    VehiclePropertyType,
};

/// Why a single value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("no config for property {prop:#x}")]
    ConfigNotFound { prop: i32 },

    #[error("payload does not match the declared type of property {prop:#x}")]
    InvalidShape { prop: i32 },

    #[error("area {area_id:#x} is not configured for property {prop:#x}")]
    InvalidArea { prop: i32, area_id: i32 },

    #[error("value for property {prop:#x} area {area_id:#x} is out of range")]
    OutOfRange { prop: i32, area_id: i32 },
}

impl ValueError {
    pub fn status(&self) -> StatusCode {
        StatusCode::InvalidArg
    }
}

/// First item that occurs more than once, if any.
pub fn find_duplicate<T: Eq + Hash + Copy>(items: impl IntoIterator<Item = T>) -> Option<T> {
    let mut seen = HashSet::new();
    items.into_iter().find(|item| !seen.insert(*item))
}

/// Validate the target of a get request.
pub fn validate_get(value: &PropertyValue, store: &PropertyConfigStore) -> Result<(), ValueError> {
    let config = find_config(value, store)?;
    resolve_area(config, value)?;
    Ok(())
}

/// Validate a value about to be written.
pub fn validate_set(value: &PropertyValue, store: &PropertyConfigStore) -> Result<(), ValueError> {
    let config = find_config(value, store)?;
    check_shape(value)?;
    if let Some(area) = resolve_area(config, value)? {
        check_range(area, value)?;
    }
    Ok(())
}

fn find_config<'a>(
    value: &PropertyValue,
    store: &'a PropertyConfigStore,
) -> Result<&'a VehiclePropConfig, ValueError> {
    store
        .get(value.prop)
        .ok_or(ValueError::ConfigNotFound { prop: value.prop })
}

/// Area config the value addresses. A global property has no listed area of
/// its own; it borrows the first area config, if any, for its ranges.
fn resolve_area<'a>(
    config: &'a VehiclePropConfig,
    value: &PropertyValue,
) -> Result<Option<&'a VehicleAreaConfig>, ValueError> {
    let invalid_area = ValueError::InvalidArea {
        prop: value.prop,
        area_id: value.area_id,
    };

    if is_global_prop(value.prop) {
        if value.area_id != 0 {
            return Err(invalid_area);
        }
        return Ok(config.area_configs.first());
    }

    config
        .area_configs
        .iter()
        .find(|area| area.area_id == value.area_id)
        .map(Some)
        .ok_or(invalid_area)
}

fn check_shape(value: &PropertyValue) -> Result<(), ValueError> {
    let raw = &value.value;
    let valid = match VehiclePropertyType::from_prop_id(value.prop) {
        Some(VehiclePropertyType::Boolean | VehiclePropertyType::Int32) => {
            raw.int32_values.len() == 1
        }
        Some(VehiclePropertyType::Int32Vec) => !raw.int32_values.is_empty(),
        Some(VehiclePropertyType::Int64) => raw.int64_values.len() == 1,
        Some(VehiclePropertyType::Int64Vec) => !raw.int64_values.is_empty(),
        Some(VehiclePropertyType::Float) => raw.float_values.len() == 1,
        Some(VehiclePropertyType::FloatVec) => !raw.float_values.is_empty(),
        Some(
            VehiclePropertyType::String | VehiclePropertyType::Bytes | VehiclePropertyType::Mixed,
        ) => true,
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValueError::InvalidShape { prop: value.prop })
    }
}

fn check_range(area: &VehicleAreaConfig, value: &PropertyValue) -> Result<(), ValueError> {
    let raw = &value.value;
    let int32_ok = area.int32_range().map_or(true, |(min, max)| {
        raw.int32_values.iter().all(|v| (min..=max).contains(v))
    });
    let int64_ok = area.int64_range().map_or(true, |(min, max)| {
        raw.int64_values.iter().all(|v| (min..=max).contains(v))
    });
    let float_ok = area.float_range().map_or(true, |(min, max)| {
        raw.float_values.iter().all(|v| (min..=max).contains(v))
    });

    if int32_ok && int64_ok && float_ok {
        Ok(())
    } else {
        Err(ValueError::OutOfRange {
            prop: value.prop,
            area_id: value.area_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhal_types::{area_window, RawPropValues};

    // SYSTEM | GLOBAL | INT32_VEC
    const INT32_VEC_PROP: i32 = 1 + 0x1000_0000 + 0x0100_0000 + 0x0041_0000;
    // SYSTEM | WINDOW | INT32
    const INT32_WINDOW_PROP: i32 = 10001 + 0x1000_0000 + 0x0300_0000 + 0x0040_0000;
    // SYSTEM | GLOBAL | FLOAT
    const FLOAT_PROP: i32 = 2 + 0x1000_0000 + 0x0100_0000 + 0x0060_0000;
    // SYSTEM | GLOBAL | STRING
    const STRING_PROP: i32 = 3 + 0x1000_0000 + 0x0100_0000 + 0x0010_0000;

    fn store() -> PropertyConfigStore {
        PropertyConfigStore::new(vec![
            VehiclePropConfig::new(INT32_VEC_PROP)
                .with_area(VehicleAreaConfig::new(0).with_int32_range(0, 100)),
            VehiclePropConfig::new(INT32_WINDOW_PROP).with_area(
                VehicleAreaConfig::new(area_window::ROW_1_LEFT).with_int32_range(0, 100),
            ),
            VehiclePropConfig::new(FLOAT_PROP)
                .with_area(VehicleAreaConfig::new(0).with_float_range(-1.0, 1.0)),
            VehiclePropConfig::new(STRING_PROP),
        ])
    }

    #[test]
    fn test_find_duplicate() {
        assert_eq!(find_duplicate([1i64, 2, 3]), None);
        assert_eq!(find_duplicate([1i64, 2, 1]), Some(1));
        assert_eq!(find_duplicate([(1, 0), (2, 0), (1, 0)]), Some((1, 0)));
        assert_eq!(find_duplicate(Vec::<i64>::new()), None);
    }

    #[test]
    fn test_valid_set() {
        let value = PropertyValue::new(INT32_VEC_PROP, 0).with_value(RawPropValues::int32s([0, 100]));
        assert_eq!(validate_set(&value, &store()), Ok(()));

        let value = PropertyValue::new(INT32_WINDOW_PROP, area_window::ROW_1_LEFT)
            .with_value(RawPropValues::int32s([42]));
        assert_eq!(validate_set(&value, &store()), Ok(()));
    }

    #[test]
    fn test_config_not_found() {
        let value = PropertyValue::new(0, 0);
        assert_eq!(
            validate_set(&value, &store()),
            Err(ValueError::ConfigNotFound { prop: 0 })
        );
        assert_eq!(
            validate_get(&value, &store()),
            Err(ValueError::ConfigNotFound { prop: 0 })
        );
    }

    #[test]
    fn test_empty_vector_is_invalid_shape() {
        let value = PropertyValue::new(INT32_VEC_PROP, 0);
        assert_eq!(
            validate_set(&value, &store()),
            Err(ValueError::InvalidShape { prop: INT32_VEC_PROP })
        );
    }

    #[test]
    fn test_scalar_needs_exactly_one_value() {
        let value = PropertyValue::new(INT32_WINDOW_PROP, area_window::ROW_1_LEFT)
            .with_value(RawPropValues::int32s([1, 2]));
        assert!(matches!(
            validate_set(&value, &store()),
            Err(ValueError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let value = PropertyValue::new(INT32_VEC_PROP, 0).with_value(RawPropValues::int32s([0, -1]));
        assert!(matches!(
            validate_set(&value, &store()),
            Err(ValueError::OutOfRange { .. })
        ));

        let value = PropertyValue::new(FLOAT_PROP, 0).with_value(RawPropValues::floats([1.5]));
        assert!(matches!(
            validate_set(&value, &store()),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_invalid_area() {
        let value = PropertyValue::new(INT32_WINDOW_PROP, area_window::ROW_1_RIGHT)
            .with_value(RawPropValues::int32s([0]));
        assert_eq!(
            validate_set(&value, &store()),
            Err(ValueError::InvalidArea {
                prop: INT32_WINDOW_PROP,
                area_id: area_window::ROW_1_RIGHT,
            })
        );
    }

    #[test]
    fn test_global_prop_requires_area_zero() {
        let value = PropertyValue::new(INT32_VEC_PROP, 1).with_value(RawPropValues::int32s([0]));
        assert!(matches!(
            validate_set(&value, &store()),
            Err(ValueError::InvalidArea { .. })
        ));
        assert!(validate_get(&PropertyValue::new(INT32_VEC_PROP, 1), &store()).is_err());
    }

    #[test]
    fn test_get_ignores_payload() {
        let value = PropertyValue::new(INT32_VEC_PROP, 0);
        assert_eq!(validate_get(&value, &store()), Ok(()));
    }

    #[test]
    fn test_global_prop_without_area_configs() {
        let value = PropertyValue::new(STRING_PROP, 0);
        assert_eq!(validate_set(&value, &store()), Ok(()));
    }

    #[test]
    fn test_unknown_type_is_invalid_shape() {
        // SYSTEM | GLOBAL | no type bits
        let prop = 4 + 0x1000_0000 + 0x0100_0000;
        let store = PropertyConfigStore::new(vec![VehiclePropConfig::new(prop)]);
        assert!(matches!(
            validate_set(&PropertyValue::new(prop, 0), &store),
            Err(ValueError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_rejections_map_to_invalid_arg() {
        assert_eq!(
            ValueError::ConfigNotFound { prop: 0 }.status(),
            StatusCode::InvalidArg
        );
    }
}
