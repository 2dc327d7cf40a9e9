//! Read-only property configuration catalog.

use std::collections::HashMap;
use tracing::warn;
use vhal_types::VehiclePropConfig;

/// Property configs indexed by property id, in the order hardware listed them.
#[derive(Debug, Clone, Default)]
pub struct PropertyConfigStore {
    configs: Vec<VehiclePropConfig>,
    by_prop: HashMap<i32, usize>,
}

impl PropertyConfigStore {
    /// Build the catalog. A property listed twice keeps its first config.
    pub fn new(configs: Vec<VehiclePropConfig>) -> Self {
        let mut store = Self {
            configs: Vec::with_capacity(configs.len()),
            by_prop: HashMap::with_capacity(configs.len()),
        };
        for config in configs {
            if store.by_prop.contains_key(&config.prop) {
                warn!(prop = config.prop, "Ignoring duplicate property config");
                continue;
            }
            store.by_prop.insert(config.prop, store.configs.len());
            store.configs.push(config);
        }
        store
    }

    pub fn get(&self, prop: i32) -> Option<&VehiclePropConfig> {
        self.by_prop.get(&prop).map(|&index| &self.configs[index])
    }

    pub fn all(&self) -> &[VehiclePropConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
