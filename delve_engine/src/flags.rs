//! Session-wide flag store read and written by level scripts.

use std::collections::HashMap;

use delve_data::FlagValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagStore {
    values: HashMap<String, FlagValue>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a flag, falling back to the caller's default when it was never set.
    pub fn get(&self, name: &str, default: &FlagValue) -> FlagValue {
        self.values.get(name).cloned().unwrap_or_else(|| default.clone())
    }

    pub fn set(&mut self, name: impl Into<String>, value: FlagValue) {
        self.values.insert(name.into(), value);
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(FlagValue::is_truthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_read_the_default() {
        let flags = FlagStore::new();
        assert_eq!(flags.get("door_open", &FlagValue::Int(4)), FlagValue::Int(4));
        assert!(!flags.is_set("door_open"));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut flags = FlagStore::new();
        flags.set("visits", FlagValue::Int(1));
        flags.set("visits", FlagValue::Int(2));
        assert_eq!(flags.get("visits", &FlagValue::default()), FlagValue::Int(2));
        assert!(flags.is_set("visits"));
    }
}
