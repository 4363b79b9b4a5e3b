// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Opaque configuration handle injected into plugins.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON document holding plugin settings, grouped in sections.
///
/// The core stores the handle without interpreting it; concrete plugins read
/// their own options:
///
/// ```ignore
/// let interval: u64 = core.config().option_or("thermostat", "period", 60);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig(Value);

impl PluginConfig {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self)
    }

    pub fn document(&self) -> &Value {
        &self.0
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Option `key` of `section`, if present and of type `T`.
    pub fn option<T: DeserializeOwned>(&self, section: &str, key: &str) -> Option<T> {
        self.section(section)
            .and_then(|section| section.get(key))
            .and_then(|value| T::deserialize(value).ok())
    }

    pub fn option_or<T: DeserializeOwned>(&self, section: &str, key: &str, default: T) -> T {
        self.option(section, key).unwrap_or(default)
    }
}

impl From<Value> for PluginConfig {
    fn from(document: Value) -> Self {
        Self(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_lookup() {
        let config = PluginConfig::new(json!({
            "thermostat": { "period": 30, "name": "hall" }
        }));

        assert_eq!(config.option::<u64>("thermostat", "period"), Some(30));
        assert_eq!(config.option::<String>("thermostat", "name").as_deref(), Some("hall"));
        assert_eq!(config.option::<u64>("thermostat", "missing"), None);
        assert_eq!(config.option::<u64>("other", "period"), None);
    }

    #[test]
    fn test_type_mismatch_falls_back() {
        let config = PluginConfig::new(json!({ "s": { "period": "soon" } }));
        assert_eq!(config.option_or("s", "period", 60u64), 60);
    }

    #[test]
    fn test_from_json_str() {
        let config = PluginConfig::from_json_str(r#"{"a": {"b": true}}"#).unwrap();
        assert_eq!(config.option::<bool>("a", "b"), Some(true));
        assert!(PluginConfig::from_json_str("{").is_err());
    }
}
