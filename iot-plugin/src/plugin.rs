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

//! The [`Plugin`] trait: lifecycle and dispatch hooks a device implements.

use log::{debug, warn};

use crate::device::PluginCore;
use crate::topic::compose_log;
use crate::vocab::{Category, Measure, Token, TokenInput, WireToken};

/// A device plugin.
///
/// Only [`Plugin::core`] and [`Plugin::begin`] are mandatory; every dispatch
/// hook defaults to a no-op. Hooks carry no memory between calls beyond what
/// the plugin records in its registry.
pub trait Plugin: Send + Sync {
    /// Plugin-local parameter vocabulary.
    type Parameter: Token;

    fn core(&self) -> &PluginCore<Self::Parameter>;

    fn did(&self) -> &str {
        self.core().did()
    }

    /// Called once before any dispatch. Implementations seed their registry
    /// and finish with `self.core().activate()`.
    fn begin(&self) -> anyhow::Result<()>;

    /// Called once at shutdown.
    fn finish(&self) {
        self.core().deactivate();
    }

    /// Command addressed to this plugin's own device id.
    fn on_own_command(
        &self,
        _value: &str,
        _parameter: Option<Self::Parameter>,
        _measure: Option<Measure>,
    ) {
    }

    /// Command addressed to another device.
    fn on_command(
        &self,
        _value: &str,
        _parameter: Option<Self::Parameter>,
        _measure: Option<Measure>,
        _source: &str,
    ) {
    }

    /// Status announced by another device.
    fn on_status(
        &self,
        _value: &str,
        _parameter: Option<Self::Parameter>,
        _measure: Option<Measure>,
        _source: &str,
    ) {
    }

    /// Data announced by another device.
    fn on_data(
        &self,
        _value: &str,
        _parameter: Option<Self::Parameter>,
        _measure: Option<Measure>,
        _source: &str,
    ) {
    }
}

/// An inbound message already split into typed topic segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound<P> {
    pub device_id: String,
    pub category: Category,
    pub parameter: Option<P>,
    pub measure: Option<Measure>,
    pub value: String,
}

/// Invoke the hook matching `inbound` on `plugin`.
///
/// Returns `false` when nothing was dispatched: the plugin is not active, or
/// the message is the plugin's own state/data echo.
pub fn dispatch<T: Plugin + ?Sized>(plugin: &T, inbound: &Inbound<T::Parameter>) -> bool {
    let did = plugin.did();
    if !plugin.core().is_active() {
        warn!("[{did}] Plugin not active, dropping message from {}", inbound.device_id);
        return false;
    }

    let own = inbound.device_id == did;
    if own && inbound.category != Category::Command {
        return false;
    }

    if let Ok(line) = compose_log(
        &inbound.value,
        inbound.category,
        inbound.parameter.as_ref().map(|p| p as &dyn WireToken),
        inbound.measure.map(TokenInput::Typed),
    ) {
        debug!("[{did}] From {}: {line}", inbound.device_id);
    }

    let value = inbound.value.as_str();
    let source = inbound.device_id.as_str();
    match inbound.category {
        Category::Command if own => {
            plugin.on_own_command(value, inbound.parameter, inbound.measure)
        }
        Category::Command => plugin.on_command(value, inbound.parameter, inbound.measure, source),
        Category::Status => plugin.on_status(value, inbound.parameter, inbound.measure, source),
        Category::Data => plugin.on_data(value, inbound.parameter, inbound.measure, source),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use strum::{EnumIter, IntoStaticStr};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
    enum Param {
        #[strum(serialize = "temp")]
        Temp,
    }

    impl Token for Param {
        const KIND: &'static str = "parameter";
    }

    struct Recorder {
        core: PluginCore<Param>,
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                core: PluginCore::new("me"),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Plugin for Recorder {
        type Parameter = Param;

        fn core(&self) -> &PluginCore<Param> {
            &self.core
        }

        fn begin(&self) -> anyhow::Result<()> {
            self.core.activate();
            Ok(())
        }

        fn on_own_command(
            &self,
            value: &str,
            _parameter: Option<Param>,
            _measure: Option<Measure>,
        ) {
            self.record(format!("own:{value}"));
        }

        fn on_command(&self, value: &str, _p: Option<Param>, _m: Option<Measure>, source: &str) {
            self.record(format!("cmd:{source}:{value}"));
        }

        fn on_status(&self, value: &str, p: Option<Param>, m: Option<Measure>, source: &str) {
            self.record(format!("status:{source}:{value}:{p:?}:{m:?}"));
        }
    }

    fn inbound(device_id: &str, category: Category, value: &str) -> Inbound<Param> {
        Inbound {
            device_id: device_id.into(),
            category,
            parameter: None,
            measure: None,
            value: value.into(),
        }
    }

    #[test]
    fn test_inactive_plugin_gets_nothing() {
        let plugin = Recorder::new();
        assert!(!dispatch(&plugin, &inbound("me", Category::Command, "RESET")));
        assert!(plugin.calls().is_empty());
    }

    #[test]
    fn test_routes_by_category_and_source() {
        let plugin = Recorder::new();
        plugin.begin().unwrap();

        assert!(dispatch(&plugin, &inbound("me", Category::Command, "RESET")));
        assert!(dispatch(&plugin, &inbound("lamp", Category::Command, "ON")));

        let mut status = inbound("lamp", Category::Status, "21");
        status.parameter = Some(Param::Temp);
        status.measure = Some(Measure::Value);
        assert!(dispatch(&plugin, &status));

        // Default on_data hook is a no-op but still counts as dispatched.
        assert!(dispatch(&plugin, &inbound("lamp", Category::Data, "x")));

        assert_eq!(
            plugin.calls(),
            vec![
                "own:RESET".to_string(),
                "cmd:lamp:ON".to_string(),
                "status:lamp:21:Some(Temp):Some(Value)".to_string(),
            ]
        );
    }

    #[test]
    fn test_own_echo_is_ignored() {
        let plugin = Recorder::new();
        plugin.begin().unwrap();

        assert!(!dispatch(&plugin, &inbound("me", Category::Status, "Online")));
        assert!(!dispatch(&plugin, &inbound("me", Category::Data, "1")));
        assert!(plugin.calls().is_empty());
    }

    #[test]
    fn test_finish_deactivates() {
        let plugin = Recorder::new();
        plugin.begin().unwrap();
        plugin.finish();
        assert!(!dispatch(&plugin, &inbound("lamp", Category::Status, "1")));
    }
}
