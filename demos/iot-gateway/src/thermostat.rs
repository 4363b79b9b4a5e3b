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

//! Thermostat plugin: follows a remote temperature sensor and drives a fan.

use std::sync::{Mutex, PoisonError};

use iot_plugin::{
    resolve, Command, Measure, Plugin, PluginConfig, PluginCore, RangeFilter, Status, Token,
    WireToken,
};
use log::{info, warn};
use serde_json::Value;
use strum::{EnumIter, IntoStaticStr};

const SECTION: &str = "thermostat";
const DEFAULT_SETPOINT: f64 = 21.0;

/// Parameters the thermostat reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Thermo {
    #[strum(serialize = "temp")]
    Temperature,
    #[strum(serialize = "setpoint")]
    Setpoint,
    #[strum(serialize = "fan")]
    Fan,
}

impl Token for Thermo {
    const KIND: &'static str = "parameter";
}

/// Reads `<sensor>/data/temp[/val]` and switches the fan on above the setpoint.
pub struct Thermostat {
    core: PluginCore<Thermo>,
    sensor: String,
    filter: Mutex<RangeFilter>,
}

impl Thermostat {
    pub fn new(did: impl Into<String>, config: PluginConfig) -> Self {
        let core = PluginCore::new(did);
        let sensor = config.option_or(SECTION, "sensor", "sensor".to_string());
        core.set_config(config);
        Self {
            core,
            sensor,
            filter: Mutex::new(RangeFilter::default()),
        }
    }

    fn setpoint(&self) -> f64 {
        self.core
            .get_param(Thermo::Setpoint, Some(Measure::Value), DEFAULT_SETPOINT)
            .as_f64()
            .unwrap_or(DEFAULT_SETPOINT)
    }

    fn fan_on(&self) -> bool {
        self.core.get_param(Thermo::Fan, None, Command::TurnOff.wire()) == Command::TurnOn.wire()
    }

    fn set_fan(&self, on: bool) {
        let state = if on { Command::TurnOn } else { Command::TurnOff };
        self.core.set_param(state.wire(), Thermo::Fan, None);
        self.publish(Thermo::Fan, None);
    }

    fn set_setpoint(&self, value: f64) {
        self.core.set_param(value, Thermo::Setpoint, Some(Measure::Value));
        self.publish(Thermo::Setpoint, Some(Measure::Value));
        self.regulate();
    }

    /// Fan follows the last accepted temperature against the setpoint.
    fn regulate(&self) {
        let Some(temp) = self
            .core
            .get_param(Thermo::Temperature, Some(Measure::Value), Value::Null)
            .as_f64()
        else {
            return;
        };
        let wanted = temp > self.setpoint();
        if wanted != self.fan_on() {
            self.set_fan(wanted);
        }
    }

    fn record_temperature(&self, temp: f64) {
        self.core.set_param(temp, Thermo::Temperature, Some(Measure::Value));
        let low = self
            .core
            .get_param(Thermo::Temperature, Some(Measure::Minimum), temp)
            .as_f64()
            .unwrap_or(temp);
        let high = self
            .core
            .get_param(Thermo::Temperature, Some(Measure::Maximum), temp)
            .as_f64()
            .unwrap_or(temp);
        self.core.set_param(low.min(temp), Thermo::Temperature, Some(Measure::Minimum));
        self.core.set_param(high.max(temp), Thermo::Temperature, Some(Measure::Maximum));
        self.publish(Thermo::Temperature, Some(Measure::Value));
    }

    fn publish(&self, parameter: Thermo, measure: Option<Measure>) {
        if let Err(e) = self.core.publish_one(parameter, measure) {
            warn!("[{}] Publish failed: {e}", self.core.did());
        }
    }

    fn publish_all_logged(&self) {
        if let Err(e) = self.core.publish_all() {
            warn!("[{}] Publish failed: {e}", self.core.did());
        }
    }
}

impl Plugin for Thermostat {
    type Parameter = Thermo;

    fn core(&self) -> &PluginCore<Thermo> {
        &self.core
    }

    fn begin(&self) -> anyhow::Result<()> {
        let config = self.core.config();
        {
            let mut filter = self.filter.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(min) = config.option::<Value>(SECTION, "temp_min") {
                filter.set_min(&min);
            }
            if let Some(max) = config.option::<Value>(SECTION, "temp_max") {
                filter.set_max(&max);
            }
        }

        let setpoint = config.option_or(SECTION, "setpoint", DEFAULT_SETPOINT);
        self.core.set_param(setpoint, Thermo::Setpoint, Some(Measure::Default));
        self.core.set_param(setpoint, Thermo::Setpoint, Some(Measure::Value));
        self.core.set_param(Command::TurnOff.wire(), Thermo::Fan, None);

        self.core.activate();
        info!(
            "[{}] Following sensor '{}' with setpoint {setpoint}",
            self.core.did(),
            self.sensor
        );
        self.core.publish_all()?;
        Ok(())
    }

    fn on_own_command(&self, value: &str, parameter: Option<Thermo>, _measure: Option<Measure>) {
        if parameter == Some(Thermo::Setpoint) {
            match value.trim().parse::<f64>() {
                Ok(setpoint) => self.set_setpoint(setpoint),
                Err(_) => warn!("[{}] Ignoring setpoint '{value}'", self.core.did()),
            }
            return;
        }

        let Ok(command) = resolve::<Command>(value) else {
            return;
        };
        match command {
            Command::GetStatus => self.publish_all_logged(),
            Command::Reset => {
                let default = self
                    .core
                    .get_param(Thermo::Setpoint, Some(Measure::Default), DEFAULT_SETPOINT)
                    .as_f64()
                    .unwrap_or(DEFAULT_SETPOINT);
                self.set_setpoint(default);
            }
            Command::TurnOn => self.set_fan(true),
            Command::TurnOff => self.set_fan(false),
            Command::Toggle => self.set_fan(!self.fan_on()),
        }
    }

    fn on_data(
        &self,
        value: &str,
        parameter: Option<Thermo>,
        measure: Option<Measure>,
        source: &str,
    ) {
        if source != self.sensor || parameter != Some(Thermo::Temperature) {
            return;
        }
        if !matches!(measure, None | Some(Measure::Value)) {
            return;
        }
        let reading = value.trim().parse::<f64>().ok();
        let filter = *self.filter.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(temp) = filter.filter(reading) {
            self.record_temperature(temp);
            self.regulate();
        }
    }

    fn on_status(
        &self,
        value: &str,
        _parameter: Option<Thermo>,
        _measure: Option<Measure>,
        source: &str,
    ) {
        if source == self.sensor && value == Status::Offline.wire() {
            warn!("[{}] Sensor '{source}' went offline", self.core.did());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iot_plugin::{dispatch, Category, Inbound, MemoryTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn thermostat() -> (Thermostat, Arc<MemoryTransport>) {
        let config = PluginConfig::new(json!({
            "thermostat": {
                "sensor": "garden",
                "setpoint": 22.0,
                "temp_min": -30,
                "temp_max": "60"
            }
        }));
        let plugin = Thermostat::new("hall", config);
        let transport = Arc::new(MemoryTransport::new());
        plugin.core().set_transport(transport.clone());
        plugin.begin().unwrap();
        transport.clear();
        (plugin, transport)
    }

    fn data(source: &str, value: &str) -> Inbound<Thermo> {
        Inbound {
            device_id: source.into(),
            category: Category::Data,
            parameter: Some(Thermo::Temperature),
            measure: Some(Measure::Value),
            value: value.into(),
        }
    }

    fn command(parameter: Option<Thermo>, value: &str) -> Inbound<Thermo> {
        Inbound {
            device_id: "hall".into(),
            category: Category::Command,
            parameter,
            measure: None,
            value: value.into(),
        }
    }

    #[test]
    fn test_begin_seeds_registry() {
        let plugin = Thermostat::new("hall", PluginConfig::default());
        let transport = Arc::new(MemoryTransport::new());
        plugin.core().set_transport(transport.clone());
        plugin.begin().unwrap();

        assert_eq!(
            transport.published(),
            vec![
                ("21.0".to_string(), "hall/state/setpoint/def".to_string()),
                ("21.0".to_string(), "hall/state/setpoint/val".to_string()),
                ("OFF".to_string(), "hall/state/fan".to_string()),
            ]
        );
    }

    #[test]
    fn test_warm_reading_turns_fan_on() {
        let (plugin, transport) = thermostat();
        assert!(dispatch(&plugin, &data("garden", "25.5")));

        assert!(plugin.fan_on());
        assert_eq!(
            transport.published(),
            vec![
                ("25.5".to_string(), "hall/state/temp/val".to_string()),
                ("ON".to_string(), "hall/state/fan".to_string()),
            ]
        );
    }

    #[test]
    fn test_out_of_range_and_foreign_readings_are_ignored() {
        let (plugin, transport) = thermostat();
        dispatch(&plugin, &data("garden", "75"));
        dispatch(&plugin, &data("garden", "n/a"));
        dispatch(&plugin, &data("roof", "30"));

        assert!(transport.published().is_empty());
        assert_eq!(
            plugin.core().get_param(Thermo::Temperature, None, Value::Null),
            Value::Null
        );
    }

    #[test]
    fn test_min_max_tracking() {
        let (plugin, _transport) = thermostat();
        for reading in ["20", "18.5", "23"] {
            dispatch(&plugin, &data("garden", reading));
        }
        let core = plugin.core();
        assert_eq!(core.get_param(Thermo::Temperature, Some(Measure::Minimum), 0), json!(18.5));
        assert_eq!(core.get_param(Thermo::Temperature, Some(Measure::Maximum), 0), json!(23.0));
        assert_eq!(core.get_param(Thermo::Temperature, Some(Measure::Value), 0), json!(23.0));
    }

    #[test]
    fn test_toggle_and_reset_commands() {
        let (plugin, transport) = thermostat();

        dispatch(&plugin, &command(None, "TOGGLE"));
        assert!(plugin.fan_on());

        dispatch(&plugin, &command(Some(Thermo::Setpoint), "19.5"));
        assert_eq!(plugin.setpoint(), 19.5);

        dispatch(&plugin, &command(None, "RESET"));
        assert_eq!(plugin.setpoint(), 22.0);

        dispatch(&plugin, &command(None, "bogus"));

        let topics: Vec<String> = transport.published().into_iter().map(|(_, t)| t).collect();
        assert_eq!(
            topics,
            vec![
                "hall/state/fan".to_string(),
                "hall/state/setpoint/val".to_string(),
                "hall/state/setpoint/val".to_string(),
            ]
        );
    }

    #[test]
    fn test_get_status_publishes_everything() {
        let (plugin, transport) = thermostat();
        dispatch(&plugin, &command(None, "STATUS"));
        assert_eq!(transport.published().len(), 3);
    }
}
