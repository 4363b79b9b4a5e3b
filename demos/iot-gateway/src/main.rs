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

mod thermostat;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use iot_plugin::PluginConfig;
use iot_plugin_mqtt::{MqttBridge, MqttBridgeConfig};
use log::info;

use crate::thermostat::Thermostat;

/// Bridge settings from `MQTT_*` environment variables.
fn bridge_config_from_env() -> Result<MqttBridgeConfig> {
    let broker_host = env::var("MQTT_BROKER_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("MQTT_PORT")
        .unwrap_or_else(|_| "1883".to_string())
        .parse::<u16>()
        .context("Invalid MQTT_PORT")?;

    let mut builder = MqttBridgeConfig::builder("iot-gateway", broker_host)
        .port(port)
        // Observe data published by the sensors the plugins follow.
        .subscribe("+/data/#")
        .subscribe("+/state");
    if let Ok(client_id) = env::var("MQTT_CLIENT_ID") {
        builder = builder.client_id(client_id);
    }
    if let (Ok(user), Ok(pass)) = (env::var("MQTT_USERNAME"), env::var("MQTT_PASSWORD")) {
        builder = builder.username(user).password(pass);
    }
    if let Ok(period) = env::var("PUBLISH_INTERVAL_SECS") {
        builder = builder.publish_interval_secs(
            period.parse().context("Invalid PUBLISH_INTERVAL_SECS")?,
        );
    }
    Ok(builder.build())
}

/// Plugin settings from the JSON file named by `PLUGIN_CONFIG`, if any.
fn plugin_config_from_env() -> Result<PluginConfig> {
    match env::var("PLUGIN_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read plugin config '{path}'"))?;
            PluginConfig::from_json_str(&text)
                .with_context(|| format!("Invalid plugin config '{path}'"))
        }
        Err(_) => Ok(PluginConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting IoT Gateway...");

    let bridge = MqttBridge::new(bridge_config_from_env()?);

    let did = env::var("THERMOSTAT_ID").unwrap_or_else(|_| "thermostat".to_string());
    bridge.register(Arc::new(Thermostat::new(did, plugin_config_from_env()?)))?;

    bridge.start().await?;

    // Keep running until signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    bridge.stop().await
}
