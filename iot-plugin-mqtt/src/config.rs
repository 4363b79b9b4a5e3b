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

//! Configuration types for the MQTT bridge.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttBridgeConfig {
    /// Bridge identifier used in log prefixes.
    pub id: String,
    /// MQTT broker hostname or IP.
    pub broker_host: String,
    /// MQTT broker port (default: 1883).
    #[serde(default = "default_port")]
    pub port: u16,
    /// MQTT client ID. Also the device id of the bridge's LWT topic.
    #[serde(default = "generated_client_id")]
    pub client_id: String,
    /// Optional MQTT username for authentication.
    pub username: Option<String>,
    /// Optional MQTT password for authentication.
    pub password: Option<String>,
    /// Topic filters subscribed on top of each plugin's `<did>/#`
    /// (e.g. `+/state/#` to observe other devices).
    #[serde(default)]
    pub subscriptions: Vec<String>,
    /// Keep-alive interval in seconds (default: 30).
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
    /// If set, every plugin republishes its registry at this period.
    #[serde(default)]
    pub publish_interval_secs: Option<u64>,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    30
}

fn generated_client_id() -> String {
    format!("iot-bridge-{}", uuid::Uuid::new_v4())
}

impl MqttBridgeConfig {
    /// Start building a new config with the required fields.
    pub fn builder(
        id: impl Into<String>,
        broker_host: impl Into<String>,
    ) -> MqttBridgeConfigBuilder {
        let id = id.into();
        MqttBridgeConfigBuilder {
            client_id: format!("iot-bridge-{id}"),
            id,
            broker_host: broker_host.into(),
            port: default_port(),
            username: None,
            password: None,
            subscriptions: Vec::new(),
            keep_alive_secs: default_keep_alive(),
            publish_interval_secs: None,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Zero disables periodic publishing.
    pub fn publish_interval(&self) -> Option<Duration> {
        self.publish_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Builder for [`MqttBridgeConfig`].
pub struct MqttBridgeConfigBuilder {
    id: String,
    broker_host: String,
    port: u16,
    client_id: String,
    username: Option<String>,
    password: Option<String>,
    subscriptions: Vec<String>,
    keep_alive_secs: u64,
    publish_interval_secs: Option<u64>,
}

impl MqttBridgeConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn subscribe(mut self, topic: impl Into<String>) -> Self {
        self.subscriptions.push(topic.into());
        self
    }

    pub fn keep_alive_secs(mut self, secs: u64) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    pub fn publish_interval_secs(mut self, secs: u64) -> Self {
        self.publish_interval_secs = Some(secs);
        self
    }

    /// Build the config.
    pub fn build(self) -> MqttBridgeConfig {
        MqttBridgeConfig {
            id: self.id,
            broker_host: self.broker_host,
            port: self.port,
            client_id: self.client_id,
            username: self.username,
            password: self.password,
            subscriptions: self.subscriptions,
            keep_alive_secs: self.keep_alive_secs,
            publish_interval_secs: self.publish_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MqttBridgeConfig::builder("home", "localhost").build();
        assert_eq!(config.port, 1883);
        assert_eq!(config.client_id, "iot-bridge-home");
        assert_eq!(config.keep_alive(), Duration::from_secs(30));
        assert!(config.subscriptions.is_empty());
        assert_eq!(config.publish_interval(), None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = MqttBridgeConfig::builder("home", "broker.local")
            .port(8883)
            .client_id("hall")
            .username("u")
            .password("p")
            .subscribe("+/state/#")
            .publish_interval_secs(60)
            .build();
        assert_eq!(config.port, 8883);
        assert_eq!(config.client_id, "hall");
        assert_eq!(config.subscriptions, vec!["+/state/#".to_string()]);
        assert_eq!(config.publish_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: MqttBridgeConfig = serde_json::from_str(
            r#"{"id": "home", "broker_host": "localhost", "publish_interval_secs": 0}"#,
        )
        .unwrap();
        assert_eq!(config.port, 1883);
        assert!(config.client_id.starts_with("iot-bridge-"));
        assert_eq!(config.publish_interval(), None);
    }
}
