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

//! MQTT plumbing for `iot-plugin` devices.
//!
//! Hosts plugins on a `rumqttc` connection: queues their state publishes,
//! splits inbound topics into typed segments and invokes their dispatch hooks.
//!
//! # Example
//!
//! ```ignore
//! use iot_plugin_mqtt::{MqttBridge, MqttBridgeConfig};
//!
//! let config = MqttBridgeConfig::builder("home", "broker.local")
//!     .subscribe("+/state/#")
//!     .publish_interval_secs(60)
//!     .build();
//!
//! let bridge = MqttBridge::new(config);
//! bridge.register(Arc::new(thermostat))?;
//! bridge.start().await?;
//! ```

pub mod bridge;
pub mod config;
pub mod endpoint;
pub mod router;
pub mod transport;

pub use bridge::MqttBridge;
pub use config::{MqttBridgeConfig, MqttBridgeConfigBuilder};
pub use endpoint::Endpoint;
pub use router::{parse_topic, RouteError};
pub use transport::MqttTransport;
