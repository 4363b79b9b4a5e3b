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

//! Device plugin core for MQTT-style IoT buses.
//!
//! A plugin owns a device identity, a registry of reported parameters keyed by
//! (parameter, measure), and a set of dispatch hooks invoked by whatever router
//! sits on top of the transport. Topics follow the grammar
//! `<device_id>/<category>[/<parameter>][/<measure>]`.
//!
//! # Example
//!
//! ```ignore
//! use iot_plugin::{Measure, Plugin, PluginCore};
//!
//! let core = PluginCore::<Sensor>::new("garden");
//! core.set_param(21.5, Sensor::Temperature, Some(Measure::Value));
//! core.set_transport(transport);
//! core.publish_all()?; // publishes `garden/state/temp/val` = "21.5"
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod filter;
pub mod plugin;
pub mod publish;
pub mod registry;
pub mod topic;
pub mod transport;
pub mod vocab;

pub use config::PluginConfig;
pub use device::PluginCore;
pub use error::{PluginError, Result};
pub use filter::RangeFilter;
pub use plugin::{dispatch, Inbound, Plugin};
pub use registry::{ParamRecord, ParamRegistry};
pub use topic::{compose_log, compose_topic, compose_wildcard_topic};
pub use transport::{MemoryTransport, Transport};
pub use vocab::{resolve, Category, Command, Measure, Status, Token, TokenInput, WireToken};
