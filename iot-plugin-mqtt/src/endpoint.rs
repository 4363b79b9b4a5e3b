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

//! Type-erased plugin handle so plugins with different parameter
//! vocabularies can share one bridge.

use std::sync::Arc;

use iot_plugin::{dispatch, Plugin, Transport};

use crate::router::{parse_topic, RouteError};

/// What the bridge needs from a plugin.
pub trait Endpoint: Send + Sync {
    fn device_id(&self) -> &str;

    fn attach_transport(&self, transport: Arc<dyn Transport>);

    /// Run the plugin's `begin` hook.
    fn start(&self) -> anyhow::Result<()>;

    /// Run the plugin's `finish` hook.
    fn stop(&self);

    /// Publish the plugin's whole registry.
    fn publish_state(&self) -> iot_plugin::Result<()>;

    /// Parse an inbound publish with the plugin's vocabulary and dispatch it.
    /// `Ok(false)` means the message was valid but not for this plugin.
    fn route(&self, topic: &str, payload: &[u8]) -> Result<bool, RouteError>;
}

impl<T: Plugin> Endpoint for T {
    fn device_id(&self) -> &str {
        Plugin::did(self)
    }

    fn attach_transport(&self, transport: Arc<dyn Transport>) {
        self.core().set_transport(transport);
    }

    fn start(&self) -> anyhow::Result<()> {
        self.begin()
    }

    fn stop(&self) {
        self.finish();
    }

    fn publish_state(&self) -> iot_plugin::Result<()> {
        self.core().publish_all()
    }

    fn route(&self, topic: &str, payload: &[u8]) -> Result<bool, RouteError> {
        let inbound = parse_topic::<T::Parameter>(topic, payload)?;
        Ok(dispatch(self, &inbound))
    }
}
