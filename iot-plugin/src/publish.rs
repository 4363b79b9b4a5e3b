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

//! Projection of the parameter registry onto state topics.

use log::{debug, error, warn};
use serde_json::Value;

use crate::device::PluginCore;
use crate::error::Result;
use crate::topic::{compose_log, compose_topic};
use crate::vocab::{Category, Measure, Token, TokenInput};

/// Plain-text payload for a registry value: strings go out raw, everything
/// else as its JSON rendering.
pub fn payload(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl<P: Token> PluginCore<P> {
    /// Publish one registry value on `<did>/state/<parameter>[/<measure>]`.
    ///
    /// A key with no record is a no-op. Transport failures are logged and
    /// not retried.
    pub fn publish_one(&self, parameter: P, measure: Option<Measure>) -> Result<()> {
        let value = {
            let registry = self.registry();
            match registry.find(parameter, measure) {
                Ok(index) => registry.records()[index].value.clone(),
                Err(_) => return Ok(()),
            }
        };

        let message = payload(&value);
        let topic = compose_topic(
            self.did(),
            Category::Status,
            Some(&parameter),
            measure.map(TokenInput::Typed),
        )?;
        let line = compose_log(
            &message,
            Category::Status,
            Some(&parameter),
            measure.map(TokenInput::Typed),
        )?;
        debug!("[{}] {line}", self.did());

        let Some(transport) = self.transport() else {
            warn!("[{}] No transport attached, dropping publish to {topic}", self.did());
            return Ok(());
        };
        if let Err(e) = transport.publish(&message, &topic) {
            error!("[{}] Failed to publish to {topic}: {e}", self.did());
        }
        Ok(())
    }

    /// Publish every record in insertion order.
    pub fn publish_all(&self) -> Result<()> {
        let keys = self.registry().keys();
        for (parameter, measure) in keys {
            self.publish_one(parameter, measure)?;
        }
        Ok(())
    }
}
