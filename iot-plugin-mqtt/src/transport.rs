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

//! [`Transport`] implementation on top of a `rumqttc` client.

use iot_plugin::Transport;
use rumqttc::{AsyncClient, QoS};

/// Queues plugin publishes on an [`AsyncClient`] without awaiting, so the
/// synchronous publish engine can call it from any task.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    qos: QoS,
    retain: bool,
}

impl MqttTransport {
    pub fn new(client: AsyncClient) -> Self {
        Self {
            client,
            qos: QoS::AtLeastOnce,
            retain: false,
        }
    }

    /// Ask the broker to retain state publishes.
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}

impl Transport for MqttTransport {
    fn publish(&self, message: &str, topic: &str) -> anyhow::Result<()> {
        self.client
            .try_publish(topic, self.qos, self.retain, message.as_bytes().to_vec())
            .map_err(|e| anyhow::anyhow!("MQTT publish to '{topic}' failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::MqttOptions;

    #[test]
    fn test_publish_is_queued_without_connection() {
        let (client, _eventloop) = AsyncClient::new(MqttOptions::new("t", "localhost", 1883), 10);
        let transport = MqttTransport::new(client).with_retain(true);
        assert!(transport.publish("21.5", "dev1/state/temp/val").is_ok());
    }

    #[test]
    fn test_publish_fails_when_queue_is_full() {
        let (client, _eventloop) = AsyncClient::new(MqttOptions::new("t", "localhost", 1883), 1);
        let transport = MqttTransport::new(client);
        assert!(transport.publish("1", "a/state").is_ok());
        assert!(transport.publish("2", "a/state").is_err());
    }
}
