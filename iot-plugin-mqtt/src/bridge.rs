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

//! MQTT bridge hosting a set of device plugins on one client connection.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use iot_plugin::topic::compose_wildcard_topic;
use iot_plugin::{compose_topic, Category, Status, Transport, WireToken};
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, Incoming, LastWill, MqttOptions, Outgoing, QoS};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::MqttBridgeConfig;
use crate::endpoint::Endpoint;
use crate::transport::MqttTransport;

/// Time given to the event loop to flush the goodbye publish on stop.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Hosts plugins on a single MQTT connection.
///
/// The bridge announces itself on `<client_id>/state` (with an `Offline`
/// last will), subscribes to every plugin's `<did>/#` plus the configured
/// extra filters, and routes each inbound publish to every plugin. Plugin
/// hooks run on the event-loop task; periodic publishes run on a timer task.
pub struct MqttBridge {
    config: MqttBridgeConfig,
    endpoints: Arc<DashMap<String, Arc<dyn Endpoint>>>,
    /// MQTT client handle (set on start, cleared on stop).
    client: Arc<RwLock<Option<AsyncClient>>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    eventloop_task: Mutex<Option<JoinHandle<()>>>,
    timer_task: Mutex<Option<JoinHandle<()>>>,
}

impl MqttBridge {
    pub fn new(config: MqttBridgeConfig) -> Self {
        Self {
            config,
            endpoints: Arc::new(DashMap::new()),
            client: Arc::new(RwLock::new(None)),
            shutdown_tx: Mutex::new(None),
            eventloop_task: Mutex::new(None),
            timer_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MqttBridgeConfig {
        &self.config
    }

    /// Add a plugin. Device ids must be unique within a bridge.
    pub fn register(&self, endpoint: Arc<dyn Endpoint>) -> Result<()> {
        let did = endpoint.device_id().to_string();
        match self.endpoints.entry(did) {
            Entry::Occupied(entry) => {
                anyhow::bail!(
                    "[{}] Plugin '{}' is already registered",
                    self.config.id,
                    entry.key()
                );
            }
            Entry::Vacant(entry) => {
                info!("[{}] Registered plugin '{}'", self.config.id, entry.key());
                entry.insert(endpoint);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Plugin wildcards plus configured filters, sorted and deduplicated.
    pub fn subscription_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .endpoints
            .iter()
            .map(|entry| compose_wildcard_topic(entry.key()))
            .chain(self.config.subscriptions.iter().cloned())
            .collect();
        topics.sort();
        topics.dedup();
        topics
    }

    /// `<client_id>/state`, carrying the bridge's Online/Offline status.
    pub fn status_topic(&self) -> Result<String> {
        Ok(compose_topic(&self.config.client_id, Category::Status, None, None)?)
    }

    /// Connect, start every plugin and spawn the event loop.
    ///
    /// Fails if the bridge is already running. If a plugin fails to begin,
    /// the plugins begun before it are finished again.
    pub async fn start(&self) -> Result<()> {
        // Held until the client is stored so concurrent starts serialize.
        let mut client_slot = self.client.write().await;
        if client_slot.is_some() {
            anyhow::bail!("[{}] MQTT bridge already started", self.config.id);
        }

        info!(
            "[{}] Starting MQTT bridge (broker={}:{}, plugins={})",
            self.config.id,
            self.config.broker_host,
            self.config.port,
            self.endpoints.len()
        );

        let status_topic = self.status_topic()?;

        // Build MQTT options.
        let mut mqtt_opts = MqttOptions::new(
            &self.config.client_id,
            &self.config.broker_host,
            self.config.port,
        );
        mqtt_opts.set_keep_alive(self.config.keep_alive());
        mqtt_opts.set_last_will(LastWill::new(
            &status_topic,
            Status::Offline.wire(),
            QoS::AtLeastOnce,
            true,
        ));

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            mqtt_opts.set_credentials(user, pass);
        }

        let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 100);
        let transport: Arc<dyn Transport> = Arc::new(MqttTransport::new(client.clone()));

        let endpoints = snapshot(&self.endpoints);
        for (started, endpoint) in endpoints.iter().enumerate() {
            endpoint.attach_transport(transport.clone());
            if let Err(e) = endpoint.start() {
                for begun in &endpoints[..started] {
                    begun.stop();
                }
                anyhow::bail!(
                    "[{}] Plugin '{}' failed to begin: {e}",
                    self.config.id,
                    endpoint.device_id()
                );
            }
        }

        // Store client for later disconnect.
        *client_slot = Some(client.clone());

        // Clone what we need for the spawned tasks.
        let endpoints = self.endpoints.clone();
        let topics = self.subscription_topics();
        let bridge_id = self.config.id.clone();

        // Create shutdown channel.
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        *self.shutdown_tx.lock().await = Some(shutdown_tx);

        // Spawn the MQTT event loop task.
        let handle = tokio::spawn(async move {
            info!("[{bridge_id}] MQTT event loop started");
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("[{bridge_id}] Shutdown signal received");
                        break;
                    }
                    event = eventloop.poll() => {
                        match event {
                            Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                                // Subscriptions do not survive a clean-session reconnect.
                                announce(&client, &bridge_id, &topics, &status_topic);
                            }
                            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                                let dispatched =
                                    route_to_all(&endpoints, &publish.topic, &publish.payload);
                                debug!(
                                    "[{bridge_id}] '{}' dispatched to {dispatched} plugin(s)",
                                    publish.topic
                                );
                            }
                            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                                info!("[{bridge_id}] Disconnected from broker");
                                break;
                            }
                            Ok(_) => {} // Ignore other events (PingResp, PubAck, etc.)
                            Err(e) => {
                                warn!("[{bridge_id}] MQTT connection error (will reconnect): {e}");
                                tokio::time::sleep(Duration::from_secs(1)).await;
                            }
                        }
                    }
                }
            }
        });
        *self.eventloop_task.lock().await = Some(handle);

        if let Some(period) = self.config.publish_interval() {
            let endpoints = self.endpoints.clone();
            let bridge_id = self.config.id.clone();
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                loop {
                    ticker.tick().await;
                    publish_all(&endpoints, &bridge_id);
                }
            });
            *self.timer_task.lock().await = Some(handle);
        }

        info!("[{}] MQTT bridge started", self.config.id);
        Ok(())
    }

    /// Finish every plugin, announce `Offline` and disconnect.
    pub async fn stop(&self) -> Result<()> {
        if let Some(timer) = self.timer_task.lock().await.take() {
            timer.abort();
        }

        let Some(client) = self.client.write().await.take() else {
            return Ok(());
        };

        for endpoint in snapshot(&self.endpoints) {
            endpoint.stop();
        }

        let status_topic = self.status_topic()?;
        if let Err(e) = client
            .publish(&status_topic, QoS::AtLeastOnce, true, Status::Offline.wire())
            .await
        {
            error!("[{}] Failed to announce offline status: {e}", self.config.id);
        }
        let _ = client.disconnect().await;

        if let Some(mut handle) = self.eventloop_task.lock().await.take() {
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut handle).await.is_err() {
                warn!("[{}] Event loop did not drain in time", self.config.id);
                if let Some(shutdown_tx) = self.shutdown_tx.lock().await.take() {
                    let _ = shutdown_tx.send(());
                }
                handle.abort();
            }
        }
        self.shutdown_tx.lock().await.take();

        info!("[{}] MQTT bridge stopped", self.config.id);
        Ok(())
    }
}

fn snapshot(endpoints: &DashMap<String, Arc<dyn Endpoint>>) -> Vec<Arc<dyn Endpoint>> {
    endpoints.iter().map(|entry| entry.value().clone()).collect()
}

fn announce(client: &AsyncClient, bridge_id: &str, topics: &[String], status_topic: &str) {
    for topic in topics {
        match client.try_subscribe(topic, QoS::AtLeastOnce) {
            Ok(()) => info!("[{bridge_id}] Subscribed to {topic}"),
            Err(e) => error!("[{bridge_id}] Failed to subscribe to {topic}: {e}"),
        }
    }
    if let Err(e) =
        client.try_publish(status_topic, QoS::AtLeastOnce, true, Status::Online.wire())
    {
        error!("[{bridge_id}] Failed to announce online status: {e}");
    }
}

/// Offer an inbound publish to every plugin. Returns how many dispatched it.
pub fn route_to_all(
    endpoints: &DashMap<String, Arc<dyn Endpoint>>,
    topic: &str,
    payload: &[u8],
) -> usize {
    let mut dispatched = 0;
    for endpoint in snapshot(endpoints) {
        match endpoint.route(topic, payload) {
            Ok(true) => dispatched += 1,
            Ok(false) => {}
            Err(e) => debug!("[{}] Skipping message: {e}", endpoint.device_id()),
        }
    }
    dispatched
}

fn publish_all(endpoints: &DashMap<String, Arc<dyn Endpoint>>, bridge_id: &str) {
    for endpoint in snapshot(endpoints) {
        if let Err(e) = endpoint.publish_state() {
            error!(
                "[{bridge_id}] Failed to publish state of '{}': {e}",
                endpoint.device_id()
            );
        }
    }
}
