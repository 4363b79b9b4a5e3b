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

//! Shared state every plugin embeds: identity, injected handles and the
//! parameter registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::{debug, info};
use serde_json::Value;

use crate::config::PluginConfig;
use crate::error::Result;
use crate::registry::{ParamRecord, ParamRegistry};
use crate::transport::Transport;
use crate::vocab::{Measure, Token};

/// Identity, handles and registry of one device plugin.
///
/// Dispatch hooks and timer-driven publishes may run on different tasks, so
/// the registry sits behind a mutex and the injected handles behind
/// read/write locks. The registry lock is never held across a transport call.
pub struct PluginCore<P> {
    did: String,
    /// Transport handle, injected by the hosting application after construction.
    transport: RwLock<Option<Arc<dyn Transport>>>,
    config: RwLock<Arc<PluginConfig>>,
    registry: Mutex<ParamRegistry<P>>,
    active: AtomicBool,
}

impl<P: Token> PluginCore<P> {
    pub fn new(did: impl Into<String>) -> Self {
        let did = did.into();
        debug!("[{did}] Plugin core created");
        Self {
            did,
            transport: RwLock::new(None),
            config: RwLock::new(Arc::new(PluginConfig::default())),
            registry: Mutex::new(ParamRegistry::new()),
            active: AtomicBool::new(false),
        }
    }

    /// Device identifier, the first segment of every topic this plugin owns.
    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        *self.transport.write().unwrap_or_else(PoisonError::into_inner) = Some(transport);
    }

    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_config(&self, config: PluginConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }

    pub fn config(&self) -> Arc<PluginConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mark the plugin active. Called from a plugin's `begin`.
    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
        info!("[{}] Plugin activated", self.did);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        info!("[{}] Plugin deactivated", self.did);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn find_param(&self, parameter: P, measure: Option<Measure>) -> Result<usize> {
        self.registry().find(parameter, measure)
    }

    /// Registry value for the key, or `default` when nothing matches.
    pub fn get_param(
        &self,
        parameter: P,
        measure: Option<Measure>,
        default: impl Into<Value>,
    ) -> Value {
        self.registry().get(parameter, measure, default)
    }

    pub fn set_param(&self, value: impl Into<Value>, parameter: P, measure: Option<Measure>) {
        self.registry().set(value, parameter, measure);
    }

    /// Snapshot of all records in insertion order.
    pub fn records(&self) -> Vec<ParamRecord<P>> {
        self.registry().records().to_vec()
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, ParamRegistry<P>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> std::fmt::Debug for PluginCore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCore")
            .field("did", &self.did)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish()
    }
}
