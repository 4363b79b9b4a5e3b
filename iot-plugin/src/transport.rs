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

//! The publish seam between plugins and whatever client talks to the broker.

use std::sync::{Mutex, PoisonError};

/// Anything able to put a plain-text message on a topic.
///
/// Connection handling, reconnects and retries belong to the implementor.
pub trait Transport: Send + Sync {
    fn publish(&self, message: &str, topic: &str) -> anyhow::Result<()>;
}

/// Transport that records every publish in memory. Useful for dry runs and
/// for asserting publish order.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    published: Mutex<Vec<(String, String)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(message, topic)` pairs, oldest first.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Transport for MemoryTransport {
    fn publish(&self, message: &str, topic: &str) -> anyhow::Result<()> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((message.to_string(), topic.to_string()));
        Ok(())
    }
}
