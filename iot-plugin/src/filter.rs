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

//! Acceptable-range filter for sampled values.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Optional lower and upper bounds for a measured value.
///
/// Bounds set from loosely typed input (configuration, command payloads)
/// become absent when they cannot be read as a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RangeFilter {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn set_min(&mut self, value: &Value) {
        self.min = coerce(value);
    }

    pub fn set_max(&mut self, value: &Value) {
        self.max = coerce(value);
    }

    /// Pass `value` through when it lies within the bounds, else `None`.
    pub fn filter(&self, value: Option<f64>) -> Option<f64> {
        let value = value?;
        if let Some(max) = self.max {
            if value > max {
                warn!("Rejected value {value} greater than {max}");
                return None;
            }
        }
        if let Some(min) = self.min {
            if value < min {
                warn!("Rejected value {value} less than {min}");
                return None;
            }
        }
        Some(value)
    }
}

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
