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

//! In-memory registry of the parameters a plugin reports.
//!
//! Records are keyed by (parameter, measure) and kept in insertion order so a
//! full publication is deterministic. Registries hold tens of entries, so
//! lookups are a positional scan.

use serde_json::Value;

use crate::error::{PluginError, Result};
use crate::vocab::{Measure, Token, WireToken};

/// One reported value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRecord<P> {
    pub parameter: P,
    pub measure: Option<Measure>,
    pub value: Value,
}

impl<P: Token> ParamRecord<P> {
    /// Whether this record answers a query for `parameter` / `measure`.
    /// An absent query measure matches any stored measure.
    pub fn matches(&self, parameter: P, measure: Option<Measure>) -> bool {
        self.parameter == parameter && (measure.is_none() || measure == self.measure)
    }
}

/// Append/update-only collection of [`ParamRecord`]s.
#[derive(Debug, Clone)]
pub struct ParamRegistry<P> {
    records: Vec<ParamRecord<P>>,
}

impl<P> Default for ParamRegistry<P> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<P: Token> ParamRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParamRecord<P>] {
        &self.records
    }

    /// Keys of all records, in insertion order.
    pub fn keys(&self) -> Vec<(P, Option<Measure>)> {
        self.records
            .iter()
            .map(|record| (record.parameter, record.measure))
            .collect()
    }

    /// Index of the first record matching the key.
    pub fn find(&self, parameter: P, measure: Option<Measure>) -> Result<usize> {
        self.records
            .iter()
            .position(|record| record.matches(parameter, measure))
            .ok_or_else(|| PluginError::NotFound {
                parameter: parameter.wire().to_string(),
                measure: measure.map_or("any", |m| m.wire()).to_string(),
            })
    }

    /// Value of the first matching record, or `default` on a miss.
    pub fn get(&self, parameter: P, measure: Option<Measure>, default: impl Into<Value>) -> Value {
        match self.find(parameter, measure) {
            Ok(index) => self.records[index].value.clone(),
            Err(_) => default.into(),
        }
    }

    /// Overwrite the first matching record in place, or append a new one.
    pub fn set(&mut self, value: impl Into<Value>, parameter: P, measure: Option<Measure>) {
        let value = value.into();
        match self.find(parameter, measure) {
            Ok(index) => self.records[index].value = value,
            Err(_) => self.records.push(ParamRecord {
                parameter,
                measure,
                value,
            }),
        }
    }
}
