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

//! Error types shared by the plugin core.

use thiserror::Error;

/// Errors raised by vocabulary resolution and registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// A string (or index) does not name a member of the given token table.
    #[error("unknown {kind} token '{input}'")]
    UnknownToken { kind: &'static str, input: String },

    /// No registry record matches the (parameter, measure) key.
    #[error("no record for parameter '{parameter}' with measure '{measure}'")]
    NotFound { parameter: String, measure: String },
}

pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_message() {
        let err = PluginError::UnknownToken {
            kind: "category",
            input: "bogus".into(),
        };
        assert_eq!(err.to_string(), "unknown category token 'bogus'");
    }
}
