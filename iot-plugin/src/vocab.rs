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

//! Token tables for topic segments and payload vocabularies.
//!
//! Every table is a closed Rust enum with a short wire token per member. The
//! per-plugin parameter vocabulary is declared the same way by each plugin and
//! only has to implement [`Token`]:
//!
//! ```ignore
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::IntoStaticStr)]
//! enum Sensor {
//!     #[strum(serialize = "temp")]
//!     Temperature,
//! }
//!
//! impl Token for Sensor {
//!     const KIND: &'static str = "parameter";
//! }
//! ```

use std::fmt;

use log::error;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::{PluginError, Result};

/// A member of a closed token table.
///
/// Raw input is matched first against the member's symbolic name (ASCII
/// case-insensitive, underscores ignored) and then against its exact wire
/// token, so `"STATUS"`, `"Status"` and `"state"` all name [`Category::Status`].
pub trait Token:
    Copy + Eq + fmt::Debug + IntoEnumIterator + Into<&'static str> + Send + Sync + 'static
{
    /// Table name used in diagnostics.
    const KIND: &'static str;

    /// Look up a member without logging a miss.
    fn try_lookup(input: &str) -> Option<Self> {
        let wanted = normalize(input);
        Self::iter()
            .find(|member| normalize(&member.name()) == wanted)
            .or_else(|| Self::iter().find(|member| member.wire() == input))
    }

    /// Look up a member, logging and returning `UnknownToken` on a miss.
    fn lookup(input: &str) -> Result<Self> {
        Self::try_lookup(input).ok_or_else(|| {
            error!("Unknown {} token '{}'", Self::KIND, input);
            PluginError::UnknownToken {
                kind: Self::KIND,
                input: input.to_string(),
            }
        })
    }

    /// Position of the member in its table.
    fn index(self) -> usize {
        Self::iter().take_while(|member| *member != self).count()
    }

    /// Member at `index`, or `UnknownToken` when out of range.
    fn from_index(index: usize) -> Result<Self> {
        Self::iter().nth(index).ok_or_else(|| {
            error!("Unknown {} index {}", Self::KIND, index);
            PluginError::UnknownToken {
                kind: Self::KIND,
                input: index.to_string(),
            }
        })
    }
}

/// Object-safe view of a token, used where the concrete table is not known
/// (composing a topic from a plugin-defined parameter).
pub trait WireToken: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    /// Token as it appears on the wire.
    fn wire(&self) -> &'static str;

    /// Symbolic member name, as used in log lines.
    fn name(&self) -> String {
        format!("{self:?}")
    }
}

impl<T: Token> WireToken for T {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn wire(&self) -> &'static str {
        (*self).into()
    }
}

fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Either an already-typed member or a raw string still to be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInput<'a, T> {
    Typed(T),
    Raw(&'a str),
}

impl<T: Token> TokenInput<'_, T> {
    /// Typed input short-circuits; raw input goes through [`Token::lookup`].
    pub fn resolve(self) -> Result<T> {
        match self {
            TokenInput::Typed(member) => Ok(member),
            TokenInput::Raw(input) => T::lookup(input),
        }
    }
}

impl<'a, T: Token> From<&'a str> for TokenInput<'a, T> {
    fn from(input: &'a str) -> Self {
        TokenInput::Raw(input)
    }
}

/// Resolve typed or raw input against the table `T`.
pub fn resolve<'a, T: Token>(input: impl Into<TokenInput<'a, T>>) -> Result<T> {
    input.into().resolve()
}

macro_rules! typed_input {
    ($($table:ty),+ $(,)?) => {
        $(
            impl<'a> From<$table> for TokenInput<'a, $table> {
                fn from(member: $table) -> Self {
                    TokenInput::Typed(member)
                }
            }
        )+
    };
}

typed_input!(Category, Measure, Status, Command);

/// Role of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Category {
    #[strum(serialize = "state")]
    Status,
    #[strum(serialize = "cmd")]
    Command,
    #[strum(serialize = "data")]
    Data,
}

impl Token for Category {
    const KIND: &'static str = "category";
}

/// Qualifier of a reported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Measure {
    #[strum(serialize = "val")]
    Value,
    #[strum(serialize = "def")]
    Default,
    #[strum(serialize = "min")]
    Minimum,
    #[strum(serialize = "max")]
    Maximum,
    #[strum(serialize = "avg")]
    Average,
    #[strum(serialize = "pctl")]
    Percentile,
    #[strum(serialize = "perc")]
    Percentage,
}

impl Token for Measure {
    const KIND: &'static str = "measure";
}

/// Life-cycle states announced on state and LWT topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Status {
    #[strum(serialize = "Online")]
    Online,
    #[strum(serialize = "Offline")]
    Offline,
    #[strum(serialize = "Active")]
    Active,
    #[strum(serialize = "Idle")]
    Idle,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl Token for Status {
    const KIND: &'static str = "status";
}

/// Inbound command payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Command {
    /// Request a full state publication.
    #[strum(serialize = "STATUS")]
    GetStatus,
    /// Reset parameters to their defaults.
    #[strum(serialize = "RESET")]
    Reset,
    #[strum(serialize = "ON")]
    TurnOn,
    #[strum(serialize = "OFF")]
    TurnOff,
    #[strum(serialize = "TOGGLE")]
    Toggle,
}

impl Token for Command {
    const KIND: &'static str = "command";
}
