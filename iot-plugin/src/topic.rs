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

//! Topic and log-line composition.
//!
//! Both renderings are built from the same structured inputs so the on-wire
//! topic and the diagnostic log line never disagree.

use crate::error::Result;
use crate::vocab::{Category, Measure, TokenInput, WireToken};

/// Separator between topic segments.
pub const SEPARATOR: &str = "/";

/// Multi-level wildcard segment.
pub const WILDCARD: &str = "#";

/// Render `<device_id>/<category>[/<parameter>][/<measure>]`.
///
/// Absent parameter or measure segments are omitted entirely. Raw category
/// or measure strings are validated and fail with `UnknownToken`.
pub fn compose_topic<'a>(
    device_id: &str,
    category: impl Into<TokenInput<'a, Category>>,
    parameter: Option<&dyn WireToken>,
    measure: Option<TokenInput<'a, Measure>>,
) -> Result<String> {
    let category = category.into().resolve()?;
    let measure = measure.map(TokenInput::resolve).transpose()?;

    let mut segments = vec![device_id, category.wire()];
    if let Some(parameter) = parameter {
        segments.push(parameter.wire());
    }
    if let Some(measure) = &measure {
        segments.push(measure.wire());
    }
    Ok(segments.join(SEPARATOR))
}

/// Subscription filter for every sub-topic of a device.
pub fn compose_wildcard_topic(device_id: &str) -> String {
    [device_id, WILDCARD].join(SEPARATOR)
}

/// Render the log counterpart of [`compose_topic`]:
/// `<Category>[ parameter=<p>][ measure=<m>]: <message>`.
pub fn compose_log<'a>(
    message: &str,
    category: impl Into<TokenInput<'a, Category>>,
    parameter: Option<&dyn WireToken>,
    measure: Option<TokenInput<'a, Measure>>,
) -> Result<String> {
    let category = category.into().resolve()?;
    let measure = measure.map(TokenInput::resolve).transpose()?;

    let mut line = category.name();
    if let Some(parameter) = parameter {
        line.push_str(&format!(" parameter={}", parameter.wire()));
    }
    if let Some(measure) = &measure {
        line.push_str(&format!(" measure={}", measure.wire()));
    }
    line.push_str(": ");
    line.push_str(message);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::vocab::Token;
    use strum::{EnumIter, IntoStaticStr};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
    enum Weather {
        #[strum(serialize = "temp")]
        Temperature,
    }

    impl Token for Weather {
        const KIND: &'static str = "parameter";
    }

    #[test]
    fn test_category_only() {
        let topic = compose_topic("dev1", Category::Status, None, None).unwrap();
        assert_eq!(topic, "dev1/state");
    }

    #[test]
    fn test_with_parameter_and_measure() {
        let topic =
            compose_topic("dev1", Category::Status, Some(&Weather::Temperature), None).unwrap();
        assert_eq!(topic, "dev1/state/temp");

        let topic = compose_topic(
            "dev1",
            Category::Status,
            Some(&Weather::Temperature),
            Some(Measure::Maximum.into()),
        )
        .unwrap();
        assert_eq!(topic, "dev1/state/temp/max");
    }

    #[test]
    fn test_measure_without_parameter_has_no_empty_segment() {
        let topic =
            compose_topic("dev1", Category::Data, None, Some(Measure::Average.into())).unwrap();
        assert_eq!(topic, "dev1/data/avg");
    }

    #[test]
    fn test_raw_tokens() {
        let topic = compose_topic("dev1", "cmd", None, Some("min".into())).unwrap();
        assert_eq!(topic, "dev1/cmd/min");
    }

    #[test]
    fn test_unknown_category_propagates() {
        let err = compose_topic("dev1", "bogus", None, None).unwrap_err();
        assert!(matches!(err, PluginError::UnknownToken { kind: "category", .. }));

        let err = compose_log("msg", Category::Data, None, Some("median".into())).unwrap_err();
        assert!(matches!(err, PluginError::UnknownToken { kind: "measure", .. }));
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(compose_wildcard_topic("dev1"), "dev1/#");
    }

    #[test]
    fn test_log_line() {
        let line = compose_log(
            "21.5",
            Category::Status,
            Some(&Weather::Temperature),
            Some(Measure::Value.into()),
        )
        .unwrap();
        assert_eq!(line, "Status parameter=temp measure=val: 21.5");

        let line = compose_log("hello", "data", None, None).unwrap();
        assert_eq!(line, "Data: hello");
    }
}
