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

//! Splitting inbound topics into typed segments for a plugin's vocabulary.

use iot_plugin::topic::SEPARATOR;
use iot_plugin::{Category, Inbound, Measure, Token};
use thiserror::Error;

/// Why an inbound publish could not be mapped onto a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("malformed topic '{0}'")]
    Malformed(String),

    #[error("unknown segment '{segment}' in topic '{topic}'")]
    UnknownSegment { topic: String, segment: String },

    #[error("payload on topic '{0}' is not valid UTF-8")]
    Payload(String),
}

/// Parse `<device>/<category>[/<parameter>][/<measure>]` against the
/// parameter vocabulary `P`.
///
/// A lone third segment is read as a parameter when `P` knows it and as a
/// measure otherwise.
pub fn parse_topic<P: Token>(topic: &str, payload: &[u8]) -> Result<Inbound<P>, RouteError> {
    let segments: Vec<&str> = topic.split(SEPARATOR).collect();
    if !(2..=4).contains(&segments.len()) || segments.iter().any(|s| s.is_empty()) {
        return Err(RouteError::Malformed(topic.to_string()));
    }

    let unknown = |segment: &str| RouteError::UnknownSegment {
        topic: topic.to_string(),
        segment: segment.to_string(),
    };

    let category = Category::try_lookup(segments[1]).ok_or_else(|| unknown(segments[1]))?;
    let (parameter, measure) = match segments[2..] {
        [] => (None, None),
        [third] => match P::try_lookup(third) {
            Some(parameter) => (Some(parameter), None),
            None => (None, Some(Measure::try_lookup(third).ok_or_else(|| unknown(third))?)),
        },
        [third, fourth] => (
            Some(P::try_lookup(third).ok_or_else(|| unknown(third))?),
            Some(Measure::try_lookup(fourth).ok_or_else(|| unknown(fourth))?),
        ),
        _ => return Err(RouteError::Malformed(topic.to_string())),
    };

    let value = std::str::from_utf8(payload)
        .map_err(|_| RouteError::Payload(topic.to_string()))?
        .to_string();

    Ok(Inbound {
        device_id: segments[0].to_string(),
        category,
        parameter,
        measure,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumIter, IntoStaticStr};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
    enum Param {
        #[strum(serialize = "temp")]
        Temp,
        #[strum(serialize = "fan")]
        Fan,
    }

    impl Token for Param {
        const KIND: &'static str = "parameter";
    }

    #[test]
    fn test_category_only() {
        let inbound = parse_topic::<Param>("dev1/cmd", b"STATUS").unwrap();
        assert_eq!(inbound.device_id, "dev1");
        assert_eq!(inbound.category, Category::Command);
        assert_eq!(inbound.parameter, None);
        assert_eq!(inbound.measure, None);
        assert_eq!(inbound.value, "STATUS");
    }

    #[test]
    fn test_full_topic() {
        let inbound = parse_topic::<Param>("dev2/state/temp/max", b"30.5").unwrap();
        assert_eq!(inbound.category, Category::Status);
        assert_eq!(inbound.parameter, Some(Param::Temp));
        assert_eq!(inbound.measure, Some(Measure::Maximum));
        assert_eq!(inbound.value, "30.5");
    }

    #[test]
    fn test_third_segment_parameter_or_measure() {
        let inbound = parse_topic::<Param>("dev2/cmd/fan", b"ON").unwrap();
        assert_eq!(inbound.parameter, Some(Param::Fan));
        assert_eq!(inbound.measure, None);

        let inbound = parse_topic::<Param>("dev2/data/avg", b"1").unwrap();
        assert_eq!(inbound.parameter, None);
        assert_eq!(inbound.measure, Some(Measure::Average));
    }

    #[test]
    fn test_malformed() {
        for topic in ["dev1", "dev1/state/temp/val/extra", "dev1//temp", "/state"] {
            assert_eq!(
                parse_topic::<Param>(topic, b"").unwrap_err(),
                RouteError::Malformed(topic.to_string())
            );
        }
    }

    #[test]
    fn test_unknown_segments() {
        let err = parse_topic::<Param>("dev1/status_report", b"").unwrap_err();
        assert!(matches!(
            err,
            RouteError::UnknownSegment { segment, .. } if segment == "status_report"
        ));

        let err = parse_topic::<Param>("dev1/state/rssi", b"").unwrap_err();
        assert!(matches!(err, RouteError::UnknownSegment { segment, .. } if segment == "rssi"));

        let err = parse_topic::<Param>("dev1/state/temp/median", b"").unwrap_err();
        assert!(matches!(err, RouteError::UnknownSegment { segment, .. } if segment == "median"));
    }

    #[test]
    fn test_invalid_payload() {
        let err = parse_topic::<Param>("dev1/cmd", &[0xff, 0xfe]).unwrap_err();
        assert_eq!(err, RouteError::Payload("dev1/cmd".into()));
    }
}
