//! Scenario transfer strings for sharing tank setups on a single line.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::settings::PolicyKind;

const SCENARIO_DOMAIN: &str = "tank";
const SCENARIO_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SCENARIO_HEADER: &str = "tank:v1";
/// Delimiter used to separate the prefix, grid size and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a complete simulation setup.
///
/// The scenario describes configuration only; no session state travels with
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioSnapshot {
    /// Edge length of the square tank grid.
    pub(crate) size: u32,
    /// Warning threshold expressed as a whole percentage.
    pub(crate) warning_threshold_percent: u8,
    /// Fill policy the deployment runs.
    pub(crate) policy: PolicyKind,
    /// Milliseconds of simulated time between flood fill steps.
    pub(crate) fill_interval_ms: u64,
    /// Optional cap on total simulated fill time, in milliseconds.
    pub(crate) time_budget_ms: Option<u64>,
    /// Cells added per fill action under the manual policy.
    pub(crate) increment: u32,
    /// Maximum number of fill actions per lifecycle under the manual policy.
    pub(crate) max_fills: u32,
}

impl ScenarioSnapshot {
    /// Encodes the scenario into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableScenario {
            warning_threshold_percent: self.warning_threshold_percent,
            policy: self.policy,
            fill_interval_ms: self.fill_interval_ms,
            time_budget_ms: self.time_budget_ms,
            increment: self.increment,
            max_fills: self.max_fills,
        };
        let json = serde_json::to_vec(&payload).expect("scenario serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SCENARIO_HEADER}:{}:{encoded}", self.size)
    }

    /// Decodes a scenario from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ScenarioTransferError::MissingVersion)?;
        let size = parts.next().ok_or(ScenarioTransferError::MissingSize)?;
        let payload = parts.next().ok_or(ScenarioTransferError::MissingPayload)?;

        if domain != SCENARIO_DOMAIN {
            return Err(ScenarioTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SCENARIO_VERSION {
            return Err(ScenarioTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let size = parse_size(size)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ScenarioTransferError::InvalidEncoding)?;
        let decoded: SerializableScenario =
            serde_json::from_slice(&bytes).map_err(ScenarioTransferError::InvalidPayload)?;

        Ok(Self {
            size,
            warning_threshold_percent: decoded.warning_threshold_percent,
            policy: decoded.policy,
            fill_interval_ms: decoded.fill_interval_ms,
            time_budget_ms: decoded.time_budget_ms,
            increment: decoded.increment,
            max_fills: decoded.max_fills,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableScenario {
    warning_threshold_percent: u8,
    policy: PolicyKind,
    fill_interval_ms: u64,
    time_budget_ms: Option<u64>,
    increment: u32,
    max_fills: u32,
}

/// Errors that can occur while decoding scenario transfer strings.
#[derive(Debug)]
pub(crate) enum ScenarioTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    MissingVersion,
    /// The encoded scenario did not include the grid size.
    MissingSize,
    /// The encoded scenario did not include the payload segment.
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid size could not be parsed from the encoded scenario.
    InvalidSize(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ScenarioTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "scenario string was empty"),
            Self::MissingPrefix => write!(f, "scenario string is missing the prefix"),
            Self::MissingVersion => write!(f, "scenario string is missing the version"),
            Self::MissingSize => write!(f, "scenario string is missing the grid size"),
            Self::MissingPayload => write!(f, "scenario string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "scenario prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "scenario version '{version}' is not supported")
            }
            Self::InvalidSize(size) => write!(f, "could not parse grid size '{size}'"),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode scenario payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse scenario payload: {error}")
            }
        }
    }
}

impl Error for ScenarioTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_size(size: &str) -> Result<u32, ScenarioTransferError> {
    let parsed = size
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioTransferError::InvalidSize(size.to_owned()))?;

    if parsed == 0 {
        return Err(ScenarioTransferError::InvalidSize(size.to_owned()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_flood_scenario() {
        let scenario = ScenarioSnapshot {
            size: 20,
            warning_threshold_percent: 80,
            policy: PolicyKind::Flood,
            fill_interval_ms: 100,
            time_budget_ms: Some(30_000),
            increment: 5,
            max_fills: 20,
        };

        let encoded = scenario.encode();
        assert!(encoded.starts_with(&format!("{SCENARIO_HEADER}:20:")));

        let decoded = ScenarioSnapshot::decode(&encoded).expect("scenario decodes");
        assert_eq!(scenario, decoded);
    }

    #[test]
    fn round_trip_manual_scenario() {
        let scenario = ScenarioSnapshot {
            size: 10,
            warning_threshold_percent: 80,
            policy: PolicyKind::Manual,
            fill_interval_ms: 100,
            time_budget_ms: None,
            increment: 5,
            max_fills: 20,
        };

        let decoded = ScenarioSnapshot::decode(&scenario.encode()).expect("scenario decodes");
        assert_eq!(scenario, decoded);
    }

    #[test]
    fn rejects_foreign_prefixes_and_versions() {
        assert!(matches!(
            ScenarioSnapshot::decode("silo:v1:10:abc"),
            Err(ScenarioTransferError::InvalidPrefix(_))
        ));
        assert!(matches!(
            ScenarioSnapshot::decode("tank:v2:10:abc"),
            Err(ScenarioTransferError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn rejects_zero_and_malformed_sizes() {
        assert!(matches!(
            ScenarioSnapshot::decode("tank:v1:0:abc"),
            Err(ScenarioTransferError::InvalidSize(_))
        ));
        assert!(matches!(
            ScenarioSnapshot::decode("tank:v1:ten:abc"),
            Err(ScenarioTransferError::InvalidSize(_))
        ));
    }

    #[test]
    fn rejects_empty_strings() {
        assert!(matches!(
            ScenarioSnapshot::decode("   "),
            Err(ScenarioTransferError::EmptyPayload)
        ));
    }
}
