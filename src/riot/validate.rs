//! Payload validation.
//!
//! Turns a decoded JSON body into a typed DTO or a [`ValidationFailure`]
//! naming the endpoint family and the offending field path. Required fields
//! are never defaulted; a missing one is always a failure.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The shape a payload is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointFamily {
    Account,
    Summoner,
    LeagueEntries,
    ChampionMasteries,
    LeagueList,
    MatchIds,
    Match,
}

impl std::fmt::Display for EndpointFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EndpointFamily::Account => "account",
            EndpointFamily::Summoner => "summoner",
            EndpointFamily::LeagueEntries => "league-entries",
            EndpointFamily::ChampionMasteries => "champion-masteries",
            EndpointFamily::LeagueList => "league-list",
            EndpointFamily::MatchIds => "match-ids",
            EndpointFamily::Match => "match",
        };
        write!(f, "{}", name)
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path into the payload, e.g. `info.participants[3].win`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Payload did not match the expected shape.
#[derive(Debug, Clone, Error)]
#[error("{family} payload failed validation: {}", render(.violations))]
pub struct ValidationFailure {
    pub family: EndpointFamily,
    pub violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    /// Path of the first violation.
    pub fn path(&self) -> Option<&str> {
        self.violations.first().map(|v| v.path.as_str())
    }
}

/// Parse `payload` into `T`.
///
/// serde stops at the first error, so a failure carries exactly one
/// violation. For a missing field, serde reports the path of the enclosing
/// object; the field name is appended so the path points at the field itself.
pub fn validate<T: DeserializeOwned>(
    family: EndpointFamily,
    payload: Value,
) -> Result<T, ValidationFailure> {
    serde_path_to_error::deserialize(payload).map_err(|err| {
        let mut path = err.path().to_string();
        let message = err.inner().to_string();

        if let Some(field) = missing_field(&message) {
            path = if path == "." {
                field.to_string()
            } else {
                format!("{}.{}", path, field)
            };
        }

        ValidationFailure {
            family,
            violations: vec![Violation { path, message }],
        }
    })
}

/// Extract `x` from serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}
