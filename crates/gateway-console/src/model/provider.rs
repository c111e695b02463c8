//! Upstream provider definitions and their wire dialects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::{ModelMapping, int_or, null_as_default, parse_lenient};

pub const DEFAULT_WEIGHT: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Wire dialect the gateway speaks to an upstream.
///
/// The gateway serves every type other than `anthropic` with the OpenAI
/// dialect, so unknown stored values read as [`ProviderKind::Openai`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API (`/v1/messages`).
    #[default]
    Anthropic,
    /// OpenAI-compatible API (`/v1/chat/completions`, `/v1/models`).
    Openai,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Anthropic, ProviderKind::Openai];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Openai => "openai",
        }
    }
}

impl<'de> Deserialize<'de> for ProviderKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw.parse::<ProviderKind>().unwrap_or_else(|_| {
            tracing::warn!("provider type '{}' is not recognized; treating it as openai", raw);
            ProviderKind::Openai
        }))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| {
                format!(
                    "unknown provider type '{}' (expected one of: {})",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

/// One configured upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Operator-chosen identifier, unique within the aggregate.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,
    pub base_url: String,
    /// May be empty for keyless upstreams.
    #[serde(default)]
    pub api_key: String,
    /// Relative traffic share among providers serving the same model.
    #[serde(default = "default_weight", deserialize_with = "stored_weight")]
    pub weight: u32,
    /// Per-request budget in seconds.
    #[serde(default = "default_timeout", deserialize_with = "stored_timeout")]
    pub timeout: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<ModelMapping>,
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn stored_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    int_or(deserializer, |_| true, DEFAULT_WEIGHT)
}

fn stored_timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    int_or(deserializer, |v: &u64| *v > 0, DEFAULT_TIMEOUT_SECS)
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            kind: ProviderKind::default(),
            base_url: String::new(),
            api_key: String::new(),
            weight: DEFAULT_WEIGHT,
            timeout: DEFAULT_TIMEOUT_SECS,
            models: Vec::new(),
        }
    }
}

impl Provider {
    /// Display label: the name when set, otherwise the id.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Lenient weight parsing: anything that is not a non-negative integer becomes 1.
pub fn parse_weight(raw: &str) -> u32 {
    parse_lenient::<u32>(raw, |_| true).unwrap_or(DEFAULT_WEIGHT)
}

/// Lenient timeout parsing: anything that is not a positive integer becomes 300.
pub fn parse_timeout(raw: &str) -> u64 {
    parse_lenient::<u64>(raw, |v| *v > 0).unwrap_or(DEFAULT_TIMEOUT_SECS)
}
