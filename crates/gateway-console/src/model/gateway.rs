//! The root aggregate: the only unit of persistence and reload.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Provider, int_or, null_as_default, parse_lenient};
use crate::modelmap;

pub const DEFAULT_PORT: u16 = 3029;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Zero, negative and out-of-range stored values read as 3029.
    #[serde(default = "default_port", deserialize_with = "stored_port")]
    pub port: u16,
    /// Gateway-wide inbound key; empty disables inbound authentication.
    #[serde(default)]
    pub api_key: String,
    /// Password for the console login gate.
    #[serde(default)]
    pub admin_password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<Provider>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn stored_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    int_or(deserializer, |v: &u16| *v > 0, DEFAULT_PORT)
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: String::new(),
            admin_password: String::new(),
            providers: Vec::new(),
        }
    }
}

/// Headline numbers for the overview screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSummary {
    pub provider_count: usize,
    /// Distinct client-facing names across all providers, enabled or not.
    pub model_count: usize,
    pub port: u16,
    pub auth_enabled: bool,
}

impl GatewayConfig {
    pub fn provider_index(&self, id: &str) -> Option<usize> {
        self.providers.iter().position(|p| p.id == id)
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            provider_count: self.providers.len(),
            model_count: modelmap::count_distinct_sources(&self.providers),
            port: self.port,
            auth_enabled: !self.api_key.is_empty(),
        }
    }
}

/// Lenient port parsing: anything that is not a port in 1..=65535 becomes 3029.
pub fn parse_port(raw: &str) -> u16 {
    parse_lenient::<u16>(raw, |v| *v > 0).unwrap_or(DEFAULT_PORT)
}
