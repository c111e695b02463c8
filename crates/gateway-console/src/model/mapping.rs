//! A single client-facing → upstream model name translation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMapping {
    /// Name clients send in their requests.
    pub from: String,
    /// Name forwarded to the upstream.
    pub to: String,
    /// Disabled mappings are kept but never routed.
    #[serde(default)]
    pub enabled: bool,
}

impl ModelMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Both names present after trimming; incomplete rows are never persisted.
    pub fn is_complete(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_incomplete() {
        assert!(ModelMapping::new("gpt-4o", "gpt-4o-mini").is_complete());
        assert!(!ModelMapping::new("", "gpt-4o-mini").is_complete());
        assert!(!ModelMapping::new("gpt-4o", "   ").is_complete());
    }

    #[test]
    fn missing_enabled_reads_as_false() {
        let m: ModelMapping = serde_json::from_str(r#"{"from":"a","to":"b"}"#).unwrap();
        assert!(!m.enabled);
    }
}
