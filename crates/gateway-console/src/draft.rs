//! Provider drafts and settings forms.
//!
//! A draft is a value copy of a provider taken out of the aggregate (or a
//! fresh one with defaults). Edits stay in the draft until [`commit`] folds it
//! back into a copy of the aggregate, which the caller then persists through
//! the store. Nothing here touches the network.

use crate::error::{ConsoleError, Result};
use crate::model::{
    GatewayConfig, ModelMapping, Provider, ProviderKind, parse_port, parse_timeout, parse_weight,
};
use crate::modelmap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDraft {
    pub provider: Provider,
    /// Index the draft was opened from; `None` for a new provider.
    origin: Option<usize>,
}

impl Default for ProviderDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderDraft {
    /// A blank provider: first supported kind, weight 1, timeout 300, no mappings.
    pub fn new() -> Self {
        Self {
            provider: Provider::default(),
            origin: None,
        }
    }

    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn is_edit(&self) -> bool {
        self.origin.is_some()
    }

    pub fn set_kind(&mut self, kind: ProviderKind) {
        self.provider.kind = kind;
    }

    pub fn set_weight(&mut self, raw: &str) {
        self.provider.weight = parse_weight(raw);
    }

    pub fn set_timeout(&mut self, raw: &str) {
        self.provider.timeout = parse_timeout(raw);
    }

    /// Append a mapping row. Either name may be blank while editing; blank rows
    /// are dropped when the draft is serialized.
    pub fn add_mapping(&mut self, from: impl Into<String>, to: impl Into<String>, enabled: bool) {
        self.provider.models.push(ModelMapping {
            from: from.into(),
            to: to.into(),
            enabled,
        });
    }

    pub fn remove_mapping(&mut self, index: usize) -> Option<ModelMapping> {
        if index < self.provider.models.len() {
            Some(self.provider.models.remove(index))
        } else {
            None
        }
    }

    /// Add `name → name` rows for models picked from an upstream listing.
    pub fn add_picked<I, S>(&mut self, picked: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        modelmap::add_picked(&mut self.provider.models, picked)
    }

    /// The provider as it goes over the wire: text fields trimmed and
    /// incomplete mapping rows removed.
    pub fn to_provider(&self) -> Provider {
        let p = &self.provider;
        Provider {
            id: p.id.trim().to_string(),
            name: p.name.trim().to_string(),
            kind: p.kind,
            base_url: p.base_url.trim().to_string(),
            api_key: p.api_key.trim().to_string(),
            weight: p.weight,
            timeout: p.timeout,
            models: modelmap::persistable(&p.models),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.provider;
        if p.id.trim().is_empty() || p.base_url.trim().is_empty() {
            return Err(ConsoleError::validation("provider id and base_url are required"));
        }
        Ok(())
    }
}

/// Open a draft: a value copy of the provider at `existing_index`, or a new one.
pub fn open_draft(config: &GatewayConfig, existing_index: Option<usize>) -> Result<ProviderDraft> {
    match existing_index {
        None => Ok(ProviderDraft::new()),
        Some(index) => {
            let provider = config.providers.get(index).cloned().ok_or_else(|| {
                ConsoleError::validation(format!("no provider at index {index}"))
            })?;
            tracing::debug!("opened draft for provider '{}' (index={})", provider.id, index);
            Ok(ProviderDraft {
                provider,
                origin: Some(index),
            })
        }
    }
}

/// Fold a draft into a copy of `target`: replace at the draft's origin, or
/// append a new provider. `target` itself is never modified.
pub fn commit(draft: &ProviderDraft, target: &GatewayConfig) -> Result<GatewayConfig> {
    draft.validate()?;
    let provider = draft.to_provider();
    let clash = target.provider_index(&provider.id);
    let mut next = target.clone();
    match draft.origin {
        Some(index) => {
            if index >= next.providers.len() {
                return Err(ConsoleError::validation(format!(
                    "provider at index {index} no longer exists"
                )));
            }
            if clash.is_some_and(|other| other != index) {
                return Err(ConsoleError::validation(format!(
                    "provider id '{}' is already in use",
                    provider.id
                )));
            }
            next.providers[index] = provider;
        }
        None => {
            if clash.is_some() {
                return Err(ConsoleError::validation(format!(
                    "provider id '{}' is already in use",
                    provider.id
                )));
            }
            next.providers.push(provider);
        }
    }
    Ok(next)
}

/// Operator answer to "delete this provider?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Declined,
}

/// Remove the provider at `index` from a copy of `target`. Returns `None` when
/// the operator declined, leaving nothing to persist.
pub fn delete_provider(
    target: &GatewayConfig,
    index: usize,
    confirmation: Confirmation,
) -> Result<Option<GatewayConfig>> {
    if index >= target.providers.len() {
        return Err(ConsoleError::validation(format!("no provider at index {index}")));
    }
    if confirmation == Confirmation::Declined {
        return Ok(None);
    }
    let mut next = target.clone();
    let removed = next.providers.remove(index);
    tracing::debug!("removed provider '{}' from draft aggregate", removed.id);
    Ok(Some(next))
}

/// Gateway-wide settings as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub port: String,
    pub api_key: String,
    pub admin_password: String,
}

impl SettingsForm {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            port: config.port.to_string(),
            api_key: config.api_key.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    /// A copy of `target` with these settings applied; providers are untouched.
    pub fn apply(&self, target: &GatewayConfig) -> GatewayConfig {
        GatewayConfig {
            port: parse_port(&self.port),
            api_key: self.api_key.trim().to_string(),
            admin_password: self.admin_password.trim().to_string(),
            providers: target.providers.clone(),
        }
    }
}
