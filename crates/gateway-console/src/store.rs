//! The console's single authoritative copy of the gateway configuration.
//!
//! Only a successful `load` or `save` replaces the held aggregate, and it is
//! always replaced with what the server returned. Failed calls leave it as it
//! was, so a caller holding a draft can simply retry.

use std::sync::Arc;

use crate::api::ControlApi;
use crate::draft::{self, Confirmation, ProviderDraft, SettingsForm};
use crate::error::{ConsoleError, Result};
use crate::model::GatewayConfig;

pub struct ConfigStore {
    api: Arc<dyn ControlApi>,
    config: GatewayConfig,
    loaded: bool,
}

impl ConfigStore {
    pub fn new(api: Arc<dyn ControlApi>) -> Self {
        Self {
            api,
            config: GatewayConfig::default(),
            loaded: false,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// True once a load or save has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn load(&mut self) -> Result<&GatewayConfig> {
        match self.api.get_config().await {
            Ok(config) => {
                tracing::info!("loaded gateway config (providers={})", config.providers.len());
                self.replace(config);
                Ok(&self.config)
            }
            Err(e) => Err(log_failure("load", e)),
        }
    }

    /// Send the complete aggregate and adopt the server's copy of it.
    pub async fn save(&mut self, config: &GatewayConfig) -> Result<&GatewayConfig> {
        match self.api.put_config(config).await {
            Ok(saved) => {
                tracing::info!("saved gateway config (providers={})", saved.providers.len());
                self.replace(saved);
                Ok(&self.config)
            }
            Err(e) => Err(log_failure("save", e)),
        }
    }

    /// Commit a provider draft against the held aggregate and persist it.
    /// The draft is only borrowed, so it survives a failed save.
    pub async fn save_draft(&mut self, draft: &ProviderDraft) -> Result<&GatewayConfig> {
        let next = draft::commit(draft, &self.config)?;
        self.save(&next).await
    }

    /// Delete the provider at `index` and persist. Returns false when the
    /// operator declined and nothing was sent.
    pub async fn delete_provider(
        &mut self,
        index: usize,
        confirmation: Confirmation,
    ) -> Result<bool> {
        match draft::delete_provider(&self.config, index, confirmation)? {
            Some(next) => {
                self.save(&next).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn save_settings(&mut self, form: &SettingsForm) -> Result<&GatewayConfig> {
        let next = form.apply(&self.config);
        self.save(&next).await
    }

    fn replace(&mut self, config: GatewayConfig) {
        self.config = config;
        self.loaded = true;
    }
}

fn log_failure(action: &str, e: ConsoleError) -> ConsoleError {
    if e.is_unauthenticated() {
        tracing::debug!("config {} needs a new session", action);
    } else {
        tracing::warn!("config {} failed: {}", action, e);
    }
    e
}
