//! In-memory control API for store, verification and session tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{
    AuthCheck, ConnectivityReport, ControlApi, LoginResponse, ModelListResponse, ModelTestReport,
};
use crate::error::{ConsoleError, Result};
use crate::model::{GatewayConfig, Provider};

#[derive(Default)]
pub(crate) struct FakeControlApi {
    pub stored: Mutex<GatewayConfig>,
    pub password: Option<String>,
    pub logged_in: AtomicBool,
    /// Every call answers 401.
    pub expired: AtomicBool,
    /// `put_config` answers HTTP 500.
    pub fail_saves: AtomicBool,
    pub connectivity: Mutex<Option<Result<ConnectivityReport>>>,
    pub listing: Mutex<Option<Result<ModelListResponse>>>,
    pub model_report: Mutex<Option<Result<ModelTestReport>>>,
    pub probed: Mutex<Vec<Provider>>,
    pub puts: AtomicUsize,
}

impl FakeControlApi {
    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            stored: Mutex::new(config),
            ..Default::default()
        }
    }

    fn gate(&self) -> Result<()> {
        if self.expired.load(Ordering::SeqCst) {
            return Err(ConsoleError::Unauthenticated);
        }
        if self.password.is_some() && !self.logged_in.load(Ordering::SeqCst) {
            return Err(ConsoleError::Unauthenticated);
        }
        Ok(())
    }

    fn take<T: Default>(slot: &Mutex<Option<Result<T>>>) -> Result<T> {
        slot.lock().unwrap().take().unwrap_or_else(|| Ok(T::default()))
    }
}

#[async_trait]
impl ControlApi for FakeControlApi {
    async fn auth_check(&self) -> Result<AuthCheck> {
        Ok(AuthCheck {
            need_login: self.password.is_some() && !self.logged_in.load(Ordering::SeqCst),
        })
    }

    async fn login(&self, password: &str) -> Result<LoginResponse> {
        match &self.password {
            Some(expected) if expected != password => Ok(LoginResponse {
                ok: false,
                error: Some("wrong password".into()),
            }),
            _ => {
                self.logged_in.store(true, Ordering::SeqCst);
                Ok(LoginResponse {
                    ok: true,
                    error: None,
                })
            }
        }
    }

    async fn get_config(&self) -> Result<GatewayConfig> {
        self.gate()?;
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn put_config(&self, config: &GatewayConfig) -> Result<GatewayConfig> {
        self.gate()?;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ConsoleError::failed(Some(500), "save failed"));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        // The server is authoritative; fill in a default the way a real one might.
        let mut saved = config.clone();
        for p in &mut saved.providers {
            if p.name.is_empty() {
                p.name = p.id.clone();
            }
        }
        *self.stored.lock().unwrap() = saved.clone();
        Ok(saved)
    }

    async fn test_provider(&self, provider: &Provider) -> Result<ConnectivityReport> {
        self.gate()?;
        self.probed.lock().unwrap().push(provider.clone());
        Self::take(&self.connectivity)
    }

    async fn list_models(&self, provider: &Provider) -> Result<ModelListResponse> {
        self.gate()?;
        self.probed.lock().unwrap().push(provider.clone());
        Self::take(&self.listing)
    }

    async fn test_model(&self, provider: &Provider, _model: &str) -> Result<ModelTestReport> {
        self.gate()?;
        self.probed.lock().unwrap().push(provider.clone());
        Self::take(&self.model_report)
    }
}
