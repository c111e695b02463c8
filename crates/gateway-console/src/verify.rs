//! Probes of a live upstream using a provider's connection parameters.
//!
//! Probes never require the provider to be saved. Transport and upstream
//! failures come back inside the result (`ok = false`, `status` absent when
//! nothing answered); only `Unauthenticated` and local validation errors are
//! returned as `Err`.

use std::sync::Arc;
use std::time::Instant;

use crate::api::ControlApi;
use crate::draft::ProviderDraft;
use crate::error::{ConsoleError, Result};
use crate::model::Provider;
use crate::modelmap;

/// Longest reply excerpt kept from a model test, in characters.
pub const REPLY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityResult {
    pub ok: bool,
    pub status: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelListing {
    /// Raw upstream list, unfiltered. Empty is not an error.
    pub models: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTestResult {
    pub ok: bool,
    pub status: Option<u16>,
    pub latency_ms: u64,
    pub reply: Option<String>,
    pub error: Option<String>,
}

pub struct VerificationService {
    api: Arc<dyn ControlApi>,
}

impl VerificationService {
    pub fn new(api: Arc<dyn ControlApi>) -> Self {
        Self { api }
    }

    pub async fn test_connectivity(&self, draft: &ProviderDraft) -> Result<ConnectivityResult> {
        let provider = probe_target(draft)?;
        tracing::debug!("testing connectivity of '{}' ({})", provider.id, provider.kind);
        let result = match self.api.test_provider(&provider).await {
            Ok(report) => ConnectivityResult {
                ok: report.ok,
                status: report.status,
                error: if report.ok {
                    None
                } else {
                    Some(
                        report
                            .error
                            .or(report.body)
                            .unwrap_or_else(|| describe_status(report.status)),
                    )
                },
            },
            Err(e) => {
                let (status, detail) = fold_failure(e)?;
                ConnectivityResult {
                    ok: false,
                    status,
                    error: Some(detail),
                }
            }
        };
        if result.ok {
            tracing::info!("provider '{}' reachable (status={:?})", provider.id, result.status);
        } else {
            tracing::warn!(
                "provider '{}' connectivity failed (status={:?})",
                provider.id,
                result.status
            );
        }
        Ok(result)
    }

    pub async fn list_models(&self, draft: &ProviderDraft) -> Result<ModelListing> {
        let provider = probe_target(draft)?;
        let listing = match self.api.list_models(&provider).await {
            Ok(resp) => match resp.error {
                Some(error) => ModelListing {
                    models: Vec::new(),
                    error: Some(error),
                },
                None => ModelListing {
                    models: resp.models.unwrap_or_default(),
                    error: None,
                },
            },
            Err(e) => {
                let (_, detail) = fold_failure(e)?;
                ModelListing {
                    models: Vec::new(),
                    error: Some(detail),
                }
            }
        };
        match &listing.error {
            None => tracing::info!(
                "provider '{}' lists {} model(s)",
                provider.id,
                listing.models.len()
            ),
            Some(e) => tracing::warn!("listing models of '{}' failed: {}", provider.id, e),
        }
        Ok(listing)
    }

    /// One minimal completion call of `model` through `provider`.
    pub async fn test_model(&self, provider: &Provider, model: &str) -> Result<ModelTestResult> {
        if provider.base_url.trim().is_empty() {
            return Err(ConsoleError::validation("provider base_url is required"));
        }
        let model = model.trim();
        if model.is_empty() {
            return Err(ConsoleError::validation("model name is required"));
        }
        let started = Instant::now();
        let outcome = self.api.test_model(provider, model).await;
        let elapsed = started.elapsed().as_millis() as u64;
        let result = match outcome {
            Ok(report) => ModelTestResult {
                ok: report.ok,
                status: report.status,
                latency_ms: report.latency_ms.unwrap_or(elapsed),
                reply: if report.ok {
                    report.reply.map(|r| excerpt(&r, REPLY_EXCERPT_CHARS))
                } else {
                    None
                },
                error: if report.ok {
                    None
                } else {
                    Some(report.error.unwrap_or_else(|| describe_status(report.status)))
                },
            },
            Err(e) => {
                let (status, detail) = fold_failure(e)?;
                ModelTestResult {
                    ok: false,
                    status,
                    latency_ms: elapsed,
                    reply: None,
                    error: Some(detail),
                }
            }
        };
        tracing::info!(
            provider = %provider.id,
            model = %model,
            ok = result.ok,
            latency_ms = result.latency_ms,
            "model test finished"
        );
        Ok(result)
    }
}

/// Models worth testing for a provider: its distinct mapping targets.
pub fn model_candidates(provider: &Provider) -> Result<Vec<String>> {
    let targets = modelmap::distinct_targets(&provider.models);
    if targets.is_empty() {
        return Err(ConsoleError::validation(format!(
            "provider '{}' has no mapped models",
            provider.id
        )));
    }
    Ok(targets)
}

fn probe_target(draft: &ProviderDraft) -> Result<Provider> {
    let provider = draft.to_provider();
    if provider.base_url.is_empty() {
        return Err(ConsoleError::validation("provider base_url is required"));
    }
    Ok(provider)
}

/// Keep `Unauthenticated` as an error; everything else becomes (status, detail).
fn fold_failure(e: ConsoleError) -> Result<(Option<u16>, String)> {
    match e {
        ConsoleError::Unauthenticated => Err(ConsoleError::Unauthenticated),
        ConsoleError::OperationFailed { status, detail } => Ok((status, detail)),
        other => Ok((None, other.to_string())),
    }
}

fn describe_status(status: Option<u16>) -> String {
    match status {
        Some(code) => format!("upstream answered HTTP {code}"),
        None => "upstream did not respond".to_string(),
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeControlApi;
    use crate::api::{ConnectivityReport, HttpControlClient, ModelListResponse, ModelTestReport};
    use crate::model::ModelMapping;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn draft() -> ProviderDraft {
        let mut d = ProviderDraft::new();
        d.provider.id = " p1 ".into();
        d.provider.base_url = "https://api.example.com".into();
        d.add_mapping("gpt-4o", "gpt-4o-mini", true);
        d.add_mapping("half", "", true);
        d
    }

    fn p1() -> Provider {
        draft().to_provider()
    }

    fn service(api: &Arc<FakeControlApi>) -> VerificationService {
        VerificationService::new(api.clone())
    }

    #[tokio::test]
    async fn connectivity_probes_unsaved_normalized_draft() {
        let api = Arc::new(FakeControlApi::default());
        *api.connectivity.lock().unwrap() = Some(Ok(ConnectivityReport {
            ok: true,
            status: Some(200),
            error: None,
            body: Some("{}".into()),
        }));
        let r = service(&api).test_connectivity(&draft()).await.unwrap();
        assert_eq!(
            r,
            ConnectivityResult {
                ok: true,
                status: Some(200),
                error: None
            }
        );
        let probed = api.probed.lock().unwrap();
        assert_eq!(probed[0].id, "p1");
        assert_eq!(probed[0].models.len(), 1);
        assert_eq!(api.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connectivity_failure_falls_back_to_body() {
        let api = Arc::new(FakeControlApi::default());
        *api.connectivity.lock().unwrap() = Some(Ok(ConnectivityReport {
            ok: false,
            status: Some(503),
            error: None,
            body: Some("overloaded".into()),
        }));
        let r = service(&api).test_connectivity(&draft()).await.unwrap();
        assert!(!r.ok);
        assert_eq!(r.status, Some(503));
        assert_eq!(r.error.as_deref(), Some("overloaded"));
    }

    #[tokio::test]
    async fn missing_base_url_is_rejected_locally() {
        let api = Arc::new(FakeControlApi::default());
        let mut d = draft();
        d.provider.base_url = "  ".into();
        let err = service(&api).test_connectivity(&d).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Validation { .. }));
        assert!(api.probed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_listing_is_not_an_error() {
        let api = Arc::new(FakeControlApi::default());
        *api.listing.lock().unwrap() = Some(Ok(ModelListResponse {
            models: None,
            error: None,
        }));
        let l = service(&api).list_models(&draft()).await.unwrap();
        assert_eq!(l, ModelListing::default());
    }

    #[tokio::test]
    async fn listing_is_returned_unfiltered() {
        let api = Arc::new(FakeControlApi::default());
        *api.listing.lock().unwrap() = Some(Ok(ModelListResponse {
            models: Some(vec!["gpt-4o-mini".into(), "gpt-4o".into()]),
            error: None,
        }));
        let l = service(&api).list_models(&draft()).await.unwrap();
        // gpt-4o-mini is already mapped in the draft but still listed.
        assert_eq!(l.models, vec!["gpt-4o-mini", "gpt-4o"]);
        let picker = modelmap::build_picker(&l.models, &draft().provider.models);
        assert!(picker[0].preselected);
        assert!(!picker[1].preselected);
    }

    #[tokio::test]
    async fn listing_error_is_reported() {
        let api = Arc::new(FakeControlApi::default());
        *api.listing.lock().unwrap() = Some(Ok(ModelListResponse {
            models: None,
            error: Some("failed to parse response".into()),
        }));
        let l = service(&api).list_models(&draft()).await.unwrap();
        assert!(l.models.is_empty());
        assert_eq!(l.error.as_deref(), Some("failed to parse response"));
    }

    #[tokio::test]
    async fn model_test_success() {
        let api = Arc::new(FakeControlApi::default());
        *api.model_report.lock().unwrap() = Some(Ok(ModelTestReport {
            ok: true,
            status: Some(200),
            latency_ms: Some(120),
            reply: Some("pong".into()),
            error: None,
        }));
        let r = service(&api).test_model(&p1(), "gpt-4o-mini").await.unwrap();
        assert_eq!(
            r,
            ModelTestResult {
                ok: true,
                status: Some(200),
                latency_ms: 120,
                reply: Some("pong".into()),
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn model_test_upstream_500() {
        let api = Arc::new(FakeControlApi::default());
        *api.model_report.lock().unwrap() = Some(Ok(ModelTestReport {
            ok: false,
            status: Some(500),
            latency_ms: Some(42),
            reply: None,
            error: Some(r#"{"error":"internal"}"#.into()),
        }));
        let r = service(&api).test_model(&p1(), "gpt-4o-mini").await.unwrap();
        assert!(!r.ok);
        assert_eq!(r.status, Some(500));
        assert_eq!(r.latency_ms, 42);
        assert!(r.reply.is_none());
        assert!(r.error.unwrap().contains("internal"));
    }

    #[tokio::test]
    async fn expired_session_is_not_a_probe_failure() {
        let api = Arc::new(FakeControlApi::default());
        api.expired.store(true, Ordering::SeqCst);
        let svc = service(&api);
        assert!(svc.test_connectivity(&draft()).await.unwrap_err().is_unauthenticated());
        assert!(svc.list_models(&draft()).await.unwrap_err().is_unauthenticated());
        assert!(
            svc.test_model(&p1(), "gpt-4o-mini")
                .await
                .unwrap_err()
                .is_unauthenticated()
        );
    }

    #[tokio::test]
    async fn unreachable_control_api_reports_without_status() {
        let client = HttpControlClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let api = Arc::new(client);
        let svc = VerificationService::new(api);
        let r = svc.test_model(&p1(), "gpt-4o-mini").await.unwrap();
        assert!(!r.ok);
        assert!(r.status.is_none());
        assert!(r.error.is_some());
        let c = svc.test_connectivity(&draft()).await.unwrap();
        assert!(!c.ok);
        assert!(c.status.is_none());
    }

    #[test]
    fn candidates_are_distinct_targets() {
        let mut p = p1();
        p.models.push(ModelMapping::new("alias", "gpt-4o-mini"));
        assert_eq!(model_candidates(&p).unwrap(), vec!["gpt-4o-mini"]);
        p.models.clear();
        assert!(model_candidates(&p).is_err());
    }

    #[test]
    fn long_replies_are_cut_on_char_boundary() {
        let long = "é".repeat(REPLY_EXCERPT_CHARS + 5);
        let cut = excerpt(&long, REPLY_EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), REPLY_EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(excerpt(" pong ", REPLY_EXCERPT_CHARS), "pong");
    }
}
