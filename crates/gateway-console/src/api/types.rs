//! Request and response bodies of the control API.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Provider;

/// Absent, `null` and `""` all mean "no value".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// `GET /admin/api/auth-check`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthCheck {
    #[serde(default)]
    pub need_login: bool,
}

/// `POST /admin/api/login` request.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

/// `POST /admin/api/login` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
}

/// `POST /admin/api/providers/test` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectivityReport {
    #[serde(default)]
    pub ok: bool,
    /// Upstream HTTP status; absent when the upstream was unreachable.
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
    /// Raw upstream body, kept as a fallback diagnostic.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub body: Option<String>,
}

/// `POST /admin/api/providers/models` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
}

/// `POST /admin/api/providers/test-model` request.
#[derive(Debug, Serialize)]
pub struct TestModelRequest<'a> {
    pub provider: &'a Provider,
    pub model: &'a str,
}

/// `POST /admin/api/providers/test-model` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTestReport {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reply: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_read_as_absent() {
        let r: ModelTestReport = serde_json::from_str(
            r#"{"ok":true,"status":200,"latency_ms":118,"reply":"pong","error":""}"#,
        )
        .unwrap();
        assert_eq!(r.reply.as_deref(), Some("pong"));
        assert!(r.error.is_none());
        assert_eq!(r.latency_ms, Some(118));
    }

    #[test]
    fn unreachable_upstream_has_no_status() {
        let r: ConnectivityReport =
            serde_json::from_str(r#"{"ok":false,"error":"dial tcp: connection refused"}"#).unwrap();
        assert!(!r.ok);
        assert!(r.status.is_none());
        assert!(r.body.is_none());
    }

    #[test]
    fn null_model_list_is_not_an_error() {
        let r: ModelListResponse = serde_json::from_str(r#"{"models":null}"#).unwrap();
        assert!(r.models.is_none());
        assert!(r.error.is_none());
    }

    #[test]
    fn test_model_request_nests_provider() {
        let p = Provider {
            id: "p1".into(),
            base_url: "https://api.example.com".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(TestModelRequest {
            provider: &p,
            model: "gpt-4o-mini",
        })
        .unwrap();
        assert_eq!(v["model"], "gpt-4o-mini");
        assert_eq!(v["provider"]["id"], "p1");
        assert_eq!(v["provider"]["type"], "anthropic");
    }
}
