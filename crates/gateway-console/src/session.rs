//! Console login gate.

use crate::api::ControlApi;
use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    LoginRequired,
}

pub async fn check_session(api: &dyn ControlApi) -> Result<SessionState> {
    let check = api.auth_check().await?;
    Ok(if check.need_login {
        SessionState::LoginRequired
    } else {
        SessionState::Ready
    })
}

pub async fn login(api: &dyn ControlApi, password: &str) -> Result<()> {
    let resp = api.login(password).await?;
    if resp.ok {
        tracing::info!("logged in to control api");
        Ok(())
    } else {
        let message = resp.error.unwrap_or_else(|| "login failed".to_string());
        tracing::warn!("login rejected: {}", message);
        Err(ConsoleError::LoginRejected { message })
    }
}

/// Log in only when the gate asks for it. Without a password a gated session
/// is reported as `Unauthenticated`.
pub async fn ensure_session(api: &dyn ControlApi, password: Option<&str>) -> Result<()> {
    match check_session(api).await? {
        SessionState::Ready => Ok(()),
        SessionState::LoginRequired => match password {
            Some(pw) => login(api, pw).await,
            None => Err(ConsoleError::Unauthenticated),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeControlApi;

    fn gated(password: &str) -> FakeControlApi {
        FakeControlApi {
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn open_gate_needs_no_login() {
        let api = FakeControlApi::default();
        assert_eq!(check_session(&api).await.unwrap(), SessionState::Ready);
        ensure_session(&api, None).await.unwrap();
    }

    #[tokio::test]
    async fn gated_session_logs_in_then_loads() {
        let api = gated("hunter2");
        assert_eq!(check_session(&api).await.unwrap(), SessionState::LoginRequired);
        assert!(api.get_config().await.unwrap_err().is_unauthenticated());
        ensure_session(&api, Some("hunter2")).await.unwrap();
        assert_eq!(check_session(&api).await.unwrap(), SessionState::Ready);
        api.get_config().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_server_message() {
        let api = gated("hunter2");
        match login(&api, "nope").await.unwrap_err() {
            ConsoleError::LoginRejected { message } => assert_eq!(message, "wrong password"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn gated_without_password_is_unauthenticated() {
        let api = gated("hunter2");
        assert!(ensure_session(&api, None).await.unwrap_err().is_unauthenticated());
    }
}
