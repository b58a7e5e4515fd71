use axum::http::{HeaderMap, header::AUTHORIZATION};
use triage_core::AuthState;

/// Bearer-token gate for submit-for-analysis. When `SERVICE_TOKEN` is unset
/// the gate is open (development mode), matching the external
/// authenticated-session check the flow relies on.
#[derive(Clone)]
pub struct BearerAuth {
    token: Option<String>,
}

impl BearerAuth {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("SERVICE_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    pub fn open() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn state_for(&self, headers: &HeaderMap) -> AuthState {
        let is_authenticated = match &self.token {
            None => true,
            Some(expected) => headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|presented| presented == expected)
                .unwrap_or(false),
        };
        AuthState {
            is_authenticated,
            is_loading: false,
        }
    }
}
