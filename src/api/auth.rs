//! GoTrue (`/auth/v1`) client.

use super::{ApiError, ApiResult, IdentityService};
use crate::config::EnvConfig;
use crate::models::{AuthSession, AuthUser};
use crate::storage::{clear_session, load_session, save_session};
use crate::util::now_secs;
use leptos::logging::warn;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;

#[derive(Clone, Debug)]
pub(crate) struct SupabaseAuth {
    config: EnvConfig,
}

impl SupabaseAuth {
    pub fn new(config: EnvConfig) -> Self {
        Self { config }
    }

    fn public_request(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    fn user_request(&self, req: RequestBuilder, access_token: &str) -> RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
    }

    /// The stored session, refreshed first when it is about to expire.
    /// Any failure along the way drops the stored session.
    pub async fn active_session(&self) -> ApiResult<Option<AuthSession>> {
        let Some(stored) = load_session() else {
            return Ok(None);
        };

        if !stored.is_expired_at(now_secs()) {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                warn!("Failed to refresh persisted session: {e}");
                clear_session();
                Ok(None)
            }
        }
    }

    pub async fn access_token(&self) -> ApiResult<String> {
        self.active_session()
            .await?
            .map(|s| s.access_token)
            .ok_or_else(ApiError::unauthorized)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        let req = self.public_request(
            reqwest::Client::new()
                .post(format!("{}/token", self.config.auth_url()))
                .query(&[("grant_type", "password")])
                .json(&payload),
        );
        let session = send_token_request(req, "Sign-in failed").await?;
        save_session(&session);
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> ApiResult<AuthSession> {
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let req = self.public_request(
            reqwest::Client::new()
                .post(format!("{}/token", self.config.auth_url()))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let session = send_token_request(req, "Session refresh failed").await?;
        save_session(&session);
        Ok(session)
    }
}

impl IdentityService for SupabaseAuth {
    async fn current_user(&self) -> ApiResult<Option<AuthUser>> {
        let Some(session) = self.active_session().await? else {
            return Ok(None);
        };

        let res = self
            .user_request(
                reqwest::Client::new().get(format!("{}/user", self.config.auth_url())),
                &session.access_token,
            )
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            let user: GoTrueUser = res.json().await.map_err(ApiError::parse)?;
            Ok(Some(user.into()))
        } else if matches!(res.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            clear_session();
            Ok(None)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, "User lookup failed"))
        }
    }

    async fn sign_out(&self) -> ApiResult<()> {
        let Some(session) = load_session() else {
            return Ok(());
        };
        // Local sign-out happens even if revocation fails.
        clear_session();

        let res = self
            .user_request(
                reqwest::Client::new().post(format!("{}/logout", self.config.auth_url())),
                &session.access_token,
            )
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() || res.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, "Sign-out failed"))
        }
    }
}

async fn send_token_request(req: RequestBuilder, ctx: &str) -> ApiResult<AuthSession> {
    let res = req.send().await.map_err(ApiError::network)?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(ApiError::http(status, &body, ctx));
    }
    let token: TokenResponse = res.json().await.map_err(ApiError::parse)?;
    token.into_session(now_secs())
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
}

impl From<GoTrueUser> for AuthUser {
    fn from(value: GoTrueUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<GoTrueUser>,
}

impl TokenResponse {
    fn into_session(self, now_secs: i64) -> ApiResult<AuthSession> {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_secs.saturating_add(secs)));

        match (self.access_token, self.refresh_token, expires_at, self.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                })
            }
            _ => Err(ApiError::parse(
                "token response did not include an active session",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_token_response_into_session() {
        let json = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": {"id": "u1", "email": "u@example.com", "aud": "authenticated"}
        }"#;
        let parsed: TokenResponse = serde_json::from_str(json).expect("should parse");
        let session = parsed.into_session(1_000).expect("should build session");
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.expires_at, 4_600);
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.email.as_deref(), Some("u@example.com"));
    }

    #[test]
    fn test_token_response_prefers_absolute_expiry() {
        let json = r#"{"access_token": "jwt", "refresh_token": "rt",
            "expires_at": 1700003600, "expires_in": 3600, "user": {"id": "u1"}}"#;
        let parsed: TokenResponse = serde_json::from_str(json).expect("should parse");
        let session = parsed.into_session(0).expect("should build session");
        assert_eq!(session.expires_at, 1_700_003_600);
        assert!(session.user.email.is_none());
    }

    #[test]
    fn test_token_response_without_tokens_is_parse_error() {
        let json = r#"{"user": {"id": "u1"}}"#;
        let parsed: TokenResponse = serde_json::from_str(json).expect("should parse");
        let err = parsed.into_session(0).expect_err("no session");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }
}
