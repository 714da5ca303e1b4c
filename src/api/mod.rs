mod auth;
mod realtime;
mod rest;

pub(crate) use auth::SupabaseAuth;
pub(crate) use realtime::{ChangeFeed, ChangeSubscription, ChannelStatus};
pub(crate) use rest::SupabaseStore;

use crate::config::ConfigError;
use crate::models::{AuthUser, Bookmark, NewBookmark};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
    NotConfigured,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    pub(crate) fn http(status: reqwest::StatusCode, body: &str, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx}: {}", describe_backend_error(status.as_u16(), body)),
        }
    }

    pub(crate) fn not_configured(e: &ConfigError) -> Self {
        Self {
            kind: ApiErrorKind::NotConfigured,
            message: e.to_string(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self::not_configured(&e)
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Error body shapes used by GoTrue and PostgREST.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

pub(crate) fn describe_backend_error(status: u16, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<BackendErrorBody>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return format!("{} ({status})", message.trim());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("{trimmed} ({status})")
    }
}

/// Identity service of the backend. `None` means "no session", never an error.
#[allow(async_fn_in_trait)]
pub(crate) trait IdentityService {
    async fn current_user(&self) -> ApiResult<Option<AuthUser>>;
    async fn sign_out(&self) -> ApiResult<()>;
}

/// Row storage for bookmarks. Ownership is enforced by the backend's row policies.
#[allow(async_fn_in_trait)]
pub(crate) trait RecordStore {
    async fn insert_bookmark(&self, bookmark: &NewBookmark) -> ApiResult<()>;
    /// All rows owned by `user_id`, newest `created_at` first.
    async fn select_bookmarks(&self, user_id: &str) -> ApiResult<Vec<Bookmark>>;
    async fn delete_bookmark(&self, id: &str) -> ApiResult<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-ins for the hosted services.

    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::{Cell, RefCell};

    pub(crate) struct MemoryBackend {
        pub user: Option<AuthUser>,
        pub rows: RefCell<Vec<Bookmark>>,
        pub calls: Cell<usize>,
        pub fail_writes: Cell<bool>,
        pub signed_out: Cell<bool>,
        clock: Cell<i64>,
        next_id: Cell<u64>,
    }

    impl MemoryBackend {
        pub fn signed_in(user_id: &str) -> Self {
            Self {
                user: Some(AuthUser {
                    id: user_id.to_string(),
                    email: Some(format!("{user_id}@example.com")),
                }),
                rows: RefCell::new(Vec::new()),
                calls: Cell::new(0),
                fail_writes: Cell::new(false),
                signed_out: Cell::new(false),
                clock: Cell::new(1_700_000_000),
                next_id: Cell::new(1),
            }
        }

        pub fn signed_out() -> Self {
            Self {
                user: None,
                ..Self::signed_in("nobody")
            }
        }

        fn tick(&self) -> DateTime<Utc> {
            let t = self.clock.get() + 1;
            self.clock.set(t);
            Utc.timestamp_opt(t, 0).single().unwrap_or_default()
        }

        fn failure(&self) -> ApiError {
            ApiError {
                kind: ApiErrorKind::Http,
                message: "write rejected (500)".to_string(),
            }
        }
    }

    impl IdentityService for MemoryBackend {
        async fn current_user(&self) -> ApiResult<Option<AuthUser>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.user.clone())
        }

        async fn sign_out(&self) -> ApiResult<()> {
            self.calls.set(self.calls.get() + 1);
            self.signed_out.set(true);
            Ok(())
        }
    }

    impl RecordStore for MemoryBackend {
        async fn insert_bookmark(&self, bookmark: &NewBookmark) -> ApiResult<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_writes.get() {
                return Err(self.failure());
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let created_at = self.tick();
            self.rows.borrow_mut().push(Bookmark {
                id: format!("b{id}"),
                user_id: bookmark.user_id.clone(),
                title: bookmark.title.clone(),
                url: bookmark.url.clone(),
                created_at,
            });
            Ok(())
        }

        async fn select_bookmarks(&self, user_id: &str) -> ApiResult<Vec<Bookmark>> {
            self.calls.set(self.calls.get() + 1);
            let mut rows: Vec<Bookmark> = self
                .rows
                .borrow()
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn delete_bookmark(&self, id: &str) -> ApiResult<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_writes.get() {
                return Err(self.failure());
            }
            self.rows.borrow_mut().retain(|b| b.id != id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_backend_error_prefers_message_fields() {
        let body = r#"{"code":"42501","message":"new row violates row-level security policy","details":null,"hint":null}"#;
        assert_eq!(
            describe_backend_error(403, body),
            "new row violates row-level security policy (403)"
        );

        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(describe_backend_error(400, body), "Invalid login credentials (400)");
    }

    #[test]
    fn test_describe_backend_error_falls_back_to_body_or_status() {
        assert_eq!(describe_backend_error(502, "bad gateway"), "bad gateway (502)");
        assert_eq!(describe_backend_error(500, "  "), "HTTP 500");
    }

    #[test]
    fn test_config_error_maps_to_not_configured() {
        let e: ApiError = ConfigError::Missing.into();
        assert_eq!(e.kind, ApiErrorKind::NotConfigured);
        assert!(e.to_string().contains("not configured"));
    }
}
