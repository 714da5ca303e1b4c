use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const BOOKMARKS_TABLE: &str = "bookmarks";

/// A row of the `bookmarks` table as returned by PostgREST (`select=*`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Bookmark {
    /// uuid or bigint primary key, kept as text either way.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. `id` and `created_at` are assigned by the database.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewBookmark {
    pub title: String,
    pub url: String,
    pub user_id: String,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Uppercased first character of the email, used for the avatar badge.
    pub fn initial(&self) -> String {
        self.email
            .as_deref()
            .and_then(|e| e.trim().chars().next())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub(crate) struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    const EXPIRY_SKEW_SECONDS: i64 = 60;

    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at <= now_secs + Self::EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Row-level notification delivered by the change feed.
///
/// `row` is the new record for inserts/updates and the old record for deletes.
/// Deletes usually only carry the primary key, so it stays untyped.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ChangeEvent {
    pub kind: ChangeKind,
    pub row: serde_json::Value,
}

impl ChangeEvent {
    pub fn row_id(&self) -> Option<String> {
        match self.row.get("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_row_contract_deserialize() {
        let json = r#"{
            "id": "6f1c2f1e-8a0b-4d77-9a53-4f0f5b0b9b11",
            "user_id": "0b4a7f2e-1111-2222-3333-444455556666",
            "title": "Example",
            "url": "https://example.com",
            "created_at": "2024-05-01T10:15:30.123456+00:00"
        }"#;
        let parsed: Bookmark = serde_json::from_str(json).expect("row should parse");
        assert_eq!(parsed.title, "Example");
        assert_eq!(parsed.url, "https://example.com");
        assert_eq!(parsed.created_at.timestamp(), 1_714_558_530);
    }

    #[test]
    fn test_bookmark_row_accepts_numeric_id() {
        let json = r#"{"id": 7, "user_id": "u1", "title": "t", "url": "https://a.b",
            "created_at": "2024-05-01T10:15:30Z"}"#;
        let parsed: Bookmark = serde_json::from_str(json).expect("row should parse");
        assert_eq!(parsed.id, "7");
    }

    #[test]
    fn test_new_bookmark_serializes_without_server_fields() {
        let v = serde_json::to_value(NewBookmark {
            title: "Example".to_string(),
            url: "https://example.com".to_string(),
            user_id: "u1".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v["user_id"], "u1");
        assert!(v.get("id").is_none());
        assert!(v.get("created_at").is_none());
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "u1".to_string(),
                email: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_session_expiry_uses_skew() {
        let session = AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 1_000,
            user: AuthUser {
                id: "u1".to_string(),
                email: None,
            },
        };
        assert!(!session.is_expired_at(900));
        assert!(session.is_expired_at(940));
        assert!(session.is_expired_at(2_000));
    }

    #[test]
    fn test_user_initial() {
        let user = AuthUser {
            id: "u1".to_string(),
            email: Some("alice@example.com".to_string()),
        };
        assert_eq!(user.initial(), "A");

        let anonymous = AuthUser {
            id: "u2".to_string(),
            email: None,
        };
        assert_eq!(anonymous.initial(), "?");
    }

    #[test]
    fn test_change_event_row_id() {
        let ev = ChangeEvent {
            kind: ChangeKind::Delete,
            row: serde_json::json!({ "id": 42 }),
        };
        assert_eq!(ev.row_id().as_deref(), Some("42"));
        assert_eq!(ev.kind.to_string(), "Delete");
    }
}
