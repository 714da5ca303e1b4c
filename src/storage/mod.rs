use crate::models::AuthSession;
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_KEY: &str = "smart_bookmarks_session";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_session() -> Option<AuthSession> {
    load_json_from_storage(SESSION_KEY)
}

pub(crate) fn save_session(session: &AuthSession) {
    save_json_to_storage(SESSION_KEY, session);
}

pub(crate) fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::models::AuthUser;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_session_storage_roundtrip() {
        clear_session();
        assert!(load_session().is_none());

        let session = AuthSession {
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("u@example.com".to_string()),
            },
        };
        save_session(&session);
        assert_eq!(load_session(), Some(session));

        clear_session();
        assert!(load_session().is_none());
    }

    #[wasm_bindgen_test]
    fn test_corrupt_session_reads_as_absent() {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(SESSION_KEY, "{not json");
        }
        assert!(load_session().is_none());
        clear_session();
    }
}
