use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConfigError {
    #[error("Supabase is not configured (set window.ENV.SUPABASE_URL and SUPABASE_ANON_KEY)")]
    Missing,
    #[error("Supabase configuration is incomplete: {0} is missing")]
    Incomplete(&'static str),
    #[error("Supabase URL must include http:// or https://")]
    InvalidUrl,
}

/// Project coordinates of the hosted backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub supabase_url: String,
    pub anon_key: String,
}

impl EnvConfig {
    /// Reads `window.ENV` first, then the build environment.
    pub fn load() -> Result<Self, ConfigError> {
        let (url, key) = merge_sources(
            read_window_env(),
            (
                option_env!("SUPABASE_URL").map(str::to_string),
                option_env!("SUPABASE_ANON_KEY").map(str::to_string),
            ),
        );
        Self::resolve(url, key)
    }

    pub fn resolve(url: Option<String>, anon_key: Option<String>) -> Result<Self, ConfigError> {
        let url = normalize_text_option(url);
        let anon_key = normalize_text_option(anon_key);

        let (url, anon_key) = match (url, anon_key) {
            (None, None) => return Err(ConfigError::Missing),
            (None, Some(_)) => return Err(ConfigError::Incomplete("SUPABASE_URL")),
            (Some(_), None) => return Err(ConfigError::Incomplete("SUPABASE_ANON_KEY")),
            (Some(url), Some(key)) => (url, key),
        };

        let url = url.trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl);
        }

        Ok(Self {
            supabase_url: url,
            anon_key,
        })
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, table)
    }

    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.supabase_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.supabase_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.supabase_url.clone()
        };
        format!(
            "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            ws_base,
            urlencoding::encode(&self.anon_key)
        )
    }
}

type Sources = (Option<String>, Option<String>);

/// Per value, a blank runtime entry falls through to the build value.
fn merge_sources(window: Sources, build: Sources) -> Sources {
    let pick = |runtime: Option<String>, baked: Option<String>| {
        normalize_text_option(runtime).or_else(|| normalize_text_option(baked))
    };
    (pick(window.0, build.0), pick(window.1, build.1))
}

fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Both `SUPABASE_URL` and the lowercase `supabase_url` spelling are accepted.
fn read_window_env() -> (Option<String>, Option<String>) {
    let Some(window) = web_sys::window() else {
        return (None, None);
    };
    let Some(env) = window.get("ENV") else {
        return (None, None);
    };
    if env.is_undefined() || !env.is_object() {
        return (None, None);
    }

    let get = |keys: &[&str]| {
        keys.iter().find_map(|k| {
            js_sys::Reflect::get(&env, &(*k).into())
                .ok()
                .and_then(|v| v.as_string())
        })
    };

    (
        get(&["SUPABASE_URL", "supabase_url"]),
        get(&["SUPABASE_ANON_KEY", "supabase_anon_key"]),
    )
}
