use crate::api::{ApiResult, ChangeFeed, SupabaseAuth, SupabaseStore};
use crate::config::{ConfigError, EnvConfig};
use leptos::logging::error;

/// Backend handles shared by every view. Holds configuration only; the
/// signed-in user is resolved by `AuthGate` and passed down explicitly.
#[derive(Clone, Debug)]
pub(crate) struct Backend {
    config: Result<EnvConfig, ConfigError>,
}

impl Backend {
    pub fn from_env() -> Self {
        let config = EnvConfig::load();
        if let Err(e) = &config {
            error!("Backend configuration error: {e}");
        }
        Self { config }
    }

    #[cfg(test)]
    pub fn with_config(config: Result<EnvConfig, ConfigError>) -> Self {
        Self { config }
    }

    fn config(&self) -> ApiResult<EnvConfig> {
        self.config.clone().map_err(Into::into)
    }

    pub fn auth(&self) -> ApiResult<SupabaseAuth> {
        Ok(SupabaseAuth::new(self.config()?))
    }

    pub fn store(&self) -> ApiResult<SupabaseStore> {
        let config = self.config()?;
        Ok(SupabaseStore::new(config.clone(), SupabaseAuth::new(config)))
    }

    pub fn feed(&self) -> ApiResult<ChangeFeed> {
        let config = self.config()?;
        Ok(ChangeFeed::new(config.clone(), SupabaseAuth::new(config)))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct AppContext(pub Backend);
