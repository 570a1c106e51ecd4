//! Idempotent, process-wide initialization of the geocoding provider.
//!
//! Construction is lazy: the first [`ProviderLoader::ensure_ready`] call
//! performs the load, concurrent callers await that same load, and the
//! outcome (success or failure) is cached for the life of the loader.
//! A failed load is never retried; callers degrade to manual entry.

use std::sync::Arc;

use nagarmitra_core::{AppConfig, ProviderAvailability};
use tokio::sync::OnceCell;

use crate::client::GeocoderClient;
use crate::error::LoadError;

pub struct ProviderLoader {
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
    outcome: OnceCell<Result<Arc<GeocoderClient>, LoadError>>,
}

impl ProviderLoader {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            timeout_secs,
            outcome: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.geocoder_api_key.clone(),
            config.geocoder_base_url.clone(),
            config.request_timeout_secs,
        )
    }

    /// Returns the ready provider, loading it on first call.
    ///
    /// All concurrent callers share one in-flight load, and every later
    /// call returns the cached outcome without touching the network.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Unconfigured`] if no API key was supplied.
    /// - [`LoadError::Init`] if provider construction failed. The same
    ///   error is returned on every subsequent call.
    pub async fn ensure_ready(&self) -> Result<Arc<GeocoderClient>, LoadError> {
        self.outcome
            .get_or_init(|| async { self.load() })
            .await
            .clone()
    }

    /// Current availability without forcing a load.
    ///
    /// `Loading` means a key is present but no load has completed yet.
    /// Both load-failure outcomes report `Unconfigured` so consumers show
    /// the same manual-entry fallback for a missing key and a broken one.
    pub fn availability(&self) -> ProviderAvailability {
        match self.outcome.get() {
            Some(Ok(_)) => ProviderAvailability::Ready,
            Some(Err(_)) => ProviderAvailability::Unconfigured,
            None => {
                if self.api_key.is_some() {
                    ProviderAvailability::Loading
                } else {
                    ProviderAvailability::Unconfigured
                }
            }
        }
    }

    fn load(&self) -> Result<Arc<GeocoderClient>, LoadError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!("no geocoder API key, manual entry only");
            return Err(LoadError::Unconfigured);
        };

        match GeocoderClient::with_base_url(api_key, self.timeout_secs, &self.base_url) {
            Ok(client) => {
                tracing::debug!(base_url = %self.base_url, "geocoding provider ready");
                Ok(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "geocoding provider failed to initialize");
                Err(LoadError::Init(e.to_string()))
            }
        }
    }
}
