use thiserror::Error;

/// Errors returned by the geocoder API client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoder returned a non-`OK` status with a message
    /// (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...).
    #[error("geocoder API error: {0}")]
    Api(String),

    /// The geocoder answered `ZERO_RESULTS` where a result was required.
    #[error("no geocoder results for {context}")]
    NoResults { context: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from acquiring a device position fix.
///
/// Variants mirror the three failure codes a platform position service
/// reports: permission refused, no fix available, and fix not produced
/// within the requested timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("location permission denied")]
    Denied,

    #[error("device position unavailable")]
    Unavailable,

    #[error("timed out waiting for a position fix")]
    TimedOut,
}

/// Errors from initializing the geocoding provider.
///
/// `Clone` because the loader caches the first outcome and hands the same
/// error to every later caller.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// No usable API key, so the provider can never come up.
    #[error("geocoding provider is not configured")]
    Unconfigured,

    /// Provider construction failed. The failure is permanent for the
    /// process; callers fall back to manual entry.
    #[error("geocoding provider failed to initialize: {0}")]
    Init(String),
}
