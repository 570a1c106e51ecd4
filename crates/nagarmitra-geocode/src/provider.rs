//! Trait seams between the resolution workflow and the outside world.
//!
//! The resolver depends on [`GeocodeProvider`] and [`PositionSensor`] only,
//! so tests can drive it with mocks and the CLI can substitute a fixed
//! position for real hardware.

use std::time::Duration;

use async_trait::async_trait;
use nagarmitra_core::{Coordinates, ResolvedLocation, SuggestionEntry};

use crate::error::{GeocodeError, SensorError};

/// Ranking hints for autocomplete: restrict to a country and weight
/// matches near a center point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchBias {
    /// ISO 3166-1 alpha-2 country code, lowercase (e.g. `"in"`).
    pub country: Option<String>,
    pub center: Option<Coordinates>,
    pub radius_m: Option<u32>,
}

impl SearchBias {
    /// Bias within `radius_m` meters of `center`, restricted to `country`.
    pub fn country_near(country: &str, center: Coordinates, radius_m: u32) -> Self {
        Self {
            country: Some(country.to_owned()),
            center: Some(center),
            radius_m: Some(radius_m),
        }
    }
}

/// Options for a position-fix request, mirroring platform geolocation
/// options. Callers enforce `timeout` around the whole request; sensors
/// may serve a cached fix no older than `maximum_age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorOptions {
    pub timeout: Duration,
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
            high_accuracy: true,
        }
    }
}

impl SensorOptions {
    pub fn from_secs(timeout_secs: u64, max_age_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            maximum_age: Duration::from_secs(max_age_secs),
            high_accuracy: true,
        }
    }
}

/// Geocoding operations the resolver needs. Implemented by
/// [`GeocoderClient`](crate::client::GeocoderClient) for the real API and
/// by mocks in resolver tests.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Ranked suggestions for a partial query. An empty vec is a valid
    /// answer, not an error.
    async fn autocomplete(
        &self,
        input: &str,
        bias: &SearchBias,
    ) -> Result<Vec<SuggestionEntry>, GeocodeError>;

    /// Full address and coordinates for a suggestion's place ID.
    async fn place_details(&self, place_id: &str) -> Result<ResolvedLocation, GeocodeError>;

    /// Forward-geocode free text to the best match.
    async fn geocode(&self, address: &str) -> Result<ResolvedLocation, GeocodeError>;

    /// Reverse-geocode coordinates to a human-readable address.
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, GeocodeError>;
}

/// A source of device position fixes.
#[async_trait]
pub trait PositionSensor: Send + Sync {
    /// Returns the current position, or why one could not be produced.
    async fn current_position(&self, options: &SensorOptions) -> Result<Coordinates, SensorError>;
}

/// Sensor backed by a fixed position, for headless runs and tests.
/// `None` behaves like a device with no fix available.
#[derive(Debug, Clone, Copy)]
pub struct FixedSensor {
    position: Option<Coordinates>,
}

impl FixedSensor {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSensor for FixedSensor {
    async fn current_position(&self, _options: &SensorOptions) -> Result<Coordinates, SensorError> {
        self.position.ok_or(SensorError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_sensor_returns_its_position() {
        let sensor = FixedSensor::new(Some(Coordinates::DELHI));
        let fix = sensor
            .current_position(&SensorOptions::default())
            .await
            .expect("fix should be available");
        assert_eq!(fix, Coordinates::DELHI);
    }

    #[tokio::test]
    async fn fixed_sensor_without_position_is_unavailable() {
        let sensor = FixedSensor::new(None);
        let err = sensor
            .current_position(&SensorOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, SensorError::Unavailable);
    }

    #[test]
    fn sensor_options_default_matches_device_profile() {
        let options = SensorOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(60));
        assert!(options.high_accuracy);
    }
}
