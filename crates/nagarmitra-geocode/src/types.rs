//! Geocoder API response types.
//!
//! All types model the JSON structures returned by the Maps REST endpoints.
//! Every response carries a top-level `"status"` field (`"OK"`,
//! `"ZERO_RESULTS"`, `"REQUEST_DENIED"`, ...); [`ApiResponse`] captures
//! that envelope generically.

use nagarmitra_core::Coordinates;
use serde::Deserialize;

/// Top-level envelope for all geocoder responses.
///
/// `status` is `"OK"` on success. On failure the API may add an
/// `error_message` alongside the non-`OK` status. The payload fields are
/// flattened from the response body.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// A WGS84 point as the API writes it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

/// Geometry wrapper: `{ "location": { "lat": ..., "lng": ... } }`.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

// ---------------------------------------------------------------------------
// place/autocomplete
// ---------------------------------------------------------------------------

/// Payload for `place/autocomplete/json`: `{ "predictions": [ ... ] }`.
///
/// `predictions` defaults to empty because a `ZERO_RESULTS` response omits
/// the array entirely.
#[derive(Debug, Deserialize)]
pub struct PredictionsPayload {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// One autocomplete prediction.
#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
}

/// Split rendering of a prediction: primary name plus locality context.
#[derive(Debug, Deserialize)]
pub struct StructuredFormatting {
    #[serde(default)]
    pub main_text: Option<String>,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

// ---------------------------------------------------------------------------
// place/details
// ---------------------------------------------------------------------------

/// Payload for `place/details/json`: `{ "result": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct DetailsPayload {
    pub result: PlaceDetails,
}

/// Place detail fields requested by the client (`formatted_address`,
/// `name`, `geometry`).
#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub geometry: Geometry,
}

// ---------------------------------------------------------------------------
// geocode (forward and reverse share one shape)
// ---------------------------------------------------------------------------

/// Payload for `geocode/json`: `{ "results": [ ... ] }`.
///
/// `results` defaults to empty for the same `ZERO_RESULTS` reason as
/// [`PredictionsPayload::predictions`].
#[derive(Debug, Deserialize)]
pub struct GeocodePayload {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// One geocoding match.
#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub geometry: Geometry,
}
