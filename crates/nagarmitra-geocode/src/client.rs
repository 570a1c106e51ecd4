//! HTTP client for the Maps geocoding REST endpoints.
//!
//! Wraps `reqwest` with geocoder-specific error handling, API key
//! management, and typed response deserialization. All endpoints check the
//! `"status"` field in the JSON envelope: hard failures surface as
//! [`GeocodeError::Api`], empty-result statuses either yield an empty list
//! (autocomplete) or [`GeocodeError::NoResults`] (everything else).

use std::time::Duration;

use async_trait::async_trait;
use nagarmitra_core::{Coordinates, ResolvedLocation, SuggestionEntry};
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::provider::{GeocodeProvider, SearchBias};
use crate::types::{ApiResponse, DetailsPayload, GeocodePayload, PredictionsPayload};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Client for the Maps geocoding REST API.
///
/// Manages the HTTP client, API key, and base URL. Use [`GeocoderClient::new`]
/// for production or [`GeocoderClient::with_base_url`] to point at a mock
/// server in tests.
#[derive(Debug)]
pub struct GeocoderClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GeocoderClient {
    /// Creates a new client pointed at the production Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nagarmitra/0.1 (civic-reporting)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends endpoint paths instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeocodeError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches ranked place suggestions for a partial search query.
    ///
    /// Calls the `place/autocomplete/json` endpoint with the bias rendered
    /// as `components`, `location`, and `radius` parameters. `ZERO_RESULTS`
    /// is a valid answer and returns an empty vec.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Api`] if the API returns a hard-failure status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn autocomplete(
        &self,
        input: &str,
        bias: &SearchBias,
    ) -> Result<Vec<SuggestionEntry>, GeocodeError> {
        // Bind the owned strings outside the if blocks so the borrows live
        // long enough for build_url.
        let components;
        let location;
        let radius;

        let mut params: Vec<(&str, &str)> = vec![("input", input)];
        if let Some(country) = &bias.country {
            components = format!("country:{country}");
            params.push(("components", &components));
        }
        if let Some(center) = bias.center {
            location = format!("{},{}", center.lat, center.lng);
            params.push(("location", &location));
        }
        if let Some(r) = bias.radius_m {
            radius = r.to_string();
            params.push(("radius", &radius));
        }

        let url = self.build_url("place/autocomplete/json", &params)?;
        let body = self.request_json(&url).await?;
        if !Self::check_api_status(&body)? {
            return Ok(Vec::new());
        }

        let envelope: ApiResponse<PredictionsPayload> =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("autocomplete(input={input})"),
                source: e,
            })?;

        Ok(envelope
            .data
            .predictions
            .into_iter()
            .map(|prediction| {
                let (main_text, secondary_text) = match prediction.structured_formatting {
                    Some(f) => (f.main_text, f.secondary_text),
                    None => (None, None),
                };
                SuggestionEntry {
                    id: prediction.place_id,
                    description: prediction.description,
                    main_text,
                    secondary_text,
                }
            })
            .collect())
    }

    /// Fetches the full address and coordinates for a place ID.
    ///
    /// Calls the `place/details/json` endpoint requesting only the fields
    /// the resolver needs. The address falls back from `formatted_address`
    /// to `name` to a coordinate string, so the returned location is always
    /// displayable.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NoResults`] if the place ID matches nothing.
    /// - [`GeocodeError::Api`] if the API returns a hard-failure status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<ResolvedLocation, GeocodeError> {
        let url = self.build_url(
            "place/details/json",
            &[
                ("place_id", place_id),
                ("fields", "name,formatted_address,geometry"),
            ],
        )?;
        let body = self.request_json(&url).await?;
        if !Self::check_api_status(&body)? {
            return Err(GeocodeError::NoResults {
                context: format!("place_details(place_id={place_id})"),
            });
        }

        let envelope: ApiResponse<DetailsPayload> =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("place_details(place_id={place_id})"),
                source: e,
            })?;

        let details = envelope.data.result;
        let coordinates = Coordinates::from(details.geometry.location);
        let address = details
            .formatted_address
            .or(details.name)
            .unwrap_or_else(|| coordinates.as_address());

        Ok(ResolvedLocation {
            address,
            coordinates,
        })
    }

    /// Forward-geocodes free text to the best match.
    ///
    /// Calls the `geocode/json` endpoint and returns the first result.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NoResults`] if nothing matches the text.
    /// - [`GeocodeError::Api`] if the API returns a hard-failure status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn geocode(&self, address: &str) -> Result<ResolvedLocation, GeocodeError> {
        let url = self.build_url("geocode/json", &[("address", address)])?;
        let body = self.request_json(&url).await?;
        if !Self::check_api_status(&body)? {
            return Err(GeocodeError::NoResults {
                context: format!("geocode(address={address})"),
            });
        }

        let envelope: ApiResponse<GeocodePayload> =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        let first = envelope
            .data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults {
                context: format!("geocode(address={address})"),
            })?;

        Ok(ResolvedLocation {
            address: first.formatted_address,
            coordinates: first.geometry.location.into(),
        })
    }

    /// Reverse-geocodes coordinates to a human-readable address.
    ///
    /// Calls the `geocode/json` endpoint with a `latlng` parameter and
    /// returns the first result's formatted address.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NoResults`] if no address exists at the point.
    /// - [`GeocodeError::Api`] if the API returns a hard-failure status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, GeocodeError> {
        let latlng = format!("{},{}", coordinates.lat, coordinates.lng);
        let url = self.build_url("geocode/json", &[("latlng", &latlng)])?;
        let body = self.request_json(&url).await?;
        if !Self::check_api_status(&body)? {
            return Err(GeocodeError::NoResults {
                context: format!("reverse_geocode({latlng})"),
            });
        }

        let envelope: ApiResponse<GeocodePayload> =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse_geocode({latlng})"),
                source: e,
            })?;

        let first = envelope
            .data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults {
                context: format!("reverse_geocode({latlng})"),
            })?;

        Ok(first.formatted_address)
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters.
    ///
    /// Joins the endpoint path onto the stored base URL and appends `key`
    /// plus any additional parameters via [`Url::query_pairs_mut`], ensuring
    /// all values are safely encoded.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Api`] if the endpoint path cannot be joined
    /// onto the base URL.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| GeocodeError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] on network failure or a non-2xx status.
    /// Returns [`GeocodeError::Deserialize`] if the body is not valid JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GeocodeError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Checks the top-level `"status"` field. `Ok(true)` means results are
    /// present, `Ok(false)` means an empty-result status (`ZERO_RESULTS`,
    /// `NOT_FOUND`), and anything else is a hard failure.
    fn check_api_status(body: &serde_json::Value) -> Result<bool, GeocodeError> {
        let status = body
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("missing status field");
        match status {
            "OK" => Ok(true),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
            other => {
                let msg = match body.get("error_message").and_then(serde_json::Value::as_str) {
                    Some(detail) => format!("{other}: {detail}"),
                    None => other.to_owned(),
                };
                Err(GeocodeError::Api(msg))
            }
        }
    }
}

#[async_trait]
impl GeocodeProvider for GeocoderClient {
    async fn autocomplete(
        &self,
        input: &str,
        bias: &SearchBias,
    ) -> Result<Vec<SuggestionEntry>, GeocodeError> {
        GeocoderClient::autocomplete(self, input, bias).await
    }

    async fn place_details(&self, place_id: &str) -> Result<ResolvedLocation, GeocodeError> {
        GeocoderClient::place_details(self, place_id).await
    }

    async fn geocode(&self, address: &str) -> Result<ResolvedLocation, GeocodeError> {
        GeocoderClient::geocode(self, address).await
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<String, GeocodeError> {
        GeocoderClient::reverse_geocode(self, coordinates).await
    }
}
