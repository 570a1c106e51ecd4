//! Location domain types shared by the resolver, the geocoder client, and
//! the report form.
//!
//! The central distinction is [`LocationCandidate`] (unconfirmed, possibly
//! missing coordinates) versus [`ResolvedLocation`] (both fields always
//! present, the only shape the issue-report form ever receives). A resolved
//! record is replaced wholesale, never patched field-by-field, so a stale
//! address can never sit next to newer coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Fallback map center when nothing has been selected yet (New Delhi).
    pub const DELHI: Coordinates = Coordinates {
        lat: 28.6139,
        lng: 77.2090,
    };

    /// Placeholder address shown until reverse geocoding supplies a real one,
    /// e.g. `"Lat: 28.613900, Lng: 77.209000"`.
    pub fn as_address(&self) -> String {
        format!("Lat: {:.6}, Lng: {:.6}", self.lat, self.lng)
    }

    /// Compact `"28.613900, 77.209000"` form for map-less summaries.
    pub fn as_summary(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }

    /// Whether the pair lies within valid WGS84 bounds.
    pub fn in_bounds(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_summary())
    }
}

/// An unconfirmed location proposal produced by one input source.
///
/// Candidates with `coordinates: None` (e.g. a suggestion whose detail lookup
/// failed) can be displayed but never confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

impl LocationCandidate {
    /// True when both fields are usable, i.e. the candidate is promotable to
    /// a [`ResolvedLocation`].
    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty() && self.coordinates.is_some()
    }
}

/// A confirmed, fully-populated address + coordinate pair: the only value the
/// issue-report form ever receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub address: String,
    pub coordinates: Coordinates,
}

impl ResolvedLocation {
    /// Builds a resolved record whose address is the coordinate-string
    /// placeholder. Used when coordinates are known synchronously (map tap,
    /// GPS fix) before any reverse geocode completes.
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            address: coordinates.as_address(),
            coordinates,
        }
    }

    /// The same coordinates with a replacement address, as one atomic unit.
    pub fn with_address(&self, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: self.coordinates,
        }
    }
}

impl From<ResolvedLocation> for LocationCandidate {
    fn from(resolved: ResolvedLocation) -> Self {
        Self {
            address: resolved.address,
            coordinates: Some(resolved.coordinates),
        }
    }
}

/// One autocomplete suggestion. Ephemeral: the list is superseded by the next
/// keystroke, never accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    /// Provider-assigned place id, used for the detail lookup.
    pub id: String,
    /// Full display text, e.g. `"Connaught Place, New Delhi, Delhi, India"`.
    pub description: String,
    pub main_text: Option<String>,
    pub secondary_text: Option<String>,
}

/// Whether the external mapping provider can be used at all.
///
/// Anything other than `Ready` (once loading has settled) restricts input to
/// the manual coordinate adapter. A failed load settles back on
/// `Unconfigured` and stays there for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderAvailability {
    Unconfigured,
    Loading,
    Ready,
}

impl ProviderAvailability {
    pub fn is_ready(self) -> bool {
        self == ProviderAvailability::Ready
    }
}

impl fmt::Display for ProviderAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderAvailability::Unconfigured => write!(f, "unconfigured"),
            ProviderAvailability::Loading => write!(f, "loading"),
            ProviderAvailability::Ready => write!(f, "ready"),
        }
    }
}

/// Parses a manual `"lat, lng"` entry.
///
/// Accepts surrounding whitespace around either number. Returns `None` when
/// the input is not two comma-separated floats or the pair is outside WGS84
/// bounds; the caller keeps the confirm action disabled in that case.
pub fn parse_manual_coordinates(input: &str) -> Option<Coordinates> {
    let (lat_raw, lng_raw) = input.split_once(',')?;
    let lat: f64 = lat_raw.trim().parse().ok()?;
    let lng: f64 = lng_raw.trim().parse().ok()?;
    let coords = Coordinates { lat, lng };
    coords.in_bounds().then_some(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_address_uses_six_decimal_places() {
        let coords = Coordinates {
            lat: 28.6139,
            lng: 77.209,
        };
        assert_eq!(coords.as_address(), "Lat: 28.613900, Lng: 77.209000");
        assert_eq!(coords.as_summary(), "28.613900, 77.209000");
    }

    #[test]
    fn from_coordinates_fills_placeholder_address() {
        let resolved = ResolvedLocation::from_coordinates(Coordinates::DELHI);
        assert_eq!(resolved.address, "Lat: 28.613900, Lng: 77.209000");
        assert!((resolved.coordinates.lat - 28.6139).abs() < 1e-9);
    }

    #[test]
    fn with_address_keeps_coordinates() {
        let resolved = ResolvedLocation::from_coordinates(Coordinates::DELHI);
        let upgraded = resolved.with_address("Connaught Place, New Delhi");
        assert_eq!(upgraded.address, "Connaught Place, New Delhi");
        assert_eq!(upgraded.coordinates, resolved.coordinates);
    }

    #[test]
    fn candidate_without_coordinates_is_incomplete() {
        let candidate = LocationCandidate {
            address: "Connaught Place".to_owned(),
            coordinates: None,
        };
        assert!(!candidate.is_complete());
    }

    #[test]
    fn candidate_with_blank_address_is_incomplete() {
        let candidate = LocationCandidate {
            address: "   ".to_owned(),
            coordinates: Some(Coordinates::DELHI),
        };
        assert!(!candidate.is_complete());
    }

    #[test]
    fn parse_manual_accepts_spaced_pair() {
        let coords = parse_manual_coordinates("28.6139, 77.2090").expect("should parse");
        assert!((coords.lat - 28.6139).abs() < 1e-9);
        assert!((coords.lng - 77.2090).abs() < 1e-9);
    }

    #[test]
    fn parse_manual_accepts_negative_values() {
        let coords = parse_manual_coordinates("-33.8688,151.2093").expect("should parse");
        assert!(coords.lat < 0.0);
    }

    #[test]
    fn parse_manual_rejects_missing_comma() {
        assert!(parse_manual_coordinates("28.6139 77.2090").is_none());
    }

    #[test]
    fn parse_manual_rejects_non_numeric() {
        assert!(parse_manual_coordinates("near the market, Delhi").is_none());
    }

    #[test]
    fn parse_manual_rejects_out_of_bounds() {
        assert!(parse_manual_coordinates("91.0, 10.0").is_none());
        assert!(parse_manual_coordinates("45.0, 181.0").is_none());
    }

    #[test]
    fn availability_ready_gate() {
        assert!(ProviderAvailability::Ready.is_ready());
        assert!(!ProviderAvailability::Loading.is_ready());
        assert!(!ProviderAvailability::Unconfigured.is_ready());
    }
}
