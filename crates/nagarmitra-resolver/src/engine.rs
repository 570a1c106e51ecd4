//! Location resolution state machine.
//!
//! The engine is synchronous and side-effect free. Every user intent
//! mutates state and returns the [`Lookup`]s the caller must execute;
//! completions come back through [`ResolverEngine::apply`] tagged with the
//! generation that requested them. The generation counter increments on
//! every user intent, so a completion older than the current generation is
//! discarded without touching state and the newest intent always wins.

use nagarmitra_core::{
    parse_manual_coordinates, Coordinates, LocationCandidate, ProviderAvailability,
    ResolvedLocation, SuggestionEntry,
};
use nagarmitra_geocode::SensorError;

use crate::view::ResolverView;

/// Queries shorter than this never trigger an autocomplete lookup.
pub const MIN_QUERY_LEN: usize = 2;

/// Where the engine currently is in the resolution workflow.
///
/// Availability is orthogonal: the engine can sit in any phase while the
/// geocoding provider is loading or unconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No selection and nothing in flight.
    Idle,
    /// An autocomplete lookup is outstanding or the dropdown is open.
    Searching,
    /// A suggestion was chosen but could not be resolved to coordinates.
    CandidateSelected,
    /// A blocking lookup (place details, text geocode, position fix) is
    /// outstanding and there is nothing confirmable yet for that intent.
    Resolving,
    /// A full location is held and confirmable. A background address
    /// upgrade may still be in flight.
    Resolved,
}

/// User-facing problems the presentation layer should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveIssue {
    PermissionDenied,
    PositionUnavailable,
    PositionTimedOut,
    SelectionUnresolved,
    ManualEntryInvalid,
}

impl std::fmt::Display for ResolveIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveIssue::PermissionDenied => {
                write!(
                    f,
                    "Location permission denied. Please search manually or enable location access."
                )
            }
            ResolveIssue::PositionUnavailable => {
                write!(f, "Unable to get your location. Please search manually.")
            }
            ResolveIssue::PositionTimedOut => {
                write!(f, "Location request timed out. Please try again or search manually.")
            }
            ResolveIssue::SelectionUnresolved => {
                write!(f, "Could not fetch details for that place. Try another result.")
            }
            ResolveIssue::ManualEntryInvalid => {
                write!(f, "Enter coordinates as \"lat, lng\", for example 28.6139, 77.2090.")
            }
        }
    }
}

/// Asynchronous work requested by the engine. Each lookup carries the
/// generation that requested it; the executor must hand that generation
/// back to [`ResolverEngine::apply`] unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Fetch autocomplete suggestions for a query. `near` is the current
    /// selection's coordinates when there is one, for proximity bias.
    Suggest {
        generation: u64,
        query: String,
        near: Option<Coordinates>,
    },
    /// Fetch full details for a chosen suggestion.
    Details { generation: u64, place_id: String },
    /// Forward-geocode free text. Emitted as the fallback when a details
    /// lookup fails.
    Geocode { generation: u64, text: String },
    /// Reverse-geocode coordinates to upgrade a placeholder address.
    Reverse {
        generation: u64,
        coordinates: Coordinates,
    },
    /// Acquire a device position fix.
    Position { generation: u64 },
}

impl Lookup {
    pub fn generation(&self) -> u64 {
        match self {
            Lookup::Suggest { generation, .. }
            | Lookup::Details { generation, .. }
            | Lookup::Geocode { generation, .. }
            | Lookup::Reverse { generation, .. }
            | Lookup::Position { generation } => *generation,
        }
    }
}

/// The result of an executed [`Lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Suggestions(Vec<SuggestionEntry>),
    SuggestFailed,
    Details(ResolvedLocation),
    DetailsFailed,
    Geocoded(ResolvedLocation),
    GeocodeFailed,
    ReverseGeocoded(String),
    ReverseFailed,
    PositionFix(Coordinates),
    PositionFailed(SensorError),
}

/// The resolution state machine.
///
/// Holds the search box text, the suggestion dropdown, the current
/// candidate or resolved location, and the generation counter that
/// arbitrates racing lookups. [`ResolverEngine::confirm`] is the only way
/// a location leaves the engine.
pub struct ResolverEngine {
    availability: ProviderAvailability,
    generation: u64,
    query: String,
    suggestions: Vec<SuggestionEntry>,
    dropdown_open: bool,
    focused: bool,
    press_guard: bool,
    candidate: Option<LocationCandidate>,
    resolved: Option<ResolvedLocation>,
    issue: Option<ResolveIssue>,
    search_inflight: bool,
    lookup_inflight: bool,
    upgrade_inflight: bool,
}

impl ResolverEngine {
    pub fn new(availability: ProviderAvailability) -> Self {
        Self {
            availability,
            generation: 0,
            query: String::new(),
            suggestions: Vec::new(),
            dropdown_open: false,
            focused: false,
            press_guard: false,
            candidate: None,
            resolved: None,
            issue: None,
            search_inflight: false,
            lookup_inflight: false,
            upgrade_inflight: false,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn availability(&self) -> ProviderAvailability {
        self.availability
    }

    /// Records a provider availability change. Losing the provider clears
    /// the dropdown; gaining it never fires a lookup on its own, the next
    /// keystroke does.
    pub fn set_availability(&mut self, availability: ProviderAvailability) {
        self.availability = availability;
        if !self.availability.is_ready() {
            self.suggestions.clear();
            self.dropdown_open = false;
            self.search_inflight = false;
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.lookup_inflight {
            Phase::Resolving
        } else if self.search_inflight || self.dropdown_open {
            Phase::Searching
        } else if self.resolved.is_some() {
            Phase::Resolved
        } else if self.candidate.is_some() {
            Phase::CandidateSelected
        } else {
            Phase::Idle
        }
    }

    /// The search box changed. Fires an autocomplete lookup once the
    /// trimmed query reaches [`MIN_QUERY_LEN`] characters and the provider
    /// is ready; shorter or unready queries just clear the dropdown.
    pub fn query_edited(&mut self, text: &str) -> Vec<Lookup> {
        self.begin_intent();
        // Typing implies the input has focus.
        self.focused = true;
        self.query = text.to_owned();

        if text.trim().chars().count() < MIN_QUERY_LEN || !self.availability.is_ready() {
            self.suggestions.clear();
            self.dropdown_open = false;
            return Vec::new();
        }

        self.search_inflight = true;
        vec![Lookup::Suggest {
            generation: self.generation,
            query: text.to_owned(),
            near: self.selected_coordinates(),
        }]
    }

    /// A pointer went down on a suggestion row. The guard keeps the
    /// dropdown alive through the focus loss that lands before the click.
    pub fn suggestion_press_started(&mut self) {
        self.press_guard = true;
    }

    /// Search box focus changed. Regaining focus reopens the dropdown if
    /// suggestions are on hand; losing it closes the dropdown unless a
    /// suggestion press is mid-flight.
    pub fn focus_changed(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.dropdown_open = !self.suggestions.is_empty();
        } else if self.press_guard {
            self.press_guard = false;
        } else {
            self.dropdown_open = false;
        }
    }

    /// A suggestion was chosen. The previous selection is dropped, the
    /// query takes the suggestion text, and a details lookup goes out.
    /// Nothing is confirmable until that resolution lands.
    pub fn suggestion_chosen(&mut self, entry: &SuggestionEntry) -> Vec<Lookup> {
        self.begin_intent();
        self.press_guard = false;
        self.query = entry.description.clone();
        self.suggestions.clear();
        self.dropdown_open = false;
        self.candidate = Some(LocationCandidate {
            address: entry.description.clone(),
            coordinates: None,
        });
        self.resolved = None;
        self.lookup_inflight = true;

        vec![Lookup::Details {
            generation: self.generation,
            place_id: entry.id.clone(),
        }]
    }

    /// The use-my-location control was pressed. Any previously resolved
    /// location stays on display until a fix actually replaces it.
    pub fn locate_device(&mut self) -> Vec<Lookup> {
        self.begin_intent();
        self.suggestions.clear();
        self.dropdown_open = false;
        self.lookup_inflight = true;

        vec![Lookup::Position {
            generation: self.generation,
        }]
    }

    /// The map was tapped or the pin dragged. The coordinates become the
    /// resolved location immediately, with a coordinate-string address
    /// that a reverse geocode upgrades in the background when the
    /// provider is ready.
    pub fn map_picked(&mut self, coordinates: Coordinates) -> Vec<Lookup> {
        self.begin_intent();
        self.suggestions.clear();
        self.dropdown_open = false;
        self.candidate = None;

        let placeholder = ResolvedLocation::from_coordinates(coordinates);
        self.query = placeholder.address.clone();
        self.resolved = Some(placeholder);

        if self.availability.is_ready() {
            self.upgrade_inflight = true;
            return vec![Lookup::Reverse {
                generation: self.generation,
                coordinates,
            }];
        }
        Vec::new()
    }

    /// Manually entered coordinates were submitted. A valid `"lat, lng"`
    /// pair resolves immediately with no lookups at all, keeping the typed
    /// text as the address; anything else reports
    /// [`ResolveIssue::ManualEntryInvalid`] and leaves the current state,
    /// including in-flight work, untouched.
    pub fn manual_submitted(&mut self, text: &str) -> Vec<Lookup> {
        match parse_manual_coordinates(text) {
            Some(coordinates) => {
                self.begin_intent();
                self.suggestions.clear();
                self.dropdown_open = false;
                self.candidate = None;

                let address = text.trim().to_owned();
                self.query.clone_from(&address);
                self.resolved = Some(ResolvedLocation {
                    address,
                    coordinates,
                });
            }
            None => {
                self.issue = Some(ResolveIssue::ManualEntryInvalid);
            }
        }
        Vec::new()
    }

    /// Commits the currently displayed location. Returns a snapshot that
    /// later engine activity cannot mutate; `None` while nothing complete
    /// is on display.
    #[must_use]
    pub fn confirm(&self) -> Option<ResolvedLocation> {
        self.resolved.clone()
    }

    /// Feeds a lookup completion back into the machine.
    ///
    /// Completions for any generation other than the current one are
    /// discarded silently. Current-generation failures walk the fallback
    /// ladder: a failed details lookup retries as a text geocode of the
    /// chosen suggestion, a failed text geocode leaves the text-only
    /// candidate, and a failed reverse geocode keeps the coordinate-string
    /// address.
    pub fn apply(&mut self, generation: u64, outcome: LookupOutcome) -> Vec<Lookup> {
        if generation != self.generation {
            return Vec::new();
        }

        match outcome {
            LookupOutcome::Suggestions(entries) => {
                self.search_inflight = false;
                self.suggestions = entries;
                // Results that land while the input is blurred stay hidden
                // until the next focus.
                self.dropdown_open =
                    !self.suggestions.is_empty() && (self.focused || self.press_guard);
                Vec::new()
            }
            LookupOutcome::SuggestFailed => {
                self.search_inflight = false;
                self.suggestions.clear();
                self.dropdown_open = false;
                Vec::new()
            }
            LookupOutcome::Details(location) | LookupOutcome::Geocoded(location) => {
                self.resolve_success(location)
            }
            LookupOutcome::DetailsFailed => match &self.candidate {
                Some(candidate) => vec![Lookup::Geocode {
                    generation: self.generation,
                    text: candidate.address.clone(),
                }],
                None => {
                    self.lookup_inflight = false;
                    Vec::new()
                }
            },
            LookupOutcome::GeocodeFailed => {
                self.lookup_inflight = false;
                self.issue = Some(ResolveIssue::SelectionUnresolved);
                Vec::new()
            }
            LookupOutcome::ReverseGeocoded(address) => {
                self.upgrade_inflight = false;
                if let Some(current) = &self.resolved {
                    let upgraded = current.with_address(address);
                    self.query = upgraded.address.clone();
                    self.resolved = Some(upgraded);
                }
                Vec::new()
            }
            LookupOutcome::ReverseFailed => {
                // Coordinate-string address stays, still a valid location.
                self.upgrade_inflight = false;
                Vec::new()
            }
            LookupOutcome::PositionFix(coordinates) => {
                self.lookup_inflight = false;
                self.candidate = None;

                let placeholder = ResolvedLocation::from_coordinates(coordinates);
                self.query = placeholder.address.clone();
                self.resolved = Some(placeholder);

                if self.availability.is_ready() {
                    self.upgrade_inflight = true;
                    return vec![Lookup::Reverse {
                        generation: self.generation,
                        coordinates,
                    }];
                }
                Vec::new()
            }
            LookupOutcome::PositionFailed(error) => {
                self.lookup_inflight = false;
                self.issue = Some(match error {
                    SensorError::Denied => ResolveIssue::PermissionDenied,
                    SensorError::Unavailable => ResolveIssue::PositionUnavailable,
                    SensorError::TimedOut => ResolveIssue::PositionTimedOut,
                });
                Vec::new()
            }
        }
    }

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn view(&self) -> ResolverView {
        ResolverView {
            phase: self.phase(),
            availability: self.availability,
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
            dropdown_open: self.dropdown_open,
            selection: self.selection(),
            address_pending: self.upgrade_inflight,
            error: self.issue.as_ref().map(ToString::to_string),
            can_confirm: self.resolved.is_some(),
        }
    }

    fn selection(&self) -> Option<LocationCandidate> {
        match (&self.resolved, &self.candidate) {
            (Some(resolved), _) => Some(LocationCandidate::from(resolved.clone())),
            (None, Some(candidate)) => Some(candidate.clone()),
            (None, None) => None,
        }
    }

    fn selected_coordinates(&self) -> Option<Coordinates> {
        match (&self.resolved, &self.candidate) {
            (Some(resolved), _) => Some(resolved.coordinates),
            (None, Some(candidate)) => candidate.coordinates,
            (None, None) => None,
        }
    }

    fn resolve_success(&mut self, location: ResolvedLocation) -> Vec<Lookup> {
        self.lookup_inflight = false;
        self.candidate = None;
        self.query = location.address.clone();
        self.resolved = Some(location);
        Vec::new()
    }

    /// Every user intent starts here: the generation moves forward, which
    /// invalidates all outstanding lookups, and stale error banners clear.
    fn begin_intent(&mut self) {
        self.generation += 1;
        self.issue = None;
        self.search_inflight = false;
        self.lookup_inflight = false;
        self.upgrade_inflight = false;
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
