//! Read-only snapshot the presentation layer renders from.

use nagarmitra_core::{LocationCandidate, ProviderAvailability, SuggestionEntry};

use crate::engine::Phase;

/// Everything a frontend needs to draw the picker: search box text, the
/// dropdown, the current selection, availability, and any user-facing
/// error. Produced by [`ResolverEngine::view`](crate::ResolverEngine::view).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverView {
    pub phase: Phase,
    pub availability: ProviderAvailability,
    pub query: String,
    pub suggestions: Vec<SuggestionEntry>,
    pub dropdown_open: bool,
    /// Current selection. Complete (address and coordinates) once
    /// resolution succeeded, address-only when it could not.
    pub selection: Option<LocationCandidate>,
    /// True while a reverse-geocode upgrade of the selection's placeholder
    /// address is still in flight.
    pub address_pending: bool,
    pub error: Option<String>,
    /// Whether confirm would commit a location right now.
    pub can_confirm: bool,
}

impl ResolverView {
    /// True while any lookup for the current intent is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Searching | Phase::Resolving)
    }
}
