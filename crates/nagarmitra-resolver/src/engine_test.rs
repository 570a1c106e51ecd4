use super::*;

fn entry(id: &str, description: &str) -> SuggestionEntry {
    SuggestionEntry {
        id: id.to_owned(),
        description: description.to_owned(),
        main_text: None,
        secondary_text: None,
    }
}

fn ready_engine() -> ResolverEngine {
    ResolverEngine::new(ProviderAvailability::Ready)
}

#[test]
fn engine_starts_idle() {
    let engine = ResolverEngine::new(ProviderAvailability::Loading);
    let view = engine.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.availability, ProviderAvailability::Loading);
    assert!(view.query.is_empty());
    assert!(view.selection.is_none());
    assert!(!view.can_confirm);
}

#[test]
fn short_query_never_fires_a_lookup() {
    let mut engine = ready_engine();
    assert!(engine.query_edited("i").is_empty());
    assert_eq!(engine.phase(), Phase::Idle);

    // Whitespace padding does not count toward the minimum.
    assert!(engine.query_edited("  a  ").is_empty());
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn two_char_query_fires_suggest_with_current_generation() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("in");
    assert_eq!(
        lookups,
        vec![Lookup::Suggest {
            generation: 1,
            query: "in".to_owned(),
            near: None,
        }]
    );
    assert_eq!(engine.phase(), Phase::Searching);
}

#[test]
fn search_after_a_pick_biases_near_it() {
    let mut engine = ready_engine();
    engine.map_picked(Coordinates::DELHI);

    let lookups = engine.query_edited("hospital");
    assert!(matches!(
        &lookups[0],
        Lookup::Suggest { near: Some(center), .. }
            if (center.lat - Coordinates::DELHI.lat).abs() < 1e-9
    ));
}

#[test]
fn search_disabled_until_provider_ready() {
    let mut engine = ResolverEngine::new(ProviderAvailability::Unconfigured);
    assert!(engine.query_edited("india gate").is_empty());
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn provider_arriving_late_enables_search() {
    let mut engine = ResolverEngine::new(ProviderAvailability::Loading);
    assert!(engine.query_edited("india").is_empty());

    engine.set_availability(ProviderAvailability::Ready);
    let lookups = engine.query_edited("india");
    assert_eq!(lookups.len(), 1);
    assert!(matches!(lookups[0], Lookup::Suggest { .. }));
}

#[test]
fn newer_edit_discards_stale_suggestions() {
    let mut engine = ready_engine();
    let first = engine.query_edited("ind");
    let g1 = first[0].generation();
    let second = engine.query_edited("india");
    let g2 = second[0].generation();
    assert!(g2 > g1);

    let followups = engine.apply(
        g1,
        LookupOutcome::Suggestions(vec![entry("old", "Old Result")]),
    );
    assert!(followups.is_empty());
    assert!(engine.view().suggestions.is_empty());
    assert_eq!(engine.phase(), Phase::Searching, "newest lookup still out");

    engine.apply(
        g2,
        LookupOutcome::Suggestions(vec![entry("new", "New Result")]),
    );
    let view = engine.view();
    assert_eq!(view.suggestions.len(), 1);
    assert_eq!(view.suggestions[0].id, "new");
    assert!(view.dropdown_open);
}

#[test]
fn empty_suggestion_list_keeps_dropdown_closed() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("zxqzxq");
    engine.apply(lookups[0].generation(), LookupOutcome::Suggestions(Vec::new()));

    let view = engine.view();
    assert!(!view.dropdown_open);
    assert_eq!(view.phase, Phase::Idle);
}

#[test]
fn autocomplete_failure_is_quiet() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("india");
    engine.apply(lookups[0].generation(), LookupOutcome::SuggestFailed);

    let view = engine.view();
    assert!(view.suggestions.is_empty());
    assert!(view.error.is_none());
    assert_eq!(view.phase, Phase::Idle);
}

#[test]
fn blur_closes_dropdown_and_focus_reopens_it() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("india");
    engine.apply(
        lookups[0].generation(),
        LookupOutcome::Suggestions(vec![entry("p1", "India Gate")]),
    );
    assert!(engine.view().dropdown_open);

    engine.focus_changed(false);
    assert!(!engine.view().dropdown_open);

    engine.focus_changed(true);
    assert!(engine.view().dropdown_open, "suggestions are still on hand");
}

#[test]
fn suggestions_landing_after_blur_stay_hidden() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("connaught");
    engine.focus_changed(false);

    engine.apply(
        lookups[0].generation(),
        LookupOutcome::Suggestions(vec![entry("p1", "Connaught Place")]),
    );

    let view = engine.view();
    assert!(
        !view.dropdown_open,
        "input is blurred and no press is in flight"
    );
    assert_eq!(view.suggestions.len(), 1, "results are held for refocus");

    engine.focus_changed(true);
    assert!(engine.view().dropdown_open);
}

#[test]
fn suggestion_press_survives_focus_loss() {
    let mut engine = ready_engine();
    let lookups = engine.query_edited("india");
    engine.apply(
        lookups[0].generation(),
        LookupOutcome::Suggestions(vec![entry("p1", "India Gate, New Delhi")]),
    );

    engine.suggestion_press_started();
    engine.focus_changed(false);
    assert!(
        engine.view().dropdown_open,
        "press guard should keep the dropdown open through blur"
    );

    let chosen = engine.suggestion_chosen(&entry("p1", "India Gate, New Delhi"));
    assert!(matches!(&chosen[0], Lookup::Details { place_id, .. } if place_id == "p1"));
}

#[test]
fn choosing_a_suggestion_enters_resolving() {
    let mut engine = ready_engine();
    let lookups = engine.suggestion_chosen(&entry("p1", "India Gate, New Delhi"));
    assert_eq!(lookups.len(), 1);
    assert!(matches!(&lookups[0], Lookup::Details { place_id, .. } if place_id == "p1"));

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolving);
    assert_eq!(view.query, "India Gate, New Delhi");
    assert!(view.suggestions.is_empty());
    assert!(!view.can_confirm, "nothing confirmable until resolution lands");
}

#[test]
fn details_success_resolves_and_fills_query() {
    let mut engine = ready_engine();
    let chosen = engine.suggestion_chosen(&entry("p1", "India Gate, New Delhi"));
    let g = chosen[0].generation();

    let followups = engine.apply(
        g,
        LookupOutcome::Details(ResolvedLocation {
            address: "Kartavya Path, India Gate, New Delhi 110001".to_owned(),
            coordinates: Coordinates {
                lat: 28.612894,
                lng: 77.229446,
            },
        }),
    );
    assert!(followups.is_empty());

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(view.query, "Kartavya Path, India Gate, New Delhi 110001");
    assert!(view.can_confirm);

    let committed = engine.confirm().expect("resolved location should commit");
    assert_eq!(committed.address, "Kartavya Path, India Gate, New Delhi 110001");
}

#[test]
fn details_failure_falls_back_to_text_geocode() {
    let mut engine = ready_engine();
    let chosen = engine.suggestion_chosen(&entry("p1", "Khan Market, New Delhi"));
    let g = chosen[0].generation();

    let followups = engine.apply(g, LookupOutcome::DetailsFailed);
    assert_eq!(
        followups,
        vec![Lookup::Geocode {
            generation: g,
            text: "Khan Market, New Delhi".to_owned(),
        }]
    );
    assert_eq!(engine.phase(), Phase::Resolving, "still walking the ladder");
}

#[test]
fn exhausted_ladder_leaves_text_only_candidate() {
    let mut engine = ready_engine();
    let chosen = engine.suggestion_chosen(&entry("p1", "Khan Market, New Delhi"));
    let g = chosen[0].generation();

    engine.apply(g, LookupOutcome::DetailsFailed);
    engine.apply(g, LookupOutcome::GeocodeFailed);

    let view = engine.view();
    assert_eq!(view.phase, Phase::CandidateSelected);
    let selection = view.selection.expect("text-only candidate should remain");
    assert_eq!(selection.address, "Khan Market, New Delhi");
    assert!(selection.coordinates.is_none());
    assert!(!view.can_confirm);
    assert!(engine.confirm().is_none());
    assert!(view.error.expect("ladder end reports an error").contains("Could not fetch"));
}

#[test]
fn map_pick_publishes_placeholder_synchronously() {
    let mut engine = ready_engine();
    let lookups = engine.map_picked(Coordinates {
        lat: 28.5355,
        lng: 77.391,
    });

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert!(view.can_confirm);
    assert!(view.address_pending, "upgrade is in flight");
    let selection = view.selection.expect("selection should be present");
    assert_eq!(selection.address, "Lat: 28.535500, Lng: 77.391000");
    assert!(matches!(&lookups[0], Lookup::Reverse { .. }));

    engine.apply(
        lookups[0].generation(),
        LookupOutcome::ReverseGeocoded("Sector 18, Noida".to_owned()),
    );
    let view = engine.view();
    assert!(!view.address_pending);
    let selection = view.selection.expect("selection should be present");
    assert_eq!(selection.address, "Sector 18, Noida");
    assert_eq!(view.query, "Sector 18, Noida");
    let coordinates = selection.coordinates.expect("coordinates survive the upgrade");
    assert!((coordinates.lat - 28.5355).abs() < 1e-9);
    assert!((coordinates.lng - 77.391).abs() < 1e-9);
}

#[test]
fn map_pick_without_provider_skips_reverse_lookup() {
    let mut engine = ResolverEngine::new(ProviderAvailability::Unconfigured);
    let lookups = engine.map_picked(Coordinates::DELHI);
    assert!(lookups.is_empty());

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(
        view.selection.expect("selection should be present").address,
        Coordinates::DELHI.as_address()
    );
    assert!(view.can_confirm);
}

#[test]
fn map_pick_during_details_lookup_wins() {
    let mut engine = ready_engine();
    let chosen = engine.suggestion_chosen(&entry("p1", "Khan Market"));
    let g_details = chosen[0].generation();

    let picked = engine.map_picked(Coordinates::DELHI);

    // The slow details response lands after the pick and must not displace it.
    engine.apply(
        g_details,
        LookupOutcome::Details(ResolvedLocation {
            address: "Khan Market, New Delhi".to_owned(),
            coordinates: Coordinates {
                lat: 28.6003,
                lng: 77.227,
            },
        }),
    );
    let view = engine.view();
    assert_eq!(
        view.selection.expect("map pick should remain").address,
        Coordinates::DELHI.as_address()
    );

    // The pick's own reverse geocode still applies.
    engine.apply(
        picked[0].generation(),
        LookupOutcome::ReverseGeocoded("Kartavya Path, New Delhi".to_owned()),
    );
    assert_eq!(
        engine.view().selection.expect("selection should be present").address,
        "Kartavya Path, New Delhi"
    );
}

#[test]
fn reverse_failure_keeps_coordinate_address() {
    let mut engine = ready_engine();
    let picked = engine.map_picked(Coordinates::DELHI);
    engine.apply(picked[0].generation(), LookupOutcome::ReverseFailed);

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(
        view.selection.expect("selection should be present").address,
        Coordinates::DELHI.as_address()
    );
    assert!(view.error.is_none());
}

#[test]
fn typing_discards_pending_address_upgrade() {
    let mut engine = ready_engine();
    let picked = engine.map_picked(Coordinates::DELHI);
    let g_reverse = picked[0].generation();

    engine.query_edited("new search");
    engine.apply(
        g_reverse,
        LookupOutcome::ReverseGeocoded("India Gate".to_owned()),
    );

    let selection = engine
        .view()
        .selection
        .expect("pinned location should remain");
    assert_eq!(
        selection.address,
        Coordinates::DELHI.as_address(),
        "stale upgrade must not land"
    );
}

#[test]
fn second_drag_wins_regardless_of_completion_order() {
    let mut engine = ready_engine();
    let first = engine.map_picked(Coordinates {
        lat: 28.61,
        lng: 77.2,
    });
    let second = engine.map_picked(Coordinates {
        lat: 28.62,
        lng: 77.21,
    });

    // Completions arrive in reverse order.
    engine.apply(
        second[0].generation(),
        LookupOutcome::ReverseGeocoded("Second Drag Address".to_owned()),
    );
    engine.apply(
        first[0].generation(),
        LookupOutcome::ReverseGeocoded("First Drag Address".to_owned()),
    );

    let selection = engine
        .view()
        .selection
        .expect("selection should be present");
    assert_eq!(selection.address, "Second Drag Address");
    let coordinates = selection.coordinates.expect("coordinates should be present");
    assert!((coordinates.lat - 28.62).abs() < 1e-9);
}

#[test]
fn position_fix_publishes_placeholder_then_upgrades() {
    let mut engine = ready_engine();
    let lookups = engine.locate_device();
    assert!(matches!(lookups[0], Lookup::Position { .. }));
    assert_eq!(engine.phase(), Phase::Resolving);

    let g = lookups[0].generation();
    let followups = engine.apply(
        g,
        LookupOutcome::PositionFix(Coordinates {
            lat: 28.7,
            lng: 77.1,
        }),
    );
    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(
        view.selection.expect("fix should resolve").address,
        "Lat: 28.700000, Lng: 77.100000"
    );
    assert!(matches!(&followups[0], Lookup::Reverse { .. }));

    engine.apply(
        g,
        LookupOutcome::ReverseGeocoded("Mukherjee Nagar, Delhi".to_owned()),
    );
    assert_eq!(engine.view().query, "Mukherjee Nagar, Delhi");
}

#[test]
fn position_fix_with_reverse_failure_keeps_placeholder_address() {
    let mut engine = ready_engine();
    let lookups = engine.locate_device();
    let g = lookups[0].generation();

    let followups = engine.apply(g, LookupOutcome::PositionFix(Coordinates::DELHI));
    assert!(matches!(&followups[0], Lookup::Reverse { .. }));

    engine.apply(g, LookupOutcome::ReverseFailed);

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert!(view.can_confirm);
    assert!(view.error.is_none());
    let selection = view.selection.expect("fix should stay resolved");
    assert_eq!(selection.address, "Lat: 28.613900, Lng: 77.209000");
    let coordinates = selection.coordinates.expect("fix coordinates should remain");
    assert!((coordinates.lat - 28.6139).abs() < 1e-9);
    assert!((coordinates.lng - 77.2090).abs() < 1e-9);
}

#[test]
fn position_failure_keeps_previous_location() {
    let mut engine = ready_engine();
    engine.manual_submitted("28.6139, 77.2090");
    let pinned = engine.confirm().expect("manual entry should resolve");

    let lookups = engine.locate_device();
    engine.apply(
        lookups[0].generation(),
        LookupOutcome::PositionFailed(SensorError::TimedOut),
    );

    let view = engine.view();
    assert!(view
        .error
        .as_deref()
        .expect("failure should surface a message")
        .contains("timed out"));
    assert_eq!(
        view.selection.expect("previous pin should remain").address,
        pinned.address
    );
    assert!(view.can_confirm);
}

#[test]
fn manual_entry_resolves_without_lookups() {
    let mut engine = ResolverEngine::new(ProviderAvailability::Unconfigured);
    let lookups = engine.manual_submitted("28.6139, 77.2090");
    assert!(lookups.is_empty());

    let view = engine.view();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(view.query, "28.6139, 77.2090");

    let committed = engine.confirm().expect("manual coordinates should commit");
    assert_eq!(committed.address, "28.6139, 77.2090", "typed text becomes the address");
    assert!((committed.coordinates.lat - 28.6139).abs() < 1e-9);
    assert!((committed.coordinates.lng - 77.209).abs() < 1e-9);
}

#[test]
fn invalid_manual_entry_reports_and_preserves_state() {
    let mut engine = ready_engine();
    let picked = engine.map_picked(Coordinates::DELHI);
    let g = picked[0].generation();

    engine.manual_submitted("not coordinates");
    let view = engine.view();
    assert!(view.error.expect("invalid entry reports").contains("lat, lng"));
    assert!(view.can_confirm, "previous location is untouched");

    // A rejected submit is not an intent, so the pending upgrade still lands.
    engine.apply(g, LookupOutcome::ReverseGeocoded("Rajpath Area".to_owned()));
    assert_eq!(
        engine.view().selection.expect("selection should be present").address,
        "Rajpath Area"
    );
}

#[test]
fn confirmed_location_is_a_stable_snapshot() {
    let mut engine = ready_engine();
    let picked = engine.map_picked(Coordinates::DELHI);

    let committed = engine.confirm().expect("placeholder should be confirmable");
    assert_eq!(committed.address, Coordinates::DELHI.as_address());

    engine.apply(
        picked[0].generation(),
        LookupOutcome::ReverseGeocoded("India Gate".to_owned()),
    );
    assert_eq!(
        committed.address,
        Coordinates::DELHI.as_address(),
        "earlier commit must not mutate"
    );
    assert_eq!(
        engine.confirm().expect("selection still held").address,
        "India Gate"
    );
}
