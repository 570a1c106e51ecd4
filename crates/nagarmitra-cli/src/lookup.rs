//! One-shot geocoding commands.
//!
//! These talk to the provider directly rather than through a resolver
//! session, so they fail fast with a hint when no API key is configured.

use std::sync::Arc;

use nagarmitra_core::{parse_manual_coordinates, AppConfig, IssueCategory};
use nagarmitra_geocode::{GeocoderClient, ProviderLoader, SearchBias};

async fn ready_client(config: &AppConfig) -> anyhow::Result<Arc<GeocoderClient>> {
    ProviderLoader::from_config(config)
        .ensure_ready()
        .await
        .map_err(|e| anyhow::anyhow!("{e}, set NAGARMITRA_MAPS_API_KEY to enable lookups"))
}

pub(crate) async fn run_suggest(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let client = ready_client(config).await?;
    let bias = SearchBias::country_near(
        &config.country_bias,
        config.default_center,
        config.search_radius_m,
    );

    let suggestions = client.autocomplete(query, &bias).await?;
    if suggestions.is_empty() {
        println!("no suggestions for {query:?}");
        return Ok(());
    }
    for entry in &suggestions {
        println!("{}  {}", entry.id, entry.description);
    }
    Ok(())
}

pub(crate) async fn run_geocode(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let client = ready_client(config).await?;
    let location = client.geocode(address).await?;
    println!("{}", location.address);
    println!("{}", location.coordinates.as_summary());
    Ok(())
}

pub(crate) async fn run_reverse(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let coordinates = parse_manual_coordinates(text)
        .ok_or_else(|| anyhow::anyhow!("expected coordinates as \"lat, lng\", got {text:?}"))?;

    let client = ready_client(config).await?;
    let address = client.reverse_geocode(coordinates).await?;
    println!("{address}");
    Ok(())
}

pub(crate) fn print_categories() {
    for category in IssueCategory::ALL {
        println!("{:<18} {}", category.slug(), category.label());
    }
}
