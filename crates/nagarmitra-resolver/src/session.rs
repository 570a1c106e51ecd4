//! Async shell around [`ResolverEngine`].
//!
//! The session owns the engine behind a mutex and runs the lookups it
//! emits on spawned tasks. Every outcome funnels through one channel and
//! is applied in arrival order, so the engine's generation check is the
//! only arbiter a racing lookup ever meets.

use std::sync::Arc;

use nagarmitra_core::{
    AppConfig, Coordinates, ProviderAvailability, ResolvedLocation, SuggestionEntry,
};
use nagarmitra_geocode::{
    FixedSensor, GeocodeProvider, PositionSensor, ProviderLoader, SearchBias, SensorError,
    SensorOptions,
};
use tokio::sync::{mpsc, watch, Mutex};

use crate::engine::{Lookup, LookupOutcome, ResolverEngine};
use crate::view::ResolverView;

struct SessionInner {
    engine: Mutex<ResolverEngine>,
    provider: Mutex<Option<Arc<dyn GeocodeProvider>>>,
    sensor: Arc<dyn PositionSensor>,
    bias: SearchBias,
    sensor_options: SensorOptions,
    outcomes: mpsc::UnboundedSender<(u64, LookupOutcome)>,
    pending: watch::Sender<usize>,
}

/// Drives a [`ResolverEngine`] on a Tokio runtime.
///
/// Cloning is cheap and every clone talks to the same engine. Intent
/// methods return the view snapshot taken immediately after the intent
/// was recorded; later lookup completions are observed through
/// [`ResolverSession::view`].
#[derive(Clone)]
pub struct ResolverSession {
    inner: Arc<SessionInner>,
}

impl ResolverSession {
    /// Starts a session and kicks off the provider load in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        loader: ProviderLoader,
        sensor: Arc<dyn PositionSensor>,
        bias: SearchBias,
        sensor_options: SensorOptions,
    ) -> Self {
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        // Starts at 1: the provider load counts as pending work.
        let (pending_tx, _) = watch::channel(1_usize);

        let inner = Arc::new(SessionInner {
            engine: Mutex::new(ResolverEngine::new(loader.availability())),
            provider: Mutex::new(None),
            sensor,
            bias,
            sensor_options,
            outcomes: outcome_tx,
            pending: pending_tx,
        });

        let init = Arc::clone(&inner);
        tokio::spawn(async move {
            match loader.ensure_ready().await {
                Ok(client) => {
                    let provider: Arc<dyn GeocodeProvider> = client;
                    *init.provider.lock().await = Some(provider);
                    init.engine
                        .lock()
                        .await
                        .set_availability(ProviderAvailability::Ready);
                }
                Err(error) => {
                    tracing::debug!(error = %error, "geocoding provider unavailable");
                    init.engine
                        .lock()
                        .await
                        .set_availability(ProviderAvailability::Unconfigured);
                }
            }
            init.finish_one();
        });

        // Holds the inner state weakly so dropping the last session handle
        // ends the pump once in-flight lookups drain.
        let pump = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some((generation, outcome)) = outcome_rx.recv().await {
                let Some(inner) = pump.upgrade() else { break };
                let followups = {
                    let mut engine = inner.engine.lock().await;
                    if generation != engine.generation() {
                        tracing::debug!(
                            generation,
                            current = engine.generation(),
                            "dropping stale lookup outcome"
                        );
                    }
                    engine.apply(generation, outcome)
                };
                for lookup in followups {
                    SessionInner::dispatch(&inner, lookup);
                }
                inner.finish_one();
            }
        });

        Self { inner }
    }

    /// Builds a session from application config: loader from the API key
    /// settings, a fixed sensor from `device_position`, search bias from
    /// the country and default center.
    pub fn from_config(config: &AppConfig) -> Self {
        let loader = ProviderLoader::from_config(config);
        let sensor: Arc<dyn PositionSensor> = Arc::new(FixedSensor::new(config.device_position));
        let bias = SearchBias::country_near(
            &config.country_bias,
            config.default_center,
            config.search_radius_m,
        );
        let sensor_options =
            SensorOptions::from_secs(config.sensor_timeout_secs, config.sensor_max_age_secs);
        Self::start(loader, sensor, bias, sensor_options)
    }

    pub async fn query_edited(&self, text: &str) -> ResolverView {
        self.intent(|engine| engine.query_edited(text)).await
    }

    pub async fn suggestion_press_started(&self) -> ResolverView {
        self.intent(|engine| {
            engine.suggestion_press_started();
            Vec::new()
        })
        .await
    }

    pub async fn focus_changed(&self, focused: bool) -> ResolverView {
        self.intent(|engine| {
            engine.focus_changed(focused);
            Vec::new()
        })
        .await
    }

    pub async fn suggestion_chosen(&self, entry: &SuggestionEntry) -> ResolverView {
        self.intent(|engine| engine.suggestion_chosen(entry)).await
    }

    pub async fn locate_device(&self) -> ResolverView {
        self.intent(ResolverEngine::locate_device).await
    }

    pub async fn map_picked(&self, coordinates: Coordinates) -> ResolverView {
        self.intent(|engine| engine.map_picked(coordinates)).await
    }

    pub async fn manual_submitted(&self, text: &str) -> ResolverView {
        self.intent(|engine| engine.manual_submitted(text)).await
    }

    /// Commits the current location, if one is resolved.
    pub async fn confirm(&self) -> Option<ResolvedLocation> {
        self.inner.engine.lock().await.confirm()
    }

    pub async fn view(&self) -> ResolverView {
        self.inner.engine.lock().await.view()
    }

    /// Resolves once no lookup is in flight, including the initial
    /// provider load. New intents issued while waiting extend the wait.
    pub async fn settled(&self) {
        let mut pending = self.inner.pending.subscribe();
        loop {
            if *pending.borrow_and_update() == 0 {
                return;
            }
            if pending.changed().await.is_err() {
                return;
            }
        }
    }

    async fn intent<F>(&self, f: F) -> ResolverView
    where
        F: FnOnce(&mut ResolverEngine) -> Vec<Lookup>,
    {
        let (view, lookups) = {
            let mut engine = self.inner.engine.lock().await;
            let lookups = f(&mut engine);
            (engine.view(), lookups)
        };
        for lookup in lookups {
            SessionInner::dispatch(&self.inner, lookup);
        }
        view
    }
}

impl SessionInner {
    fn dispatch(inner: &Arc<Self>, lookup: Lookup) {
        inner.pending.send_modify(|n| *n += 1);
        let task = Arc::clone(inner);
        tokio::spawn(async move {
            let generation = lookup.generation();
            let outcome = task.execute(lookup).await;
            if task.outcomes.send((generation, outcome)).is_err() {
                task.finish_one();
            }
        });
    }

    fn finish_one(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }

    async fn provider(&self) -> Option<Arc<dyn GeocodeProvider>> {
        self.provider.lock().await.clone()
    }

    async fn execute(&self, lookup: Lookup) -> LookupOutcome {
        match lookup {
            Lookup::Suggest { query, near, .. } => match self.provider().await {
                Some(provider) => {
                    // Bias toward the current selection over the configured center.
                    let mut bias = self.bias.clone();
                    if let Some(center) = near {
                        bias.center = Some(center);
                    }
                    match provider.autocomplete(&query, &bias).await {
                        Ok(suggestions) => LookupOutcome::Suggestions(suggestions),
                        Err(error) => {
                            tracing::debug!(error = %error, query = %query, "autocomplete failed");
                            LookupOutcome::SuggestFailed
                        }
                    }
                }
                None => LookupOutcome::SuggestFailed,
            },
            Lookup::Details { place_id, .. } => match self.provider().await {
                Some(provider) => match provider.place_details(&place_id).await {
                    Ok(location) => LookupOutcome::Details(location),
                    Err(error) => {
                        tracing::debug!(error = %error, place_id = %place_id, "place details failed");
                        LookupOutcome::DetailsFailed
                    }
                },
                None => LookupOutcome::DetailsFailed,
            },
            Lookup::Geocode { text, .. } => match self.provider().await {
                Some(provider) => match provider.geocode(&text).await {
                    Ok(location) => LookupOutcome::Geocoded(location),
                    Err(error) => {
                        tracing::debug!(error = %error, text = %text, "text geocode failed");
                        LookupOutcome::GeocodeFailed
                    }
                },
                None => LookupOutcome::GeocodeFailed,
            },
            Lookup::Reverse { coordinates, .. } => match self.provider().await {
                Some(provider) => match provider.reverse_geocode(coordinates).await {
                    Ok(address) => LookupOutcome::ReverseGeocoded(address),
                    Err(error) => {
                        tracing::debug!(error = %error, position = %coordinates, "reverse geocode failed");
                        LookupOutcome::ReverseFailed
                    }
                },
                None => LookupOutcome::ReverseFailed,
            },
            Lookup::Position { .. } => {
                let options = self.sensor_options;
                let position =
                    tokio::time::timeout(options.timeout, self.sensor.current_position(&options))
                        .await;
                match position {
                    Ok(Ok(fix)) => LookupOutcome::PositionFix(fix),
                    Ok(Err(error)) => LookupOutcome::PositionFailed(error),
                    Err(_) => LookupOutcome::PositionFailed(SensorError::TimedOut),
                }
            }
        }
    }
}
