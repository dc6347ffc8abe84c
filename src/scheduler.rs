use std::time::Duration;
use tokio::time;
use tracing::{debug, info, instrument, warn};

use crate::dashboard::{latest_observation_time, DashboardState};
use crate::hko::HkoClient;
use crate::normalizer::StationDataNormalizer;

/// Normalize the selected element once and publish it if still current.
#[instrument(skip(normalizer, state))]
pub async fn refresh_stations(normalizer: &StationDataNormalizer, state: &DashboardState) -> bool {
    let ticket = state.refresh();
    let stations = normalizer.normalize(ticket.element).await;
    state.apply_stations(ticket, stations)
}

/// Fetch the current weather summary and the "Updated" timestamp.
///
/// The timestamp comes from the selected element's bulk dataset when one is
/// configured, otherwise from the summary's temperature record time.
#[instrument(skip(hko, normalizer, state))]
pub async fn refresh_weather_box(
    hko: &HkoClient,
    normalizer: &StationDataNormalizer,
    state: &DashboardState,
) {
    let summary = hko.fetch_current_weather().await;

    let element = state.selected();
    let from_bulk = match normalizer.fetch_bulk_readings(element).await {
        Ok(readings) => latest_observation_time(&readings),
        Err(e) => {
            warn!("Failed to load {} readings for timestamp: {}", element, e);
            None
        }
    };
    let updated_at = from_bulk.or_else(|| summary.as_ref().and_then(|s| s.temperature_record_time()));

    if summary.is_none() {
        warn!("Current weather unavailable");
    }
    state.set_summary(summary);
    state.set_updated_at(updated_at);
}

#[instrument(skip(hko, state))]
pub async fn refresh_warnings(hko: &HkoClient, state: &DashboardState) {
    let warnings = hko.fetch_warnings().await;
    debug!("Fetched {} warning entries", warnings.len());
    state.set_warnings(warnings);
}

#[instrument(skip(normalizer, state), fields(interval_minutes = %interval_minutes))]
pub async fn start_station_refresh(
    normalizer: StationDataNormalizer,
    state: DashboardState,
    interval_minutes: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes.max(1) * 60));

    info!("Station refresh started with {} minute interval", interval_minutes);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing stations");

        if refresh_stations(&normalizer, &state).await {
            let (element, stations) = state.stations();
            if let Some(element) = element {
                info!("Station layer now shows {} {} stations", stations.len(), element);
            }
        } else {
            debug!("Station refresh superseded by a newer selection");
        }
    }
}

#[instrument(skip(hko, normalizer, state), fields(interval_secs = %interval_secs))]
pub async fn start_weather_box_refresh(
    hko: HkoClient,
    normalizer: StationDataNormalizer,
    state: DashboardState,
    interval_secs: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_secs.max(1)));

    info!("Weather box refresh started with {} second interval", interval_secs);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing weather box");

        refresh_weather_box(&hko, &normalizer, &state).await;
        info!("{} | {}", state.updated_label(), state.banner().message);
    }
}

#[instrument(skip(hko, state), fields(interval_secs = %interval_secs))]
pub async fn start_warning_refresh(hko: HkoClient, state: DashboardState, interval_secs: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_secs.max(1)));

    info!("Warning refresh started with {} second interval", interval_secs);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing warnings");

        refresh_warnings(&hko, &state).await;
    }
}
