use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::element::WeatherElement;
use crate::hko::{CurrentWeather, WarningsByCode};
use crate::models::{NormalizedStation, RawReading};
use crate::utils::hong_kong_offset;

pub const NO_WARNING_MESSAGE: &str = "There is no weather warning in force.";
pub const UNAVAILABLE_MESSAGE: &str = "Failed to fetch weather data.";

/// Identifies one station refresh; only the newest ticket may publish results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub element: WeatherElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Warning,
    Clear,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub message: String,
    pub level: BannerLevel,
}

/// Warning banner text for the last fetched current weather report.
pub fn warning_banner(current: Option<&CurrentWeather>) -> Banner {
    match current {
        Some(c) if c.has_warning() => Banner {
            message: c.warning_message.join(" "),
            level: BannerLevel::Warning,
        },
        Some(_) => Banner {
            message: NO_WARNING_MESSAGE.to_string(),
            level: BannerLevel::Clear,
        },
        None => Banner {
            message: UNAVAILABLE_MESSAGE.to_string(),
            level: BannerLevel::Unavailable,
        },
    }
}

/// Most recent observation time in a dataset.
pub fn latest_observation_time(readings: &[RawReading]) -> Option<DateTime<FixedOffset>> {
    readings.iter().filter_map(|r| r.observed_at).max()
}

/// Weather box timestamp label, e.g. `Updated: 19 Jan 02:45 PM` (Hong Kong time).
pub fn format_updated(time: Option<DateTime<FixedOffset>>) -> String {
    match time {
        Some(t) => format!(
            "Updated: {}",
            t.with_timezone(&hong_kong_offset()).format("%-d %b %I:%M %p")
        ),
        None => "Updated: —".to_string(),
    }
}

#[derive(Default)]
struct Inner {
    stations: Vec<NormalizedStation>,
    stations_element: Option<WeatherElement>,
    summary: Option<CurrentWeather>,
    warnings: WarningsByCode,
    updated_at: Option<DateTime<FixedOffset>>,
}

/// Shared dashboard context: selected element, current station layer and last summary
///
/// Refreshes race freely; a refresh publishes its stations only if no newer
/// selection has started since its ticket was issued.
#[derive(Clone)]
pub struct DashboardState {
    generation: Arc<AtomicU64>,
    selected: Arc<RwLock<WeatherElement>>,
    inner: Arc<RwLock<Inner>>,
}

impl DashboardState {
    pub fn new(element: WeatherElement) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            selected: Arc::new(RwLock::new(element)),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub fn selected(&self) -> WeatherElement {
        *self.selected.read().unwrap_or_else(|e| e.into_inner())
    }

    // Callers hold the `selected` write lock, so the element and the
    // generation it is issued under can't be split by another selection.
    fn issue(&self, element: WeatherElement) -> RefreshTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, %element, "Issued refresh ticket");
        RefreshTicket {
            generation,
            element,
        }
    }

    /// Select an element and start a refresh for it, superseding any in flight.
    pub fn select(&self, element: WeatherElement) -> RefreshTicket {
        let mut selected = self.selected.write().unwrap_or_else(|e| e.into_inner());
        *selected = element;
        self.issue(element)
    }

    /// Start a refresh of the currently selected element (timer-driven).
    pub fn refresh(&self) -> RefreshTicket {
        let selected = self.selected.write().unwrap_or_else(|e| e.into_inner());
        self.issue(*selected)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Publish stations for `ticket`; returns false (and drops them) if the ticket is stale.
    pub fn apply_stations(&self, ticket: RefreshTicket, stations: Vec<NormalizedStation>) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(ticket) {
            warn!(
                generation = ticket.generation,
                element = %ticket.element,
                "Discarding stale station refresh"
            );
            return false;
        }
        info!(
            generation = ticket.generation,
            element = %ticket.element,
            count = stations.len(),
            "Applied station refresh"
        );
        inner.stations = stations;
        inner.stations_element = Some(ticket.element);
        true
    }

    pub fn stations(&self) -> (Option<WeatherElement>, Vec<NormalizedStation>) {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        (inner.stations_element, inner.stations.clone())
    }

    pub fn set_summary(&self, summary: Option<CurrentWeather>) {
        self.inner.write().unwrap_or_else(|e| e.into_inner()).summary = summary;
    }

    pub fn summary(&self) -> Option<CurrentWeather> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .summary
            .clone()
    }

    pub fn banner(&self) -> Banner {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        warning_banner(inner.summary.as_ref())
    }

    pub fn set_warnings(&self, warnings: WarningsByCode) {
        self.inner.write().unwrap_or_else(|e| e.into_inner()).warnings = warnings;
    }

    pub fn warnings(&self) -> WarningsByCode {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .warnings
            .clone()
    }

    pub fn set_updated_at(&self, time: Option<DateTime<FixedOffset>>) {
        self.inner.write().unwrap_or_else(|e| e.into_inner()).updated_at = time;
    }

    pub fn updated_label(&self) -> String {
        format_updated(self.inner.read().unwrap_or_else(|e| e.into_inner()).updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_observation_time;
    use std::collections::BTreeMap;

    fn reading(time: &str) -> RawReading {
        RawReading {
            station_key: "A".to_string(),
            observed_at: parse_observation_time(time),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let state = DashboardState::new(WeatherElement::Temperature);
        let first = state.select(WeatherElement::Temperature);
        let second = state.select(WeatherElement::Wind);

        assert!(!state.apply_stations(first, Vec::new()));
        assert_eq!(state.stations().0, None);

        assert!(state.apply_stations(second, Vec::new()));
        assert_eq!(state.stations().0, Some(WeatherElement::Wind));
        assert_eq!(state.selected(), WeatherElement::Wind);
    }

    #[test]
    fn test_timer_refresh_never_reverts_user_selection() {
        let state = DashboardState::new(WeatherElement::Temperature);
        let timer = state.refresh();
        let user = state.select(WeatherElement::Wind);

        assert!(!state.apply_stations(timer, Vec::new()));
        assert!(state.apply_stations(user, Vec::new()));
        assert_eq!(state.selected(), WeatherElement::Wind);

        // A timer tick after the selection refreshes the new element.
        let next = state.refresh();
        assert_eq!(next.element, WeatherElement::Wind);
        assert!(state.is_current(next));
    }

    #[test]
    fn test_concurrent_refresh_and_select_keep_selection() {
        for _ in 0..500 {
            let state = DashboardState::new(WeatherElement::Temperature);
            let timer_state = state.clone();

            std::thread::scope(|scope| {
                scope.spawn(move || {
                    timer_state.refresh();
                });
                state.select(WeatherElement::Wind);
            });

            assert_eq!(state.selected(), WeatherElement::Wind);
            let latest = RefreshTicket {
                generation: 2,
                element: WeatherElement::Wind,
            };
            assert!(state.is_current(latest));
            assert!(state.apply_stations(latest, Vec::new()));
            assert_eq!(state.stations().0, Some(WeatherElement::Wind));
        }
    }

    #[test]
    fn test_refresh_reuses_selected_element() {
        let state = DashboardState::new(WeatherElement::Humidity);
        let ticket = state.refresh();
        assert_eq!(ticket.element, WeatherElement::Humidity);
        assert!(state.is_current(ticket));
    }

    #[test]
    fn test_banner_levels() {
        assert_eq!(warning_banner(None).level, BannerLevel::Unavailable);

        let clear = CurrentWeather::default();
        let banner = warning_banner(Some(&clear));
        assert_eq!(banner.level, BannerLevel::Clear);
        assert_eq!(banner.message, NO_WARNING_MESSAGE);

        let warned = CurrentWeather {
            warning_message: vec!["The Cold Weather Warning is in force.".to_string()],
            ..CurrentWeather::default()
        };
        assert_eq!(warning_banner(Some(&warned)).level, BannerLevel::Warning);
    }

    #[test]
    fn test_state_banner_uses_cached_summary() {
        let state = DashboardState::new(WeatherElement::Temperature);
        assert_eq!(state.banner().level, BannerLevel::Unavailable);
        state.set_summary(Some(CurrentWeather::default()));
        assert_eq!(state.banner().level, BannerLevel::Clear);
    }

    #[test]
    fn test_latest_observation_time() {
        let readings = vec![
            reading("2026-01-19 14:40:00"),
            reading("garbage"),
            reading("2026-01-19 14:50:00"),
        ];
        assert_eq!(
            latest_observation_time(&readings),
            parse_observation_time("2026-01-19 14:50:00")
        );
        assert_eq!(latest_observation_time(&[]), None);
    }

    #[test]
    fn test_format_updated() {
        let t = parse_observation_time("2026-01-19T06:45:00Z");
        assert_eq!(format_updated(t), "Updated: 19 Jan 02:45 PM");
        assert_eq!(format_updated(None), "Updated: —");
    }
}
