use std::collections::HashMap;

use chrono::Duration;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{load_catalog, CatalogKeys};
use crate::element::WeatherElement;
use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;
use crate::hko::CurrentWeather;
use crate::models::{
    DataSourceRef, NormalizedStation, RawReading, StationCatalogEntry, StationReading, WindReading,
};
use crate::sources::{
    current_report_readings, parse_bulk, parse_csv_reading, parse_json_reading, FieldMap,
};
use crate::utils::parse_number;
use crate::wind::{kmh_to_knots, kmh_to_ms, NorthConvention, WindDirection};

/// How reading station keys are compared with catalog ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyMatch {
    #[default]
    Exact,
    CaseInsensitive,
}

impl KeyMatch {
    fn normalize(&self, key: &str) -> String {
        match self {
            KeyMatch::Exact => key.to_string(),
            KeyMatch::CaseInsensitive => key.trim().to_uppercase(),
        }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRules {
    pub key_match: KeyMatch,
    pub north: NorthConvention,
    /// History kept before the latest reading; `None` keeps everything.
    pub history_window: Option<Duration>,
}

impl Default for JoinRules {
    fn default() -> Self {
        Self {
            key_match: KeyMatch::Exact,
            north: NorthConvention::default(),
            history_window: Some(Duration::hours(12)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerStationFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLayout {
    /// One observation array covering every station.
    Bulk { locator: String },
    /// The HKO current weather report.
    CurrentReport { locator: String },
    /// One document per catalog entry, located by its `Data_url`.
    PerStation { format: PerStationFormat },
}

/// Everything needed to normalize one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSource {
    pub catalog: String,
    pub catalog_keys: CatalogKeys,
    pub layout: SourceLayout,
    pub fields: FieldMap,
}

fn derive_reading(
    element: WeatherElement,
    latest: &RawReading,
    fields: &FieldMap,
    north: NorthConvention,
) -> Option<StationReading> {
    if !element.is_wind() {
        let value = latest.field(&fields.value).and_then(parse_number)?;
        return Some(StationReading::Scalar { value });
    }

    let label = latest.field(&fields.wind_direction)?;
    let Some(direction) = WindDirection::parse(label) else {
        warn!(
            "Unrecognised wind direction '{}' for station {}",
            label, latest.station_key
        );
        return None;
    };
    let gust_kmh = latest.field(&fields.wind_gust).and_then(parse_number);

    let speed_kmh = match direction {
        WindDirection::Calm => 0.0,
        _ => latest
            .field(&fields.wind_speed)
            .and_then(parse_number)
            .filter(|s| *s >= 0.0)?,
    };

    Some(StationReading::Wind(WindReading {
        direction,
        degrees: direction.degrees(north),
        speed_kmh,
        speed_knots: kmh_to_knots(speed_kmh),
        speed_ms: kmh_to_ms(speed_kmh),
        gust_kmh,
    }))
}

/// Normalize one catalog entry against all readings matched to it
///
/// Readings are sorted ascending by time (untimed readings first) and the
/// last one is taken as latest. Returns `None` when nothing matched or the
/// latest reading has no usable primary value.
pub fn normalize_entry(
    entry: &StationCatalogEntry,
    mut readings: Vec<RawReading>,
    element: WeatherElement,
    fields: &FieldMap,
    rules: &JoinRules,
) -> Option<NormalizedStation> {
    if readings.is_empty() {
        debug!("No reading found for station {}", entry.id);
        return None;
    }

    readings.sort_by_key(|r| r.observed_at);
    let latest = readings.last()?;

    let Some(reading) = derive_reading(element, latest, fields, rules.north) else {
        debug!("Station {} has no usable {} value", entry.id, element);
        return None;
    };
    let observed_at = latest.observed_at;

    let history = match observed_at {
        Some(latest_time) => {
            let cutoff = rules.history_window.map(|window| latest_time - window);
            readings
                .into_iter()
                .filter(|r| match (r.observed_at, cutoff) {
                    (Some(t), Some(cutoff)) => t >= cutoff,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
                .collect()
        }
        None => readings.split_off(readings.len() - 1),
    };

    Some(NormalizedStation {
        id: entry.id.clone(),
        name: entry.name.clone(),
        position: entry.position,
        element,
        reading,
        observed_at,
        history,
    })
}

/// Join a bulk dataset onto a catalog, keeping catalog order.
pub fn join_bulk(
    catalog: &[StationCatalogEntry],
    readings: &[RawReading],
    element: WeatherElement,
    fields: &FieldMap,
    rules: &JoinRules,
) -> Vec<NormalizedStation> {
    let mut by_key: HashMap<String, Vec<&RawReading>> = HashMap::new();
    for reading in readings {
        by_key
            .entry(rules.key_match.normalize(&reading.station_key))
            .or_default()
            .push(reading);
    }

    catalog
        .iter()
        .filter_map(|entry| {
            let key = match &entry.source {
                DataSourceRef::BulkKey(key) => key.as_str(),
                DataSourceRef::Url(_) => entry.id.as_str(),
            };
            let matched = by_key
                .get(&rules.key_match.normalize(key))
                .map(|rs| rs.iter().map(|r| (*r).clone()).collect())
                .unwrap_or_default();
            normalize_entry(entry, matched, element, fields, rules)
        })
        .collect()
}

/// Fetches catalogs and readings per element and joins them into renderable stations.
#[derive(Clone)]
pub struct StationDataNormalizer {
    fetcher: ResourceFetcher,
    sources: HashMap<WeatherElement, ElementSource>,
    rules: JoinRules,
    concurrency: usize,
}

impl StationDataNormalizer {
    pub fn new(
        fetcher: ResourceFetcher,
        sources: HashMap<WeatherElement, ElementSource>,
        rules: JoinRules,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            sources,
            rules,
            concurrency: concurrency.max(1),
        }
    }

    /// Normalized stations for `element`; every failure degrades to fewer (or no) stations.
    #[instrument(skip(self))]
    pub async fn normalize(&self, element: WeatherElement) -> Vec<NormalizedStation> {
        let Some(source) = self.sources.get(&element) else {
            warn!("No source configured for {}", element);
            return Vec::new();
        };

        let catalog = match load_catalog(&self.fetcher, &source.catalog, &source.catalog_keys).await
        {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Failed to load {} catalog from {}: {}", element, source.catalog, e);
                return Vec::new();
            }
        };
        debug!("Loaded {} catalog entries", catalog.len());

        let stations = match &source.layout {
            SourceLayout::Bulk { locator } => match self.fetch_bulk(locator, &source.fields).await {
                Ok(readings) => join_bulk(&catalog, &readings, element, &source.fields, &self.rules),
                Err(e) => {
                    error!("Failed to load {} readings from {}: {}", element, locator, e);
                    Vec::new()
                }
            },
            SourceLayout::CurrentReport { locator } => {
                match self.fetcher.fetch_json::<CurrentWeather>(locator).await {
                    Ok(report) => {
                        // Report places never share the catalogs' casing.
                        let rules = JoinRules {
                            key_match: KeyMatch::CaseInsensitive,
                            ..self.rules.clone()
                        };
                        let readings = current_report_readings(&report, element);
                        join_bulk(&catalog, &readings, element, &source.fields, &rules)
                    }
                    Err(e) => {
                        error!("Failed to load current weather report from {}: {}", locator, e);
                        Vec::new()
                    }
                }
            }
            SourceLayout::PerStation { format } => {
                self.normalize_per_station(&catalog, element, *format, &source.fields)
                    .await
            }
        };

        info!("Loaded {} valid {} stations", stations.len(), element);
        stations
    }

    /// Raw bulk dataset for `element`, for callers that need every record.
    pub async fn fetch_bulk_readings(
        &self,
        element: WeatherElement,
    ) -> Result<Vec<RawReading>, FetchError> {
        match self.sources.get(&element) {
            Some(ElementSource {
                layout: SourceLayout::Bulk { locator },
                fields,
                ..
            }) => self.fetch_bulk(locator, fields).await,
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_bulk(&self, locator: &str, fields: &FieldMap) -> Result<Vec<RawReading>, FetchError> {
        let text = self.fetcher.fetch_text(locator).await?;
        parse_bulk(&text, fields)
    }

    async fn normalize_per_station(
        &self,
        catalog: &[StationCatalogEntry],
        element: WeatherElement,
        format: PerStationFormat,
        fields: &FieldMap,
    ) -> Vec<NormalizedStation> {
        // Futures must own their inputs to stay Send under tokio::spawn.
        let results: Vec<Option<NormalizedStation>> = stream::iter(catalog.to_vec())
            .map(|entry| {
                let this = self.clone();
                let fields = fields.clone();
                async move {
                    let DataSourceRef::Url(url) = &entry.source else {
                        debug!("Station {} has no per-station source", entry.id);
                        return None;
                    };

                    match this.fetch_station(url, &entry.id, element, format, &fields).await {
                        Ok(reading) => {
                            normalize_entry(&entry, vec![reading], element, &fields, &this.rules)
                        }
                        Err(e) => {
                            warn!("Dropping station {} ({}): {}", entry.id, url, e);
                            None
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    async fn fetch_station(
        &self,
        url: &str,
        station_key: &str,
        element: WeatherElement,
        format: PerStationFormat,
        fields: &FieldMap,
    ) -> Result<RawReading, FetchError> {
        let text = self.fetcher.fetch_text(url).await?;
        match format {
            PerStationFormat::Csv => parse_csv_reading(&text, station_key, element, fields),
            PerStationFormat::Json => parse_json_reading(&text, station_key, element, fields),
        }
    }
}
