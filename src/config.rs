use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::CatalogKeys;
use crate::element::WeatherElement;
use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;
use crate::hko::{HkoClient, DEFAULT_API_URL};
use crate::normalizer::{
    ElementSource, JoinRules, KeyMatch, PerStationFormat, SourceLayout, StationDataNormalizer,
};
use crate::sources::FieldMap;
use crate::wind::NorthConvention;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: expected {expected}")]
    Invalid {
        var: String,
        value: String,
        expected: &'static str,
    },
}

/// Where readings for one element come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Bulk,
    CurrentReport,
    Csv,
    Json,
}

impl FromStr for LayoutKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Ok(LayoutKind::Bulk),
            "current-report" | "current_report" | "rhrread" => Ok(LayoutKind::CurrentReport),
            "csv" => Ok(LayoutKind::Csv),
            "json" => Ok(LayoutKind::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hko_api_url: String,
    pub catalog_base: String,
    pub catalog_overrides: HashMap<WeatherElement, String>,
    pub observations_base_url: String,
    pub data_base: Option<String>,
    pub layouts: HashMap<WeatherElement, LayoutKind>,
    pub key_match: KeyMatch,
    pub north: NorthConvention,
    pub history_hours: i64,
    pub station_fetch_concurrency: usize,
    pub station_refresh_minutes: u64,
    pub weather_box_refresh_secs: u64,
    pub warning_refresh_secs: u64,
    pub http_timeout_secs: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn element_var(prefix: &str, element: WeatherElement) -> String {
    format!("{}_{}", prefix, element.as_str().to_ascii_uppercase())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut layouts = HashMap::new();
        let mut catalog_overrides = HashMap::new();
        for element in WeatherElement::ALL {
            let layout_var = element_var("SOURCE_LAYOUT", element);
            let layout = match env::var(&layout_var) {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: layout_var.clone(),
                    value: value.clone(),
                    expected: "bulk, current-report, csv or json",
                })?,
                Err(_) => LayoutKind::Bulk,
            };
            layouts.insert(element, layout);

            if let Ok(locator) = env::var(element_var("CATALOG", element)) {
                catalog_overrides.insert(element, locator);
            }
        }

        let key_match = match env::var("KEY_MATCH") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "exact" => KeyMatch::Exact,
                "case-insensitive" | "case_insensitive" => KeyMatch::CaseInsensitive,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "KEY_MATCH".to_string(),
                        value,
                        expected: "exact or case-insensitive",
                    })
                }
            },
            Err(_) => KeyMatch::Exact,
        };

        let north = match env::var("NORTH_DEGREES") {
            Ok(value) => match value.trim() {
                "0" => NorthConvention::Zero,
                "360" => NorthConvention::ThreeSixty,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "NORTH_DEGREES".to_string(),
                        value,
                        expected: "0 or 360",
                    })
                }
            },
            Err(_) => NorthConvention::ThreeSixty,
        };

        Ok(Config {
            hko_api_url: var_or("HKO_API_URL", DEFAULT_API_URL),
            catalog_base: var_or("CATALOG_BASE", "Data"),
            catalog_overrides,
            observations_base_url: var_or("OBSERVATIONS_BASE_URL", "http://35.212.228.195/weather"),
            data_base: env::var("DATA_BASE").ok(),
            layouts,
            key_match,
            north,
            history_hours: parsed_or("HISTORY_HOURS", 12),
            station_fetch_concurrency: parsed_or("STATION_FETCH_CONCURRENCY", 8),
            station_refresh_minutes: parsed_or("STATION_REFRESH_MINUTES", 10),
            weather_box_refresh_secs: parsed_or("WEATHER_BOX_REFRESH_SECS", 60),
            warning_refresh_secs: parsed_or("WARNING_REFRESH_SECS", 300),
            http_timeout_secs: parsed_or("HTTP_TIMEOUT_SECS", 30),
        })
    }

    pub fn current_weather_url(&self) -> String {
        format!("{}?dataType=rhrread&lang=en", self.hko_api_url)
    }

    pub fn catalog_locator(&self, element: WeatherElement) -> String {
        self.catalog_overrides.get(&element).cloned().unwrap_or_else(|| {
            format!(
                "{}/latest_{}.geojson",
                self.catalog_base.trim_end_matches('/'),
                element.as_str()
            )
        })
    }

    pub fn bulk_locator(&self, element: WeatherElement) -> String {
        format!(
            "{}/{}.json",
            self.observations_base_url.trim_end_matches('/'),
            element.as_str()
        )
    }

    pub fn element_source(&self, element: WeatherElement) -> ElementSource {
        let layout = self.layouts.get(&element).copied().unwrap_or(LayoutKind::Bulk);
        let catalog = self.catalog_locator(element);

        match layout {
            LayoutKind::Bulk => ElementSource {
                catalog,
                catalog_keys: CatalogKeys::for_element(element),
                layout: SourceLayout::Bulk {
                    locator: self.bulk_locator(element),
                },
                fields: FieldMap::bulk(element),
            },
            LayoutKind::CurrentReport => ElementSource {
                catalog,
                catalog_keys: match element {
                    WeatherElement::Rainfall => CatalogKeys::districts(),
                    _ => CatalogKeys::for_element(WeatherElement::Temperature),
                },
                layout: SourceLayout::CurrentReport {
                    locator: self.current_weather_url(),
                },
                fields: FieldMap::current_report(),
            },
            LayoutKind::Csv => ElementSource {
                catalog,
                catalog_keys: CatalogKeys::for_element(element),
                layout: SourceLayout::PerStation {
                    format: PerStationFormat::Csv,
                },
                fields: FieldMap::csv(element),
            },
            LayoutKind::Json => ElementSource {
                catalog,
                catalog_keys: CatalogKeys::for_element(element),
                layout: SourceLayout::PerStation {
                    format: PerStationFormat::Json,
                },
                fields: FieldMap::json(element),
            },
        }
    }

    pub fn join_rules(&self) -> JoinRules {
        JoinRules {
            key_match: self.key_match,
            north: self.north,
            history_window: (self.history_hours > 0)
                .then(|| chrono::Duration::hours(self.history_hours)),
        }
    }

    pub fn build_fetcher(&self) -> Result<ResourceFetcher, FetchError> {
        let fetcher = ResourceFetcher::new(Duration::from_secs(self.http_timeout_secs))?;
        Ok(match &self.data_base {
            Some(base) => fetcher.with_base(base.clone()),
            None => fetcher,
        })
    }

    pub fn build_normalizer(&self, fetcher: ResourceFetcher) -> StationDataNormalizer {
        let sources = WeatherElement::ALL
            .into_iter()
            .map(|element| (element, self.element_source(element)))
            .collect();
        StationDataNormalizer::new(
            fetcher,
            sources,
            self.join_rules(),
            self.station_fetch_concurrency,
        )
    }

    pub fn build_hko_client(&self, fetcher: ResourceFetcher) -> HkoClient {
        HkoClient::new(fetcher, self.hko_api_url.clone())
    }
}
