use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::element::WeatherElement;
use crate::wind::WindDirection;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// How a catalog entry's readings are located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DataSourceRef {
    /// Per-station document (CSV or JSON), resolved by the resource fetcher.
    Url(String),
    /// Key into a bulk dataset.
    BulkKey(String),
}

// Static identity of one station in an element's catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCatalogEntry {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
    pub source: DataSourceRef,
}

/// One observation for a station; `fields` holds upstream columns as raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReading {
    pub station_key: String,
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub fields: BTreeMap<String, String>,
}

impl RawReading {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindReading {
    pub direction: WindDirection,
    pub degrees: Option<f64>,
    pub speed_kmh: f64,
    pub speed_knots: f64,
    pub speed_ms: f64,
    pub gust_kmh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StationReading {
    Scalar { value: f64 },
    Wind(WindReading),
}

impl StationReading {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            StationReading::Scalar { value } => Some(*value),
            StationReading::Wind(_) => None,
        }
    }

    pub fn wind(&self) -> Option<&WindReading> {
        match self {
            StationReading::Wind(wind) => Some(wind),
            StationReading::Scalar { .. } => None,
        }
    }
}

/// A catalog entry joined with its latest usable reading, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedStation {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
    pub element: WeatherElement,
    pub reading: StationReading,
    pub observed_at: Option<DateTime<FixedOffset>>,
    /// Ascending by `observed_at`; the latest reading is last.
    pub history: Vec<RawReading>,
}
