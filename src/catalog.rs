use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::element::WeatherElement;
use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;
use crate::models::{DataSourceRef, GeoPoint, StationCatalogEntry};

/// Property names used to read identity and source locators out of catalog features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogKeys {
    pub id_property: String,
    pub name_property: String,
    pub source_property: String,
}

impl CatalogKeys {
    /// Station catalogs key rainfall by the gauge ID and everything else by English name.
    pub fn for_element(element: WeatherElement) -> Self {
        let id_property = match element {
            WeatherElement::Rainfall => "automaticWeatherStationID",
            _ => "AutomaticWeatherStation_en",
        };
        Self {
            id_property: id_property.to_string(),
            name_property: "AutomaticWeatherStation_en".to_string(),
            source_property: "Data_url".to_string(),
        }
    }

    /// District boundary catalogs (18 districts) carry the English name in `ENAME`.
    pub fn districts() -> Self {
        Self {
            id_property: "ENAME".to_string(),
            name_property: "ENAME".to_string(),
            source_property: "Data_url".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

fn property_text(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lon_lat(value: &Value) -> Option<(f64, f64)> {
    let pair = value.as_array()?;
    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
}

// Polygons are labelled at the mean of their outer ring.
fn ring_center(ring: &Value) -> Option<GeoPoint> {
    let points: Vec<(f64, f64)> = ring.as_array()?.iter().filter_map(lon_lat).collect();
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lon_sum, lat_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lon, lat), (x, y)| (lon + x, lat + y));
    Some(GeoPoint {
        latitude: lat_sum / n,
        longitude: lon_sum / n,
    })
}

fn geometry_position(geometry: &Geometry) -> Option<GeoPoint> {
    match geometry.kind.as_str() {
        "Point" => {
            let (longitude, latitude) = lon_lat(&geometry.coordinates)?;
            Some(GeoPoint {
                latitude,
                longitude,
            })
        }
        "Polygon" => ring_center(geometry.coordinates.get(0)?),
        "MultiPolygon" => ring_center(geometry.coordinates.get(0)?.get(0)?),
        _ => None,
    }
}

/// Parse a GeoJSON FeatureCollection into catalog entries
///
/// Features without an id or a usable geometry are skipped. Duplicate ids keep
/// the first occurrence.
#[instrument(skip(text, keys), fields(text_size = text.len(), id_property = %keys.id_property))]
pub fn parse_catalog(text: &str, keys: &CatalogKeys) -> Result<Vec<StationCatalogEntry>, FetchError> {
    let collection: FeatureCollection = serde_json::from_str(text)
        .map_err(|e| FetchError::InvalidCatalog(e.to_string()))?;

    let mut entries = Vec::with_capacity(collection.features.len());
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for feature in collection.features {
        let Some(id) = property_text(&feature.properties, &keys.id_property) else {
            skipped += 1;
            continue;
        };

        let Some(position) = feature.geometry.as_ref().and_then(geometry_position) else {
            debug!("Station {} has no usable geometry, skipping", id);
            skipped += 1;
            continue;
        };

        if !seen.insert(id.clone()) {
            warn!("Duplicate station id '{}' in catalog, keeping first", id);
            continue;
        }

        let name = property_text(&feature.properties, &keys.name_property)
            .unwrap_or_else(|| id.clone());

        let source = match property_text(&feature.properties, &keys.source_property) {
            Some(url) => DataSourceRef::Url(url),
            None => DataSourceRef::BulkKey(id.clone()),
        };

        entries.push(StationCatalogEntry {
            id,
            name,
            position,
            source,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} catalog features without id or geometry", skipped);
    }
    debug!("Parsed {} catalog entries", entries.len());

    Ok(entries)
}

pub async fn load_catalog(
    fetcher: &ResourceFetcher,
    locator: &str,
    keys: &CatalogKeys,
) -> Result<Vec<StationCatalogEntry>, FetchError> {
    let text = fetcher.fetch_text(locator).await?;
    parse_catalog(&text, keys)
}
