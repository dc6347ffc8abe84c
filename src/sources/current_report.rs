use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::element::WeatherElement;
use crate::hko::current::{CurrentWeather, PlaceTable};
use crate::models::RawReading;

pub const PLACE_FIELD: &str = "place";
pub const TIME_FIELD: &str = "recordTime";
pub const VALUE_FIELD: &str = "value";

const DISTRICT_SUFFIX: &str = " District";

/// District rainfall places read "Sai Kung District" while boundary catalogs say "SAI KUNG".
pub fn district_key(place: &str) -> &str {
    let trimmed = place.trim();
    trimmed.strip_suffix(DISTRICT_SUFFIX).unwrap_or(trimmed)
}

fn reading(
    place: &str,
    observed_at: Option<DateTime<FixedOffset>>,
    value: Option<f64>,
) -> RawReading {
    let mut fields = BTreeMap::new();
    fields.insert(PLACE_FIELD.to_string(), place.to_string());
    if let Some(t) = observed_at {
        fields.insert(TIME_FIELD.to_string(), t.to_rfc3339());
    }
    if let Some(v) = value {
        fields.insert(VALUE_FIELD.to_string(), v.to_string());
    }
    RawReading {
        station_key: place.to_string(),
        observed_at,
        fields,
    }
}

fn place_readings(table: Option<&PlaceTable>) -> Vec<RawReading> {
    let Some(table) = table else {
        return Vec::new();
    };
    table
        .data
        .iter()
        .map(|row| reading(row.place.trim(), table.record_time, row.value))
        .collect()
}

/// Readings for `element` carried by the current weather report
///
/// Temperature and humidity are keyed by place; rainfall by district name
/// with the trailing " District" removed, valued by the hourly maximum. The
/// report has no wind table.
pub fn current_report_readings(report: &CurrentWeather, element: WeatherElement) -> Vec<RawReading> {
    match element {
        WeatherElement::Temperature => place_readings(report.temperature.as_ref()),
        WeatherElement::Humidity => place_readings(report.humidity.as_ref()),
        WeatherElement::Rainfall => {
            let Some(table) = report.rainfall.as_ref() else {
                return Vec::new();
            };
            table
                .data
                .iter()
                .map(|row| reading(district_key(&row.place), table.end_time, row.max))
                .collect()
        }
        WeatherElement::Wind => Vec::new(),
    }
}
