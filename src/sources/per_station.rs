use std::collections::BTreeMap;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{scalar_text, FieldMap};
use crate::element::WeatherElement;
use crate::fetch_error::FetchError;
use crate::models::RawReading;
use crate::utils::parse_observation_time;

fn ensure_required(
    present: impl Fn(&str) -> bool,
    fields: &FieldMap,
    element: WeatherElement,
) -> Result<(), FetchError> {
    for name in fields.required(element) {
        if !present(name) {
            return Err(FetchError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

fn into_reading(station_key: &str, row: BTreeMap<String, String>, fields: &FieldMap) -> RawReading {
    let observed_at = row
        .get(&fields.time)
        .and_then(|t| parse_observation_time(t));
    RawReading {
        station_key: station_key.to_string(),
        observed_at,
        fields: row,
    }
}

/// Parse a per-station CSV document: a header row followed by the latest data row.
#[instrument(skip(text, fields), fields(text_size = text.len()))]
pub fn parse_csv_reading(
    text: &str,
    station_key: &str,
    element: WeatherElement,
    fields: &FieldMap,
) -> Result<RawReading, FetchError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    ensure_required(|name| headers.iter().any(|h| h == name), fields, element)?;

    let record = rdr.records().next().ok_or(FetchError::EmptyDocument)??;

    let row: BTreeMap<String, String> = headers
        .iter()
        .zip(record.iter())
        .map(|(h, v)| (h.to_string(), v.to_string()))
        .collect();

    debug!("Parsed CSV row with {} columns", row.len());
    Ok(into_reading(station_key, row, fields))
}

/// Parse a per-station JSON document: one object, or an array whose first element is used.
#[instrument(skip(text, fields), fields(text_size = text.len()))]
pub fn parse_json_reading(
    text: &str,
    station_key: &str,
    element: WeatherElement,
    fields: &FieldMap,
) -> Result<RawReading, FetchError> {
    let document: Value = serde_json::from_str(text)?;

    let object = match &document {
        Value::Object(map) => map,
        Value::Array(items) => items
            .first()
            .and_then(Value::as_object)
            .ok_or(FetchError::EmptyDocument)?,
        _ => return Err(FetchError::EmptyDocument),
    };

    ensure_required(|name| object.contains_key(name), fields, element)?;

    let row: BTreeMap<String, String> = object
        .iter()
        .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
        .collect();

    debug!("Parsed JSON object with {} scalar fields", row.len());
    Ok(into_reading(station_key, row, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temperature_csv() {
        let text = "\u{feff}Date time,Automatic Weather Station,Air Temperature(degree Celsius)\n\
                    202601191450,King's Park, 18.6\n";
        let fields = FieldMap::csv(WeatherElement::Temperature);
        let reading =
            parse_csv_reading(text, "King's Park", WeatherElement::Temperature, &fields).unwrap();

        assert_eq!(reading.station_key, "King's Park");
        assert_eq!(reading.field("Air Temperature(degree Celsius)"), Some("18.6"));
        assert!(reading.observed_at.is_some());
    }

    #[test]
    fn test_parse_wind_csv() {
        let text = "Date time,Automatic Weather Station,10-Minute Mean Wind Direction(Compass points),10-Minute Mean Speed(km/hour),10-Minute Maximum Gust(km/hour)\n\
                    202601191450,Central Pier,East,18,29\n";
        let fields = FieldMap::csv(WeatherElement::Wind);
        let reading = parse_csv_reading(text, "Central Pier", WeatherElement::Wind, &fields).unwrap();
        assert_eq!(
            reading.field("10-Minute Mean Wind Direction(Compass points)"),
            Some("East")
        );
        assert_eq!(reading.field("10-Minute Maximum Gust(km/hour)"), Some("29"));
    }

    #[test]
    fn test_csv_missing_header() {
        let text = "Date time,Automatic Weather Station,Temp\n202601191450,King's Park,18.6\n";
        let fields = FieldMap::csv(WeatherElement::Temperature);
        let result = parse_csv_reading(text, "King's Park", WeatherElement::Temperature, &fields);
        assert!(matches!(result, Err(FetchError::MissingColumn(c)) if c == "Air Temperature(degree Celsius)"));
    }

    #[test]
    fn test_csv_header_only() {
        let text = "Date time,Automatic Weather Station,Air Temperature(degree Celsius)\n";
        let fields = FieldMap::csv(WeatherElement::Temperature);
        let result = parse_csv_reading(text, "King's Park", WeatherElement::Temperature, &fields);
        assert!(matches!(result, Err(FetchError::EmptyDocument)));
    }

    #[test]
    fn test_parse_json_object() {
        let text = r#"{"station": "SHA", "observation_time_hk": "2026-01-19 14:45", "rainfall_mm": 2.5}"#;
        let fields = FieldMap::json(WeatherElement::Rainfall);
        let reading = parse_json_reading(text, "SHA", WeatherElement::Rainfall, &fields).unwrap();
        assert_eq!(reading.field("rainfall_mm"), Some("2.5"));
        assert!(reading.observed_at.is_some());
    }

    #[test]
    fn test_parse_json_array_uses_first() {
        let text = r#"[{"rainfall_mm": "0"}, {"rainfall_mm": "9"}]"#;
        let fields = FieldMap::json(WeatherElement::Rainfall);
        let reading = parse_json_reading(text, "SHA", WeatherElement::Rainfall, &fields).unwrap();
        assert_eq!(reading.field("rainfall_mm"), Some("0"));
        assert!(reading.observed_at.is_none());
    }

    #[test]
    fn test_parse_json_missing_field() {
        let text = r#"{"wind_dir": "North"}"#;
        let fields = FieldMap::json(WeatherElement::Wind);
        let result = parse_json_reading(text, "X", WeatherElement::Wind, &fields);
        assert!(matches!(result, Err(FetchError::MissingColumn(c)) if c == "wind_speed_kmh"));
    }

    #[test]
    fn test_parse_json_empty_array() {
        let fields = FieldMap::json(WeatherElement::Rainfall);
        let result = parse_json_reading("[]", "X", WeatherElement::Rainfall, &fields);
        assert!(matches!(result, Err(FetchError::EmptyDocument)));
    }
}
