// Reading sources
//
// Upstream readings come in three shapes:
// - bulk observation arrays covering every station of an element
// - per-station CSV or JSON documents referenced from the catalog
// - the HKO current weather report (rhrread)

pub mod bulk;
pub mod current_report;
pub mod per_station;

use serde_json::Value;

use crate::element::WeatherElement;

pub use bulk::parse_bulk;
pub use current_report::current_report_readings;
pub use per_station::{parse_csv_reading, parse_json_reading};

/// Upstream column names for one element and source shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    /// Bulk datasets only: the field carrying the station key.
    pub station: String,
    pub time: String,
    pub value: String,
    pub wind_direction: String,
    pub wind_speed: String,
    pub wind_gust: String,
}

impl FieldMap {
    /// Field names of the bulk observation JSON arrays.
    pub fn bulk(element: WeatherElement) -> Self {
        let value = match element {
            WeatherElement::Temperature => "temperature",
            WeatherElement::Humidity => "rel_humidity_pct",
            WeatherElement::Rainfall => "rainfall_mm",
            WeatherElement::Wind => "wind_speed_kmh",
        };
        Self {
            station: "station".to_string(),
            time: "observation_time_hk".to_string(),
            value: value.to_string(),
            wind_direction: "wind_dir".to_string(),
            wind_speed: "wind_speed_kmh".to_string(),
            wind_gust: "wind_gust_kmh".to_string(),
        }
    }

    /// Per-station JSON documents use the bulk field names.
    pub fn json(element: WeatherElement) -> Self {
        Self::bulk(element)
    }

    /// Column headers of the HKO latest-readings CSV exports.
    pub fn csv(element: WeatherElement) -> Self {
        let value = match element {
            WeatherElement::Temperature => "Air Temperature(degree Celsius)",
            WeatherElement::Humidity => "Relative Humidity(percent)",
            WeatherElement::Rainfall => "Rainfall(mm)",
            WeatherElement::Wind => "10-Minute Mean Speed(km/hour)",
        };
        Self {
            station: "Automatic Weather Station".to_string(),
            time: "Date time".to_string(),
            value: value.to_string(),
            wind_direction: "10-Minute Mean Wind Direction(Compass points)".to_string(),
            wind_speed: "10-Minute Mean Speed(km/hour)".to_string(),
            wind_gust: "10-Minute Maximum Gust(km/hour)".to_string(),
        }
    }

    /// Readings synthesized from the current weather report.
    pub fn current_report() -> Self {
        Self {
            station: current_report::PLACE_FIELD.to_string(),
            time: current_report::TIME_FIELD.to_string(),
            value: current_report::VALUE_FIELD.to_string(),
            wind_direction: String::new(),
            wind_speed: String::new(),
            wind_gust: String::new(),
        }
    }

    /// Columns a document must carry for the element to be derivable.
    pub fn required(&self, element: WeatherElement) -> Vec<&str> {
        if element.is_wind() {
            vec![self.wind_direction.as_str(), self.wind_speed.as_str()]
        } else {
            vec![self.value.as_str()]
        }
    }
}

/// Text form of a scalar JSON value; objects, arrays and nulls have none.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_for_wind() {
        let fields = FieldMap::bulk(WeatherElement::Wind);
        assert_eq!(fields.required(WeatherElement::Wind), vec!["wind_dir", "wind_speed_kmh"]);
    }

    #[test]
    fn test_required_fields_for_scalar() {
        let fields = FieldMap::csv(WeatherElement::Humidity);
        assert_eq!(
            fields.required(WeatherElement::Humidity),
            vec!["Relative Humidity(percent)"]
        );
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&serde_json::json!(23.5)), Some("23.5".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(" 12 ")), Some("12".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(null)), None);
    }
}
