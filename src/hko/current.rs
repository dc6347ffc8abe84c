use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// HKO current weather report (`dataType=rhrread`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    #[serde(default)]
    pub icon: Vec<u32>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub warning_message: Vec<String>,
    #[serde(default)]
    pub temperature: Option<PlaceTable>,
    #[serde(default)]
    pub humidity: Option<PlaceTable>,
    #[serde(default)]
    pub rainfall: Option<RainfallTable>,
    #[serde(default)]
    pub update_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceTable {
    #[serde(default)]
    pub data: Vec<PlaceValue>,
    #[serde(default)]
    pub record_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceValue {
    pub place: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallTable {
    #[serde(default)]
    pub data: Vec<DistrictRainfall>,
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistrictRainfall {
    pub place: String,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

// warningMessage is "" when nothing is in force and a list of lines otherwise.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let lines = match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    Ok(lines
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

impl CurrentWeather {
    pub fn weather_icon(&self) -> Option<u32> {
        self.icon.first().copied()
    }

    pub fn has_warning(&self) -> bool {
        !self.warning_message.is_empty()
    }

    pub fn temperature_record_time(&self) -> Option<DateTime<FixedOffset>> {
        self.temperature.as_ref().and_then(|t| t.record_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "rainfall": {
            "data": [
                {"unit": "mm", "place": "Central & Western District", "max": 0, "main": "FALSE"},
                {"unit": "mm", "place": "Wan Chai", "main": "FALSE"}
            ],
            "startTime": "2026-01-19T13:45:00+08:00",
            "endTime": "2026-01-19T14:45:00+08:00"
        },
        "icon": [51],
        "uvindex": "",
        "updateTime": "2026-01-19T15:02:00+08:00",
        "warningMessage": "",
        "temperature": {
            "data": [{"place": "King's Park", "value": 18, "unit": "C"}],
            "recordTime": "2026-01-19T15:00:00+08:00"
        },
        "humidity": {
            "recordTime": "2026-01-19T15:00:00+08:00",
            "data": [{"unit": "percent", "value": 71, "place": "Hong Kong Observatory"}]
        }
    }"#;

    #[test]
    fn test_deserialize_rhrread() {
        let current: CurrentWeather = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(current.weather_icon(), Some(51));
        assert!(!current.has_warning());
        assert!(current.temperature_record_time().is_some());

        let rainfall = current.rainfall.unwrap();
        assert_eq!(rainfall.data[0].max, Some(0.0));
        assert_eq!(rainfall.data[1].max, None);
    }

    #[test]
    fn test_warning_message_list() {
        let current: CurrentWeather = serde_json::from_str(
            r#"{"warningMessage": ["The Cold Weather Warning is in force.", " "]}"#,
        )
        .unwrap();
        assert!(current.has_warning());
        assert_eq!(current.warning_message.len(), 1);
    }
}
