use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub week: String,
    pub icon: u32,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub summary: Option<String>,
    pub wind: Option<String>,
}

impl ForecastDay {
    pub fn icon_url(&self) -> String {
        format!("https://www.hko.gov.hk/images/HKOWxIconOutline/pic{}.png", self.icon)
    }
}

// Wire format of `dataType=fnd`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForecastResponse {
    #[serde(default)]
    pub weather_forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForecastEntry {
    forecast_date: String,
    #[serde(default)]
    week: String,
    #[serde(rename = "ForecastIcon")]
    forecast_icon: u32,
    #[serde(default)]
    forecast_maxtemp: Option<Measure>,
    #[serde(default)]
    forecast_mintemp: Option<Measure>,
    #[serde(default)]
    forecast_weather: Option<String>,
    #[serde(default)]
    forecast_wind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    value: Option<f64>,
}

impl ForecastResponse {
    /// Entries with an unparseable `forecastDate` are dropped.
    pub(crate) fn into_days(self) -> Vec<ForecastDay> {
        self.weather_forecast
            .into_iter()
            .filter_map(|entry| {
                let Ok(date) = NaiveDate::parse_from_str(&entry.forecast_date, "%Y%m%d") else {
                    warn!("Skipping forecast entry with invalid date '{}'", entry.forecast_date);
                    return None;
                };
                Some(ForecastDay {
                    date,
                    week: entry.week,
                    icon: entry.forecast_icon,
                    max_temp_c: entry.forecast_maxtemp.and_then(|m| m.value),
                    min_temp_c: entry.forecast_mintemp.and_then(|m| m.value),
                    summary: entry.forecast_weather,
                    wind: entry.forecast_wind,
                })
            })
            .collect()
    }
}

/// Forecast strip label, e.g. `20/01 (Tue)`.
pub fn format_forecast_date(date: NaiveDate) -> String {
    format!("{:02}/{:02} ({})", date.day(), date.month(), date.format("%a"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_days() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{
                "generalSituation": "A dry northeast monsoon will affect southern China.",
                "weatherForecast": [
                    {
                        "forecastDate": "20260120",
                        "week": "Tuesday",
                        "forecastWind": "North force 4.",
                        "forecastWeather": "Fine and dry.",
                        "forecastMaxtemp": {"value": 22, "unit": "C"},
                        "forecastMintemp": {"value": 16, "unit": "C"},
                        "ForecastIcon": 50
                    },
                    {"forecastDate": "2026-01-21", "week": "Wednesday", "ForecastIcon": 51}
                ]
            }"#,
        )
        .unwrap();

        let days = response.into_days();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
        assert_eq!(days[0].max_temp_c, Some(22.0));
        assert_eq!(days[0].min_temp_c, Some(16.0));
        assert_eq!(days[0].icon_url(), "https://www.hko.gov.hk/images/HKOWxIconOutline/pic50.png");
    }

    #[test]
    fn test_format_forecast_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        assert_eq!(format_forecast_date(date), "20/01 (Tue)");
    }
}
