use std::collections::BTreeMap;

use tracing::{debug, error, info, instrument};

use super::current::CurrentWeather;
use super::forecast::{ForecastDay, ForecastResponse};
use super::warnings::{into_warnings, WarningEntry, WarningsByCode};
use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;

#[derive(Clone)]
pub struct HkoClient {
    fetcher: ResourceFetcher,
    api_url: String,
}

impl HkoClient {
    pub fn new(fetcher: ResourceFetcher, api_url: String) -> Self {
        Self { fetcher, api_url }
    }

    fn dataset_url(&self, data_type: &str) -> String {
        format!("{}?dataType={}&lang=en", self.api_url, data_type)
    }

    pub fn current_weather_url(&self) -> String {
        self.dataset_url("rhrread")
    }

    #[instrument(skip(self))]
    pub async fn try_fetch_current_weather(&self) -> Result<CurrentWeather, FetchError> {
        self.fetcher.fetch_json(&self.current_weather_url()).await
    }

    #[instrument(skip(self))]
    pub async fn try_fetch_forecast(&self) -> Result<Vec<ForecastDay>, FetchError> {
        let response: ForecastResponse = self.fetcher.fetch_json(&self.dataset_url("fnd")).await?;
        Ok(response.into_days())
    }

    #[instrument(skip(self))]
    pub async fn try_fetch_warnings(&self) -> Result<WarningsByCode, FetchError> {
        let raw: BTreeMap<String, WarningEntry> =
            self.fetcher.fetch_json(&self.dataset_url("warnsum")).await?;
        Ok(into_warnings(raw))
    }

    /// Current weather report, or `None` when it could not be fetched.
    pub async fn fetch_current_weather(&self) -> Option<CurrentWeather> {
        match self.try_fetch_current_weather().await {
            Ok(current) => {
                debug!("Fetched current weather report");
                Some(current)
            }
            Err(e) => {
                error!("Failed to fetch current weather report: {}", e);
                None
            }
        }
    }

    pub async fn fetch_forecast(&self) -> Vec<ForecastDay> {
        match self.try_fetch_forecast().await {
            Ok(days) => {
                info!("Fetched {} forecast days", days.len());
                days
            }
            Err(e) => {
                error!("Failed to fetch weather forecast: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_warnings(&self) -> WarningsByCode {
        match self.try_fetch_warnings().await {
            Ok(warnings) => {
                info!("Fetched {} warning statements", warnings.len());
                warnings
            }
            Err(e) => {
                error!("Failed to fetch warning summary: {}", e);
                WarningsByCode::new()
            }
        }
    }
}
