use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;

/// Where a resource locator points once resolved against the fetcher's base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    Http(String),
    File(PathBuf),
}

impl std::fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceLocation::Http(url) => write!(f, "{url}"),
            ResourceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads catalogs and reading documents over HTTP or from the local filesystem.
///
/// Relative locators (such as the `Data_url` values shipped inside station
/// catalogs) are resolved against `base`, which may itself be a URL or a
/// directory.
#[derive(Clone)]
pub struct ResourceFetcher {
    client: reqwest::Client,
    base: Option<String>,
}

fn is_http(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

impl ResourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base: None,
        })
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn resolve(&self, locator: &str) -> ResourceLocation {
        if is_http(locator) {
            return ResourceLocation::Http(locator.to_string());
        }

        match &self.base {
            Some(base) if is_http(base) => {
                let relative = locator.trim_start_matches("./").trim_start_matches('/');
                ResourceLocation::Http(format!("{}/{}", base.trim_end_matches('/'), relative))
            }
            Some(base) => ResourceLocation::File(PathBuf::from(base).join(locator)),
            None => ResourceLocation::File(PathBuf::from(locator)),
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_text(&self, locator: &str) -> Result<String, FetchError> {
        match self.resolve(locator) {
            ResourceLocation::Http(url) => {
                debug!("Sending HTTP request");
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                debug!("Received HTTP response with status: {}", status);

                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                        url,
                    });
                }

                let text = response.text().await?;
                debug!("Retrieved content, size: {} bytes", text.len());
                Ok(text)
            }
            ResourceLocation::File(path) => {
                debug!("Reading local resource {}", path.display());
                let text = tokio::fs::read_to_string(&path).await?;
                debug!("Read content, size: {} bytes", text.len());
                Ok(text)
            }
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, locator: &str) -> Result<T, FetchError> {
        let text = self.fetch_text(locator).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> ResourceFetcher {
        ResourceFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_resolve_absolute_url_ignores_base() {
        let f = fetcher().with_base("Data");
        assert_eq!(
            f.resolve("https://example.com/a.json"),
            ResourceLocation::Http("https://example.com/a.json".to_string())
        );
    }

    #[test]
    fn test_resolve_relative_against_url_base() {
        let f = fetcher().with_base("http://localhost:8080/weather/");
        assert_eq!(
            f.resolve("./Data/Rainfall_data/Rainfall_0.json"),
            ResourceLocation::Http(
                "http://localhost:8080/weather/Data/Rainfall_data/Rainfall_0.json".to_string()
            )
        );
    }

    #[test]
    fn test_resolve_relative_against_directory() {
        let f = fetcher().with_base("/srv/dashboard");
        assert_eq!(
            f.resolve("data/Temperature_0.csv"),
            ResourceLocation::File(PathBuf::from("/srv/dashboard/data/Temperature_0.csv"))
        );
    }

    #[test]
    fn test_resolve_without_base_is_local_path() {
        assert_eq!(
            fetcher().resolve("Data/latest_wind.geojson"),
            ResourceLocation::File(PathBuf::from("Data/latest_wind.geojson"))
        );
    }
}
