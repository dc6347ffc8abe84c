use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::dashboard::DashboardState;
use crate::element::WeatherElement;
use crate::hko::HkoClient;
use crate::normalizer::StationDataNormalizer;
use crate::scheduler;

/// Dashboard with its three refresh loops running in the background
pub struct Application {
    pub state: DashboardState,
    pub station_refresh_handle: JoinHandle<()>,
    pub weather_box_refresh_handle: JoinHandle<()>,
    pub warning_refresh_handle: JoinHandle<()>,
}

impl Application {
    /// Build the shared clients and spawn:
    /// - station refresh (default 10 min)
    /// - weather box refresh (default 60 s)
    /// - warning refresh (default 300 s)
    pub fn build(config: &Config, element: WeatherElement) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing dashboard components");

        let fetcher = config.build_fetcher()?;
        let normalizer = config.build_normalizer(fetcher.clone());
        let hko = config.build_hko_client(fetcher);
        let state = DashboardState::new(element);

        Ok(Self::spawn(config, normalizer, hko, state))
    }

    pub fn spawn(
        config: &Config,
        normalizer: StationDataNormalizer,
        hko: HkoClient,
        state: DashboardState,
    ) -> Self {
        info!("Spawning refresh loops");

        let station_refresh_handle = {
            let normalizer = normalizer.clone();
            let state = state.clone();
            let minutes = config.station_refresh_minutes;

            tokio::spawn(async move {
                scheduler::start_station_refresh(normalizer, state, minutes).await;
            })
        };

        let weather_box_refresh_handle = {
            let hko = hko.clone();
            let state = state.clone();
            let secs = config.weather_box_refresh_secs;

            tokio::spawn(async move {
                scheduler::start_weather_box_refresh(hko, normalizer, state, secs).await;
            })
        };

        let warning_refresh_handle = {
            let state = state.clone();
            let secs = config.warning_refresh_secs;

            tokio::spawn(async move {
                scheduler::start_warning_refresh(hko, state, secs).await;
            })
        };

        Self {
            state,
            station_refresh_handle,
            weather_box_refresh_handle,
            warning_refresh_handle,
        }
    }

    /// Stop all refresh loops; in-flight fetches are dropped with them.
    pub fn shutdown(self) {
        self.station_refresh_handle.abort();
        self.weather_box_refresh_handle.abort();
        self.warning_refresh_handle.abort();
        info!("Refresh loops stopped");
    }
}
