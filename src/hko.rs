// Hong Kong Observatory open data API
//
// Current weather report (rhrread), 9-day forecast (fnd) and warning summary
// (warnsum). Each fetch degrades to an empty value on failure.

pub mod client;
pub mod current;
pub mod forecast;
pub mod warnings;

pub use client::HkoClient;
pub use current::CurrentWeather;
pub use forecast::ForecastDay;
pub use warnings::{WarningInfo, WarningsByCode};

pub const DEFAULT_API_URL: &str = "https://data.weather.gov.hk/weatherAPI/opendata/weather.php";
