use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hk_weather_map::app::Application;
use hk_weather_map::config::Config;
use hk_weather_map::dashboard::{warning_banner, DashboardState};
use hk_weather_map::element::WeatherElement;
use hk_weather_map::hko::forecast::format_forecast_date;
use hk_weather_map::hko::warnings::active_warnings;
use hk_weather_map::models::NormalizedStation;
use hk_weather_map::render::{MarkerRenderer, TextRenderer};
use hk_weather_map::scheduler;

#[derive(Parser)]
#[command(name = "hk-weather-map")]
#[command(about = "Hong Kong weather station map data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize one element's stations and print their markers
    Stations {
        /// temperature, humidity, rainfall or wind
        element: WeatherElement,

        #[arg(long)]
        json: bool,
    },
    /// Print the multi-day forecast strip
    Forecast {
        /// Number of days to show
        #[arg(long, default_value = "9")]
        days: usize,

        #[arg(long)]
        json: bool,
    },
    /// Print the warning banner and active warning signals
    Warnings {
        #[arg(long)]
        json: bool,
    },
    /// Full dashboard snapshot
    Dashboard {
        #[arg(long, default_value = "temperature")]
        element: WeatherElement,

        /// Keep refreshing until Ctrl-C
        #[arg(long)]
        watch: bool,

        #[arg(long)]
        json: bool,
    },
}

fn print_stations(stations: &[NormalizedStation]) {
    let renderer = TextRenderer;
    for station in stations {
        let time = station
            .observed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<28} {:>9.4} {:>8.4}  {:<16} {}",
            station.name,
            station.position.latitude,
            station.position.longitude,
            renderer.render(station),
            time
        );
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hk_weather_map=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments and load configuration
    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Starting hk-weather-map with config: {:?}", config);

    // Create shared fetcher, normalizer and HKO client
    let fetcher = config.build_fetcher()?;
    let normalizer = config.build_normalizer(fetcher.clone());
    let hko = config.build_hko_client(fetcher);

    match cli.command {
        Command::Stations { element, json } => {
            let stations = normalizer.normalize(element).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&stations)?);
            } else {
                println!("{} ({} stations)", element.display_name(), stations.len());
                print_stations(&stations);
            }
        }
        Command::Forecast { days, json } => {
            let forecast: Vec<_> = hko.fetch_forecast().await.into_iter().take(days).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else if forecast.is_empty() {
                println!("Forecast unavailable");
            } else {
                for day in &forecast {
                    let temp = match (day.min_temp_c, day.max_temp_c) {
                        (Some(min), Some(max)) => format!("{min}-{max}°C"),
                        _ => "--".to_string(),
                    };
                    println!(
                        "  {:<12} {:>9}  {}",
                        format_forecast_date(day.date),
                        temp,
                        day.icon_url()
                    );
                }
            }
        }
        Command::Warnings { json } => {
            let (current, warnings) =
                tokio::join!(hko.fetch_current_weather(), hko.fetch_warnings());
            let banner = warning_banner(current.as_ref());
            let active = active_warnings(&warnings);
            if json {
                let body = json!({ "banner": banner, "warnings": active });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", banner.message);
                for warning in active {
                    println!(
                        "  {:<8} {:<40} {}",
                        warning.code,
                        warning.name,
                        warning.icon_url.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Command::Dashboard {
            element,
            watch: true,
            ..
        } => {
            // Run the refresh loops until interrupted
            let app = Application::build(&config, element)?;
            info!("Watching {}; press Ctrl-C to stop", element);
            tokio::signal::ctrl_c().await?;
            app.shutdown();
        }
        Command::Dashboard { element, json, .. } => {
            // One-shot snapshot: run each refresh once, side by side
            let state = DashboardState::new(element);
            let (_, _, _, forecast) = tokio::join!(
                scheduler::refresh_stations(&normalizer, &state),
                scheduler::refresh_weather_box(&hko, &normalizer, &state),
                scheduler::refresh_warnings(&hko, &state),
                hko.fetch_forecast(),
            );
            let (_, stations) = state.stations();
            let warnings = state.warnings();
            let active = active_warnings(&warnings);

            if json {
                let body = json!({
                    "element": element,
                    "updated": state.updated_label(),
                    "banner": state.banner(),
                    "summary": state.summary(),
                    "stations": stations,
                    "warnings": active,
                    "forecast": forecast,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", state.updated_label());
                println!("{}", state.banner().message);
                for warning in active {
                    println!("  [{}] {}", warning.code, warning.name);
                }
                println!("\n{} ({} stations)", element.display_name(), stations.len());
                print_stations(&stations);
                println!();
                for day in forecast.iter().take(9) {
                    println!("  {}", format_forecast_date(day.date));
                }
            }
        }
    }

    Ok(())
}
