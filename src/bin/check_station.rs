use clap::Parser;

use hk_weather_map::config::Config;
use hk_weather_map::element::WeatherElement;
use hk_weather_map::normalizer::KeyMatch;
use hk_weather_map::render::{MarkerRenderer, TextRenderer};

#[derive(Parser)]
#[command(name = "check-station")]
#[command(about = "Show one station's normalized reading and history", long_about = None)]
struct Cli {
    /// temperature, humidity, rainfall or wind
    element: WeatherElement,

    /// Station id or name
    station: String,

    /// Print the normalized station as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let normalizer = config.build_normalizer(config.build_fetcher()?);

    println!("Checking {} station {}...\n", cli.element, cli.station);

    let stations = normalizer.normalize(cli.element).await;
    let Some(station) = stations.iter().find(|s| {
        KeyMatch::CaseInsensitive.matches(&s.id, &cli.station)
            || KeyMatch::CaseInsensitive.matches(&s.name, &cli.station)
    }) else {
        println!(
            "Station {} not found among {} valid {} stations",
            cli.station,
            stations.len(),
            cli.element
        );
        println!("Known stations:");
        for s in &stations {
            println!("  {}", s.id);
        }
        return Ok(());
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(station)?);
        return Ok(());
    }

    println!("Station: {} ({})", station.name, station.id);
    println!(
        "Position: {:.4}, {:.4}",
        station.position.latitude, station.position.longitude
    );
    println!("Marker: {}", TextRenderer.render(station));
    if let Some(wind) = station.reading.wind() {
        println!(
            "Wind: {} {:.1} km/h ({:.1} kt, {:.1} m/s), gust {}",
            wind.direction,
            wind.speed_kmh,
            wind.speed_knots,
            wind.speed_ms,
            wind.gust_kmh
                .map(|g| format!("{g:.1} km/h"))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }
    match station.observed_at {
        Some(t) => println!("Observed: {}", t),
        None => println!("Observed: unknown"),
    }

    println!("\nHistory ({} readings):", station.history.len());
    for reading in &station.history {
        let time = reading
            .observed_at
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let fields: Vec<String> = reading
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("  {}: {}", time, fields.join(", "));
    }

    Ok(())
}
