use serde::Serialize;

use crate::element::WeatherElement;
use crate::models::{NormalizedStation, StationReading};
use crate::wind::WindDirection;

/// What a map layer should draw for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerSpec {
    Label { text: String },
    WindBarb { degrees: f64, speed_knots: f64 },
    Text { text: &'static str },
}

/// Rendering seam between normalized stations and a map library.
pub trait MarkerRenderer {
    fn render(&self, station: &NormalizedStation) -> MarkerSpec;
}

/// Plain label renderer used by the command line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

fn format_value(value: f64) -> String {
    // 18.0 prints as "18", 18.25 as "18.25"
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

impl MarkerRenderer for TextRenderer {
    fn render(&self, station: &NormalizedStation) -> MarkerSpec {
        match &station.reading {
            StationReading::Scalar { value } => {
                let text = match station.element {
                    WeatherElement::Rainfall => format!("{} mm", format_value(*value)),
                    element => format!("{}{}", format_value(*value), element.unit().unwrap_or("")),
                };
                MarkerSpec::Label { text }
            }
            StationReading::Wind(wind) => match (wind.direction, wind.degrees) {
                (WindDirection::Variable, _) | (_, None) => MarkerSpec::Text { text: "VRB" },
                (_, Some(degrees)) => MarkerSpec::WindBarb {
                    degrees,
                    speed_knots: wind.speed_knots,
                },
            },
        }
    }
}

impl std::fmt::Display for MarkerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerSpec::Label { text } => f.write_str(text),
            MarkerSpec::WindBarb {
                degrees,
                speed_knots,
            } => write!(f, "{degrees:.0}° @ {speed_knots:.1} kt"),
            MarkerSpec::Text { text } => f.write_str(text),
        }
    }
}
