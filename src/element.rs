use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The weather variable currently plotted on the station layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherElement {
    Temperature,
    Humidity,
    Rainfall,
    Wind,
}

impl WeatherElement {
    pub const ALL: [WeatherElement; 4] = [
        WeatherElement::Temperature,
        WeatherElement::Humidity,
        WeatherElement::Rainfall,
        WeatherElement::Wind,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherElement::Temperature => "temperature",
            WeatherElement::Humidity => "humidity",
            WeatherElement::Rainfall => "rainfall",
            WeatherElement::Wind => "wind",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WeatherElement::Temperature => "Temperature",
            WeatherElement::Humidity => "Relative Humidity",
            WeatherElement::Rainfall => "Rainfall",
            WeatherElement::Wind => "Wind",
        }
    }

    /// Unit suffix used on scalar labels; wind is drawn as a barb and has none.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            WeatherElement::Temperature => Some("°C"),
            WeatherElement::Humidity => Some("%"),
            WeatherElement::Rainfall => Some("mm"),
            WeatherElement::Wind => None,
        }
    }

    pub fn is_wind(&self) -> bool {
        matches!(self, WeatherElement::Wind)
    }
}

impl fmt::Display for WeatherElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weather element '{0}' (expected temperature, humidity, rainfall or wind)")]
pub struct UnknownElement(pub String);

impl FromStr for WeatherElement {
    type Err = UnknownElement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(WeatherElement::Temperature),
            "humidity" | "rh" => Ok(WeatherElement::Humidity),
            "rainfall" | "rain" => Ok(WeatherElement::Rainfall),
            "wind" => Ok(WeatherElement::Wind),
            _ => Err(UnknownElement(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Wind".parse::<WeatherElement>(), Ok(WeatherElement::Wind));
        assert_eq!(
            " HUMIDITY ".parse::<WeatherElement>(),
            Ok(WeatherElement::Humidity)
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "pressure".parse::<WeatherElement>().unwrap_err();
        assert!(err.to_string().contains("pressure"));
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for element in WeatherElement::ALL {
            assert_eq!(element.to_string().parse::<WeatherElement>(), Ok(element));
        }
    }

    #[test]
    fn test_units() {
        assert_eq!(WeatherElement::Temperature.unit(), Some("°C"));
        assert_eq!(WeatherElement::Wind.unit(), None);
    }
}
