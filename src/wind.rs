//! Wind direction labels, compass headings and speed conversions.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

pub const KMH_PER_KNOT: f64 = 1.852;
pub const MS_PER_KMH: f64 = 0.277778;

pub fn kmh_to_knots(kmh: f64) -> f64 {
    kmh / KMH_PER_KNOT
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh * MS_PER_KMH
}

/// Heading emitted for a northerly wind. Upstream sources disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NorthConvention {
    Zero,
    #[default]
    ThreeSixty,
}

impl NorthConvention {
    pub fn degrees(&self) -> f64 {
        match self {
            NorthConvention::Zero => 0.0,
            NorthConvention::ThreeSixty => 360.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassPoint {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassPoint {
    pub fn label(&self) -> &'static str {
        match self {
            CompassPoint::North => "North",
            CompassPoint::Northeast => "Northeast",
            CompassPoint::East => "East",
            CompassPoint::Southeast => "Southeast",
            CompassPoint::South => "South",
            CompassPoint::Southwest => "Southwest",
            CompassPoint::West => "West",
            CompassPoint::Northwest => "Northwest",
        }
    }

    pub fn degrees(&self, north: NorthConvention) -> f64 {
        match self {
            CompassPoint::North => north.degrees(),
            CompassPoint::Northeast => 45.0,
            CompassPoint::East => 90.0,
            CompassPoint::Southeast => 135.0,
            CompassPoint::South => 180.0,
            CompassPoint::Southwest => 225.0,
            CompassPoint::West => 270.0,
            CompassPoint::Northwest => 315.0,
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        let point = match normalized.as_str() {
            "north" | "n" => CompassPoint::North,
            "northeast" | "ne" => CompassPoint::Northeast,
            "east" | "e" => CompassPoint::East,
            "southeast" | "se" => CompassPoint::Southeast,
            "south" | "s" => CompassPoint::South,
            "southwest" | "sw" => CompassPoint::Southwest,
            "west" | "w" => CompassPoint::West,
            "northwest" | "nw" => CompassPoint::Northwest,
            _ => return None,
        };
        Some(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Compass(CompassPoint),
    /// Zero wind; drawn as a zero-speed barb.
    Calm,
    /// Heading undefined; speed is still reported.
    Variable,
}

impl WindDirection {
    /// Parse an upstream direction label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("calm") {
            return Some(WindDirection::Calm);
        }
        if trimmed.eq_ignore_ascii_case("variable") || trimmed.eq_ignore_ascii_case("vrb") {
            return Some(WindDirection::Variable);
        }
        CompassPoint::from_label(trimmed).map(WindDirection::Compass)
    }

    pub fn degrees(&self, north: NorthConvention) -> Option<f64> {
        match self {
            WindDirection::Compass(point) => Some(point.degrees(north)),
            WindDirection::Calm => Some(0.0),
            WindDirection::Variable => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindDirection::Compass(point) => point.label(),
            WindDirection::Calm => "Calm",
            WindDirection::Variable => "Variable",
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for WindDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knots_conversion() {
        assert!((kmh_to_knots(18.52) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_ms_conversion() {
        assert!((kmh_to_ms(36.0) - 10.000008).abs() < 1e-9);
    }

    #[test]
    fn test_parse_full_and_abbreviated_labels() {
        assert_eq!(
            WindDirection::parse("Southwest"),
            Some(WindDirection::Compass(CompassPoint::Southwest))
        );
        assert_eq!(
            WindDirection::parse("NE"),
            Some(WindDirection::Compass(CompassPoint::Northeast))
        );
        assert_eq!(
            WindDirection::parse("north-west"),
            Some(WindDirection::Compass(CompassPoint::Northwest))
        );
    }

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(WindDirection::parse("Calm"), Some(WindDirection::Calm));
        assert_eq!(WindDirection::parse("variable"), Some(WindDirection::Variable));
        assert_eq!(WindDirection::parse("N/A"), None);
        assert_eq!(WindDirection::parse(""), None);
    }

    #[test]
    fn test_north_convention() {
        let north = WindDirection::Compass(CompassPoint::North);
        assert_eq!(north.degrees(NorthConvention::Zero), Some(0.0));
        assert_eq!(north.degrees(NorthConvention::ThreeSixty), Some(360.0));
    }

    #[test]
    fn test_sentinel_degrees() {
        assert_eq!(WindDirection::Calm.degrees(NorthConvention::ThreeSixty), Some(0.0));
        assert_eq!(WindDirection::Variable.degrees(NorthConvention::Zero), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&WindDirection::Compass(CompassPoint::East)).unwrap();
        assert_eq!(json, "\"East\"");
    }
}
