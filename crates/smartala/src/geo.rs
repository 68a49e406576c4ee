//! Coordinates and the geometry built on them.
//!
//! Everything here is pure: validation of loosely typed client input,
//! great-circle distance, the simplified planar bearing used for step
//! narration, and the compass classification of that bearing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in decimal degrees.
///
/// Latitude is always within `[-90, 90]` and longitude within
/// `[-180, 180]`; construction fails otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    #[serde(rename = "lat")]
    latitude: f64,
    #[serde(rename = "lng")]
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either component is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let latitude = check_range("lat", latitude, 90.0)?;
        let longitude = check_range("lng", longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Coordinate input as it arrives from a client, before validation.
///
/// Each component may be a JSON number, a numeric string, or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCoordinate {
    /// Latitude as sent by the client.
    #[serde(default, alias = "latitude")]
    pub lat: Option<Value>,
    /// Longitude as sent by the client.
    #[serde(default, alias = "longitude")]
    pub lng: Option<Value>,
    /// Optional human label for the point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawCoordinate {
    /// Build raw input from plain numbers.
    #[must_use]
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(Value::from(lat)),
            lng: Some(Value::from(lng)),
            name: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate into a [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a component is missing,
    /// non-numeric, non-finite or out of range.
    pub fn validate(&self) -> Result<Coordinate> {
        let latitude = numeric_component("lat", self.lat.as_ref())?;
        let longitude = numeric_component("lng", self.lng.as_ref())?;
        Coordinate::new(latitude, longitude)
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        raw.validate()
    }
}

fn numeric_component(field: &str, value: Option<&Value>) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Err(Error::validation(format!("missing {field}"))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| Error::validation(format!("{field} is not a number"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::validation(format!("{field} is not a number: {s:?}"))),
        Some(other) => Err(Error::validation(format!(
            "{field} is not a number: {other}"
        ))),
    }
}

fn check_range(field: &str, value: f64, limit: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::validation(format!("{field} must be finite")));
    }
    if value < -limit || value > limit {
        return Err(Error::validation(format!(
            "{field} {value} outside [-{limit}, {limit}]"
        )));
    }
    Ok(value)
}

/// Great-circle distance in kilometres (haversine).
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    // abs() keeps the result bit-identical when the arguments are swapped
    let dlat = (b.latitude.to_radians() - lat1).abs();
    let dlng = (b.longitude.to_radians() - a.longitude.to_radians()).abs();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // rounding can push h past 1.0 near antipodes
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in metres.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Planar bearing from `a` to `b` in degrees clockwise from north, in `[0, 360)`.
///
/// This treats degree differences as a flat grid. It is not the spherical
/// initial bearing, and narration output depends on it staying that way.
#[must_use]
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = b.latitude - a.latitude;
    let dlng = b.longitude - a.longitude;
    (dlng.atan2(dlat).to_degrees() + 360.0) % 360.0
}

/// Compass sector of a bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `[337.5, 360)` and `[0, 22.5)`.
    North,
    /// `[22.5, 67.5)`.
    NorthEast,
    /// `[67.5, 112.5)`.
    East,
    /// `[112.5, 157.5)`.
    SouthEast,
    /// `[157.5, 202.5)`.
    South,
    /// `[202.5, 247.5)`.
    SouthWest,
    /// `[247.5, 292.5)`.
    West,
    /// `[292.5, 337.5)`.
    NorthWest,
    /// Bearing outside `[0, 360)`.
    Ahead,
}

/// Half-open sectors, lower bound inclusive.
const SECTORS: [(f64, f64, Direction); 9] = [
    (0.0, 22.5, Direction::North),
    (22.5, 67.5, Direction::NorthEast),
    (67.5, 112.5, Direction::East),
    (112.5, 157.5, Direction::SouthEast),
    (157.5, 202.5, Direction::South),
    (202.5, 247.5, Direction::SouthWest),
    (247.5, 292.5, Direction::West),
    (292.5, 337.5, Direction::NorthWest),
    (337.5, 360.0, Direction::North),
];

impl Direction {
    /// Classify a bearing in degrees.
    #[must_use]
    pub fn classify(bearing: f64) -> Self {
        SECTORS
            .iter()
            .find(|(min, max, _)| *min <= bearing && bearing < *max)
            .map_or(Self::Ahead, |(_, _, direction)| *direction)
    }

    /// The spoken turn phrase for this sector.
    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::North => "straight north",
            Self::NorthEast => "right onto the northeast",
            Self::East => "right to the east",
            Self::SouthEast => "right onto the southeast",
            Self::South => "back to the south",
            Self::SouthWest => "left onto the southwest",
            Self::West => "left to the west",
            Self::NorthWest => "left onto the northwest",
            Self::Ahead => "straight ahead",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Classify a bearing into its compass sector.
#[must_use]
pub fn classify_direction(bearing: f64) -> Direction {
    Direction::classify(bearing)
}
