use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::Icon;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `"40.71, -74.00"`: the label used when no place name is known.
    pub fn label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Forecast payload as returned by Open-Meteo.
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecastResponse {
    pub current: RawCurrent,
    pub daily: RawDaily,
    pub hourly: RawHourly,
    /// Offset of the location's time zone; present because we ask for `timezone=auto`.
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
}

/// Parallel arrays indexed by day offset; index 0 is today.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

/// Parallel arrays indexed by hour offset, starting at local midnight today.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub weather_code: Vec<i32>,
}

/// Current conditions, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayWeather {
    pub coordinates: Coordinates,
    pub temp: i64,
    pub condition_label: &'static str,
    pub condition_icon: Icon,
    pub high: f64,
    pub low: f64,
    pub wind: f64,
    pub humidity: f64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub time: String,
    pub temp: f64,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySlot {
    pub day: String,
    pub max: f64,
    pub min: f64,
    pub label: &'static str,
    pub icon: Icon,
}

/// Everything one load produces. Replaced wholesale on the next load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub weather: DisplayWeather,
    pub hourly: Vec<HourlySlot>,
    pub forecast: Vec<DaySlot>,
    pub fetched_at: DateTime<Utc>,
    /// IANA name of the location's timezone, when the provider reported one.
    pub timezone: Option<String>,
    /// Offset of the location's local time from UTC.
    pub utc_offset_seconds: i32,
}

/// A city search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Name shown once the place is loaded, e.g. "Springfield, Illinois".
    pub fn display_name(&self) -> String {
        match self.admin1.as_deref().or(self.country_code.as_deref()) {
            Some(region) if !region.is_empty() => format!("{}, {}", self.name, region),
            _ => self.name.clone(),
        }
    }

    /// Secondary line for result lists, e.g. "Illinois, United States".
    pub fn region_line(&self) -> String {
        [self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The single persisted default location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl SavedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Outcome of a reverse lookup. Every variant is displayable; there is no
/// failure case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationName {
    Resolved(String),
    Unknown,
    /// The lookup failed; carries the coordinate label.
    Coordinates(String),
}

impl LocationName {
    pub fn as_str(&self) -> &str {
        match self {
            LocationName::Resolved(name) | LocationName::Coordinates(name) => name,
            LocationName::Unknown => "Unknown Location",
        }
    }

    pub fn into_string(self) -> String {
        match self {
            LocationName::Resolved(name) | LocationName::Coordinates(name) => name,
            LocationName::Unknown => "Unknown Location".to_string(),
        }
    }
}

impl std::fmt::Display for LocationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
