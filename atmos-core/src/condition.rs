//! WMO weather code interpretation.
//!
//! Only the codes the dashboard has artwork for are mapped; every other code,
//! including valid WMO codes such as 80 (rain showers) or 96 (thunderstorm with
//! hail), falls through to [`Condition::UNKNOWN`].
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::{Deserialize, Serialize};

/// Icon identifiers understood by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Icon {
    Sun,
    CloudSun,
    #[default]
    Cloud,
    CloudFog,
    CloudDrizzle,
    CloudRain,
    CloudLightning,
    Snowflake,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Sun => "Sun",
            Icon::CloudSun => "CloudSun",
            Icon::Cloud => "Cloud",
            Icon::CloudFog => "CloudFog",
            Icon::CloudDrizzle => "CloudDrizzle",
            Icon::CloudRain => "CloudRain",
            Icon::CloudLightning => "CloudLightning",
            Icon::Snowflake => "Snowflake",
        }
    }

    pub const fn all() -> &'static [Icon] {
        &[
            Icon::Sun,
            Icon::CloudSun,
            Icon::Cloud,
            Icon::CloudFog,
            Icon::CloudDrizzle,
            Icon::CloudRain,
            Icon::CloudLightning,
            Icon::Snowflake,
        ]
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable interpretation of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub label: &'static str,
    pub icon: Icon,
}

impl Condition {
    pub const UNKNOWN: Condition = Condition::new("Unknown", Icon::Cloud);

    const fn new(label: &'static str, icon: Icon) -> Self {
        Self { label, icon }
    }
}

/// Map a WMO weather code to its label and icon. Total: unmapped codes
/// return [`Condition::UNKNOWN`].
pub fn condition_for(code: i32) -> Condition {
    match code {
        0 => Condition::new("Clear", Icon::Sun),
        1 => Condition::new("Mainly Clear", Icon::CloudSun),
        2 => Condition::new("Partly Cloudy", Icon::CloudSun),
        3 => Condition::new("Overcast", Icon::Cloud),
        45 | 48 => Condition::new("Fog", Icon::CloudFog),
        51 | 53 | 55 => Condition::new("Drizzle", Icon::CloudDrizzle),
        61 | 63 => Condition::new("Rain", Icon::CloudRain),
        65 => Condition::new("Heavy Rain", Icon::CloudLightning),
        71 | 73 => Condition::new("Snow", Icon::Snowflake),
        75 => Condition::new("Heavy Snow", Icon::Snowflake),
        95 => Condition::new("Thunderstorm", Icon::CloudLightning),
        _ => Condition::UNKNOWN,
    }
}
