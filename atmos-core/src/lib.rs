//! Core library for the `atmos` weather dashboard.
//!
//! This crate defines:
//! - WMO weather code interpretation
//! - Normalization of Open-Meteo forecasts into a display model
//! - The gateway to the forecast, search and reverse-geocoding services
//! - The saved default location and on-disk configuration
//! - Load orchestration with stale-result protection
//!
//! It is used by `atmos-cli`, but carries no presentation logic of its own.

pub mod condition;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod model;
pub mod normalize;
pub mod store;

pub use condition::{Condition, Icon, condition_for};
pub use config::{Config, Endpoints};
pub use dashboard::{Dashboard, LoadState, LoadTarget, startup_target};
pub use error::WeatherError;
pub use gateway::{WeatherGateway, gateway_from_config, open_meteo::OpenMeteoGateway};
pub use model::{
    Coordinates, DaySlot, DisplayWeather, HourlySlot, LocationName, Place, RawForecastResponse,
    SavedLocation, WeatherReport,
};
pub use normalize::normalize;
pub use store::LocationStore;
