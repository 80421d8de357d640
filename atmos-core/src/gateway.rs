use crate::{
    Config,
    error::WeatherError,
    gateway::open_meteo::OpenMeteoGateway,
    model::{Coordinates, LocationName, Place, RawForecastResponse},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

/// The three outbound calls the dashboard makes. Each is a single request;
/// nothing is retried.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// Current, hourly and daily blocks for `coords`, in Fahrenheit and mph.
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
    ) -> Result<RawForecastResponse, WeatherError>;

    /// Up to five places matching `query`. No matches is an empty vec.
    async fn search_city(&self, query: &str) -> Result<Vec<Place>, WeatherError>;

    /// Best-effort place name for `coords`. Cannot fail: lookup errors yield
    /// [`LocationName::Coordinates`].
    async fn resolve_city_name(&self, coords: Coordinates) -> LocationName;
}

/// Construct the gateway described by `config`.
pub fn gateway_from_config(config: &Config) -> Result<Arc<dyn WeatherGateway>, WeatherError> {
    let gateway = OpenMeteoGateway::new(config.endpoints.clone(), config.timeout())?;
    Ok(Arc::new(gateway))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_from_default_config() {
        let cfg = Config::default();
        assert!(gateway_from_config(&cfg).is_ok());
    }
}
