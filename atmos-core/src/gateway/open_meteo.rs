use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    config::Endpoints,
    error::WeatherError,
    model::{Coordinates, LocationName, Place, RawForecastResponse},
};

use super::WeatherGateway;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const SEARCH_LIMIT: u8 = 5;
const USER_AGENT: &str = concat!("atmos/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo forecast and geocoding, plus BigDataCloud for reverse lookups.
#[derive(Debug, Clone)]
pub struct OpenMeteoGateway {
    endpoints: Endpoints,
    http: Client,
}

impl OpenMeteoGateway {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::network("Failed to build HTTP client", e))?;

        Ok(Self { endpoints, http })
    }

    async fn get_json<Q, T>(&self, what: &str, url: &str, query: &Q) -> Result<T, WeatherError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(url, "requesting {what}");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::network(&format!("Failed to send {what} request"), e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| {
                WeatherError::network(&format!("Failed to read {what} response body"), e)
            })?;

        if !status.is_success() {
            return Err(WeatherError::Network(format!(
                "{what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::data_shape(format!("Failed to parse {what} JSON: {e}")))
    }

    async fn lookup_city_name(&self, coords: Coordinates) -> Result<LocationName, WeatherError> {
        let query = ReverseQuery {
            latitude: coords.latitude,
            longitude: coords.longitude,
            locality_language: "en",
        };

        let parsed: ReverseResponse = self
            .get_json("reverse geocode", &self.endpoints.reverse_geocoding, &query)
            .await?;

        Ok(parsed.best_name())
    }
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current: &'a str,
    daily: &'a str,
    hourly: &'a str,
    temperature_unit: &'a str,
    wind_speed_unit: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Debug, Serialize)]
struct ReverseQuery<'a> {
    latitude: f64,
    longitude: f64,
    #[serde(rename = "localityLanguage")]
    locality_language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseResponse {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
}

impl ReverseResponse {
    fn best_name(self) -> LocationName {
        [self.city, self.locality, self.principal_subdivision]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .map_or(LocationName::Unknown, LocationName::Resolved)
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoGateway {
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
    ) -> Result<RawForecastResponse, WeatherError> {
        let query = ForecastQuery {
            latitude: coords.latitude,
            longitude: coords.longitude,
            current: CURRENT_FIELDS,
            daily: DAILY_FIELDS,
            hourly: HOURLY_FIELDS,
            temperature_unit: "fahrenheit",
            wind_speed_unit: "mph",
            timezone: "auto",
        };

        self.get_json("forecast", &self.endpoints.forecast, &query).await
    }

    async fn search_city(&self, query: &str) -> Result<Vec<Place>, WeatherError> {
        let name = query.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let query = SearchQuery {
            name,
            count: SEARCH_LIMIT,
            language: "en",
            format: "json",
        };

        let parsed: SearchResponse = self
            .get_json("city search", &self.endpoints.geocoding, &query)
            .await?;

        Ok(parsed.results.unwrap_or_default())
    }

    async fn resolve_city_name(&self, coords: Coordinates) -> LocationName {
        match self.lookup_city_name(coords).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed, using coordinates");
                LocationName::Coordinates(coords.label())
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_response_prefers_city_then_locality() {
        let parse = |json: &str| {
            serde_json::from_str::<ReverseResponse>(json)
                .expect("valid json")
                .best_name()
        };

        assert_eq!(
            parse(r#"{"city": "Boston", "locality": "Back Bay"}"#),
            LocationName::Resolved("Boston".into())
        );
        assert_eq!(
            parse(
                r#"{"city": "", "locality": "Back Bay", "principalSubdivision": "Massachusetts"}"#
            ),
            LocationName::Resolved("Back Bay".into())
        );
        assert_eq!(
            parse(r#"{"principalSubdivision": "Massachusetts"}"#),
            LocationName::Resolved("Massachusetts".into())
        );
        assert_eq!(parse("{}"), LocationName::Unknown);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
