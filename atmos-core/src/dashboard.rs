//! Load orchestration: picks what to show, runs the fetch, and publishes the
//! result as one immutable [`LoadState`].

use chrono::Utc;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;

use crate::{
    config::Config,
    error::WeatherError,
    gateway::WeatherGateway,
    model::{Coordinates, Place, SavedLocation, WeatherReport},
    normalize::normalize,
    store::LocationStore,
};

/// Coordinates to load, with a name when one is already known. Without a name
/// the location is reverse geocoded alongside the forecast fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTarget {
    pub coordinates: Coordinates,
    pub name: Option<String>,
}

impl LoadTarget {
    pub fn at(coordinates: Coordinates) -> Self {
        Self { coordinates, name: None }
    }

    pub fn named(coordinates: Coordinates, name: impl Into<String>) -> Self {
        Self {
            coordinates,
            name: Some(name.into()),
        }
    }
}

impl From<&Place> for LoadTarget {
    fn from(place: &Place) -> Self {
        Self::named(place.coordinates(), place.display_name())
    }
}

impl From<SavedLocation> for LoadTarget {
    fn from(saved: SavedLocation) -> Self {
        Self::named(saved.coordinates(), saved.name)
    }
}

/// What to load on startup: the saved default, then the caller's own
/// position, then the configured fallback city.
pub fn startup_target(
    store: &LocationStore,
    geolocated: Option<Coordinates>,
    config: &Config,
) -> LoadTarget {
    if let Some(saved) = store.load() {
        tracing::debug!(name = %saved.name, "starting from saved location");
        return saved.into();
    }

    match geolocated {
        Some(coords) => LoadTarget::at(coords),
        None => config.default_location.clone().into(),
    }
}

/// Published state. Each transition replaces the previous value wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading {
        request: u64,
    },
    Ready {
        request: u64,
        report: Arc<WeatherReport>,
    },
    Failed {
        request: u64,
        message: String,
    },
}

impl LoadState {
    pub fn request(&self) -> Option<u64> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { request }
            | LoadState::Ready { request, .. }
            | LoadState::Failed { request, .. } => Some(*request),
        }
    }

    pub fn report(&self) -> Option<&Arc<WeatherReport>> {
        match self {
            LoadState::Ready { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    gateway: Arc<dyn WeatherGateway>,
    latest: AtomicU64,
    state: watch::Sender<LoadState>,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn WeatherGateway>) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            gateway,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Fetch and normalize the forecast for `target`, publishing `Loading`
    /// and then `Ready` or `Failed`. If another load started in the meantime
    /// the result is returned but not published.
    pub async fn load(&self, target: LoadTarget) -> Result<Arc<WeatherReport>, WeatherError> {
        let request = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(LoadState::Loading { request });

        tracing::info!(
            request,
            lat = target.coordinates.latitude,
            lon = target.coordinates.longitude,
            "loading weather"
        );

        match self.fetch(target).await {
            Ok(report) => {
                let report = Arc::new(report);
                self.publish(LoadState::Ready {
                    request,
                    report: Arc::clone(&report),
                });
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(request, error = %e, "weather load failed");
                self.publish(LoadState::Failed {
                    request,
                    message: e.user_message().to_string(),
                });
                Err(e)
            }
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Place>, WeatherError> {
        self.gateway.search_city(query).await
    }

    /// Persist the currently shown location. Returns `false` when nothing is
    /// loaded.
    pub fn save_current_as_default(&self, store: &LocationStore) -> anyhow::Result<bool> {
        let state = self.state();
        let Some(report) = state.report() else {
            return Ok(false);
        };

        let weather = &report.weather;
        store.save(&SavedLocation {
            lat: weather.coordinates.latitude,
            lon: weather.coordinates.longitude,
            name: weather.location.clone(),
        })?;
        Ok(true)
    }

    async fn fetch(&self, target: LoadTarget) -> Result<WeatherReport, WeatherError> {
        let LoadTarget { coordinates, name } = target;

        let name = async {
            match name {
                Some(name) => name,
                None => self.gateway.resolve_city_name(coordinates).await.into_string(),
            }
        };

        let (raw, name) = tokio::join!(self.gateway.fetch_forecast(coordinates), name);
        normalize(&raw?, name, coordinates, Utc::now())
    }

    /// Replace the published state unless a newer load has started.
    fn publish(&self, next: LoadState) -> bool {
        let request = next.request();
        let latest = &self.latest;

        let published = self.state.send_if_modified(|state| {
            if request == Some(latest.load(Ordering::SeqCst)) {
                *state = next;
                true
            } else {
                false
            }
        });

        if !published {
            tracing::debug!(?request, "discarding stale load result");
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocationName, RawForecastResponse};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    const SLOW_LAT: f64 = 1.0;

    #[derive(Debug, Default)]
    struct FakeGateway {
        gate: Notify,
        fail_forecast: bool,
    }

    fn forecast_json() -> serde_json::Value {
        serde_json::json!({
            "utc_offset_seconds": 0,
            "current": {
                "temperature_2m": 71.4,
                "relative_humidity_2m": 55,
                "weather_code": 0,
                "wind_speed_10m": 4.2
            },
            "daily": {
                "time": ["2024-03-04", "2024-03-05"],
                "weather_code": [0, 61],
                "temperature_2m_max": [75.0, 68.2],
                "temperature_2m_min": [60.0, 55.1]
            },
            "hourly": {
                "time": ["2024-03-04T00:00", "2024-03-04T01:00"],
                "temperature_2m": [61.0, 60.5],
                "weather_code": [0, 1]
            }
        })
    }

    #[async_trait]
    impl WeatherGateway for FakeGateway {
        async fn fetch_forecast(
            &self,
            coords: Coordinates,
        ) -> Result<RawForecastResponse, WeatherError> {
            if coords.latitude == SLOW_LAT {
                self.gate.notified().await;
            }
            if self.fail_forecast {
                return Err(WeatherError::Network("status 503".into()));
            }
            serde_json::from_value(forecast_json())
                .map_err(|e| WeatherError::data_shape(e.to_string()))
        }

        async fn search_city(&self, _query: &str) -> Result<Vec<Place>, WeatherError> {
            Ok(Vec::new())
        }

        async fn resolve_city_name(&self, coords: Coordinates) -> LocationName {
            LocationName::Coordinates(coords.label())
        }
    }

    fn dashboard(gateway: FakeGateway) -> Dashboard {
        Dashboard::new(Arc::new(gateway))
    }

    #[tokio::test]
    async fn load_publishes_ready_report() {
        let dash = dashboard(FakeGateway::default());
        let rx = dash.subscribe();

        let report = dash
            .load(LoadTarget::named(Coordinates::new(40.71, -74.0), "New York"))
            .await
            .expect("loads");

        assert_eq!(report.weather.temp, 71);
        assert_eq!(report.weather.location, "New York");
        assert_eq!(report.forecast.len(), 2);
        assert_eq!(*rx.borrow(), LoadState::Ready { request: 1, report });
    }

    #[tokio::test]
    async fn unnamed_target_is_reverse_geocoded() {
        let dash = dashboard(FakeGateway::default());
        let report = dash
            .load(LoadTarget::at(Coordinates::new(12.3456, 65.4321)))
            .await
            .expect("loads");

        assert_eq!(report.weather.location, "12.35, 65.43");
    }

    #[tokio::test]
    async fn failed_forecast_publishes_generic_message() {
        let dash = dashboard(FakeGateway {
            fail_forecast: true,
            ..FakeGateway::default()
        });

        let err = dash.load(LoadTarget::at(Coordinates::new(0.0, 0.0))).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network(_)));
        assert_eq!(
            dash.state(),
            LoadState::Failed {
                request: 1,
                message: "Failed to load weather".into()
            }
        );
    }

    #[tokio::test]
    async fn stale_result_does_not_replace_newer_one() {
        let gateway = Arc::new(FakeGateway::default());
        let dash = Dashboard::new(gateway.clone());

        let slow = dash.load(LoadTarget::named(Coordinates::new(SLOW_LAT, 0.0), "Slow"));
        let fast = async {
            let result = dash.load(LoadTarget::named(Coordinates::new(2.0, 0.0), "Fast")).await;
            gateway.gate.notify_one();
            result
        };

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow.expect("slow loads").weather.location, "Slow");
        assert_eq!(fast.expect("fast loads").weather.location, "Fast");

        let state = dash.state();
        assert_eq!(state.request(), Some(2));
        assert_eq!(state.report().map(|r| r.weather.location.as_str()), Some("Fast"));
    }

    #[tokio::test]
    async fn save_current_requires_a_loaded_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocationStore::new(dir.path());
        let dash = dashboard(FakeGateway::default());

        assert!(!dash.save_current_as_default(&store).expect("no-op"));

        dash.load(LoadTarget::named(Coordinates::new(40.71, -74.0), "New York"))
            .await
            .expect("loads");
        assert!(dash.save_current_as_default(&store).expect("saves"));
        assert_eq!(
            store.load(),
            Some(SavedLocation {
                lat: 40.71,
                lon: -74.0,
                name: "New York".into()
            })
        );
    }

    #[test]
    fn startup_prefers_saved_then_geolocation_then_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocationStore::new(dir.path());
        let cfg = Config::default();
        let here = Coordinates::new(51.5, -0.12);

        assert_eq!(
            startup_target(&store, None, &cfg),
            LoadTarget::named(Coordinates::new(40.71, -74.0), "New York (Default)")
        );
        assert_eq!(startup_target(&store, Some(here), &cfg), LoadTarget::at(here));

        let saved = SavedLocation {
            lat: 48.85,
            lon: 2.35,
            name: "Paris".into(),
        };
        store.save(&saved).expect("saves");
        assert_eq!(startup_target(&store, Some(here), &cfg), saved.into());
    }

    #[test]
    fn place_target_carries_display_name() {
        let place = Place {
            id: 7,
            name: "Portland".into(),
            latitude: 45.52,
            longitude: -122.68,
            admin1: Some("Oregon".into()),
            country: Some("United States".into()),
            country_code: Some("US".into()),
        };
        let target = LoadTarget::from(&place);
        assert_eq!(target.name.as_deref(), Some("Portland, Oregon"));
        assert_eq!(target.coordinates, Coordinates::new(45.52, -122.68));
    }
}
