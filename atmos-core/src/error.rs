use thiserror::Error;

/// Failures surfaced by the gateway, the normalizer and the location store.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Non-success HTTP status or a transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Well-formed JSON that is missing or misaligns expected fields.
    #[error("Unexpected data shape: {0}")]
    DataShape(String),

    /// Malformed persisted location data.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn network(context: &str, source: impl std::fmt::Display) -> Self {
        Self::Network(format!("{context}: {source}"))
    }

    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape(message.into())
    }

    /// Message suitable for showing to the user in place of the dashboard.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) | WeatherError::DataShape(_) => "Failed to load weather",
            WeatherError::Parse(_) => "Saved location could not be read",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_share_the_generic_message() {
        assert_eq!(
            WeatherError::network("forecast", "503").user_message(),
            "Failed to load weather"
        );
        assert_eq!(
            WeatherError::data_shape("daily block is empty").user_message(),
            "Failed to load weather"
        );
    }

    #[test]
    fn display_includes_context() {
        let err = WeatherError::network("Forecast request failed", "status 500");
        assert_eq!(err.to_string(), "Network error: Forecast request failed: status 500");
    }
}
