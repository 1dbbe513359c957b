use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{error::WeatherError, model::UpstreamQuery};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, WeatherError> {
        let kind = query.lookup;

        let url = query.to_url(&self.endpoint()).map_err(|e| {
            tracing::error!(error = %e, base_url = %self.base_url, "invalid provider URL");
            WeatherError::UpstreamUnreachable(kind)
        })?;
        tracing::debug!(
            lookup = %kind,
            endpoint = %self.endpoint(),
            params = %loggable_params(query),
            "requesting OpenWeather"
        );

        let res = self.http.get(url).send().await.map_err(|e| {
            tracing::error!(lookup = %kind, error = %e, "OpenWeather request failed");
            WeatherError::UpstreamUnreachable(kind)
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::error!(
                lookup = %kind,
                %status,
                error = %e,
                "failed to read OpenWeather response body"
            );
            WeatherError::ResponseReadFailure(kind)
        })?;
        tracing::debug!(
            lookup = %kind,
            %status,
            body = %truncate_body(&body),
            "OpenWeather response"
        );

        if !status.is_success() {
            tracing::warn!(
                lookup = %kind,
                %status,
                body = %truncate_body(&body),
                "OpenWeather request failed with non-success status"
            );
            return Err(WeatherError::UpstreamUnreachable(kind));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(lookup = %kind, error = %e, "failed to parse OpenWeather JSON");
            WeatherError::ResponseParseFailure(kind)
        })
    }
}

/// Query parameters for logging, with the API key left out.
fn loggable_params(query: &UpstreamQuery) -> String {
    query
        .query_pairs()
        .into_iter()
        .filter(|(name, _)| *name != "appid")
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
