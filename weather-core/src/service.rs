//! Request-level composition: normalize, fetch, enrich.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    augment::{Clock, SystemClock, augment_local_time},
    error::WeatherError,
    model::WeatherParams,
    normalize::{normalize_timezone, normalize_weather},
    provider::WeatherProvider,
};

/// Stateless across requests; safe to share behind an `Arc`.
#[derive(Clone)]
pub struct WeatherService<P> {
    provider: P,
    clock: Arc<dyn Clock>,
}

impl<P: WeatherProvider> WeatherService<P> {
    pub fn new(provider: P) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: P, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current weather for a city or coordinate pair, enriched with a local
    /// time when the payload or the coordinates allow it.
    ///
    /// The longitude estimate uses whatever coordinates the caller sent, even
    /// when a city decided the upstream query.
    pub async fn current_weather(
        &self,
        params: &WeatherParams,
        api_key: Option<&str>,
    ) -> Result<Value, WeatherError> {
        let query = normalize_weather(params, api_key)?;
        let mut payload = self.provider.fetch(&query).await?;

        let coords = params.coordinate_pair();
        match augment_local_time(&mut payload, coords.as_ref(), self.clock.now()) {
            Some(local) => tracing::debug!(?local, "added local time"),
            None => tracing::debug!("no timezone signal, payload left as is"),
        }

        Ok(payload)
    }

    /// Raw provider payload for a coordinate pair.
    pub async fn timezone(
        &self,
        params: &WeatherParams,
        api_key: Option<&str>,
    ) -> Result<Value, WeatherError> {
        let query = normalize_timezone(params, api_key)?;
        self.provider.fetch(&query).await
    }
}
