use crate::{error::WeatherError, model::UpstreamQuery};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Performs the single outbound call for a normalized query.
///
/// The payload is returned untyped so unknown provider fields pass through to
/// the caller unchanged.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, WeatherError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Box<P> {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, WeatherError> {
        (**self).fetch(query).await
    }
}
