//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Request normalization (city vs coordinates)
//! - The upstream provider abstraction and its OpenWeather implementation
//! - Best-effort local time enrichment of provider payloads
//!
//! It is used by `weather-server`, but the service can be embedded elsewhere.

pub mod augment;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use augment::{Clock, FixedClock, LocalTime, SystemClock, augment_local_time};
pub use config::Config;
pub use error::WeatherError;
pub use model::{Coordinates, LocationQuery, LookupKind, UpstreamQuery, Units, WeatherParams};
pub use normalize::{normalize_timezone, normalize_weather};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use service::WeatherService;
