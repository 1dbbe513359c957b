//! HTTP surface of the proxy.
//!
//! Endpoints:
//! - `/weather` - current weather by `city` or `lat`+`lng`, with local time added
//! - `/timezone` - raw provider payload by `lat`+`lng`
//! - `/health` - liveness

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use weather_core::{Config, WeatherError, WeatherParams, WeatherProvider, WeatherService};

pub type DynService = WeatherService<Box<dyn WeatherProvider>>;

/// Shared, read-only per-process state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DynService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: DynService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// A [`WeatherError`] rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::warn!(error = %self.0, "rejected request");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather_handler))
        .route("/timezone", get(timezone_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn weather_handler(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .service
        .current_weather(&params, state.config.credential())
        .await?;
    Ok(Json(payload))
}

async fn timezone_handler(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .service
        .timezone(&params, state.config.credential())
        .await?;
    Ok(Json(payload))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind weather server to {}: {}", addr, e))?;

    if state.config.credential().is_none() {
        tracing::warn!("no API key configured; every lookup will fail until one is set");
    }
    tracing::info!("Weather server listening on http://{}/", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("Weather server error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::{Read, Write};
    use weather_core::{FixedClock, OpenWeatherProvider};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Start the router on an ephemeral port and return its base URL.
    async fn spawn_app(upstream: &str, api_key: Option<&str>) -> String {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 15, 0).unwrap();
        let provider: Box<dyn WeatherProvider> =
            Box::new(OpenWeatherProvider::with_base_url(upstream));
        let service = WeatherService::with_clock(provider, Arc::new(FixedClock(now)));
        let config = Config {
            api_key: api_key.map(str::to_string),
            ..Config::default()
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(service, config));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn get(url: String) -> (StatusCode, Value) {
        let res = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
        (status, res.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_weather_by_city_is_enriched() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Sao Paulo"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Sao Paulo",
                "timezone": -10800,
                "main": {"temp": 18.0}
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = spawn_app(&upstream.uri(), Some("KEY")).await;
        let (status, body) = get(format!("{app}/weather?city=Sao%20Paulo")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sao Paulo");
        assert_eq!(body["main"]["temp"], 18.0);
        assert_eq!(body["local_time"], "2025-06-01 05:15:00");
        assert_eq!(body["timezone_offset_hours"], -3);
    }

    #[tokio::test]
    async fn test_weather_by_coordinates_uses_longitude_fallback() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "10"))
            .and(query_param("lon", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200})))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = spawn_app(&upstream.uri(), Some("KEY")).await;
        let (status, body) = get(format!("{app}/weather?lat=10&lng=50")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timezone_offset"], 3);
        assert_eq!(body["local_time"], "2025-06-01 11:15:00");
    }

    #[tokio::test]
    async fn test_weather_missing_location_is_400() {
        let upstream = MockServer::start().await;
        let app = spawn_app(&upstream.uri(), Some("KEY")).await;

        let (status, body) = get(format!("{app}/weather?lat=10")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Either city or lat/lng coordinates are required"}));
    }

    #[tokio::test]
    async fn test_weather_missing_credential_is_500() {
        let upstream = MockServer::start().await;
        let app = spawn_app(&upstream.uri(), None).await;

        let (status, body) = get(format!("{app}/weather")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "API key is not set"}));
    }

    #[tokio::test]
    async fn test_weather_upstream_unreachable_is_500() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let app = spawn_app(&dead, Some("KEY")).await;
        let (status, body) = get(format!("{app}/weather?city=Oslo")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch weather data"}));
    }

    #[tokio::test]
    async fn test_weather_truncated_upstream_body_is_500() {
        // Upstream announces 500 bytes, sends a fragment and hangs up.
        let upstream = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let upstream_url = format!("http://{}", upstream.local_addr().unwrap());
        std::thread::spawn(move || {
            let (mut stream, _) = upstream.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 500\r\n\r\n{\"a\":")
                .unwrap();
        });

        let app = spawn_app(&upstream_url, Some("KEY")).await;
        let (status, body) = get(format!("{app}/weather?city=Oslo")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to read weather response body"}));
    }

    #[tokio::test]
    async fn test_timezone_returns_raw_payload() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "35.6"))
            .and(query_param("lon", "139.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"timezone": 32400})))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = spawn_app(&upstream.uri(), Some("KEY")).await;
        let (status, body) = get(format!("{app}/timezone?lat=35.6&lng=139.7")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"timezone": 32400}));
    }

    #[tokio::test]
    async fn test_timezone_missing_coordinates_is_400_even_without_key() {
        let upstream = MockServer::start().await;
        let app = spawn_app(&upstream.uri(), None).await;

        let (status, body) = get(format!("{app}/timezone?city=Paris")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Latitude and longitude are required"}));

        let (status, body) = get(format!("{app}/timezone?lat=1&lng=2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "API key is not set"}));
    }

    #[tokio::test]
    async fn test_timezone_parse_failure_is_500() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&upstream)
            .await;

        let app = spawn_app(&upstream.uri(), Some("KEY")).await;
        let (status, body) = get(format!("{app}/timezone?lat=1&lng=2")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to parse timezone data"}));
    }

    #[tokio::test]
    async fn test_health() {
        let upstream = MockServer::start().await;
        let app = spawn_app(&upstream.uri(), None).await;

        let res = reqwest::get(format!("{app}/health")).await.unwrap();
        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(res.text().await.unwrap(), "ok");
    }
}
