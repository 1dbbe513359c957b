//! Per-request failures surfaced to callers of the proxy.

use thiserror::Error;

use crate::model::LookupKind;

/// Every variant is terminal for the request that produced it. Messages are
/// stable and never include upstream detail; causes are logged instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("API key is not set")]
    MissingCredential,

    #[error("{}", missing_location_message(.0))]
    MissingLocation(LookupKind),

    #[error("Failed to fetch {0} data")]
    UpstreamUnreachable(LookupKind),

    #[error("Failed to read {0} response body")]
    ResponseReadFailure(LookupKind),

    #[error("Failed to parse {0} data")]
    ResponseParseFailure(LookupKind),
}

fn missing_location_message(kind: &LookupKind) -> &'static str {
    match kind {
        LookupKind::Weather => "Either city or lat/lng coordinates are required",
        LookupKind::Timezone => "Latitude and longitude are required",
    }
}

impl WeatherError {
    /// Whether the caller is at fault (bad input) rather than the server or
    /// its environment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingLocation(_))
    }
}
