use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw location inputs as they arrive on the query string.
///
/// Empty strings are treated exactly like absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherParams {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
}

impl WeatherParams {
    pub fn city(name: impl Into<String>) -> Self {
        Self {
            city: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn coordinates(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            city: None,
            lat: Some(lat.into()),
            lng: Some(lng.into()),
        }
    }

    /// Non-empty city name, if any.
    pub fn city_name(&self) -> Option<&str> {
        non_empty(self.city.as_deref())
    }

    /// Both coordinates, only when both are non-empty.
    pub fn coordinate_pair(&self) -> Option<Coordinates> {
        let lat = non_empty(self.lat.as_deref())?;
        let lng = non_empty(self.lng.as_deref())?;
        Some(Coordinates {
            lat: lat.to_owned(),
            lng: lng.to_owned(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Latitude/longitude exactly as the caller sent them. Not validated here;
/// the upstream rejects malformed numbers itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lng: String,
}

impl Coordinates {
    /// Numeric view, used by the longitude-based time estimate.
    pub fn parsed(&self) -> Option<(f64, f64)> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lng.trim().parse::<f64>().ok()?;
        Some((lat, lng))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn coordinates(&self) -> Option<&Coordinates> {
        match self {
            LocationQuery::City(_) => None,
            LocationQuery::Coordinates(c) => Some(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
        }
    }
}

/// Which inbound operation a query, log line or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Weather,
    Timezone,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Weather => "weather",
            LookupKind::Timezone => "timezone",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated outbound query. Holds everything the fetcher needs apart from
/// the provider base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub lookup: LookupKind,
    pub location: LocationQuery,
    pub api_key: String,
    pub units: Option<Units>,
}

impl UpstreamQuery {
    /// Query-string pairs in the order the provider documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = match &self.location {
            LocationQuery::City(name) => vec![("q", name.as_str())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.as_str()), ("lon", c.lng.as_str())]
            }
        };
        pairs.push(("appid", self.api_key.as_str()));
        if let Some(units) = self.units {
            pairs.push(("units", units.as_str()));
        }
        pairs
    }

    /// Full request URL for `endpoint` (e.g. `http://host/data/2.5/weather`).
    /// Values are form-encoded, so a city like `New York` becomes `New+York`.
    pub fn to_url(&self, endpoint: &str) -> Result<url::Url, url::ParseError> {
        url::Url::parse_with_params(endpoint, self.query_pairs())
    }
}
