//! Turns raw query inputs plus a credential into an [`UpstreamQuery`].
//!
//! Everything here is pure; all I/O lives in the provider.

use crate::{
    error::WeatherError,
    model::{LocationQuery, LookupKind, UpstreamQuery, Units, WeatherParams},
};

/// Build the outbound query for `/weather`.
///
/// Order matters: a missing credential wins over everything, a city wins over
/// coordinates, and coordinates need both halves.
pub fn normalize_weather(
    params: &WeatherParams,
    api_key: Option<&str>,
) -> Result<UpstreamQuery, WeatherError> {
    let api_key = credential(api_key)?;

    let location = if let Some(city) = params.city_name() {
        LocationQuery::City(city.to_owned())
    } else if let Some(coords) = params.coordinate_pair() {
        LocationQuery::Coordinates(coords)
    } else {
        return Err(WeatherError::MissingLocation(LookupKind::Weather));
    };

    Ok(UpstreamQuery {
        lookup: LookupKind::Weather,
        location,
        api_key: api_key.to_owned(),
        units: Some(Units::Metric),
    })
}

/// Build the outbound query for `/timezone`. Coordinates only; `city` is
/// ignored. Missing coordinates are reported before a missing credential.
pub fn normalize_timezone(
    params: &WeatherParams,
    api_key: Option<&str>,
) -> Result<UpstreamQuery, WeatherError> {
    let coords = params
        .coordinate_pair()
        .ok_or(WeatherError::MissingLocation(LookupKind::Timezone))?;
    let api_key = credential(api_key)?;

    Ok(UpstreamQuery {
        lookup: LookupKind::Timezone,
        location: LocationQuery::Coordinates(coords),
        api_key: api_key.to_owned(),
        units: None,
    })
}

fn credential(api_key: Option<&str>) -> Result<&str, WeatherError> {
    api_key
        .filter(|k| !k.is_empty())
        .ok_or(WeatherError::MissingCredential)
}
