use log::{debug, error, warn};
use std::net::IpAddr;

use crate::{
    build_error_view, build_success_view, geolocation, weather_client, AppState, DataError,
    ErrorCategory, ForecastQuery, TemperatureScale, ViewModel,
};

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Failed to geolocate caller: {0}")]
    Location(#[from] geolocation::Error),
    #[error("No city could be resolved for the caller")]
    UnknownLocation,
    #[error("Failed to fetch forecast: {0}")]
    Weather(#[from] weather_client::Error),
    #[error("Failed to shape forecast: {0}")]
    Data(#[from] DataError),
}

impl LookupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LookupError::Location(_) => ErrorCategory::NetworkError,
            LookupError::UnknownLocation => ErrorCategory::InvalidCity,
            LookupError::Weather(e) => match e {
                weather_client::Error::NotFound(_) => ErrorCategory::InvalidCity,
                weather_client::Error::UpstreamHttp(_) => ErrorCategory::HttpError,
                weather_client::Error::Timeout => ErrorCategory::Timeout,
                weather_client::Error::Transport(_) => ErrorCategory::RequestError,
                weather_client::Error::MalformedPayload(_) => ErrorCategory::DataError,
            },
            LookupError::Data(_) => ErrorCategory::DataError,
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            LookupError::Weather(weather_client::Error::UpstreamHttp(status)) => {
                Some(status.to_string())
            }
            _ => None,
        }
    }
}

/// Template a lookup renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    NotFound,
}

pub struct ForecastLookup {
    /// City searched for, either from the query or from geolocation
    pub city: String,
    pub temp_scale: TemperatureScale,
    pub outcome: Result<ViewModel, LookupError>,
}

impl ForecastLookup {
    pub fn into_page(self) -> (Page, ViewModel) {
        match self.outcome {
            Ok(view) => (Page::Home, view),
            Err(e) => {
                let category = e.category();
                let view = build_error_view(
                    &self.city,
                    self.temp_scale,
                    &category,
                    e.details().as_deref(),
                );
                let page = if category == ErrorCategory::InvalidCity {
                    Page::NotFound
                } else {
                    Page::Home
                };
                (page, view)
            }
        }
    }
}

/// Resolves the city when the query has none, fetches the forecast and shapes it.
/// Every failure is logged here and returned in the lookup, nothing escapes as a panic.
pub async fn lookup_forecast(
    state: &AppState,
    query: ForecastQuery,
    client_ip: Option<IpAddr>,
) -> ForecastLookup {
    let mut city = query.city;
    let temp_scale = query.temperature_scale;
    if city.is_empty() {
        match locate(state, client_ip).await {
            Ok(located) => city = located,
            Err(e) => {
                error!("error resolving caller location: {}", e);
                return ForecastLookup {
                    city,
                    temp_scale,
                    outcome: Err(e),
                };
            }
        }
    }

    let outcome = fetch_view(state, &city, temp_scale).await;
    if let Err(e) = &outcome {
        match e.category() {
            ErrorCategory::InvalidCity => error!("city not found: '{}' ({})", city, e),
            category => error!("{} for '{}': {}", category, city, e),
        }
    }
    ForecastLookup {
        city,
        temp_scale,
        outcome,
    }
}

async fn locate(state: &AppState, client_ip: Option<IpAddr>) -> Result<String, LookupError> {
    let Some(ip) = client_ip else {
        warn!("no caller address to geolocate");
        return Err(LookupError::UnknownLocation);
    };
    debug!("geolocating caller at {}", ip);
    let location = state.geolocator.resolve(ip).await?;
    if location.city.is_empty() {
        warn!("geolocation found no city for {}", ip);
        return Err(LookupError::UnknownLocation);
    }
    Ok(location.city)
}

async fn fetch_view(
    state: &AppState,
    city: &str,
    temp_scale: TemperatureScale,
) -> Result<ViewModel, LookupError> {
    let raw = state
        .weather
        .fetch_forecast(city, state.settings.forecast_days)
        .await?;
    Ok(build_success_view(&raw, city, temp_scale)?)
}
