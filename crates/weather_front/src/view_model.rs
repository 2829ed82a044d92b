use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::{ForecastDay, HourlyRecord, RawForecastResponse, TemperatureScale};

/// Number of entries in the upcoming-hours strip.
pub const HOURS_TO_DISPLAY: usize = 8;
/// Distance in hours between two entries of the strip.
pub const HOUR_STEP: usize = 3;

const LOCALTIME_LEN: usize = 16;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DataError {
    #[error("Forecast has no entry for day {0}")]
    MissingForecastDay(usize),
}

/// Template-ready data for both the forecast page and its error variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ViewModel {
    pub search_query: String,
    pub location: String,
    pub country: String,
    pub date: String,
    pub time: String,
    pub recent_hours: Vec<HourlyRecord>,
    pub condition: String,
    pub humidity: f64,
    pub wind: f64,
    pub precipitation: f64,
    pub temp_scale: TemperatureScale,
    pub temperature: f64,
    pub forecast_days: Vec<ForecastDay>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidCity,
    HttpError,
    NetworkError,
    DataError,
    Timeout,
    RequestError,
    /// Anything outside the known categories, rendered with the generic message
    #[serde(other)]
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidCity => "invalid_city",
            ErrorCategory::HttpError => "http_error",
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::DataError => "data_error",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::RequestError => "request_error",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// User-facing text for the category. `query` and `details` are only read by
    /// `InvalidCity` and `HttpError` respectively.
    pub fn message(&self, query: &str, details: Option<&str>) -> String {
        match self {
            ErrorCategory::InvalidCity => {
                format!("City '{}' not found. Please check the spelling.", query)
            }
            ErrorCategory::HttpError => format!(
                "Weather service error (HTTP {}). Please try again later.",
                details.unwrap_or("error")
            ),
            ErrorCategory::NetworkError => String::from(
                "Cannot connect to weather service. Please check your internet connection.",
            ),
            ErrorCategory::DataError => {
                String::from("Received unexpected data format from weather service.")
            }
            ErrorCategory::Timeout => String::from("Request timed out. Please try again."),
            ErrorCategory::RequestError | ErrorCategory::Unknown => {
                String::from("An unexpected error occurred.")
            }
        }
    }
}

impl From<&str> for ErrorCategory {
    fn from(value: &str) -> Self {
        match value {
            "invalid_city" => ErrorCategory::InvalidCity,
            "http_error" => ErrorCategory::HttpError,
            "network_error" => ErrorCategory::NetworkError,
            "data_error" => ErrorCategory::DataError,
            "timeout" => ErrorCategory::Timeout,
            "request_error" => ErrorCategory::RequestError,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits `YYYY-MM-DD HH:MM` into date and time, both empty unless the string has exactly
/// that length.
pub fn split_localtime(localtime: &str) -> (String, String) {
    if localtime.chars().count() != LOCALTIME_LEN {
        return (String::new(), String::new());
    }
    let date = localtime.chars().take(10).collect();
    let time = localtime.chars().skip(11).collect();
    (date, time)
}

/// Hour of day from an `HH:MM` string, 0 when it cannot be read.
pub fn current_hour(time: &str) -> usize {
    if !time.contains(':') {
        return 0;
    }
    time.chars()
        .take(2)
        .collect::<String>()
        .parse::<usize>()
        .unwrap_or(0)
}

/// Every third hour after `current_hour` from today, topped up from the start of tomorrow
/// until `HOURS_TO_DISPLAY` entries are collected. Returns fewer entries when tomorrow is short.
pub fn upcoming_hours(
    today: &[HourlyRecord],
    tomorrow: Option<&[HourlyRecord]>,
    current_hour: usize,
) -> Result<Vec<HourlyRecord>, DataError> {
    let mut hours: Vec<HourlyRecord> = today
        .iter()
        .take(HOURS_TO_DISPLAY * HOUR_STEP)
        .skip(current_hour + 1)
        .step_by(HOUR_STEP)
        .cloned()
        .collect();

    if hours.len() < HOURS_TO_DISPLAY {
        let missing = HOURS_TO_DISPLAY - hours.len();
        let tomorrow = tomorrow.ok_or(DataError::MissingForecastDay(1))?;
        hours.extend(
            tomorrow
                .iter()
                .take(missing * HOUR_STEP)
                .step_by(HOUR_STEP)
                .cloned(),
        );
    }
    Ok(hours)
}

/// Flattens an upstream forecast into the page model. The payload is only read.
pub fn build_success_view(
    data: &RawForecastResponse,
    query: &str,
    temp_scale: TemperatureScale,
) -> Result<ViewModel, DataError> {
    let (date, time) = split_localtime(&data.location.localtime);
    let days = &data.forecast.forecastday;
    let today = days.first().ok_or(DataError::MissingForecastDay(0))?;
    let tomorrow = days.get(1).map(|day| day.hour.as_slice());
    let recent_hours = upcoming_hours(&today.hour, tomorrow, current_hour(&time))?;

    let current = &data.current;
    Ok(ViewModel {
        search_query: query.to_owned(),
        location: data.location.name.clone(),
        country: data.location.country.clone(),
        date,
        time,
        recent_hours,
        condition: current.condition.text.clone(),
        humidity: current.humidity,
        wind: current.wind_kph,
        precipitation: current.precip_in,
        temp_scale,
        temperature: temp_scale.pick(current.temp_c, current.temp_f),
        forecast_days: days.clone(),
        error: None,
    })
}

/// Page model for a failed lookup: message set, every other field zeroed or empty.
/// `temp_scale` is kept so the page's search form and °C/°F links stay on the requested scale.
pub fn build_error_view(
    query: &str,
    temp_scale: TemperatureScale,
    category: &ErrorCategory,
    details: Option<&str>,
) -> ViewModel {
    ViewModel {
        search_query: query.to_owned(),
        location: query.to_owned(),
        country: String::new(),
        date: String::new(),
        time: String::new(),
        recent_hours: vec![],
        condition: String::new(),
        humidity: 0.0,
        wind: 0.0,
        precipitation: 0.0,
        temp_scale,
        temperature: 0.0,
        forecast_days: vec![],
        error: Some(category.message(query, details)),
    }
}
