use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::RawForecastResponse;

pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Weather api could not match the location: {0}")]
    NotFound(String),
    #[error("Weather api responded with {0}")]
    UpstreamHttp(StatusCode),
    #[error("Weather api request timed out")]
    Timeout,
    #[error("Failed to reach weather api: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Weather api returned an unexpected payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Error::Timeout
        } else {
            Error::Transport(value)
        }
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<RawForecastResponse, Error>;
}

/// Client for `{base_url}/forecast.json` on weatherapi.com.
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, Error> {
        Self::with_timeout(api_key, base_url, WEATHER_TIMEOUT)
    }

    pub fn with_timeout(api_key: String, base_url: String, timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url,
            http,
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<RawForecastResponse, Error> {
        let url = format!("{}/forecast.json", self.base_url);
        debug!("requesting forecast for '{}' from {}", city, url);

        let days = days.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", city),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alert", "no"),
            ])
            .send()
            .await?;

        let status = response.status();
        // weatherapi answers 400 when `q` matches no location, this has to win over the generic status check
        if status == StatusCode::BAD_REQUEST {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("error reading weather api 400 body for '{}': {}", city, e);
                    String::new()
                }
            };
            warn!("weather api rejected '{}': {}", city, truncate_body(&body));
            return Err(Error::NotFound(truncate_body(&body)));
        }
        if !status.is_success() {
            return Err(Error::UpstreamHttp(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
