use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, time::Duration};

pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Geolocation service unavailable: {0}")]
    UpstreamUnavailable(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLocation {
    pub ip: IpAddr,
    /// Empty when the service could not place the address
    pub city: String,
    pub region: String,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn resolve(&self, ip: IpAddr) -> Result<IpLocation, Error>;
}

/// Client for ip-api.com style lookups, `GET {base_url}/{ip}`.
pub struct IpApiClient {
    base_url: String,
    http: Client,
}

#[derive(Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default, rename = "regionName")]
    region_name: Option<String>,
}

impl IpApiClient {
    pub fn new(base_url: String) -> Result<Self, Error> {
        Self::with_timeout(base_url, GEOLOCATION_TIMEOUT)
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::UpstreamUnavailable(e.to_string()))?;
        Ok(Self { base_url, http })
    }
}

#[async_trait]
impl Geolocator for IpApiClient {
    async fn resolve(&self, ip: IpAddr) -> Result<IpLocation, Error> {
        let url = format!("{}/{}", self.base_url, ip);
        debug!("requesting: {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("error sending request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "unexpected status {}",
                status
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("error parsing body: {}", e)))?;

        let location = IpLocation {
            ip,
            city: body.city.unwrap_or_default(),
            region: body.region_name.unwrap_or_default(),
        };
        debug!("geolocated {} to '{}' ({})", ip, location.city, location.region);
        Ok(location)
    }
}
