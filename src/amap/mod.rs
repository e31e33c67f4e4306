//! AMap web-service client: nearby cinema search and weather forecasts.
//!
//! Both endpoints report application-level success in the body, so a 200
//! response still has to pass [`ensure_success`] before it is handed out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::{PoiResponse, WeatherResponse};

mod poi;
mod weather;

pub use poi::{Coordinate, CINEMA_TYPE_CODE, SEARCH_RADIUS_METERS, SHOW_FIELDS};
pub use weather::DEFAULT_CITY_CODE;

const SUCCESS_STATUS: &str = "1";
const SUCCESS_INFOCODE: &str = "10000";

#[async_trait]
pub trait AmapApi: Send + Sync {
    async fn search_nearby_cinemas(&self, around: Coordinate) -> Result<PoiResponse, ClientError>;
    async fn fetch_weather(&self, city_code: &str) -> Result<WeatherResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct AmapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AmapClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.http_timeout)
            .user_agent(format!("cinescope/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build AMap HTTP client")?;
        Ok(Self {
            client,
            api_key: config.amap_api_key.clone(),
            base_url: config.amap_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}{path}` with the key prepended to `params`, check the
    /// status fields, then decode the full body.
    async fn get_checked<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{operation}: GET {url} {:?}", params);

        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let res = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!("{operation}: request failed: {e}");
                ClientError::transport(operation, e)
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            let e = e.without_url();
            warn!("{operation}: reading body failed: {e}");
            ClientError::transport(operation, e)
        })?;
        if !status.is_success() {
            warn!("{operation}: HTTP {status}: {text}");
            return Err(ClientError::Http {
                operation,
                status,
                code: None,
                message: text,
            });
        }

        let envelope: AmapStatus = serde_json::from_str(&text).map_err(|e| {
            warn!("{operation}: unexpected body: {e}");
            ClientError::decode(operation, e)
        })?;
        ensure_success(operation, &envelope)?;

        serde_json::from_str(&text).map_err(|e| {
            warn!("{operation}: unexpected body: {e}");
            ClientError::decode(operation, e)
        })
    }
}

/// Status fields present on every AMap response body, success or not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmapStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub infocode: String,
}

/// Success means `status == "1"` and `infocode == "10000"`, nothing less.
pub fn ensure_success(operation: &'static str, body: &AmapStatus) -> Result<(), ClientError> {
    if body.status == SUCCESS_STATUS && body.infocode == SUCCESS_INFOCODE {
        return Ok(());
    }
    warn!(
        "{operation}: provider rejected request: {} (status {}, infocode {})",
        body.info, body.status, body.infocode
    );
    Err(ClientError::Rejected {
        operation,
        code: body.infocode.clone(),
        message: body.info.clone(),
    })
}

#[async_trait]
impl AmapApi for AmapClient {
    async fn search_nearby_cinemas(&self, around: Coordinate) -> Result<PoiResponse, ClientError> {
        self.get_checked(poi::OPERATION, poi::PATH, &poi::query(around))
            .await
    }

    async fn fetch_weather(&self, city_code: &str) -> Result<WeatherResponse, ClientError> {
        self.get_checked(weather::OPERATION, weather::PATH, &weather::query(city_code))
            .await
    }
}
