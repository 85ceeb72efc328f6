//! National Weather Service API client.
//!
//! Two calls back the pipeline: `/points/{lat},{lon}` resolves coordinates to
//! a forecast resource and a nearby city, and that resource returns the
//! forecast periods.

use std::time::Duration;

use localcast_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::types::{Coordinates, Forecast, LocationMetadata, Period, Stage, WeatherError};

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast: Option<String>,
    relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: LocationMetadata,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<Period>,
}

/// Error body the service sends with non-success statuses (`application/problem+json`)
#[derive(Debug, Deserialize)]
struct ProblemDetail {
    title: Option<String>,
    detail: Option<String>,
}

/// Result of a points lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PointInfo {
    pub forecast_url: Url,
    pub location: LocationMetadata,
}

#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: Url,
}

impl NwsClient {
    /// Build a client rooted at `base_url` that identifies itself as `user_agent`.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::Client(format!("invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            &config.api_base_url,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL of the points resource for `coords`.
    pub fn points_url(&self, coords: &Coordinates) -> Result<Url, WeatherError> {
        let raw = format!(
            "{}/points/{}",
            self.base_url.as_str().trim_end_matches('/'),
            coords.path_segment()
        );
        Url::parse(&raw).map_err(|e| WeatherError::Client(format!("invalid points URL '{}': {}", raw, e)))
    }

    /// Resolve coordinates to the forecast resource and the nearest city.
    pub async fn lookup_point(&self, coords: Coordinates) -> Result<PointInfo, WeatherError> {
        let stage = Stage::PointsLookup;
        let url = self.points_url(&coords)?;
        let body: PointsResponse = self.get_json(url, stage).await?;

        let raw_url = body
            .properties
            .forecast
            .ok_or_else(|| WeatherError::parse(stage, "missing properties.forecast"))?;
        let forecast_url = parse_resource_url(&raw_url, stage)?;

        let location = body
            .properties
            .relative_location
            .map(|r| r.properties)
            .ok_or_else(|| WeatherError::parse(stage, "missing properties.relativeLocation"))?;

        tracing::debug!(
            "Point {} resolved to {} ({})",
            coords,
            location.display_name(),
            forecast_url
        );

        Ok(PointInfo {
            forecast_url,
            location,
        })
    }

    /// Fetch and parse the forecast resource returned by [`Self::lookup_point`].
    pub async fn fetch_forecast(&self, url: &Url) -> Result<Forecast, WeatherError> {
        let stage = Stage::Forecast;
        let body: ForecastResponse = self.get_json(url.clone(), stage).await?;
        let count = body.properties.periods.len();

        let forecast = Forecast::new(body.properties.periods)
            .ok_or_else(|| WeatherError::parse(stage, "properties.periods is empty"))?;

        tracing::debug!("Fetched forecast with {} periods", count);
        Ok(forecast)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, stage: Stage) -> Result<T, WeatherError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, GEO_JSON)
            .send()
            .await
            .map_err(|e| network(stage, e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProblemDetail>(&body)
                .ok()
                .and_then(|p| p.detail.or(p.title))
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(network(
                stage,
                NetworkError::ServerError {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| network(stage, e.into_network_error()))?;

        serde_json::from_slice(&bytes).map_err(|e| WeatherError::parse(stage, e.to_string()))
    }
}

fn network(stage: Stage, source: NetworkError) -> WeatherError {
    WeatherError::Network { stage, source }
}

fn parse_resource_url(raw: &str, stage: Stage) -> Result<Url, WeatherError> {
    let url = Url::parse(raw)
        .map_err(|e| WeatherError::parse(stage, format!("forecast URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WeatherError::parse(
            stage,
            format!("forecast URL '{}' has unsupported scheme {}", raw, other),
        )),
    }
}
