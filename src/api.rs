use crate::config::ApiConfig;
use crate::models::{
    Coordinates, HealthResponse, LocationPayload, ResourceQueryResult, ResourcesResponse,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("server responded with {0}")]
    ServerError(StatusCode),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// One-line reason shown to the user. Status codes and transport detail
    /// stay in the log.
    pub fn reason(&self) -> String {
        "Server error".to_string()
    }
}

/// Client for the backend resource-lookup service.
pub struct ResourceClient {
    client: Client,
    base_url: String,
}

impl ResourceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn resources_url(&self) -> String {
        format!("{}/resources", self.base_url)
    }

    /// Looks up resources near `coords`. One request, no retry.
    pub async fn fetch_nearby(
        &self,
        coords: Coordinates,
    ) -> Result<ResourceQueryResult, FetchError> {
        let url = self.resources_url();
        debug!("POST {} ({}, {})", url, coords.latitude, coords.longitude);

        let payload: LocationPayload = coords;
        let res = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!("Resource lookup failed with status {}", status);
            return Err(FetchError::ServerError(status));
        }

        let body = res.bytes().await?;
        decode_resources(&body)
    }

    /// Queries `GET {base}/health` and returns the reported status string.
    pub async fn health(&self) -> Result<String, FetchError> {
        let res = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status));
        }
        let body = res.bytes().await?;
        let health: HealthResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
        Ok(health.status)
    }
}

/// Parses a successful lookup body. The body must hold a `resources` array of
/// well-formed records with finite, non-negative distances.
pub fn decode_resources(body: &[u8]) -> Result<ResourceQueryResult, FetchError> {
    let res: ResourcesResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if let Some(bad) = res
        .resources
        .iter()
        .find(|r| !r.distance_km.is_finite() || r.distance_km < 0.0)
    {
        return Err(FetchError::MalformedResponse(format!(
            "invalid distance {} for '{}'",
            bad.distance_km, bad.name
        )));
    }

    Ok(res.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_resources_in_backend_order() {
        let body = br#"{"resources": [
            {"name": "B", "type": "clinic", "address": "2 St", "distance": 0.5},
            {"name": "A", "type": "shelter", "address": "1 St", "distance": 0.2}
        ]}"#;
        let result = decode_resources(body).unwrap();
        let names: Vec<_> = result.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn empty_resource_array_is_valid() {
        let result = decode_resources(br#"{"success": true, "resources": []}"#).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn missing_or_non_array_resources_is_malformed() {
        let bodies: [&[u8]; 5] = [
            br#"{"success": true}"#,
            br#"{"resources": {"name": "x"}}"#,
            br#"{"resources": null}"#,
            b"<html>502 Bad Gateway</html>",
            b"",
        ];
        for body in bodies {
            assert!(
                matches!(decode_resources(body), Err(FetchError::MalformedResponse(_))),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn negative_distance_is_malformed() {
        let body =
            br#"{"resources": [{"name": "A", "type": "t", "address": "a", "distance": -1.0}]}"#;
        assert!(matches!(
            decode_resources(body),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn every_failure_reads_as_server_error() {
        let err = FetchError::ServerError(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reason(), "Server error");
        assert_eq!(
            FetchError::MalformedResponse("eof".into()).reason(),
            "Server error"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let client =
            ResourceClient::new("http://localhost:5000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.resources_url(), "http://localhost:5000/api/resources");
    }
}
