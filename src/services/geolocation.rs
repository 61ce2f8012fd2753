use crate::error::BackendError;
use crate::models::country::Country;
use crate::validation;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn detect_country(&self) -> Result<Country, BackendError>;
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    country_code: Option<String>,
    country_name: Option<String>,
}

pub struct IpGeolocator {
    client: reqwest::Client,
    url: String,
}

impl IpGeolocator {
    pub fn new(url: &str) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        Ok(IpGeolocator {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn detect_country(&self) -> Result<Country, BackendError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::ServerError(response.status().as_u16()));
        }
        let body: IpLookupResponse = response.json().await?;
        let code = body
            .country_code
            .ok_or_else(|| BackendError::DecodingError("missing country_code".into()))?;
        let code = validation::normalize_country_code(&code)
            .map_err(|e| BackendError::DecodingError(e.to_string()))?;
        Ok(match body.country_name {
            Some(name) if !name.trim().is_empty() => Country::new(&code, &name),
            _ => Country::from_code(&code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_server;

    async fn detect_with(status: u16, body: &str) -> (Result<Country, BackendError>, test_server::RequestLog) {
        let (url, log) = test_server::serve(vec![(status, body.to_string())]).await;
        let geolocator = IpGeolocator::new(&format!("{}/json/", url)).unwrap();
        (geolocator.detect_country().await, log)
    }

    #[tokio::test]
    async fn test_detects_country_from_lookup() {
        let (result, log) =
            detect_with(200, r#"{"country_code":"de","country_name":"Deutschland","ip":"1.2.3.4"}"#).await;
        assert_eq!(result.unwrap(), Country::new("DE", "Deutschland"));
        let requests = log.lock().unwrap().clone();
        let request = &requests[0];
        assert_eq!(request.method, "GET");
        assert_eq!(request.target, "/json/");
    }

    #[tokio::test]
    async fn test_blank_name_falls_back_to_known_name() {
        let (result, _) = detect_with(200, r#"{"country_code":"IL","country_name":"  "}"#).await;
        assert_eq!(result.unwrap(), Country::new("IL", "Israel"));
    }

    #[tokio::test]
    async fn test_missing_code_is_decoding_error() {
        let (result, _) = detect_with(200, r#"{"error":true,"reason":"RateLimited"}"#).await;
        assert!(matches!(result, Err(BackendError::DecodingError(_))));
    }

    #[tokio::test]
    async fn test_rejected_lookup_is_server_error() {
        let (result, _) = detect_with(429, r#"{"error":true}"#).await;
        assert!(matches!(result, Err(BackendError::ServerError(429))));
    }
}
