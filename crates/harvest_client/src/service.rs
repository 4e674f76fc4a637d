use std::time::Duration;

use console_logging::{console_debug, console_warn};
use harvest_core::{Agronomist, AssignmentCommand, HarvestRequest};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{FailureKind, ServiceError};

const REQUESTS_PATH: &str = "harvest/requests";
const AGRONOMISTS_PATH: &str = "agronomists";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Bearer token of the signed-in administrator.
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The remote harvest service, as far as this console depends on it.
#[async_trait::async_trait]
pub trait HarvestService: Send + Sync {
    async fn fetch_requests(&self) -> Result<Vec<HarvestRequest>, ServiceError>;

    async fn fetch_available_agronomists(&self) -> Result<Vec<Agronomist>, ServiceError>;

    async fn assign(
        &self,
        request_id: &str,
        command: &AssignmentCommand,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHarvestService {
    settings: ClientSettings,
}

impl ReqwestHarvestService {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ServiceError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ServiceError> {
        let client = self.build_client()?;
        console_debug!("{} {}", method, url);

        let mut request = client.request(method.clone(), url.clone());
        if let Some(token) = &self.settings.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = server_message(&bytes).unwrap_or_else(|| status.to_string());
            console_warn!("{} {} failed with {}: {}", method, url, status, message);
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl HarvestService for ReqwestHarvestService {
    async fn fetch_requests(&self) -> Result<Vec<HarvestRequest>, ServiceError> {
        let url = self.endpoint(REQUESTS_PATH)?;
        let bytes = self.send(Method::GET, url, None).await?;
        decode_collection(&bytes, &["data", "requests"])
    }

    async fn fetch_available_agronomists(&self) -> Result<Vec<Agronomist>, ServiceError> {
        let mut url = self.endpoint(AGRONOMISTS_PATH)?;
        url.query_pairs_mut().append_pair("availability", "true");
        let bytes = self.send(Method::GET, url, None).await?;
        decode_collection(&bytes, &["data", "agronomists"])
    }

    async fn assign(
        &self,
        request_id: &str,
        command: &AssignmentCommand,
    ) -> Result<(), ServiceError> {
        let mut url = self.endpoint(REQUESTS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::new(FailureKind::InvalidUrl, "base url cannot take a path"))?
            .push(request_id)
            .push("assign");
        let body = serde_json::to_vec(command)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
        self.send(Method::POST, url, Some(body)).await?;
        Ok(())
    }
}

/// Accepts a bare JSON array or an object wrapping it under one of `keys`.
/// Elements that do not decode are dropped with a warning; the rest are kept.
fn decode_collection<T: DeserializeOwned>(
    bytes: &[u8],
    keys: &[&str],
) -> Result<Vec<T>, ServiceError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => keys
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                ServiceError::new(
                    FailureKind::Decode,
                    format!("expected an array under one of {keys:?}"),
                )
            })?,
        _ => {
            return Err(ServiceError::new(
                FailureKind::Decode,
                "expected a JSON array",
            ))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = record_id(&item).unwrap_or_else(|| format!("#{index}"));
            match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    console_warn!("Skipping malformed record {}: {}", id, err);
                    None
                }
            }
        })
        .collect())
}

fn record_id(item: &Value) -> Option<String> {
    ["id", "_id"]
        .iter()
        .find_map(|key| match item.get(*key)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
}

/// The `message` field of an error body, if the server sent one.
fn server_message(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToOwned::to_owned)
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
