//! Compute Engine REST transport

use std::time::Duration;

use async_trait::async_trait;
use reimage_models::{Disk, Image, Instance, ListResponse, Location, Operation};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::IaasError;
use crate::provider::ComputeApi;

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials and endpoint for the REST client
#[derive(Clone)]
pub struct GcpCredentials {
    /// OAuth2 bearer token for the compute scope
    pub access_token: String,
    pub endpoint: String,
}

impl std::fmt::Debug for GcpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpCredentials")
            .field("access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Immutable handle over the Compute Engine v1 REST API
pub struct GcpComputeApi {
    http: reqwest::Client,
    endpoint: String,
}

impl GcpComputeApi {
    pub fn new(credentials: GcpCredentials) -> Result<Self, IaasError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|e| IaasError::Config(format!("access token is not a valid header value: {}", e)))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IaasError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            http,
            endpoint: credentials.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn zonal(&self, location: &Location, path: &str) -> String {
        format!(
            "{}/projects/{}/zones/{}/{}",
            self.endpoint, location.project, location.zone, path
        )
    }

    fn global(&self, location: &Location, path: &str) -> String {
        format!("{}/projects/{}/global/{}", self.endpoint, location.project, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, IaasError> {
        let response = request
            .send()
            .await
            .map_err(|e| IaasError::transport(format!("{} request failed", what), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IaasError::transport(format!("{} response could not be read", what), e))?;

        if !status.is_success() {
            return Err(api_error(status, what, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| IaasError::transport(format!("{} returned an unexpected body", what), e))
    }

    async fn list_all<T: DeserializeOwned>(&self, url: String, what: &str) -> Result<Vec<T>, IaasError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&url);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: ListResponse<T> = self.send(request, what).await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(items),
            }
        }
    }

    /// Action POSTs carry no body; the front end answers 411 unless the length is explicit
    fn empty_post(&self, url: String) -> RequestBuilder {
        self.http.post(url).header(CONTENT_LENGTH, HeaderValue::from_static("0"))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn api_error(status: StatusCode, what: &str, body: &str) -> IaasError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == StatusCode::NOT_FOUND {
        return IaasError::NotFound {
            resource: "resource",
            filter: format!("{} ({})", what, message),
        };
    }
    IaasError::transport(format!("{} returned {}", what, status), message)
}

#[async_trait]
impl ComputeApi for GcpComputeApi {
    async fn list_instances(&self, location: &Location) -> Result<Vec<Instance>, IaasError> {
        self.list_all(self.zonal(location, "instances"), "list instances").await
    }

    async fn list_disks(&self, location: &Location) -> Result<Vec<Disk>, IaasError> {
        self.list_all(self.zonal(location, "disks"), "list disks").await
    }

    async fn get_instance(&self, location: &Location, name: &str) -> Result<Instance, IaasError> {
        let url = self.zonal(location, &format!("instances/{}", name));
        self.send(self.http.get(url), &format!("get instance {}", name)).await
    }

    async fn insert_instance(&self, location: &Location, instance: &Instance) -> Result<Operation, IaasError> {
        let request = self.http.post(self.zonal(location, "instances")).json(instance);
        self.send(request, &format!("insert instance {}", instance.name)).await
    }

    async fn delete_instance(&self, location: &Location, name: &str) -> Result<Operation, IaasError> {
        let url = self.zonal(location, &format!("instances/{}", name));
        self.send(self.http.delete(url), &format!("delete instance {}", name)).await
    }

    async fn stop_instance(&self, location: &Location, name: &str) -> Result<Operation, IaasError> {
        let url = self.zonal(location, &format!("instances/{}/stop", name));
        self.send(self.empty_post(url), &format!("stop instance {}", name)).await
    }

    async fn delete_access_config(
        &self,
        location: &Location,
        instance: &str,
        access_config: &str,
        network_interface: &str,
    ) -> Result<Operation, IaasError> {
        let url = self.zonal(location, &format!("instances/{}/deleteAccessConfig", instance));
        let request = self
            .empty_post(url)
            .query(&[("accessConfig", access_config), ("networkInterface", network_interface)]);
        self.send(request, &format!("delete access config on {}", instance)).await
    }

    async fn insert_image(&self, location: &Location, image: &Image) -> Result<Operation, IaasError> {
        let request = self.http.post(self.global(location, "images")).json(image);
        self.send(request, &format!("insert image {}", image.name)).await
    }

    async fn get_image(&self, location: &Location, name: &str) -> Result<Image, IaasError> {
        let url = self.global(location, &format!("images/{}", name));
        self.send(self.http.get(url), &format!("get image {}", name)).await
    }
}
