//! HTTP directory client
//!
//! Talks to the directory service mounted under the notebook server at
//! `<base_url>/<namespace>/<endpoint>`.

use async_trait::async_trait;
use genvlab_core::{
    ActivateRequest, Device, Environment, GenvError, GenvResult, ServerConfig,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::body::Payload;
use crate::traits::Directory;

/// Directory client backed by reqwest
pub struct HttpDirectory {
    /// HTTP client
    client: reqwest::Client,
    /// Namespace root, without trailing slash
    base_url: String,
    /// Server token
    token: Option<String>,
}

impl HttpDirectory {
    /// Create a new client from server settings
    pub fn new(config: &ServerConfig) -> GenvResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GenvError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: join_url(&config.base_url, &config.namespace),
            token: config.token.clone(),
        })
    }

    /// Full URL of an endpoint
    pub fn url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(endpoint));
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("token {}", token));
        }
        request
    }

    /// Send a request and classify the response body
    async fn send(&self, request: RequestBuilder) -> GenvResult<Payload> {
        let response = request
            .send()
            .await
            .map_err(|e| GenvError::Network(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| GenvError::Network(e.to_string()))?;
        let payload = Payload::parse(raw);

        debug!(status = %status, bytes = payload.raw().len(), "Directory response");

        check_status(status, payload)
    }
}

fn check_status(status: StatusCode, payload: Payload) -> GenvResult<Payload> {
    if status.is_success() {
        Ok(payload)
    } else {
        Err(GenvError::Response {
            status: status.as_u16(),
            message: payload.error_message(),
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn list_devices(&self) -> GenvResult<Vec<Device>> {
        debug!("Listing devices");
        self.send(self.request(Method::GET, "devices"))
            .await?
            .into_devices()
    }

    async fn list_environments(&self) -> GenvResult<Vec<Environment>> {
        debug!("Listing environments");
        self.send(self.request(Method::GET, "envs"))
            .await?
            .into_environments()
    }

    async fn find_binding(&self, kernel_id: &str) -> GenvResult<Option<String>> {
        debug!(kernel_id = %kernel_id, "Finding binding");
        let request = self
            .request(Method::GET, "find")
            .query(&[("kernel_id", kernel_id)]);
        self.send(request).await?.into_binding()
    }

    async fn activate_binding(&self, kernel_id: &str, eid: &str) -> GenvResult<()> {
        debug!(kernel_id = %kernel_id, eid = %eid, "Activating binding");
        let body = ActivateRequest {
            eid: eid.to_string(),
            kernel_id: kernel_id.to_string(),
        };
        self.send(self.request(Method::POST, "activate").json(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ServerConfig {
        ServerConfig {
            base_url: base_url.to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let directory = HttpDirectory::new(&config("http://localhost:8888/")).unwrap();
        assert_eq!(directory.url("envs"), "http://localhost:8888/jupyterlab-genv/envs");

        let directory = HttpDirectory::new(&config("http://host/user/bob")).unwrap();
        assert_eq!(
            directory.url("/devices"),
            "http://host/user/bob/jupyterlab-genv/devices"
        );
    }

    #[test]
    fn test_check_status() {
        let ok = check_status(StatusCode::OK, Payload::Empty).unwrap();
        assert_eq!(ok, Payload::Empty);

        let err = check_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            Payload::parse(r#"{"message":"disk full"}"#.to_string()),
        )
        .unwrap_err();
        match err {
            GenvError::Response { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
