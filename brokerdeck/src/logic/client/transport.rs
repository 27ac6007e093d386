use crate::logic::client::gateway::{GatewayError, Method, Transport};
use crate::logic::client::url_utils::endpoint_url;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed transport rooted at the management service URL
pub struct HttpTransport {
    client: Client,
    root: String,
}

impl HttpTransport {
    pub fn new(root: String, timeout: Duration) -> anyhow::Result<Self> {
        // fail on a malformed root now rather than on every request
        endpoint_url(&root, "/")
            .map_err(|e| anyhow::anyhow!("invalid service URL `{}`: {}", root, e))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, root })
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String, GatewayError> {
        let url = endpoint_url(&self.root, path).map_err(|e| GatewayError::network(e.to_string()))?;

        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        }
        .header(CONTENT_TYPE, "application/json");
        let request = match body {
            Some(json) => request.body(json),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // refusals come back as 400 with a JSON body the caller still needs
            debug!(%status, path, "non-success status from service");
        }

        response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("failed to read response body: {}", e)))
    }
}
