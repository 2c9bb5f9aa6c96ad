use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::trace;
use url::Url;

use crate::client::RelayError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw reply of one POST: status and the undecoded body.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub text: String,
}

/// HTTP POST transport shared by every client built from the same options.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Every call made through the transport is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn post(&self, url: &Url, body: String, headers: HeaderMap) -> Result<TransportResponse, RelayError> {
        let res = self.client.post(url.as_str()).headers(headers).body(body).send().await?;
        let status = res.status();
        let text = res.text().await?;
        trace!(%url, %status, "response received");

        Ok(TransportResponse { status, text })
    }
}
