use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::client::logger::{RequestLogger, TracingLogger};
use crate::client::transport::{HttpTransport, DEFAULT_TIMEOUT};
use crate::client::RelayError;

/// Settings shared by [`FlashbotsRpc`](crate::FlashbotsRpc) and
/// [`BuilderBroadcaster`](crate::BuilderBroadcaster).
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Per-call timeout. Ignored when `http_client` is set.
    pub timeout: Duration,
    /// Hand every exchange to `logger`.
    pub debug: bool,
    pub logger: Arc<dyn RequestLogger>,
    pub http_client: Option<Client>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { headers: BTreeMap::new(), timeout: DEFAULT_TIMEOUT, debug: false, logger: Arc::new(TracingLogger), http_client: None }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub(crate) fn transport(&self) -> Result<HttpTransport, RelayError> {
        match &self.http_client {
            Some(client) => Ok(HttpTransport::with_client(client.clone())),
            None => HttpTransport::new(self.timeout),
        }
    }

    pub(crate) fn header_map(&self) -> Result<HeaderMap, RelayError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| RelayError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| RelayError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}
