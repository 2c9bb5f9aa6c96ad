use std::sync::Arc;

use alloy_signer_local::PrivateKeySigner;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Error as ReqwestError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use crate::client::body::{make_signed_body, SignedBody};
use crate::client::jsonrpc::{decode_response, decode_signed_response, JsonRpcError, Request};
use crate::client::logger::{RequestLog, RequestLogger};
use crate::client::options::ClientOptions;
use crate::client::transport::HttpTransport;

pub const FLASHBOTS_SIGNATURE_HEADER: HeaderName = HeaderName::from_static("x-flashbots-signature");

/// Errors for relay and node requests.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection, DNS, timeout or body read failure.
    #[error(transparent)]
    Transport(#[from] ReqwestError),
    /// The response is not JSON in any expected shape.
    #[error("Deserialization error: {err}. Response: {text}")]
    Protocol { err: serde_json::Error, text: String },
    /// The relay understood the request and rejected it.
    #[error("relay error response: {message}")]
    Relay { message: String },
    /// A node answered a plain request with a JSON-RPC error.
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),
    /// The request could not be signed.
    #[error(transparent)]
    Signing(alloy_signer::Error),
    /// The request could not be serialized.
    #[error(transparent)]
    RequestSerdeJson(serde_json::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid header {0}")]
    InvalidHeader(String),
    #[error("Invalid hex value {value:?}: {reason}")]
    InvalidHex { value: String, reason: String },
    /// An endpoint task ended without reporting an outcome.
    #[error("Endpoint task failed: {0}")]
    Task(String),
}

impl RelayError {
    /// True when the remote side rejected the input, as opposed to a local,
    /// network or encoding failure.
    pub fn is_relay_error(&self) -> bool {
        matches!(self, RelayError::Relay { .. })
    }
}

pub(crate) fn decode_result<R: DeserializeOwned>(raw: Box<RawValue>) -> Result<R, RelayError> {
    serde_json::from_str(raw.get()).map_err(|err| RelayError::Protocol { err, text: raw.get().to_string() })
}

/// JSON-RPC client for one node or relay endpoint.
///
/// Plain calls go through [`FlashbotsRpc::call`]. Relay methods are signed
/// with the caller's key and carry the `X-Flashbots-Signature` header.
#[derive(Clone, Debug)]
pub struct FlashbotsRpc {
    url: Url,
    transport: HttpTransport,
    headers: HeaderMap,
    debug: bool,
    logger: Arc<dyn RequestLogger>,
}

impl FlashbotsRpc {
    pub fn new(url: &str) -> Result<Self, RelayError> {
        Self::with_options(url, ClientOptions::default())
    }

    pub fn with_options(url: &str, options: ClientOptions) -> Result<Self, RelayError> {
        let transport = options.transport()?;
        let headers = options.header_map()?;
        Ok(Self::from_parts(Url::parse(url)?, transport, headers, &options))
    }

    pub(crate) fn from_parts(url: Url, transport: HttpTransport, static_headers: HeaderMap, options: &ClientOptions) -> Self {
        let mut headers = HeaderMap::with_capacity(static_headers.len() + 2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.extend(static_headers);

        Self { url, transport, headers, debug: options.debug, logger: options.logger.clone() }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends an unsigned request and returns the raw `result`.
    pub async fn call<P: Serialize>(&self, method: &str, params: P) -> Result<Box<RawValue>, RelayError> {
        let body = Request::new(method, params).to_body()?;
        let text = self.post(method, body, None).await?;
        decode_response(&text)
    }

    /// Signs the request with `signer` and returns the raw `result`.
    pub async fn call_signed<P: Serialize>(&self, method: &str, params: P, signer: &PrivateKeySigner) -> Result<Box<RawValue>, RelayError> {
        let signed = make_signed_body(method, params, signer)?;
        self.send_signed(&signed).await
    }

    /// Sends a body that was already signed, e.g. by a broadcaster.
    pub async fn send_signed(&self, signed: &SignedBody) -> Result<Box<RawValue>, RelayError> {
        let text = self.post(&signed.method, signed.body.clone(), Some(&signed.signature)).await?;
        decode_signed_response(&text)
    }

    pub(crate) async fn request<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R, RelayError> {
        decode_result(self.call(method, params).await?)
    }

    pub(crate) async fn request_signed<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
        signer: &PrivateKeySigner,
    ) -> Result<R, RelayError> {
        decode_result(self.call_signed(method, params, signer).await?)
    }

    async fn post(&self, method: &str, body: String, signature: Option<&str>) -> Result<String, RelayError> {
        let mut headers = self.headers.clone();
        if let Some(signature) = signature {
            let value = HeaderValue::from_str(signature).map_err(|e| RelayError::InvalidHeader(format!("{FLASHBOTS_SIGNATURE_HEADER}: {e}")))?;
            headers.insert(FLASHBOTS_SIGNATURE_HEADER, value);
        }

        trace!(url = %self.url, method, "posting request");
        let request = if self.debug { Some(body.clone()) } else { None };
        let response = self.transport.post(&self.url, body, headers).await?;
        if !response.status.is_success() {
            debug!(url = %self.url, method, status = %response.status, "non-success status");
        }

        if let Some(request) = request {
            self.logger.log(&RequestLog { url: self.url.as_str(), method, request: &request, signature, response: &response.text });
        }

        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::body::signer_from_hex;
    use crate::test_utils::{init_logs, recover_header_signer, TEST_KEY};

    #[derive(Debug, Default)]
    struct CapturingLogger {
        entries: Mutex<Vec<(String, Option<String>, String)>>,
    }

    impl RequestLogger for CapturingLogger {
        fn log(&self, entry: &RequestLog<'_>) {
            self.entries.lock().unwrap().push((entry.method.to_string(), entry.signature.map(str::to_string), entry.response.to_string()));
        }
    }

    #[tokio::test]
    async fn signed_call_returns_result() -> eyre::Result<()> {
        init_logs();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(header("x-builder", "rbuilder"))
            .and(header_exists("x-flashbots-signature"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":{"bundleHash":"0xdeadbeef"}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let signer = signer_from_hex(TEST_KEY)?;
        let client = FlashbotsRpc::with_options(&server.uri(), ClientOptions::new().with_header("x-builder", "rbuilder"))?;
        let raw = client.call_signed("eth_sendBundle", [serde_json::json!({"txs":["0xAA"],"blockNumber":"0xCAFE08"})], &signer).await?;
        assert_eq!(raw.get(), r#"{"bundleHash":"0xdeadbeef"}"#);

        let requests = server.received_requests().await.unwrap();
        let request = &requests[0];
        let signature = request.headers.get("x-flashbots-signature").unwrap().to_str()?;
        assert_eq!(recover_header_signer(&request.body, signature), signer.address());
        Ok(())
    }

    #[tokio::test]
    async fn flat_error_is_relay_error() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"block param must be a hex int"}"#))
            .mount(&server)
            .await;

        let signer = signer_from_hex(TEST_KEY)?;
        let client = FlashbotsRpc::new(&server.uri())?;
        let err = client.call_signed("eth_sendBundle", [serde_json::json!({"blockNumber":"latest"})], &signer).await.unwrap_err();
        match err {
            RelayError::Relay { message } => assert_eq!(message, "block param must be a hex int"),
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn plain_call_has_no_signature() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":"0x10"}"#))
            .mount(&server)
            .await;

        let client = FlashbotsRpc::new(&server.uri())?;
        let raw = client.call("eth_blockNumber", [(); 0]).await?;
        assert_eq!(raw.get(), r#""0x10""#);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("x-flashbots-signature").is_none());
        assert_eq!(requests[0].body, br#"{"id":1,"jsonrpc":"2.0","method":"eth_blockNumber","params":[]}"#);
        Ok(())
    }

    #[tokio::test]
    async fn timeout_is_transport_error() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":true}"#).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = FlashbotsRpc::with_options(&server.uri(), ClientOptions::new().with_timeout(Duration::from_millis(200)))?;
        let err = client.call("net_listening", [(); 0]).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
        assert!(!err.is_relay_error());
        Ok(())
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() -> eyre::Result<()> {
        let signer = signer_from_hex(TEST_KEY)?;
        let client = FlashbotsRpc::new("http://127.0.0.1:1")?;
        let err = client.call_signed("eth_sendBundle", [(); 0], &signer).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
        Ok(())
    }

    #[tokio::test]
    async fn debug_mode_logs_exchange() -> eyre::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":true}"#))
            .mount(&server)
            .await;

        let logger = Arc::new(CapturingLogger::default());
        let signer = signer_from_hex(TEST_KEY)?;

        let quiet = FlashbotsRpc::with_options(&server.uri(), ClientOptions::new().with_logger(logger.clone()))?;
        quiet.call_signed("eth_cancelPrivateTransaction", [(); 0], &signer).await?;
        assert!(logger.entries.lock().unwrap().is_empty());

        let verbose = FlashbotsRpc::with_options(&server.uri(), ClientOptions::new().with_debug(true).with_logger(logger.clone()))?;
        verbose.call_signed("eth_cancelPrivateTransaction", [(); 0], &signer).await?;

        let entries = logger.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "eth_cancelPrivateTransaction");
        assert!(entries[0].1.as_deref().unwrap().starts_with("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266:0x"));
        assert_eq!(entries[0].2, r#"{"id":1,"jsonrpc":"2.0","result":true}"#);
        Ok(())
    }

    #[test]
    fn invalid_url() {
        assert!(matches!(FlashbotsRpc::new("not a url"), Err(RelayError::InvalidUrl(_))));
    }
}
