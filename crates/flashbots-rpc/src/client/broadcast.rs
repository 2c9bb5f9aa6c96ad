use std::sync::Arc;

use alloy_signer_local::PrivateKeySigner;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use tokio::sync::mpsc;
use tracing::{debug, error};
use url::Url;

use crate::client::body::{make_signed_body, SignedBody};
use crate::client::options::ClientOptions;
use crate::client::relay::{decode_result, FlashbotsRpc, RelayError};

/// Outcome of one endpoint in a broadcast.
#[derive(Debug)]
pub struct BroadcastResponse<R> {
    pub url: Url,
    pub result: Result<R, RelayError>,
}

impl BroadcastResponse<Box<RawValue>> {
    /// Decodes a successful raw result, keeping errors as they are.
    pub fn decode<R: DeserializeOwned>(self) -> BroadcastResponse<R> {
        BroadcastResponse { url: self.url, result: self.result.and_then(decode_result) }
    }
}

impl<R> BroadcastResponse<R> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Sends one signed request to a fixed set of builder endpoints at once.
///
/// The body is signed a single time and the same bytes and signature go to
/// every endpoint. Each endpoint gets exactly one attempt and its failure
/// only affects its own [`BroadcastResponse`].
#[derive(Clone, Debug)]
pub struct BuilderBroadcaster {
    clients: Vec<Arc<FlashbotsRpc>>,
}

impl BuilderBroadcaster {
    pub fn new<I, S>(urls: I) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_options(urls, ClientOptions::default())
    }

    pub fn with_options<I, S>(urls: I, options: ClientOptions) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let transport = options.transport()?;
        let headers = options.header_map()?;

        let clients = urls
            .into_iter()
            .map(|url| {
                let url = Url::parse(url.as_ref())?;
                Ok(Arc::new(FlashbotsRpc::from_parts(url, transport.clone(), headers.clone(), &options)))
            })
            .collect::<Result<Vec<_>, RelayError>>()?;

        Ok(Self { clients })
    }

    pub fn urls(&self) -> impl Iterator<Item = &Url> {
        self.clients.iter().map(|client| client.url())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Signs `method(params)` once and delivers it to every endpoint.
    ///
    /// Returns `Err` only when the request cannot be serialized or signed, in
    /// which case nothing was sent. Otherwise there is one response per
    /// endpoint, in completion order.
    pub async fn broadcast_request<P: Serialize>(
        &self,
        method: &str,
        params: P,
        signer: &PrivateKeySigner,
    ) -> Result<Vec<BroadcastResponse<Box<RawValue>>>, RelayError> {
        let signed = make_signed_body(method, params, signer)?;
        Ok(self.broadcast_signed(Arc::new(signed)).await)
    }

    /// Delivers an already signed body to every endpoint.
    pub async fn broadcast_signed(&self, signed: Arc<SignedBody>) -> Vec<BroadcastResponse<Box<RawValue>>> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = Vec::with_capacity(self.clients.len());

        for client in self.clients.iter() {
            let client = client.clone();
            let signed = signed.clone();
            let tx = tx.clone();
            let url = client.url().clone();

            let task = tokio::task::spawn(async move {
                debug!(url = %client.url(), method = %signed.method, "sending to endpoint");
                let result = client.send_signed(&signed).await;
                match &result {
                    Ok(_) => debug!(url = %client.url(), method = %signed.method, "endpoint accepted"),
                    Err(e) => error!(url = %client.url(), method = %signed.method, "endpoint error : {e}"),
                }
                // the receiver outlives every sender
                let _ = tx.send(BroadcastResponse { url: client.url().clone(), result });
            });
            tasks.push((url, task));
        }
        // the channel closes once the last task drops its sender
        drop(tx);

        let mut responses = Vec::with_capacity(self.clients.len());
        while let Some(response) = rx.recv().await {
            responses.push(response);
        }

        for (url, task) in tasks {
            if let Err(e) = task.await {
                error!(%url, "endpoint task failed : {e}");
                responses.push(BroadcastResponse { url, result: Err(RelayError::Task(e.to_string())) });
            }
        }

        responses
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::body::signer_from_hex;
    use crate::test_utils::{init_logs, recover_header_signer, TEST_KEY};

    async fn endpoint(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(response).mount(&server).await;
        server
    }

    fn ok_bundle() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","result":{"bundleHash":"0xdeadbeef"}}"#)
    }

    #[tokio::test]
    async fn every_endpoint_gets_an_outcome() -> eyre::Result<()> {
        init_logs();
        let servers = vec![
            endpoint(ok_bundle()).await,
            endpoint(ok_bundle().set_delay(Duration::from_millis(300))).await,
            endpoint(ResponseTemplate::new(400).set_body_string(r#"{"error":"block param must be a hex int"}"#)).await,
            endpoint(ResponseTemplate::new(200).set_body_string("not json")).await,
            endpoint(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"jsonrpc":"2.0","error":{"code":-32000,"message":"bundle too large"}}"#))
                .await,
        ];
        let mut urls: Vec<String> = servers.iter().map(|s| s.uri()).collect();
        urls.push("http://127.0.0.1:1".to_string());

        let signer = signer_from_hex(TEST_KEY)?;
        let broadcaster = BuilderBroadcaster::new(&urls)?;
        let responses = broadcaster.broadcast_request("eth_sendBundle", [serde_json::json!({"txs":["0xAA"]})], &signer).await?;

        assert_eq!(responses.len(), urls.len());
        let answered: HashSet<String> = responses.iter().map(|r| r.url.to_string()).collect();
        let expected: HashSet<String> = urls.iter().map(|u| Url::parse(u).unwrap().to_string()).collect();
        assert_eq!(answered, expected);

        let by_url = |uri: &str| responses.iter().find(|r| r.url == Url::parse(uri).unwrap()).unwrap();
        assert_eq!(by_url(&urls[0]).result.as_ref().unwrap().get(), r#"{"bundleHash":"0xdeadbeef"}"#);
        assert!(by_url(&urls[1]).is_ok());
        assert!(matches!(&by_url(&urls[2]).result, Err(RelayError::Relay { message }) if message == "block param must be a hex int"));
        assert!(matches!(&by_url(&urls[3]).result, Err(RelayError::Protocol { .. })));
        assert!(matches!(&by_url(&urls[4]).result, Err(RelayError::Relay { message }) if message == "bundle too large"));
        assert!(matches!(&by_url(&urls[5]).result, Err(RelayError::Transport(_))));
        Ok(())
    }

    #[tokio::test]
    async fn slow_endpoint_does_not_hide_others() -> eyre::Result<()> {
        let slow = endpoint(ok_bundle().set_delay(Duration::from_secs(5))).await;
        let fast = vec![endpoint(ok_bundle()).await, endpoint(ok_bundle()).await, endpoint(ok_bundle()).await];

        let mut urls: Vec<String> = fast.iter().map(|s| s.uri()).collect();
        urls.insert(1, slow.uri());

        let signer = signer_from_hex(TEST_KEY)?;
        let options = ClientOptions::new().with_timeout(Duration::from_millis(500));
        let broadcaster = BuilderBroadcaster::with_options(&urls, options)?;
        let responses = broadcaster.broadcast_request("eth_sendBundle", [(); 0], &signer).await?;

        assert_eq!(responses.len(), 4);
        assert_eq!(responses.iter().filter(|r| r.is_ok()).count(), 3);
        let failed = responses.iter().find(|r| !r.is_ok()).unwrap();
        assert_eq!(failed.url, Url::parse(&slow.uri())?);
        assert!(matches!(failed.result, Err(RelayError::Transport(_))));
        Ok(())
    }

    #[tokio::test]
    async fn signature_is_shared_by_all_endpoints() -> eyre::Result<()> {
        let servers = vec![endpoint(ok_bundle()).await, endpoint(ok_bundle()).await, endpoint(ok_bundle()).await];
        let urls: Vec<String> = servers.iter().map(|s| s.uri()).collect();

        let signer = signer_from_hex(TEST_KEY)?;
        let broadcaster = BuilderBroadcaster::with_options(&urls, ClientOptions::new().with_header("X-Searcher", "searcher-7"))?;
        broadcaster.broadcast_request("eth_sendBundle", [serde_json::json!({"blockNumber":"0x1"})], &signer).await?;

        let mut seen = HashSet::new();
        for server in servers.iter() {
            let requests = server.received_requests().await.unwrap();
            assert_eq!(requests.len(), 1);
            let request = &requests[0];
            assert_eq!(request.headers.get("x-searcher").unwrap(), "searcher-7");
            let signature = request.headers.get("x-flashbots-signature").unwrap().to_str()?.to_string();
            assert_eq!(recover_header_signer(&request.body, &signature), signer.address());
            seen.insert((request.body.clone(), signature));
        }
        assert_eq!(seen.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn signing_failure_sends_nothing() -> eyre::Result<()> {
        let server = endpoint(ok_bundle()).await;
        let broadcaster = BuilderBroadcaster::new([server.uri()])?;
        let signer = signer_from_hex(TEST_KEY)?;

        struct Unserializable;
        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }

        let err = broadcaster.broadcast_request("eth_sendBundle", [Unserializable], &signer).await.unwrap_err();
        assert!(matches!(err, RelayError::RequestSerdeJson(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_endpoint_set() -> eyre::Result<()> {
        let broadcaster = BuilderBroadcaster::new(Vec::<String>::new())?;
        assert!(broadcaster.is_empty());
        let signer = signer_from_hex(TEST_KEY)?;
        let responses = broadcaster.broadcast_request("eth_sendBundle", [(); 0], &signer).await?;
        assert!(responses.is_empty());
        Ok(())
    }
}
