pub use client::{
    decode_response, decode_signed_response, make_signed_body, sign_body, signer_from_hex, BroadcastResponse, BuilderBroadcaster, ClientOptions,
    FlashbotsRpc, HttpTransport, JsonRpcError, NoopLogger, RelayError, RelayErrorResponse, RequestLog, RequestLogger, SignedBody, TracingLogger,
    TransportResponse, DEFAULT_TIMEOUT, FLASHBOTS_SIGNATURE_HEADER,
};
pub use config::{BroadcasterConfig, ClientConfig, EndpointConfig, EndpointParams, EnvSignerConfig, RpcConfig, SignerConfig};
pub use types::*;
pub use utils::ETH1;

pub mod client;
mod config;
mod eth;
mod flashbots;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;
