//! Signed and unsigned JSON-RPC transport for nodes, relays and builders.
pub use body::{make_signed_body, sign_body, signer_from_hex, SignedBody};
pub use broadcast::{BroadcastResponse, BuilderBroadcaster};
pub use jsonrpc::{decode_response, decode_signed_response, JsonRpcError, RelayErrorResponse};
pub use logger::{NoopLogger, RequestLog, RequestLogger, TracingLogger};
pub use options::ClientOptions;
pub use relay::{FlashbotsRpc, RelayError, FLASHBOTS_SIGNATURE_HEADER};
pub use transport::{HttpTransport, TransportResponse, DEFAULT_TIMEOUT};

mod body;
mod broadcast;
mod jsonrpc;
mod logger;
mod options;
mod relay;
mod transport;
