use std::str::FromStr;

use alloy_primitives::{hex, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde::Serialize;
use tracing::trace;

use crate::client::jsonrpc::Request;
use crate::client::RelayError;

/// A serialized request envelope together with its `X-Flashbots-Signature`
/// header value. The signature is only valid for these exact bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBody {
    pub method: String,
    pub body: String,
    pub signature: String,
}

/// Signs a request body the way the relay authenticates searchers:
/// `address:0x<sig>` where `sig` is the EIP-191 signature over the hex
/// string of `keccak256(body)`.
pub fn sign_body(body: &[u8], signer: &PrivateKeySigner) -> Result<String, RelayError> {
    let body_hash = hex::encode_prefixed(keccak256(body));
    trace!(%body_hash, "signing request body");

    let signature = signer.sign_message_sync(body_hash.as_bytes()).map_err(RelayError::Signing)?;
    Ok(format!("{}:{}", signer.address(), hex::encode_prefixed(signature.as_bytes())))
}

/// Serializes the envelope once and signs the resulting bytes.
pub fn make_signed_body<P: Serialize>(method: &str, params: P, signer: &PrivateKeySigner) -> Result<SignedBody, RelayError> {
    let body = Request::new(method, params).to_body()?;
    let signature = sign_body(body.as_bytes(), signer)?;

    Ok(SignedBody { method: method.to_string(), body, signature })
}

/// Parses a hex private key, with or without the `0x` prefix.
pub fn signer_from_hex(key: &str) -> Result<PrivateKeySigner, RelayError> {
    PrivateKeySigner::from_str(key.trim()).map_err(|e| RelayError::Signing(alloy_signer::Error::other(e)))
}
