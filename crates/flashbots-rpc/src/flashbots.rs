use std::sync::Arc;

use alloy_primitives::TxHash;
use alloy_signer_local::PrivateKeySigner;
use tracing::debug;

use crate::client::{make_signed_body, BroadcastResponse, BuilderBroadcaster, FlashbotsRpc, RelayError};
use crate::types::{
    BlockSimulation, BundleStats, BundleStatsV2, CallBundleRequest, CallBundleResponse, CancelPrivateTransactionRequest, GetBundleStatsRequest,
    SendBundleRequest, SendBundleResponse, SendPrivateTransactionRequest, UserStats,
};
use crate::utils::u64_to_hex;

/// Relay methods, signed with the searcher's key.
impl FlashbotsRpc {
    /// Simulates a bundle against a given state block.
    pub async fn call_bundle(&self, signer: &PrivateKeySigner, request: &CallBundleRequest) -> Result<CallBundleResponse, RelayError> {
        self.request_signed("eth_callBundle", [request], signer).await
    }

    /// Submits a bundle for inclusion in its target block.
    pub async fn send_bundle(&self, signer: &PrivateKeySigner, request: &SendBundleRequest) -> Result<SendBundleResponse, RelayError> {
        self.request_signed("eth_sendBundle", [request], signer).await
    }

    /// Reputation and payment statistics of the signing key.
    pub async fn get_user_stats(&self, signer: &PrivateKeySigner, block_number: u64) -> Result<UserStats, RelayError> {
        self.request_signed("flashbots_getUserStats", [u64_to_hex(block_number)], signer).await
    }

    pub async fn get_bundle_stats(&self, signer: &PrivateKeySigner, request: &GetBundleStatsRequest) -> Result<BundleStats, RelayError> {
        self.request_signed("flashbots_getBundleStats", [request], signer).await
    }

    pub async fn get_bundle_stats_v2(&self, signer: &PrivateKeySigner, request: &GetBundleStatsRequest) -> Result<BundleStatsV2, RelayError> {
        self.request_signed("flashbots_getBundleStatsV2", [request], signer).await
    }

    pub async fn send_private_transaction(&self, signer: &PrivateKeySigner, request: &SendPrivateTransactionRequest) -> Result<TxHash, RelayError> {
        self.request_signed("eth_sendPrivateTransaction", [request], signer).await
    }

    /// Returns `true` when the relay dropped the transaction.
    pub async fn cancel_private_transaction(&self, signer: &PrivateKeySigner, request: &CancelPrivateTransactionRequest) -> Result<bool, RelayError> {
        self.request_signed("eth_cancelPrivateTransaction", [request], signer).await
    }

    /// Replays the transactions of `block` as one bundle on top of its parent.
    /// See [`BlockSimulation::to_call_bundle`] for which transactions are kept.
    pub async fn simulate_block(&self, signer: &PrivateKeySigner, block: &BlockSimulation, max_tx: usize) -> Result<CallBundleResponse, RelayError> {
        let request = block.to_call_bundle(max_tx);
        debug!(block_number = block.number, txs = request.txs.len(), "simulating block");
        self.call_bundle(signer, &request).await
    }
}

impl BuilderBroadcaster {
    /// Sends one signed `eth_sendBundle` to every builder.
    pub async fn broadcast_bundle(
        &self,
        signer: &PrivateKeySigner,
        request: &SendBundleRequest,
    ) -> Result<Vec<BroadcastResponse<SendBundleResponse>>, RelayError> {
        let signed = make_signed_body("eth_sendBundle", [request], signer)?;
        let responses = self.broadcast_signed(Arc::new(signed)).await;
        Ok(responses.into_iter().map(BroadcastResponse::decode).collect())
    }
}
