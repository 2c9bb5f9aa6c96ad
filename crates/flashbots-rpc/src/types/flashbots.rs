use alloy_primitives::{keccak256, Address, Bytes, TxHash, B256, U256, U64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::{deserialize_optional_address, deserialize_u256, deserialize_u64};

/// A bundle hash.
pub type BundleHash = B256;

/// Parameters of `eth_sendBundle`.
///
/// Please note that some parameters are required, and submitting a bundle
/// without them will get it rejected by the relay. The required parameters
/// include:
///
/// - At least one transaction ([`SendBundleRequest::push_transaction`])
/// - A target block ([`SendBundleRequest::set_target_block`])
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBundleRequest {
    #[serde(rename = "txs")]
    transactions: Vec<Bytes>,
    #[serde(rename = "blockNumber")]
    #[serde(skip_serializing_if = "Option::is_none")]
    target_block: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_timestamp: Option<u64>,
    #[serde(rename = "revertingTxHashes")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    revertible_transaction_hashes: Vec<TxHash>,
}

impl SendBundleRequest {
    /// Creates an empty bundle request.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a signed, RLP encoded transaction to the bundle.
    pub fn push_transaction<T: Into<Bytes>>(mut self, tx: T) -> Self {
        self.transactions.push(tx.into());
        self
    }

    /// Adds a transaction the bundle stays valid without, should it revert.
    pub fn push_revertible_transaction<T: Into<Bytes>>(mut self, tx: T) -> Self {
        let tx = tx.into();
        self.revertible_transaction_hashes.push(keccak256(&tx));
        self.transactions.push(tx);
        self
    }

    pub fn transactions(&self) -> &[Bytes] {
        &self.transactions
    }

    pub fn target_block(&self) -> Option<U64> {
        self.target_block
    }

    pub fn set_target_block(mut self, target_block: u64) -> Self {
        self.target_block = Some(U64::from(target_block));
        self
    }

    /// Get the minimum timestamp for which this bundle is valid (if any),
    /// in seconds since the UNIX epoch.
    pub fn min_timestamp(&self) -> Option<u64> {
        self.min_timestamp
    }

    pub fn set_min_timestamp(mut self, timestamp: u64) -> Self {
        self.min_timestamp = Some(timestamp);
        self
    }

    /// Get the maximum timestamp for which this bundle is valid (if any),
    /// in seconds since the UNIX epoch.
    pub fn max_timestamp(&self) -> Option<u64> {
        self.max_timestamp
    }

    pub fn set_max_timestamp(mut self, timestamp: u64) -> Self {
        self.max_timestamp = Some(timestamp);
        self
    }
}

/// Reply to `eth_sendBundle`.
///
/// Builders disagree on the result shape: an object with `bundleHash`, the
/// bare hash, `"nil"`, a number or `null`. Anything but a hash leaves
/// `bundle_hash` empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SendBundleResponseType")]
pub struct SendBundleResponse {
    #[serde(rename = "bundleHash")]
    pub bundle_hash: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SendBundleResponseType {
    Object {
        #[serde(rename = "bundleHash", default)]
        bundle_hash: Option<String>,
    },
    String(String),
    Integer(u64),
    Null,
}

impl From<SendBundleResponseType> for SendBundleResponse {
    fn from(value: SendBundleResponseType) -> Self {
        let bundle_hash = match value {
            SendBundleResponseType::Object { bundle_hash } => bundle_hash.unwrap_or_default(),
            SendBundleResponseType::String(s) if s.starts_with("0x") => s,
            SendBundleResponseType::Integer(code) => {
                debug!(code, "bundle accepted without a hash");
                String::new()
            }
            SendBundleResponseType::String(_) | SendBundleResponseType::Null => String::new(),
        };
        Self { bundle_hash }
    }
}

/// Parameters of `eth_callBundle`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBundleRequest {
    pub txs: Vec<Bytes>,
    /// Block the bundle is valid for.
    pub block_number: U64,
    /// Hex block number, block hash or a tag such as `latest`.
    pub state_block_number: String,
    /// Simulation timestamp, seconds since the UNIX epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee: Option<u64>,
}

/// Details of a simulated transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBundleResult {
    /// The difference in coinbase's balance due to this transaction.
    ///
    /// This includes tips and gas fees for this transaction.
    #[serde(deserialize_with = "deserialize_u256")]
    pub coinbase_diff: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub eth_sent_to_coinbase: U256,
    pub from_address: Address,
    #[serde(deserialize_with = "deserialize_u256")]
    pub gas_fees: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub gas_price: U256,
    #[serde(deserialize_with = "deserialize_u64")]
    pub gas_used: u64,
    /// `None` for contract creations.
    #[serde(default, deserialize_with = "deserialize_optional_address")]
    pub to_address: Option<Address>,
    pub tx_hash: TxHash,
    /// The return value of the transaction.
    #[serde(default)]
    pub value: Option<Bytes>,
    /// The reason this transaction failed (if it did).
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub revert: Option<String>,
}

/// Reply to `eth_callBundle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBundleResponse {
    #[serde(deserialize_with = "deserialize_u256")]
    pub bundle_gas_price: U256,
    pub bundle_hash: BundleHash,
    /// Total gas fees and coinbase tips.
    #[serde(deserialize_with = "deserialize_u256")]
    pub coinbase_diff: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub eth_sent_to_coinbase: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub gas_fees: U256,
    pub results: Vec<CallBundleResult>,
    #[serde(deserialize_with = "deserialize_u64")]
    pub state_block_number: u64,
    #[serde(deserialize_with = "deserialize_u64")]
    pub total_gas_used: u64,
}

impl CallBundleResponse {
    /// `coinbase_diff / total_gas_used`, an approximation of the bundle's
    /// score. Zero when no gas was used.
    pub fn effective_gas_price(&self) -> U256 {
        self.coinbase_diff.checked_div(U256::from(self.total_gas_used)).unwrap_or_default()
    }

    pub fn find_tx(&self, tx_hash: TxHash) -> Option<&CallBundleResult> {
        self.results.iter().find(|item| item.tx_hash == tx_hash)
    }
}

/// Reply to `flashbots_getUserStats`. Amounts are in wei, gas in units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserStats {
    pub is_high_priority: bool,
    #[serde(deserialize_with = "deserialize_u256")]
    pub all_time_miner_payments: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub all_time_gas_simulated: U256,
    #[serde(rename = "last_7d_miner_payments", deserialize_with = "deserialize_u256")]
    pub last_7d_miner_payments: U256,
    #[serde(rename = "last_7d_gas_simulated", deserialize_with = "deserialize_u256")]
    pub last_7d_gas_simulated: U256,
    #[serde(rename = "last_1d_miner_payments", deserialize_with = "deserialize_u256")]
    pub last_1d_miner_payments: U256,
    #[serde(rename = "last_1d_gas_simulated", deserialize_with = "deserialize_u256")]
    pub last_1d_gas_simulated: U256,
}

/// Parameters of `flashbots_getBundleStats` and `flashbots_getBundleStatsV2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBundleStatsRequest {
    pub block_number: U64,
    /// Hash returned by `eth_sendBundle`.
    pub bundle_hash: BundleHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BuilderPubkeyWithTimestamp {
    pub pubkey: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleStats {
    pub is_simulated: bool,
    pub is_sent_to_miners: bool,
    pub is_high_priority: bool,
    pub simulated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub sent_to_miners_at: Option<DateTime<Utc>>,
    pub considered_by_builders_at: Vec<BuilderPubkeyWithTimestamp>,
    pub sealed_by_builders_at: Vec<BuilderPubkeyWithTimestamp>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleStatsV2 {
    pub is_simulated: bool,
    pub is_high_priority: bool,
    pub simulated_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub considered_by_builders_at: Vec<BuilderPubkeyWithTimestamp>,
    pub sealed_by_builders_at: Vec<BuilderPubkeyWithTimestamp>,
}

/// Parameters of `eth_sendPrivateTransaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendPrivateTransactionRequest {
    pub tx: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PrivateTxPreferences>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PrivateTxPreferences {
    pub fast: bool,
}

/// Parameters of `eth_cancelPrivateTransaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPrivateTransactionRequest {
    pub tx_hash: TxHash,
}

/// A block to replay through `eth_callBundle`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockSimulation {
    pub number: u64,
    pub parent_hash: B256,
    pub coinbase: Address,
    pub gas_limit: u64,
    pub difficulty: u64,
    pub base_fee: u64,
    pub transactions: Vec<SimulationTransaction>,
}

/// A signed transaction of a [`BlockSimulation`] with its recovered sender.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationTransaction {
    pub from: Address,
    pub to: Option<Address>,
    /// EIP-2718 encoding, as accepted by `eth_sendRawTransaction`.
    pub raw: Bytes,
}

impl BlockSimulation {
    /// Builds the `eth_callBundle` parameters replaying this block on top of
    /// its parent. Transactions from or to the coinbase are left out, and at
    /// most `max_tx` are kept (`0` keeps all).
    pub fn to_call_bundle(&self, max_tx: usize) -> CallBundleRequest {
        let txs = self
            .transactions
            .iter()
            .filter(|tx| tx.from != self.coinbase && tx.to != Some(self.coinbase))
            .take(if max_tx == 0 { usize::MAX } else { max_tx })
            .map(|tx| tx.raw.clone())
            .collect();

        CallBundleRequest {
            txs,
            block_number: U64::from(self.number),
            state_block_number: self.parent_hash.to_string(),
            gas_limit: Some(self.gas_limit).filter(|v| *v != 0),
            difficulty: Some(self.difficulty).filter(|v| *v != 0),
            base_fee: Some(self.base_fee).filter(|v| *v != 0),
            ..Default::default()
        }
    }
}
