//! Node responses as they arrive, with quantities still hex encoded.
//! Every type converts into its counterpart in [`crate::types`].
use alloy_primitives::{Address, Bloom, Bytes, TxHash, B256, B64, U256};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::client::RelayError;
use crate::types::eth::{Block, Log, Syncing, Transaction, TransactionReceipt};
use crate::utils::{parse_optional_u64, parse_u256, parse_u64};

/// `eth_syncing` answers either `false` or a progress object.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum WireSyncing {
    Status(bool),
    #[serde(rename_all = "camelCase")]
    Progress { starting_block: String, current_block: String, highest_block: String },
}

impl TryFrom<WireSyncing> for Syncing {
    type Error = RelayError;

    fn try_from(wire: WireSyncing) -> Result<Self, Self::Error> {
        match wire {
            WireSyncing::Status(is_syncing) => Ok(Syncing { is_syncing, ..Default::default() }),
            WireSyncing::Progress { starting_block, current_block, highest_block } => Ok(Syncing {
                is_syncing: true,
                starting_block: parse_u64(&starting_block)?,
                current_block: parse_u64(&current_block)?,
                highest_block: parse_u64(&highest_block)?,
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    pub hash: TxHash,
    pub nonce: String,
    pub block_hash: Option<B256>,
    pub block_number: Option<String>,
    pub transaction_index: Option<String>,
    pub from: Address,
    pub to: Option<Address>,
    pub value: String,
    pub gas: String,
    pub gas_price: Option<String>,
    pub input: Bytes,
}

impl TryFrom<WireTransaction> for Transaction {
    type Error = RelayError;

    fn try_from(wire: WireTransaction) -> Result<Self, Self::Error> {
        Ok(Transaction {
            hash: wire.hash,
            nonce: parse_u64(&wire.nonce)?,
            block_hash: wire.block_hash,
            block_number: parse_optional_u64(wire.block_number.as_deref())?,
            transaction_index: parse_optional_u64(wire.transaction_index.as_deref())?,
            from: wire.from,
            to: wire.to,
            value: parse_u256(&wire.value)?,
            gas: parse_u64(&wire.gas)?,
            gas_price: wire.gas_price.as_deref().map(parse_u256).transpose()?.unwrap_or_default(),
            input: wire.input,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLog {
    #[serde(default)]
    pub removed: bool,
    pub log_index: String,
    pub transaction_index: String,
    pub transaction_hash: TxHash,
    pub block_number: String,
    pub block_hash: B256,
    pub address: Address,
    pub data: Bytes,
    pub topics: Vec<B256>,
}

impl TryFrom<WireLog> for Log {
    type Error = RelayError;

    fn try_from(wire: WireLog) -> Result<Self, Self::Error> {
        Ok(Log {
            removed: wire.removed,
            log_index: parse_u64(&wire.log_index)?,
            transaction_index: parse_u64(&wire.transaction_index)?,
            transaction_hash: wire.transaction_hash,
            block_number: parse_u64(&wire.block_number)?,
            block_hash: wire.block_hash,
            address: wire.address,
            data: wire.data,
            topics: wire.topics,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransactionReceipt {
    pub transaction_hash: TxHash,
    pub transaction_index: String,
    pub block_hash: B256,
    pub block_number: String,
    pub cumulative_gas_used: String,
    pub gas_used: String,
    pub contract_address: Option<Address>,
    pub logs: Vec<WireLog>,
    pub logs_bloom: Bloom,
    pub root: Option<B256>,
    pub status: Option<String>,
}

impl TryFrom<WireTransactionReceipt> for TransactionReceipt {
    type Error = RelayError;

    fn try_from(wire: WireTransactionReceipt) -> Result<Self, Self::Error> {
        Ok(TransactionReceipt {
            transaction_hash: wire.transaction_hash,
            transaction_index: parse_u64(&wire.transaction_index)?,
            block_hash: wire.block_hash,
            block_number: parse_u64(&wire.block_number)?,
            cumulative_gas_used: parse_u64(&wire.cumulative_gas_used)?,
            gas_used: parse_u64(&wire.gas_used)?,
            contract_address: wire.contract_address,
            logs: wire.logs.into_iter().map(Log::try_from).collect::<Result<_, _>>()?,
            logs_bloom: wire.logs_bloom,
            root: wire.root,
            status: parse_optional_u64(wire.status.as_deref())?,
        })
    }
}

/// Block header fields shared by both block shapes; `T` is either a bare
/// hash or a full transaction.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBlock<T> {
    pub number: String,
    pub hash: B256,
    pub parent_hash: B256,
    #[serde(default)]
    pub nonce: Option<B64>,
    pub sha3_uncles: B256,
    pub logs_bloom: Bloom,
    pub transactions_root: B256,
    pub state_root: B256,
    pub miner: Address,
    pub difficulty: String,
    #[serde(default)]
    pub total_difficulty: Option<String>,
    pub extra_data: Bytes,
    pub size: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub timestamp: String,
    #[serde(default)]
    pub base_fee_per_gas: Option<String>,
    #[serde(default)]
    pub uncles: Vec<B256>,
    pub transactions: Vec<T>,
}

impl<T> WireBlock<T> {
    fn into_block<F>(self, convert: F) -> Result<Block, RelayError>
    where
        F: FnMut(T) -> Result<Transaction, RelayError>,
    {
        Ok(Block {
            number: parse_u64(&self.number)?,
            hash: self.hash,
            parent_hash: self.parent_hash,
            nonce: self.nonce.unwrap_or_default(),
            sha3_uncles: self.sha3_uncles,
            logs_bloom: self.logs_bloom,
            transactions_root: self.transactions_root,
            state_root: self.state_root,
            miner: self.miner,
            difficulty: parse_u256(&self.difficulty)?,
            total_difficulty: self.total_difficulty.as_deref().map(parse_u256).transpose()?.unwrap_or(U256::ZERO),
            extra_data: self.extra_data,
            size: parse_u64(&self.size)?,
            gas_limit: parse_u64(&self.gas_limit)?,
            gas_used: parse_u64(&self.gas_used)?,
            timestamp: parse_u64(&self.timestamp)?,
            base_fee_per_gas: parse_optional_u64(self.base_fee_per_gas.as_deref())?,
            uncles: self.uncles,
            transactions: self.transactions.into_iter().map(convert).collect::<Result<_, _>>()?,
        })
    }
}

/// The two shapes of a block result, picked by the `full_transactions` flag
/// the block was requested with.
#[derive(Clone, Debug)]
pub enum RpcBlock {
    Summary(WireBlock<TxHash>),
    WithTransactions(WireBlock<WireTransaction>),
}

impl RpcBlock {
    pub fn decode(raw: &RawValue, full_transactions: bool) -> Result<Self, RelayError> {
        let text = raw.get();
        let decoded = if full_transactions {
            serde_json::from_str(text).map(RpcBlock::WithTransactions)
        } else {
            serde_json::from_str(text).map(RpcBlock::Summary)
        };
        decoded.map_err(|err| RelayError::Protocol { err, text: text.to_string() })
    }
}

impl TryFrom<RpcBlock> for Block {
    type Error = RelayError;

    fn try_from(block: RpcBlock) -> Result<Self, Self::Error> {
        match block {
            RpcBlock::Summary(wire) => wire.into_block(|hash| Ok(Transaction { hash, ..Default::default() })),
            RpcBlock::WithTransactions(wire) => wire.into_block(Transaction::try_from),
        }
    }
}
