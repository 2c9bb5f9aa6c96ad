use alloy_primitives::{Address, Bloom, Bytes, TxHash, B256, B64, U256, U64};
use serde::Serialize;

/// Sync progress reported by `eth_syncing`. A node that is not syncing
/// reports the default value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Syncing {
    pub is_syncing: bool,
    pub starting_block: u64,
    pub current_block: u64,
    pub highest_block: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    pub hash: TxHash,
    pub nonce: u64,
    /// `None` while pending.
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
    pub from: Address,
    /// `None` for contract creations.
    pub to: Option<Address>,
    pub value: U256,
    pub gas: u64,
    pub gas_price: U256,
    pub input: Bytes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Log {
    pub removed: bool,
    pub log_index: u64,
    pub transaction_index: u64,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub block_hash: B256,
    pub address: Address,
    pub data: Bytes,
    pub topics: Vec<B256>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub transaction_index: u64,
    pub block_hash: B256,
    pub block_number: u64,
    pub cumulative_gas_used: u64,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
    pub logs_bloom: Bloom,
    /// Post-state root, only set by pre-Byzantium receipts.
    pub root: Option<B256>,
    /// `1` on success, `0` on failure.
    pub status: Option<u64>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == Some(1)
    }
}

/// A block returned by `eth_getBlockByHash` or `eth_getBlockByNumber`.
///
/// When fetched without full transactions, each entry of `transactions` only
/// has its `hash` set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub nonce: B64,
    pub sha3_uncles: B256,
    pub logs_bloom: Bloom,
    pub transactions_root: B256,
    pub state_root: B256,
    pub miner: Address,
    pub difficulty: U256,
    pub total_difficulty: U256,
    pub extra_data: Bytes,
    pub size: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub base_fee_per_gas: Option<u64>,
    pub uncles: Vec<B256>,
    pub transactions: Vec<Transaction>,
}

/// Call object for `eth_call`, `eth_estimateGas` and `eth_sendTransaction`.
/// Unset fields are left out of the request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionArgs {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U64>,
}

/// Filter object for `eth_newFilter` and `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Hex block number or tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Vec<B256>>,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};

    use super::*;
    use crate::utils::ETH1;

    #[test]
    fn transaction_args_skip_unset() {
        let args = TransactionArgs { from: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"), ..Default::default() };
        assert_eq!(serde_json::to_string(&args).unwrap().to_lowercase(), r#"{"from":"0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"}"#);

        let args = TransactionArgs {
            to: Some(address!("95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5")),
            gas: Some(U64::from(21000)),
            value: Some(ETH1),
            data: Some(Bytes::from(vec![0xd0, 0xe3, 0x0d, 0xb0])),
            ..args
        };
        assert_eq!(
            serde_json::to_string(&args).unwrap().to_lowercase(),
            r#"{"from":"0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266","to":"0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5","gas":"0x5208","value":"0xde0b6b3a7640000","data":"0xd0e30db0"}"#
        );
    }

    #[test]
    fn filter_params_skip_unset() {
        let filter = FilterParams {
            from_block: Some("0x1".to_string()),
            topics: vec![vec![b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")]],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"fromBlock":"0x1","topics":[["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"]]}"#
        );
        assert_eq!(serde_json::to_string(&FilterParams::default()).unwrap(), "{}");
    }
}
