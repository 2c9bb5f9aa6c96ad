use alloy_primitives::{hex, Address, Bytes, TxHash, B256, U256};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{FlashbotsRpc, RelayError};
use crate::types::{
    Block, FilterParams, Log, RpcBlock, Syncing, Transaction, TransactionArgs, TransactionReceipt, WireLog, WireSyncing, WireTransaction,
    WireTransactionReceipt,
};
use crate::utils::{parse_u256, parse_u64, u64_to_hex, ETH1};

const NO_PARAMS: [(); 0] = [];

/// Plain node methods. Block arguments named `block` accept a hex number or
/// a tag such as `latest`.
impl FlashbotsRpc {
    async fn quantity<P: Serialize>(&self, method: &str, params: P) -> Result<u64, RelayError> {
        let value: String = self.request(method, params).await?;
        parse_u64(&value)
    }

    async fn big_quantity<P: Serialize>(&self, method: &str, params: P) -> Result<U256, RelayError> {
        let value: String = self.request(method, params).await?;
        parse_u256(&value)
    }

    /// `null` results become `None`.
    async fn optional<P, W, T>(&self, method: &str, params: P) -> Result<Option<T>, RelayError>
    where
        P: Serialize,
        W: DeserializeOwned,
        T: TryFrom<W, Error = RelayError>,
    {
        let wire: Option<W> = self.request(method, params).await?;
        wire.map(T::try_from).transpose()
    }

    async fn logs<P: Serialize>(&self, method: &str, params: P) -> Result<Vec<Log>, RelayError> {
        let wire: Vec<WireLog> = self.request(method, params).await?;
        wire.into_iter().map(Log::try_from).collect()
    }

    async fn block<P: Serialize>(&self, method: &str, params: P, full_transactions: bool) -> Result<Option<Block>, RelayError> {
        let raw = self.call(method, params).await?;
        if raw.get() == "null" {
            return Ok(None);
        }
        RpcBlock::decode(&raw, full_transactions)?.try_into().map(Some)
    }

    pub async fn web3_client_version(&self) -> Result<String, RelayError> {
        self.request("web3_clientVersion", NO_PARAMS).await
    }

    /// Keccak-256 of `data`, computed by the node.
    pub async fn web3_sha3(&self, data: &[u8]) -> Result<B256, RelayError> {
        self.request("web3_sha3", [hex::encode_prefixed(data)]).await
    }

    pub async fn net_version(&self) -> Result<String, RelayError> {
        self.request("net_version", NO_PARAMS).await
    }

    pub async fn net_listening(&self) -> Result<bool, RelayError> {
        self.request("net_listening", NO_PARAMS).await
    }

    pub async fn net_peer_count(&self) -> Result<u64, RelayError> {
        self.quantity("net_peerCount", NO_PARAMS).await
    }

    pub async fn eth_protocol_version(&self) -> Result<String, RelayError> {
        self.request("eth_protocolVersion", NO_PARAMS).await
    }

    pub async fn eth_syncing(&self) -> Result<Syncing, RelayError> {
        let wire: WireSyncing = self.request("eth_syncing", NO_PARAMS).await?;
        wire.try_into()
    }

    pub async fn eth_coinbase(&self) -> Result<Address, RelayError> {
        self.request("eth_coinbase", NO_PARAMS).await
    }

    pub async fn eth_mining(&self) -> Result<bool, RelayError> {
        self.request("eth_mining", NO_PARAMS).await
    }

    pub async fn eth_hashrate(&self) -> Result<u64, RelayError> {
        self.quantity("eth_hashrate", NO_PARAMS).await
    }

    /// Gas price in wei.
    pub async fn eth_gas_price(&self) -> Result<U256, RelayError> {
        self.big_quantity("eth_gasPrice", NO_PARAMS).await
    }

    pub async fn eth_accounts(&self) -> Result<Vec<Address>, RelayError> {
        self.request("eth_accounts", NO_PARAMS).await
    }

    pub async fn eth_block_number(&self) -> Result<u64, RelayError> {
        self.quantity("eth_blockNumber", NO_PARAMS).await
    }

    /// Balance in wei.
    pub async fn eth_get_balance(&self, address: Address, block: &str) -> Result<U256, RelayError> {
        self.big_quantity("eth_getBalance", (address, block)).await
    }

    pub async fn eth_get_storage_at(&self, address: Address, position: U256, block: &str) -> Result<B256, RelayError> {
        self.request("eth_getStorageAt", (address, position, block)).await
    }

    pub async fn eth_get_transaction_count(&self, address: Address, block: &str) -> Result<u64, RelayError> {
        self.quantity("eth_getTransactionCount", (address, block)).await
    }

    pub async fn eth_get_block_transaction_count_by_hash(&self, hash: B256) -> Result<u64, RelayError> {
        self.quantity("eth_getBlockTransactionCountByHash", [hash]).await
    }

    pub async fn eth_get_block_transaction_count_by_number(&self, number: u64) -> Result<u64, RelayError> {
        self.quantity("eth_getBlockTransactionCountByNumber", [u64_to_hex(number)]).await
    }

    pub async fn eth_get_uncle_count_by_block_hash(&self, hash: B256) -> Result<u64, RelayError> {
        self.quantity("eth_getUncleCountByBlockHash", [hash]).await
    }

    pub async fn eth_get_uncle_count_by_block_number(&self, number: u64) -> Result<u64, RelayError> {
        self.quantity("eth_getUncleCountByBlockNumber", [u64_to_hex(number)]).await
    }

    pub async fn eth_get_code(&self, address: Address, block: &str) -> Result<Bytes, RelayError> {
        self.request("eth_getCode", (address, block)).await
    }

    /// Signs `data` with an account unlocked on the node.
    pub async fn eth_sign(&self, address: Address, data: &Bytes) -> Result<Bytes, RelayError> {
        self.request("eth_sign", (address, data)).await
    }

    pub async fn eth_send_transaction(&self, transaction: &TransactionArgs) -> Result<TxHash, RelayError> {
        self.request("eth_sendTransaction", [transaction]).await
    }

    pub async fn eth_send_raw_transaction(&self, data: &Bytes) -> Result<TxHash, RelayError> {
        self.request("eth_sendRawTransaction", [data]).await
    }

    pub async fn eth_call(&self, transaction: &TransactionArgs, block: &str) -> Result<Bytes, RelayError> {
        self.request("eth_call", (transaction, block)).await
    }

    pub async fn eth_estimate_gas(&self, transaction: &TransactionArgs) -> Result<u64, RelayError> {
        self.quantity("eth_estimateGas", [transaction]).await
    }

    /// `None` when the node does not know the block.
    pub async fn eth_get_block_by_hash(&self, hash: B256, full_transactions: bool) -> Result<Option<Block>, RelayError> {
        self.block("eth_getBlockByHash", (hash, full_transactions), full_transactions).await
    }

    pub async fn eth_get_block_by_number(&self, number: u64, full_transactions: bool) -> Result<Option<Block>, RelayError> {
        self.block("eth_getBlockByNumber", (u64_to_hex(number), full_transactions), full_transactions).await
    }

    pub async fn eth_get_transaction_by_hash(&self, hash: TxHash) -> Result<Option<Transaction>, RelayError> {
        self.optional::<_, WireTransaction, _>("eth_getTransactionByHash", [hash]).await
    }

    pub async fn eth_get_transaction_by_block_hash_and_index(&self, block_hash: B256, index: u64) -> Result<Option<Transaction>, RelayError> {
        self.optional::<_, WireTransaction, _>("eth_getTransactionByBlockHashAndIndex", (block_hash, u64_to_hex(index))).await
    }

    pub async fn eth_get_transaction_by_block_number_and_index(&self, block_number: u64, index: u64) -> Result<Option<Transaction>, RelayError> {
        self.optional::<_, WireTransaction, _>("eth_getTransactionByBlockNumberAndIndex", (u64_to_hex(block_number), u64_to_hex(index))).await
    }

    /// `None` while the transaction is pending or unknown.
    pub async fn eth_get_transaction_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>, RelayError> {
        self.optional::<_, WireTransactionReceipt, _>("eth_getTransactionReceipt", [hash]).await
    }

    pub async fn eth_get_compilers(&self) -> Result<Vec<String>, RelayError> {
        self.request("eth_getCompilers", NO_PARAMS).await
    }

    /// Returns the new filter id.
    pub async fn eth_new_filter(&self, params: &FilterParams) -> Result<String, RelayError> {
        self.request("eth_newFilter", [params]).await
    }

    pub async fn eth_new_block_filter(&self) -> Result<String, RelayError> {
        self.request("eth_newBlockFilter", NO_PARAMS).await
    }

    pub async fn eth_new_pending_transaction_filter(&self) -> Result<String, RelayError> {
        self.request("eth_newPendingTransactionFilter", NO_PARAMS).await
    }

    pub async fn eth_uninstall_filter(&self, filter_id: &str) -> Result<bool, RelayError> {
        self.request("eth_uninstallFilter", [filter_id]).await
    }

    /// Logs matched since the last poll of a log filter.
    pub async fn eth_get_filter_changes(&self, filter_id: &str) -> Result<Vec<Log>, RelayError> {
        self.logs("eth_getFilterChanges", [filter_id]).await
    }

    pub async fn eth_get_filter_logs(&self, filter_id: &str) -> Result<Vec<Log>, RelayError> {
        self.logs("eth_getFilterLogs", [filter_id]).await
    }

    pub async fn eth_get_logs(&self, params: &FilterParams) -> Result<Vec<Log>, RelayError> {
        self.logs("eth_getLogs", [params]).await
    }

    /// 1 ether in wei.
    pub fn eth1(&self) -> U256 {
        ETH1
    }
}
