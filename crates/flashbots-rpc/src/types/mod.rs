pub use eth::{Block, FilterParams, Log, Syncing, Transaction, TransactionArgs, TransactionReceipt};
pub use flashbots::{
    BlockSimulation, BuilderPubkeyWithTimestamp, BundleHash, BundleStats, BundleStatsV2, CallBundleRequest, CallBundleResponse, CallBundleResult,
    CancelPrivateTransactionRequest, GetBundleStatsRequest, PrivateTxPreferences, SendBundleRequest, SendBundleResponse, SendPrivateTransactionRequest,
    SimulationTransaction, UserStats,
};
pub use wire::{RpcBlock, WireBlock, WireLog, WireSyncing, WireTransaction, WireTransactionReceipt};

mod eth;
mod flashbots;
mod wire;
