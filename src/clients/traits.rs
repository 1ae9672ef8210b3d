use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::eosio::Action;
use crate::error::Result;

/// One contract table row, field name to value.
pub type Row = serde_json::Map<String, Value>;

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_id: String,
    pub block_num: u32,
    pub block_time: String,
    /// Contract that received the first action.
    pub receiver: String,
}

/// The operations the command workflows need from the chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Reads up to `limit` rows of a contract table.
    async fn get_table(&self, scope: &str, table: &str, limit: u32) -> Result<Vec<Row>>;

    /// Encodes typed action arguments into the contract's binary format.
    async fn encode_action(&self, contract: &str, action: &str, args: &Value) -> Result<Vec<u8>>;

    /// Signs with `signing_key` and, when `broadcast`, pushes to the network.
    ///
    /// Failures are [`crate::error::HemertonError::Submission`] and are never
    /// retried.
    async fn submit_transaction(
        &self,
        actions: Vec<Action>,
        signing_key: &str,
        broadcast: bool,
    ) -> Result<TransactionResult>;
}
