use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::eosio::{Action, Tapos, Transaction};
use super::traits::{ChainClient, Row, TransactionResult};
use crate::config::Config;
use crate::error::{HemertonError, Result};
use crate::utils::{HttpClientConfig, endpoint};

/// Chain client talking to a nodeos HTTP endpoint, with signing delegated to
/// a keosd wallet.
#[derive(Debug, Clone)]
pub struct NodeosClient {
    http: reqwest::Client,
    nodeos_url: String,
    wallet_url: String,
    /// Contract whose tables are read.
    code: String,
    expiration_secs: u32,
}

#[derive(Debug, Deserialize)]
struct TableRows {
    rows: Vec<Row>,
    #[serde(default)]
    more: Value,
}

#[derive(Debug, Deserialize)]
struct AbiJsonToBin {
    binargs: String,
}

#[derive(Debug, Deserialize)]
struct ChainInfo {
    chain_id: String,
    head_block_time: String,
    last_irreversible_block_num: u32,
    last_irreversible_block_id: String,
}

#[derive(Debug, Deserialize)]
struct SignedTransaction {
    signatures: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PackedTransaction<'a> {
    signatures: &'a [String],
    compression: &'a str,
    packed_context_free_data: &'a str,
    packed_trx: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    transaction_id: String,
    processed: Processed,
}

#[derive(Debug, Deserialize)]
struct Processed {
    block_num: u32,
    block_time: String,
    #[serde(default)]
    action_traces: Vec<ActionTrace>,
}

#[derive(Debug, Deserialize)]
struct ActionTrace {
    receipt: Receipt,
}

#[derive(Debug, Deserialize)]
struct Receipt {
    receiver: String,
}

/// Condenses a nodeos/keosd error body into one line.
fn describe_error_body(body: &str) -> String {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let error = &v["error"];
    let what = error["what"]
        .as_str()
        .or_else(|| v["message"].as_str())
        .unwrap_or("unknown error");
    let details: Vec<&str> = error["details"]
        .as_array()
        .map(|d| d.iter().filter_map(|x| x["message"].as_str()).collect())
        .unwrap_or_default();
    if details.is_empty() {
        what.to_string()
    } else {
        format!("{}: {}", what, details.join("; "))
    }
}

fn to_submission(err: HemertonError) -> HemertonError {
    match err {
        HemertonError::Http { message } | HemertonError::Serialization { message } => {
            HemertonError::Submission { message }
        }
        other => other,
    }
}

impl NodeosClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpClientConfig::from_config(config, "nodeos").build_client()?;
        Ok(Self {
            http,
            nodeos_url: config.chain.nodeos_url.clone(),
            wallet_url: config.chain.wallet_url.clone(),
            code: config.chain.contract.clone(),
            expiration_secs: config.chain.expiration_secs,
        })
    }

    async fn post<B, T>(&self, url: String, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(HemertonError::Http {
                message: format!("{} returned {}: {}", url, status, describe_error_body(&text)),
            });
        }
        serde_json::from_str(&text).map_err(|e| HemertonError::Serialization {
            message: format!("unexpected response from {}: {}", url, e),
        })
    }

    async fn sign(
        &self,
        trx: &Transaction,
        public_key: &str,
        chain_id: &str,
    ) -> Result<Vec<String>> {
        let url = endpoint(&self.wallet_url, "/v1/wallet/sign_transaction");
        let signed: SignedTransaction = self
            .post(url, &json!([trx, [public_key], chain_id]))
            .await?;
        if signed.signatures.is_empty() {
            return Err(HemertonError::Submission {
                message: format!("wallet returned no signature for key {}", public_key),
            });
        }
        Ok(signed.signatures)
    }
}

#[async_trait]
impl ChainClient for NodeosClient {
    async fn get_table(&self, scope: &str, table: &str, limit: u32) -> Result<Vec<Row>> {
        let url = endpoint(&self.nodeos_url, "/v1/chain/get_table_rows");
        let body = json!({
            "code": self.code,
            "scope": scope,
            "table": table,
            "json": true,
            "limit": limit,
        });
        let rows: TableRows = self.post(url, &body).await?;
        if rows.more.as_bool() == Some(true) || rows.more.as_str().is_some_and(|s| !s.is_empty()) {
            tracing::warn!("table {} has more than {} rows; output truncated", table, limit);
        }
        debug!("table {} returned {} rows", table, rows.rows.len());
        Ok(rows.rows)
    }

    async fn encode_action(&self, contract: &str, action: &str, args: &Value) -> Result<Vec<u8>> {
        let url = endpoint(&self.nodeos_url, "/v1/chain/abi_json_to_bin");
        let body = json!({ "code": contract, "action": action, "args": args });
        let encoded: AbiJsonToBin = self.post(url, &body).await?;
        hex::decode(&encoded.binargs).map_err(|e| HemertonError::Serialization {
            message: format!("node returned invalid binargs: {}", e),
        })
    }

    async fn submit_transaction(
        &self,
        actions: Vec<Action>,
        signing_key: &str,
        broadcast: bool,
    ) -> Result<TransactionResult> {
        let receiver = actions
            .first()
            .map(|a| a.account.clone())
            .ok_or_else(|| HemertonError::Submission {
                message: "transaction has no actions".into(),
            })?;

        let info: ChainInfo = self
            .post(endpoint(&self.nodeos_url, "/v1/chain/get_info"), &json!({}))
            .await
            .map_err(to_submission)?;
        let tapos = Tapos::from_block(
            info.last_irreversible_block_num,
            &info.last_irreversible_block_id,
        )
        .map_err(to_submission)?;
        let trx = Transaction::new(actions, tapos, &info.head_block_time, self.expiration_secs)
            .map_err(to_submission)?;

        let signatures = self
            .sign(&trx, signing_key, &info.chain_id)
            .await
            .map_err(to_submission)?;
        let packed = trx.pack().map_err(to_submission)?;

        if !broadcast {
            info!("transaction signed, not broadcast");
            return Ok(TransactionResult {
                transaction_id: trx.id().map_err(to_submission)?,
                block_num: 0,
                block_time: "not broadcast".to_string(),
                receiver,
            });
        }

        let body = PackedTransaction {
            signatures: &signatures,
            compression: "none",
            packed_context_free_data: "",
            packed_trx: hex::encode(&packed),
        };
        let pushed: PushResponse = self
            .post(endpoint(&self.nodeos_url, "/v1/chain/push_transaction"), &body)
            .await
            .map_err(to_submission)?;
        info!(
            "transaction {} included in block {}",
            pushed.transaction_id, pushed.processed.block_num
        );

        Ok(TransactionResult {
            transaction_id: pushed.transaction_id,
            block_num: pushed.processed.block_num,
            block_time: pushed.processed.block_time,
            receiver: pushed
                .processed
                .action_traces
                .into_iter()
                .next()
                .map(|t| t.receipt.receiver)
                .unwrap_or(receiver),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_assertion_failure() {
        let body = r#"{"code":500,"message":"Internal Service Error","error":{"code":3050003,"name":"eosio_assert_message_exception","what":"eosio_assert_message assertion failure","details":[{"message":"assertion failure with message: list already exists","file":"cf_system.cpp","line_number":14,"method":"eosio_assert"}]}}"#;
        assert_eq!(
            describe_error_body(body),
            "eosio_assert_message assertion failure: assertion failure with message: list already exists"
        );
    }

    #[test]
    fn test_describe_non_json_body() {
        assert_eq!(describe_error_body(" bad gateway \n"), "bad gateway");
        assert_eq!(
            describe_error_body(r#"{"message":"Not Found"}"#),
            "Not Found"
        );
    }

    #[test]
    fn test_push_response_shape() {
        let body = r#"{"transaction_id":"abc","processed":{"id":"abc","block_num":42,"block_time":"2024-05-01T12:00:00.500","action_traces":[{"receipt":{"receiver":"hemerton","act_digest":"00"}}]}}"#;
        let parsed: PushResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.processed.block_num, 42);
        assert_eq!(parsed.processed.action_traces[0].receipt.receiver, "hemerton");
    }

    #[test]
    fn test_transport_errors_become_submission_errors() {
        let err = to_submission(HemertonError::Http {
            message: "connection refused".into(),
        });
        assert!(matches!(err, HemertonError::Submission { .. }));
    }
}
