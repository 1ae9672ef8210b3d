//! Command workflows: ask a form, coerce the answers, submit an action.

pub mod coerce;
pub mod lists;
pub mod output;
pub mod requests;

use serde_json::{Map, Value};
use tracing::info;

use crate::clients::eosio::{Action, PermissionLevel};
use crate::clients::{ChainClient, Row, TransactionResult};
use crate::config::Config;
use crate::error::Result;

/// What every workflow runs against.
pub struct Context<'a> {
    pub config: &'a Config,
    pub chain: &'a dyn ChainClient,
    /// Push signed transactions to the network. Off means sign only.
    pub broadcast: bool,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Config, chain: &'a dyn ChainClient) -> Self {
        Self {
            config,
            chain,
            broadcast: true,
        }
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Reads every row of a contract table in the configured scope.
    pub async fn rows(&self, table: &str) -> Result<Vec<Row>> {
        self.chain
            .get_table(&self.config.chain.scope, table, self.config.chain.table_limit)
            .await
    }

    /// Adds the administrator as `user`, encodes the arguments and submits
    /// them as a single action authorized by the administrator.
    pub async fn submit(
        &self,
        action: &str,
        mut args: Map<String, Value>,
    ) -> Result<TransactionResult> {
        let admin = &self.config.admin;
        let contract = &self.config.chain.contract;
        args.insert("user".to_string(), Value::String(admin.account.clone()));

        let data = self
            .chain
            .encode_action(contract, action, &Value::Object(args))
            .await?;
        let action = Action {
            account: contract.clone(),
            name: action.to_string(),
            authorization: vec![PermissionLevel {
                actor: admin.account.clone(),
                permission: admin.permission.clone(),
            }],
            data,
        };
        info!("submitting {}::{} as {}@{}", contract, action.name, admin.account, admin.permission);
        self.chain
            .submit_transaction(vec![action], &admin.public_key, self.broadcast)
            .await
    }
}
