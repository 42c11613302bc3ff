//! Backend API: the pool list and the transaction audit log.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    action::Action,
    constants::{CREATE_TRANSACTION_PATH, GET_ALL_POOLS_PATH, REPORT_DESCRIPTION},
    error::BackendError,
    pool::{PoolConfig, PoolStatus},
};

#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Current pool list. Never fails: an unreachable backend yields no pools.
    async fn get_all_pools(&self) -> Vec<PoolConfig>;
}

#[async_trait]
pub trait ResultReporter: Send + Sync {
    async fn report(&self, report: &TransactionReport) -> Result<(), BackendError>;
}

/// Audit record posted after every rebalance attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    #[serde(rename = "type")]
    pub action: Action,
    pub tx_hash: String,
    pub description: String,
    pub token_before: PoolStatus,
    pub token_after: PoolStatus,
    pub amount: u64,
    pub user_id: String,
    pub pool_id: String,
}

impl TransactionReport {
    pub fn new(
        action: Action,
        pool_address: &str,
        user_wallet_address: &str,
        before: PoolStatus,
        after: PoolStatus,
        tx_hash: String,
    ) -> Self {
        Self {
            action,
            tx_hash,
            description: REPORT_DESCRIPTION.to_string(),
            token_before: before,
            token_after: after,
            amount: 0,
            user_id: user_wallet_address.to_string(),
            pool_id: pool_address.to_string(),
        }
    }
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_pools(&self) -> Result<Vec<PoolConfig>, BackendError> {
        let url = self.url(GET_ALL_POOLS_PATH);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus { status, url });
        }

        let records: Vec<serde_json::Value> = response.json().await?;
        Ok(parse_pools(records))
    }
}

/// Decode pool records one by one so a single malformed document does not
/// hide the rest of the list.
pub fn parse_pools(records: Vec<serde_json::Value>) -> Vec<PoolConfig> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value::<PoolConfig>(record)
                .inspect_err(|e| warn!(index, error = %e, "Skipping malformed pool record"))
                .ok()
        })
        .collect()
}

#[async_trait]
impl PoolSource for HttpBackend {
    async fn get_all_pools(&self) -> Vec<PoolConfig> {
        match self.fetch_pools().await {
            Ok(pools) => pools,
            Err(e) => {
                error!(error = %e, "Error fetching pools from API");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ResultReporter for HttpBackend {
    async fn report(&self, report: &TransactionReport) -> Result<(), BackendError> {
        let url = self.url(CREATE_TRANSACTION_PATH);
        let response = self.client.post(&url).json(report).send().await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(BackendError::UnexpectedStatus { status, url });
        }

        let body = response.text().await.unwrap_or_default();
        info!(
            pool = %report.pool_id,
            action = %report.action,
            response = %body,
            "Transaction status posted"
        );
        Ok(())
    }
}
