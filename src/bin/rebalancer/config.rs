use std::{env, str::FromStr, time::Duration};

use anchor_client::Cluster;
use pool_rebalancer::{ComputeBudget, telemetry::LogFormat};

pub struct Config {
    pub app_url: String,
    pub keypair_path: String,
    pub rpc_url: String,
    pub ws_url: String,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub compute_unit_limit: Option<u32>,
    pub compute_unit_price: Option<u64>,
    pub log_format: LogFormat,
}

fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/")
        && let Some(home) = env::var_os("HOME")
    {
        return format!("{}{}", home.to_string_lossy(), &path[1..]);
    }
    path.to_string()
}

fn optional<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e)),
        _ => Ok(None),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_url = env::var("APP_URL").map_err(|_| anyhow::anyhow!("APP_URL must be set"))?;

        let keypair_path = expand_tilde(
            &env::var("KEYPAIR_PATH").unwrap_or_else(|_| "~/.config/solana/id.json".to_string()),
        );

        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8899".to_string());

        let ws_url = env::var("WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:8900".to_string());

        let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()?;

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()?;

        let log_format = env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .parse::<LogFormat>()?;

        Ok(Self {
            app_url,
            keypair_path,
            rpc_url,
            ws_url,
            poll_interval_secs,
            http_timeout_secs,
            compute_unit_limit: optional("COMPUTE_UNIT_LIMIT")?,
            compute_unit_price: optional("COMPUTE_UNIT_PRICE")?,
            log_format,
        })
    }

    pub fn cluster(&self) -> Cluster {
        Cluster::Custom(self.rpc_url.clone(), self.ws_url.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn compute_budget(&self) -> ComputeBudget {
        ComputeBudget {
            unit_limit: self.compute_unit_limit,
            unit_price: self.compute_unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_directory() {
        let expanded = expand_tilde("~/.config/solana/id.json");
        if let Some(home) = env::var_os("HOME") {
            assert!(expanded.starts_with(&*home.to_string_lossy()));
            assert!(expanded.ends_with("/.config/solana/id.json"));
        }
        assert_eq!(expand_tilde("/etc/keypair.json"), "/etc/keypair.json");
    }

    #[test]
    fn unset_optional_is_none() {
        let value: Option<u64> = optional("POOL_REBALANCER_TEST_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
