use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the managed pool program.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Invalid pool address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Token index {0} out of range")]
    TokenIndex(usize),

    #[error("Simulation of {instruction} failed: {reason}")]
    Simulation {
        instruction: &'static str,
        reason: String,
    },
}

/// Failures talking to the backend API.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: StatusCode, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
