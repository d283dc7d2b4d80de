//! Error types for calls to the fee-claim service and the RPC node

use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::RpcError;
use thiserror::Error;

/// Errors that can occur while talking to an external service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    // Transport errors
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    // Payload errors
    #[error("Malformed response: {0}")]
    Malformed(String),

    // Remote rejection (JSON-RPC error object)
    #[error("RPC error {code}: {message}")]
    Rejected { code: i64, message: String },

    // Local signing
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl ServiceError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ServiceError::Malformed(reason.into())
    }

    /// Short label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Network(_) => "network",
            ServiceError::Status { .. } => "status",
            ServiceError::Malformed(_) => "malformed",
            ServiceError::Rejected { .. } => "rejected",
            ServiceError::Signing(_) => "signing",
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Malformed(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::Reqwest(e) => match e.status() {
                Some(status) => ServiceError::Status {
                    status: status.as_u16(),
                    body: e.to_string(),
                },
                None if e.is_decode() => ServiceError::Malformed(e.to_string()),
                None => ServiceError::Network(e.to_string()),
            },
            ClientErrorKind::Io(e) => ServiceError::Network(e.to_string()),
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) => {
                ServiceError::Rejected {
                    code: *code,
                    message: message.clone(),
                }
            }
            ClientErrorKind::RpcError(RpcError::ParseError(e)) => ServiceError::Malformed(e.clone()),
            ClientErrorKind::SerdeJson(e) => ServiceError::Malformed(e.to_string()),
            ClientErrorKind::SigningError(e) => ServiceError::Signing(e.to_string()),
            _ => ServiceError::Network(err.to_string()),
        }
    }
}

impl From<bincode::Error> for ServiceError {
    fn from(err: bincode::Error) -> Self {
        ServiceError::Malformed(format!("transaction decode: {}", err))
    }
}

impl From<solana_sdk::signer::SignerError> for ServiceError {
    fn from(err: solana_sdk::signer::SignerError) -> Self {
        ServiceError::Signing(err.to_string())
    }
}
