use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::RpcError;
use thiserror::Error;

/// JSON-RPC "invalid params", returned e.g. when the address is not a token mint.
const INVALID_PARAMS: i64 = -32602;

/// Responses that repeat on every attempt: invalid request, method not found
/// (e.g. getProgramAccounts disabled), and keys excluded from the node's
/// secondary index.
const PERMANENT_RPC_ERRORS: [i64; 3] = [-32600, -32601, -32010];

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid mint: {0}")]
    InvalidMint(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by RPC endpoint: {0}")]
    RateLimited(String),

    #[error("Malformed account data: {0}")]
    MalformedAccountData(String),

    #[error("Request rejected by RPC endpoint: {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::RateLimited(_))
    }

    /// Maps a client error raised while querying `mint` itself, where an
    /// invalid-params response means the address is not a token mint.
    pub fn from_mint_query(mint: &str, err: ClientError) -> Self {
        if let ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) = err.kind() {
            if *code == INVALID_PARAMS {
                return GatewayError::InvalidMint(format!("{}: {}", mint, message));
            }
        }
        GatewayError::from(err)
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        let (rate_limited, permanent) = match err.kind() {
            ClientErrorKind::Reqwest(e) => (e.status().map(|s| s.as_u16()) == Some(429), false),
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) => {
                (false, PERMANENT_RPC_ERRORS.contains(code))
            }
            _ => (false, false),
        };
        let message = err.to_string();
        if permanent {
            GatewayError::Rejected(message)
        } else if rate_limited || message.to_lowercase().contains("too many requests") {
            GatewayError::RateLimited(message)
        } else {
            GatewayError::Network(message)
        }
    }
}
