use gateway_chain_api::ChainApiError;

/// Unified error taxonomy for the gateway core (§7). Translated to an HTTP
/// status and plain-text body only at the `gateway-rpc-builder` boundary;
/// subscription tasks never translate this to HTTP after the WebSocket
/// upgrade.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    LimitExceeded(String),

    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// WebSocket peer went away. Silent: no response is ever written.
    #[error("client closed")]
    ClientClosed,

    /// Server is shutting down. A close frame is sent; this is never
    /// surfaced as an HTTP error.
    #[error("shutdown")]
    Shutdown,
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn limit_exceeded(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }
}

impl From<ChainApiError> for ApiError {
    fn from(err: ChainApiError) -> Self {
        match err {
            ChainApiError::CursorOutOfRange => {
                Self::LimitExceeded("backtrace limit exceeded".to_string())
            }
            other => Self::Collaborator(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
