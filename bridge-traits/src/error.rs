use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` when the failure came from the network rather than local storage.
    pub fn is_network(&self) -> bool {
        matches!(self, BridgeError::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
