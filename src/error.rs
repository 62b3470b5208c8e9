use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Order creation failed: {0}")]
    OrderCreationError(#[source] Box<PaymentError>),
    #[error("Settlement failed: {0}")]
    SettlementError(#[source] Box<PaymentError>),
    #[error("Gateway error: {0}")]
    GatewayError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Transaction aborted after {attempts} attempts")]
    TransactionAborted { attempts: u32 },
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;

impl PaymentError {
    /// HTTP-equivalent status used to classify the failure for callers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) | Self::InvalidSignature => 400,
            Self::OrderNotFound(_) => 404,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Message safe to hand back to the client. Internal causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError(msg) => msg.clone(),
            Self::InvalidSignature => "Invalid signature".to_string(),
            Self::OrderNotFound(_) => "Order not found".to_string(),
            Self::OrderCreationError(_) => "Order creation failed".to_string(),
            _ => "Verification failed".to_string(),
        }
    }
}
