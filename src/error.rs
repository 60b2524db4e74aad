use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Failure taxonomy for the checkout core.
///
/// Every variant maps to a stable machine-readable kind (see [`CheckoutError::kind`])
/// plus the human-readable message rendered by `Display`. Ownership mismatches are
/// reported as `NotFoundError` so callers cannot probe for the existence of orders
/// they do not own.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("invalid request: {0}")]
    ValidationError(String),
    #[error("not enough stock for {product_id}")]
    InsufficientStockError { product_id: String },
    #[error("order not found")]
    NotFoundError,
    #[error("order already paid")]
    AlreadyPaidError,
    #[error("no active challenge for this order")]
    NoChallengeError,
    #[error("challenge expired")]
    ExpiredChallengeError,
    #[error("invalid confirmation code")]
    CodeMismatchError,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

impl CheckoutError {
    /// Stable identifier for the failure kind, suitable for wire formats and
    /// audit metadata. Messages may change; these strings do not.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation",
            Self::InsufficientStockError { .. } => "insufficient_stock",
            Self::NotFoundError => "not_found",
            Self::AlreadyPaidError => "already_paid",
            Self::NoChallengeError => "no_challenge",
            Self::ExpiredChallengeError => "challenge_expired",
            Self::CodeMismatchError => "code_mismatch",
            Self::CsvError(_) => "csv",
            Self::IoError(_) => "io",
            Self::InternalError(_) => "internal",
        }
    }
}
