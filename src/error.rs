use crate::core::model::CollectionId;
use derive_more::{Display, Error, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From, Error)]
pub enum Error {
    #[from]
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    #[from]
    #[display("Malformed shelf data: {_0}")]
    Json(serde_json::Error),

    #[display("Pin limit of {limit} reached")]
    PinLimitReached { limit: usize },

    #[display("Collection {collection} is already pinned")]
    AlreadyPinned { collection: CollectionId },

    #[display("Not authenticated: no user id could be resolved")]
    NotAuthenticated,

    #[display("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[display("Collection {collection} is already syncing")]
    SyncInProgress { collection: CollectionId },

    #[display("Cannot move pin from {from} to {to} in a list of {len}")]
    InvalidMove { from: usize, to: usize, len: usize },

    #[display("{failed} of {total} position updates failed")]
    PartialBatch { failed: usize, total: usize },

    #[display("Invalid input: {message}")]
    Validation { message: String },

    #[display("{message}")]
    Custom { message: String },
}

impl Error {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Capacity errors are recoverable by evicting a pin with `replace`.
    pub fn is_pin_limit(&self) -> bool {
        matches!(self, Self::PinLimitReached { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn read() -> super::Result<()> {
            let write: std::io::Result<()> = Err(std::io::Error::other("disk gone"));
            write?;
            Ok(())
        }
        let err = read().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: disk gone");
    }

    #[test]
    fn pin_limit_is_recognised() {
        let err = Error::PinLimitReached { limit: 6 };
        assert!(err.is_pin_limit());
        assert_eq!(err.to_string(), "Pin limit of 6 reached");
        assert!(!Error::custom("boom").is_pin_limit());
    }
}
