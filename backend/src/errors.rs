use thiserror::Error;

/// Failures surfaced by the storage layer.
///
/// The store only distinguishes "no rows affected", "unique violation", and
/// everything else; classifying these into caller-visible kinds is the
/// service layer's job.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write matched zero rows. For the token-guarded update
    /// this is ambiguous between a missing id and a stale token.
    #[error("no rows modified")]
    NoRowsModified,
    /// The unique email constraint rejected an insert
    #[error("unique constraint violation")]
    UniqueViolation,
    /// A stored value could not be decoded into its domain type
    #[error("invalid stored value: {0}")]
    Decode(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Caller-visible error kinds returned by the customer service.
///
/// Matched structurally by the presentation layer; every kind is terminal
/// for the request it occurred in and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Field, format, or age validation failed
    #[error("{0}")]
    InvalidInput(String),
    #[error("provided email address is already in use, please provide another one")]
    EmailAlreadyUsed,
    #[error("customer was already edited, please load the latest data")]
    EditConflict,
    #[error("customer does not exist")]
    NotFound,
    #[error("search criteria is missing a sort direction")]
    BadSearchCriteria,
    #[error("something went wrong, please try again later")]
    Internal,
}

impl ServiceError {
    /// Stable machine-readable code for transport layers
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "InvalidData",
            ServiceError::EmailAlreadyUsed => "EmailTaken",
            ServiceError::EditConflict => "OverwriteData",
            ServiceError::NotFound => "CustomerNotFound",
            ServiceError::BadSearchCriteria => "BadSearchCriteria",
            ServiceError::Internal => "ServerInternal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_codes_are_distinct() {
        let errors = [
            ServiceError::InvalidInput("bad field".to_string()),
            ServiceError::EmailAlreadyUsed,
            ServiceError::EditConflict,
            ServiceError::NotFound,
            ServiceError::BadSearchCriteria,
            ServiceError::Internal,
        ];

        for (i, a) in errors.iter().enumerate() {
            for b in errors.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn test_invalid_input_carries_its_message() {
        let err = ServiceError::InvalidInput("first name is required".to_string());
        assert_eq!(err.to_string(), "first name is required");
    }

    #[test]
    fn test_internal_error_is_opaque() {
        // The internal kind must not leak storage detail to the caller
        let message = ServiceError::Internal.to_string();
        assert!(!message.contains("database"));
        assert!(!message.contains("sql"));
    }
}
