//! Error types for pg-anyset.
//!
//! Only hard failures live here. A fragment that does not match the
//! `IN (?)` grammar, or a list that fails validation, is not an error: the
//! rewriter simply leaves the node alone.

use thiserror::Error;

use crate::ast::ElemKind;

/// The main error type for pg-anyset operations.
#[derive(Debug, Error)]
pub enum AnysetError {
    /// The codec was handed a source value it cannot read an array from.
    #[error("unsupported conversion from {found} to {target} array")]
    TypeMismatch {
        found: &'static str,
        target: ElemKind,
    },

    /// The element kind has no decoder.
    #[error("{0} arrays cannot be decoded")]
    UnsupportedKind(ElemKind),

    /// An unsigned value does not fit the signed Postgres parameter type.
    #[error("{value} is out of range for a {target} parameter")]
    OutOfRange { value: u64, target: &'static str },

    /// A parameter could not be bound onto the query.
    #[error("Bind error: {0}")]
    Bind(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnysetError {
    /// Create a type mismatch error for a source value.
    pub fn mismatch(found: &'static str, target: ElemKind) -> Self {
        Self::TypeMismatch { found, target }
    }
}

/// Result type alias for pg-anyset operations.
pub type AnysetResult<T> = Result<T, AnysetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnysetError::mismatch("int64", ElemKind::Int32);
        assert_eq!(
            err.to_string(),
            "unsupported conversion from int64 to int32 array"
        );
        assert_eq!(
            AnysetError::UnsupportedKind(ElemKind::Uint8).to_string(),
            "uint8 arrays cannot be decoded"
        );
    }
}
