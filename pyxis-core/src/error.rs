//! Error taxonomy for binding operations

use thiserror::Error;

/// Error produced by the vendor transport.
///
/// The binder never inspects, wraps or reinterprets these; the caller's retry
/// policy needs the original classification.
pub type VendorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving, binding, verifying or unbinding
#[derive(Debug, Error)]
pub enum BindError {
    /// The raw identifier matches neither known format.
    /// Local validation, never reaches the vendor.
    #[error("unrecognized binding identifier: {0:?}")]
    AmbiguousIdentity(String),

    /// Structurally impossible selector pairing.
    /// Local validation, never reaches the vendor.
    #[error("invalid selector combination: {0}")]
    InvalidCombination(&'static str),

    /// Verification found no matching record.
    #[error("binding {0} not found")]
    NotFound(String),

    /// Verification matched more than one record, or the vendor response
    /// broke the environment's addressing rules. Never auto-resolved.
    #[error("invariant violation for binding {id}: {detail}")]
    InvariantViolation { id: String, detail: String },

    /// Records remained after the disassociate call completed.
    #[error("binding {0} still present after disassociate")]
    TeardownFailed(String),

    /// Vendor transport error, surfaced verbatim.
    #[error("{0}")]
    Vendor(VendorError),
}

impl From<VendorError> for BindError {
    fn from(err: VendorError) -> Self {
        Self::Vendor(err)
    }
}

impl BindError {
    /// True for errors raised by local validation, before any vendor call.
    /// These are never worth retrying.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousIdentity(_) | Self::InvalidCombination(_)
        )
    }
}

/// Result type for binder operations
pub type BindResult<T> = Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_errors_are_flagged() {
        assert!(BindError::AmbiguousIdentity("x".to_string()).is_local());
        assert!(BindError::InvalidCombination("both selectors set").is_local());
        assert!(!BindError::NotFound("eipassoc-1".to_string()).is_local());
        assert!(!BindError::TeardownFailed("eipassoc-1".to_string()).is_local());
    }

    #[test]
    fn vendor_error_display_is_untouched() {
        let vendor: VendorError = "RequestLimitExceeded: slow down".into();
        let err = BindError::from(vendor);
        assert_eq!(err.to_string(), "RequestLimitExceeded: slow down");
    }
}
