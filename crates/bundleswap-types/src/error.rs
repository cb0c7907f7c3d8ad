//! Error types for the BundleSwap escrow.
//!
//! All errors use the `SW_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Offer lifecycle errors
//! - 3xx: Bundle errors
//! - 4xx: Asset transfer errors
//! - 5xx: Audit errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, ContractAddress, DefinedOfferId, DisplayedOfferId, OfferRef};

/// Central error enum for all BundleSwap operations.
#[derive(Debug, Error)]
pub enum SwapError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller may not act as the maker: it did not make the offer, or it
    /// is the custodian trying to make one.
    #[error("SW_ERR_100: Unauthorized: caller {caller} may not act as maker {maker}")]
    Unauthorized { caller: AccountId, maker: AccountId },

    // =================================================================
    // Offer Lifecycle Errors (2xx)
    // =================================================================
    /// The offer was already cancelled or accepted.
    #[error("SW_ERR_200: Offer already inactive: {0}")]
    AlreadyInactive(OfferRef),

    /// No offer exists at this id.
    #[error("SW_ERR_201: Offer id out of range: {0}")]
    OutOfRange(OfferRef),

    /// A defined offer referenced a displayed offer that does not exist.
    #[error("SW_ERR_202: Invalid reference to {0}")]
    InvalidReference(DisplayedOfferId),

    /// The defined offer answers a different displayed offer.
    #[error(
        "SW_ERR_203: Mismatched reference: {defined} answers {referenced}, not {displayed}"
    )]
    MismatchedReference {
        displayed: DisplayedOfferId,
        defined: DefinedOfferId,
        referenced: DisplayedOfferId,
    },

    /// Offer metadata failed validation.
    #[error("SW_ERR_204: Invalid offer: {reason}")]
    InvalidOffer { reason: String },

    // =================================================================
    // Bundle Errors (3xx)
    // =================================================================
    /// The bundle is structurally invalid.
    #[error("SW_ERR_300: Invalid bundle: {reason}")]
    InvalidBundle { reason: String },

    // =================================================================
    // Asset Transfer Errors (4xx)
    // =================================================================
    /// The asset contract is unknown or implements none of the supported
    /// transfer interfaces.
    #[error("SW_ERR_400: Unsupported asset {contract}: {reason}")]
    UnsupportedAsset {
        contract: ContractAddress,
        reason: String,
    },

    /// An asset contract refused or could not perform a transfer.
    #[error("SW_ERR_401: Transfer failed on {contract}: {reason}")]
    TransferFailed {
        contract: ContractAddress,
        reason: String,
    },

    /// Undoing a partially executed transfer failed. Assets may be split
    /// between parties and need manual reconciliation.
    #[error("SW_ERR_402: Rollback failed: {reason}")]
    RollbackFailed { reason: String },

    // =================================================================
    // Audit Errors (5xx)
    // =================================================================
    /// Custody does not hold what the available offers say it holds.
    #[error("SW_ERR_500: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    /// The event log hash chain does not verify.
    #[error("SW_ERR_501: Event chain broken at sequence {sequence}")]
    EventChainBroken { sequence: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SW_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SW_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("SW_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapError>;

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_inactive_display() {
        let err = SwapError::AlreadyInactive(OfferRef::Displayed(DisplayedOfferId(3)));
        let msg = format!("{err}");
        assert!(msg.starts_with("SW_ERR_200"), "Got: {msg}");
        assert!(msg.contains("displayed:3"));
    }

    #[test]
    fn mismatched_reference_display() {
        let err = SwapError::MismatchedReference {
            displayed: DisplayedOfferId(1),
            defined: DefinedOfferId(4),
            referenced: DisplayedOfferId(2),
        };
        let msg = format!("{err}");
        assert!(msg.contains("SW_ERR_203"));
        assert!(msg.contains("defined:4"));
        assert!(msg.contains("displayed:2"));
        assert!(msg.contains("displayed:1"));
    }

    #[test]
    fn json_errors_convert() {
        let err: SwapError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, SwapError::Serialization(_)));
    }

    #[test]
    fn all_errors_have_sw_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SwapError::Unauthorized {
                caller: AccountId::fixed(1),
                maker: AccountId::fixed(2),
            }),
            Box::new(SwapError::OutOfRange(OfferRef::Defined(DefinedOfferId(0)))),
            Box::new(SwapError::InvalidReference(DisplayedOfferId(9))),
            Box::new(SwapError::UnsupportedAsset {
                contract: ContractAddress::fixed(1),
                reason: "no interface".into(),
            }),
            Box::new(SwapError::RollbackFailed {
                reason: "test".into(),
            }),
            Box::new(SwapError::EventChainBroken { sequence: 2 }),
            Box::new(SwapError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SW_ERR_"),
                "Error missing SW_ERR_ prefix: {msg}"
            );
        }
    }
}
