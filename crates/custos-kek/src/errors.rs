//! Error types for bundle operations
//!
//! Every variant names the slot or check value involved so an operator
//! knows which custodian to ask for a resubmission. Failures never mutate
//! the bundle and nothing is retried automatically.

use custos_cipher::CipherError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    /// Component hex was malformed, decoded to a wrong length, or the
    /// cipher could not be constructed from it.
    #[error("slot {slot}: invalid key component: {source}")]
    InvalidComponent { slot: u32, source: CipherError },

    /// The component's check value failed to verify, or its length falls
    /// outside the accepted 2..=8 byte truncation range.
    #[error("slot {slot}: component check value {check_value:?} does not tally")]
    CheckValueMismatch { slot: u32, check_value: String },

    /// The combined bytes failed to construct a cipher. Components are
    /// validated on admission, so this is defensive.
    #[error("combined components do not form a valid key: {0}")]
    InvalidDerivedKey(#[source] CipherError),

    /// The reconstructed key does not match the bundle's expected check
    /// value: wrong components, tampering, or custodian error. The derived
    /// key is withheld.
    #[error("derived key check value does not tally with expected {expected:?}")]
    FinalCheckValueMismatch { expected: String },

    /// Merge was asked to fail fast on an incomplete bundle
    /// (see [`MergePolicy`](crate::MergePolicy)).
    #[error("bundle holds {got} of {expected} expected components")]
    IncompleteBundle { got: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, BundleError>;
