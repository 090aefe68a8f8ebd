//! Error types for rpnkit.

use thiserror::Error;

/// Result alias for rpnkit operations.
pub type RpnResult<T> = std::result::Result<T, RpnError>;

/// Errors that can occur while generating stage-1 proposals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpnError {
    /// Activation name outside the supported set.
    ///
    /// A configuration error, not a data error: the caller picked a mode
    /// this pipeline does not implement.
    #[error("unsupported activation {name:?} (expected \"exclusive\" or \"independent\")")]
    UnsupportedActivation {
        /// The rejected mode name.
        name: String,
    },
    /// Box-encoding name outside the supported set.
    #[error("unsupported box encoding {name:?}")]
    UnsupportedEncoding {
        /// The rejected scheme name.
        name: String,
    },
    /// A dimension disagrees with what the proposal layout requires.
    #[error("shape mismatch for {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Size required by the layout invariant.
        expected: usize,
        /// Size actually observed.
        got: usize,
        /// Which dimension disagreed.
        context: &'static str,
    },
    /// A class label does not fit the one-hot width of the active mode.
    #[error("class label {label} out of range for {classes} classes")]
    ClassLabelOutOfRange {
        /// The offending label.
        label: usize,
        /// One-hot width it was checked against.
        classes: usize,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
