//! Error types for the scalogram-wavelet crate.

/// Error type for all fallible operations in the scalogram-wavelet crate.
///
/// Failures surface at construction, in a setter, or on the first access to
/// a derived quantity. A failed access caches nothing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CwtError {
    /// Returned for a non-positive `dt` or `dj`, an invalid kernel parameter,
    /// an invalid convolution width, or an unrecognized wavelet name.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Returned when the series cannot support even the smallest scale.
    #[error("insufficient data: got {len} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        len: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the input data contains non-finite values (NaN or infinity).
    #[error("input data contains non-finite values")]
    NonFiniteData,
}

impl CwtError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
