use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Everything that can go wrong before or during a synthesis run.
///
/// Running out of time is *not* an error: the driver reports it through
/// [`crate::SynthesisResult::timeout`] so callers can still use the best
/// circuit found so far.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The provided stabilizer description does not define a valid tableau.
    #[error("invalid tableau: {0}")]
    InvalidTableau(String),

    /// Unknown or incoherent options. Raised before any encoding or
    /// solver work starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target cannot be reached within the maximum considered
    /// timestep limit, typically under a restrictive coupling constraint.
    #[error("unsatisfiable synthesis: {0}")]
    Unsatisfiable(String),
}

impl SynthesisError {
    pub fn invalid_tableau(msg: impl Into<String>) -> Self {
        SynthesisError::InvalidTableau(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        SynthesisError::Configuration(msg.into())
    }

    pub fn unsatisfiable(msg: impl Into<String>) -> Self {
        SynthesisError::Unsatisfiable(msg.into())
    }
}
