//! Crate-wide error type.
//!
//! The three variants mirror the three distinguishable failure kinds a caller
//! may need to match on: malformed input, an unsupported configuration, and
//! PRF exhaustion (always a caller bug).

/// Errors raised at a fallible boundary of the algebraic layer, the Kyber
/// extensions, K-PKE, or ML-KEM.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Wrong-length buffer, mismatched modulus, empty container, or a
    /// coefficient count that doesn't match the ring degree.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A parameter set or ring configuration this crate does not implement.
    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    /// The PRF counter would exceed 255. Always indicates a caller bug.
    #[error("PRF counter exhausted")]
    PrfExhausted,
}
