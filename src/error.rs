use thiserror::Error;

/// Errors raised by the mismatch, frequency, and mutation computations.
///
/// These are caller-input errors: they are reported at the point of detection and never retried.
/// At the application boundary they convert into a [`color_eyre::eyre::Report`] with `?`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A frequency was requested over zero isolates.
    #[error("No isolates were selected, frequencies are undefined for an empty subset.")]
    EmptySubset,
    /// Frequency threshold outside of `[0, 1]`.
    #[error("Threshold {0} is outside of the range [0, 1].")]
    InvalidThreshold(f64),
    /// Annotation that does not split into four fields, only raised with strict parsing.
    #[error("Annotation of marker {marker:?} is not 4 comma-separated fields: {raw:?}")]
    MalformedAnnotation { marker: String, raw: String },
    /// A row whose number of calls differs from the number of markers.
    #[error("{id:?} has {found} values, but there are {expected} markers.")]
    LengthMismatch { id: String, expected: usize, found: usize },
    /// Selected isolate that is not a (non-reserved) row of the matrix.
    #[error("Isolate {0:?} was not found in the sequence matrix.")]
    UnknownIsolate(String),
    /// Selected group label that no isolate carries.
    #[error("Group {0:?} was not found in the sequence matrix.")]
    UnknownGroup(String),
    /// Annotation field order that is not a permutation of the four fields.
    #[error("Annotation schema {0:?} must list mutation, gene, locus, and substitution exactly once.")]
    InvalidSchema(String),
}
