//! Error types shared by the prioritization engine.

/// Errors raised while building or querying the annotation landscape.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed coordinates; raised at construction time of a region.
    #[error("invalid coordinates {start}-{end} on {contig} (length {length}): {reason}")]
    InvalidCoordinate {
        contig: String,
        length: u32,
        start: i64,
        end: i64,
        reason: &'static str,
    },
    /// The variant references a contig that is not in the registry.
    #[error("unknown contig {0:?}")]
    UnknownContig(String),
    /// Tissue specificity outside of `[0, 1]`.
    #[error("tissue specificity tau={tau} of enhancer {id} is outside of [0, 1]")]
    InvalidTau { id: String, tau: f64 },
    /// Boundary stability outside of `[0, 1]`.
    #[error("stability {stability} of TAD boundary {id} is outside of [0, 1]")]
    InvalidStability { id: String, stability: f64 },
    /// Input row that could not be parsed into a variant record.
    #[error("unparseable record in line {line}: {message}")]
    UnparseableRecord { line: u64, message: String },
    /// Variant record inconsistent with its SV type.
    #[error("invalid {sv_type} variant {id}: {reason}")]
    InvalidVariant {
        id: String,
        sv_type: String,
        reason: &'static str,
    },
    /// No annotation records at all were provided to build the landscape.
    #[error("cannot build annotation landscape from empty input")]
    EmptyLandscape,
    /// Inconsistent scoring configuration.
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),
}
