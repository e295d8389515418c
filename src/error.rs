use thiserror::Error;

/// Errors raised while building reaction records or querying their data.
#[derive(Debug, Error)]
pub enum ReactionError {
    /// The Q-value of an output channel is neither a constant nor an XYs1d.
    #[error("unsupported Q form '{label}'")]
    UnsupportedQForm { label: String },

    /// A suite has no form for the requested style label.
    #[error("no form with label '{label}' in suite '{moniker}'")]
    LabelNotFound { moniker: String, label: String },

    /// A suite entry exists but has a different representation than required.
    #[error("form '{label}' in suite '{moniker}' is {found}, expected {expected}")]
    UnexpectedForm {
        moniker: String,
        label: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A form that must be evaluated has no data points.
    #[error("form '{label}' has no data")]
    EmptyForm { label: String },

    #[error("suite '{0}' has no forms")]
    EmptySuite(String),

    #[error("grid index {index} out of range for grid of length {len}")]
    GridIndexOutOfRange { index: usize, len: usize },

    /// Two non-empty multi-group quantities of different sizes were combined.
    #[error("multi-group size mismatch: expected {expected} values, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("matrix row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A particle id was requested that is not in the transportable particle list.
    #[error("particle '{0}' is not in the particle list")]
    MissingParticle(String),

    #[error("output channel of reaction '{0}' has already been replaced")]
    OutputChannelAlreadyReplaced(String),

    #[error("duplicate reaction label '{0}'")]
    DuplicateReactionLabel(String),

    #[error("invalid parse mode '{0}', expected one of: all, multiGroupOnly, readOnly, outline")]
    InvalidParseMode(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReactionError>;
