use thiserror::Error;

/// Errors raised by the problem representation, the solvers and policy persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// An entity lookup by value or by name failed.
    #[error("{kind} '{name}' was not found")]
    NotFound { kind: &'static str, name: String },

    /// A positional lookup fell outside the collection.
    #[error("index {index} is out of range for a collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A collection or factored space is not in a usable state.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A policy was queried where no mapping exists.
    #[error("policy undefined: {0}")]
    PolicyUndefined(String),

    /// A solver was handed a problem it cannot solve.
    #[error("incompatible problem shape: {0}")]
    IncompatibleProblemShape(String),

    /// The numerics could not produce an answer (singular system, empty LP, zero normalizer).
    #[error("numeric failure: {0}")]
    NumericFailure(String),

    /// A policy file contained an unusable line.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A failure tied to a specific line of a policy file, such as an unknown name.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    /// Attaches the 1-based line number of the policy file being read.
    pub(crate) fn at_line(self, line: usize) -> Self {
        Error::AtLine {
            line,
            source: Box::new(self),
        }
    }
}
