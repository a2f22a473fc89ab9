use thiserror::Error;

/// Errors produced while parsing, evaluating, or searching a formula.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed formula text.
    #[error("parse error at {position}: {message}")]
    Parse { message: String, position: usize },

    /// An identifier is missing from the assignment.
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    /// A syntax node that has no boolean meaning (e.g. a numeric literal).
    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),

    /// An operator outside of `!`, `&&` and `||`.
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// The variable set is too large to index its hypercube with `u64`.
    #[error("too many variables: {count} (at most {max} are supported)")]
    TooManyVariables { count: usize, max: usize },

    /// The formula tree is deeper than a search accepts.
    #[error("formula nested too deeply: depth {depth} (at most {max} is supported)")]
    TooDeep { depth: usize, max: usize },

    /// Evaluating a candidate panicked inside a worker.
    #[error("evaluation panicked: {0}")]
    EvaluationPanicked(String),

    /// The result channel closed before every outcome arrived.
    ///
    /// Workers report every candidate they claim, so this signals a broken
    /// worker rather than a property of the formula.
    #[error("search observed only {observed} of {total} outcomes")]
    IncompleteSearch { observed: u64, total: u64 },

    /// The worker pool could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }
}
