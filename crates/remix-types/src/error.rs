use thiserror::Error;

/// Errors from building a prompt or calling the generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A required input was empty; no call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport-level failure (timeout, DNS, connection refused).
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with an error envelope.
    #[error("provider error{}: {message}", format_code(.status, .code))]
    Provider {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    /// The provider's success envelope lacked the expected text payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn format_code(status: &Option<u16>, code: &Option<String>) -> String {
    match (status, code) {
        (Some(s), Some(c)) => format!(" ({s} {c})"),
        (Some(s), None) => format!(" ({s})"),
        (None, Some(c)) => format!(" ({c})"),
        (None, None) => String::new(),
    }
}

impl GenerationError {
    /// Stable snake_case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::Network(_) => "network_error",
            GenerationError::Provider { .. } => "provider_error",
            GenerationError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Errors from repository operations (used by the store port in remix-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by the curation controller.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("post not found")]
    NotFound,

    /// The candidate does not belong to the current generation cycle.
    #[error("unknown candidate at position {0}")]
    UnknownCandidate(usize),

    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },
}

impl CurationError {
    /// Stable snake_case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CurationError::Generation(e) => e.kind(),
            CurationError::InvalidInput(_) => "invalid_input",
            CurationError::StoreUnavailable(_) => "store_unavailable",
            CurationError::NotFound => "not_found",
            CurationError::UnknownCandidate(_) => "unknown_candidate",
            CurationError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

impl From<RepositoryError> for CurationError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => CurationError::NotFound,
            other => CurationError::StoreUnavailable(other.to_string()),
        }
    }
}
