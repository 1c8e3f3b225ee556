/// Error types shared by the data-access layer and the wizards
use thiserror::Error;

/// Errors raised while talking to the training backend (or its fixtures)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure: connection refused, DNS, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("API error: {status} {reason}")]
    Status {
        status: u16,
        reason: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors returned by wizard operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    /// The current step's requirements are not met (or a required load is still running)
    #[error("Step {0} is not complete")]
    StepBlocked(u8),

    /// Submit was requested before reaching the final step
    #[error("Submit is only available on the final step (currently on step {0})")]
    NotOnFinalStep(u8),

    /// A submission for this wizard is already in flight
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// The dataset wizard has no usable preview to save
    #[error("No data preview has been fetched")]
    MissingPreview,

    /// A field value was rejected (unknown name, wrong type, not in its catalogue)
    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },

    /// The backend call behind the operation failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
