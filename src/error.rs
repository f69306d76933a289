//! Error types shared by the forms and the prediction API client

use thiserror::Error;

/// Failure of a prediction submission, from local file checks through to
/// response parsing. The `Display` text is shown inline under the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("File is too large. Maximum size is 5MB")]
    TooLarge,

    #[error("Invalid file type. Please upload JPEG or PNG files only")]
    InvalidType,

    #[error("Please select a CT scan image")]
    MissingImage,

    #[error("Could not read image: {0}")]
    Unreadable(String),

    #[error("Could not reach the prediction service. Please try again")]
    NetworkFailure,

    #[error("{0}")]
    ServerError(String),

    #[error("Invalid response format from server")]
    MalformedResponse,
}

/// Locally detected input problems. Never sent over the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error(
        "Password must contain at least 8 characters, including uppercase, lowercase, number and special character"
    )]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Failure of a login or registration call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not reach the server. Please try again")]
    NetworkFailure,

    #[error("{0}")]
    ServerError(String),

    #[error("Invalid response format from server")]
    MalformedResponse,
}

/// Rejected follow-up answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FollowUpError {
    #[error("No follow-up question is pending for '{0}'")]
    NotPending(String),

    #[error("'{0}' is not one of the offered answers")]
    UnknownOption(String),
}
