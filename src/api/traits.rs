//! Trait abstraction for the prediction service to enable mocking in tests

use super::types::{LoginRequest, LoginResponse, PredictionRequest, RegistrationRequest};
use crate::error::{AuthError, UploadError};
use crate::state::PredictionResult;
use async_trait::async_trait;

/// Operations the client performs against the remote service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Upload symptoms and image; one attempt, no retry
    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResult, UploadError>;

    /// Create an account
    async fn register(&self, request: RegistrationRequest) -> Result<(), AuthError>;

    /// Exchange credentials for an access token
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError>;
}
