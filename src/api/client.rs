//! HTTP client for the prediction service
//!
//! Speaks the service's plain HTTP API: multipart `POST /predict`, JSON
//! `POST /register` and `POST /login`.

use super::traits::PredictionApi;
use super::types::{
    parse_prediction, server_error_message, LoginRequest, LoginResponse, PredictionRequest,
    RegistrationRequest, ResponseShape,
};
use crate::config::AppConfig;
use crate::error::{AuthError, UploadError};
use crate::state::{PredictionResult, MAX_IMAGE_BYTES};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Client for the prediction service
pub struct PredictionClient {
    http: reqwest::Client,
    /// Base URL without trailing slash
    endpoint: String,
    response_shape: ResponseShape,
}

impl PredictionClient {
    /// Create a new client. `timeout` bounds each request end to end.
    pub fn new(endpoint: &str, timeout: Duration, response_shape: ResponseShape) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            response_shape,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.endpoint(),
            config.request_timeout(),
            config.response_shape(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn build_form(request: &PredictionRequest) -> Result<Form, UploadError> {
        let symptoms = serde_json::Value::from(request.symptoms.clone()).to_string();
        let mut form = Form::new();

        if let Some(image) = &request.image {
            let bytes = tokio::fs::read(&image.path)
                .await
                .map_err(|e| UploadError::Unreadable(e.to_string()))?;
            // The file may have changed since it was validated
            if bytes.len() as u64 > MAX_IMAGE_BYTES {
                return Err(UploadError::TooLarge);
            }
            let part = Part::bytes(bytes)
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|_| UploadError::InvalidType)?;
            form = form.part("image", part);
        }

        if !request.name.is_empty() {
            form = form.text("name", request.name.clone());
        }
        if !request.age.is_empty() {
            form = form.text("age", request.age.clone());
        }
        Ok(form.text("symptoms", symptoms))
    }
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResult, UploadError> {
        let url = self.url("predict");
        tracing::info!(
            submission_id = %request.submission_id,
            symptoms = request.symptoms.len(),
            has_image = request.image.is_some(),
            "Submitting prediction request"
        );

        let form = Self::build_form(&request).await?;

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(submission_id = %request.submission_id, error = %e, "Prediction request failed");
                UploadError::NetworkFailure
            })?;

        let status = response.status();
        if !status.is_success() {
            // A body that fails to arrive is treated like one that does not parse
            let body = response.bytes().await.ok();
            let message = body
                .as_deref()
                .and_then(server_error_message)
                .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));
            tracing::warn!(submission_id = %request.submission_id, status = status.as_u16(), %message, "Prediction rejected");
            return Err(UploadError::ServerError(message));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(submission_id = %request.submission_id, error = %e, "Failed to read prediction response");
            UploadError::NetworkFailure
        })?;

        let result = parse_prediction(&body, self.response_shape)?;
        tracing::info!(
            submission_id = %request.submission_id,
            likelihood = result.likelihood_percent,
            "Prediction received"
        );
        Ok(result)
    }

    async fn register(&self, request: RegistrationRequest) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("register"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Registration request failed");
                AuthError::NetworkFailure
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(email = %request.email, "Registered account");
            return Ok(());
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(AuthError::ServerError(
            server_error_message(&body).unwrap_or_else(|| "Registration failed".to_string()),
        ))
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let response = self
            .http
            .post(self.url("login"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Login request failed");
                AuthError::NetworkFailure
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.ok();
            return Err(AuthError::ServerError(
                body.as_deref()
                    .and_then(server_error_message)
                    .unwrap_or_else(|| "Invalid email or password".to_string()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|_| AuthError::NetworkFailure)?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "Unexpected login response");
            AuthError::MalformedResponse
        })
    }
}
