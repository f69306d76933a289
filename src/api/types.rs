//! Request and response shapes exchanged with the prediction service

use crate::error::UploadError;
use crate::state::{PredictionResult, SelectedFile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything needed for one `POST /predict`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Correlates log lines and the result hand-off; not sent to the server
    pub submission_id: Uuid,
    pub image: Option<SelectedFile>,
    /// Symptoms in backend vocabulary
    pub symptoms: Vec<String>,
    pub name: String,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// JSON layout of a successful prediction response.
///
/// Services produce one or the other; the client is configured for the one
/// it talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// `{"prediction": {"likelihood": 85.3, "recommendation": "..."}}`
    #[default]
    Nested,
    /// `{"COVID-19 Likelihood": "85.3%", "Recommendation": "..."}`
    Flat,
}

#[derive(Deserialize)]
struct NestedBody {
    prediction: NestedPrediction,
}

#[derive(Deserialize)]
struct NestedPrediction {
    likelihood: f64,
    recommendation: String,
}

#[derive(Deserialize)]
struct FlatBody {
    #[serde(rename = "COVID-19 Likelihood")]
    likelihood: LikelihoodValue,
    #[serde(rename = "Recommendation")]
    recommendation: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LikelihoodValue {
    Number(f64),
    Text(String),
}

impl LikelihoodValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a 2xx prediction body
pub fn parse_prediction(body: &[u8], shape: ResponseShape) -> Result<PredictionResult, UploadError> {
    let (likelihood, recommendation) = match shape {
        ResponseShape::Nested => {
            let parsed: NestedBody = serde_json::from_slice(body).map_err(|e| {
                tracing::debug!(error = %e, "Prediction body does not match nested shape");
                UploadError::MalformedResponse
            })?;
            (
                Some(parsed.prediction.likelihood),
                parsed.prediction.recommendation,
            )
        }
        ResponseShape::Flat => {
            let parsed: FlatBody = serde_json::from_slice(body).map_err(|e| {
                tracing::debug!(error = %e, "Prediction body does not match flat shape");
                UploadError::MalformedResponse
            })?;
            (parsed.likelihood.as_f64(), parsed.recommendation)
        }
    };

    let likelihood = likelihood
        .and_then(round_likelihood)
        .ok_or(UploadError::MalformedResponse)?;
    Ok(PredictionResult::new(likelihood, recommendation))
}

/// Round to the nearest whole percent, clamped to 0..=100
fn round_likelihood(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 100.0) as u8)
}

/// Message from a JSON error body (`error`, else `message`), if any
pub fn server_error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
