//! Prediction service client module for HTTP communication

mod client;
mod traits;
mod types;

pub use client::PredictionClient;
pub use traits::PredictionApi;
pub use types::{
    LoginRequest, LoginResponse, LoginUser, PredictionRequest, RegistrationRequest, ResponseShape,
};

#[cfg(test)]
pub use traits::MockPredictionApi;
