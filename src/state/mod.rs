//! Application state module

mod app_state;
mod forms;
mod navigation;
mod results;
mod session;
mod symptoms;

pub use app_state::*;
pub use forms::*;
pub use navigation::PredictionHandoff;
pub use results::{ConfidenceBucket, PredictionResult};
pub use session::Session;
pub use symptoms::{find_symptom, symptom_catalog, Symptom};
