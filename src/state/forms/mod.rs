//! Form domain layer
//!
//! Type-safe form handling for the login, registration and predict views,
//! plus the client-side checks that run before anything is sent.

mod field;
mod form_state;
mod predict_form;
mod validation;

pub use field::FormField;
pub use form_state::{Form, FormState, LoginForm, RegisterForm};
pub use predict_form::{PredictForm, PredictStep, SubmissionPhase, SubmitBlocked};
pub use validation::{SelectedFile, MAX_IMAGE_BYTES};
