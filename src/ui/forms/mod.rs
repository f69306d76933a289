//! Form rendering module
//!
//! This module contains UI components for rendering forms:
//! - `field_renderer`: Field rendering utilities
//! - `auth_form`: Login and registration forms
//! - `predict_form`: The two-step prediction form

mod auth_form;
mod field_renderer;
mod predict_form;

pub use auth_form::{draw_login, draw_register};
pub use predict_form::draw_predict;
