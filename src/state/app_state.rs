//! Application state types

use super::forms::FormState;
use super::navigation::{PredictionHandoff, ResultHandoff};
use super::results::{present, Presentation, PredictionResult};
use super::session::Session;
use std::collections::VecDeque;
use std::time::Instant;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Register,
    Home,
    Predict,
    Results,
}

impl View {
    /// Views that need a logged-in session
    pub fn requires_auth(&self) -> bool {
        matches!(self, View::Home | View::Predict | View::Results)
    }

    /// Views that only make sense when logged out
    pub fn is_auth_view(&self) -> bool {
        matches!(self, View::Login | View::Register)
    }

    /// Check if this view is a form view (skipped when going back)
    pub fn is_form_view(&self) -> bool {
        matches!(self, View::Login | View::Register | View::Predict)
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Sign In",
            View::Register => "Create Account",
            View::Home => "Home",
            View::Predict => "New Prediction",
            View::Results => "Results",
        }
    }
}

/// Entries on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeAction {
    #[default]
    StartPrediction,
    LastResult,
    Logout,
}

impl HomeAction {
    pub const ALL: [HomeAction; 3] = [
        HomeAction::StartPrediction,
        HomeAction::LastResult,
        HomeAction::Logout,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HomeAction::StartPrediction => "Start a new prediction",
            HomeAction::LastResult => "View results",
            HomeAction::Logout => "Log out",
        }
    }

    pub fn key(&self) -> char {
        match self {
            HomeAction::StartPrediction => 'p',
            HomeAction::LastResult => 'r',
            HomeAction::Logout => 'l',
        }
    }
}

/// Fallback text when the results view opens without a handed-off result
pub const NO_PREDICTION_TEXT: &str = "No prediction available";

/// What the results view is displaying
#[derive(Debug, Clone)]
pub struct ResultsScreen {
    pub result: PredictionResult,
    pub presentation: Presentation,
    pub name: String,
    pub age: String,
    /// Whether a real result was handed off
    pub has_result: bool,
    /// Start of the risk bar animation
    pub opened_at: Instant,
}

impl ResultsScreen {
    pub fn from_handoff(handoff: Option<PredictionHandoff>) -> Self {
        let (result, name, age, has_result) = match handoff {
            Some(h) => (h.result, h.name, h.age, true),
            None => (
                PredictionResult::new(0, NO_PREDICTION_TEXT),
                String::new(),
                String::new(),
                false,
            ),
        };
        Self {
            presentation: present(result.likelihood_percent),
            result,
            name,
            age,
            has_result,
            opened_at: Instant::now(),
        }
    }

    /// Plain-text summary for the clipboard
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "COVID-19 likelihood: {}% ({} risk)",
            self.presentation.likelihood,
            self.presentation.bucket.label()
        )];
        if !self.name.is_empty() {
            lines.push(format!("Name: {}", self.name));
        }
        if !self.age.is_empty() {
            lines.push(format!("Age: {}", self.age));
        }
        lines.push(format!("Recommendation: {}", self.result.recommendation));
        lines.push("Next steps:".to_string());
        for item in self.presentation.recommendations {
            lines.push(format!("- {item}"));
        }
        lines.join("\n")
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_history: Vec<View>,

    // Session
    pub session: Session,

    // Forms
    pub form: FormState,

    // Results
    pub result_handoff: ResultHandoff,
    pub results: Option<ResultsScreen>,
    /// Last result shown, reachable again from Home
    pub last_result: Option<PredictionHandoff>,

    // UI state
    pub home_index: usize,
    pub status_message: Option<String>,
    errors: VecDeque<String>,
}

impl AppState {
    /// Queue an error for the modal error dialog
    pub fn push_error(&mut self, message: String) {
        tracing::warn!(%message, "Showing error dialog");
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The error currently shown
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn selected_home_action(&self) -> HomeAction {
        HomeAction::ALL
            .get(self.home_index)
            .copied()
            .unwrap_or_default()
    }

    pub fn move_home_selection(&mut self, down: bool) {
        let count = HomeAction::ALL.len();
        self.home_index = if down {
            (self.home_index + 1).min(count - 1)
        } else {
            self.home_index.saturating_sub(1)
        };
    }

    /// Reset everything tied to the logged-in user
    pub fn clear_session(&mut self) {
        self.session = Session::Anonymous;
        self.form = FormState::None;
        self.results = None;
        self.last_result = None;
        self.result_handoff = ResultHandoff::default();
        self.view_history.clear();
        self.home_index = 0;
    }
}
