//! Application state and core logic

use crate::api::{LoginResponse, PredictionApi, PredictionClient};
use crate::config::AppConfig;
use crate::error::{AuthError, UploadError};
use crate::state::{
    AppState, Form, FormState, HomeAction, LoginForm, PredictForm, PredictStep,
    PredictionHandoff, PredictionResult, RegisterForm, ResultsScreen, SelectedFile, Session,
    SubmitBlocked, View,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};
use uuid::Uuid;

type SubmissionOutcome = Result<PredictionResult, UploadError>;

/// A prediction request running on a background task
struct InFlight {
    submission_id: Uuid,
    name: String,
    age: String,
    receiver: oneshot::Receiver<SubmissionOutcome>,
}

/// A login or registration request running on a background task
enum AuthInFlight {
    Login(oneshot::Receiver<Result<LoginResponse, AuthError>>),
    Register {
        email: String,
        receiver: oneshot::Receiver<Result<(), AuthError>>,
    },
}

/// Run a service call off the UI task; the receiver yields its outcome
fn spawn_call<T, F>(call: F) -> oneshot::Receiver<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    tokio::spawn(async move {
        // The receiver is gone only if the app is shutting down
        let _ = sender.send(call.await);
    });
    receiver
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Prediction service client
    api: Arc<dyn PredictionApi>,
    config: AppConfig,
    /// Whether the app should quit
    quit: bool,
    /// Copy feedback message
    pub copy_message: Option<String>,
    in_flight: Option<InFlight>,
    auth_in_flight: Option<AuthInFlight>,
}

impl App {
    /// Create an App talking to the configured prediction service
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = PredictionClient::from_config(&config)?;
        tracing::info!(endpoint = client.endpoint(), "Using prediction service");
        Ok(Self::with_api(Arc::new(client), config))
    }

    pub fn with_api(api: Arc<dyn PredictionApi>, config: AppConfig) -> Self {
        let mut app = Self {
            state: AppState::default(),
            api,
            config,
            quit: false,
            copy_message: None,
            in_flight: None,
            auth_in_flight: None,
        };
        app.enter_view(View::Login);
        app
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether any service call is still running
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.auth_in_flight.is_some()
    }

    /// Where a request for `view` actually lands given the session
    fn resolve_route(&self, view: View) -> View {
        let authenticated = self.state.session.is_authenticated();
        if view.requires_auth() && !authenticated {
            View::Login
        } else if view.is_auth_view() && authenticated {
            View::Home
        } else {
            view
        }
    }

    /// Navigate to a view, subject to the session guard
    pub fn navigate(&mut self, view: View) {
        let target = self.resolve_route(view);
        if target != view {
            tracing::debug!(?view, ?target, "Route redirected");
        }
        self.state.view_history.push(self.state.current_view);
        self.enter_view(target);
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        // Skip form views in history to go back to the last non-form view
        while let Some(view) = self.state.view_history.pop() {
            if view.is_form_view() || self.resolve_route(view) != view {
                continue;
            }
            if view == View::Results {
                self.reopen_last_result();
            }
            self.enter_view(view);
            return;
        }
        let fallback = self.resolve_route(View::Home);
        self.enter_view(fallback);
    }

    fn enter_view(&mut self, view: View) {
        self.state.current_view = view;
        self.state.form = match view {
            View::Login => FormState::Login(LoginForm::new()),
            View::Register => FormState::Register(RegisterForm::new()),
            View::Predict => FormState::Predict(Box::default()),
            View::Home | View::Results => FormState::None,
        };
        self.state.results = None;

        if view == View::Results {
            let handoff = self.state.result_handoff.receive();
            if let Some(handoff) = &handoff {
                self.state.last_result = Some(handoff.clone());
            }
            self.state.results = Some(ResultsScreen::from_handoff(handoff));
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.copy_message = None;

        // Auth forms stay locked until the pending request settles
        if self.auth_in_flight.is_some() {
            return Ok(());
        }

        match self.state.current_view {
            View::Login => self.handle_login_key(key),
            View::Register => self.handle_register_key(key),
            View::Home => self.handle_home_key(key),
            View::Predict => self.handle_predict_key(key),
            View::Results => self.handle_results_key(key),
        }
        Ok(())
    }

    /// Keys shared by the login and registration forms
    fn handle_form_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.form.prev_field(),
            KeyCode::Backspace => self.state.form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.form.input_char(c)
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.navigate(View::Register);
            return;
        }
        match key.code {
            KeyCode::Enter => self.submit_login(),
            KeyCode::Esc => self.quit = true,
            _ => self.handle_form_editing_key(key),
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let on_last = self
                    .state
                    .form
                    .as_register()
                    .is_some_and(|f| f.active_field() == f.field_count() - 1);
                if on_last {
                    self.submit_registration();
                } else {
                    self.state.form.next_field();
                }
            }
            KeyCode::Esc => self.navigate(View::Login),
            _ => self.handle_form_editing_key(key),
        }
    }

    fn submit_login(&mut self) {
        let Some(form) = self.state.form.as_login_mut() else {
            return;
        };
        if form.is_loading {
            return;
        }
        let request = match form.to_request() {
            Ok(request) => request,
            Err(err) => {
                form.error = Some(err.to_string());
                return;
            }
        };
        form.error = None;
        form.is_loading = true;

        let api = Arc::clone(&self.api);
        let receiver = spawn_call(async move { api.login(request).await });
        self.auth_in_flight = Some(AuthInFlight::Login(receiver));
    }

    fn submit_registration(&mut self) {
        let Some(form) = self.state.form.as_register_mut() else {
            return;
        };
        if form.is_loading {
            return;
        }
        let request = match form.to_request() {
            Ok(request) => request,
            Err(err) => {
                form.error = Some(err.to_string());
                return;
            }
        };
        form.error = None;
        form.is_loading = true;
        let email = request.email.clone();

        let api = Arc::clone(&self.api);
        let receiver = spawn_call(async move { api.register(request).await });
        self.auth_in_flight = Some(AuthInFlight::Register { email, receiver });
    }

    /// Check for a finished login or registration; called once per frame
    fn poll_auth(&mut self) {
        match self.auth_in_flight.take() {
            Some(AuthInFlight::Login(mut receiver)) => match receiver.try_recv() {
                Ok(outcome) => self.settle_login(outcome),
                Err(TryRecvError::Empty) => {
                    self.auth_in_flight = Some(AuthInFlight::Login(receiver));
                }
                Err(TryRecvError::Closed) => self.settle_login(Err(AuthError::NetworkFailure)),
            },
            Some(AuthInFlight::Register {
                email,
                mut receiver,
            }) => match receiver.try_recv() {
                Ok(outcome) => self.settle_registration(email, outcome),
                Err(TryRecvError::Empty) => {
                    self.auth_in_flight = Some(AuthInFlight::Register { email, receiver });
                }
                Err(TryRecvError::Closed) => {
                    self.settle_registration(email, Err(AuthError::NetworkFailure))
                }
            },
            None => {}
        }
    }

    fn settle_login(&mut self, outcome: Result<LoginResponse, AuthError>) {
        let Some(form) = self.state.form.as_login_mut() else {
            tracing::warn!("Login settled after leaving the form");
            return;
        };
        form.is_loading = false;
        match outcome {
            Ok(response) => {
                tracing::info!(email = %response.user.email, "Logged in");
                self.state.session = Session::Authenticated {
                    email: response.user.email,
                    name: response.user.name,
                    access_token: response.access_token,
                };
                self.state.view_history.clear();
                self.state.status_message = None;
                self.navigate(View::Home);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Login failed");
                form.password.clear();
                form.error = Some(err.to_string());
            }
        }
    }

    fn settle_registration(&mut self, email: String, outcome: Result<(), AuthError>) {
        let Some(form) = self.state.form.as_register_mut() else {
            tracing::warn!("Registration settled after leaving the form");
            return;
        };
        form.is_loading = false;
        match outcome {
            Ok(()) => {
                self.navigate(View::Login);
                if let Some(login) = self.state.form.as_login_mut() {
                    login.email.set_text(email);
                    login.active_field_index = 1;
                }
                self.state.status_message =
                    Some("Registration successful. Please sign in.".to_string());
            }
            Err(err) => {
                tracing::warn!(error = %err, "Registration failed");
                form.error = Some(err.to_string());
            }
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.move_home_selection(false);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.move_home_selection(true);
                return;
            }
            KeyCode::Enter => self.state.selected_home_action(),
            KeyCode::Char(c) => match HomeAction::ALL.iter().find(|a| a.key() == c) {
                Some(action) => *action,
                None => return,
            },
            KeyCode::Esc => {
                self.quit = true;
                return;
            }
            _ => return,
        };
        self.run_home_action(action);
    }

    fn run_home_action(&mut self, action: HomeAction) {
        match action {
            HomeAction::StartPrediction => self.navigate(View::Predict),
            HomeAction::LastResult => {
                self.reopen_last_result();
                self.navigate(View::Results);
            }
            HomeAction::Logout => self.logout(),
        }
    }

    /// Hand the last shown result to the results view again
    fn reopen_last_result(&mut self) {
        if self.state.result_handoff.is_pending() {
            return;
        }
        if let Some(last) = self.state.last_result.clone() {
            self.state.result_handoff.handoff(last);
        }
    }

    pub fn logout(&mut self) {
        tracing::info!("Logged out");
        self.state.clear_session();
        self.enter_view(View::Login);
    }

    fn handle_predict_key(&mut self, key: KeyEvent) {
        let Some(step) = self.state.form.as_predict().map(|f| f.step) else {
            return;
        };
        match step {
            PredictStep::Symptoms => self.handle_symptoms_step_key(key),
            PredictStep::Upload => self.handle_upload_step_key(key),
        }
    }

    fn handle_symptoms_step_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.form.as_predict_mut() else {
            return;
        };

        // The follow-up panel takes every key until answered or cancelled
        if let Some(symptom) = form.pending_follow_up() {
            let outcome = match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    form.move_follow_up_cursor(false);
                    Ok(())
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    form.move_follow_up_cursor(true);
                    Ok(())
                }
                KeyCode::Enter => form.answer_at_cursor(),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    match symptom.options.get(index) {
                        Some(option) => form.answer_follow_up(symptom.id, option),
                        None => Ok(()),
                    }
                }
                KeyCode::Esc => {
                    form.cancel_follow_up();
                    Ok(())
                }
                _ => Ok(()),
            };
            if let Err(err) = outcome {
                tracing::debug!(error = %err, "Follow-up answer rejected");
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if !form.is_submitting() {
                    self.go_back();
                }
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Up if form.is_symptom_list_active() && form.symptom_cursor > 0 => {
                form.move_symptom_cursor(false)
            }
            KeyCode::Down
                if form.is_symptom_list_active()
                    && form.symptom_cursor + 1 < crate::state::symptom_catalog().len() =>
            {
                form.move_symptom_cursor(true)
            }
            KeyCode::Up => form.prev_field(),
            KeyCode::Down => form.next_field(),
            KeyCode::Char(' ') | KeyCode::Enter if form.is_symptom_list_active() => {
                form.toggle_symptom_at_cursor()
            }
            KeyCode::Enter if form.is_continue_active() => {
                if !form.go_to_upload() {
                    self.state.status_message =
                        Some("Enter your name, age and at least one symptom".to_string());
                } else {
                    self.state.status_message = None;
                }
            }
            KeyCode::Enter => form.next_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.input_char(c)
            }
            _ => {}
        }
    }

    fn handle_upload_step_key(&mut self, key: KeyEvent) {
        let is_save = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s');
        if is_save || key.code == KeyCode::Enter {
            self.submit_prediction();
            return;
        }
        let Some(form) = self.state.form.as_predict_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                form.back_to_symptoms();
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.input_char(c)
            }
            _ => {}
        }
    }

    /// Validate the predict form and start the upload in the background
    pub fn submit_prediction(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let require_image = self.config.require_image();
        let Some(form) = self.state.form.as_predict_mut() else {
            return;
        };
        if !form.accepts_edits() {
            return;
        }

        // Re-stat the file so size and type reflect what is on disk now
        let path = form.image_path.trimmed().to_string();
        if path.is_empty() {
            form.clear_file();
        } else {
            match SelectedFile::from_path(&path) {
                Ok(file) => form.attach_file(file),
                Err(err) => {
                    form.fail(err);
                    return;
                }
            }
        }

        let request = match form.begin_submit(require_image) {
            Ok(request) => request,
            Err(SubmitBlocked::Invalid(err)) => {
                tracing::debug!(error = %err, "Submission blocked by validation");
                return;
            }
            Err(blocked) => {
                tracing::debug!(?blocked, "Submission ignored");
                return;
            }
        };

        let submission_id = request.submission_id;
        let name = request.name.clone();
        let age = request.age.clone();
        let api = Arc::clone(&self.api);
        let receiver = spawn_call(async move { api.predict(request).await });
        self.in_flight = Some(InFlight {
            submission_id,
            name,
            age,
            receiver,
        });
    }

    /// Settle any service call that finished since the last frame
    pub fn poll_tasks(&mut self) {
        self.poll_auth();
        self.poll_submission();
    }

    /// Check for a finished prediction
    fn poll_submission(&mut self) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };
        let outcome = match in_flight.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => None,
        };
        if let Some(in_flight) = self.in_flight.take() {
            self.settle_submission(in_flight, outcome);
        }
    }

    fn settle_submission(&mut self, in_flight: InFlight, outcome: Option<SubmissionOutcome>) {
        let Some(form) = self.state.form.as_predict_mut() else {
            tracing::warn!(submission_id = %in_flight.submission_id, "Prediction settled after leaving the form");
            return;
        };

        match outcome {
            Some(Ok(result)) => {
                form.complete(&result);
                self.state.result_handoff.handoff(PredictionHandoff {
                    submission_id: in_flight.submission_id,
                    result,
                    name: in_flight.name,
                    age: in_flight.age,
                });
                self.navigate(View::Results);
            }
            Some(Err(err)) => {
                tracing::warn!(submission_id = %in_flight.submission_id, error = %err, "Prediction failed");
                form.fail(err);
            }
            None => {
                form.fail(UploadError::NetworkFailure);
                self.push_error("The upload stopped without a response. Please try again.");
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.navigate(View::Home),
            KeyCode::Char('n') => self.navigate(View::Predict),
            KeyCode::Char('c') => self.copy_results(),
            _ => {}
        }
    }

    fn copy_results(&mut self) {
        let Some(summary) = self.state.results.as_ref().map(ResultsScreen::summary) else {
            return;
        };
        match self.copy_to_clipboard(&summary) {
            Ok(()) => self.copy_message = Some("Copied results to clipboard".to_string()),
            Err(err) => self.push_error(format!("Could not copy to clipboard: {err}")),
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        use arboard::Clipboard;
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }

    /// The predict form, when on the predict view
    pub fn predict_form(&self) -> Option<&PredictForm> {
        self.state.form.as_predict()
    }

    #[cfg(test)]
    async fn wait_for_tasks(&mut self) {
        for _ in 0..500 {
            self.poll_tasks();
            if !self.is_busy() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        panic!("background call did not settle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LoginResponse, LoginUser, MockPredictionApi};
    use crate::error::AuthError;
    use crate::state::{ConfidenceBucket, SubmissionPhase};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            require_image: Some(false),
            ..Default::default()
        }
    }

    fn app_with(mock: MockPredictionApi) -> App {
        App::with_api(Arc::new(mock), config())
    }

    /// App already logged in and sitting on Home
    fn logged_in(mock: MockPredictionApi) -> App {
        let mut app = app_with(mock);
        app.state.session = Session::Authenticated {
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            access_token: "token".to_string(),
        };
        app.navigate(View::Home);
        app
    }

    fn temp_png(bytes: usize) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cpt-app-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scan.png");
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    /// Fill name, age and the fever symptom, answer its follow-up, continue
    async fn fill_symptoms_step(app: &mut App) {
        app.navigate(View::Predict);
        type_text(app, "Ada").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        type_text(app, "36").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        // Cursor to "fever" (second entry) and toggle
        app.handle_key(key(KeyCode::Down)).await.unwrap();
        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        // Answer the follow-up with its first option
        app.handle_key(key(KeyCode::Char('1'))).await.unwrap();
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
    }

    mod routing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_starts_on_login() {
            let app = app_with(MockPredictionApi::new());
            assert_eq!(app.state.current_view, View::Login);
            assert!(app.state.form.as_login().is_some());
        }

        #[test]
        fn test_anonymous_is_redirected_to_login() {
            let mut app = app_with(MockPredictionApi::new());
            for view in [View::Home, View::Predict, View::Results] {
                app.navigate(view);
                assert_eq!(app.state.current_view, View::Login);
            }
        }

        #[test]
        fn test_authenticated_skips_auth_views() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Login);
            assert_eq!(app.state.current_view, View::Home);
            app.navigate(View::Register);
            assert_eq!(app.state.current_view, View::Home);
        }

        #[test]
        fn test_go_back_skips_form_views() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Predict);
            app.navigate(View::Results);
            app.go_back();
            assert_eq!(app.state.current_view, View::Home);
        }

        #[test]
        fn test_results_without_handoff_shows_fallback() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Results);
            let screen = app.state.results.as_ref().unwrap();
            assert!(!screen.has_result);
            assert_eq!(screen.result.likelihood_percent, 0);
            assert_eq!(screen.result.recommendation, "No prediction available");
        }

        #[tokio::test]
        async fn test_logout_returns_to_login() {
            let mut app = logged_in(MockPredictionApi::new());
            app.handle_key(key(KeyCode::Char('l'))).await.unwrap();
            assert_eq!(app.state.current_view, View::Login);
            assert!(!app.state.session.is_authenticated());
        }
    }

    mod login {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_successful_login_opens_home() {
            let mut mock = MockPredictionApi::new();
            mock.expect_login()
                .withf(|req| req.email == "ada@example.com" && req.password == "secret")
                .times(1)
                .returning(|req| {
                    Ok(LoginResponse {
                        access_token: "jwt".to_string(),
                        user: LoginUser {
                            email: req.email,
                            name: Some("Ada".to_string()),
                        },
                    })
                });
            let mut app = app_with(mock);

            type_text(&mut app, "ada@example.com").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "secret").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            // The form shows its loading state until the call settles
            assert!(app.state.form.as_login().unwrap().is_loading);
            assert!(app.is_busy());
            app.handle_key(ctrl('r')).await.unwrap();
            assert_eq!(app.state.current_view, View::Login);

            app.wait_for_tasks().await;
            assert_eq!(app.state.current_view, View::Home);
            assert_eq!(app.state.session.display_name(), Some("Ada"));
        }

        #[tokio::test]
        async fn test_rejected_login_stays_with_message() {
            let mut mock = MockPredictionApi::new();
            mock.expect_login()
                .returning(|_| Err(AuthError::ServerError("Invalid email or password".to_string())));
            let mut app = app_with(mock);

            type_text(&mut app, "ada@example.com").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "nope").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.wait_for_tasks().await;

            let form = app.state.form.as_login().unwrap();
            assert_eq!(app.state.current_view, View::Login);
            assert_eq!(form.error.as_deref(), Some("Invalid email or password"));
            assert_eq!(form.email.as_text(), "ada@example.com");
            assert!(!form.is_loading);
        }

        #[tokio::test]
        async fn test_invalid_email_never_calls_server() {
            let mut mock = MockPredictionApi::new();
            mock.expect_login().times(0);
            let mut app = app_with(mock);

            type_text(&mut app, "ada").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "secret").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            assert_eq!(
                app.state.form.as_login().unwrap().error.as_deref(),
                Some("Please enter a valid email address")
            );
        }

        #[tokio::test]
        async fn test_ctrl_r_opens_register() {
            let mut app = app_with(MockPredictionApi::new());
            app.handle_key(ctrl('r')).await.unwrap();
            assert_eq!(app.state.current_view, View::Register);
            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            assert_eq!(app.state.current_view, View::Login);
        }
    }

    mod register {
        use super::*;
        use pretty_assertions::assert_eq;

        async fn fill(app: &mut App, password: &str, confirm: &str) {
            app.handle_key(ctrl('r')).await.unwrap();
            type_text(app, "Ada").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            type_text(app, "ada@example.com").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            type_text(app, password).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            type_text(app, confirm).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.wait_for_tasks().await;
        }

        #[tokio::test]
        async fn test_success_prefills_login() {
            let mut mock = MockPredictionApi::new();
            mock.expect_register()
                .withf(|req| req.name == "Ada" && req.email == "ada@example.com")
                .times(1)
                .returning(|_| Ok(()));
            let mut app = app_with(mock);

            fill(&mut app, "Abcdef1!", "Abcdef1!").await;

            assert_eq!(app.state.current_view, View::Login);
            let login = app.state.form.as_login().unwrap();
            assert_eq!(login.email.as_text(), "ada@example.com");
            assert_eq!(login.active_field_index, 1);
            assert!(app.state.status_message.is_some());
        }

        #[tokio::test]
        async fn test_weak_password_is_inline_error() {
            let mut mock = MockPredictionApi::new();
            mock.expect_register().times(0);
            let mut app = app_with(mock);

            fill(&mut app, "password", "password").await;

            assert_eq!(app.state.current_view, View::Register);
            let error = app.state.form.as_register().unwrap().error.clone().unwrap();
            assert!(error.starts_with("Password must contain"));
        }

        #[tokio::test]
        async fn test_server_rejection_is_shown() {
            let mut mock = MockPredictionApi::new();
            mock.expect_register()
                .returning(|_| Err(AuthError::ServerError("Email already registered".to_string())));
            let mut app = app_with(mock);

            fill(&mut app, "Abcdef1!", "Abcdef1!").await;

            let form = app.state.form.as_register().unwrap();
            assert_eq!(form.error.as_deref(), Some("Email already registered"));
            assert_eq!(form.name.as_text(), "Ada");
        }
    }

    mod predict {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_symptoms_step_flow() {
            let mut app = logged_in(MockPredictionApi::new());
            fill_symptoms_step(&mut app).await;

            let form = app.predict_form().unwrap();
            assert_eq!(form.step, PredictStep::Upload);
            assert_eq!(form.selected_symptoms(), &["fever"]);
            assert!(form.follow_up_answer("fever").is_some());
        }

        #[tokio::test]
        async fn test_continue_blocked_without_symptoms() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Predict);
            type_text(&mut app, "Ada").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "36").await;
            app.handle_key(key(KeyCode::BackTab)).await.unwrap();
            app.handle_key(key(KeyCode::BackTab)).await.unwrap();
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            assert_eq!(app.predict_form().unwrap().step, PredictStep::Symptoms);
            assert!(app.state.status_message.is_some());
        }

        #[tokio::test]
        async fn test_follow_up_escape_deselects() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Predict);
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
            assert!(app.predict_form().unwrap().pending_follow_up().is_some());

            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            let form = app.predict_form().unwrap();
            assert!(form.pending_follow_up().is_none());
            assert!(form.selected_symptoms().is_empty());
            assert_eq!(app.state.current_view, View::Predict);
        }

        #[tokio::test]
        async fn test_high_likelihood_lands_on_results() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict()
                .withf(|req| {
                    req.symptoms == vec!["fever".to_string()]
                        && req.name == "Ada"
                        && req.age == "36"
                        && req.image.as_ref().is_some_and(|f| f.mime_type == "image/png")
                })
                .times(1)
                .returning(|_| Ok(PredictionResult::new(85, "Consult a doctor")));
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;

            let path = temp_png(1024);
            type_text(&mut app, &path.display().to_string()).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            assert!(app.is_submitting());
            assert!(app.predict_form().unwrap().is_submitting());

            app.wait_for_tasks().await;

            assert_eq!(app.state.current_view, View::Results);
            let screen = app.state.results.as_ref().unwrap();
            assert!(screen.has_result);
            assert_eq!(screen.presentation.likelihood, 85);
            assert_eq!(screen.presentation.bucket, ConfidenceBucket::High);
            assert_eq!(screen.presentation.recommendations.len(), 4);
            assert_eq!(screen.name, "Ada");
            assert!(!app.state.result_handoff.is_pending());
        }

        #[tokio::test]
        async fn test_server_error_preserves_form() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict()
                .times(1)
                .returning(|_| Err(UploadError::ServerError("model unavailable".to_string())));
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;
            app.handle_key(ctrl('s')).await.unwrap();
            app.wait_for_tasks().await;

            assert_eq!(app.state.current_view, View::Predict);
            let form = app.predict_form().unwrap();
            assert_eq!(form.phase(), SubmissionPhase::Failed);
            assert_eq!(form.error(), Some("model unavailable"));
            assert!(!form.is_submitting());
            assert_eq!(form.name.as_text(), "Ada");
            assert_eq!(form.selected_symptoms(), &["fever"]);
        }

        #[tokio::test]
        async fn test_oversized_file_never_uploads() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict().times(0);
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;

            let path = temp_png(5 * 1024 * 1024 + 1);
            type_text(&mut app, &path.display().to_string()).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            assert!(!app.is_submitting());
            let form = app.predict_form().unwrap();
            assert_eq!(form.error(), Some("File is too large. Maximum size is 5MB"));
        }

        #[tokio::test]
        async fn test_missing_path_is_unreadable() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict().times(0);
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;

            type_text(&mut app, "/no/such/scan.png").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            let error = app.predict_form().unwrap().error().unwrap().to_string();
            assert!(error.starts_with("Could not read image"));
        }

        #[tokio::test]
        async fn test_image_required_by_config() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict().times(0);
            let mut app = App::with_api(Arc::new(mock), AppConfig::default());
            app.state.session = Session::Authenticated {
                email: "ada@example.com".to_string(),
                name: None,
                access_token: "t".to_string(),
            };
            fill_symptoms_step(&mut app).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            assert_eq!(
                app.predict_form().unwrap().error(),
                Some("Please select a CT scan image")
            );
        }

        #[tokio::test]
        async fn test_second_submit_while_in_flight_is_ignored() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict()
                .times(1)
                .returning(|_| Ok(PredictionResult::new(10, "Rest")));
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;

            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            app.wait_for_tasks().await;

            assert_eq!(app.state.current_view, View::Results);
            let screen = app.state.results.as_ref().unwrap();
            assert_eq!(screen.presentation.bucket, ConfidenceBucket::Low);
        }
    }

    mod results {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_enter_returns_home_and_result_is_revisitable() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict()
                .returning(|_| Ok(PredictionResult::new(45, "Monitor")));
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.wait_for_tasks().await;

            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            assert_eq!(app.state.current_view, View::Home);

            app.handle_key(key(KeyCode::Char('r'))).await.unwrap();
            let screen = app.state.results.as_ref().unwrap();
            assert!(screen.has_result);
            assert_eq!(screen.presentation.bucket, ConfidenceBucket::Medium);
        }

        #[tokio::test]
        async fn test_back_from_new_prediction_shows_same_result() {
            let mut mock = MockPredictionApi::new();
            mock.expect_predict()
                .times(1)
                .returning(|_| Ok(PredictionResult::new(85, "Consult a doctor")));
            let mut app = logged_in(mock);
            fill_symptoms_step(&mut app).await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            app.wait_for_tasks().await;
            assert_eq!(app.state.current_view, View::Results);

            app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
            assert_eq!(app.state.current_view, View::Predict);
            app.handle_key(key(KeyCode::Esc)).await.unwrap();

            assert_eq!(app.state.current_view, View::Results);
            let screen = app.state.results.as_ref().unwrap();
            assert!(screen.has_result);
            assert_eq!(screen.result.likelihood_percent, 85);
            assert_eq!(screen.result.recommendation, "Consult a doctor");
            assert_eq!(screen.presentation.bucket, ConfidenceBucket::High);
        }

        #[tokio::test]
        async fn test_n_starts_fresh_prediction() {
            let mut app = logged_in(MockPredictionApi::new());
            app.navigate(View::Results);
            app.handle_key(key(KeyCode::Char('n'))).await.unwrap();

            assert_eq!(app.state.current_view, View::Predict);
            let form = app.predict_form().unwrap();
            assert!(form.selected_symptoms().is_empty());
            assert_eq!(form.phase(), SubmissionPhase::Idle);
        }
    }

    mod error_dialog {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_errors_are_modal() {
            let mut app = logged_in(MockPredictionApi::new());
            app.push_error("boom");

            // Other keys are swallowed while the dialog is up
            app.handle_key(key(KeyCode::Char('p'))).await.unwrap();
            assert_eq!(app.state.current_view, View::Home);

            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            assert!(!app.state.has_errors());
            app.handle_key(key(KeyCode::Char('p'))).await.unwrap();
            assert_eq!(app.state.current_view, View::Predict);
        }
    }
}
