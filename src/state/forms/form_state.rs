//! Form state management and form structs

use super::field::FormField;
use super::predict_form::PredictForm;
use super::validation::{validate_login, validate_registration};
use crate::api::{LoginRequest, RegistrationRequest};
use crate::error::ValidationError;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    /// The focused text field, if focus is on one
    fn active_field_mut(&mut self) -> Option<&mut FormField>;
    fn get_field(&self, index: usize) -> Option<&FormField>;
    /// Hook run after every edit
    fn on_edit(&mut self) {}
    /// Locked forms ignore typing
    fn is_locked(&self) -> bool {
        false
    }
    fn input_char(&mut self, c: char) {
        if self.is_locked() {
            return;
        }
        if let Some(field) = self.active_field_mut() {
            field.push_char(c);
            self.on_edit();
        }
    }
    fn backspace(&mut self) {
        if self.is_locked() {
            return;
        }
        if let Some(field) = self.active_field_mut() {
            field.pop_char();
            self.on_edit();
        }
    }
}

/// Enum representing all possible form states
#[derive(Debug, Clone, Default)]
pub enum FormState {
    #[default]
    None,
    Login(LoginForm),
    Register(RegisterForm),
    Predict(Box<PredictForm>),
}

impl FormState {
    fn as_form_mut(&mut self) -> Option<&mut dyn Form> {
        match self {
            FormState::None => None,
            FormState::Login(f) => Some(f as &mut dyn Form),
            FormState::Register(f) => Some(f as &mut dyn Form),
            FormState::Predict(f) => Some(f.as_mut() as &mut dyn Form),
        }
    }

    pub fn next_field(&mut self) {
        if let Some(f) = self.as_form_mut() {
            f.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(f) = self.as_form_mut() {
            f.prev_field();
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(f) = self.as_form_mut() {
            f.input_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(f) = self.as_form_mut() {
            f.backspace();
        }
    }

    pub fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        self.as_form_mut().and_then(|f| f.active_field_mut())
    }

    pub fn as_login(&self) -> Option<&LoginForm> {
        match self {
            FormState::Login(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_login_mut(&mut self) -> Option<&mut LoginForm> {
        match self {
            FormState::Login(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_register(&self) -> Option<&RegisterForm> {
        match self {
            FormState::Register(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_register_mut(&mut self) -> Option<&mut RegisterForm> {
        match self {
            FormState::Register(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_predict(&self) -> Option<&PredictForm> {
        match self {
            FormState::Predict(f) => Some(f.as_ref()),
            _ => None,
        }
    }

    pub fn as_predict_mut(&mut self) -> Option<&mut PredictForm> {
        match self {
            FormState::Predict(f) => Some(f.as_mut()),
            _ => None,
        }
    }
}

// Login Form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: FormField,
    pub password: FormField,
    pub active_field_index: usize,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            email: FormField::text("email", "Email address"),
            password: FormField::secret("password", "Password"),
            active_field_index: 0,
            error: None,
            is_loading: false,
        }
    }

    /// Validate locally and build the request body
    pub fn to_request(&self) -> Result<LoginRequest, ValidationError> {
        validate_login(self.email.as_text(), self.password.as_text())?;
        Ok(LoginRequest {
            email: self.email.trimmed().to_string(),
            password: self.password.as_text().to_string(),
        })
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for LoginForm {
    fn field_count(&self) -> usize {
        2
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(1);
    }
    fn active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.email),
            _ => Some(&mut self.password),
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.email),
            1 => Some(&self.password),
            _ => None,
        }
    }
    fn is_locked(&self) -> bool {
        self.is_loading
    }
}

// Register Form
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: FormField,
    pub email: FormField,
    pub password: FormField,
    pub confirm_password: FormField,
    pub active_field_index: usize,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self {
            name: FormField::text("name", "Full Name"),
            email: FormField::text("email", "Email address"),
            password: FormField::secret("password", "Password"),
            confirm_password: FormField::secret("confirm_password", "Confirm Password"),
            active_field_index: 0,
            error: None,
            is_loading: false,
        }
    }

    /// Validate locally and build the request body
    pub fn to_request(&self) -> Result<RegistrationRequest, ValidationError> {
        validate_registration(
            self.name.as_text(),
            self.email.as_text(),
            self.password.as_text(),
            self.confirm_password.as_text(),
        )?;
        Ok(RegistrationRequest {
            email: self.email.trimmed().to_string(),
            password: self.password.as_text().to_string(),
            name: self.name.trimmed().to_string(),
        })
    }
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for RegisterForm {
    fn field_count(&self) -> usize {
        4
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(3);
    }
    fn active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.email),
            2 => Some(&mut self.password),
            _ => Some(&mut self.confirm_password),
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.name),
            1 => Some(&self.email),
            2 => Some(&self.password),
            3 => Some(&self.confirm_password),
            _ => None,
        }
    }
    fn is_locked(&self) -> bool {
        self.is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn type_into(form: &mut impl Form, text: &str) {
        for c in text.chars() {
            form.input_char(c);
        }
    }

    mod login_form {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_new_has_correct_defaults() {
            let form = LoginForm::new();
            assert_eq!(form.active_field_index, 0);
            assert_eq!(form.email.as_text(), "");
            assert!(form.error.is_none());
            assert!(!form.is_loading);
        }

        #[test]
        fn test_next_field_cycles() {
            let mut form = LoginForm::new();
            form.next_field();
            assert_eq!(form.active_field_index, 1);
            form.next_field();
            assert_eq!(form.active_field_index, 0);
        }

        #[test]
        fn test_prev_field_cycles() {
            let mut form = LoginForm::new();
            form.prev_field();
            assert_eq!(form.active_field_index, 1);
        }

        #[test]
        fn test_typing_goes_to_active_field() {
            let mut form = LoginForm::new();
            type_into(&mut form, "ada@example.com");
            form.next_field();
            type_into(&mut form, "pw");
            form.backspace();
            assert_eq!(form.email.as_text(), "ada@example.com");
            assert_eq!(form.password.as_text(), "p");
        }

        #[test]
        fn test_locked_while_loading() {
            let mut form = LoginForm::new();
            form.is_loading = true;
            type_into(&mut form, "x");
            assert_eq!(form.email.as_text(), "");
        }

        #[test]
        fn test_to_request_trims_email() {
            let mut form = LoginForm::new();
            form.email.set_text(" ada@example.com ");
            form.password.set_text("secret");
            let request = form.to_request().unwrap();
            assert_eq!(request.email, "ada@example.com");
            assert_eq!(request.password, "secret");
        }

        #[test]
        fn test_to_request_rejects_bad_email() {
            let mut form = LoginForm::new();
            form.email.set_text("ada");
            form.password.set_text("secret");
            assert_eq!(form.to_request(), Err(ValidationError::InvalidEmail));
        }
    }

    mod register_form {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_get_field_returns_correct_fields() {
            let form = RegisterForm::new();
            assert_eq!(form.get_field(0).unwrap().name, "name");
            assert_eq!(form.get_field(1).unwrap().name, "email");
            assert_eq!(form.get_field(2).unwrap().name, "password");
            assert_eq!(form.get_field(3).unwrap().name, "confirm_password");
            assert!(form.get_field(4).is_none());
        }

        #[test]
        fn test_set_active_field_clamps() {
            let mut form = RegisterForm::new();
            form.set_active_field(100);
            assert_eq!(form.active_field_index, 3);
        }

        #[test]
        fn test_to_request() {
            let mut form = RegisterForm::new();
            form.name.set_text("Ada");
            form.email.set_text("ada@example.com");
            form.password.set_text("Abcdef1!");
            form.confirm_password.set_text("Abcdef1!");
            let request = form.to_request().unwrap();
            assert_eq!(request.name, "Ada");
            assert_eq!(request.email, "ada@example.com");
        }

        #[test]
        fn test_to_request_mismatch() {
            let mut form = RegisterForm::new();
            form.name.set_text("Ada");
            form.email.set_text("ada@example.com");
            form.password.set_text("Abcdef1!");
            form.confirm_password.set_text("Abcdef1");
            assert_eq!(form.to_request(), Err(ValidationError::PasswordMismatch));
        }
    }

    mod form_state_enum {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_none_ignores_input() {
            let mut state = FormState::None;
            state.input_char('a');
            state.next_field();
            assert!(state.get_active_field_mut().is_none());
        }

        #[test]
        fn test_dispatches_to_predict_form() {
            let mut state = FormState::Predict(Box::default());
            state.input_char('A');
            state.next_field();
            state.input_char('4');
            state.input_char('x');
            let form = state.as_predict().unwrap();
            assert_eq!(form.name.as_text(), "A");
            assert_eq!(form.age.as_text(), "4");
        }

        #[test]
        fn test_accessors_match_variant() {
            let state = FormState::Login(LoginForm::new());
            assert!(state.as_login().is_some());
            assert!(state.as_register().is_none());
            assert!(state.as_predict().is_none());
        }
    }
}
