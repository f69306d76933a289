//! State of one prediction submission
//!
//! A `PredictForm` is created when the user opens the predict view and thrown
//! away when they leave it. Submission moves through
//! `Idle -> Validating -> Submitting -> {Success, Failed}`; any edit after a
//! failure returns to `Idle`, while `Success` is final for the instance.

use super::field::FormField;
use super::form_state::Form;
use super::validation::{validate_file, SelectedFile};
use crate::api::PredictionRequest;
use crate::error::{FollowUpError, UploadError};
use crate::state::results::PredictionResult;
use crate::state::symptoms::{find_symptom, symptom_catalog, to_backend_vocabulary, Symptom};
use std::collections::HashMap;
use uuid::Uuid;

/// Which half of the predict view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictStep {
    #[default]
    Symptoms,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Why `begin_submit` did not produce a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// A submission from this form is already running
    InFlight,
    /// This form already produced a result
    Completed,
    /// Local validation failed; the form's error is set
    Invalid(UploadError),
}

/// Focus positions on the symptoms step
const FIELD_NAME: usize = 0;
const FIELD_AGE: usize = 1;
const FIELD_SYMPTOMS: usize = 2;
const FIELD_CONTINUE: usize = 3;

#[derive(Debug, Clone)]
pub struct PredictForm {
    pub name: FormField,
    pub age: FormField,
    pub image_path: FormField,
    pub step: PredictStep,
    pub active_field_index: usize,
    /// Highlighted row in the symptom list
    pub symptom_cursor: usize,
    /// Highlighted option in the follow-up panel
    pub follow_up_cursor: usize,
    /// Insertion-ordered, no duplicates
    selected_symptoms: Vec<&'static str>,
    follow_up_answers: HashMap<&'static str, &'static str>,
    pending_follow_up: Option<&'static str>,
    file: Option<SelectedFile>,
    phase: SubmissionPhase,
    error: Option<String>,
}

impl Default for PredictForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictForm {
    pub fn new() -> Self {
        Self {
            name: FormField::text("name", "Name"),
            age: FormField::digits("age", "Age"),
            image_path: FormField::text("image", "CT Scan Image Path"),
            step: PredictStep::Symptoms,
            active_field_index: 0,
            symptom_cursor: 0,
            follow_up_cursor: 0,
            selected_symptoms: Vec::new(),
            follow_up_answers: HashMap::new(),
            pending_follow_up: None,
            file: None,
            phase: SubmissionPhase::Idle,
            error: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(
            self.phase,
            SubmissionPhase::Validating | SubmissionPhase::Submitting
        )
    }

    fn is_complete(&self) -> bool {
        self.phase == SubmissionPhase::Success
    }

    /// Edits are ignored while a submission is running or after success
    pub fn accepts_edits(&self) -> bool {
        !self.is_submitting() && !self.is_complete()
    }

    /// Any user edit after a failure returns the form to Idle
    fn touch(&mut self) {
        if self.phase == SubmissionPhase::Failed {
            self.phase = SubmissionPhase::Idle;
        }
    }

    pub fn selected_symptoms(&self) -> &[&'static str] {
        &self.selected_symptoms
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_symptoms.contains(&id)
    }

    pub fn follow_up_answer(&self, id: &str) -> Option<&'static str> {
        self.follow_up_answers.get(id).copied()
    }

    pub fn follow_up_answers(&self) -> &HashMap<&'static str, &'static str> {
        &self.follow_up_answers
    }

    /// The symptom whose follow-up question must be answered next
    pub fn pending_follow_up(&self) -> Option<&'static Symptom> {
        self.pending_follow_up.and_then(find_symptom)
    }

    /// Toggle a symptom. Unknown ids are ignored.
    pub fn select_symptom(&mut self, id: &str) {
        if !self.accepts_edits() {
            return;
        }
        let Some(symptom) = find_symptom(id) else {
            tracing::debug!(id, "Ignoring unknown symptom id");
            return;
        };
        self.touch();

        if let Some(pos) = self.selected_symptoms.iter().position(|s| *s == symptom.id) {
            self.selected_symptoms.remove(pos);
            self.follow_up_answers.remove(symptom.id);
            if self.pending_follow_up == Some(symptom.id) {
                self.pending_follow_up = None;
            }
        } else {
            self.selected_symptoms.push(symptom.id);
            if symptom.has_follow_up() {
                self.pending_follow_up = Some(symptom.id);
                self.follow_up_cursor = 0;
            }
        }
    }

    /// Toggle the symptom under the list cursor
    pub fn toggle_symptom_at_cursor(&mut self) {
        if let Some(symptom) = symptom_catalog().get(self.symptom_cursor) {
            self.select_symptom(symptom.id);
        }
    }

    /// Record the answer to the pending follow-up question.
    ///
    /// Only the pending symptom can be answered, so an answered symptom has to
    /// be deselected and selected again to change its answer.
    pub fn answer_follow_up(&mut self, id: &str, option: &str) -> Result<(), FollowUpError> {
        let pending = match self.pending_follow_up {
            Some(pending) if pending == id && self.accepts_edits() => pending,
            _ => return Err(FollowUpError::NotPending(id.to_string())),
        };
        let symptom =
            find_symptom(pending).ok_or_else(|| FollowUpError::NotPending(id.to_string()))?;
        let option = symptom
            .options
            .iter()
            .find(|o| **o == option)
            .copied()
            .ok_or_else(|| FollowUpError::UnknownOption(option.to_string()))?;

        self.touch();
        self.follow_up_answers.insert(pending, option);
        self.pending_follow_up = None;
        Ok(())
    }

    /// Answer the pending question with the option under the cursor
    pub fn answer_at_cursor(&mut self) -> Result<(), FollowUpError> {
        let Some(symptom) = self.pending_follow_up() else {
            return Err(FollowUpError::NotPending(String::new()));
        };
        let option = symptom
            .options
            .get(self.follow_up_cursor)
            .copied()
            .unwrap_or_default();
        self.answer_follow_up(symptom.id, option)
    }

    /// Back out of the pending question by deselecting its symptom
    pub fn cancel_follow_up(&mut self) {
        if let Some(id) = self.pending_follow_up {
            self.select_symptom(id);
        }
    }

    pub fn move_follow_up_cursor(&mut self, down: bool) {
        let count = self.pending_follow_up().map_or(0, |s| s.options.len());
        if count == 0 {
            return;
        }
        self.follow_up_cursor = if down {
            (self.follow_up_cursor + 1) % count
        } else {
            (self.follow_up_cursor + count - 1) % count
        };
    }

    pub fn move_symptom_cursor(&mut self, down: bool) {
        let count = symptom_catalog().len();
        self.symptom_cursor = if down {
            (self.symptom_cursor + 1).min(count - 1)
        } else {
            self.symptom_cursor.saturating_sub(1)
        };
    }

    /// Whether the user may move on to the upload step
    pub fn can_continue(&self) -> bool {
        !self.name.is_blank()
            && !self.age.is_blank()
            && !self.selected_symptoms.is_empty()
            && self.pending_follow_up.is_none()
    }

    pub fn go_to_upload(&mut self) -> bool {
        if !self.can_continue() || !self.accepts_edits() {
            return false;
        }
        self.step = PredictStep::Upload;
        self.active_field_index = 0;
        true
    }

    pub fn back_to_symptoms(&mut self) -> bool {
        if !self.accepts_edits() {
            return false;
        }
        self.step = PredictStep::Symptoms;
        self.active_field_index = FIELD_CONTINUE;
        true
    }

    /// Attach an image, replacing any previous selection
    pub fn attach_file(&mut self, file: SelectedFile) {
        if !self.accepts_edits() {
            return;
        }
        self.touch();
        self.image_path.set_text(file.path.display().to_string());
        self.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        if !self.accepts_edits() {
            return;
        }
        self.touch();
        self.file = None;
    }

    /// Validate and, if everything checks out, hand back the request to send.
    ///
    /// Nothing leaves the client when this returns an error.
    pub fn begin_submit(&mut self, require_image: bool) -> Result<PredictionRequest, SubmitBlocked> {
        if self.is_submitting() {
            return Err(SubmitBlocked::InFlight);
        }
        if self.is_complete() {
            return Err(SubmitBlocked::Completed);
        }

        self.phase = SubmissionPhase::Validating;
        self.error = None;

        let checked = match &self.file {
            Some(file) => validate_file(file).map(|_| Some(file.clone())),
            None if require_image => Err(UploadError::MissingImage),
            None => Ok(None),
        };
        let image = match checked {
            Ok(image) => image,
            Err(err) => {
                self.fail(err.clone());
                return Err(SubmitBlocked::Invalid(err));
            }
        };

        self.phase = SubmissionPhase::Submitting;
        Ok(PredictionRequest {
            submission_id: Uuid::new_v4(),
            image,
            symptoms: to_backend_vocabulary(self.selected_symptoms.iter().copied()),
            name: self.name.trimmed().to_string(),
            age: self.age.trimmed().to_string(),
        })
    }

    /// Settle a running submission successfully
    pub fn complete(&mut self, result: &PredictionResult) {
        tracing::debug!(likelihood = result.likelihood_percent, "Prediction settled");
        self.phase = SubmissionPhase::Success;
        self.error = None;
    }

    /// Settle a submission with an error. Entered data stays as it was.
    pub fn fail(&mut self, err: UploadError) {
        self.phase = SubmissionPhase::Failed;
        self.error = Some(err.to_string());
    }
}

impl Form for PredictForm {
    fn field_count(&self) -> usize {
        match self.step {
            PredictStep::Symptoms => 4, // name, age, symptom list, continue
            PredictStep::Upload => 1,
        }
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.field_count() - 1);
    }
    fn active_field_mut(&mut self) -> Option<&mut FormField> {
        match (self.step, self.active_field_index) {
            (PredictStep::Symptoms, FIELD_NAME) => Some(&mut self.name),
            (PredictStep::Symptoms, FIELD_AGE) => Some(&mut self.age),
            (PredictStep::Upload, 0) => Some(&mut self.image_path),
            _ => None,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match (self.step, index) {
            (PredictStep::Symptoms, FIELD_NAME) => Some(&self.name),
            (PredictStep::Symptoms, FIELD_AGE) => Some(&self.age),
            (PredictStep::Upload, 0) => Some(&self.image_path),
            _ => None,
        }
    }
    fn on_edit(&mut self) {
        self.touch();
    }
    fn is_locked(&self) -> bool {
        !self.accepts_edits()
    }
}

impl PredictForm {
    pub fn is_symptom_list_active(&self) -> bool {
        self.step == PredictStep::Symptoms && self.active_field_index == FIELD_SYMPTOMS
    }

    pub fn is_continue_active(&self) -> bool {
        self.step == PredictStep::Symptoms && self.active_field_index == FIELD_CONTINUE
    }
}
