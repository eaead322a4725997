//! Patient form: validation, edit-mode population and submission.

mod notice;
mod validator;

pub use notice::*;
pub use validator::*;

use chrono::NaiveDate;

use crate::db::BlobStore;
use crate::models::{Patient, PatientFields};
use crate::store::{PatientStore, StoreResult};

pub const REGISTER_LABEL: &str = "Register Patient";
pub const UPDATE_LABEL: &str = "Update Patient";

pub const REGISTERED_MESSAGE: &str = "Patient registered successfully";
pub const UPDATED_MESSAGE: &str = "Patient updated successfully";
pub const DELETED_MESSAGE: &str = "Patient deleted successfully";

/// What a form submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new patient was added.
    Created(Patient),
    /// Edit mode was active; holds the record if the pointer matched.
    Updated(Option<Patient>),
    /// Validation failed; fields are kept as typed.
    Rejected(ValidationErrors),
}

impl SubmitOutcome {
    /// Success message to show, if the submission went through.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SubmitOutcome::Created(_) => Some(REGISTERED_MESSAGE),
            SubmitOutcome::Updated(_) => Some(UPDATED_MESSAGE),
            SubmitOutcome::Rejected(_) => None,
        }
    }
}

/// Current form contents and the last validation result.
#[derive(Debug, Clone, Default)]
pub struct PatientForm {
    fields: PatientFields,
    errors: ValidationErrors,
}

impl PatientForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &PatientFields {
        &self.fields
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Replace the typed values.
    pub fn set_fields(&mut self, fields: PatientFields) {
        self.fields = fields;
    }

    /// Populate every field from `patient` for editing.
    pub fn load(&mut self, patient: &Patient) {
        self.fields = PatientFields::from(patient);
        self.errors = ValidationErrors::new();
    }

    /// Empty all fields and messages.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Label for the submit button.
    pub fn submit_label(editing: bool) -> &'static str {
        if editing {
            UPDATE_LABEL
        } else {
            REGISTER_LABEL
        }
    }

    /// Validate the current fields and apply them to `store`.
    ///
    /// Adds a patient when nothing is being edited, otherwise updates the
    /// active one. The form is reset after a successful submission.
    pub fn submit<B: BlobStore>(
        &mut self,
        store: &mut PatientStore<B>,
        today: NaiveDate,
    ) -> StoreResult<SubmitOutcome> {
        let draft = match validate(&self.fields, today) {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!(invalid = errors.len(), "Form submission rejected");
                self.errors = errors.clone();
                return Ok(SubmitOutcome::Rejected(errors));
            }
        };

        let outcome = if store.active_id().is_some() {
            SubmitOutcome::Updated(store.update(draft)?)
        } else {
            SubmitOutcome::Created(store.add(draft)?)
        };

        self.reset();
        Ok(outcome)
    }
}
