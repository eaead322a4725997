//! Vet-Patients Core Library
//!
//! Local-first patient tracking for a veterinary clinic: a form to register
//! and edit patients and a list to show and delete them, persisted locally.
//!
//! # Architecture
//!
//! ```text
//!   Form fields ──► Validator ──► DraftPatient
//!                                     │
//!                              ┌──────▼───────┐
//!                              │ PatientStore │  add / delete / select / update
//!                              └──────┬───────┘
//!                                     │ commit (every mutation)
//!                     ┌───────────────┼───────────────┐
//!                     ▼               ▼               ▼
//!                Blob store       Observers      Revision counter
//!             (SQLite snapshot)   (Rust side)      (FFI polling)
//! ```
//!
//! # Modules
//!
//! - [`db`]: Blob stores (SQLite, in-memory)
//! - [`models`]: Domain types (Patient, DraftPatient, PatientFields)
//! - [`store`]: Record store and snapshot encoding
//! - [`form`]: Validation, form submission and success notices
//! - [`session`]: Composition root used by the UI
//! - [`config`]: TOML configuration
//! - [`logging`]: `tracing` subscriber setup

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod models;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use db::{BlobStore, Database, MemoryBlobStore};
pub use form::{validate, PatientField, PatientForm, SubmitOutcome, ValidationErrors};
pub use models::{DraftPatient, Patient, PatientFields};
pub use session::TrackerSession;
pub use store::{PatientState, PatientStore, StoreObserver};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientTrackerError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl From<db::DbError> for PatientTrackerError {
    fn from(e: db::DbError) -> Self {
        PatientTrackerError::StorageError(e.to_string())
    }
}

impl From<store::StoreError> for PatientTrackerError {
    fn from(e: store::StoreError) -> Self {
        PatientTrackerError::StorageError(e.to_string())
    }
}

impl From<logging::LoggingError> for PatientTrackerError {
    fn from(e: logging::LoggingError) -> Self {
        PatientTrackerError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientTrackerError::LockError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a tracker backed by the database at the given path.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let db = Database::open(&path)?;
    Ok(PatientTracker::new(db, &TrackerConfig::default()))
}

/// Create a tracker with an in-memory database (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let db = Database::open_in_memory()?;
    Ok(PatientTracker::new(db, &TrackerConfig::default()))
}

/// Open a tracker described by a TOML configuration file.
#[uniffi::export]
pub fn open_tracker_with_config(
    config_path: String,
) -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let config = config::load_config(&config_path)
        .map_err(|e| PatientTrackerError::ConfigError(format!("{:#}", e)))?;
    match logging::init_logging(&config.logging.level) {
        Ok(()) | Err(logging::LoggingError::AlreadyInitialized(_)) => {}
        Err(e) => return Err(e.into()),
    }
    let db = match &config.storage.database_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    Ok(PatientTracker::new(db, &config))
}

/// Install the console log subscriber.
#[uniffi::export]
pub fn init_logging(level: String) -> Result<(), PatientTrackerError> {
    logging::init_logging(&level)?;
    Ok(())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PatientTracker {
    session: Mutex<TrackerSession<Database>>,
}

impl PatientTracker {
    fn new(db: Database, config: &TrackerConfig) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(TrackerSession::open(db, config)),
        })
    }
}

#[uniffi::export]
impl PatientTracker {
    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Add a patient from already-validated values.
    pub fn add_patient(&self, draft: FfiDraftPatient) -> Result<FfiPatient, PatientTrackerError> {
        let mut session = self.session.lock()?;
        let patient = session.store_mut().add(draft.try_into()?)?;
        Ok(patient.into())
    }

    /// Delete a patient. Unknown ids are ignored.
    pub fn delete_patient(&self, id: String) -> Result<bool, PatientTrackerError> {
        let mut session = self.session.lock()?;
        Ok(session.store_mut().delete(&id)?)
    }

    /// Select a patient for editing.
    pub fn select_patient(&self, id: String) -> Result<(), PatientTrackerError> {
        let mut session = self.session.lock()?;
        session.store_mut().select(&id)?;
        Ok(())
    }

    /// Apply values to the selected patient and leave edit mode.
    pub fn update_patient(
        &self,
        draft: FfiDraftPatient,
    ) -> Result<Option<FfiPatient>, PatientTrackerError> {
        let mut session = self.session.lock()?;
        let updated = session.store_mut().update(draft.try_into()?)?;
        Ok(updated.map(Into::into))
    }

    /// All patients in insertion order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(session.patients().iter().cloned().map(Into::into).collect())
    }

    /// The patient in edit mode, if any.
    pub fn active_patient(&self) -> Result<Option<FfiPatient>, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(session.store().active_patient().cloned().map(Into::into))
    }

    /// Change counter; re-read the list when it moves.
    pub fn revision(&self) -> Result<u64, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(session.store().revision())
    }

    // =========================================================================
    // Form Operations
    // =========================================================================

    /// Validate raw values against today's date.
    pub fn validate_patient(&self, fields: FfiPatientFields) -> Vec<FfiFieldError> {
        match form::validate_today(&fields.into()) {
            Ok(_) => Vec::new(),
            Err(errors) => field_errors(&errors),
        }
    }

    /// Submit the form: add, or update while editing.
    pub fn submit_form(
        &self,
        fields: FfiPatientFields,
    ) -> Result<FfiSubmitOutcome, PatientTrackerError> {
        let mut session = self.session.lock()?;
        let outcome = session.submit(fields.into(), chrono::Local::now())?;
        Ok(outcome.into())
    }

    /// Enter edit mode for a patient and load it into the form.
    pub fn edit_patient(&self, id: String) -> Result<Option<FfiPatient>, PatientTrackerError> {
        let mut session = self.session.lock()?;
        let patient = session.edit(&id)?.cloned();
        Ok(patient.map(Into::into))
    }

    /// Delete a patient from the list and post a notice.
    pub fn remove_patient(&self, id: String) -> Result<bool, PatientTrackerError> {
        let mut session = self.session.lock()?;
        Ok(session.delete(&id, chrono::Local::now())?)
    }

    /// Current form values.
    pub fn form_fields(&self) -> Result<FfiPatientFields, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(session.form().fields().clone().into())
    }

    /// Messages from the last rejected submission.
    pub fn form_errors(&self) -> Result<Vec<FfiFieldError>, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(field_errors(session.form().errors()))
    }

    pub fn submit_label(&self) -> Result<String, PatientTrackerError> {
        let session = self.session.lock()?;
        Ok(session.submit_label().to_string())
    }

    /// Success notice to display right now, if any.
    pub fn current_notice(&self) -> Result<Option<String>, PatientTrackerError> {
        let mut session = self.session.lock()?;
        let notice = session.current_notice(chrono::Local::now());
        Ok(notice.map(|n| n.message.clone()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub caretaker: String,
    pub email: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub symptoms: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            caretaker: patient.caretaker,
            email: patient.email,
            date: patient.date.format(form::DATE_FORMAT).to_string(),
            symptoms: patient.symptoms,
        }
    }
}

/// FFI-safe draft with a parsed-on-entry date.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDraftPatient {
    pub name: String,
    pub caretaker: String,
    pub email: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub symptoms: String,
}

impl TryFrom<FfiDraftPatient> for DraftPatient {
    type Error = PatientTrackerError;

    fn try_from(draft: FfiDraftPatient) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&draft.date, form::DATE_FORMAT).map_err(|e| {
            PatientTrackerError::InvalidInput(format!("date '{}': {}", draft.date, e))
        })?;
        Ok(DraftPatient {
            name: draft.name,
            caretaker: draft.caretaker,
            email: draft.email,
            date,
            symptoms: draft.symptoms,
        })
    }
}

/// FFI-safe raw form values.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct FfiPatientFields {
    pub name: String,
    pub caretaker: String,
    pub email: String,
    pub date: String,
    pub symptoms: String,
}

impl From<FfiPatientFields> for PatientFields {
    fn from(fields: FfiPatientFields) -> Self {
        PatientFields {
            name: fields.name,
            caretaker: fields.caretaker,
            email: fields.email,
            date: fields.date,
            symptoms: fields.symptoms,
        }
    }
}

impl From<PatientFields> for FfiPatientFields {
    fn from(fields: PatientFields) -> Self {
        Self {
            name: fields.name,
            caretaker: fields.caretaker,
            email: fields.email,
            date: fields.date,
            symptoms: fields.symptoms,
        }
    }
}

/// FFI-safe validation message.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub message: String,
}

fn field_errors(errors: &ValidationErrors) -> Vec<FfiFieldError> {
    errors
        .iter()
        .map(|(field, message)| FfiFieldError {
            field: field.as_str().to_string(),
            message: message.to_string(),
        })
        .collect()
}

/// FFI-safe submission result.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiSubmitOutcome {
    Created { patient: FfiPatient },
    Updated { patient: Option<FfiPatient> },
    Rejected { errors: Vec<FfiFieldError> },
}

impl From<SubmitOutcome> for FfiSubmitOutcome {
    fn from(outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Created(patient) => FfiSubmitOutcome::Created {
                patient: patient.into(),
            },
            SubmitOutcome::Updated(patient) => FfiSubmitOutcome::Updated {
                patient: patient.map(Into::into),
            },
            SubmitOutcome::Rejected(errors) => FfiSubmitOutcome::Rejected {
                errors: field_errors(&errors),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> FfiPatientFields {
        FfiPatientFields {
            name: name.into(),
            caretaker: "Ana".into(),
            email: "a@b.co".into(),
            date: "2023-01-01".into(),
            symptoms: "cough".into(),
        }
    }

    #[test]
    fn test_open_with_config_applies_logging() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        // The second call finds the subscriber already installed.
        let first = open_tracker_with_config(path.clone()).unwrap();
        let second = open_tracker_with_config(path).unwrap();
        assert!(first.list_patients().unwrap().is_empty());
        assert!(second.list_patients().unwrap().is_empty());
    }

    #[test]
    fn test_ffi_submit_and_list() {
        let tracker = open_tracker_in_memory().unwrap();

        let outcome = tracker.submit_form(raw("Rex")).unwrap();
        assert!(matches!(outcome, FfiSubmitOutcome::Created { .. }));
        assert_eq!(tracker.revision().unwrap(), 1);

        let patients = tracker.list_patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].date, "2023-01-01");
        assert_eq!(
            tracker.current_notice().unwrap().as_deref(),
            Some("Patient registered successfully")
        );
        assert_eq!(tracker.form_fields().unwrap(), FfiPatientFields::default());
    }

    #[test]
    fn test_ffi_rejected_submit() {
        let tracker = open_tracker_in_memory().unwrap();

        let outcome = tracker.submit_form(raw("Al")).unwrap();
        match outcome {
            FfiSubmitOutcome::Rejected { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(tracker.form_errors().unwrap().len(), 1);
        assert_eq!(tracker.form_fields().unwrap().name, "Al");
    }

    #[test]
    fn test_ffi_store_operations() {
        let tracker = open_tracker_in_memory().unwrap();

        let draft = FfiDraftPatient {
            name: "Rex".into(),
            caretaker: "Ana".into(),
            email: "a@b.co".into(),
            date: "2023-01-01".into(),
            symptoms: "cough".into(),
        };
        let rex = tracker.add_patient(draft.clone()).unwrap();

        tracker.select_patient(rex.id.clone()).unwrap();
        assert_eq!(tracker.active_patient().unwrap(), Some(rex.clone()));
        assert_eq!(tracker.submit_label().unwrap(), "Update Patient");

        let updated = tracker
            .update_patient(FfiDraftPatient {
                name: "Rex2".into(),
                ..draft
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, rex.id);
        assert!(tracker.active_patient().unwrap().is_none());

        assert!(tracker.delete_patient(rex.id.clone()).unwrap());
        assert!(!tracker.delete_patient(rex.id).unwrap());
        assert!(tracker.list_patients().unwrap().is_empty());
    }

    #[test]
    fn test_ffi_bad_date_rejected() {
        let tracker = open_tracker_in_memory().unwrap();
        let result = tracker.add_patient(FfiDraftPatient {
            name: "Rex".into(),
            caretaker: "Ana".into(),
            email: "a@b.co".into(),
            date: "yesterday".into(),
            symptoms: "cough".into(),
        });
        assert!(matches!(result, Err(PatientTrackerError::InvalidInput(_))));
    }

    #[test]
    fn test_ffi_edit_and_remove() {
        let tracker = open_tracker_in_memory().unwrap();
        tracker.submit_form(raw("Rex")).unwrap();
        let id = tracker.list_patients().unwrap()[0].id.clone();

        let loaded = tracker.edit_patient(id.clone()).unwrap().unwrap();
        assert_eq!(loaded.name, "Rex");
        assert_eq!(tracker.form_fields().unwrap().name, "Rex");

        assert!(tracker.remove_patient(id).unwrap());
        assert_eq!(
            tracker.current_notice().unwrap().as_deref(),
            Some("Patient deleted successfully")
        );
    }

    #[test]
    fn test_ffi_validate_patient() {
        let tracker = open_tracker_in_memory().unwrap();
        assert!(tracker.validate_patient(raw("Rex")).is_empty());

        let errors = tracker.validate_patient(FfiPatientFields::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "caretaker", "email", "date", "symptoms"]);
    }

    #[test]
    fn test_open_tracker_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db").to_string_lossy().to_string();

        {
            let tracker = open_tracker(path.clone()).unwrap();
            tracker.submit_form(raw("Rex")).unwrap();
        }

        let tracker = open_tracker(path).unwrap();
        let patients = tracker.list_patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "Rex");
    }
}
