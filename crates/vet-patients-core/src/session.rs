//! Tracker session: the store, the form and the notice board wired together.
//!
//! Each method corresponds to one UI event (submit the form, press "Edit" or
//! "Delete" on a list entry) and runs to completion before returning.

use chrono::{DateTime, Local};

use crate::config::TrackerConfig;
use crate::db::BlobStore;
use crate::form::{Notice, NoticeBoard, PatientForm, SubmitOutcome, DELETED_MESSAGE};
use crate::models::{Patient, PatientFields};
use crate::store::{PatientStore, StoreResult};

/// One user's view of the tracker: the patient store, the form being edited
/// and the success notice currently on screen.
///
/// ```
/// use vet_patients_core::{MemoryBlobStore, PatientFields, TrackerConfig, TrackerSession};
///
/// let mut session = TrackerSession::open(MemoryBlobStore::new(), &TrackerConfig::default());
/// let fields = PatientFields {
///     name: "Rex".into(),
///     caretaker: "Ana".into(),
///     email: "ana@clinic.org".into(),
///     date: "2023-01-01".into(),
///     symptoms: "cough".into(),
/// };
///
/// let now = chrono::Local::now();
/// session.submit(fields, now).unwrap();
/// assert_eq!(session.patients().len(), 1);
/// assert!(session.current_notice(now).is_some());
/// ```
pub struct TrackerSession<B: BlobStore> {
    store: PatientStore<B>,
    form: PatientForm,
    notices: NoticeBoard,
}

impl<B: BlobStore> TrackerSession<B> {
    /// Restore the persisted store from `blobs` and start with an empty form.
    pub fn open(blobs: B, config: &TrackerConfig) -> Self {
        let store = PatientStore::open(blobs, config.storage.key.clone());
        let mut form = PatientForm::new();
        // An edit that was in progress when the app closed resumes.
        if let Some(patient) = store.active_patient() {
            form.load(patient);
        }

        Self {
            store,
            form,
            notices: NoticeBoard::from_millis(config.notices.duration_ms),
        }
    }

    /// Submit `fields`: add or update, then post a success notice.
    pub fn submit(
        &mut self,
        fields: PatientFields,
        now: DateTime<Local>,
    ) -> StoreResult<SubmitOutcome> {
        self.form.set_fields(fields);
        let outcome = self.form.submit(&mut self.store, now.date_naive())?;
        if let Some(message) = outcome.message() {
            self.notices.post(message, now);
        }
        Ok(outcome)
    }

    /// Put `id` in edit mode and fill the form from it.
    ///
    /// An unknown id still moves the pointer but leaves the form untouched.
    pub fn edit(&mut self, id: &str) -> StoreResult<Option<&Patient>> {
        self.store.select(id)?;
        match self.store.active_patient() {
            Some(patient) => {
                self.form.load(patient);
                Ok(Some(patient))
            }
            None => {
                tracing::debug!(id = %id, "Edit requested for unknown patient");
                Ok(None)
            }
        }
    }

    /// Delete `id` and post a notice.
    pub fn delete(&mut self, id: &str, now: DateTime<Local>) -> StoreResult<bool> {
        let was_editing = self.store.active_id() == Some(id);
        let removed = self.store.delete(id)?;
        if was_editing {
            self.form.reset();
        }
        self.notices.post(DELETED_MESSAGE, now);
        Ok(removed)
    }

    pub fn patients(&self) -> &[Patient] {
        self.store.patients()
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    /// Label for the submit button in the current mode.
    pub fn submit_label(&self) -> &'static str {
        PatientForm::submit_label(self.store.active_id().is_some())
    }

    /// Visible notice at `now`; expired notices are dropped.
    pub fn current_notice(&mut self, now: DateTime<Local>) -> Option<&Notice> {
        self.notices.clear_expired(now);
        self.notices.current(now)
    }

    pub fn store(&self) -> &PatientStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PatientStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> PatientStore<B> {
        self.store
    }
}
