//! In-memory patient collection and edit-mode pointer.

use serde::{Deserialize, Serialize};

use crate::models::{DraftPatient, Patient};

/// The full store state: patients in insertion order plus the active id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientState {
    pub patients: Vec<Patient>,
    /// Id of the record selected for editing. May dangle after `select`.
    pub active_id: Option<String>,
}

impl PatientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new patient built from `draft`.
    pub fn add(&mut self, draft: DraftPatient) -> Patient {
        let mut patient = Patient::from_draft(draft);
        // Ids stay unique even on a v4 collision.
        while self.get(&patient.id).is_some() {
            patient.id = uuid::Uuid::new_v4().to_string();
        }
        self.patients.push(patient.clone());
        patient
    }

    /// Remove the patient with `id`. Returns whether a record was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.patients.len();
        self.patients.retain(|patient| patient.id != id);

        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }

        self.patients.len() != before
    }

    /// Point edit mode at `id` without checking that it exists.
    pub fn select(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
    }

    /// Overwrite the active patient with `draft` and leave edit mode.
    ///
    /// Returns the updated record, or `None` when the pointer was empty or
    /// dangling. The pointer is cleared either way.
    pub fn update(&mut self, draft: DraftPatient) -> Option<Patient> {
        let active_id = self.active_id.take()?;
        let patient = self.patients.iter_mut().find(|p| p.id == active_id)?;
        patient.apply(draft);
        Some(patient.clone())
    }

    /// Look up a patient by id.
    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|patient| patient.id == id)
    }

    /// The record currently in edit mode, if the pointer resolves.
    pub fn active_patient(&self) -> Option<&Patient> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Check that ids are unique.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.patients.len());
        self.patients.iter().all(|patient| seen.insert(patient.id.as_str()))
    }
}
