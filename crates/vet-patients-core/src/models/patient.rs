//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    /// Local UUID, assigned by the store and never changed
    pub id: String,
    /// Patient (animal) name
    pub name: String,
    /// Owner/caretaker name
    pub caretaker: String,
    /// Caretaker contact email
    pub email: String,
    /// Admission date
    pub date: NaiveDate,
    /// Free-text symptoms
    pub symptoms: String,
}

impl Patient {
    /// Create a patient from a validated draft, assigning a fresh id.
    pub fn from_draft(draft: DraftPatient) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            caretaker: draft.caretaker,
            email: draft.email,
            date: draft.date,
            symptoms: draft.symptoms,
        }
    }

    /// Replace every field except the id.
    pub fn apply(&mut self, draft: DraftPatient) {
        self.name = draft.name;
        self.caretaker = draft.caretaker;
        self.email = draft.email;
        self.date = draft.date;
        self.symptoms = draft.symptoms;
    }

    /// Copy of the editable fields.
    pub fn to_draft(&self) -> DraftPatient {
        DraftPatient {
            name: self.name.clone(),
            caretaker: self.caretaker.clone(),
            email: self.email.clone(),
            date: self.date,
            symptoms: self.symptoms.clone(),
        }
    }
}

/// A validated patient that has not been assigned an id yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftPatient {
    pub name: String,
    pub caretaker: String,
    pub email: String,
    pub date: NaiveDate,
    pub symptoms: String,
}

/// Raw form input, one string per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientFields {
    pub name: String,
    pub caretaker: String,
    pub email: String,
    /// ISO date (`YYYY-MM-DD`) as produced by a date input
    pub date: String,
    pub symptoms: String,
}

impl PatientFields {
    /// True when every field is empty (freshly reset form).
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.caretaker.is_empty()
            && self.email.is_empty()
            && self.date.is_empty()
            && self.symptoms.is_empty()
    }
}

impl From<&Patient> for PatientFields {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            caretaker: patient.caretaker.clone(),
            email: patient.email.clone(),
            date: patient.date.format("%Y-%m-%d").to_string(),
            symptoms: patient.symptoms.clone(),
        }
    }
}
