//! Field rules for the patient form.
//!
//! Every field is checked independently and all violations are reported
//! together, so the form can show one message per field in a single pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DraftPatient, PatientFields};

/// Minimum length for the patient and caretaker names.
pub const MIN_NAME_LENGTH: usize = 3;

/// Date format produced by date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// Form field identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientField {
    Name,
    Caretaker,
    Email,
    Date,
    Symptoms,
}

impl PatientField {
    pub const ALL: [PatientField; 5] = [
        PatientField::Name,
        PatientField::Caretaker,
        PatientField::Email,
        PatientField::Date,
        PatientField::Symptoms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientField::Name => "name",
            PatientField::Caretaker => "caretaker",
            PatientField::Email => "email",
            PatientField::Date => "date",
            PatientField::Symptoms => "symptoms",
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field violation messages.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} field(s) failed validation", .messages.len())]
pub struct ValidationErrors {
    messages: BTreeMap<PatientField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: PatientField) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: PatientField) -> bool {
        self.messages.contains_key(&field)
    }

    /// Violations in field order.
    pub fn iter(&self) -> impl Iterator<Item = (PatientField, &str)> {
        self.messages.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: PatientField, message: &str) {
        self.messages.insert(field, message.to_string());
    }
}

/// Validate raw form input against `today`.
pub fn validate(fields: &PatientFields, today: NaiveDate) -> Result<DraftPatient, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(msg) = check_name(
        &fields.name,
        "Patient name is required",
        "Patient name must be at least 3 characters",
    ) {
        errors.insert(PatientField::Name, msg);
    }

    if let Some(msg) = check_name(
        &fields.caretaker,
        "Caretaker name is required",
        "Caretaker name must be at least 3 characters",
    ) {
        errors.insert(PatientField::Caretaker, msg);
    }

    if let Some(msg) = check_email(&fields.email) {
        errors.insert(PatientField::Email, msg);
    }

    let date = match check_date(&fields.date, today) {
        Ok(date) => Some(date),
        Err(msg) => {
            errors.insert(PatientField::Date, msg);
            None
        }
    };

    if is_blank(&fields.symptoms) {
        errors.insert(PatientField::Symptoms, "Symptoms are required");
    }

    match date {
        Some(date) if errors.is_empty() => Ok(DraftPatient {
            name: fields.name.clone(),
            caretaker: fields.caretaker.clone(),
            email: fields.email.clone(),
            date,
            symptoms: fields.symptoms.clone(),
        }),
        _ => Err(errors),
    }
}

/// Validate against the local calendar date.
pub fn validate_today(fields: &PatientFields) -> Result<DraftPatient, ValidationErrors> {
    validate(fields, chrono::Local::now().date_naive())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_name(
    value: &str,
    required: &'static str,
    too_short: &'static str,
) -> Option<&'static str> {
    if value.is_empty() {
        Some(required)
    } else if value.chars().count() < MIN_NAME_LENGTH {
        Some(too_short)
    } else {
        None
    }
}

fn check_email(value: &str) -> Option<&'static str> {
    if is_blank(value) {
        Some("Email is required")
    } else if !EMAIL_PATTERN.is_match(value) {
        Some("Email is not valid")
    } else {
        None
    }
}

fn check_date(value: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    if is_blank(value) {
        return Err("Admission date is required");
    }
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| "Admission date is not a valid date")?;
    if date > today {
        return Err("Admission date cannot be in the future");
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn valid_fields() -> PatientFields {
        PatientFields {
            name: "Rex".into(),
            caretaker: "Ana".into(),
            email: "a@b.co".into(),
            date: "2023-01-01".into(),
            symptoms: "cough".into(),
        }
    }

    #[test]
    fn test_valid_fields() {
        let draft = validate(&valid_fields(), today()).unwrap();
        assert_eq!(draft.name, "Rex");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn test_name_length() {
        let mut fields = valid_fields();
        fields.name = "Al".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Name),
            Some("Patient name must be at least 3 characters")
        );
        assert_eq!(errors.len(), 1);

        fields.name = "Alf".into();
        assert!(validate(&fields, today()).is_ok());
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        let mut fields = valid_fields();
        fields.name = "Ñu".into();
        assert!(validate(&fields, today()).is_err());

        fields.name = "Ñoñ".into();
        assert!(validate(&fields, today()).is_ok());
    }

    #[test]
    fn test_name_measured_as_typed() {
        let mut fields = valid_fields();
        fields.name = " Al".into();
        assert_eq!(validate(&fields, today()).unwrap().name, " Al");

        fields.name = "   ".into();
        assert!(validate(&fields, today()).is_ok());

        fields.caretaker = "  ".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Caretaker),
            Some("Caretaker name must be at least 3 characters")
        );
    }

    #[test]
    fn test_caretaker_rules() {
        let mut fields = valid_fields();
        fields.caretaker = "".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Caretaker),
            Some("Caretaker name is required")
        );

        fields.caretaker = "Jo".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Caretaker),
            Some("Caretaker name must be at least 3 characters")
        );
    }

    #[test]
    fn test_email_pattern() {
        let mut fields = valid_fields();
        fields.email = "bad@".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(errors.get(PatientField::Email), Some("Email is not valid"));

        for bad in ["plain", "a@b", "a b@c.de", "a@@b.co", "@b.co"] {
            fields.email = bad.into();
            assert!(validate(&fields, today()).is_err(), "accepted {}", bad);
        }

        fields.email = "a@b.co".into();
        assert!(validate(&fields, today()).is_ok());
    }

    #[test]
    fn test_email_is_not_normalized() {
        let mut fields = valid_fields();
        fields.email = "Vet@Clinic.ORG".into();
        let draft = validate(&fields, today()).unwrap();
        assert_eq!(draft.email, "Vet@Clinic.ORG");
    }

    #[test]
    fn test_future_date_rejected() {
        let mut fields = valid_fields();
        fields.date = "2024-06-16".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Date),
            Some("Admission date cannot be in the future")
        );

        fields.date = "2024-06-15".into();
        assert!(validate(&fields, today()).is_ok());
    }

    #[test]
    fn test_unparseable_date() {
        let mut fields = valid_fields();
        fields.date = "15/06/2024".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(
            errors.get(PatientField::Date),
            Some("Admission date is not a valid date")
        );
    }

    #[test]
    fn test_blank_symptoms() {
        let mut fields = valid_fields();
        fields.symptoms = "   \n".into();
        let errors = validate(&fields, today()).unwrap_err();
        assert_eq!(errors.get(PatientField::Symptoms), Some("Symptoms are required"));
    }

    #[test]
    fn test_all_violations_reported() {
        let errors = validate(&PatientFields::default(), today()).unwrap_err();
        assert_eq!(errors.len(), 5);
        for field in PatientField::ALL {
            assert!(errors.contains(field), "missing {}", field);
        }
        assert_eq!(errors.to_string(), "5 field(s) failed validation");
    }

    #[test]
    fn test_validate_today_accepts_today() {
        let mut fields = valid_fields();
        fields.date = chrono::Local::now().date_naive().format(DATE_FORMAT).to_string();
        assert!(validate_today(&fields).is_ok());
    }

    proptest! {
        #[test]
        fn prop_names_of_three_or_more_chars_accepted(name in "[A-Za-zÁÉÍÓÚñ]{3,20}") {
            let mut fields = valid_fields();
            fields.name = name;
            prop_assert!(validate(&fields, today()).is_ok());
        }

        #[test]
        fn prop_short_names_rejected(name in "[A-Za-z]{1,2}") {
            let mut fields = valid_fields();
            fields.name = name;
            let errors = validate(&fields, today()).unwrap_err();
            prop_assert!(errors.contains(PatientField::Name));
        }

        #[test]
        fn prop_past_dates_accepted(days_back in 0i64..20_000) {
            let date = today() - chrono::Duration::days(days_back);
            let mut fields = valid_fields();
            fields.date = date.format(DATE_FORMAT).to_string();
            prop_assert_eq!(validate(&fields, today()).unwrap().date, date);
        }
    }
}
