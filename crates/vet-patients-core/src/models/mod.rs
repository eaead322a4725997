//! Domain models for the patient tracker.

mod patient;

pub use patient::*;
