//! Patient record store with persistence on every mutation.
//!
//! [`PatientStore`] owns the [`PatientState`] and a [`BlobStore`]. Each
//! mutating operation applies the change in memory, notifies observers, then
//! writes a full snapshot of the state under the configured key.

mod snapshot;
mod state;

pub use snapshot::*;
pub use state::*;

use thiserror::Error;

use crate::db::{BlobStore, DbError};
use crate::models::{DraftPatient, Patient};

/// Default key for the persisted snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "patients-storage";

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Blob store error: {0}")]
    Blob(#[from] DbError),

    #[error("Snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Receives the new state after every mutation.
pub trait StoreObserver: Send {
    fn on_change(&self, state: &PatientState);
}

impl<F> StoreObserver for F
where
    F: Fn(&PatientState) + Send,
{
    fn on_change(&self, state: &PatientState) {
        self(state)
    }
}

/// Handle returned by [`PatientStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Patient collection backed by a blob store.
pub struct PatientStore<B: BlobStore> {
    state: PatientState,
    blobs: B,
    key: String,
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_subscription: u64,
    revision: u64,
}

impl<B: BlobStore> PatientStore<B> {
    /// Open a store, restoring the snapshot under `key` if one is usable.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty store.
    pub fn open(mut blobs: B, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = load_state(&mut blobs, &key);
        tracing::debug!(
            key = %key,
            patients = state.patients.len(),
            "Opened patient store"
        );

        Self {
            state,
            blobs,
            key,
            observers: Vec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    /// Register a new patient.
    pub fn add(&mut self, draft: DraftPatient) -> StoreResult<Patient> {
        let patient = self.state.add(draft);
        tracing::info!(id = %patient.id, "Added patient");
        self.commit()?;
        Ok(patient)
    }

    /// Delete a patient. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let removed = self.state.delete(id);
        if removed {
            tracing::info!(id = %id, "Deleted patient");
        } else {
            tracing::debug!(id = %id, "Delete ignored, no such patient");
        }
        self.commit()?;
        Ok(removed)
    }

    /// Enter edit mode for `id`. The id is not checked.
    pub fn select(&mut self, id: &str) -> StoreResult<()> {
        self.state.select(id);
        tracing::debug!(id = %id, "Selected patient for editing");
        self.commit()
    }

    /// Apply `draft` to the active patient and leave edit mode.
    ///
    /// Returns `None` when no record matched the active pointer.
    pub fn update(&mut self, draft: DraftPatient) -> StoreResult<Option<Patient>> {
        let updated = self.state.update(draft);
        match &updated {
            Some(patient) => tracing::info!(id = %patient.id, "Updated patient"),
            None => tracing::debug!("Update ignored, active pointer did not match"),
        }
        self.commit()?;
        Ok(updated)
    }

    /// Patients in insertion order.
    pub fn patients(&self) -> &[Patient] {
        &self.state.patients
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.state.get(id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active_id.as_deref()
    }

    /// The patient in edit mode, if the pointer resolves.
    pub fn active_patient(&self) -> Option<&Patient> {
        self.state.active_patient()
    }

    pub fn state(&self) -> &PatientState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.patients.is_empty()
    }

    /// Number of mutations since the store was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Key under which the snapshot is stored.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    /// Consume the store and hand back the blob store.
    pub fn into_blob_store(self) -> B {
        self.blobs
    }

    /// Register an observer, called after every mutation.
    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Notify observers of the in-memory change, then write the snapshot.
    ///
    /// Observers and the revision track the in-memory state even when the
    /// write fails.
    fn commit(&mut self) -> StoreResult<()> {
        self.revision += 1;
        for (_, observer) in &self.observers {
            observer.on_change(&self.state);
        }

        let blob = encode(&self.state)?;
        self.blobs.put(&self.key, &blob)?;
        tracing::debug!(
            key = %self.key,
            bytes = blob.len(),
            revision = self.revision,
            "Committed snapshot"
        );
        Ok(())
    }
}

fn load_state<B: BlobStore>(blobs: &mut B, key: &str) -> PatientState {
    let bytes = match blobs.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return PatientState::new(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Could not read snapshot, starting empty");
            return PatientState::new();
        }
    };

    match decode(&bytes) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Discarding unusable snapshot, starting empty");
            if let Err(e) = blobs.remove(key) {
                tracing::warn!(key = %key, error = %e, "Could not remove unusable snapshot");
            }
            PatientState::new()
        }
    }
}
