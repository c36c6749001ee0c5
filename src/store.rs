use crate::aggregate::{Order, merge_by_id, sort_by_date};
use crate::backup::{Backup, BackupData, ImportError, parse_backup};
use crate::models::{ValidationError, WeightEntry, WorkoutEntry};
use crate::storage::StorageAdapter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, info, warn};

pub const WEIGHT_KEY: &str = "weightData";
pub const WORKOUT_KEY: &str = "workoutData";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A persisted collection exists but does not decode. It is left as is.
    #[error("stored {key} is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// The durable backend failed while reading `key` for a mutation. The
    /// fallback copy may be stale, so nothing is written.
    #[error("storage for {key} is temporarily unavailable")]
    Unavailable { key: &'static str },
    #[error("no entry with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub weight_entries: usize,
    pub total_workouts: usize,
}

/// The two persisted collections behind one storage adapter. Every mutation
/// is read-modify-write of a whole collection.
pub struct FitnessStore {
    storage: StorageAdapter,
}

impl FitnessStore {
    pub fn new(storage: StorageAdapter) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &StorageAdapter {
        &self.storage
    }

    fn load<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, StoreError> {
        decode(key, self.storage.get(key))
    }

    /// Loads a collection that is about to be rewritten. A read that failed
    /// over to the fallback map aborts the mutation instead of letting a
    /// stale copy replace the durable blob.
    fn load_for_update<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Vec<T>, StoreError> {
        let read = self.storage.read(key);
        if read.degraded {
            warn!(key, "skipping write after failed durable read");
            return Err(StoreError::Unavailable { key });
        }
        decode(key, read.value)
    }

    fn save<T: Serialize>(&mut self, key: &'static str, records: &[T]) -> Result<(), StoreError> {
        let payload =
            serde_json::to_string(records).map_err(|source| StoreError::Encode { key, source })?;
        self.storage.set(key, &payload);
        Ok(())
    }

    pub fn weights(&self) -> Result<Vec<WeightEntry>, StoreError> {
        self.load(WEIGHT_KEY)
    }

    pub fn workouts(&self) -> Result<Vec<WorkoutEntry>, StoreError> {
        self.load(WORKOUT_KEY)
    }

    pub fn save_weights(&mut self, entries: &[WeightEntry]) -> Result<(), StoreError> {
        self.save(WEIGHT_KEY, entries)
    }

    pub fn save_workouts(&mut self, workouts: &[WorkoutEntry]) -> Result<(), StoreError> {
        self.save(WORKOUT_KEY, workouts)
    }

    pub fn add_weight(&mut self, entry: WeightEntry) -> Result<WeightEntry, StoreError> {
        let mut entries = self.load_for_update(WEIGHT_KEY)?;
        entries.push(entry.clone());
        sort_by_date(&mut entries, Order::Descending);
        self.save_weights(&entries)?;
        Ok(entry)
    }

    pub fn edit_weight(
        &mut self,
        id: &str,
        weight: f64,
        notes: Option<String>,
    ) -> Result<WeightEntry, StoreError> {
        let mut entries: Vec<WeightEntry> = self.load_for_update(WEIGHT_KEY)?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        entry.edit(weight, notes)?;
        let updated = entry.clone();
        self.save_weights(&entries)?;
        Ok(updated)
    }

    pub fn delete_weight(&mut self, id: &str) -> Result<(), StoreError> {
        let mut entries: Vec<WeightEntry> = self.load_for_update(WEIGHT_KEY)?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save_weights(&entries)
    }

    pub fn add_workout(&mut self, workout: WorkoutEntry) -> Result<WorkoutEntry, StoreError> {
        let mut workouts = self.load_for_update(WORKOUT_KEY)?;
        workouts.insert(0, workout.clone());
        sort_by_date(&mut workouts, Order::Descending);
        self.save_workouts(&workouts)?;
        Ok(workout)
    }

    pub fn replace_workout(
        &mut self,
        id: &str,
        replacement: WorkoutEntry,
    ) -> Result<WorkoutEntry, StoreError> {
        let mut workouts: Vec<WorkoutEntry> = self.load_for_update(WORKOUT_KEY)?;
        let workout = workouts
            .iter_mut()
            .find(|workout| workout.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        workout.replace(replacement);
        let updated = workout.clone();
        sort_by_date(&mut workouts, Order::Descending);
        self.save_workouts(&workouts)?;
        Ok(updated)
    }

    pub fn delete_workout(&mut self, id: &str) -> Result<(), StoreError> {
        let mut workouts: Vec<WorkoutEntry> = self.load_for_update(WORKOUT_KEY)?;
        let before = workouts.len();
        workouts.retain(|workout| workout.id != id);
        if workouts.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save_workouts(&workouts)
    }

    pub fn export(&self, exported_at: DateTime<Utc>) -> Result<Backup, StoreError> {
        let data = BackupData {
            weight_data: self.weights()?,
            workout_data: self.workouts()?,
        };
        Ok(Backup::new(data, exported_at))
    }

    /// Merges a backup file into the stored data. Nothing is written unless
    /// the whole file validates.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, StoreError> {
        let incoming = parse_backup(text)?;
        let weights = merge_by_id(self.load_for_update(WEIGHT_KEY)?, incoming.weight_data);
        let workouts = merge_by_id(self.load_for_update(WORKOUT_KEY)?, incoming.workout_data);
        self.save_weights(&weights)?;
        self.save_workouts(&workouts)?;
        info!(
            weight_entries = weights.len(),
            workouts = workouts.len(),
            "imported backup"
        );
        Ok(ImportSummary {
            weight_entries: weights.len(),
            total_workouts: workouts.len(),
        })
    }

    pub fn clear(&mut self) {
        self.storage.remove(WEIGHT_KEY);
        self.storage.remove(WORKOUT_KEY);
        info!("cleared all data");
    }

    /// Bytes currently held by the two stored documents.
    pub fn stored_bytes(&self) -> usize {
        [WEIGHT_KEY, WORKOUT_KEY]
            .iter()
            .map(|key| self.storage.get(key).map_or(2, |raw| raw.len()))
            .sum()
    }
}

fn decode<T: DeserializeOwned>(key: &'static str, raw: Option<String>) -> Result<Vec<T>, StoreError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|source| {
        error!(key, "failed to parse stored collection: {source}");
        StoreError::Corrupt { key, source }
    })
}
