use crate::models::{WeightEntry, WorkoutEntry};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum ImportError {
    /// The file is not JSON at all.
    #[error("error importing data, please check the file format")]
    Parse(#[source] serde_json::Error),
    /// JSON, but not a backup this app wrote.
    #[error("invalid file format, please select a valid backup file ({0})")]
    Format(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub weight_data: Vec<WeightEntry>,
    pub workout_data: Vec<WorkoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: String,
    pub export_date: String,
    pub data: BackupData,
}

impl Backup {
    pub fn new(data: BackupData, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("fitness-tracker-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Validates and decodes a backup file. Only `data.weightData` and
/// `data.workoutData` are required; `version` and `exportDate` are not
/// checked.
pub fn parse_backup(text: &str) -> Result<BackupData, ImportError> {
    let root: Value = serde_json::from_str(text).map_err(ImportError::Parse)?;
    let data = root
        .get("data")
        .ok_or_else(|| ImportError::Format("missing data".into()))?;

    let weight_data = array_field(data, "weightData")?;
    let workout_data = array_field(data, "workoutData")?;

    Ok(BackupData {
        weight_data: decode_records(weight_data, "weightData")?,
        workout_data: decode_records(workout_data, "workoutData")?,
    })
}

fn array_field<'a>(data: &'a Value, field: &str) -> Result<&'a Value, ImportError> {
    match data.get(field) {
        Some(value) if value.is_array() => Ok(value),
        Some(_) => Err(ImportError::Format(format!("{field} is not a list"))),
        None => Err(ImportError::Format(format!("missing {field}"))),
    }
}

fn decode_records<T: for<'de> Deserialize<'de>>(
    value: &Value,
    field: &str,
) -> Result<Vec<T>, ImportError> {
    Vec::<T>::deserialize(value).map_err(|err| ImportError::Format(format!("{field}: {err}")))
}
