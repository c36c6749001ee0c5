use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("weight must be a positive number of kilograms")]
    InvalidWeight,
    #[error("a workout needs at least one named exercise")]
    NoExercises,
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Returns a creation-time token: the current Unix time in milliseconds,
/// bumped forward when two ids are requested within the same millisecond.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::SeqCst);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn validate_weight(weight: f64) -> Result<f64, ValidationError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(ValidationError::InvalidWeight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: String,
    pub weight: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

impl WeightEntry {
    pub fn new(weight: f64, date: NaiveDate, notes: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: next_id(),
            weight: validate_weight(weight)?,
            date,
            notes: clean_notes(notes),
            timestamp: now_timestamp(),
        })
    }

    /// Replaces the editable fields. Date, id and timestamp are kept.
    pub fn edit(&mut self, weight: f64, notes: Option<String>) -> Result<(), ValidationError> {
        self.weight = validate_weight(weight)?;
        self.notes = clean_notes(notes);
        Ok(())
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkoutType {
    Gym,
    Home,
    Kettlebell,
    /// Anything else found in stored or imported data, kept verbatim.
    Other(String),
}

impl WorkoutType {
    pub fn as_str(&self) -> &str {
        match self {
            WorkoutType::Gym => "gym",
            WorkoutType::Home => "home",
            WorkoutType::Kettlebell => "kettlebell",
            WorkoutType::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Gym => "Gym Workout",
            WorkoutType::Home => "Home Workout",
            WorkoutType::Kettlebell => "Kettlebell Workout",
            WorkoutType::Other(_) => "Workout",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            WorkoutType::Gym => "#3b82f6",
            WorkoutType::Home => "#10b981",
            WorkoutType::Kettlebell => "#f59e0b",
            WorkoutType::Other(_) => "#64748b",
        }
    }

    pub fn suggested_exercises(&self) -> &'static [&'static str] {
        match self {
            WorkoutType::Gym => &[
                "Bench Press",
                "Squat",
                "Deadlift",
                "Overhead Press",
                "Barbell Row",
                "Pull-ups",
                "Dips",
                "Lat Pulldown",
                "Leg Press",
                "Bicep Curls",
                "Tricep Extensions",
                "Shoulder Press",
                "Chest Fly",
                "Leg Curls",
            ],
            WorkoutType::Home => &[
                "Push-ups",
                "Squats",
                "Lunges",
                "Burpees",
                "Mountain Climbers",
                "Plank",
                "Jumping Jacks",
                "High Knees",
                "Sit-ups",
                "Crunches",
                "Wall Sit",
                "Step-ups",
                "Glute Bridges",
                "Pike Push-ups",
            ],
            WorkoutType::Kettlebell => &[
                "Kettlebell Swing",
                "Turkish Get-up",
                "Goblet Squat",
                "Kettlebell Press",
                "Kettlebell Row",
                "Kettlebell Deadlift",
                "Kettlebell Clean",
                "Kettlebell Snatch",
                "Windmill",
                "Halo",
                "Farmer's Walk",
            ],
            WorkoutType::Other(_) => &[],
        }
    }
}

impl From<String> for WorkoutType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "gym" => WorkoutType::Gym,
            "home" => WorkoutType::Home,
            "kettlebell" => WorkoutType::Kettlebell,
            _ => WorkoutType::Other(raw),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WorkoutType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkoutType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(WorkoutType::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    #[serde(default, deserialize_with = "lenient::int")]
    pub reps: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float"
    )]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<Set>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: Vec<Set>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            sets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub timestamp: String,
}

impl WorkoutEntry {
    /// Builds a workout, dropping exercises with blank names. Sets of `home`
    /// workouts never carry a weight.
    pub fn new(
        kind: WorkoutType,
        date: NaiveDate,
        duration: Option<u32>,
        notes: Option<String>,
        exercises: Vec<Exercise>,
    ) -> Result<Self, ValidationError> {
        let exercises = normalize_exercises(&kind, exercises)?;
        Ok(Self {
            id: next_id(),
            kind,
            date,
            duration: duration.unwrap_or(0),
            notes: clean_notes(notes),
            exercises,
            timestamp: now_timestamp(),
        })
    }

    /// Full-record replacement; only `id` and `timestamp` survive.
    pub fn replace(&mut self, replacement: WorkoutEntry) {
        let WorkoutEntry {
            kind,
            date,
            duration,
            notes,
            exercises,
            ..
        } = replacement;
        self.kind = kind;
        self.date = date;
        self.duration = duration;
        self.notes = notes;
        self.exercises = exercises;
    }
}

fn normalize_exercises(
    kind: &WorkoutType,
    exercises: Vec<Exercise>,
) -> Result<Vec<Exercise>, ValidationError> {
    let exercises: Vec<Exercise> = exercises
        .into_iter()
        .filter(|exercise| !exercise.name.trim().is_empty())
        .map(|mut exercise| {
            if *kind == WorkoutType::Home {
                for set in &mut exercise.sets {
                    set.weight = None;
                }
            }
            exercise
        })
        .collect();

    if exercises.is_empty() {
        return Err(ValidationError::NoExercises);
    }
    Ok(exercises)
}

/// Numeric fields written by the browser version of the app are sometimes
/// stored as the raw form input (`"12"`, `""`).
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(number(Value::deserialize(deserializer)?).filter(|n| n.is_finite()))
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Ok(float(deserializer)?.map(|n| n.trunc() as i64))
    }

    pub fn minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(float(deserializer)?
            .filter(|n| *n >= 0.0)
            .map(|n| n.trunc().min(u32::MAX as f64) as u32)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let first: i64 = next_id().parse().unwrap();
        let second: i64 = next_id().parse().unwrap();
        assert!(second > first);
    }

    #[test]
    fn weight_entry_rejects_non_positive_weight() {
        assert_eq!(
            WeightEntry::new(0.0, day(2024, 1, 1), None),
            Err(ValidationError::InvalidWeight)
        );
        assert_eq!(
            WeightEntry::new(f64::NAN, day(2024, 1, 1), None),
            Err(ValidationError::InvalidWeight)
        );
        assert!(WeightEntry::new(80.5, day(2024, 1, 1), None).is_ok());
    }

    #[test]
    fn blank_notes_are_dropped() {
        let entry = WeightEntry::new(80.0, day(2024, 1, 1), Some("  ".into())).unwrap();
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn workout_drops_unnamed_exercises() {
        let workout = WorkoutEntry::new(
            WorkoutType::Gym,
            day(2024, 1, 1),
            None,
            None,
            vec![Exercise::new("Squat", vec![]), Exercise::new(" ", vec![])],
        )
        .unwrap();
        assert_eq!(workout.exercises.len(), 1);
        assert_eq!(workout.duration, 0);

        let err = WorkoutEntry::new(
            WorkoutType::Gym,
            day(2024, 1, 1),
            Some(30),
            None,
            vec![Exercise::new("", vec![])],
        );
        assert_eq!(err, Err(ValidationError::NoExercises));
    }

    #[test]
    fn home_workout_sets_carry_no_weight() {
        let workout = WorkoutEntry::new(
            WorkoutType::Home,
            day(2024, 1, 1),
            Some(20),
            None,
            vec![Exercise::new(
                "Push-ups",
                vec![Set {
                    reps: Some(20),
                    weight: Some(10.0),
                }],
            )],
        )
        .unwrap();
        assert_eq!(workout.exercises[0].sets[0].weight, None);
    }

    #[test]
    fn unknown_workout_type_round_trips() {
        let json = r#"{"id":"1","type":"yoga","date":"2024-03-02","exercises":[]}"#;
        let workout: WorkoutEntry = serde_json::from_str(json).unwrap();
        assert_eq!(workout.kind, WorkoutType::Other("yoga".into()));
        assert_eq!(workout.kind.color(), "#64748b");
        let out = serde_json::to_value(&workout).unwrap();
        assert_eq!(out["type"], "yoga");
    }

    #[test]
    fn set_fields_accept_form_strings() {
        let json = r#"{"id":"1","type":"gym","date":"2024-03-02","duration":"45",
            "exercises":[{"id":"e","name":"Squat","sets":[{"reps":"5","weight":"100.5"},{"reps":"","weight":""}]}]}"#;
        let workout: WorkoutEntry = serde_json::from_str(json).unwrap();
        assert_eq!(workout.duration, 45);
        let sets = &workout.exercises[0].sets;
        assert_eq!(sets[0].reps, Some(5));
        assert_eq!(sets[0].weight, Some(100.5));
        assert_eq!(sets[1].reps, None);
        assert_eq!(sets[1].weight, None);
    }

    #[test]
    fn replace_keeps_identity() {
        let mut workout = WorkoutEntry::new(
            WorkoutType::Gym,
            day(2024, 1, 1),
            Some(30),
            None,
            vec![Exercise::new("Squat", vec![])],
        )
        .unwrap();
        let id = workout.id.clone();
        let replacement = WorkoutEntry::new(
            WorkoutType::Kettlebell,
            day(2024, 1, 2),
            Some(15),
            Some("swings".into()),
            vec![Exercise::new("Kettlebell Swing", vec![])],
        )
        .unwrap();
        workout.replace(replacement);
        assert_eq!(workout.id, id);
        assert_eq!(workout.kind, WorkoutType::Kettlebell);
        assert_eq!(workout.duration, 15);
    }
}
