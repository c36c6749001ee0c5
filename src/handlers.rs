use crate::aggregate::{
    self, ChartSummary, DailyWorkouts, Dashboard, ProfileStats, TypeCount, WeeklyRollup,
    WeightChange, WeightPoint, WeightSummary, WorkoutSummary,
};
use crate::backup::backup_file_name;
use crate::errors::AppError;
use crate::models::{Exercise, Set, WeightEntry, WorkoutEntry, WorkoutType};
use crate::state::AppState;
use crate::store::ImportSummary;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_FREQUENCY_DAYS: usize = 30;
const MAX_FREQUENCY_DAYS: usize = 366;

#[derive(Debug, Deserialize)]
pub struct NewWeightRequest {
    pub weight: f64,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditWeightRequest {
    pub weight: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub sets: Vec<Set>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseRequest>,
}

impl WorkoutRequest {
    fn into_entry(self, today: NaiveDate) -> Result<WorkoutEntry, AppError> {
        let exercises = self
            .exercises
            .into_iter()
            .map(|exercise| Exercise::new(exercise.name, exercise.sets))
            .collect();
        WorkoutEntry::new(
            self.kind,
            self.date.unwrap_or(today),
            self.duration,
            self.notes,
            exercises,
        )
        .map_err(|err| AppError::bad_request(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct FrequencyQuery {
    pub days: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WeightStatsResponse {
    #[serde(flatten)]
    pub summary: WeightSummary,
    pub changes: Vec<WeightChange>,
}

pub async fn index() -> Html<String> {
    Html(render_index(today()))
}

pub async fn list_weights(State(state): State<AppState>) -> Result<Json<Vec<WeightEntry>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.weights()?))
}

pub async fn add_weight(
    State(state): State<AppState>,
    Json(payload): Json<NewWeightRequest>,
) -> Result<(StatusCode, Json<WeightEntry>), AppError> {
    let entry = WeightEntry::new(
        payload.weight,
        payload.date.unwrap_or_else(today),
        payload.notes,
    )
    .map_err(|err| AppError::bad_request(err.to_string()))?;

    let mut store = state.store.lock().await;
    let entry = store.add_weight(entry)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn edit_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EditWeightRequest>,
) -> Result<Json<WeightEntry>, AppError> {
    let mut store = state.store.lock().await;
    Ok(Json(store.edit_weight(&id, payload.weight, payload.notes)?))
}

pub async fn delete_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    store.delete_weight(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_workouts(State(state): State<AppState>) -> Result<Json<Vec<WorkoutEntry>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.workouts()?))
}

pub async fn add_workout(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutEntry>), AppError> {
    let workout = payload.into_entry(today())?;
    let mut store = state.store.lock().await;
    let workout = store.add_workout(workout)?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn replace_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<WorkoutRequest>,
) -> Result<Json<WorkoutEntry>, AppError> {
    let replacement = payload.into_entry(today())?;
    let mut store = state.store.lock().await;
    Ok(Json(store.replace_workout(&id, replacement)?))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    store.delete_workout(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn suggested_exercises(Path(kind): Path<String>) -> Json<&'static [&'static str]> {
    Json(WorkoutType::from(kind).suggested_exercises())
}

pub async fn weight_stats(State(state): State<AppState>) -> Result<Json<WeightStatsResponse>, AppError> {
    let store = state.store.lock().await;
    let weights = store.weights()?;
    Ok(Json(WeightStatsResponse {
        summary: aggregate::weight_summary(&weights),
        changes: aggregate::weight_changes(&weights),
    }))
}

pub async fn workout_stats(State(state): State<AppState>) -> Result<Json<WorkoutSummary>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::workout_summary(&store.workouts()?, today())))
}

pub async fn weight_chart(State(state): State<AppState>) -> Result<Json<Vec<WeightPoint>>, AppError> {
    let store = state.store.lock().await;
    let weights = store.weights()?;
    Ok(Json(aggregate::weight_series(&weights).collect()))
}

pub async fn frequency_chart(
    State(state): State<AppState>,
    Query(query): Query<FrequencyQuery>,
) -> Result<Json<Vec<DailyWorkouts>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_FREQUENCY_DAYS);
    if days > MAX_FREQUENCY_DAYS {
        return Err(AppError::bad_request(format!(
            "days must be at most {MAX_FREQUENCY_DAYS}"
        )));
    }
    let store = state.store.lock().await;
    Ok(Json(aggregate::frequency_last_n_days(
        &store.workouts()?,
        today(),
        days,
    )))
}

pub async fn type_chart(State(state): State<AppState>) -> Result<Json<Vec<TypeCount>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::type_distribution(&store.workouts()?)))
}

pub async fn weekly_chart(State(state): State<AppState>) -> Result<Json<Vec<WeeklyRollup>>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::weekly_rollup(&store.workouts()?)))
}

pub async fn chart_summary(State(state): State<AppState>) -> Result<Json<ChartSummary>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::chart_summary(&store.weights()?, &store.workouts()?)))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::build_dashboard(
        &store.weights()?,
        &store.workouts()?,
        today(),
    )))
}

pub async fn profile(State(state): State<AppState>) -> Result<Json<ProfileStats>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(aggregate::profile_stats(
        store.weights()?.len(),
        store.workouts()?.len(),
        store.stored_bytes(),
    )))
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    let body = store.export(Utc::now())?.to_json().map_err(AppError::internal)?;
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name(today()));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let mut store = state.store.lock().await;
    Ok(Json(store.import(&body)?))
}

pub async fn clear_data(State(state): State<AppState>) -> StatusCode {
    state.store.lock().await.clear();
    StatusCode::NO_CONTENT
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
