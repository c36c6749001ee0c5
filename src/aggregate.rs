use crate::models::{WeightEntry, WorkoutEntry, WorkoutType};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

const WEEK_COUNT: usize = 8;
const RECENT_PER_KIND: usize = 3;
const RECENT_LIMIT: usize = 5;

/// Anything that lives in a persisted collection keyed by id.
pub trait Record {
    fn id(&self) -> &str;
    fn date(&self) -> NaiveDate;
}

impl Record for WeightEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Record for WorkoutEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Stable sort by date.
pub fn sort_by_date<R: Record>(records: &mut [R], order: Order) {
    match order {
        Order::Ascending => records.sort_by_key(|record| record.date()),
        Order::Descending => records.sort_by(|a, b| b.date().cmp(&a.date())),
    }
}

/// Concatenates `existing` and `incoming`, keeps the first record seen for
/// each id (so existing records win) and sorts the result newest first.
pub fn merge_by_id<R: Record>(existing: Vec<R>, incoming: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::new();
    let mut merged: Vec<R> = existing
        .into_iter()
        .chain(incoming)
        .filter(|record| seen.insert(record.id().to_string()))
        .collect();
    sort_by_date(&mut merged, Order::Descending);
    merged
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

pub fn weight_series(entries: &[WeightEntry]) -> impl Iterator<Item = WeightPoint> + '_ {
    let mut ordered: Vec<&WeightEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.date);
    ordered.into_iter().map(|entry| WeightPoint {
        date: entry.date,
        weight: entry.weight,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyWorkouts {
    pub date: NaiveDate,
    pub workouts: usize,
}

/// One bucket per day ending at `today`, oldest first. `days` long unless the
/// window would start before the earliest representable date, in which case
/// it starts there.
pub fn frequency_last_n_days(
    workouts: &[WorkoutEntry],
    today: NaiveDate,
    days: usize,
) -> Vec<DailyWorkouts> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for workout in workouts {
        *counts.entry(workout.date).or_default() += 1;
    }

    let reachable = usize::try_from((today - NaiveDate::MIN).num_days()).unwrap_or(0);
    let days = days.min(reachable.saturating_add(1));

    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset as u64)))
        .map(|date| DailyWorkouts {
            date,
            workouts: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub label: String,
    pub count: usize,
    pub color: &'static str,
}

pub fn type_distribution(workouts: &[WorkoutEntry]) -> Vec<TypeCount> {
    let mut out: Vec<TypeCount> = Vec::new();
    for workout in workouts {
        match out.iter_mut().find(|entry| entry.kind == workout.kind) {
            Some(entry) => entry.count += 1,
            None => out.push(TypeCount {
                kind: workout.kind.clone(),
                label: capitalize(workout.kind.as_str()),
                count: 1,
                color: workout.kind.color(),
            }),
        }
    }
    out
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyRollup {
    pub week_start: NaiveDate,
    pub workouts: usize,
    pub total_exercises: usize,
    pub total_duration: u64,
}

/// Sunday-based weeks that contain at least one workout, oldest first,
/// limited to the most recent eight.
pub fn weekly_rollup(workouts: &[WorkoutEntry]) -> Vec<WeeklyRollup> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyRollup> = BTreeMap::new();
    for workout in workouts {
        let start = week_start(workout.date);
        let week = weeks.entry(start).or_insert_with(|| WeeklyRollup {
            week_start: start,
            workouts: 0,
            total_exercises: 0,
            total_duration: 0,
        });
        week.workouts += 1;
        week.total_exercises += workout.exercises.len();
        week.total_duration += u64::from(workout.duration);
    }

    let skip = weeks.len().saturating_sub(WEEK_COUNT);
    weeks.into_values().skip(skip).collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
        .unwrap_or(NaiveDate::MIN)
}

fn week_ago(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub latest: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
    /// Latest minus the entry before it; 0 with fewer than two entries.
    pub change: f64,
}

pub fn weight_summary(entries: &[WeightEntry]) -> WeightSummary {
    let mut newest_first: Vec<&WeightEntry> = entries.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let latest = newest_first.first().map(|entry| entry.weight);
    let previous = newest_first.get(1).map(|entry| entry.weight);
    let change = match (latest, previous) {
        (Some(latest), Some(previous)) => latest - previous,
        _ => 0.0,
    };

    WeightSummary {
        latest,
        min: entries.iter().map(|entry| entry.weight).reduce(f64::min),
        max: entries.iter().map(|entry| entry.weight).reduce(f64::max),
        count: entries.len(),
        change,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChange {
    pub id: String,
    pub change: Option<f64>,
}

/// For each entry, newest first, the difference to the next older entry.
pub fn weight_changes(entries: &[WeightEntry]) -> Vec<WeightChange> {
    let mut newest_first: Vec<&WeightEntry> = entries.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    newest_first
        .iter()
        .enumerate()
        .map(|(index, entry)| WeightChange {
            id: entry.id.clone(),
            change: newest_first
                .get(index + 1)
                .map(|older| entry.weight - older.weight),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutSummary {
    pub total: usize,
    pub this_week: usize,
    pub average_duration: u32,
    pub total_exercises: usize,
}

pub fn workout_summary(workouts: &[WorkoutEntry], today: NaiveDate) -> WorkoutSummary {
    WorkoutSummary {
        total: workouts.len(),
        this_week: count_since(workouts, week_ago(today)),
        average_duration: average_duration(workouts),
        total_exercises: workouts.iter().map(|w| w.exercises.len()).sum(),
    }
}

fn count_since(workouts: &[WorkoutEntry], cutoff: NaiveDate) -> usize {
    workouts.iter().filter(|w| w.date >= cutoff).count()
}

/// Mean duration in whole minutes; 0 for no workouts.
pub fn average_duration(workouts: &[WorkoutEntry]) -> u32 {
    if workouts.is_empty() {
        return 0;
    }
    let total: u64 = workouts.iter().map(|w| u64::from(w.duration)).sum();
    (total as f64 / workouts.len() as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Weight,
    Workout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub date: NaiveDate,
    pub description: String,
}

/// The three newest weights and three newest workouts, merged newest
/// first and capped at five.
pub fn recent_activity(weights: &[WeightEntry], workouts: &[WorkoutEntry]) -> Vec<Activity> {
    let mut weights: Vec<&WeightEntry> = weights.iter().collect();
    weights.sort_by(|a, b| b.date.cmp(&a.date));
    let mut workouts: Vec<&WorkoutEntry> = workouts.iter().collect();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));

    let mut activity: Vec<Activity> = weights
        .into_iter()
        .take(RECENT_PER_KIND)
        .map(|entry| Activity {
            kind: ActivityKind::Weight,
            date: entry.date,
            description: format!("Weight: {} kg", entry.weight),
        })
        .chain(workouts.into_iter().take(RECENT_PER_KIND).map(|workout| Activity {
            kind: ActivityKind::Workout,
            date: workout.date,
            description: format!(
                "{} workout - {} exercises",
                workout.kind,
                workout.exercises.len()
            ),
        }))
        .collect();
    activity.sort_by(|a, b| b.date.cmp(&a.date));
    activity.truncate(RECENT_LIMIT);
    activity
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub current_weight: Option<f64>,
    pub weight_change: f64,
    pub workouts_this_week: usize,
    pub total_workouts: usize,
    pub recent_activity: Vec<Activity>,
}

pub fn build_dashboard(
    weights: &[WeightEntry],
    workouts: &[WorkoutEntry],
    today: NaiveDate,
) -> Dashboard {
    let weight = weight_summary(weights);
    Dashboard {
        current_weight: weight.latest,
        weight_change: weight.change,
        workouts_this_week: count_since(workouts, week_ago(today)),
        total_workouts: workouts.len(),
        recent_activity: recent_activity(weights, workouts),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    /// Newest minus oldest weight; absent without weight entries.
    pub total_weight_change: Option<f64>,
    pub weight_entries: usize,
    pub total_workouts: usize,
    /// Summed workout duration in whole hours.
    pub total_hours: u64,
}

pub fn chart_summary(weights: &[WeightEntry], workouts: &[WorkoutEntry]) -> ChartSummary {
    let newest = weights.iter().max_by_key(|entry| entry.date);
    let oldest = weights.iter().min_by_key(|entry| entry.date);
    let minutes: u64 = workouts.iter().map(|w| u64::from(w.duration)).sum();

    ChartSummary {
        total_weight_change: newest.zip(oldest).map(|(newest, oldest)| newest.weight - oldest.weight),
        weight_entries: weights.len(),
        total_workouts: workouts.len(),
        total_hours: (minutes as f64 / 60.0).round() as u64,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub weight_entries: usize,
    pub total_workouts: usize,
    /// Size of the two stored documents in KB, two decimals.
    pub data_size_kb: f64,
}

pub fn profile_stats(weight_entries: usize, total_workouts: usize, stored_bytes: usize) -> ProfileStats {
    ProfileStats {
        weight_entries,
        total_workouts,
        data_size_kb: (stored_bytes as f64 / 1024.0 * 100.0).round() / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weight(id: &str, kg: f64, date: NaiveDate) -> WeightEntry {
        WeightEntry {
            id: id.into(),
            weight: kg,
            date,
            notes: None,
            timestamp: String::new(),
        }
    }

    fn workout(id: &str, kind: WorkoutType, date: NaiveDate, duration: u32, exercises: usize) -> WorkoutEntry {
        WorkoutEntry {
            id: id.into(),
            kind,
            date,
            duration,
            notes: None,
            exercises: (0..exercises)
                .map(|i| Exercise {
                    id: i.to_string(),
                    name: format!("exercise {i}"),
                    sets: vec![],
                })
                .collect(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn merge_keeps_existing_record_on_id_clash() {
        let existing = vec![weight("a", 75.0, day(2024, 1, 2))];
        let imported = vec![weight("a", 70.0, day(2024, 1, 1))];
        let merged = merge_by_id(existing, imported);
        assert_eq!(merged, vec![weight("a", 75.0, day(2024, 1, 2))]);
    }

    #[test]
    fn merge_is_idempotent_on_reimport() {
        let existing = vec![
            weight("a", 75.0, day(2024, 1, 2)),
            weight("b", 74.0, day(2024, 1, 5)),
        ];
        let imported = vec![
            weight("c", 73.0, day(2024, 1, 3)),
            weight("a", 70.0, day(2024, 1, 1)),
        ];
        let once = merge_by_id(existing.clone(), imported.clone());
        let twice = merge_by_id(once.clone(), imported);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        let dates: Vec<_> = once.iter().map(|w| w.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 5), day(2024, 1, 3), day(2024, 1, 2)]);
    }

    #[test]
    fn merge_with_empty_resorts_descending() {
        let collection = vec![
            weight("a", 75.0, day(2024, 1, 1)),
            weight("b", 74.0, day(2024, 1, 3)),
            weight("c", 73.0, day(2024, 1, 3)),
        ];
        let merged = merge_by_id(collection, Vec::new());
        let ids: Vec<_> = merged.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn weight_series_is_ascending() {
        let entries = vec![
            weight("a", 80.0, day(2024, 1, 3)),
            weight("b", 81.0, day(2024, 1, 1)),
        ];
        let series: Vec<_> = weight_series(&entries).collect();
        assert_eq!(series[0].date, day(2024, 1, 1));
        assert_eq!(series[1].weight, 80.0);
    }

    #[test]
    fn frequency_window_is_fixed_length() {
        let today = day(2024, 3, 10);
        assert_eq!(frequency_last_n_days(&[], today, 30).len(), 30);

        let workouts = vec![
            workout("1", WorkoutType::Gym, day(2024, 3, 9), 30, 1),
            workout("2", WorkoutType::Home, day(2024, 3, 9), 30, 1),
            workout("3", WorkoutType::Gym, day(2024, 1, 1), 30, 1),
        ];
        let buckets = frequency_last_n_days(&workouts, today, 7);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].date, day(2024, 3, 4));
        assert_eq!(buckets[6].date, today);
        assert_eq!(buckets[5].workouts, 2);
        assert_eq!(buckets.iter().map(|b| b.workouts).sum::<usize>(), 2);
    }

    #[test]
    fn frequency_window_stops_at_earliest_date() {
        let buckets = frequency_last_n_days(&[], NaiveDate::MIN, 2);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, NaiveDate::MIN);

        let today = NaiveDate::MIN + Duration::days(3);
        let buckets = frequency_last_n_days(&[], today, usize::MAX);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].date, NaiveDate::MIN);
        assert_eq!(buckets[3].date, today);
    }

    #[test]
    fn rollups_near_earliest_date_do_not_overflow() {
        let workouts = vec![workout("1", WorkoutType::Gym, NaiveDate::MIN, 10, 1)];
        assert_eq!(weekly_rollup(&workouts).len(), 1);
        assert_eq!(workout_summary(&workouts, NaiveDate::MIN).this_week, 1);
    }

    #[test]
    fn chart_summary_empty() {
        let summary = chart_summary(&[], &[]);
        assert_eq!(summary.total_weight_change, None);
        assert_eq!(summary.weight_entries, 0);
        assert_eq!(summary.total_workouts, 0);
        assert_eq!(summary.total_hours, 0);
    }

    #[test]
    fn chart_summary_single_entries() {
        let weights = vec![weight("a", 80.0, day(2024, 1, 1))];
        let workouts = vec![workout("w", WorkoutType::Gym, day(2024, 1, 1), 45, 2)];
        let summary = chart_summary(&weights, &workouts);
        assert_eq!(summary.total_weight_change, Some(0.0));
        assert_eq!(summary.weight_entries, 1);
        assert_eq!(summary.total_workouts, 1);
        assert_eq!(summary.total_hours, 1);
    }

    #[test]
    fn chart_summary_spans_oldest_to_newest() {
        let weights = vec![
            weight("a", 78.0, day(2024, 3, 1)),
            weight("b", 82.0, day(2024, 1, 1)),
            weight("c", 80.0, day(2024, 2, 1)),
        ];
        let workouts = vec![
            workout("1", WorkoutType::Gym, day(2024, 1, 1), 20, 1),
            workout("2", WorkoutType::Gym, day(2024, 1, 2), 20, 1),
        ];
        let summary = chart_summary(&weights, &workouts);
        assert_eq!(summary.total_weight_change, Some(-4.0));
        assert_eq!(summary.total_hours, 1);
    }

    #[test]
    fn type_distribution_in_first_seen_order() {
        let workouts = vec![
            workout("1", WorkoutType::Gym, day(2024, 1, 1), 0, 1),
            workout("2", WorkoutType::Home, day(2024, 1, 2), 0, 1),
            workout("3", WorkoutType::Gym, day(2024, 1, 3), 0, 1),
        ];
        let dist = type_distribution(&workouts);
        assert_eq!(dist.len(), 2);
        assert_eq!((dist[0].kind.clone(), dist[0].count), (WorkoutType::Gym, 2));
        assert_eq!((dist[1].kind.clone(), dist[1].count), (WorkoutType::Home, 1));
        assert_eq!(dist[0].label, "Gym");
    }

    #[test]
    fn weekly_rollup_groups_by_sunday_and_keeps_last_eight() {
        // 2024-01-07 is a Sunday.
        let mut workouts = vec![
            workout("a", WorkoutType::Gym, day(2024, 1, 7), 30, 2),
            workout("b", WorkoutType::Gym, day(2024, 1, 13), 45, 3),
            workout("c", WorkoutType::Gym, day(2024, 1, 14), 10, 1),
        ];
        let weeks = weekly_rollup(&workouts);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, day(2024, 1, 7));
        assert_eq!(weeks[0].workouts, 2);
        assert_eq!(weeks[0].total_exercises, 5);
        assert_eq!(weeks[0].total_duration, 75);
        assert_eq!(weeks[1].week_start, day(2024, 1, 14));

        for week in 0..10 {
            workouts.push(workout(
                &format!("w{week}"),
                WorkoutType::Home,
                day(2024, 3, 3) + Duration::weeks(week),
                20,
                1,
            ));
        }
        let weeks = weekly_rollup(&workouts);
        assert_eq!(weeks.len(), 8);
        assert_eq!(weeks[0].week_start, day(2024, 3, 3) + Duration::weeks(2));
        assert_eq!(weeks[7].week_start, day(2024, 3, 3) + Duration::weeks(9));
    }

    #[test]
    fn single_weight_summary() {
        let entries = vec![weight("a", 80.5, day(2024, 1, 1))];
        let summary = weight_summary(&entries);
        assert_eq!(summary.latest, Some(80.5));
        assert_eq!(summary.min, Some(80.5));
        assert_eq!(summary.max, Some(80.5));
        assert_eq!(summary.count, 1);
        assert_eq!(summary.change, 0.0);
    }

    #[test]
    fn weight_summary_uses_newest_date_for_latest() {
        let entries = vec![
            weight("a", 82.0, day(2024, 1, 1)),
            weight("b", 80.0, day(2024, 1, 9)),
            weight("c", 81.0, day(2024, 1, 5)),
        ];
        let summary = weight_summary(&entries);
        assert_eq!(summary.latest, Some(80.0));
        assert_eq!(summary.change, -1.0);
        assert_eq!(summary.min, Some(80.0));
        assert_eq!(summary.max, Some(82.0));

        let changes = weight_changes(&entries);
        assert_eq!(changes[0].change, Some(-1.0));
        assert_eq!(changes[2].change, None);
    }

    #[test]
    fn empty_workouts_average_zero() {
        assert_eq!(average_duration(&[]), 0);
        let summary = workout_summary(&[], day(2024, 1, 1));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_duration, 0);
    }

    #[test]
    fn workout_summary_counts_last_seven_days() {
        let today = day(2024, 3, 10);
        let workouts = vec![
            workout("1", WorkoutType::Gym, day(2024, 3, 3), 30, 2),
            workout("2", WorkoutType::Gym, day(2024, 3, 2), 45, 1),
            workout("3", WorkoutType::Home, today, 20, 4),
        ];
        let summary = workout_summary(&workouts, today);
        assert_eq!(summary.this_week, 2);
        assert_eq!(summary.average_duration, 32);
        assert_eq!(summary.total_exercises, 7);
    }

    #[test]
    fn recent_activity_is_capped_at_five() {
        let weights: Vec<_> = (1..=4).map(|d| weight(&d.to_string(), 80.0, day(2024, 1, d))).collect();
        let workouts: Vec<_> = (1..=4)
            .map(|d| workout(&format!("w{d}"), WorkoutType::Gym, day(2024, 2, d), 30, 2))
            .collect();
        let activity = recent_activity(&weights, &workouts);
        assert_eq!(activity.len(), 5);
        assert_eq!(activity[0].kind, ActivityKind::Workout);
        assert_eq!(activity[0].date, day(2024, 2, 4));
        assert_eq!(activity[0].description, "gym workout - 2 exercises");
        assert_eq!(activity[3].kind, ActivityKind::Weight);
        assert_eq!(activity[3].date, day(2024, 1, 4));
    }

    #[test]
    fn profile_size_rounds_to_two_decimals() {
        assert_eq!(profile_stats(1, 2, 1536).data_size_kb, 1.5);
        assert_eq!(profile_stats(0, 0, 100).data_size_kb, 0.1);
    }
}
