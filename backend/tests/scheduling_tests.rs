//! Care task derivation tests
//!
//! Schedule arithmetic, rain rescheduling, priority rules and determinism
//! of `derive_tasks`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    derive_tasks, Crop, CropStatus, DeriveOptions, ForecastEntry, Priority, TaskKind, WeatherSnapshot,
};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn crop(name: &str, days_ago: i64, watering: Option<i32>, fertilizing: Option<i32>) -> Crop {
    Crop {
        id: Uuid::new_v4(),
        owner_id: Uuid::nil(),
        name: name.to_string(),
        variety: None,
        date_planted: today() - Duration::days(days_ago),
        watering_frequency: watering,
        fertilizing_frequency: fertilizing,
        status: CropStatus::Growing,
    }
}

fn weather(condition: &str, temperature: i64) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_celsius: Decimal::from(temperature),
        humidity_percent: 65,
        wind_speed_mps: Decimal::new(21, 1),
        condition: condition.to_string(),
        description: condition.to_lowercase(),
        forecast: Vec::new(),
    }
}

fn entry(hours_ahead: i64, condition: &str) -> ForecastEntry {
    ForecastEntry {
        timestamp: now() + Duration::hours(hours_ahead),
        condition: condition.to_string(),
        temperature_celsius: Decimal::from(24),
        humidity_percent: 70,
        wind_speed_mps: Decimal::from(3),
    }
}

fn options() -> DeriveOptions {
    DeriveOptions::at(now())
}

// ============================================================================
// Schedule arithmetic
// ============================================================================

#[test]
fn test_watering_due_on_frequency_multiple() {
    let due = derive_tasks(&[crop("Basil", 6, Some(3), None)], None, today(), &options());
    assert_eq!(due.tasks.len(), 1);
    assert_eq!(due.tasks[0].kind, TaskKind::Watering);

    let not_due = derive_tasks(&[crop("Basil", 7, Some(3), None)], None, today(), &options());
    assert!(not_due.tasks.is_empty());
}

#[test]
fn test_planting_day_counts_as_due() {
    let derivation = derive_tasks(&[crop("Mint", 0, Some(2), Some(14))], None, today(), &options());
    assert_eq!(derivation.tasks.len(), 2);
}

#[test]
fn test_missing_frequency_never_schedules() {
    let derivation = derive_tasks(&[crop("Carrots", 12, None, None)], None, today(), &options());
    assert!(derivation.tasks.is_empty());
}

#[test]
fn test_future_planting_is_skipped() {
    let derivation = derive_tasks(&[crop("Radishes", -3, Some(1), Some(1))], None, today(), &options());
    assert!(derivation.tasks.is_empty());
}

#[test]
fn test_tomatoes_on_a_hot_clear_day() {
    let crops = [crop("Tomatoes", 10, Some(5), None)];
    let derivation = derive_tasks(&crops, Some(&weather("Clear", 33)), today(), &options());

    assert_eq!(derivation.tasks.len(), 1);
    let task = &derivation.tasks[0];
    assert_eq!(task.kind, TaskKind::Watering);
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.due_date, today());
    assert!(!task.rescheduled);
    assert_eq!(derivation.rescheduled_count, 0);
}

// ============================================================================
// Priority
// ============================================================================

#[test]
fn test_watering_priority_follows_temperature() {
    let crops = [crop("Spinach", 4, Some(2), None)];

    let mild = derive_tasks(&crops, Some(&weather("Clouds", 30)), today(), &options());
    assert_eq!(mild.tasks[0].priority, Priority::Medium);

    let hot = derive_tasks(&crops, Some(&weather("Clouds", 31)), today(), &options());
    assert_eq!(hot.tasks[0].priority, Priority::High);

    let unknown = derive_tasks(&crops, None, today(), &options());
    assert_eq!(unknown.tasks[0].priority, Priority::Medium);
}

#[test]
fn test_fertilizing_priority_ignores_heat() {
    let crops = [crop("Parsley", 14, None, Some(7))];
    let derivation = derive_tasks(&crops, Some(&weather("Clear", 40)), today(), &options());

    let fertilizing: Vec<_> = derivation.fertilizing().collect();
    assert_eq!(fertilizing.len(), 1);
    assert_eq!(fertilizing[0].priority, Priority::Medium);
}

// ============================================================================
// Rain rescheduling
// ============================================================================

#[test]
fn test_current_rain_moves_care_tasks_to_tomorrow() {
    let crops = [
        crop("Tomatoes", 6, Some(2), Some(3)),
        crop("Cilantro", 4, Some(1), None),
    ];
    let derivation = derive_tasks(&crops, Some(&weather("Light Rain", 22)), today(), &options());

    assert!(derivation.rain_expected);
    assert_eq!(derivation.tasks.len(), 3);
    assert_eq!(derivation.rescheduled_count, 3);
    for task in &derivation.tasks {
        assert_eq!(task.due_date, today() + Duration::days(1));
        assert!(task.rescheduled);
        assert!(task.message.contains("tomorrow"));
    }
}

#[test]
fn test_forecast_rain_inside_lookahead_reschedules() {
    let mut snapshot = weather("Clouds", 25);
    snapshot.forecast = vec![entry(3, "Clouds"), entry(12, "Rain")];

    let derivation = derive_tasks(&[crop("Mint", 2, Some(1), None)], Some(&snapshot), today(), &options());
    assert!(derivation.rain_expected);
    assert_eq!(derivation.rescheduled_count, 1);
}

#[test]
fn test_forecast_rain_beyond_lookahead_is_ignored() {
    let mut snapshot = weather("Clouds", 25);
    snapshot.forecast = vec![entry(30, "Rain")];

    let derivation = derive_tasks(&[crop("Mint", 2, Some(1), None)], Some(&snapshot), today(), &options());
    assert!(!derivation.rain_expected);
    assert_eq!(derivation.tasks[0].due_date, today());

    let wide = options().rain_lookahead_hours(48);
    let derivation = derive_tasks(&[crop("Mint", 2, Some(1), None)], Some(&snapshot), today(), &wide);
    assert!(derivation.rain_expected);
}

#[test]
fn test_missing_weather_never_reschedules() {
    let derivation = derive_tasks(&[crop("Tomatoes", 4, Some(2), Some(2))], None, today(), &options());
    assert!(!derivation.rain_expected);
    assert_eq!(derivation.rescheduled_count, 0);
    assert!(derivation.tasks.iter().all(|t| !t.rescheduled && t.due_date == today()));
}

// ============================================================================
// Weather-aware watering
// ============================================================================

#[test]
fn test_dry_air_waters_off_schedule_when_enabled() {
    let mut snapshot = weather("Clear", 26);
    snapshot.humidity_percent = 45;
    // Day 5 of a 3-day schedule is not due
    let crops = [crop("Tomatoes", 5, Some(3), None)];

    let plain = derive_tasks(&crops, Some(&snapshot), today(), &options());
    assert!(plain.tasks.is_empty());

    let aware = derive_tasks(&crops, Some(&snapshot), today(), &options().weather_aware(true));
    assert_eq!(aware.tasks.len(), 1);
    assert!(aware.tasks[0].message.contains("low humidity"));
}

// ============================================================================
// Property tests
// ============================================================================

fn condition_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Clear".to_string()),
        Just("Clouds".to_string()),
        Just("Rain".to_string()),
        Just("Drizzle".to_string()),
        Just("Thunderstorm".to_string()),
        Just("light rain".to_string()),
    ]
}

fn frequency_strategy() -> impl Strategy<Value = Option<i32>> {
    prop_oneof![Just(None), (1i32..=30).prop_map(Some)]
}

proptest! {
    #[test]
    fn prop_watering_due_iff_days_divisible(days in 0i64..400, freq in 1i32..=60) {
        let derivation = derive_tasks(&[crop("Okra", days, Some(freq), None)], None, today(), &options());
        prop_assert_eq!(!derivation.tasks.is_empty(), days % i64::from(freq) == 0);
    }

    #[test]
    fn prop_derivation_is_deterministic(
        days in 0i64..120,
        watering in frequency_strategy(),
        fertilizing in frequency_strategy(),
        condition in condition_strategy(),
        temperature in -5i64..45,
    ) {
        let crops = vec![crop("Peas", days, watering, fertilizing)];
        let snapshot = weather(&condition, temperature);
        let first = derive_tasks(&crops, Some(&snapshot), today(), &options());
        let second = derive_tasks(&crops, Some(&snapshot), today(), &options());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_rain_defers_every_task_by_one_day(
        days in 0i64..120,
        watering in frequency_strategy(),
        fertilizing in frequency_strategy(),
    ) {
        let crops = vec![crop("Lettuce", days, watering, fertilizing)];
        let dry = derive_tasks(&crops, Some(&weather("Clear", 25)), today(), &options());
        let wet = derive_tasks(&crops, Some(&weather("Rain", 25)), today(), &options());

        prop_assert_eq!(dry.tasks.len(), wet.tasks.len());
        prop_assert_eq!(wet.rescheduled_count, wet.tasks.len());
        for (d, w) in dry.tasks.iter().zip(&wet.tasks) {
            prop_assert_eq!(w.due_date, d.due_date + Duration::days(1));
            prop_assert!(w.rescheduled);
        }
    }

    #[test]
    fn prop_fertilizing_is_always_medium(days in 0i64..120, freq in 1i32..=14, temperature in -5i64..50) {
        let crops = vec![crop("Beans", days, None, Some(freq))];
        let derivation = derive_tasks(&crops, Some(&weather("Clear", temperature)), today(), &options());
        prop_assert!(derivation.fertilizing().all(|t| t.priority == Priority::Medium));
    }
}
