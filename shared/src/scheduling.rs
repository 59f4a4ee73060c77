//! Care task derivation
//!
//! Turns a crop list and a weather snapshot into today's watering and
//! fertilizing tasks. The pass is pure: it holds no state and callers
//! re-derive on every load.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::library::water_need;
use crate::models::{
    days_since_planted, is_rain_condition, Crop, DerivedTask, Priority, TaskDerivation, TaskKind,
    WeatherSnapshot,
};

/// Above this temperature watering becomes high priority
pub const HOT_DAY_CELSIUS: i64 = 30;

/// Default window of forecast entries checked for rain
pub const DEFAULT_RAIN_LOOKAHEAD_HOURS: i64 = 24;

/// Knobs for a derivation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    /// Also water crops early when humidity drops under their class threshold
    pub weather_aware: bool,
    /// Forecast entries later than `now` plus this many hours are ignored
    pub rain_lookahead_hours: i64,
    pub now: DateTime<Utc>,
}

impl DeriveOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            weather_aware: false,
            rain_lookahead_hours: DEFAULT_RAIN_LOOKAHEAD_HOURS,
            now,
        }
    }

    pub fn weather_aware(mut self, enabled: bool) -> Self {
        self.weather_aware = enabled;
        self
    }

    pub fn rain_lookahead_hours(mut self, hours: i64) -> Self {
        self.rain_lookahead_hours = hours;
        self
    }
}

/// Derive today's care tasks.
///
/// Missing weather is treated as dry. Crops without a frequency for a task
/// kind never get that kind of task, and crops planted after `today` get
/// none at all.
pub fn derive_tasks(
    crops: &[Crop],
    weather: Option<&WeatherSnapshot>,
    today: NaiveDate,
    options: &DeriveOptions,
) -> TaskDerivation {
    let rain_expected = weather
        .map(|w| rain_expected(w, options.now, options.rain_lookahead_hours))
        .unwrap_or(false);

    let watering_priority = match weather {
        Some(w) if w.temperature_celsius > Decimal::from(HOT_DAY_CELSIUS) => Priority::High,
        _ => Priority::Medium,
    };

    let mut tasks = Vec::new();

    for crop in crops {
        let days = days_since_planted(crop.date_planted, today);
        if days < 0 {
            continue;
        }

        let on_schedule = is_due(days, crop.watering_frequency);
        let dry_air = options.weather_aware
            && !rain_expected
            && weather
                .map(|w| w.humidity_percent < water_need(&crop.name).humidity_threshold())
                .unwrap_or(false);

        if on_schedule || dry_air {
            let message = match crop.watering_frequency {
                Some(freq) if on_schedule => format!(
                    "Water your {} today (every {} day(s))",
                    crop.name, freq
                ),
                _ => format!("Water your {} today (low humidity)", crop.name),
            };
            tasks.push(new_task(crop, TaskKind::Watering, today, watering_priority, message));
        }

        match crop.fertilizing_frequency {
            Some(freq) if is_due(days, Some(freq)) => {
                let message = format!("Fertilize your {} today (every {} day(s))", crop.name, freq);
                // Fertilizing ignores temperature
                tasks.push(new_task(crop, TaskKind::Fertilizing, today, Priority::Medium, message));
            }
            _ => {}
        }
    }

    let mut rescheduled_count = 0;
    if rain_expected {
        let tomorrow = today + Duration::days(1);
        for task in tasks.iter_mut().filter(|t| t.kind.is_care()) {
            task.due_date = tomorrow;
            task.rescheduled = true;
            task.message = rescheduled_message(task);
            rescheduled_count += 1;
        }
    }

    TaskDerivation {
        tasks,
        rescheduled_count,
        rain_expected,
    }
}

/// Rain in the current condition or in any forecast entry up to the horizon
pub fn rain_expected(weather: &WeatherSnapshot, now: DateTime<Utc>, lookahead_hours: i64) -> bool {
    if weather.is_raining() {
        return true;
    }
    let horizon = now + Duration::hours(lookahead_hours.max(0));
    weather
        .forecast
        .iter()
        .any(|entry| entry.timestamp <= horizon && is_rain_condition(&entry.condition))
}

/// Schedule check: due on every multiple of the frequency, including day 0
fn is_due(days_since_planted: i64, frequency: Option<i32>) -> bool {
    match frequency {
        Some(freq) if freq >= 1 => days_since_planted % i64::from(freq) == 0,
        _ => false,
    }
}

fn new_task(
    crop: &Crop,
    kind: TaskKind,
    today: NaiveDate,
    priority: Priority,
    message: String,
) -> DerivedTask {
    DerivedTask {
        id: format!("{}-{}-{}", kind.as_str(), crop.id, today),
        crop_id: crop.id,
        crop_name: crop.name.clone(),
        kind,
        due_date: today,
        priority,
        rescheduled: false,
        message,
    }
}

fn rescheduled_message(task: &DerivedTask) -> String {
    let verb = match task.kind {
        TaskKind::Watering => "Water",
        TaskKind::Fertilizing => "Fertilize",
        TaskKind::General => "Tend",
    };
    format!(
        "{} your {} tomorrow (moved for expected rain)",
        verb, task.crop_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropStatus, ForecastEntry};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn now() -> DateTime<Utc> {
        today().and_hms_opt(8, 0, 0).unwrap().and_utc()
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

    fn weather(condition: &str, temp: i64, humidity: i32) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_celsius: Decimal::from(temp),
            humidity_percent: humidity,
            wind_speed_mps: Decimal::from(2),
            condition: condition.to_string(),
            description: condition.to_lowercase(),
            forecast: Vec::new(),
        }
    }

    #[test]
    fn test_is_due_handles_missing_and_zero_frequency() {
        assert!(is_due(6, Some(3)));
        assert!(!is_due(7, Some(3)));
        assert!(is_due(0, Some(5)));
        assert!(!is_due(6, None));
        assert!(!is_due(6, Some(0)));
        assert!(!is_due(6, Some(-2)));
    }

    #[test]
    fn test_future_planting_yields_nothing() {
        let crops = vec![crop("Mint", -3, Some(3), Some(3))];
        let result = derive_tasks(&crops, None, today(), &DeriveOptions::at(now()));
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_task_ids_are_deterministic() {
        let crops = vec![crop("Mint", 4, Some(2), Some(4))];
        let options = DeriveOptions::at(now());
        let first = derive_tasks(&crops, None, today(), &options);
        let second = derive_tasks(&crops, None, today(), &options);
        assert_eq!(first, second);
        assert_eq!(first.tasks[0].id, format!("watering-{}-2024-05-20", crops[0].id));
    }

    #[test]
    fn test_watering_listed_before_fertilizing() {
        let crops = vec![crop("Spinach", 0, Some(1), Some(1))];
        let result = derive_tasks(&crops, None, today(), &DeriveOptions::at(now()));
        let kinds: Vec<_> = result.tasks.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TaskKind::Watering, TaskKind::Fertilizing]);
    }

    #[test]
    fn test_forecast_rain_outside_lookahead_is_ignored() {
        let mut snapshot = weather("Clear", 25, 60);
        snapshot.forecast.push(ForecastEntry {
            timestamp: now() + Duration::hours(30),
            condition: "Rain".to_string(),
            temperature_celsius: Decimal::from(22),
            humidity_percent: 90,
            wind_speed_mps: Decimal::from(3),
        });
        assert!(!rain_expected(&snapshot, now(), 24));
        assert!(rain_expected(&snapshot, now(), 36));
    }

    #[test]
    fn test_weather_aware_waters_dry_crops_off_schedule() {
        // 7 days with a 3 day frequency is off schedule
        let crops = vec![crop("Cherry Tomatoes", 7, Some(3), None)];
        let snapshot = weather("Clear", 25, 55);

        let plain = derive_tasks(&crops, Some(&snapshot), today(), &DeriveOptions::at(now()));
        assert!(plain.tasks.is_empty());

        let aware = derive_tasks(
            &crops,
            Some(&snapshot),
            today(),
            &DeriveOptions::at(now()).weather_aware(true),
        );
        assert_eq!(aware.tasks.len(), 1);
        assert!(aware.tasks[0].message.contains("low humidity"));
    }

    #[test]
    fn test_weather_aware_respects_crop_class_threshold() {
        // Basil is a low water crop, 45% is above its 40% threshold
        let crops = vec![crop("Basil", 7, Some(3), None)];
        let snapshot = weather("Clear", 25, 45);
        let result = derive_tasks(
            &crops,
            Some(&snapshot),
            today(),
            &DeriveOptions::at(now()).weather_aware(true),
        );
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_rescheduled_message_mentions_tomorrow() {
        let crops = vec![crop("Parsley", 2, Some(2), None)];
        let snapshot = weather("Rain", 20, 90);
        let result = derive_tasks(&crops, Some(&snapshot), today(), &DeriveOptions::at(now()));
        assert_eq!(result.rescheduled_count, 1);
        assert!(result.tasks[0].message.contains("tomorrow"));
    }
}
