//! Task service for derived care tasks and stored reminders

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    derive_tasks, rain_expected, Crop, DeriveOptions, Priority, TaskDerivation, TaskKind, TaskStatus,
    WeatherSnapshot,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::services::crop::ensure_crop_owned;
use crate::services::weather::{LocationQuery, WeatherService};

const TASK_COLUMNS: &str =
    "id, user_id, crop_id, title, kind, status, priority, due_date, completed, rescheduled, created_at";

/// Task service
#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
}

/// Stored task record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub crop_id: Option<Uuid>,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub rescheduled: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredTask {
    pub fn kind(&self) -> TaskKind {
        TaskKind::parse(&self.kind).unwrap_or(TaskKind::General)
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::parse(&self.status).unwrap_or_default()
    }

    /// Reminders are care tasks or anything explicitly filed as one
    pub fn is_reminder(&self) -> bool {
        self.status() == TaskStatus::Reminder || self.kind().is_care()
    }
}

/// Stored tasks split the way the task page shows them
#[derive(Debug, Default, Serialize)]
pub struct TaskBuckets {
    pub upcoming: Vec<StoredTask>,
    pub reminders: Vec<StoredTask>,
}

/// Input for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub kind: Option<TaskKind>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub crop_id: Option<Uuid>,
}

/// Result of deferring stored care tasks
#[derive(Debug, Serialize)]
pub struct RescheduleResult {
    pub rain_expected: bool,
    pub rescheduled_count: u64,
    pub due_date: NaiveDate,
}

/// Whether stored care tasks should move for rain. Unknown weather counts as dry.
pub fn should_defer_for_rain(
    weather: Option<&WeatherSnapshot>,
    now: DateTime<Utc>,
    lookahead_hours: i64,
) -> bool {
    weather.is_some_and(|w| rain_expected(w, now, lookahead_hours))
}

async fn weather_for(
    weather_service: &WeatherService,
    location: &LocationQuery,
) -> Option<WeatherSnapshot> {
    let snapshot = match weather_service.resolve_location(location).await {
        Ok(coords) => weather_service.snapshot(&coords).await,
        Err(e) => Err(e),
    };

    match snapshot {
        Ok(weather) => Some(weather),
        Err(e) => {
            tracing::warn!("Weather unavailable, treating it as dry: {}", e);
            None
        }
    }
}

/// Sort by due date, undated tasks last, then split into buckets
pub fn bucket_tasks(mut tasks: Vec<StoredTask>) -> TaskBuckets {
    tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.created_at.cmp(&b.created_at),
    });

    let mut buckets = TaskBuckets::default();
    for task in tasks {
        if task.is_reminder() {
            buckets.reminders.push(task);
        } else if !task.completed {
            buckets.upcoming.push(task);
        }
    }
    buckets
}

impl TaskService {
    /// Create a new TaskService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Today's care tasks for a set of crops.
    ///
    /// A weather failure is logged and derivation continues as if dry.
    pub async fn derived_tasks(
        &self,
        crops: &[Crop],
        weather_service: &WeatherService,
        weather_config: &WeatherConfig,
        location: &LocationQuery,
    ) -> TaskDerivation {
        let weather = weather_for(weather_service, location).await;

        let now = Utc::now();
        let options = DeriveOptions::at(now)
            .weather_aware(weather_config.weather_aware_watering)
            .rain_lookahead_hours(weather_config.rain_lookahead_hours);

        let today = weather_config.local_today(now);
        let derivation = derive_tasks(crops, weather.as_ref(), today, &options);
        tracing::debug!(
            tasks = derivation.tasks.len(),
            rescheduled = derivation.rescheduled_count,
            "Derived care tasks"
        );
        derivation
    }

    /// Create a stored task
    pub async fn create_task(&self, user_id: Uuid, input: CreateTaskInput) -> AppResult<StoredTask> {
        shared::validate_required(&input.title).map_err(|m| AppError::validation("title", m))?;

        if let Some(crop_id) = input.crop_id {
            ensure_crop_owned(&self.db, user_id, crop_id).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO tasks (user_id, crop_id, title, kind, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, StoredTask>(&sql)
            .bind(user_id)
            .bind(input.crop_id)
            .bind(input.title.trim())
            .bind(input.kind.unwrap_or(TaskKind::General).as_str())
            .bind(input.status.unwrap_or_default().as_str())
            .bind(input.priority.unwrap_or_default().as_str())
            .bind(input.due_date)
            .fetch_one(&self.db)
            .await?;

        Ok(task)
    }

    /// Stored tasks split into upcoming and reminders
    pub async fn list_tasks(&self, user_id: Uuid) -> AppResult<TaskBuckets> {
        let sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
        let tasks = sqlx::query_as::<_, StoredTask>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(bucket_tasks(tasks))
    }

    /// Delete a stored task
    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task".to_string()));
        }
        Ok(())
    }

    /// Mark a stored task completed
    pub async fn complete_task(&self, user_id: Uuid, task_id: Uuid) -> AppResult<StoredTask> {
        let sql = format!(
            "UPDATE tasks SET completed = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, StoredTask>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Task".to_string()))
    }

    /// Move today's open care tasks to tomorrow when rain is expected
    pub async fn reschedule_for_rain(
        &self,
        user_id: Uuid,
        weather_service: &WeatherService,
        weather_config: &WeatherConfig,
        location: &LocationQuery,
    ) -> AppResult<RescheduleResult> {
        let now = Utc::now();
        let today = weather_config.local_today(now);
        let weather = weather_for(weather_service, location).await;

        if !should_defer_for_rain(weather.as_ref(), now, weather_config.rain_lookahead_hours) {
            tracing::debug!(%user_id, "No rain expected, care tasks left in place");
            return Ok(RescheduleResult {
                rain_expected: false,
                rescheduled_count: 0,
                due_date: today,
            });
        }

        self.defer_care_tasks(user_id, today).await
    }

    /// Move today's open care tasks to tomorrow and flag them
    async fn defer_care_tasks(&self, user_id: Uuid, today: NaiveDate) -> AppResult<RescheduleResult> {
        let tomorrow = today + Duration::days(1);

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET due_date = $3, rescheduled = TRUE
            WHERE user_id = $1
              AND due_date = $2
              AND kind IN ('watering', 'fertilizing')
              AND completed = FALSE
              AND rescheduled = FALSE
            "#,
        )
        .bind(user_id)
        .bind(today)
        .bind(tomorrow)
        .execute(&self.db)
        .await?;

        tracing::info!(%user_id, count = result.rows_affected(), "Rescheduled care tasks for rain");

        Ok(RescheduleResult {
            rain_expected: true,
            rescheduled_count: result.rows_affected(),
            due_date: tomorrow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, kind: &str, status: &str, due: Option<(i32, u32, u32)>, completed: bool) -> StoredTask {
        StoredTask {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            crop_id: None,
            title: title.to_string(),
            kind: kind.to_string(),
            status: status.to_string(),
            priority: "medium".to_string(),
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            completed,
            rescheduled: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_bucket_tasks_sorts_undated_last() {
        let buckets = bucket_tasks(vec![
            task("Mulch beds", "general", "upcoming", None, false),
            task("Buy seeds", "general", "upcoming", Some((2024, 5, 3)), false),
            task("Repot mint", "general", "upcoming", Some((2024, 5, 1)), false),
        ]);
        let titles: Vec<_> = buckets.upcoming.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Repot mint", "Buy seeds", "Mulch beds"]);
        assert!(buckets.reminders.is_empty());
    }

    #[test]
    fn test_bucket_tasks_routes_reminders() {
        let buckets = bucket_tasks(vec![
            task("Water basil", "watering", "upcoming", Some((2024, 5, 1)), false),
            task("Check aphids", "general", "reminder", Some((2024, 5, 2)), false),
            task("Done already", "general", "upcoming", Some((2024, 5, 2)), true),
        ]);
        assert_eq!(buckets.reminders.len(), 2);
        assert!(buckets.upcoming.is_empty());
    }

    fn weather(condition: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_celsius: rust_decimal::Decimal::from(23),
            humidity_percent: 70,
            wind_speed_mps: rust_decimal::Decimal::from(2),
            condition: condition.to_string(),
            description: String::new(),
            forecast: Vec::new(),
        }
    }

    #[test]
    fn test_defer_only_when_rain_expected() {
        let now = Utc::now();
        assert!(should_defer_for_rain(Some(&weather("Rain")), now, 24));
        assert!(should_defer_for_rain(Some(&weather("Light Rain")), now, 0));
        assert!(!should_defer_for_rain(Some(&weather("Clear")), now, 24));
        assert!(!should_defer_for_rain(None, now, 24));
    }

    #[test]
    fn test_defer_sees_forecast_rain_inside_lookahead() {
        let now = Utc::now();
        let mut cloudy = weather("Clouds");
        cloudy.forecast = vec![shared::ForecastEntry {
            timestamp: now + Duration::hours(9),
            condition: "Rain".to_string(),
            temperature_celsius: rust_decimal::Decimal::from(20),
            humidity_percent: 92,
            wind_speed_mps: rust_decimal::Decimal::from(3),
        }];

        assert!(should_defer_for_rain(Some(&cloudy), now, 12));
        assert!(!should_defer_for_rain(Some(&cloudy), now, 6));
    }

    #[test]
    fn test_create_input_accepts_minimal_body() {
        let input: CreateTaskInput = serde_json::from_str(r#"{"title": "Prune tomatoes"}"#).unwrap();
        assert!(input.kind.is_none());
        assert_eq!(input.priority.unwrap_or_default(), Priority::Medium);
        assert_eq!(input.status.unwrap_or_default(), TaskStatus::Upcoming);
    }
}
