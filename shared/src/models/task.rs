//! Care task models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of care action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Watering,
    Fertilizing,
    /// Free-form task entered by the user
    General,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Watering => "watering",
            TaskKind::Fertilizing => "fertilizing",
            TaskKind::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "watering" => Some(TaskKind::Watering),
            "fertilizing" => Some(TaskKind::Fertilizing),
            "general" => Some(TaskKind::General),
            _ => None,
        }
    }

    /// Watering and fertilizing are the kinds rain can defer
    pub fn is_care(&self) -> bool {
        matches!(self, TaskKind::Watering | TaskKind::Fertilizing)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle bucket of a stored task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Upcoming,
    Reminder,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Upcoming => "upcoming",
            TaskStatus::Reminder => "reminder",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Some(TaskStatus::Upcoming),
            "reminder" => Some(TaskStatus::Reminder),
            _ => None,
        }
    }
}

/// A care action derived from crop schedules and weather
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedTask {
    /// Stable across derivations for the same crop, kind and day
    pub id: String,
    pub crop_id: Uuid,
    pub crop_name: String,
    pub kind: TaskKind,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub rescheduled: bool,
    pub message: String,
}

/// Result of one derivation pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskDerivation {
    pub tasks: Vec<DerivedTask>,
    /// Number of tasks pushed to tomorrow, for the rain banner
    pub rescheduled_count: usize,
    pub rain_expected: bool,
}

impl TaskDerivation {
    pub fn watering(&self) -> impl Iterator<Item = &DerivedTask> {
        self.tasks.iter().filter(|t| t.kind == TaskKind::Watering)
    }

    pub fn fertilizing(&self) -> impl Iterator<Item = &DerivedTask> {
        self.tasks.iter().filter(|t| t.kind == TaskKind::Fertilizing)
    }
}
