//! Crop models

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked plant instance owned by a user
///
/// Only the fields the care logic reads are carried here; the backend keeps
/// the full record and converts into this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Crop {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub variety: Option<String>,
    pub date_planted: NaiveDate,
    /// Days between waterings
    pub watering_frequency: Option<i32>,
    /// Days between fertilizer applications
    pub fertilizing_frequency: Option<i32>,
    pub status: CropStatus,
}

/// Growth status of a crop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    Germinating,
    #[default]
    Growing,
    Flowering,
    Fruiting,
    Ready,
}

impl CropStatus {
    pub const ALL: [CropStatus; 5] = [
        CropStatus::Germinating,
        CropStatus::Growing,
        CropStatus::Flowering,
        CropStatus::Fruiting,
        CropStatus::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropStatus::Germinating => "germinating",
            CropStatus::Growing => "growing",
            CropStatus::Flowering => "flowering",
            CropStatus::Fruiting => "fruiting",
            CropStatus::Ready => "ready",
        }
    }

    /// Parse a stored status, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Statuses counted as a successful harvest on the dashboard
    pub fn is_successful(&self) -> bool {
        matches!(self, CropStatus::Ready | CropStatus::Fruiting)
    }
}

impl std::fmt::Display for CropStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Growing season a crop was started in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Season {
    #[serde(rename = "Spring/Summer")]
    SpringSummer,
    #[serde(rename = "Fall/Winter")]
    FallWinter,
}

impl Season {
    /// January through June is Spring/Summer, the rest of the year Fall/Winter
    pub fn for_date(date: NaiveDate) -> Self {
        if date.month() <= 6 {
            Season::SpringSummer
        } else {
            Season::FallWinter
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::SpringSummer => "Spring/Summer",
            Season::FallWinter => "Fall/Winter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Spring/Summer" => Some(Season::SpringSummer),
            "Fall/Winter" => Some(Season::FallWinter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort order of the crop library
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CropSort {
    /// Name ascending
    #[default]
    Name,
    /// Newest planting first
    Date,
    /// Status ascending
    Status,
}

/// Library search and status filter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CropFilter {
    pub search: Option<String>,
    /// `None` means all statuses
    pub status: Option<CropStatus>,
}

impl CropFilter {
    /// Parse the `status` query value; "all" and unknown values disable the filter
    pub fn status_param(value: Option<&str>) -> Option<CropStatus> {
        value.and_then(CropStatus::parse)
    }

    /// The search term as a SQL ILIKE pattern
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
    }

    pub fn matches(&self, crop: &Crop) -> bool {
        if let Some(status) = self.status {
            if crop.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                crop.name.to_lowercase().contains(&term)
                    || crop
                        .variety
                        .as_deref()
                        .map(|v| v.to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
            None => true,
        }
    }
}

/// Filter then sort a crop list the way the library view shows it
pub fn library_view(crops: &[Crop], filter: &CropFilter, sort: CropSort) -> Vec<Crop> {
    let mut view: Vec<Crop> = crops.iter().filter(|c| filter.matches(c)).cloned().collect();
    match sort {
        CropSort::Name => view.sort_by_key(|c| c.name.to_lowercase()),
        CropSort::Date => view.sort_by(|a, b| b.date_planted.cmp(&a.date_planted)),
        CropSort::Status => view.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
    }
    view
}

/// Whole days elapsed between planting and `today`.
///
/// Negative when the planting date lies in the future.
pub fn days_since_planted(date_planted: NaiveDate, today: NaiveDate) -> i64 {
    (today - date_planted).num_days()
}

/// Day count shown on crop cards, never negative
pub fn days_planted_display(date_planted: NaiveDate, today: NaiveDate) -> i64 {
    days_since_planted(date_planted, today).abs()
}
