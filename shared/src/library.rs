//! Static crop care library
//!
//! Care guides, watering classes, a starter care calendar and crop
//! suggestions by city.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::TaskKind;

/// Care guide for a crop
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CareGuide {
    pub water: &'static str,
    pub sunlight: &'static str,
    pub care: &'static str,
}

const CARE_GUIDES: &[(&str, CareGuide)] = &[
    ("Carrots", CareGuide { water: "500ml every 3 days", sunlight: "6h/day", care: "Loosen soil, weed regularly" }),
    ("Radishes", CareGuide { water: "400ml every 2 days", sunlight: "5-6h/day", care: "Thin seedlings, avoid overwatering" }),
    ("Green Onions", CareGuide { water: "300ml daily", sunlight: "4-5h/day", care: "Fertilize every 2 weeks with NPK" }),
    ("Mint", CareGuide { water: "200ml daily", sunlight: "Partial shade (3-4h)", care: "Trim leaves, keep soil moist" }),
    ("Cilantro", CareGuide { water: "250ml daily", sunlight: "4-5h/day", care: "Harvest often, moist soil" }),
    ("Parsley", CareGuide { water: "300ml every 2 days", sunlight: "5-6h/day", care: "Fertilize monthly, avoid soggy soil" }),
    ("Tomatoes", CareGuide { water: "500ml every 2 days", sunlight: "6-8h/day", care: "Support with stakes, fertilize every 2 weeks" }),
    ("Spinach", CareGuide { water: "300ml every 2 days", sunlight: "4-5h/day", care: "Harvest outer leaves, avoid heat" }),
    ("Herbs", CareGuide { water: "200ml daily", sunlight: "Partial shade", care: "Trim often to promote growth" }),
];

const FALLBACK_GUIDE: CareGuide = CareGuide {
    water: "Custom",
    sunlight: "4-6h",
    care: "Monitor growth",
};

/// Look up the care guide for a crop name, falling back to a generic guide
pub fn care_guide(crop_name: &str) -> CareGuide {
    CARE_GUIDES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(crop_name.trim()))
        .map(|(_, guide)| *guide)
        .unwrap_or(FALLBACK_GUIDE)
}

/// Watering class of a crop
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaterNeed {
    High,
    Medium,
    Low,
}

impl WaterNeed {
    /// Humidity (percent) under which a weather-aware pass waters early
    pub fn humidity_threshold(&self) -> i32 {
        match self {
            WaterNeed::High => 60,
            WaterNeed::Medium => 50,
            WaterNeed::Low => 40,
        }
    }
}

/// Classify a crop by name; unknown crops are medium
pub fn water_need(crop_name: &str) -> WaterNeed {
    let name = crop_name.to_ascii_lowercase();
    if name.contains("tomato") {
        WaterNeed::High
    } else if name.contains("basil") || name.contains("herb") {
        WaterNeed::Low
    } else {
        WaterNeed::Medium
    }
}

/// A dated entry on the care calendar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub kind: TaskKind,
    pub title: String,
}

/// First watering three days after planting, first feed after two weeks
pub fn care_calendar(crop_name: &str, date_planted: NaiveDate) -> Vec<CalendarEntry> {
    let guide = care_guide(crop_name);
    vec![
        CalendarEntry {
            date: date_planted + Duration::days(3),
            kind: TaskKind::Watering,
            title: format!("Water {} ({})", crop_name, guide.water),
        },
        CalendarEntry {
            date: date_planted + Duration::days(14),
            kind: TaskKind::Fertilizing,
            title: format!("Fertilize {}", crop_name),
        },
    ]
}

const SUGGESTIONS_BY_CITY: &[(&str, &[&str])] = &[
    ("Chennai", &["Tomato", "Brinjal", "Okra", "Chilli", "Coriander", "Spinach"]),
    ("Delhi", &["Spinach", "Radish", "Carrot", "Peas", "Cauliflower"]),
    ("Mumbai", &["Coriander", "Mint", "Chilli", "Cucumber", "Beans"]),
    ("Bangalore", &["Beans", "Capsicum", "Cucumber", "Tomato", "Lettuce"]),
];

/// Crops that grow well around a location, matched by city name substring
pub fn crop_suggestions(location: &str) -> &'static [&'static str] {
    let location = location.to_ascii_lowercase();
    SUGGESTIONS_BY_CITY
        .iter()
        .find(|(city, _)| location.contains(&city.to_ascii_lowercase()))
        .map(|(_, crops)| *crops)
        .unwrap_or(&[])
}
