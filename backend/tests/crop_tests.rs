//! Crop library tests
//!
//! Growth event status mapping, library filtering and sorting, seasons and
//! the static care library.

use chrono::NaiveDate;
use proptest::prelude::*;
use shared::{
    care_calendar, care_guide, crop_suggestions, days_planted_display, library_view, status_from_event, Crop,
    CropFilter, CropSort, CropStatus, Season, TaskKind, GROWTH_EVENT_TYPES,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn crop(name: &str, variety: Option<&str>, planted: NaiveDate, status: CropStatus) -> Crop {
    Crop {
        id: Uuid::new_v4(),
        owner_id: Uuid::nil(),
        name: name.to_string(),
        variety: variety.map(str::to_string),
        date_planted: planted,
        watering_frequency: Some(2),
        fertilizing_frequency: None,
        status,
    }
}

fn garden() -> Vec<Crop> {
    vec![
        crop("tomatoes", Some("Cherry"), date(2024, 3, 1), CropStatus::Fruiting),
        crop("Basil", Some("Genovese"), date(2024, 4, 10), CropStatus::Growing),
        crop("Carrots", None, date(2024, 2, 20), CropStatus::Ready),
        crop("Mint", Some("Spearmint"), date(2024, 5, 2), CropStatus::Germinating),
    ]
}

fn names(crops: &[Crop]) -> Vec<&str> {
    crops.iter().map(|c| c.name.as_str()).collect()
}

// ============================================================================
// Status from growth events
// ============================================================================

#[test]
fn test_offered_events_each_set_a_status() {
    let expected = [
        CropStatus::Germinating,
        CropStatus::Flowering,
        CropStatus::Fruiting,
        CropStatus::Ready,
    ];
    for (event, status) in GROWTH_EVENT_TYPES.iter().zip(expected) {
        assert_eq!(status_from_event(event, CropStatus::Growing), status);
    }
}

#[test]
fn test_event_matching_is_exact() {
    assert_eq!(status_from_event("harvest", CropStatus::Flowering), CropStatus::Flowering);
    assert_eq!(status_from_event("Pruned", CropStatus::Fruiting), CropStatus::Fruiting);
    assert_eq!(status_from_event("", CropStatus::Ready), CropStatus::Ready);
}

proptest! {
    #[test]
    fn prop_unknown_events_keep_status(event in "[a-z ]{0,20}", index in 0usize..5) {
        let current = CropStatus::ALL[index];
        prop_assume!(!GROWTH_EVENT_TYPES.contains(&event.as_str()));
        prop_assert_eq!(status_from_event(&event, current), current);
    }
}

// ============================================================================
// Library view
// ============================================================================

#[test]
fn test_name_sort_ignores_case() {
    let view = library_view(&garden(), &CropFilter::default(), CropSort::Name);
    assert_eq!(names(&view), vec!["Basil", "Carrots", "Mint", "tomatoes"]);
}

#[test]
fn test_date_sort_is_newest_first() {
    let view = library_view(&garden(), &CropFilter::default(), CropSort::Date);
    assert_eq!(names(&view), vec!["Mint", "Basil", "tomatoes", "Carrots"]);
}

#[test]
fn test_status_sort_is_alphabetical() {
    let view = library_view(&garden(), &CropFilter::default(), CropSort::Status);
    let statuses: Vec<_> = view.iter().map(|c| c.status.as_str()).collect();
    assert_eq!(statuses, vec!["fruiting", "germinating", "growing", "ready"]);
}

#[test]
fn test_search_matches_name_or_variety() {
    let filter = CropFilter {
        search: Some("MINT".to_string()),
        status: None,
    };
    assert_eq!(names(&library_view(&garden(), &filter, CropSort::Name)), vec!["Mint"]);

    let filter = CropFilter {
        search: Some("cherry".to_string()),
        status: None,
    };
    assert_eq!(names(&library_view(&garden(), &filter, CropSort::Name)), vec!["tomatoes"]);
}

#[test]
fn test_status_filter_and_all() {
    let filter = CropFilter {
        search: None,
        status: CropFilter::status_param(Some("ready")),
    };
    assert_eq!(names(&library_view(&garden(), &filter, CropSort::Name)), vec!["Carrots"]);

    assert_eq!(CropFilter::status_param(Some("all")), None);
    assert_eq!(CropFilter::status_param(None), None);
}

#[test]
fn test_blank_search_matches_everything() {
    let filter = CropFilter {
        search: Some("   ".to_string()),
        status: None,
    };
    assert_eq!(library_view(&garden(), &filter, CropSort::Name).len(), 4);
    assert_eq!(filter.search_pattern(), None);
}

#[test]
fn test_search_pattern_escapes_wildcards() {
    let filter = CropFilter {
        search: Some("50%_off".to_string()),
        status: None,
    };
    assert_eq!(filter.search_pattern().as_deref(), Some("%50\\%\\_off%"));
}

// ============================================================================
// Seasons and day counts
// ============================================================================

#[test]
fn test_season_boundaries() {
    assert_eq!(Season::for_date(date(2024, 1, 1)), Season::SpringSummer);
    assert_eq!(Season::for_date(date(2024, 6, 30)), Season::SpringSummer);
    assert_eq!(Season::for_date(date(2024, 7, 1)), Season::FallWinter);
    assert_eq!(Season::for_date(date(2024, 12, 31)), Season::FallWinter);
}

#[test]
fn test_days_planted_display_is_never_negative() {
    assert_eq!(days_planted_display(date(2024, 5, 1), date(2024, 5, 11)), 10);
    assert_eq!(days_planted_display(date(2024, 5, 11), date(2024, 5, 1)), 10);
}

// ============================================================================
// Care library
// ============================================================================

#[test]
fn test_care_guide_fallback() {
    assert_eq!(care_guide("Tomatoes").sunlight, "6-8h/day");
    assert_eq!(care_guide("Dragon Fruit").water, "Custom");
}

#[test]
fn test_care_calendar_offsets() {
    let entries = care_calendar("Spinach", date(2024, 3, 1));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, TaskKind::Watering);
    assert_eq!(entries[0].date, date(2024, 3, 4));
    assert_eq!(entries[1].kind, TaskKind::Fertilizing);
    assert_eq!(entries[1].date, date(2024, 3, 15));
}

#[test]
fn test_suggestions_by_location_substring() {
    assert!(crop_suggestions("Chennai, Tamil Nadu").contains(&"Okra"));
    assert!(crop_suggestions("new delhi").contains(&"Radish"));
    assert!(crop_suggestions("Reykjavik").is_empty());
}
