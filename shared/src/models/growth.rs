//! Growth timeline models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CropStatus;

/// Event types offered when logging a growth milestone
pub const GROWTH_EVENT_TYPES: [&str; 4] = ["Germination", "Flowering", "Fruit Set", "Harvest"];

/// A logged milestone in a crop's growth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthEvent {
    pub event_type: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub photos: Vec<String>,
}

/// Status a crop moves to after a growth event.
///
/// Unrecognized event types leave `current` unchanged.
pub fn status_from_event(event_type: &str, current: CropStatus) -> CropStatus {
    match event_type {
        "Germination" => CropStatus::Germinating,
        "Flowering" => CropStatus::Flowering,
        "Fruit Set" => CropStatus::Fruiting,
        "Harvest" => CropStatus::Ready,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_events_map_to_status() {
        let current = CropStatus::Growing;
        assert_eq!(status_from_event("Germination", current), CropStatus::Germinating);
        assert_eq!(status_from_event("Flowering", current), CropStatus::Flowering);
        assert_eq!(status_from_event("Fruit Set", current), CropStatus::Fruiting);
        assert_eq!(status_from_event("Harvest", current), CropStatus::Ready);
    }

    #[test]
    fn test_unknown_events_keep_status() {
        for current in CropStatus::ALL {
            assert_eq!(status_from_event("Pruning", current), current);
            assert_eq!(status_from_event("", current), current);
            // Matching is exact
            assert_eq!(status_from_event("harvest", current), current);
        }
    }

    #[test]
    fn test_offered_event_types_all_change_status() {
        for event_type in GROWTH_EVENT_TYPES {
            assert_ne!(
                status_from_event(event_type, CropStatus::Growing),
                CropStatus::Growing
            );
        }
    }
}
