//! Crop change feed
//!
//! A process-wide broadcast hub. Services publish after a write commits;
//! SSE subscribers receive every change they are allowed to see. Slow
//! subscribers skip what they missed and refetch.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered changes per subscriber before it starts lagging
pub const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    GrowthEvent,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
            ChangeKind::GrowthEvent => "growth_event",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CropChange {
    pub crop_id: Uuid,
    pub owner_id: Uuid,
    pub kind: ChangeKind,
}

impl CropChange {
    /// Owners see their own crops, admins see everything
    pub fn visible_to(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.owner_id == user_id
    }
}

#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<CropChange>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, change: CropChange) {
        tracing::debug!(
            crop_id = %change.crop_id,
            kind = change.kind.as_str(),
            "publishing crop change"
        );
        // No subscribers is not an error
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CropChange> {
        self.tx.subscribe()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}
