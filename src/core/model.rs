use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Maximum number of pins a single user may hold.
pub const PIN_LIMIT: usize = 6;

/// Number of entries in the derived recent-collections view.
pub const RECENT_LIMIT: usize = 5;

/// Largest position a pin may hold; fits a signed 32-bit column.
pub const MAX_POSITION: u32 = i32::MAX as u32;

const PROVISIONAL_PREFIX: &str = "provisional-";

/// Opaque user identifier handed out by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[derive(Serialize, Deserialize)]
#[from(forward)]
#[serde(transparent)]
pub struct UserId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[derive(Serialize, Deserialize)]
#[from(forward)]
#[serde(transparent)]
pub struct CollectionId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[derive(Serialize, Deserialize)]
#[from(forward)]
#[serde(transparent)]
pub struct PinId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CollectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PinId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Local placeholder used until the gateway assigns the real id.
    pub fn provisional() -> Self {
        Self(format!("{PROVISIONAL_PREFIX}{}", uuid::Uuid::now_v7()))
    }

    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub owner: UserId,
    pub collection_id: CollectionId,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

/// A pin joined with its collection row.
///
/// `collection` is `None` only for a provisional pin whose collection was not
/// already known locally; the next refresh fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedCollection {
    pub pin: Pin,
    pub collection: Option<Collection>,
}

impl PinnedCollection {
    pub fn collection_id(&self) -> &CollectionId {
        &self.pin.collection_id
    }

    pub fn position(&self) -> u32 {
        self.pin.position
    }

    pub fn is_provisional(&self) -> bool {
        self.pin.id.is_provisional()
    }

    /// Display name, falling back to the collection id while provisional.
    pub fn name(&self) -> &str {
        self.collection
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or_else(|| self.pin.collection_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: PinId,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub collection_id: CollectionId,
    pub video_id: String,
    pub added_at: DateTime<Utc>,
}
