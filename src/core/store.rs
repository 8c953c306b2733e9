//! Row rules shared by every gateway backend: owner scoping, the pin
//! capacity and uniqueness constraints, and delete cascades.
//!
//! Each mutating method validates everything before touching a row, so a
//! returned error always leaves the tables unchanged.

use crate::core::model::{
    Collection, CollectionId, Membership, PIN_LIMIT, Pin, PinId, PinnedCollection, PositionUpdate,
    RECENT_LIMIT, UserId,
};
use crate::core::policy::{validate_position, validate_positions};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub pins: Vec<Pin>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Collection name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

impl Tables {
    fn owned_collection(&self, owner: &UserId, id: &CollectionId) -> Result<&Collection> {
        self.collections
            .iter()
            .find(|c| &c.owner == owner && &c.id == id)
            .ok_or_else(|| Error::not_found("Collection", id))
    }

    fn owned_collection_mut(
        &mut self,
        owner: &UserId,
        id: &CollectionId,
    ) -> Result<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| &c.owner == owner && &c.id == id)
            .ok_or_else(|| Error::not_found("Collection", id))
    }

    fn pin_count(&self, owner: &UserId) -> usize {
        self.pins.iter().filter(|p| &p.owner == owner).count()
    }

    pub fn list_pinned(&self, owner: &UserId) -> Vec<PinnedCollection> {
        let mut pinned: Vec<PinnedCollection> = self
            .pins
            .iter()
            .filter(|p| &p.owner == owner)
            .map(|pin| PinnedCollection {
                pin: pin.clone(),
                collection: self.owned_collection(owner, &pin.collection_id).ok().cloned(),
            })
            .collect();
        pinned.sort_by_key(|p| p.pin.position);
        pinned
    }

    pub fn list_recent(&self, owner: &UserId, exclude: &[CollectionId]) -> Vec<Collection> {
        let mut recent: Vec<Collection> = self
            .collections
            .iter()
            .filter(|c| &c.owner == owner && c.last_accessed_at.is_some())
            .filter(|c| !exclude.contains(&c.id))
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
        recent.truncate(RECENT_LIMIT);
        recent
    }

    pub fn is_pinned(&self, owner: &UserId, collection: &CollectionId) -> bool {
        self.pins
            .iter()
            .any(|p| &p.owner == owner && &p.collection_id == collection)
    }

    pub fn insert_pin(
        &mut self,
        owner: &UserId,
        collection: &CollectionId,
        position: u32,
        now: DateTime<Utc>,
    ) -> Result<PinId> {
        validate_position(position)?;
        self.owned_collection(owner, collection)?;

        if self.is_pinned(owner, collection) {
            return Err(Error::AlreadyPinned {
                collection: collection.clone(),
            });
        }
        if self.pin_count(owner) >= PIN_LIMIT {
            return Err(Error::PinLimitReached { limit: PIN_LIMIT });
        }

        let id = PinId::generate();
        self.pins.push(Pin {
            id: id.clone(),
            owner: owner.clone(),
            collection_id: collection.clone(),
            position,
            created_at: now,
        });
        Ok(id)
    }

    /// Returns whether a pin was removed.
    pub fn delete_pin(&mut self, owner: &UserId, collection: &CollectionId) -> bool {
        let before = self.pins.len();
        self.pins
            .retain(|p| !(&p.owner == owner && &p.collection_id == collection));
        self.pins.len() != before
    }

    pub fn replace_pin(
        &mut self,
        owner: &UserId,
        old: &CollectionId,
        new: &CollectionId,
        position: u32,
        now: DateTime<Utc>,
    ) -> Result<PinId> {
        validate_position(position)?;
        self.owned_collection(owner, new)?;

        if old != new && self.is_pinned(owner, new) {
            return Err(Error::AlreadyPinned {
                collection: new.clone(),
            });
        }
        let remaining = self.pin_count(owner) - usize::from(self.is_pinned(owner, old));
        if remaining >= PIN_LIMIT {
            return Err(Error::PinLimitReached { limit: PIN_LIMIT });
        }

        self.delete_pin(owner, old);
        self.insert_pin(owner, new, position, now)
    }

    pub fn update_position(&mut self, owner: &UserId, pin: &PinId, position: u32) -> Result<()> {
        validate_position(position)?;
        let row = self
            .pins
            .iter_mut()
            .find(|p| &p.owner == owner && &p.id == pin)
            .ok_or_else(|| Error::not_found("Pin", pin))?;
        row.position = position;
        Ok(())
    }

    /// All-or-nothing variant of repeated [`Tables::update_position`]. The
    /// resulting positions must be unique across the owner's pins.
    pub fn apply_positions(&mut self, owner: &UserId, updates: &[PositionUpdate]) -> Result<()> {
        for update in updates {
            if !self
                .pins
                .iter()
                .any(|p| &p.owner == owner && p.id == update.id)
            {
                return Err(Error::not_found("Pin", &update.id));
            }
        }
        validate_positions(
            self.pins
                .iter()
                .filter(|p| &p.owner == owner)
                .map(|p| (&p.id, p.position)),
            updates,
        )?;
        for update in updates {
            self.update_position(owner, &update.id, update.position)?;
        }
        Ok(())
    }

    pub fn touch(&mut self, owner: &UserId, collection: &CollectionId, now: DateTime<Utc>) -> Result<()> {
        self.owned_collection_mut(owner, collection)?.last_accessed_at = Some(now);
        Ok(())
    }

    pub fn create_collection(
        &mut self,
        owner: &UserId,
        name: &str,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Collection> {
        let collection = Collection {
            id: CollectionId::generate(),
            name: normalize_name(name)?,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            owner: owner.clone(),
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        };
        self.collections.push(collection.clone());
        Ok(collection)
    }

    pub fn rename_collection(
        &mut self,
        owner: &UserId,
        id: &CollectionId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Collection> {
        let name = normalize_name(name)?;
        let collection = self.owned_collection_mut(owner, id)?;
        collection.name = name;
        collection.updated_at = now;
        Ok(collection.clone())
    }

    /// Deletes the collection together with its pin and video memberships.
    pub fn delete_collection(&mut self, owner: &UserId, id: &CollectionId) -> Result<()> {
        self.owned_collection(owner, id)?;
        self.collections
            .retain(|c| !(&c.owner == owner && &c.id == id));
        self.pins
            .retain(|p| !(&p.owner == owner && &p.collection_id == id));
        self.memberships.retain(|m| &m.collection_id != id);
        Ok(())
    }

    pub fn list_collections(&self, owner: &UserId) -> Vec<Collection> {
        let mut collections: Vec<Collection> = self
            .collections
            .iter()
            .filter(|c| &c.owner == owner)
            .cloned()
            .collect();
        collections.sort_by_key(|c| c.name.to_lowercase());
        collections
    }

    /// Returns `false` when the video was already in the collection.
    pub fn add_video(
        &mut self,
        owner: &UserId,
        collection: &CollectionId,
        video_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.owned_collection(owner, collection)?;
        if self
            .memberships
            .iter()
            .any(|m| &m.collection_id == collection && m.video_id == video_id)
        {
            return Ok(false);
        }
        self.memberships.push(Membership {
            collection_id: collection.clone(),
            video_id: video_id.to_string(),
            added_at: now,
        });
        self.owned_collection_mut(owner, collection)?.updated_at = now;
        Ok(true)
    }

    pub fn remove_video(
        &mut self,
        owner: &UserId,
        collection: &CollectionId,
        video_id: &str,
    ) -> Result<bool> {
        self.owned_collection(owner, collection)?;
        let before = self.memberships.len();
        self.memberships
            .retain(|m| !(&m.collection_id == collection && m.video_id == video_id));
        Ok(self.memberships.len() != before)
    }

    pub fn list_videos(&self, owner: &UserId, collection: &CollectionId) -> Result<Vec<Membership>> {
        self.owned_collection(owner, collection)?;
        let mut videos: Vec<Membership> = self
            .memberships
            .iter()
            .filter(|m| &m.collection_id == collection)
            .cloned()
            .collect();
        videos.sort_by_key(|m| m.added_at);
        Ok(videos)
    }
}
