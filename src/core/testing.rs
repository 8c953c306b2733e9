//! In-memory gateway with fault injection, plus fixtures for unit tests.

use crate::core::gateway::Gateway;
use crate::core::model::{Collection, CollectionId, Pin, PinId, PinnedCollection, UserId};
use crate::core::store::Tables;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub fn collection(id: &str) -> Collection {
    Collection {
        id: CollectionId::from(id),
        name: format!("Collection {id}"),
        description: None,
        owner: UserId::from("alice"),
        created_at: epoch(),
        updated_at: epoch(),
        last_accessed_at: None,
    }
}

pub fn pinned(id: &str, position: u32) -> PinnedCollection {
    PinnedCollection {
        pin: Pin {
            id: PinId::from(format!("pin-{id}")),
            owner: UserId::from("alice"),
            collection_id: CollectionId::from(id),
            position,
            created_at: epoch(),
        },
        collection: Some(collection(id)),
    }
}

fn simulated() -> Error {
    Error::Io(std::io::Error::other("simulated gateway outage"))
}

#[derive(Debug, Default)]
pub struct Faults {
    pub insert: bool,
    pub delete: bool,
    pub replace: bool,
    pub touch: bool,
    pub list: bool,
    pub update_ids: HashSet<PinId>,
}

#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    clock: Mutex<i64>,
    pub faults: Mutex<Faults>,
    pub calls: Mutex<Vec<&'static str>>,
    /// Held by a test to keep gateway calls in flight.
    pub gate: tokio::sync::Mutex<()>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collection(&self, owner: &UserId, id: &str) {
        let mut c = collection(id);
        c.owner = owner.clone();
        self.tables.lock().unwrap().collections.push(c);
    }

    /// Seed a pin row directly, bypassing the capacity rule.
    pub fn add_pin(&self, owner: &UserId, id: &str, position: u32) {
        self.tables.lock().unwrap().pins.push(Pin {
            id: PinId::from(format!("pin-{id}")),
            owner: owner.clone(),
            collection_id: CollectionId::from(id),
            position,
            created_at: epoch(),
        });
    }

    pub fn tables(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn now(&self) -> DateTime<Utc> {
        let mut tick = self.clock.lock().unwrap();
        *tick += 1;
        epoch() + Duration::seconds(*tick)
    }

    async fn enter(&self, call: &'static str, failing: impl FnOnce(&Faults) -> bool) -> Result<()> {
        drop(self.gate.lock().await);
        self.calls.lock().unwrap().push(call);
        if failing(&self.faults.lock().unwrap()) {
            return Err(simulated());
        }
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    async fn list_pinned(&self, owner: &UserId) -> Result<Vec<PinnedCollection>> {
        self.enter("list_pinned", |f| f.list).await?;
        Ok(self.tables.lock().unwrap().list_pinned(owner))
    }

    async fn list_recent(&self, owner: &UserId, exclude: &[CollectionId]) -> Result<Vec<Collection>> {
        self.enter("list_recent", |f| f.list).await?;
        Ok(self.tables.lock().unwrap().list_recent(owner, exclude))
    }

    async fn is_pinned(&self, owner: &UserId, collection: &CollectionId) -> Result<bool> {
        self.enter("is_pinned", |_| false).await?;
        Ok(self.tables.lock().unwrap().is_pinned(owner, collection))
    }

    async fn insert_pin(&self, owner: &UserId, collection: &CollectionId, position: u32) -> Result<PinId> {
        self.enter("insert_pin", |f| f.insert).await?;
        let now = self.now();
        self.tables
            .lock()
            .unwrap()
            .insert_pin(owner, collection, position, now)
    }

    async fn delete_pin(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.enter("delete_pin", |f| f.delete).await?;
        self.tables.lock().unwrap().delete_pin(owner, collection);
        Ok(())
    }

    async fn replace_pin(
        &self,
        owner: &UserId,
        old: &CollectionId,
        new: &CollectionId,
        position: u32,
    ) -> Result<PinId> {
        self.enter("replace_pin", |f| f.replace).await?;
        let now = self.now();
        self.tables
            .lock()
            .unwrap()
            .replace_pin(owner, old, new, position, now)
    }

    async fn update_position(&self, owner: &UserId, pin: &PinId, position: u32) -> Result<()> {
        self.enter("update_position", |f| f.update_ids.contains(pin)).await?;
        self.tables
            .lock()
            .unwrap()
            .update_position(owner, pin, position)
    }

    async fn touch_last_accessed(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.enter("touch_last_accessed", |f| f.touch).await?;
        let now = self.now();
        self.tables.lock().unwrap().touch(owner, collection, now)
    }
}
