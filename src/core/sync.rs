//! Optimistic pin mutations.
//!
//! Each mutation snapshots the owner's [`OwnerView`], applies its change to
//! the cache, then confirms through the [`Gateway`]. On success the view is
//! refetched; on failure the snapshot is restored and the error returned.
//!
//! Mutations for one owner run one at a time through a per-owner queue.
//! While a mutation is confirming, the collections it touches are marked
//! syncing and further mutations on them are rejected with
//! [`Error::SyncInProgress`].

use crate::core::cache::{OwnerView, ViewCache};
use crate::core::gateway::Gateway;
use crate::core::model::{CollectionId, Pin, PinId, PinnedCollection, PositionUpdate, UserId};
use crate::core::policy;
use crate::core::recency::RecencyTracker;
use crate::core::reorder;
use crate::error::{Error, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type SyncKey = (UserId, CollectionId);

pub struct PinSync<G> {
    gateway: Arc<G>,
    recency: RecencyTracker<G>,
    cache: ViewCache,
    syncing: Mutex<HashSet<SyncKey>>,
    queues: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

/// Releases syncing marks when the mutation ends, however it ends.
struct SyncingGuard<'a> {
    set: &'a Mutex<HashSet<SyncKey>>,
    keys: Vec<SyncKey>,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(PoisonError::into_inner);
        for key in &self.keys {
            set.remove(key);
        }
    }
}

impl<G: Gateway> PinSync<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            recency: RecencyTracker::new(gateway.clone()),
            gateway,
            cache: ViewCache::new(),
            syncing: Mutex::new(HashSet::new()),
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn recency(&self) -> &RecencyTracker<G> {
        &self.recency
    }

    /// Current local view; empty until the owner is first loaded.
    pub fn view(&self, owner: &UserId) -> OwnerView {
        self.cache.get(owner).unwrap_or_default()
    }

    pub fn can_pin(&self, owner: &UserId) -> bool {
        policy::can_pin(&self.view(owner).pinned)
    }

    pub fn next_position(&self, owner: &UserId) -> u32 {
        policy::next_position(&self.view(owner).pinned)
    }

    pub fn is_pinned(&self, owner: &UserId, collection: &CollectionId) -> bool {
        policy::is_pinned(&self.view(owner).pinned, collection)
    }

    pub fn is_syncing(&self, owner: &UserId, collection: &CollectionId) -> bool {
        self.syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(owner.clone(), collection.clone()))
    }

    /// Replace the cached view with the gateway's canonical state.
    pub async fn refresh(&self, owner: &UserId) -> Result<OwnerView> {
        let _turn = self.turn(owner).await;
        self.load(owner).await
    }

    /// Drop the cached view so the next read reloads it.
    pub fn invalidate(&self, owner: &UserId) {
        self.cache.invalidate(owner);
    }

    #[tracing::instrument(skip_all, fields(%owner, %collection))]
    pub async fn pin(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.ensure_idle(owner, std::slice::from_ref(collection))?;
        let _turn = self.turn(owner).await;
        let snapshot = self.loaded_view(owner).await?;

        // The gateway re-checks capacity, so a full local list is still sent.
        if !policy::can_pin(&snapshot.pinned) {
            tracing::debug!("local pin list is full; deferring to gateway");
        }
        let position = policy::next_position(&snapshot.pinned);
        if !policy::is_pinned(&snapshot.pinned, collection) {
            let entry = provisional(&snapshot, owner, collection, position);
            self.cache.update_pinned(owner, |pins| pins.push(entry));
        }
        let _syncing = self.mark(owner, std::slice::from_ref(collection));
        tracing::debug!(position, "pin applied locally");

        match self.gateway.insert_pin(owner, collection, position).await {
            Ok(_) => {}
            Err(Error::AlreadyPinned { .. }) => tracing::debug!("already pinned remotely"),
            Err(err) => return Err(self.rollback(owner, snapshot, err)),
        }
        self.settle(owner).await;
        tracing::info!(position, "collection pinned");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(%owner, %collection))]
    pub async fn unpin(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.ensure_idle(owner, std::slice::from_ref(collection))?;
        let _turn = self.turn(owner).await;
        let snapshot = self.loaded_view(owner).await?;

        self.cache
            .update_pinned(owner, |pins| pins.retain(|p| p.collection_id() != collection));
        let _syncing = self.mark(owner, std::slice::from_ref(collection));

        if let Err(err) = self.gateway.delete_pin(owner, collection).await {
            return Err(self.rollback(owner, snapshot, err));
        }
        self.settle(owner).await;
        tracing::info!("collection unpinned");
        Ok(())
    }

    /// Evict `old` and pin `new` at the end of the list in one gateway call.
    #[tracing::instrument(skip_all, fields(%owner, %old, %new))]
    pub async fn replace(&self, owner: &UserId, old: &CollectionId, new: &CollectionId) -> Result<()> {
        let keys = [old.clone(), new.clone()];
        self.ensure_idle(owner, &keys)?;
        let _turn = self.turn(owner).await;
        let snapshot = self.loaded_view(owner).await?;

        let mut remaining = snapshot.pinned.clone();
        remaining.retain(|p| p.collection_id() != old);
        let position = policy::next_position(&remaining);
        if !policy::is_pinned(&remaining, new) {
            remaining.push(provisional(&snapshot, owner, new, position));
        }
        self.cache.update_pinned(owner, |pins| *pins = remaining);
        let _syncing = self.mark(owner, &keys);

        if let Err(err) = self.gateway.replace_pin(owner, old, new, position).await {
            return Err(self.rollback(owner, snapshot, err));
        }
        self.settle(owner).await;
        tracing::info!(position, "pin replaced");
        Ok(())
    }

    /// Apply new positions to existing pins; ids that are not pinned are
    /// ignored. Only changed rows are sent to the gateway. An order that
    /// would put two pins at one position is rejected with
    /// [`Error::Validation`] before anything changes.
    #[tracing::instrument(skip_all, fields(%owner, updates = new_order.len()))]
    pub async fn reorder(&self, owner: &UserId, new_order: &[PositionUpdate]) -> Result<()> {
        self.ensure_idle(owner, &changed_collections(&self.view(owner).pinned, new_order))?;
        let _turn = self.turn(owner).await;
        let snapshot = self.loaded_view(owner).await?;
        self.reorder_in_turn(owner, snapshot, new_order).await
    }

    /// Drag the pin at index `from` to index `to` and renumber the list.
    #[tracing::instrument(skip_all, fields(%owner, from = from, to = to))]
    pub async fn move_pin(&self, owner: &UserId, from: usize, to: usize) -> Result<()> {
        let cached = self.view(owner).pinned;
        if let Ok(preview) = reorder::move_to(&cached, from, to) {
            self.ensure_idle(owner, &changed_collections(&cached, &preview))?;
        }
        let _turn = self.turn(owner).await;
        let snapshot = self.loaded_view(owner).await?;
        let new_order = reorder::move_to(&snapshot.pinned, from, to)?;
        self.reorder_in_turn(owner, snapshot, &new_order).await
    }

    /// Reorder body; the caller holds the owner's turn.
    async fn reorder_in_turn(
        &self,
        owner: &UserId,
        snapshot: OwnerView,
        new_order: &[PositionUpdate],
    ) -> Result<()> {
        let changed = changed_updates(&snapshot.pinned, new_order);
        if changed.is_empty() {
            return Ok(());
        }
        policy::validate_positions(
            snapshot.pinned.iter().map(|p| (&p.pin.id, p.pin.position)),
            &changed,
        )?;

        let lookup: HashMap<&PinId, u32> = changed.iter().map(|u| (&u.id, u.position)).collect();
        self.cache.update_pinned(owner, |pins| {
            for pin in pins.iter_mut() {
                if let Some(&position) = lookup.get(&pin.pin.id) {
                    pin.pin.position = position;
                }
            }
            pins.sort_by_key(|p| p.pin.position);
        });
        let _syncing = self.mark(owner, &changed_collections(&snapshot.pinned, &changed));

        if let Err(err) = self.gateway.batch_update_positions(owner, &changed).await {
            return Err(self.rollback(owner, snapshot, err));
        }
        self.settle(owner).await;
        tracing::info!(changed = changed.len(), "pins reordered");
        Ok(())
    }

    async fn load(&self, owner: &UserId) -> Result<OwnerView> {
        let pinned = self.gateway.list_pinned(owner).await?;
        let pinned_ids: Vec<CollectionId> =
            pinned.iter().map(|p| p.collection_id().clone()).collect();
        let recent = self.recency.recent(owner, &pinned_ids).await?;
        let view = OwnerView { pinned, recent };
        self.cache.put(owner, view.clone());
        Ok(view)
    }

    async fn loaded_view(&self, owner: &UserId) -> Result<OwnerView> {
        match self.cache.get(owner) {
            Some(view) => Ok(view),
            None => self.load(owner).await,
        }
    }

    /// The remote write landed; a failed refetch keeps the optimistic view.
    async fn settle(&self, owner: &UserId) {
        if let Err(err) = self.load(owner).await {
            tracing::warn!(%owner, error = %err, "refresh after mutation failed; keeping local view");
        }
    }

    fn rollback(&self, owner: &UserId, snapshot: OwnerView, err: Error) -> Error {
        tracing::warn!(%owner, error = %err, "mutation rejected; restoring snapshot");
        self.cache.put(owner, snapshot);
        err
    }

    /// Wait for the owner's queue. Queues nobody holds or awaits are dropped
    /// here, so the map only keeps owners with work in flight.
    async fn turn(&self, owner: &UserId) -> OwnedMutexGuard<()> {
        let queue = {
            let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
            queues.retain(|_, queue| Arc::strong_count(queue) > 1);
            queues.entry(owner.clone()).or_default().clone()
        };
        queue.lock_owned().await
    }

    fn ensure_idle(&self, owner: &UserId, collections: &[CollectionId]) -> Result<()> {
        let set = self.syncing.lock().unwrap_or_else(PoisonError::into_inner);
        match collections
            .iter()
            .find(|c| set.contains(&(owner.clone(), (*c).clone())))
        {
            Some(collection) => Err(Error::SyncInProgress {
                collection: collection.clone(),
            }),
            None => Ok(()),
        }
    }

    fn mark(&self, owner: &UserId, collections: &[CollectionId]) -> SyncingGuard<'_> {
        let keys: Vec<SyncKey> = collections
            .iter()
            .map(|c| (owner.clone(), c.clone()))
            .collect();
        let mut set = self.syncing.lock().unwrap_or_else(PoisonError::into_inner);
        set.extend(keys.iter().cloned());
        SyncingGuard {
            set: &self.syncing,
            keys,
        }
    }
}

fn provisional(
    view: &OwnerView,
    owner: &UserId,
    collection: &CollectionId,
    position: u32,
) -> PinnedCollection {
    PinnedCollection {
        pin: Pin {
            id: PinId::provisional(),
            owner: owner.clone(),
            collection_id: collection.clone(),
            position,
            created_at: Utc::now(),
        },
        collection: view.recent.iter().find(|c| &c.id == collection).cloned(),
    }
}

fn changed_updates(pins: &[PinnedCollection], new_order: &[PositionUpdate]) -> Vec<PositionUpdate> {
    new_order
        .iter()
        .filter(|u| {
            pins.iter()
                .any(|p| p.pin.id == u.id && p.pin.position != u.position)
        })
        .cloned()
        .collect()
}

fn changed_collections(pins: &[PinnedCollection], updates: &[PositionUpdate]) -> Vec<CollectionId> {
    changed_updates(pins, updates)
        .iter()
        .filter_map(|u| pins.iter().find(|p| p.pin.id == u.id))
        .map(|p| p.collection_id().clone())
        .collect()
}
