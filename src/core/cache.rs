use crate::core::model::{Collection, CollectionId, PinnedCollection, UserId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Locally known state for one owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerView {
    pub pinned: Vec<PinnedCollection>,
    pub recent: Vec<Collection>,
}

impl OwnerView {
    pub fn pinned_ids(&self) -> Vec<CollectionId> {
        self.pinned.iter().map(|p| p.collection_id().clone()).collect()
    }
}

/// Owner-keyed store of [`OwnerView`]s. Readers always get a clone.
#[derive(Debug, Default)]
pub struct ViewCache {
    views: RwLock<HashMap<UserId, OwnerView>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &UserId) -> Option<OwnerView> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner)
            .cloned()
    }

    pub(crate) fn put(&self, owner: &UserId, view: OwnerView) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner.clone(), view);
    }

    pub(crate) fn update_pinned(&self, owner: &UserId, f: impl FnOnce(&mut Vec<PinnedCollection>)) {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut views.entry(owner.clone()).or_default().pinned);
    }

    pub fn invalidate(&self, owner: &UserId) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(owner);
    }
}
