use crate::core::gateway::Gateway;
use crate::core::model::{Collection, CollectionId, RECENT_LIMIT, UserId};
use crate::error::Result;
use std::sync::Arc;

/// Records collection visits and derives the "recent, unpinned" list.
pub struct RecencyTracker<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> RecencyTracker<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Stamp `last_accessed_at`. Best effort: failures are logged, never
    /// returned, and no cached list is refreshed.
    pub async fn touch(&self, owner: &UserId, collection: &CollectionId) {
        match self.gateway.touch_last_accessed(owner, collection).await {
            Ok(()) => tracing::debug!(%owner, %collection, "collection touched"),
            Err(err) => tracing::warn!(%owner, %collection, error = %err, "failed to record access"),
        }
    }

    pub async fn recent(&self, owner: &UserId, exclude: &[CollectionId]) -> Result<Vec<Collection>> {
        let recent = self.gateway.list_recent(owner, exclude).await?;
        Ok(trim_recent(recent, exclude))
    }
}

/// Drop excluded and never-opened rows, order newest first and cap the list.
pub fn trim_recent(mut recent: Vec<Collection>, exclude: &[CollectionId]) -> Vec<Collection> {
    recent.retain(|c| c.last_accessed_at.is_some() && !exclude.contains(&c.id));
    recent.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
    recent.truncate(RECENT_LIMIT);
    recent
}
