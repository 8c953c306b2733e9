//! Contract for the remote, user-scoped store that owns collections and pins.
//!
//! Every operation is scoped to `owner`; rows belonging to another user are
//! invisible and behave as missing.

use crate::core::model::{Collection, CollectionId, PinId, PinnedCollection, PositionUpdate, UserId};
use crate::error::{Error, Result};
use futures::future::join_all;
use std::future::Future;

pub trait Gateway: Send + Sync {
    /// Pins joined with their collections, ascending by position.
    fn list_pinned(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<PinnedCollection>>> + Send;

    /// Accessed collections not in `exclude`, most recent first, at most
    /// [`RECENT_LIMIT`](crate::core::model::RECENT_LIMIT).
    fn list_recent(
        &self,
        owner: &UserId,
        exclude: &[CollectionId],
    ) -> impl Future<Output = Result<Vec<Collection>>> + Send;

    fn is_pinned(
        &self,
        owner: &UserId,
        collection: &CollectionId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Fails with [`Error::PinLimitReached`] at capacity and
    /// [`Error::AlreadyPinned`] when the pair already has a pin.
    fn insert_pin(
        &self,
        owner: &UserId,
        collection: &CollectionId,
        position: u32,
    ) -> impl Future<Output = Result<PinId>> + Send;

    /// Deleting a pin that does not exist is not an error.
    fn delete_pin(
        &self,
        owner: &UserId,
        collection: &CollectionId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove the pin on `old` and pin `new` at `position` as one operation.
    fn replace_pin(
        &self,
        owner: &UserId,
        old: &CollectionId,
        new: &CollectionId,
        position: u32,
    ) -> impl Future<Output = Result<PinId>> + Send;

    fn update_position(
        &self,
        owner: &UserId,
        pin: &PinId,
        position: u32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Apply every update, concurrently and without a transaction.
    ///
    /// Any failed row yields [`Error::PartialBatch`]; the rows that succeeded
    /// stay written.
    fn batch_update_positions(
        &self,
        owner: &UserId,
        updates: &[PositionUpdate],
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let results = join_all(
                updates
                    .iter()
                    .map(|update| self.update_position(owner, &update.id, update.position)),
            )
            .await;

            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed == 0 {
                return Ok(());
            }

            for err in results.into_iter().filter_map(|r| r.err()) {
                tracing::warn!(%owner, error = %err, "position update failed");
            }
            Err(Error::PartialBatch {
                failed,
                total: updates.len(),
            })
        }
    }

    fn touch_last_accessed(
        &self,
        owner: &UserId,
        collection: &CollectionId,
    ) -> impl Future<Output = Result<()>> + Send;
}
