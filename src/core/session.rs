//! Resolution of the current owner id.
//!
//! The auth collaborator is behind [`IdentityProvider`]; [`OwnerCache`]
//! keeps the last resolved id for a bounded time and can be invalidated
//! explicitly, e.g. after a sign-out.

use crate::core::model::UserId;
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_user(&self) -> impl Future<Output = Result<Option<UserId>>> + Send;
}

/// Identity taken from configuration (`VIDSHELF_USER` or `--user`).
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    pub fn new(user: Option<UserId>) -> Self {
        Self { user }
    }
}

impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<Option<UserId>> {
        Ok(self.user.clone())
    }
}

pub struct OwnerCache<P> {
    provider: P,
    ttl: Duration,
    cached: Mutex<Option<(UserId, Instant)>>,
}

impl<P: IdentityProvider> OwnerCache<P> {
    pub fn new(provider: P, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// The signed-in owner, or [`Error::NotAuthenticated`].
    pub async fn owner(&self) -> Result<UserId> {
        if let Some(owner) = self.fresh() {
            return Ok(owner);
        }

        let owner = self
            .provider
            .current_user()
            .await?
            .ok_or(Error::NotAuthenticated)?;
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((owner.clone(), Instant::now()));
        Ok(owner)
    }

    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fresh(&self) -> Option<UserId> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|(_, at)| at.elapsed() < self.ttl)
            .map(|(owner, _)| owner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        user: Option<UserId>,
        calls: AtomicUsize,
    }

    impl IdentityProvider for Counting {
        async fn current_user(&self) -> Result<Option<UserId>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.user.clone())
        }
    }

    fn counting(user: Option<&str>) -> Counting {
        Counting {
            user: user.map(UserId::from),
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn caches_until_ttl_expires() {
        let cache = OwnerCache::new(counting(Some("alice")), Duration::from_secs(60));

        assert_eq!(cache.owner().await.unwrap(), UserId::from("alice"));
        assert_eq!(cache.owner().await.unwrap(), UserId::from("alice"));
        assert_eq!(cache.provider.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.owner().await.unwrap();
        assert_eq!(cache.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_lookup() {
        let cache = OwnerCache::new(counting(Some("alice")), Duration::from_secs(60));
        cache.owner().await.unwrap();
        cache.invalidate();
        cache.owner().await.unwrap();
        assert_eq!(cache.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_user_is_not_authenticated() {
        let cache = OwnerCache::new(StaticIdentity::new(None), Duration::from_secs(60));
        assert_matches!(cache.owner().await, Err(Error::NotAuthenticated));
    }
}
