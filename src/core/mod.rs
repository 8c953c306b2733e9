pub mod cache;
pub mod gateway;
pub mod model;
pub mod policy;
pub mod recency;
pub mod reorder;
pub mod session;
pub mod storage;
pub mod store;
pub mod sync;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::OwnerView;
pub use gateway::Gateway;
pub use model::*;
pub use recency::RecencyTracker;
pub use session::{IdentityProvider, OwnerCache, StaticIdentity};
pub use storage::FileGateway;
pub use sync::PinSync;
pub use video::{extract_video_id, sanitize_video_id};
