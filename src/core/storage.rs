use crate::core::gateway::Gateway;
use crate::core::model::{Collection, CollectionId, Membership, PinId, PinnedCollection, PositionUpdate, UserId};
use crate::core::store::Tables;
use crate::core::video;
use crate::error::Result;
use chrono::Utc;
use std::fs as std_fs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const SHELF_FILE: &str = "shelf.json";
const SHELF_TMP_SUFFIX: &str = ".tmp";

/// Gateway backed by a single JSON document in the data directory.
///
/// Every call reads the document, applies one [`Tables`] operation and, for
/// mutations, writes it back through a temp file and rename. The internal
/// lock makes each call a transaction with respect to this process.
pub struct FileGateway {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileGateway {
    pub fn open(data_dir: &Path) -> Result<Self> {
        ensure_directory(data_dir)?;
        Ok(Self {
            path: data_dir.join(SHELF_FILE),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Tables> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, tables: &Tables) -> Result<()> {
        let content = serde_json::to_string_pretty(tables)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(SHELF_TMP_SUFFIX);
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read<R>(&self, f: impl FnOnce(&Tables) -> Result<R>) -> Result<R> {
        let _guard = self.lock.lock().await;
        let tables = self.load().await?;
        f(&tables)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut Tables) -> Result<R>) -> Result<R> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load().await?;
        let out = f(&mut tables)?;
        self.save(&tables).await?;
        Ok(out)
    }

    pub async fn create_collection(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<Collection> {
        let collection = self
            .write(|t| t.create_collection(owner, name, description, Utc::now()))
            .await?;
        tracing::info!(%owner, collection = %collection.id, "collection created");
        Ok(collection)
    }

    pub async fn rename_collection(
        &self,
        owner: &UserId,
        id: &CollectionId,
        name: &str,
    ) -> Result<Collection> {
        self.write(|t| t.rename_collection(owner, id, name, Utc::now()))
            .await
    }

    pub async fn delete_collection(&self, owner: &UserId, id: &CollectionId) -> Result<()> {
        self.write(|t| t.delete_collection(owner, id)).await?;
        tracing::info!(%owner, collection = %id, "collection deleted");
        Ok(())
    }

    pub async fn list_collections(&self, owner: &UserId) -> Result<Vec<Collection>> {
        self.read(|t| Ok(t.list_collections(owner))).await
    }

    /// Accepts a YouTube URL or a bare video id.
    pub async fn add_video(
        &self,
        owner: &UserId,
        collection: &CollectionId,
        video: &str,
    ) -> Result<(String, bool)> {
        let video_id = video::extract_video_id(video)
            .map_or_else(|| video::sanitize_video_id(video), Ok)?;
        let added = self
            .write(|t| t.add_video(owner, collection, &video_id, Utc::now()))
            .await?;
        Ok((video_id, added))
    }

    pub async fn remove_video(
        &self,
        owner: &UserId,
        collection: &CollectionId,
        video: &str,
    ) -> Result<bool> {
        let video_id = video::sanitize_video_id(video)?;
        self.write(|t| t.remove_video(owner, collection, &video_id))
            .await
    }

    pub async fn list_videos(
        &self,
        owner: &UserId,
        collection: &CollectionId,
    ) -> Result<Vec<Membership>> {
        self.read(|t| t.list_videos(owner, collection)).await
    }
}

impl Gateway for FileGateway {
    async fn list_pinned(&self, owner: &UserId) -> Result<Vec<PinnedCollection>> {
        self.read(|t| Ok(t.list_pinned(owner))).await
    }

    async fn list_recent(
        &self,
        owner: &UserId,
        exclude: &[CollectionId],
    ) -> Result<Vec<Collection>> {
        self.read(|t| Ok(t.list_recent(owner, exclude))).await
    }

    async fn is_pinned(&self, owner: &UserId, collection: &CollectionId) -> Result<bool> {
        self.read(|t| Ok(t.is_pinned(owner, collection))).await
    }

    async fn insert_pin(
        &self,
        owner: &UserId,
        collection: &CollectionId,
        position: u32,
    ) -> Result<PinId> {
        self.write(|t| t.insert_pin(owner, collection, position, Utc::now()))
            .await
    }

    async fn delete_pin(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.write(|t| {
            t.delete_pin(owner, collection);
            Ok(())
        })
        .await
    }

    async fn replace_pin(
        &self,
        owner: &UserId,
        old: &CollectionId,
        new: &CollectionId,
        position: u32,
    ) -> Result<PinId> {
        self.write(|t| t.replace_pin(owner, old, new, position, Utc::now()))
            .await
    }

    async fn update_position(&self, owner: &UserId, pin: &PinId, position: u32) -> Result<()> {
        self.write(|t| t.update_position(owner, pin, position))
            .await
    }

    async fn batch_update_positions(
        &self,
        owner: &UserId,
        updates: &[PositionUpdate],
    ) -> Result<()> {
        self.write(|t| t.apply_positions(owner, updates)).await
    }

    async fn touch_last_accessed(&self, owner: &UserId, collection: &CollectionId) -> Result<()> {
        self.write(|t| t.touch(owner, collection, Utc::now())).await
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    std_fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std_fs::metadata(path)?;
        let mut permissions = metadata.permissions();
        if permissions.mode() & 0o777 != 0o700 {
            permissions.set_mode(0o700);
            std_fs::set_permissions(path, permissions)?;
        }
    }

    Ok(())
}
