//! Persistence of saved channel lists.
//!
//! Defines the opaque key-value storage interface the UI layer consumes,
//! with an in-memory implementation for tests and a JSON-document
//! implementation backed by a single file. Last-writer-wins per key, no
//! transactional guarantees.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::ChannelRecord;

/// A named channel list with creation and update timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedChannelList {
    pub id: Uuid,
    pub name: String,
    pub channels: Vec<ChannelRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata about a saved list, without its channel payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: Uuid,
    pub name: String,
    pub channel_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Errors that occur during saved-list storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("channel list {id} not found")]
    ListNotFound { id: Uuid },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage operations for saved channel lists.
///
/// Implementations handle storage backend details; callers see stable ids
/// and timestamps regardless of backend.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Saves a new channel list under a fresh id and returns that id.
    async fn put(
        &mut self,
        name: &str,
        channels: Vec<ChannelRecord>,
    ) -> Result<Uuid, StorageError>;

    /// Replaces the channels of an existing list and bumps its update
    /// timestamp.
    ///
    /// # Errors
    ///
    /// - `StorageError::ListNotFound` - No list with the given id
    async fn update(&mut self, id: Uuid, channels: Vec<ChannelRecord>) -> Result<(), StorageError>;

    /// Loads a saved list by id.
    ///
    /// # Errors
    ///
    /// - `StorageError::ListNotFound` - No list with the given id
    async fn get(&self, id: Uuid) -> Result<SavedChannelList, StorageError>;

    /// Lists metadata for all saved lists, oldest first.
    async fn list(&self) -> Result<Vec<ListSummary>, StorageError>;

    /// Deletes a saved list. Clears the current selection if it pointed at
    /// the deleted list.
    ///
    /// # Errors
    ///
    /// - `StorageError::ListNotFound` - No list with the given id
    async fn delete(&mut self, id: Uuid) -> Result<(), StorageError>;

    /// The id of the currently active list, if any.
    async fn current_selection(&self) -> Result<Option<Uuid>, StorageError>;

    /// Sets or clears the currently active list id.
    async fn set_current_selection(&mut self, id: Option<Uuid>) -> Result<(), StorageError>;
}

/// Document shape shared by both implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    lists: Vec<SavedChannelList>,
    current: Option<Uuid>,
}

impl StoreDocument {
    fn put(&mut self, name: &str, channels: Vec<ChannelRecord>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.lists.push(SavedChannelList {
            id,
            name: name.to_string(),
            channels,
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn update(&mut self, id: Uuid, channels: Vec<ChannelRecord>) -> Result<(), StorageError> {
        let list = self
            .lists
            .iter_mut()
            .find(|list| list.id == id)
            .ok_or(StorageError::ListNotFound { id })?;
        list.channels = channels;
        list.updated_at = Utc::now();
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<SavedChannelList, StorageError> {
        self.lists
            .iter()
            .find(|list| list.id == id)
            .cloned()
            .ok_or(StorageError::ListNotFound { id })
    }

    fn summaries(&self) -> Vec<ListSummary> {
        self.lists
            .iter()
            .map(|list| ListSummary {
                id: list.id,
                name: list.name.clone(),
                channel_count: list.channels.len(),
                created_at: list.created_at,
                updated_at: list.updated_at,
            })
            .collect()
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        let before = self.lists.len();
        self.lists.retain(|list| list.id != id);
        if self.lists.len() == before {
            return Err(StorageError::ListNotFound { id });
        }
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(())
    }
}

/// In-memory list store for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    document: StoreDocument,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn put(
        &mut self,
        name: &str,
        channels: Vec<ChannelRecord>,
    ) -> Result<Uuid, StorageError> {
        Ok(self.document.put(name, channels))
    }

    async fn update(&mut self, id: Uuid, channels: Vec<ChannelRecord>) -> Result<(), StorageError> {
        self.document.update(id, channels)
    }

    async fn get(&self, id: Uuid) -> Result<SavedChannelList, StorageError> {
        self.document.get(id)
    }

    async fn list(&self) -> Result<Vec<ListSummary>, StorageError> {
        Ok(self.document.summaries())
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        self.document.delete(id)
    }

    async fn current_selection(&self) -> Result<Option<Uuid>, StorageError> {
        Ok(self.document.current)
    }

    async fn set_current_selection(&mut self, id: Option<Uuid>) -> Result<(), StorageError> {
        self.document.current = id;
        Ok(())
    }
}

/// List store backed by a single JSON document on disk.
///
/// The whole document is rewritten on every mutation; lists are small
/// enough that this stays cheap.
#[derive(Debug)]
pub struct JsonFileListStore {
    path: PathBuf,
    document: StoreDocument,
}

impl JsonFileListStore {
    /// Opens a store at the given path, reading any existing document.
    ///
    /// A missing file yields an empty store; the file is created on first
    /// mutation.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - File exists but cannot be read
    /// - `StorageError::Serialization` - File contents are not a valid
    ///   store document
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self { path, document })
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&self.document)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ListStore for JsonFileListStore {
    async fn put(
        &mut self,
        name: &str,
        channels: Vec<ChannelRecord>,
    ) -> Result<Uuid, StorageError> {
        let id = self.document.put(name, channels);
        self.persist().await?;
        tracing::debug!(%id, name, "saved channel list");
        Ok(id)
    }

    async fn update(&mut self, id: Uuid, channels: Vec<ChannelRecord>) -> Result<(), StorageError> {
        self.document.update(id, channels)?;
        self.persist().await
    }

    async fn get(&self, id: Uuid) -> Result<SavedChannelList, StorageError> {
        self.document.get(id)
    }

    async fn list(&self) -> Result<Vec<ListSummary>, StorageError> {
        Ok(self.document.summaries())
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        self.document.delete(id)?;
        self.persist().await
    }

    async fn current_selection(&self) -> Result<Option<Uuid>, StorageError> {
        Ok(self.document.current)
    }

    async fn set_current_selection(&mut self, id: Option<Uuid>) -> Result<(), StorageError> {
        self.document.current = id;
        self.persist().await
    }
}
