//! File-based Knowledge Store Adapter
//!
//! Persists one collection as a JSON document at
//! `{data_dir}/{collection}.json`. The whole file is loaded on open and
//! rewritten after each mutation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use super::in_memory_store::Collection;
use crate::domain::knowledge::{EmbeddedPassage, Passage};
use crate::ports::{
    rank_entries, KnowledgeStore, KnowledgeStoreError, SearchHit, SearchParams, StoreStats,
};

#[derive(Debug, Clone)]
pub struct FileKnowledgeStore {
    name: String,
    path: PathBuf,
    collection: Arc<RwLock<Collection>>,
}

impl FileKnowledgeStore {
    /// Opens (or creates on first write) the collection file under `data_dir`.
    ///
    /// # Errors
    /// Fails when an existing file cannot be read or parsed.
    pub async fn open<P: AsRef<Path>>(
        data_dir: P,
        collection: impl Into<String>,
    ) -> Result<Self, KnowledgeStoreError> {
        let name = collection.into();
        let path = data_dir.as_ref().join(format!("{name}.json"));

        let entries = if fs::try_exists(&path).await? {
            let raw = fs::read_to_string(&path).await?;
            serde_json::from_str::<Vec<EmbeddedPassage>>(&raw)
                .map_err(|e| KnowledgeStoreError::DeserializationFailed(e.to_string()))?
        } else {
            Vec::new()
        };

        tracing::debug!(
            collection = %name,
            path = %path.display(),
            passages = entries.len(),
            "opened knowledge store"
        );

        Ok(Self {
            name,
            path,
            collection: Arc::new(RwLock::new(Collection::from_entries(entries))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, collection: &Collection) -> Result<(), KnowledgeStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(&collection.entries)
            .map_err(|e| KnowledgeStoreError::SerializationFailed(e.to_string()))?;

        // Write then rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for FileKnowledgeStore {
    async fn upsert(&self, passages: Vec<EmbeddedPassage>) -> Result<usize, KnowledgeStoreError> {
        let mut collection = self.collection.write().await;
        let written = collection.upsert(passages)?;
        self.persist(&collection).await?;
        Ok(written)
    }

    async fn delete_collection(&self) -> Result<(), KnowledgeStoreError> {
        let mut collection = self.collection.write().await;
        collection.clear();
        if fs::try_exists(&self.path).await? {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        params: SearchParams,
    ) -> Result<Vec<SearchHit>, KnowledgeStoreError> {
        let collection = self.collection.read().await;
        if let Some(expected) = collection.dimensions {
            if expected != query.len() {
                return Err(KnowledgeStoreError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }
        Ok(rank_entries(&collection.entries, query, params))
    }

    async fn list(&self) -> Result<Vec<Passage>, KnowledgeStoreError> {
        let collection = self.collection.read().await;
        Ok(collection.entries.iter().map(|e| e.passage.clone()).collect())
    }

    async fn stats(&self) -> Result<StoreStats, KnowledgeStoreError> {
        Ok(self.collection.read().await.stats(&self.name))
    }
}
