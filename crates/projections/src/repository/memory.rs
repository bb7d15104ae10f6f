use std::collections::HashMap;
use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use tokio::sync::RwLock;

use crate::read_model::ReadModel;
use crate::repository::ReadModelRepository;
use crate::{ProjectionConfig, ProjectionError, Result};

type Shard<M> = RwLock<HashMap<AggregateId, M>>;

/// In-memory repository sharded by aggregate id.
///
/// Each shard is an independent `RwLock`: writers on one shard exclude
/// readers and writers of that shard only, and reads never wait for each
/// other. Models are cloned in and out, so a reader holds either the
/// previous or the next complete value.
#[derive(Clone)]
pub struct InMemoryReadModelRepository<M> {
    shards: Arc<[Shard<M>]>,
    hasher: RandomState,
}

impl<M: ReadModel> InMemoryReadModelRepository<M> {
    /// Creates an empty repository with the default shard count.
    pub fn new() -> Self {
        Self::with_shards(ProjectionConfig::default().repository_shards)
    }

    /// Creates an empty repository with `shards` lock shards (at least one).
    pub fn with_shards(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1))
                .map(|_| RwLock::new(HashMap::new()))
                .collect(),
            hasher: RandomState::new(),
        }
    }

    /// Creates an empty repository sized from configuration.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::with_shards(config.repository_shards)
    }

    /// Returns the number of lock shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the number of stored models.
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in self.shards.iter() {
            total += shard.read().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every stored model.
    pub async fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().await.clear();
        }
    }

    fn shard(&self, id: &AggregateId) -> &Shard<M> {
        let index = self.hasher.hash_one(id) % self.shards.len() as u64;
        &self.shards[index as usize]
    }
}

impl<M: ReadModel> Default for InMemoryReadModelRepository<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: ReadModel> ReadModelRepository<M> for InMemoryReadModelRepository<M> {
    async fn save(&self, model: M) -> Result<()> {
        let id = model.id().clone();
        self.shard(&id).write().await.insert(id, model);
        Ok(())
    }

    async fn find_by_id(&self, id: &AggregateId) -> Result<M> {
        self.shard(id)
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ProjectionError::NotFound {
                model_type: M::MODEL_TYPE,
                id: id.clone(),
            })
    }

    async fn find_all(&self) -> Result<Vec<M>> {
        let mut models = Vec::new();
        for shard in self.shards.iter() {
            models.extend(shard.read().await.values().cloned());
        }
        models.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(models)
    }

    async fn delete(&self, id: &AggregateId) -> Result<()> {
        self.shard(id).write().await.remove(id);
        Ok(())
    }
}
