use std::collections::BTreeMap;

use tokio::sync::RwLock;

use agentspec_core::domain::specification::{
    AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId,
};

use super::agent_specification::storage_now;
use super::{AgentSpecificationRepository, RepositoryError};

#[derive(Default)]
struct Store {
    next_id: i64,
    specifications: BTreeMap<SpecificationId, AgentSpecification>,
}

/// Process-local repository with the same ordering and update rules as the
/// SQLite one. Ids are never reused after a delete.
#[derive(Default)]
pub struct InMemoryAgentSpecificationRepository {
    store: RwLock<Store>,
}

#[async_trait::async_trait]
impl AgentSpecificationRepository for InMemoryAgentSpecificationRepository {
    async fn create(
        &self,
        specification: NewAgentSpecification,
    ) -> Result<AgentSpecification, RepositoryError> {
        let mut store = self.store.write().await;
        store.next_id += 1;
        let now = storage_now();
        let created = AgentSpecification {
            id: SpecificationId(store.next_id),
            name: specification.name,
            description: specification.description,
            goal: specification.goal,
            instructions: specification.instructions,
            tools: specification.tools,
            created_at: now,
            updated_at: now,
        };
        store.specifications.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: SpecificationId,
    ) -> Result<Option<AgentSpecification>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.specifications.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<AgentSpecification>, RepositoryError> {
        let store = self.store.read().await;
        let mut specifications = store.specifications.values().cloned().collect::<Vec<_>>();
        specifications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(specifications)
    }

    async fn update(
        &self,
        id: SpecificationId,
        patch: AgentSpecificationPatch,
    ) -> Result<Option<AgentSpecification>, RepositoryError> {
        if patch.is_empty() {
            return Ok(None);
        }

        let mut store = self.store.write().await;
        let Some(specification) = store.specifications.get_mut(&id) else {
            return Ok(None);
        };
        specification.apply(patch);
        specification.updated_at = storage_now();
        Ok(Some(specification.clone()))
    }

    async fn delete(&self, id: SpecificationId) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        Ok(store.specifications.remove(&id).is_some())
    }
}
