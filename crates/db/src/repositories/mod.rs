use async_trait::async_trait;
use thiserror::Error;

use agentspec_core::domain::specification::{
    AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId,
};

pub mod agent_specification;
pub mod memory;

pub use agent_specification::SqlAgentSpecificationRepository;
pub use memory::InMemoryAgentSpecificationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Storage for agent specifications. Every implementation orders `list` by
/// creation time, then id, and treats an empty patch as "no update".
#[async_trait]
pub trait AgentSpecificationRepository: Send + Sync {
    async fn create(
        &self,
        specification: NewAgentSpecification,
    ) -> Result<AgentSpecification, RepositoryError>;

    async fn find_by_id(
        &self,
        id: SpecificationId,
    ) -> Result<Option<AgentSpecification>, RepositoryError>;

    async fn list(&self) -> Result<Vec<AgentSpecification>, RepositoryError>;

    async fn update(
        &self,
        id: SpecificationId,
        patch: AgentSpecificationPatch,
    ) -> Result<Option<AgentSpecification>, RepositoryError>;

    async fn delete(&self, id: SpecificationId) -> Result<bool, RepositoryError>;
}
