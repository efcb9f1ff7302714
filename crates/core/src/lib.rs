pub mod config;
pub mod domain;
pub mod errors;
pub mod extraction;

pub use domain::specification::{
    AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId,
};
pub use errors::{ApplicationError, DomainError, InterfaceError, InterfaceErrorKind};
pub use extraction::{
    process, ExtractionInput, ExtractionPipeline, ExtractionResult, Tool,
};
