use agentspec_core::extraction::ExtractionPipeline;
use agentspec_db::{AgentSpecificationRepository, SqlAgentSpecificationRepository};

use crate::commands::{json_success, persistence_failure, with_migrated_pool, CommandResult};

/// Prints the suggestion as the JSON message. With `save`, the stored record
/// (including its new id) is printed instead.
pub fn run(description: &str, save: bool) -> CommandResult {
    let suggestion = match ExtractionPipeline.extract(description) {
        Ok(suggestion) => suggestion,
        Err(error) => return CommandResult::failure("extract", "invalid_input", error.to_string(), 2),
    };

    if !save {
        return json_success("extract", &suggestion);
    }

    let stored = with_migrated_pool("extract", |pool| async move {
        SqlAgentSpecificationRepository::new(pool)
            .create(suggestion.into_new_specification())
            .await
            .map_err(persistence_failure)
    });

    match stored {
        Ok(stored) => json_success("extract", &stored),
        Err(failure) => failure,
    }
}
