use agentspec_db::{AgentSpecificationRepository, SqlAgentSpecificationRepository};

use crate::commands::{json_success, persistence_failure, with_migrated_pool, CommandResult};

pub fn run() -> CommandResult {
    let listed = with_migrated_pool("list", |pool| async move {
        SqlAgentSpecificationRepository::new(pool).list().await.map_err(persistence_failure)
    });

    match listed {
        Ok(specifications) => json_success("list", &specifications),
        Err(failure) => failure,
    }
}
