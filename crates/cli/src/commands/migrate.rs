use crate::commands::{with_migrated_pool, CommandResult, Failure};

pub fn run() -> CommandResult {
    match with_migrated_pool("migrate", |_pool| async { Ok::<_, Failure>(()) }) {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => failure,
    }
}
