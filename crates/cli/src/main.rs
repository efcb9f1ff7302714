use std::process::ExitCode;

fn main() -> ExitCode {
    agentspec_cli::run()
}
