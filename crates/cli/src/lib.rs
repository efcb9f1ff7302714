pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "agentspec",
    about = "Agent specification operator CLI",
    long_about = "Turn free-text agent descriptions into structured specifications, \
                  and operate the specification store.",
    after_help = "Examples:\n  agentspec extract \"Create an agent called 'Inbox Zero' that sorts email\"\n  agentspec extract --save \"Monitor my servers and alert me\"\n  agentspec doctor --json\n  agentspec list"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, DB connectivity, and the extraction pipeline")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Suggest an agent specification from a free-text description")]
    Extract {
        #[arg(help = "Description of the agent; multiple words are joined with spaces")]
        description: Vec<String>,
        #[arg(long, help = "Persist the suggestion and report the stored record")]
        save: bool,
    },
    #[command(about = "List stored agent specifications in creation order")]
    List,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Extract { description, save } => {
            commands::extract::run(&description.join(" "), save)
        }
        Command::List => commands::list::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
