//! KitchenPantry token toolchain: the `pantry` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let workspace = support::Workspace::load_or_exit(&cli.root, cli.config.as_deref());

    match cli.command {
        Commands::Governance { json } => commands::governance::run(&workspace, json),

        Commands::Coverage { json, output } => commands::coverage::run(&workspace, json, output),

        Commands::Changelog { revision, date } => {
            commands::changelog::run(&workspace, revision, date)
        }

        Commands::Optimize { mode, output, json } => {
            commands::optimize::run(&workspace, mode, output, json)
        }

        Commands::Export {
            output,
            validate_only,
        } => commands::export::run(&workspace, output, validate_only),

        Commands::SchemaValidate { report, json } => {
            commands::schema_validate::run(&workspace, report, json)
        }

        Commands::Gate { output, json } => commands::gate::run(&workspace, output, json),
    }
}
