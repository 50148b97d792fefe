//! uatgen CLI: the `uatgen` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Generate {
            routes,
            config,
            format,
            output_dir,
            users,
            discovery,
            json,
        } => commands::generate::run(commands::generate::Args {
            routes,
            config,
            format,
            output_dir,
            users,
            discovery,
            json,
        }),

        Commands::Modules {
            routes,
            config,
            discovery,
            json,
        } => commands::modules::run(routes, config, discovery, json),

        Commands::Prerequisites {
            routes,
            config,
            discovery,
            json,
        } => commands::prerequisites::run(routes, config, discovery, json),

        Commands::InitConfig { path, force } => commands::init_config::run(path, force),
    }
}
