use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "uatgen",
    about = "uatgen: user-acceptance-test documents from a web application's route table",
    version
)]
pub struct Cli {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where rule discovery reads middleware and policy definitions from.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscoveryArgs {
    /// Application source root to scan (middleware, policies, alias registrations)
    #[arg(long, conflicts_with = "registry")]
    pub source_root: Option<String>,

    /// JSON introspection registry describing middleware and policies
    #[arg(long)]
    pub registry: Option<String>,

    /// Use only the static rule tables from the configuration
    #[arg(long, conflicts_with_all = ["source_root", "registry"])]
    pub no_discovery: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate UAT documents for every module
    Generate {
        /// Route-table snapshot (JSON)
        #[arg(long, default_value = "routes.json")]
        routes: String,

        /// Configuration file (defaults to ./uat.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output format: markdown or json
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Output directory (defaults to <config directory>/<YYYY-MM-DD>)
        #[arg(long)]
        output_dir: Option<String>,

        /// Users snapshot (JSON) for the users document
        #[arg(long)]
        users: Option<String>,

        #[command(flatten)]
        discovery: DiscoveryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List modules derived from the route table
    Modules {
        /// Route-table snapshot (JSON)
        #[arg(long, default_value = "routes.json")]
        routes: String,

        /// Configuration file (defaults to ./uat.toml when present)
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        discovery: DiscoveryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show each selected route's prerequisites and where they came from
    Prerequisites {
        /// Route-table snapshot (JSON)
        #[arg(long, default_value = "routes.json")]
        routes: String,

        /// Configuration file (defaults to ./uat.toml when present)
        #[arg(long)]
        config: Option<String>,

        #[command(flatten)]
        discovery: DiscoveryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration as TOML
    InitConfig {
        /// Destination path
        #[arg(long, default_value = "uat.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
