mod build_commands;
mod collect_commands;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "skilldeck", about = "Skilldeck — incremental SKILL.md catalog builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Workspace root holding data/, config/ and web/static/.
    #[arg(long, global = true, env = "SKILLDECK_ROOT", default_value = ".")]
    root: std::path::PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the catalog from the local skill mirror and regenerate the
    /// flattened view.
    Build,
    /// Collect an organization's skills from GitHub into the local mirror
    /// and merge them into the catalog.
    Collect,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "skilldeck starting");

    let paths = skilldeck_config::Paths::from_root(&cli.root);

    match cli.command {
        Commands::Build => build_commands::handle_build(&paths),
        Commands::Collect => collect_commands::handle_collect(&paths).await,
    }
}
