use clap::{Parser, Subcommand};
use tracing::Level;

use gamedeck_cli::{
    BrowseArgs, CacheCommands, CatalogTarget, GlobalOptions, OutputFormat, commands,
};

#[derive(Parser)]
#[command(
    name = "gamedeck",
    about = "Browse cached casino game catalogs",
    version,
    long_about = "A command-line client for a game catalog endpoint. Catalogs are fetched in one bulk request per scope and device class, cached on disk, then filtered and paged locally."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(flatten)]
    global: GlobalOptions,

    /// Output format
    #[arg(
        short = 'o',
        long = "format",
        value_enum,
        global = true,
        default_value = "text"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show one filtered page of a catalog
    Browse(BrowseArgs),

    /// List the providers in a catalog
    Providers(CatalogTarget),

    /// Manage the persisted catalog cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.global.load_config()?;

    match cli.command {
        Commands::Browse(args) => commands::browse::handle(args, config, cli.format).await?,
        Commands::Providers(target) => {
            commands::providers::handle(target, config, cli.format).await?;
        }
        Commands::Cache(cmd) => commands::cache::handle(cmd, config, cli.format).await?,
    }

    Ok(())
}
