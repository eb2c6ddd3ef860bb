use clap::Parser;
use gatekeeper::{seed, settings, storage, web};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "gatekeeper",
    version,
    about = "Identity and access backend: bearer tokens and RBAC"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Sync a JSON directory file (principals, clients, roles, ...) before serving
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Exit after bootstrap and seeding instead of serving
    #[arg(long)]
    seed_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(
        host = %settings.server.host,
        port = settings.server.port,
        token_lifetime_secs = settings.tokens.lifetime_secs,
        "Loaded configuration"
    );

    // init storage (database + migrations)
    let db = storage::init(&settings.database).await?;

    seed::ensure_superuser(&db, &settings.bootstrap).await?;

    let seed_file = cli.seed.or_else(|| settings.bootstrap.seed_file.clone());
    if let Some(path) = seed_file {
        seed::sync_directory_from_file(&db, &path).await?;
    }

    if cli.seed_only {
        tracing::info!("Seed-only run finished");
        return Ok(());
    }

    web::serve(settings, db).await
}
