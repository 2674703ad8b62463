mod config;
mod graphql;
mod http;
mod page;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use hr_attendance::{
    DraftField, EmployeeRepository, Session, encode_data_url, read_data_url,
};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, KeyValueStore, MemoryStore, SlotStore, connect};
use platform_obs::{ObsConfig, init_tracing};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "attendance-server", version, about = "Employee attendance manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP page and GraphQL endpoint.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Add a handful of demo employees, skipping ids already taken.
    Seed {
        #[arg(long, value_name = "FILE", help = "Image used as every demo profile")]
        profile: Option<PathBuf>,
    },
    /// Dump the stored employee collection as JSON.
    Export {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Keep employees in process memory instead of the database")]
    in_memory: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

/// 1x1 transparent PNG.
const DEMO_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

const DEMO_EMPLOYEES: &[[&str; 5]] = &[
    ["101", "Asha Verma", "Female", "HR", "Present"],
    ["102", "Rahul Mehta", "Male", "Finance", "Absent"],
    ["103", "Sam Lee", "Other", "Development", "Present"],
    ["104", "Nina Rossi", "Female", "Marketing", "Present"],
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed { profile } => run_seed(profile).await,
        Command::Export { output } => export(output).await,
        Command::SchemaPrint { output } => schema_print(output),
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

/// Connects and brings the schema up to date.
async fn database_store() -> Result<Arc<dyn KeyValueStore>> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None)
        .await
        .context("failed to apply migrations")?;
    Ok(Arc::new(SlotStore::new(pool)))
}

async fn open_session(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Result<Session> {
    let session = Session::with_notice_ttl(EmployeeRepository::new(store), config.notice_ttl);
    session.hydrate().await?;
    Ok(session)
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let store: Arc<dyn KeyValueStore> = if cmd.in_memory {
        warn!("employees will not outlive this process");
        Arc::new(MemoryStore::new())
    } else {
        database_store().await?
    };
    let session = open_session(store, &config).await?;
    let state = AppState {
        schema: graphql::build_schema(session.clone()),
        session,
        config,
    };
    http::serve((&cmd).into(), state).await
}

async fn run_seed(profile: Option<PathBuf>) -> Result<()> {
    let session = open_session(database_store().await?, &AppConfig::default()).await?;
    let data_url = match profile {
        Some(path) => read_data_url(&path).await?,
        None => encode_data_url(Some("image/png"), DEMO_PNG),
    };

    let mut added = 0usize;
    for [id, name, gender, department, attendance] in DEMO_EMPLOYEES.iter().copied() {
        if session.read(|app| app.find(id).is_some()).await {
            info!(%id, "demo employee already present");
            continue;
        }
        for (field, value) in [
            (DraftField::Id, id),
            (DraftField::Name, name),
            (DraftField::Gender, gender),
            (DraftField::Department, department),
            (DraftField::Attendance, attendance),
            (DraftField::Profile, data_url.as_str()),
        ] {
            session.update_draft(field, value).await;
        }
        session.submit().await?;
        added += 1;
    }
    info!(added, "seed complete");
    Ok(())
}

async fn export(path: Option<PathBuf>) -> Result<()> {
    let pool = setup_pool().await?;
    let repository = EmployeeRepository::new(Arc::new(SlotStore::new(pool)));
    let raw = repository.raw().await?.unwrap_or_else(|| "[]".into());
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("stored employees are not valid JSON")?;
    let pretty = serde_json::to_string_pretty(&value)?;
    match path {
        Some(path) => {
            std::fs::write(&path, format!("{pretty}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "employees exported");
        }
        None => println!("{pretty}"),
    }
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    let session = Session::new(EmployeeRepository::new(Arc::new(MemoryStore::new())));
    let sdl = graphql::build_schema(session).sdl();
    match path {
        Some(path) => {
            std::fs::write(&path, sdl)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "schema written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
