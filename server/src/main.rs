//! `postboard` binary: HTTP server plus migration commands.
//!
//! Run from repo root: `cargo run -p postboard-server -- serve --migrate`

use clap::{Parser, Subcommand};
use postboard::{
    app, builtin_migrations, AppConfig, AppState, MemoryPostRepository, Migrator, PgPostRepository,
    PostRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "postboard")]
#[command(author, version, about = "Posts CRUD server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Apply pending migrations before listening
        #[arg(long)]
        migrate: bool,

        /// Keep posts in process memory instead of PostgreSQL
        #[arg(long, conflicts_with = "migrate")]
        memory: bool,
    },

    /// Apply pending migrations
    Migrate,

    /// Revert the most recent migration batch
    Rollback,

    /// Show applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("postboard=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { migrate, memory } => serve(&config, migrate, memory).await,
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = Migrator::new(builtin_migrations())?.migrate(&pool).await?;
            if applied.is_empty() {
                println!("Nothing to migrate.");
            }
            for id in applied {
                println!("Migrated: {}", id);
            }
            Ok(())
        }
        Commands::Rollback => {
            let pool = connect(&config).await?;
            let reverted = Migrator::new(builtin_migrations())?.rollback(&pool).await?;
            if reverted.is_empty() {
                println!("Nothing to rollback.");
            }
            for id in reverted {
                println!("Rolled back: {}", id);
            }
            Ok(())
        }
        Commands::Status => {
            let pool = connect(&config).await?;
            for s in Migrator::new(builtin_migrations())?.status(&pool).await? {
                match s.batch {
                    Some(batch) => println!("Ran     [{}] {}", batch, s.id),
                    None => println!("Pending     {}", s.id),
                }
            }
            Ok(())
        }
    }
}

async fn connect(config: &AppConfig) -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

async fn serve(config: &AppConfig, migrate: bool, memory: bool) -> Result<(), Box<dyn std::error::Error>> {
    let repo: Arc<dyn PostRepository> = if memory {
        tracing::warn!("using in-memory storage; posts are lost on exit");
        Arc::new(MemoryPostRepository::new())
    } else {
        let pool = connect(config).await?;
        if migrate {
            Migrator::new(builtin_migrations())?.migrate(&pool).await?;
        }
        Arc::new(PgPostRepository::new(pool))
    };

    let state = AppState::new(repo, config)?;
    let router = app(state, config.body_limit_bytes);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
