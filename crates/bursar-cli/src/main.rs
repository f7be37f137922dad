//! # bursar CLI Entry Point
//!
//! Assembles subcommands and dispatches to handlers.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rusqlite::Connection;

use bursar_api::AppState;
use bursar_ledger::init_schema;

/// Bursar — school fee ledger and discount resolution engine.
///
/// Serves the fee HTTP API and manages the underlying database.
#[derive(Parser, Debug)]
#[command(name = "bursar", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Create or migrate the database schema, then exit.
    InitDb(DbArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "BURSAR_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    #[command(flatten)]
    db: DbArgs,
}

#[derive(clap::Args, Debug)]
struct DbArgs {
    /// SQLite database path.
    #[arg(long, env = "BURSAR_DB", default_value = "bursar.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::InitDb(args) => {
            open_db(&args.db)?;
            tracing::info!(db = %args.db.display(), "schema initialized");
            Ok(())
        }
    }
}

fn open_db(path: &PathBuf) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    init_schema(&conn).context("initializing schema")?;
    Ok(conn)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let conn = open_db(&args.db.db)?;
    let app = bursar_api::app(AppState::new(conn));
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    tracing::info!(listen = %args.listen, db = %args.db.db.display(), "bursar api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
