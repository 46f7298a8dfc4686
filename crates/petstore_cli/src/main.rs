//! Pet registry server entry point.
//!
//! # Responsibility
//! - Resolve configuration from an optional JSON file plus flag overrides.
//! - Build the injected logger, bootstrap storage, and serve `/pets`.
//!
//! # Usage
//! ```bash
//! petstore [--config petstore.json] [--host 127.0.0.1] [--port 8080] \
//!          [--db petstore.sqlite3] [--log-level info] [--log-dir /var/log/petstore]
//! ```

use clap::Parser;
use petstore_api::{serve, ServerConfig};
use petstore_core::{install_panic_hook, CoreLogger, SqliteConnectionSource, SqlitePetRepository};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Pet registry HTTP backend
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (default: 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (default: petstore.sqlite3)
    #[arg(long)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (default: stderr)
    #[arg(long)]
    log_dir: Option<String>,
}

impl Args {
    fn resolve(self) -> Result<ServerConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config = config.with_host(host);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(db) = self.db {
            config = config.with_db_path(db);
        }
        if let Some(level) = self.log_level {
            config = config.with_log_level(level);
        }
        if let Some(dir) = self.log_dir {
            config = config.with_log_dir(dir);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("petstore: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = args.resolve()?;
    let addr = config.socket_addr()?;

    let logger = match config.log_dir.as_deref() {
        Some(dir) => CoreLogger::to_files(&config.log_level, dir)?,
        None => CoreLogger::to_stderr(&config.log_level)?,
    };
    install_panic_hook(&logger);

    let source = SqliteConnectionSource::open(&config.db_path, &logger)?;
    let repo = SqlitePetRepository::try_new(source, logger.clone())?;

    serve(addr, Arc::new(repo), logger).await?;
    Ok(())
}
