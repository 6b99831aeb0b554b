//! Server configuration: command-line flags, each also readable from the environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Address book HTTP server
#[derive(Debug, Clone, Parser)]
#[command(name = "address-server", version)]
pub struct ServerConfig {
    /// SQLite database file, created on first start
    #[arg(long, env = "ADDRESS_BOOK_DATABASE", default_value = "addresses.db")]
    pub database: PathBuf,

    /// Socket address to listen on
    #[arg(long, env = "ADDRESS_BOOK_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "ADDRESS_BOOK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "ADDRESS_BOOK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Emit console logs as JSON
    #[arg(long, env = "ADDRESS_BOOK_JSON_LOGS")]
    pub json_logs: bool,
}
