//! core command line arguments
//!
//! Every flag can also be supplied through the environment variable
//! named next to it. A `.env` file in the working directory is loaded
//! before parsing.
use clap::Parser;
use std::net::IpAddr;

/// cmd line args
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// set release environment
    #[arg(
        short,
        long,
        env = "RELEASE_ENV",
        help = "Set release environment (dev, prod)",
        default_value = "dev"
    )]
    pub release_env: String,
    /// Comma separated allow-list for cross-origin requests
    #[arg(
        long,
        env = "CORS_ORIGIN",
        help = "Comma separated list of allowed origins.",
        default_value = crate::DEFAULT_CORS_ORIGIN
    )]
    pub cors_origin: String,
    /// Shared secret for signing and verifying bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true, help = "JWT signing secret.")]
    pub jwt_secret: Option<String>,
    /// Document store connection string
    #[arg(
        long,
        env = "MONGO_URI",
        hide_env_values = true,
        help = "MongoDB connection string."
    )]
    pub mongo_uri: Option<String>,
    /// Database name used when the connection string has none
    #[arg(
        long,
        env = "MONGO_DB_NAME",
        help = "MongoDB database name fallback.",
        default_value = crate::DEFAULT_DB_NAME
    )]
    pub mongo_db_name: String,
    /// Token expiration in minutes, at most one year
    #[arg(
        short,
        long,
        env = "TOKEN_TIMEOUT",
        help = "Set the token expiration limit in minutes.",
        value_parser = clap::value_parser!(i64).range(1..=crate::MAX_TOKEN_TIMEOUT),
        default_value = "60"
    )]
    pub token_timeout: i64,
    /// Application port
    #[arg(long, env = "PORT", help = "Set app port", default_value_t = crate::DEFAULT_APP_PORT)]
    pub port: u16,
    /// Bind address
    #[arg(long, env = "HOST", help = "Set app bind address", default_value = "0.0.0.0")]
    pub host: IpAddr,
}

impl Args {
    /// Load `.env` (if any) and parse the process arguments
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Args::parse()
    }
}

// Tests
//-------------------------------------------------------------------------------
