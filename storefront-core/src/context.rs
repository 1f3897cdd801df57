//! Server context built once at startup and handed to Rocket as managed state

use crate::{
    args::Args,
    cors,
    utils::{
        self,
        ReleaseEnvironment,
    },
};
use std::net::{
    IpAddr,
    Ipv4Addr,
};

/// Everything the gates and controllers read from configuration
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub allowed_origins: Vec<String>,
    pub jwt_secret: Option<String>,
    /// token lifetime in seconds
    pub token_ttl: i64,
    pub mongo_uri: Option<String>,
    pub mongo_db_name: String,
    pub host: IpAddr,
    pub port: u16,
    pub release_env: ReleaseEnvironment,
}

impl Default for ServerContext {
    fn default() -> Self {
        ServerContext {
            allowed_origins: vec![String::from(crate::DEFAULT_CORS_ORIGIN)],
            jwt_secret: None,
            token_ttl: 60 * 60,
            mongo_uri: None,
            mongo_db_name: String::from(crate::DEFAULT_DB_NAME),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: crate::DEFAULT_APP_PORT,
            release_env: ReleaseEnvironment::Development,
        }
    }
}

/// A blank `CORS_ORIGIN` counts as unset
fn allowed_origins(raw: &str) -> Vec<String> {
    let origins = cors::parse_origins(raw);
    if origins.is_empty() {
        cors::parse_origins(crate::DEFAULT_CORS_ORIGIN)
    } else {
        origins
    }
}

impl ServerContext {
    pub fn from_args(args: &Args) -> Self {
        ServerContext {
            allowed_origins: allowed_origins(&args.cors_origin),
            jwt_secret: args.jwt_secret.clone().filter(|s| !s.is_empty()),
            token_ttl: args.token_timeout.saturating_mul(60),
            mongo_uri: args.mongo_uri.clone().filter(|s| !s.is_empty()),
            mongo_db_name: String::from(&args.mongo_db_name),
            host: args.host,
            port: args.port,
            release_env: utils::parse_release_env(&args.release_env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn from_args_test() {
        let args = Args::parse_from([
            "storefront",
            "--cors-origin",
            "http://a.test, http://b.test,",
            "--jwt-secret",
            "",
            "--token-timeout",
            "5",
            "--release-env",
            "prod",
        ]);
        let ctx = ServerContext::from_args(&args);
        assert_eq!(ctx.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(ctx.jwt_secret, None);
        assert_eq!(ctx.token_ttl, 300);
        assert_eq!(ctx.release_env, ReleaseEnvironment::Production);
    }

    #[test]
    fn blank_cors_origin_test() {
        for raw in ["", " , ,"] {
            let args = Args::parse_from(["storefront", "--cors-origin", raw]);
            let ctx = ServerContext::from_args(&args);
            assert_eq!(ctx.allowed_origins, vec![crate::DEFAULT_CORS_ORIGIN]);
            assert!(cors::is_allowed(Some("http://localhost:5173"), &ctx.allowed_origins));
        }
    }

    #[test]
    fn token_ttl_test() {
        let args = Args::parse_from(["storefront", "--token-timeout", "525600"]);
        assert_eq!(ServerContext::from_args(&args).token_ttl, 525_600 * 60);
        let args = Args {
            token_timeout: i64::MAX,
            ..Args::parse_from(["storefront"])
        };
        assert_eq!(ServerContext::from_args(&args).token_ttl, i64::MAX);
    }
}
