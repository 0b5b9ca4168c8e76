use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Parser, Debug, Clone)]
#[command(name = "shelfwatch-node", about = "Dairy shelf-life tracking service")]
pub struct Cli {
    /// HTTP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8001)]
    pub port: u16,

    /// PostgreSQL connection URL. Without it products live in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 8)]
    pub pool_size: usize,

    /// Comma-separated allowed CORS origins ("*" allows any).
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
        cors_layer(&self.cors_origins)
    }
}

pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins: Vec<&str> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    let allow_origin = if origins.is_empty() || origins.contains(&"*") {
        AllowOrigin::from(Any)
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["shelfwatch-node", "--port", "9000"]).unwrap();
        assert_eq!(cli.listen_addr().port(), 9000);
        assert!(!cli.cors_origins.is_empty());
        assert!(cli.cors_layer().is_ok());
    }

    #[test]
    fn origin_list() {
        let cli = Cli::try_parse_from([
            "shelfwatch-node",
            "--cors-origins",
            "http://localhost:3000,https://dairy.example",
        ])
        .unwrap();
        assert_eq!(cli.cors_origins.len(), 2);
        assert!(cli.cors_layer().is_ok());
    }

    #[test]
    fn bad_origin_rejected() {
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
