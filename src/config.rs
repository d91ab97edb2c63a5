use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt};

use crate::services::s3_store::S3Settings;

/// What the file resolver does when a stat fails for a reason other than
/// "no such key".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatFailureMode {
    /// Log and carry on with directory resolution, as if the key were absent.
    #[default]
    FallThrough,
    /// Log and answer 502 Bad Gateway.
    ServerError,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub on_stat_error: StatFailureMode,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse an S3-compatible bucket like a file server")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_BROWSER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_BROWSER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket to expose (overrides BUCKET_BROWSER_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Object store endpoint, e.g. http://minio:9000 (overrides BUCKET_BROWSER_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Signing region (overrides BUCKET_BROWSER_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Access key (overrides BUCKET_BROWSER_ACCESS_KEY)
    #[arg(long)]
    pub access_key: Option<String>,

    /// Secret key (overrides BUCKET_BROWSER_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Behaviour when stat fails for reasons other than a missing key
    /// (overrides BUCKET_BROWSER_ON_STAT_ERROR)
    #[arg(long, value_enum)]
    pub on_stat_error: Option<StatFailureMode>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("BUCKET_BROWSER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKET_BROWSER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKET_BROWSER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8080,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_PORT"),
        };
        let env_bucket = env::var("BUCKET_BROWSER_BUCKET").unwrap_or_else(|_| "mirror".into());
        let env_endpoint =
            env::var("BUCKET_BROWSER_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:9000".into());
        let env_region = env::var("BUCKET_BROWSER_REGION").unwrap_or_else(|_| "us-east-1".into());
        let env_access = env::var("BUCKET_BROWSER_ACCESS_KEY").ok();
        let env_secret = env::var("BUCKET_BROWSER_SECRET_KEY").ok();
        let env_stat_mode = match env::var("BUCKET_BROWSER_ON_STAT_ERROR") {
            Ok(value) => StatFailureMode::from_str(&value, true).map_err(|reason| {
                anyhow::anyhow!("parsing BUCKET_BROWSER_ON_STAT_ERROR value `{}`: {}", value, reason)
            })?,
            Err(env::VarError::NotPresent) => StatFailureMode::default(),
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_ON_STAT_ERROR"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            bucket: args.bucket.unwrap_or(env_bucket),
            endpoint: normalize_endpoint(&args.endpoint.unwrap_or(env_endpoint)),
            region: args.region.unwrap_or(env_region),
            access_key: args.access_key.or(env_access),
            secret_key: args.secret_key.or(env_secret),
            on_stat_error: args.on_stat_error.unwrap_or(env_stat_mode),
        };

        if cfg.bucket.is_empty() {
            bail!("bucket name must not be empty");
        }
        if cfg.access_key.is_some() != cfg.secret_key.is_some() {
            bail!("access key and secret key must be given together");
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            bucket: self.bucket.clone(),
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("on_stat_error", &self.on_stat_error)
            .finish()
    }
}

/// Bare `host:port` endpoints are plain HTTP.
fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<AppConfig> {
        let mut full = vec!["bucket-browser"];
        full.extend_from_slice(argv);
        AppConfig::from_args(Args::try_parse_from(full)?)
    }

    #[test]
    fn cli_values_are_used() {
        let cfg = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "9999",
            "--bucket",
            "assets",
            "--endpoint",
            "minio:9000",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
            "--on-stat-error",
            "server-error",
        ])
        .unwrap();

        assert_eq!(cfg.addr(), "127.0.0.1:9999");
        assert_eq!(cfg.bucket, "assets");
        assert_eq!(cfg.endpoint, "http://minio:9000");
        assert_eq!(cfg.on_stat_error, StatFailureMode::ServerError);
        assert_eq!(cfg.s3_settings().access_key.as_deref(), Some("ak"));
    }

    #[test]
    fn half_a_credential_pair_is_rejected() {
        assert!(parse(&["--bucket", "b", "--access-key", "ak"]).is_err());
    }

    #[test]
    fn unknown_stat_mode_is_rejected() {
        assert!(parse(&["--on-stat-error", "panic"]).is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = parse(&["--bucket", "b", "--access-key", "ak", "--secret-key", "hunter2"]).unwrap();
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn endpoints_keep_their_scheme() {
        assert_eq!(normalize_endpoint("https://s3.example.com/"), "https://s3.example.com");
        assert_eq!(normalize_endpoint("10.0.0.5:9000"), "http://10.0.0.5:9000");
    }
}
