use crate::{services::upload_service::DEFAULT_MAX_UPLOAD_BYTES, store::s3::S3Settings};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::{env, fmt::Display, str::FromStr};

/// Which object store the service talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    S3,
    Local,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(Backend::S3),
            "local" => Ok(Backend::Local),
            other => Err(format!("unknown backend `{}` (expected `s3` or `local`)", other)),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; CLI wins.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub bucket: Option<String>,
    pub region: String,
    pub s3_endpoint: Option<String>,
    pub s3_path_style: bool,
    pub storage_dir: String,
    pub database_url: String,
    pub public_url: String,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Media upload, catalog and streaming API")]
pub struct Args {
    /// Host to bind to (overrides MEDIA_VAULT_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEDIA_VAULT_PORT / PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object store backend: `s3` or `local` (overrides MEDIA_VAULT_BACKEND)
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Bucket name (overrides AWS_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint, e.g. MinIO (overrides MEDIA_VAULT_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Use path-style bucket addressing (overrides MEDIA_VAULT_S3_PATH_STYLE)
    #[arg(long)]
    pub s3_path_style: bool,

    /// Directory for the local backend's payloads (overrides MEDIA_VAULT_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// SQLite URL for the local backend's metadata (overrides MEDIA_VAULT_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public origin of this service, used in local-backend links (overrides MEDIA_VAULT_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Comma-separated CORS origins, `*` for any (overrides MEDIA_VAULT_ALLOWED_ORIGINS)
    #[arg(long)]
    pub allowed_origins: Option<String>,

    /// Upload size ceiling in bytes (overrides MEDIA_VAULT_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Initialise the local backend schema and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::resolve(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge parsed CLI args over values read through `lookup`.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<(Self, bool)> {
        let env_port = match parse_var::<u16>(&lookup, "MEDIA_VAULT_PORT")? {
            Some(port) => port,
            None => parse_var::<u16>(&lookup, "PORT")?.unwrap_or(3000),
        };
        let env_backend = parse_var::<Backend>(&lookup, "MEDIA_VAULT_BACKEND")?.unwrap_or(Backend::S3);
        let env_path_style = parse_var::<bool>(&lookup, "MEDIA_VAULT_S3_PATH_STYLE")?.unwrap_or(false);
        let env_max_upload = parse_var::<usize>(&lookup, "MEDIA_VAULT_MAX_UPLOAD_BYTES")?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let host = args
            .host
            .or_else(|| lookup("MEDIA_VAULT_HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());
        let port = args.port.unwrap_or(env_port);
        let public_url = args
            .public_url
            .or_else(|| lookup("MEDIA_VAULT_PUBLIC_URL"))
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        let allowed_origins = args
            .allowed_origins
            .or_else(|| lookup("MEDIA_VAULT_ALLOWED_ORIGINS"))
            .unwrap_or_else(|| "http://localhost:5003,http://localhost:5173".into());

        let cfg = Self {
            host,
            port,
            backend: args.backend.unwrap_or(env_backend),
            bucket: args.bucket.or_else(|| lookup("AWS_BUCKET_NAME")),
            region: args
                .region
                .or_else(|| lookup("AWS_REGION"))
                .unwrap_or_else(|| "us-east-1".into()),
            s3_endpoint: args.s3_endpoint.or_else(|| lookup("MEDIA_VAULT_S3_ENDPOINT")),
            s3_path_style: args.s3_path_style || env_path_style,
            storage_dir: args
                .storage_dir
                .or_else(|| lookup("MEDIA_VAULT_STORAGE_DIR"))
                .unwrap_or_else(|| "./data/objects".into()),
            database_url: args
                .database_url
                .or_else(|| lookup("MEDIA_VAULT_DATABASE_URL"))
                .unwrap_or_else(|| "sqlite://./data/meta/media_vault.db".into()),
            public_url,
            allowed_origins: split_origins(&allowed_origins),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// S3 connection settings; the bucket is mandatory for this backend.
    pub fn s3_settings(&self) -> Result<S3Settings> {
        let bucket = self
            .bucket
            .clone()
            .filter(|b| !b.is_empty())
            .context("AWS_BUCKET_NAME (or --bucket) is required for the s3 backend")?;
        Ok(S3Settings {
            bucket,
            region: self.region.clone(),
            endpoint_url: self.s3_endpoint.clone(),
            force_path_style: self.s3_path_style,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow!("parsing {} value `{}`: {}", name, value, err)),
        None => Ok(None),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
