use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Whether the commerce extension is active, exposing products.
    pub commerce_enabled: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "SEO metadata API for content items")]
pub struct Args {
    /// Host to bind to (overrides SEO_META_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SEO_META_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Content database URL (overrides SEO_META_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Secret used to verify bearer tokens (overrides SEO_META_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Expose products (overrides SEO_META_COMMERCE_ENABLED)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub commerce_enabled: Option<bool>,

    /// Create the content tables and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let cfg = Self::merge(args.clone_overrides(), |key| env::var(key))?;
        Ok((cfg, args.migrate))
    }

    /// Merge CLI overrides over values read through `var`.
    fn merge<F>(overrides: Overrides, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let env_host = var("SEO_META_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match var("SEO_META_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing SEO_META_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading SEO_META_PORT"),
        };
        let env_db =
            var("SEO_META_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/content.db".into());
        let env_commerce = match var("SEO_META_COMMERCE_ENABLED") {
            Ok(value) => parse_flag(&value)
                .with_context(|| format!("parsing SEO_META_COMMERCE_ENABLED value `{}`", value))?,
            Err(env::VarError::NotPresent) => false,
            Err(err) => return Err(err).context("reading SEO_META_COMMERCE_ENABLED"),
        };

        let jwt_secret = match overrides.jwt_secret {
            Some(secret) => secret,
            None => var("SEO_META_JWT_SECRET").unwrap_or_default(),
        };
        if jwt_secret.is_empty() {
            bail!("a JWT secret is required (--jwt-secret or SEO_META_JWT_SECRET)");
        }

        Ok(Self {
            host: overrides.host.unwrap_or(env_host),
            port: overrides.port.unwrap_or(env_port),
            database_url: overrides.database_url.unwrap_or(env_db),
            jwt_secret,
            commerce_enabled: overrides.commerce_enabled.unwrap_or(env_commerce),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("commerce_enabled", &self.commerce_enabled)
            .finish()
    }
}

/// Values given on the command line, each overriding its environment variable.
#[derive(Debug, Default)]
struct Overrides {
    host: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    commerce_enabled: Option<bool>,
}

impl Args {
    fn clone_overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            database_url: self.database_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            commerce_enabled: self.commerce_enabled,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got `{}`", other),
    }
}
