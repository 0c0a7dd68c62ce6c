// src/config.rs
use crate::api::{ClientOptions, ProxySettings};
use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PROXY_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
    NOTION_API_BASE_URL,
};
use crate::error::AppError;
use crate::model::{FieldMapping, PropertyRef};
use crate::types::{ApiKey, DatabaseId, NotionId, ValidationError};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Integration token
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-user token; takes precedence over the integration token when set
    #[arg(long, env = "NOTION_USER_TOKEN", hide_env_values = true, global = true)]
    pub user_token: Option<String>,

    /// HTTP proxy host
    #[arg(long, env = "NOTION_PROXY_HOST", global = true)]
    pub proxy_host: Option<String>,

    /// HTTP proxy port (defaults to 80)
    #[arg(long, env = "NOTION_PROXY_PORT", global = true)]
    pub proxy_port: Option<String>,

    /// Override the Notion API root (e.g. for a gateway)
    #[arg(long, env = "NOTION_API_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Write JSON output to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the databases the token can see, sorted by name
    Databases,
    /// Show which properties of a database can fill each task field
    Properties {
        /// Database URL or ID
        database: String,
    },
    /// Translate every record of a database into tasks
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Database URL or ID
    pub database: String,

    /// JSON file mapping task fields to property IDs
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// JSON file listing users as `[{"id", "email", "username"}]`
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Property for the task name
    #[arg(long)]
    pub name_field: Option<String>,

    /// Property for the scheduled start (append `#end` for a range end)
    #[arg(long)]
    pub start_field: Option<String>,

    /// Property for the scheduled finish (append `#end` for a range end)
    #[arg(long)]
    pub finish_field: Option<String>,

    #[arg(long)]
    pub resources_field: Option<String>,

    /// Percent-formatted number property
    #[arg(long)]
    pub percent_field: Option<String>,

    #[arg(long)]
    pub effort_field: Option<String>,

    /// Property to sort records by, ascending
    #[arg(long)]
    pub sort_field: Option<String>,
}

impl SyncArgs {
    /// Mapping file first, then per-field flags on top.
    pub fn field_mapping(&self) -> Result<FieldMapping, AppError> {
        let base = match &self.mapping {
            Some(path) => load_mapping(path)?,
            None => FieldMapping::default(),
        };

        let flag = |raw: &Option<String>| -> Result<Option<PropertyRef>, AppError> {
            raw.as_deref()
                .map(PropertyRef::parse)
                .transpose()
                .map_err(AppError::from)
        };
        let overrides = FieldMapping {
            name: flag(&self.name_field)?,
            start_date: flag(&self.start_field)?,
            finish_date: flag(&self.finish_field)?,
            resources: flag(&self.resources_field)?,
            percent_complete: flag(&self.percent_field)?,
            actual_effort: flag(&self.effort_field)?,
            sort_by: flag(&self.sort_field)?,
        };
        Ok(base.overridden_by(overrides))
    }
}

/// Reads a field mapping from a JSON file.
pub fn load_mapping(path: &Path) -> Result<FieldMapping, AppError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| AppError::JsonParseError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_database_id(input: &str) -> Result<DatabaseId, AppError> {
    Ok(NotionId::parse(input)?)
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub credential: ApiKey,
    pub base_url: Url,
    pub client: ClientOptions,
}

impl ConnectionSettings {
    /// Resolves connection settings from CLI input and environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let credential = resolve_credential(cli.user_token.as_deref(), cli.api_key.as_deref())?;
        let base_url = parse_base_url(cli.base_url.as_deref().unwrap_or(NOTION_API_BASE_URL))?;
        let proxy = resolve_proxy(cli.proxy_host.as_deref(), cli.proxy_port.as_deref())?;

        Ok(Self {
            credential,
            base_url,
            client: ClientOptions {
                proxy,
                connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
                request_timeout: Duration::from_secs(cli.timeout_secs.max(1)),
            },
        })
    }
}

/// A non-blank user token wins over the integration token.
pub fn resolve_credential(
    user_token: Option<&str>,
    integration_token: Option<&str>,
) -> Result<ApiKey, AppError> {
    fn non_blank(token: Option<&str>) -> Option<&str> {
        token.map(str::trim).filter(|t| !t.is_empty())
    }

    if let Some(token) = non_blank(user_token) {
        log::debug!("Using per-user Notion token");
        return Ok(ApiKey::new(token)?);
    }
    match non_blank(integration_token) {
        Some(token) => Ok(ApiKey::new(token)?),
        None => Err(AppError::MissingConfiguration(
            "NOTION_API_KEY environment variable not set".to_string(),
        )),
    }
}

fn resolve_proxy(
    host: Option<&str>,
    port: Option<&str>,
) -> Result<Option<ProxySettings>, AppError> {
    let Some(host) = host.map(str::trim).filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ValidationError::InvalidProxyPort(raw.to_string()))?,
        None => DEFAULT_PROXY_PORT,
    };
    Ok(Some(ProxySettings {
        host: host.to_string(),
        port,
    }))
}

/// Parses the API root, making sure it ends with `/` so joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| {
        ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
