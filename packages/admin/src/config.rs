use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

use crate::entity::EntityKind;
use crate::utils::hash::HashCost;

/// Document store connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Connection string. Required: there is deliberately no default.
    pub uri: String,
    /// Logical database name. Default: "Portfolio".
    #[serde(default = "default_database_name")]
    pub name: String,
    /// Connect and server-selection timeout in seconds. Default: 10.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-operation timeout in seconds. Default: 30.
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

fn default_database_name() -> String {
    "Portfolio".into()
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_operation_timeout_secs() -> u64 {
    30
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Input files for the bulk loaders.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Default: "blogs.json".
    #[serde(default = "default_blogs_file")]
    pub blogs_file: PathBuf,
    /// Default: "projects.json".
    #[serde(default = "default_projects_file")]
    pub projects_file: PathBuf,
}

fn default_blogs_file() -> PathBuf {
    "blogs.json".into()
}
fn default_projects_file() -> PathBuf {
    "projects.json".into()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            blogs_file: default_blogs_file(),
            projects_file: default_projects_file(),
        }
    }
}

impl SeedConfig {
    pub fn source_file(&self, kind: EntityKind) -> PathBuf {
        match kind {
            EntityKind::Blogs => self.blogs_file.clone(),
            EntityKind::Projects => self.projects_file.clone(),
        }
    }
}

/// Defaults for `move-user`.
#[derive(Debug, Deserialize, Clone)]
pub struct TransferConfig {
    /// Database the user is copied from. Default: "content_platform".
    #[serde(default = "default_source_database")]
    pub source_database: String,
    /// Username to copy when none is given on the command line.
    #[serde(default)]
    pub username: Option<String>,
}

fn default_source_database() -> String {
    "content_platform".into()
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            source_database: default_source_database(),
            username: None,
        }
    }
}

/// Password hashing cost.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Argon2 iteration count. Default: 12.
    #[serde(default = "default_work_factor")]
    pub work_factor: u32,
    /// Argon2 memory cost in KiB. Default: 19456.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
}

fn default_work_factor() -> u32 {
    12
}
fn default_memory_kib() -> u32 {
    19_456
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            work_factor: default_work_factor(),
            memory_kib: default_memory_kib(),
        }
    }
}

impl AuthConfig {
    pub fn cost(&self) -> HashCost {
        HashCost {
            work_factor: self.work_factor,
            memory_kib: self.memory_kib,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load from `config/folio.{toml,yaml,json}` (or the path in `FOLIO_CONFIG`),
    /// then apply environment overrides such as `FOLIO__DATABASE__URI`.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| "config/folio".to_string());
        Self::load_with(File::with_name(&config_path).required(false))
    }

    pub fn load_with<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
