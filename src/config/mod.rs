// snowflake-writer-migrate/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::AppError;
use crate::utils::components::ComponentKind;

pub const DEFAULT_SOURCE_URL: &str = "https://connection.keboola.com";
pub const CONFIG_FILE_NAME: &str = "config.json";

// Structs for deserializing config.json
#[derive(Debug, Clone, Deserialize)]
pub struct RawJsonConfig {
    pub parameters: Option<RawParameters>,
    #[serde(default)]
    pub image_parameters: Option<RawImageParameters>,
}

#[derive(Clone, Deserialize)]
pub struct RawParameters {
    #[serde(rename = "sourceKbcUrl")]
    pub source_kbc_url: Option<String>,
    #[serde(rename = "#sourceKbcToken")]
    pub source_kbc_token: Option<String>,
    #[serde(rename = "dryRun")]
    pub dry_run: Option<bool>,
    #[serde(rename = "skipRehydrationIfNotEntitled")]
    pub skip_rehydration_if_not_entitled: Option<bool>,
    #[serde(rename = "encryptPassword")]
    pub encrypt_password: Option<bool>,
}

impl fmt::Debug for RawParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawParameters")
            .field("source_kbc_url", &self.source_kbc_url)
            .field("source_kbc_token", &self.source_kbc_token.as_ref().map(|_| "*****"))
            .field("dry_run", &self.dry_run)
            .field("skip_rehydration_if_not_entitled", &self.skip_rehydration_if_not_entitled)
            .field("encrypt_password", &self.encrypt_password)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImageParameters {
    #[serde(rename = "componentId")]
    pub component_id: Option<String>,
}

// Application's internal configuration structs

/// Connection to a Storage API stack: URL plus token.
#[derive(Clone)]
pub struct ProjectConfig {
    pub url: String,
    pub token: String,
}

impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("url", &self.url)
            .field("token", &"*****")
            .finish()
    }
}

/// Behaviour switches for a single migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub dry_run: bool,
    /// Ship managed writers unchanged when the destination owner cannot
    /// provision Snowflake workspaces.
    pub skip_rehydration_if_not_entitled: bool,
    pub encrypt_password: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        MigrationOptions {
            dry_run: false,
            skip_rehydration_if_not_entitled: true,
            encrypt_password: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrateConfig {
    pub source: ProjectConfig,
    pub destination_component: Option<ComponentKind>,
    pub options: MigrationOptions,
}

#[derive(Debug, Clone)]
pub struct DestinationConfig {
    pub project: ProjectConfig,
    pub run_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub migrate: MigrateConfig,
    pub destination: DestinationConfig,
}

impl AppConfig {
    /// Loads the migration config file and the destination project from the environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        let raw_json_config = load_raw_config(config_path)?;
        let migrate = load_migrate_config_from_json(&raw_json_config)?;
        let destination = load_destination_config_from_env()?;
        Ok(AppConfig { migrate, destination })
    }
}

/// Resolves where config.json lives: explicit path, then `$KBC_DATADIR`, then the working directory.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    match env::var("KBC_DATADIR") {
        Ok(data_dir) if !data_dir.trim().is_empty() => PathBuf::from(data_dir).join(CONFIG_FILE_NAME),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

pub fn load_raw_config(config_path: &Path) -> Result<RawJsonConfig> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    serde_json::from_str(&config_content)
        .map_err(|e| AppError::Config(format!("{} is not valid: {}", config_path.display(), e)))
        .with_context(|| format!("Failed to parse JSON from config file at {}", config_path.display()))
}

pub fn load_migrate_config_from_json(raw_config: &RawJsonConfig) -> Result<MigrateConfig> {
    let parameters = raw_config
        .parameters
        .as_ref()
        .ok_or_else(|| AppError::Config("parameters must be set in config.json".into()))?;

    let source_url = parameters
        .source_kbc_url
        .clone()
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
    if source_url.trim().is_empty() {
        return Err(AppError::Config("parameters.sourceKbcUrl cannot be empty in config.json".into()).into());
    }
    Url::parse(&source_url)
        .map_err(|e| AppError::Config(format!("parameters.sourceKbcUrl \"{}\" is not a valid URL: {}", source_url, e)))?;

    let source_token = parameters
        .source_kbc_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Config("parameters.#sourceKbcToken must be set in config.json".into()))?;

    let destination_component = raw_config
        .image_parameters
        .as_ref()
        .and_then(|image| image.component_id.as_deref())
        .filter(|id| !id.is_empty())
        .map(str::parse::<ComponentKind>)
        .transpose()?;

    let defaults = MigrationOptions::default();
    Ok(MigrateConfig {
        source: ProjectConfig {
            url: source_url.trim_end_matches('/').to_string(),
            token: source_token,
        },
        destination_component,
        options: MigrationOptions {
            dry_run: parameters.dry_run.unwrap_or(defaults.dry_run),
            skip_rehydration_if_not_entitled: parameters
                .skip_rehydration_if_not_entitled
                .unwrap_or(defaults.skip_rehydration_if_not_entitled),
            encrypt_password: parameters.encrypt_password.unwrap_or(defaults.encrypt_password),
        },
    })
}

pub fn load_destination_config_from_env() -> Result<DestinationConfig> {
    destination_config_from_vars(
        env::var("KBC_URL").ok(),
        env::var("KBC_TOKEN").ok(),
        env::var("KBC_RUNID").ok(),
    )
}

fn destination_config_from_vars(
    url: Option<String>,
    token: Option<String>,
    run_id: Option<String>,
) -> Result<DestinationConfig> {
    let url = url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Config("KBC_URL must be set".into()))?;
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Config("KBC_TOKEN must be set".into()))?;
    let run_id = run_id
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Ok(DestinationConfig {
        project: ProjectConfig {
            url: url.trim_end_matches('/').to_string(),
            token,
        },
        run_id,
    })
}
