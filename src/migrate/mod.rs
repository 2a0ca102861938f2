// snowflake-writer-migrate/src/migrate/mod.rs
pub(crate) mod credentials;
pub(crate) mod hosts;
pub(crate) mod logic;
pub(crate) mod transcribe;

#[cfg(test)]
pub(crate) mod mock;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::storage::{ComponentsApi, EncryptionClient, StorageClient};
use crate::utils::components::{resolve_destination_kind, source_components_for};
use logic::{CredentialPlan, MigrateWriter, MigrationApis, MigrationOutcome};

pub const ENCRYPTION_SERVICE_ID: &str = "encryption";

/// Totals over all migrated configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub configurations: usize,
    pub rehydrated: usize,
    /// Managed writers copied unchanged for lack of entitlement.
    pub not_entitled: usize,
    pub rows: usize,
    pub dry_run: bool,
}

impl MigrationSummary {
    pub fn record(&mut self, outcome: &MigrationOutcome) {
        self.configurations += 1;
        self.rows += outcome.rows;
        if outcome.rehydrated {
            self.rehydrated += 1;
        }
        if outcome.plan == CredentialPlan::KeepNotEntitled {
            self.not_entitled += 1;
        }
        self.dry_run |= outcome.dry_run;
    }
}

/// Public entry point for the migration.
///
/// Verifies both projects, resolves which writer kinds to copy from the
/// source stack, then migrates every configuration of those kinds one by
/// one. The first failure aborts the run.
pub async fn run_migrate_flow(app_config: &AppConfig) -> Result<MigrationSummary> {
    let migrate_config = &app_config.migrate;
    let destination = &app_config.destination;

    let source_client = StorageClient::new(&migrate_config.source, &destination.run_id)?;
    let source_token = source_client
        .verify_token()
        .await
        .map_err(|e| authorization_error("source", e))?;

    let destination_client = StorageClient::new(&destination.project, &destination.run_id)?;
    let destination_token = destination_client
        .verify_token()
        .await
        .map_err(|e| authorization_error("destination", e))?;

    info!(
        "Migrating Snowflake writers from project {} ({}) at {}",
        source_token.owner.name,
        source_token.owner.id,
        source_client.base_url()
    );

    let encryption_url = destination_client
        .service_url(ENCRYPTION_SERVICE_ID)
        .await
        .context("Failed to resolve the encryption service of the destination stack")?;
    let encryption_client = EncryptionClient::new(&encryption_url, &destination.run_id)?;

    let apis = MigrationApis {
        source_components: &source_client,
        destination_components: &destination_client,
        destination_workspaces: &destination_client,
        encryptor: &encryption_client,
    };

    let mut summary = MigrationSummary::default();
    for source_kind in source_components_for(&migrate_config.source.url) {
        let destination_kind = resolve_destination_kind(
            *source_kind,
            migrate_config.destination_component,
            destination_token.owner.default_backend.as_deref(),
        );
        let writer = MigrateWriter::new(
            apis,
            *source_kind,
            destination_kind,
            destination_token.owner.has_snowflake,
            migrate_config.options,
        );
        migrate_writers(&source_client, &writer, &mut summary).await?;
    }

    Ok(summary)
}

/// Migrates every configuration of the writer's source kind, in listing order.
pub async fn migrate_writers(
    source_components: &dyn ComponentsApi,
    writer: &MigrateWriter<'_>,
    summary: &mut MigrationSummary,
) -> Result<()> {
    let writers = source_components
        .list_configurations(writer.source_kind())
        .await
        .with_context(|| format!("Failed to list configurations of component {}", writer.source_kind()))?;

    info!(
        "Found {} configuration(s) of {}, migrating to {}",
        writers.len(),
        writer.source_kind(),
        writer.destination_kind()
    );

    for summary_entry in &writers {
        info!("Migration of writer {} ({})", summary_entry.name, summary_entry.id);
        let outcome = writer.migrate_one(&summary_entry.id).await?;
        debug!("Configuration {} done: {:?}", outcome.configuration_id, outcome);
        summary.record(&outcome);
    }
    Ok(())
}

/// Token verification failures are reported to the operator as authorization errors.
fn authorization_error(project: &str, err: AppError) -> anyhow::Error {
    match err {
        AppError::Authorization(message) => {
            AppError::Authorization(format!("Cannot authorize {} project: {}", project, message)).into()
        }
        AppError::Api { status, body } if (400..500).contains(&status) => {
            AppError::Authorization(format!("Cannot authorize {} project: {} {}", project, status, body)).into()
        }
        other => anyhow::Error::new(other).context(format!("Failed to verify {} project token", project)),
    }
}
