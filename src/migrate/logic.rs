// snowflake-writer-migrate/src/migrate/logic.rs
use anyhow::{Context, Result};
use tracing::{info, warn};

use super::credentials::rehydrate;
use super::hosts::is_managed_host;
use super::transcribe::merge;
use crate::config::MigrationOptions;
use crate::storage::types::Configuration;
use crate::storage::{ComponentsApi, Encryptor, WorkspacesApi};
use crate::utils::components::ComponentKind;

/// Collaborators of a writer migration.
#[derive(Clone, Copy)]
pub struct MigrationApis<'a> {
    pub source_components: &'a dyn ComponentsApi,
    pub destination_components: &'a dyn ComponentsApi,
    pub destination_workspaces: &'a dyn WorkspacesApi,
    pub encryptor: &'a dyn Encryptor,
}

/// What happens to the credentials of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPlan {
    /// Customer-operated database, ship as-is.
    Keep,
    /// Managed host, mint new credentials from a destination workspace.
    Rehydrate,
    /// Managed host, but the destination owner cannot provision workspaces.
    KeepNotEntitled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub configuration_id: String,
    pub plan: CredentialPlan,
    /// New credentials were actually written (never in dry-run).
    pub rehydrated: bool,
    pub rows: usize,
    pub dry_run: bool,
}

/// Copies writer configurations of one component kind from the source
/// project into the destination project.
pub struct MigrateWriter<'a> {
    apis: MigrationApis<'a>,
    source_kind: ComponentKind,
    destination_kind: ComponentKind,
    /// Destination owner may create Snowflake workspaces.
    destination_entitled: bool,
    options: MigrationOptions,
}

impl<'a> MigrateWriter<'a> {
    pub fn new(
        apis: MigrationApis<'a>,
        source_kind: ComponentKind,
        destination_kind: ComponentKind,
        destination_entitled: bool,
        options: MigrationOptions,
    ) -> Self {
        Self {
            apis,
            source_kind,
            destination_kind,
            destination_entitled,
            options,
        }
    }

    pub fn source_kind(&self) -> ComponentKind {
        self.source_kind
    }

    pub fn destination_kind(&self) -> ComponentKind {
        self.destination_kind
    }

    pub fn credential_plan(&self, configuration: &Configuration) -> CredentialPlan {
        if !is_managed_host(&configuration.configuration) {
            CredentialPlan::Keep
        } else if self.destination_entitled || !self.options.skip_rehydration_if_not_entitled {
            CredentialPlan::Rehydrate
        } else {
            CredentialPlan::KeepNotEntitled
        }
    }

    /// Migrates one configuration and its rows.
    ///
    /// 1. Fetches the source configuration.
    /// 2. For managed hosts, creates a destination workspace and swaps in its credentials.
    /// 3. Writes the configuration under the destination component.
    /// 4. Writes each row verbatim.
    ///
    /// In dry-run mode every write (workspace included) is replaced by a log line.
    /// Failures are not caught; rows already written stay written.
    pub async fn migrate_one(&self, configuration_id: &str) -> Result<MigrationOutcome> {
        let dry_run = self.options.dry_run;

        let source = self
            .apis
            .source_components
            .get_configuration(self.source_kind, configuration_id)
            .await
            .with_context(|| {
                format!(
                    "Failed to fetch configuration {} of component {}",
                    configuration_id, self.source_kind
                )
            })?;

        let plan = self.credential_plan(&source);
        let mut rehydrated = false;
        let configuration = match plan {
            CredentialPlan::Rehydrate if dry_run => {
                info!("[dry-run] Create workspace for provisioned Snowflake writer");
                source
            }
            CredentialPlan::Rehydrate => {
                let migrated = self.rehydrate_configuration(&source).await?;
                rehydrated = true;
                migrated
            }
            CredentialPlan::KeepNotEntitled => {
                warn!(
                    "Configuration {} uses Keboola-provisioned Snowflake but the destination project cannot create Snowflake workspaces; credentials are copied unchanged",
                    source.id
                );
                source
            }
            CredentialPlan::Keep => source,
        };

        if dry_run {
            info!(
                "[dry-run] Migrate configuration {} (component \"{}\")",
                configuration.id, self.destination_kind
            );
        } else {
            self.apis
                .destination_components
                .add_configuration(self.destination_kind, &configuration)
                .await
                .with_context(|| format!("Failed to create configuration {} in destination project", configuration.id))?;
            info!(
                "✓ Configuration {} migrated to component \"{}\"",
                configuration.id, self.destination_kind
            );
        }

        for row in &configuration.rows {
            if dry_run {
                info!(
                    "[dry-run] Migrate row {} of configuration {} (component \"{}\")",
                    row.id, configuration.id, self.destination_kind
                );
                continue;
            }
            self.apis
                .destination_components
                .add_configuration_row(self.destination_kind, &configuration.id, row)
                .await
                .with_context(|| {
                    format!(
                        "Failed to create row {} of configuration {} in destination project",
                        row.id, configuration.id
                    )
                })?;
            info!("✓ Row {} of configuration {} migrated", row.id, configuration.id);
        }

        Ok(MigrationOutcome {
            configuration_id: configuration.id,
            plan,
            rehydrated,
            rows: configuration.rows.len(),
            dry_run,
        })
    }

    async fn rehydrate_configuration(&self, source: &Configuration) -> Result<Configuration> {
        let workspace = self
            .apis
            .destination_workspaces
            .create_workspace()
            .await
            .with_context(|| format!("Failed to create workspace for configuration {}", source.id))?;
        info!(
            "Created {} workspace {} for configuration {}",
            workspace.connection.backend.as_deref().unwrap_or("database"),
            workspace.id,
            source.id
        );

        let block = rehydrate(
            &workspace.connection,
            self.destination_kind,
            self.apis.encryptor,
            self.options.encrypt_password,
        )
        .await
        .with_context(|| format!("Failed to prepare workspace credentials for configuration {}", source.id))?;

        Ok(merge(source, &block))
    }
}
