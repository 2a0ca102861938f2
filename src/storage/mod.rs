// snowflake-writer-migrate/src/storage/mod.rs
pub(crate) mod client;
pub(crate) mod encryption;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod test_server;

use async_trait::async_trait;

use crate::errors::Result;
use crate::utils::components::ComponentKind;
use types::{Configuration, ConfigurationRow, ConfigurationSummary, Workspace};

pub use client::StorageClient;
pub use encryption::EncryptionClient;

/// Component configurations of one project.
#[async_trait]
pub trait ComponentsApi: Send + Sync {
    async fn list_configurations(&self, kind: ComponentKind) -> Result<Vec<ConfigurationSummary>>;

    async fn get_configuration(&self, kind: ComponentKind, configuration_id: &str) -> Result<Configuration>;

    async fn add_configuration(&self, kind: ComponentKind, configuration: &Configuration) -> Result<()>;

    async fn add_configuration_row(
        &self,
        kind: ComponentKind,
        configuration_id: &str,
        row: &ConfigurationRow,
    ) -> Result<()>;
}

/// Workspace provisioning in the destination project.
#[async_trait]
pub trait WorkspacesApi: Send + Sync {
    async fn create_workspace(&self) -> Result<Workspace>;
}

/// Encryption service scoped to a component.
#[async_trait]
pub trait Encryptor: Send + Sync {
    async fn encrypt(&self, kind: ComponentKind, plaintext: &str) -> Result<String>;
}
