// Recording in-memory doubles of the Storage API collaborators
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use crate::errors::{AppError, Result};
use crate::storage::types::{
    Configuration, ConfigurationRow, ConfigurationSummary, Workspace, WorkspaceConnection,
};
use crate::storage::{ComponentsApi, Encryptor, WorkspacesApi};
use crate::utils::components::ComponentKind;

#[derive(Default)]
pub struct MockComponents {
    configurations: HashMap<String, Configuration>,
    /// Listing order of configuration ids.
    order: Vec<String>,
    failing_rows: Vec<String>,
    pub fetched: Mutex<Vec<(ComponentKind, String)>>,
    pub added: Mutex<Vec<(ComponentKind, Configuration)>>,
    pub added_rows: Mutex<Vec<(ComponentKind, String, ConfigurationRow)>>,
}

impl MockComponents {
    pub fn with_configurations(configurations: Vec<Configuration>) -> Self {
        let order = configurations.iter().map(|c| c.id.clone()).collect();
        Self {
            configurations: configurations.into_iter().map(|c| (c.id.clone(), c)).collect(),
            order,
            ..Default::default()
        }
    }

    pub fn failing_row(mut self, row_id: &str) -> Self {
        self.failing_rows.push(row_id.to_string());
        self
    }

    pub fn added(&self) -> Vec<(ComponentKind, Configuration)> {
        self.added.lock().unwrap().clone()
    }

    pub fn added_rows(&self) -> Vec<(ComponentKind, String, ConfigurationRow)> {
        self.added_rows.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<(ComponentKind, String)> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComponentsApi for MockComponents {
    async fn list_configurations(&self, _kind: ComponentKind) -> Result<Vec<ConfigurationSummary>> {
        Ok(self
            .order
            .iter()
            .map(|id| ConfigurationSummary {
                id: id.clone(),
                name: self.configurations[id].name.clone(),
            })
            .collect())
    }

    async fn get_configuration(&self, kind: ComponentKind, configuration_id: &str) -> Result<Configuration> {
        self.fetched.lock().unwrap().push((kind, configuration_id.to_string()));
        self.configurations
            .get(configuration_id)
            .cloned()
            .ok_or_else(|| AppError::Api {
                status: 404,
                body: format!("Configuration {} not found", configuration_id),
            })
    }

    async fn add_configuration(&self, kind: ComponentKind, configuration: &Configuration) -> Result<()> {
        self.added.lock().unwrap().push((kind, configuration.clone()));
        Ok(())
    }

    async fn add_configuration_row(
        &self,
        kind: ComponentKind,
        configuration_id: &str,
        row: &ConfigurationRow,
    ) -> Result<()> {
        if self.failing_rows.contains(&row.id) {
            return Err(AppError::Api {
                status: 500,
                body: format!("row {} rejected", row.id),
            });
        }
        self.added_rows
            .lock()
            .unwrap()
            .push((kind, configuration_id.to_string(), row.clone()));
        Ok(())
    }
}

pub struct MockWorkspaces {
    connection: WorkspaceConnection,
    pub created: Mutex<usize>,
}

impl MockWorkspaces {
    pub fn returning(connection: WorkspaceConnection) -> Self {
        Self {
            connection,
            created: Mutex::new(0),
        }
    }

    pub fn created(&self) -> usize {
        *self.created.lock().unwrap()
    }
}

#[async_trait]
impl WorkspacesApi for MockWorkspaces {
    async fn create_workspace(&self) -> Result<Workspace> {
        let mut created = self.created.lock().unwrap();
        *created += 1;
        Ok(Workspace {
            id: 755885,
            connection: self.connection.clone(),
        })
    }
}

pub struct MockEncryptor {
    response: std::result::Result<String, u16>,
    pub calls: Mutex<Vec<(ComponentKind, String)>>,
}

impl MockEncryptor {
    pub fn returning(cipher_text: &str) -> Self {
        Self {
            response: Ok(cipher_text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(ComponentKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encryptor for MockEncryptor {
    async fn encrypt(&self, kind: ComponentKind, plaintext: &str) -> Result<String> {
        self.calls.lock().unwrap().push((kind, plaintext.to_string()));
        match &self.response {
            Ok(cipher_text) => Ok(cipher_text.clone()),
            Err(status) => Err(AppError::Api {
                status: *status,
                body: "encryption unavailable".into(),
            }),
        }
    }
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn dispatch(&self) -> tracing::Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::Dispatch::new(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
