// Wire types of the Storage API endpoints the migration talks to
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form configuration body, holds `parameters` among others.
    #[serde(default = "empty_object")]
    pub configuration: Value,
    #[serde(default)]
    pub rows: Vec<ConfigurationRow>,
    #[serde(default)]
    pub rows_sort_order: Vec<String>,
    #[serde(default = "empty_object")]
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_object")]
    pub configuration: Value,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub change_description: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default = "empty_object")]
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigurationSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub connection: WorkspaceConnection,
}

#[derive(Clone, Default, Deserialize)]
pub struct WorkspaceConnection {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub warehouse: String,
}

impl std::fmt::Debug for WorkspaceConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConnection")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"*****")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub owner: TokenOwner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOwner {
    pub id: u64,
    pub name: String,
    /// Owner may provision Snowflake workspaces.
    #[serde(default)]
    pub has_snowflake: bool,
    #[serde(default)]
    pub default_backend: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackIndex {
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub id: String,
    pub url: String,
}

impl StackIndex {
    pub fn service_url(&self, service_id: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|service| service.id == service_id)
            .map(|service| service.url.as_str())
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
