// snowflake-writer-migrate/src/storage/client.rs
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    Configuration, ConfigurationRow, ConfigurationSummary, StackIndex, TokenInfo, Workspace,
};
use super::{ComponentsApi, WorkspacesApi};
use crate::config::ProjectConfig;
use crate::errors::{AppError, Result};
use crate::utils::components::ComponentKind;

pub(crate) const TOKEN_HEADER: &str = "X-StorageApi-Token";
pub(crate) const RUN_ID_HEADER: &str = "X-KBC-RunId";
const USER_AGENT: &str = concat!("snowflake-writer-migrate/", env!("CARGO_PKG_VERSION"));

/// Storage API client for one project. Every request carries the project
/// token and the run id of the current migration.
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    pub fn new(project: &ProjectConfig, run_id: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&project.token)
            .map_err(|_| AppError::Config("Storage API token contains invalid characters".into()))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        headers.insert(RUN_ID_HEADER, run_id_header(run_id)?);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: project.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /v2/storage/tokens/verify`. Rejected tokens surface as `AppError::Authorization`.
    pub async fn verify_token(&self) -> Result<TokenInfo> {
        let response = self.http.get(self.url("/v2/storage/tokens/verify")).send().await?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Authorization(api_message(&body)));
        }
        Ok(check_status(response).await?.json().await?)
    }

    /// `GET /v2/storage` -- stack index with the service directory.
    pub async fn index(&self) -> Result<StackIndex> {
        self.send_json(self.http.get(self.url("/v2/storage"))).await
    }

    /// Looks up a service URL (e.g. `encryption`) in the stack's service directory.
    pub async fn service_url(&self, service_id: &str) -> Result<String> {
        let index = self.index().await?;
        index
            .service_url(service_id)
            .map(str::to_string)
            .ok_or_else(|| AppError::ServiceNotFound(service_id.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn configs_url(&self, kind: ComponentKind) -> String {
        self.url(&format!("/v2/storage/components/{}/configs", kind.id()))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = check_status(req.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_ok(&self, req: RequestBuilder) -> Result<()> {
        check_status(req.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ComponentsApi for StorageClient {
    async fn list_configurations(&self, kind: ComponentKind) -> Result<Vec<ConfigurationSummary>> {
        self.send_json(self.http.get(self.configs_url(kind))).await
    }

    async fn get_configuration(&self, kind: ComponentKind, configuration_id: &str) -> Result<Configuration> {
        let url = format!("{}/{}", self.configs_url(kind), configuration_id);
        self.send_json(self.http.get(url)).await
    }

    async fn add_configuration(&self, kind: ComponentKind, configuration: &Configuration) -> Result<()> {
        debug!("POST configuration {} to {}", configuration.id, kind);
        let form = configuration_form(configuration)?;
        self.send_ok(self.http.post(self.configs_url(kind)).form(&form)).await
    }

    async fn add_configuration_row(
        &self,
        kind: ComponentKind,
        configuration_id: &str,
        row: &ConfigurationRow,
    ) -> Result<()> {
        debug!("POST row {} of configuration {} to {}", row.id, configuration_id, kind);
        let url = format!("{}/{}/rows", self.configs_url(kind), configuration_id);
        let form = row_form(row)?;
        self.send_ok(self.http.post(url).form(&form)).await
    }
}

#[async_trait]
impl WorkspacesApi for StorageClient {
    async fn create_workspace(&self) -> Result<Workspace> {
        let req = self
            .http
            .post(self.url("/v2/storage/workspaces"))
            .json(&serde_json::json!({}));
        self.send_json(req).await
    }
}

pub(crate) fn run_id_header(run_id: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(run_id)
        .map_err(|_| AppError::Config(format!("Run id \"{}\" is not a valid header value", run_id)))
}

/// Turns non-2xx responses into `AppError::Api`, keeping the response body for diagnostics.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Storage API errors are `{"error": "...", ...}`; fall back to the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn configuration_form(configuration: &Configuration) -> Result<Vec<(String, String)>> {
    let mut form = vec![
        ("configurationId".to_string(), configuration.id.clone()),
        ("name".to_string(), configuration.name.clone()),
        ("description".to_string(), configuration.description.clone()),
        ("configuration".to_string(), serde_json::to_string(&configuration.configuration)?),
        ("state".to_string(), serde_json::to_string(&configuration.state)?),
    ];
    for row_id in &configuration.rows_sort_order {
        form.push(("rowsSortOrder[]".to_string(), row_id.clone()));
    }
    Ok(form)
}

fn row_form(row: &ConfigurationRow) -> Result<Vec<(String, String)>> {
    Ok(vec![
        ("rowId".to_string(), row.id.clone()),
        ("name".to_string(), row.name.clone()),
        ("description".to_string(), row.description.clone()),
        ("changeDescription".to_string(), row.change_description.clone()),
        ("configuration".to_string(), serde_json::to_string(&row.configuration)?),
        ("state".to_string(), serde_json::to_string(&row.state)?),
        ("isDisabled".to_string(), if row.is_disabled { "1" } else { "0" }.to_string()),
    ])
}
