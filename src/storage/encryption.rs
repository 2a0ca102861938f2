// snowflake-writer-migrate/src/storage/encryption.rs
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tracing::debug;

use super::Encryptor;
use super::client::{RUN_ID_HEADER, check_status, run_id_header};
use crate::errors::Result;
use crate::utils::components::ComponentKind;

/// Client of the stack's encryption service.
pub struct EncryptionClient {
    http: reqwest::Client,
    base_url: String,
}

impl EncryptionClient {
    pub fn new(base_url: &str, run_id: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(RUN_ID_HEADER, run_id_header(run_id)?);
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Encryptor for EncryptionClient {
    /// `POST /encrypt?componentId=...` with a plain-text body; the response body is the cipher text.
    async fn encrypt(&self, kind: ComponentKind, plaintext: &str) -> Result<String> {
        debug!("Encrypting secret for component {}", kind);
        let response = self
            .http
            .post(format!("{}/encrypt", self.base_url))
            .query(&[("componentId", kind.id())])
            .header(CONTENT_TYPE, "text/plain")
            .body(plaintext.to_string())
            .send()
            .await?;
        Ok(check_status(response).await?.text().await?)
    }
}
