// Replacement Snowflake credentials minted from a fresh workspace
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{AppError, Result};
use crate::storage::Encryptor;
use crate::storage::types::WorkspaceConnection;
use crate::utils::components::ComponentKind;

pub const PASSWORD_KEY: &str = "password";
/// Keys prefixed with `#` are stored encrypted by the platform.
pub const SECRET_PASSWORD_KEY: &str = "#password";

#[derive(Clone, PartialEq)]
pub enum Password {
    Plain(String),
    Encrypted(String),
}

impl Password {
    pub fn key(&self) -> &'static str {
        match self {
            Password::Plain(_) => PASSWORD_KEY,
            Password::Encrypted(_) => SECRET_PASSWORD_KEY,
        }
    }

    /// The other password key, which the new password supersedes.
    pub fn stale_key(&self) -> &'static str {
        match self {
            Password::Plain(_) => SECRET_PASSWORD_KEY,
            Password::Encrypted(_) => PASSWORD_KEY,
        }
    }

    fn value(&self) -> &str {
        match self {
            Password::Plain(value) | Password::Encrypted(value) => value,
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Plain(_) => f.write_str("Plain(*****)"),
            Password::Encrypted(_) => f.write_str("Encrypted(..)"),
        }
    }
}

/// Contents of `parameters.db` that replace the source writer's credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialBlock {
    pub host: String,
    pub user: String,
    pub password: Password,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
}

impl CredentialBlock {
    pub fn to_db_value(&self) -> Value {
        let mut db = Map::new();
        db.insert("host".into(), Value::from(self.host.as_str()));
        db.insert("user".into(), Value::from(self.user.as_str()));
        db.insert(self.password.key().into(), Value::from(self.password.value()));
        db.insert("database".into(), Value::from(self.database.as_str()));
        db.insert("schema".into(), Value::from(self.schema.as_str()));
        db.insert("warehouse".into(), Value::from(self.warehouse.as_str()));
        Value::Object(db)
    }
}

/// Builds the credential block for a new workspace connection.
///
/// With `encrypt_password` the password goes through the encryption service
/// (one call, errors propagate as-is) and lands under `#password`; otherwise
/// it stays plain under `password`.
pub async fn rehydrate(
    connection: &WorkspaceConnection,
    destination_kind: ComponentKind,
    encryptor: &dyn Encryptor,
    encrypt_password: bool,
) -> Result<CredentialBlock> {
    validate_connection(connection)?;

    let password = if encrypt_password {
        Password::Encrypted(encryptor.encrypt(destination_kind, &connection.password).await?)
    } else {
        Password::Plain(connection.password.clone())
    };

    Ok(CredentialBlock {
        host: connection.host.clone(),
        user: connection.user.clone(),
        password,
        database: connection.database.clone(),
        schema: connection.schema.clone(),
        warehouse: connection.warehouse.clone(),
    })
}

fn validate_connection(connection: &WorkspaceConnection) -> Result<()> {
    let fields: [(&'static str, &String); 6] = [
        ("host", &connection.host),
        ("user", &connection.user),
        ("password", &connection.password),
        ("database", &connection.database),
        ("schema", &connection.schema),
        ("warehouse", &connection.warehouse),
    ];
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((name, _)) => Err(AppError::InvalidWorkspace(*name)),
        None => Ok(()),
    }
}
