// Merges new credentials into a copy of the source configuration
use serde_json::{Map, Value};

use super::credentials::CredentialBlock;
use crate::storage::types::Configuration;

/// Returns a copy of `source` with `block` deep-merged into
/// `configuration.parameters.db`. Keys outside the block stay as they are,
/// except the superseded password key, which is dropped.
pub fn merge(source: &Configuration, block: &CredentialBlock) -> Configuration {
    let mut merged = source.clone();

    let db = object_entry(object_entry(&mut merged.configuration, "parameters"), "db");
    deep_merge(db, &block.to_db_value());
    if let Value::Object(db) = db {
        db.remove(block.password.stale_key());
    }

    merged
}

/// Recursive replace: objects merge key by key, anything else is overwritten.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Child object under `key`, created (or replacing a non-object) when needed.
fn object_entry<'a>(value: &'a mut Value, key: &str) -> &'a mut Value {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let child = &mut value[key];
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    child
}
