use crate::errors::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use tracing::{error, warn};

/// String-keyed JSON document, the on-disk stand-in for browser local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage {
    entries: BTreeMap<String, Value>,
}

impl Storage {
    pub fn get_item(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove_item(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Reads a JSON array stored under `key`. Missing or malformed data is an empty list.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(value) = self.entries.get(key) else {
            return Vec::new();
        };
        match serde_json::from_value(value.clone()) {
            Ok(items) => items,
            Err(err) => {
                warn!(key, "ignoring malformed stored list: {err}");
                Vec::new()
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(key.into(), value);
        Ok(())
    }
}

pub async fn load_data(path: &Path) -> Storage {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Storage::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Storage::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Storage::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &Storage) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_list_reads_as_empty() {
        let mut storage = Storage::default();
        storage.set_item("broken", json!({ "not": "a list" }));

        let items: Vec<u32> = storage.get_list("broken");
        assert!(items.is_empty());

        let missing: Vec<u32> = storage.get_list("missing");
        assert!(missing.is_empty());
    }

    #[test]
    fn document_serializes_as_plain_object() {
        let mut storage = Storage::default();
        storage.set_item("running-crew-theme", json!("light"));
        storage.set_json("numbers", &[1, 2, 3]).unwrap();

        let encoded = serde_json::to_value(&storage).unwrap();
        assert_eq!(
            encoded,
            json!({ "numbers": [1, 2, 3], "running-crew-theme": "light" })
        );
        assert_eq!(storage.get_str("running-crew-theme"), Some("light"));
        assert_eq!(storage.get_list::<u32>("numbers"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let mut path = std::env::temp_dir();
        path.push(format!("running_crew_missing_{}.json", std::process::id()));
        let storage = load_data(&path).await;
        assert_eq!(storage, Storage::default());
    }

    #[tokio::test]
    async fn persist_then_load_keeps_entries() {
        let mut path = std::env::temp_dir();
        path.push(format!("running_crew_storage_{}.json", std::process::id()));

        let mut storage = Storage::default();
        storage.set_item("running-crew-auth", json!("secret"));
        persist_data(&path, &storage).await.unwrap();

        let loaded = load_data(&path).await;
        assert_eq!(loaded.get_str("running-crew-auth"), Some("secret"));
        let _ = std::fs::remove_file(&path);
    }
}
