//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, StoredDoc};
use crate::{Error, Result, backend::StoreError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

#[derive(Serialize, Deserialize)]
struct SerializableStore {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    docs: HashMap<String, StoredDoc>,
}

pub(crate) async fn save_to_file<P: AsRef<Path>>(store: &InMemory, path: P) -> Result<()> {
    let docs = store.docs.read().await.clone();
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        docs,
    };

    let json = serde_json::to_string_pretty(&serializable)?;
    tokio::fs::write(path, json).await.map_err(|e| -> Error {
        StoreError::Unavailable {
            reason: format!("failed to write store file: {e}"),
        }
        .into()
    })
}

pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableStore = serde_json::from_str(&json)?;
            Ok(InMemory {
                docs: RwLock::new(serializable.docs),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(StoreError::Unavailable {
            reason: format!("failed to read store file: {e}"),
        }
        .into()),
    }
}
