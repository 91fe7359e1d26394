// ── JSON snapshot persistence ──
//
// The whole store is one JSON document. Writes go to a sibling temp file
// which is then renamed over the target, so a crash mid-write leaves the
// previous snapshot intact.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Sequences;
use crate::error::CoreError;
use crate::model::{Cliente, Contrato, Instalacion, Plan, Router};

/// Format version written into every snapshot.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Serialized form of the entire store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    #[serde(default)]
    pub sequences: Sequences,
    #[serde(default)]
    pub clientes: Vec<Cliente>,
    #[serde(default)]
    pub planes: Vec<Plan>,
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub contratos: Vec<Contrato>,
    #[serde(default)]
    pub instalaciones: Vec<Instalacion>,
}

/// Read a snapshot. A missing file is an empty store.
pub(crate) fn load(path: &Path) -> Result<Option<StoreSnapshot>, CoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no store file yet, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
    if snapshot.version > STORE_FORMAT_VERSION {
        return Err(CoreError::Internal(format!(
            "store file {} has format version {}, newer than supported {STORE_FORMAT_VERSION}",
            path.display(),
            snapshot.version
        )));
    }
    Ok(Some(snapshot))
}

/// Write a snapshot atomically (temp file + rename).
pub(crate) fn save(path: &Path, snapshot: &StoreSnapshot) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    debug!(path = %path.display(), "store snapshot written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let snapshot = StoreSnapshot {
            version: STORE_FORMAT_VERSION,
            sequences: Sequences {
                instalacion: 4,
                contrato: 2,
            },
            ..StoreSnapshot::default()
        };
        save(&path, &snapshot).unwrap();
        let back = load(&path).unwrap().unwrap();
        assert_eq!(back.sequences, snapshot.sequences);
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());
    }

    #[test]
    fn newer_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"version": 99}"#).unwrap();
        assert!(matches!(load(&path), Err(CoreError::Internal(_))));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(CoreError::Serialization(_))));
    }
}
