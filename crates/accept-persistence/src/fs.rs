//! Snapshots como documentos JSON en disco, uno por identidad de escenario.
//!
//! El nombre de archivo es un slug estable del nombre del escenario, de modo
//! que un run posterior (otro proceso) encuentre el snapshot sin compartir
//! estado. `restore` separa "no hay archivo" (NotFound) de "archivo
//! ilegible o de otra versión" (Corrupt): la primera es una sesión de
//! debugging mal invocada, la segunda un snapshot dañado.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use accept_core::{SnapshotEntry, SnapshotError, SnapshotStore};

use crate::config::SnapshotConfig;

/// Versión del formato en disco; un mismatch en restore es Corrupt, no un
/// intento de migración silenciosa.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDoc {
    version: u32,
    identity: String,
    run_id: Uuid,
    created_at: DateTime<Utc>,
    entries: Vec<SnapshotEntry>,
}

pub struct FsSnapshotStore {
    dir: PathBuf,
    run_id: Uuid,
}

impl FsSnapshotStore {
    /// Crea el store asegurando el directorio de snapshots.
    pub fn create(config: &SnapshotConfig) -> Result<Self, SnapshotError> {
        fs::create_dir_all(&config.dir).map_err(|e| {
            SnapshotError::Io(format!("cannot create {}: {e}", config.dir.display()))
        })?;
        Ok(Self { dir: config.dir.clone(), run_id: Uuid::new_v4() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, identity: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug(identity)))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn persist(&self, identity: &str, entries: Vec<SnapshotEntry>) -> Result<(), SnapshotError> {
        let doc = SnapshotDoc {
            version: SNAPSHOT_FORMAT_VERSION,
            identity: identity.to_string(),
            run_id: self.run_id,
            created_at: Utc::now(),
            entries,
        };
        let path = self.path_for(identity);
        let json = serde_json::to_vec_pretty(&doc)
            .map_err(|e| SnapshotError::Serialize(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| SnapshotError::Io(format!("cannot write {}: {e}", path.display())))?;
        debug!(identity, path = %path.display(), "snapshot written");
        Ok(())
    }

    fn restore(&self, identity: &str) -> Result<Vec<SnapshotEntry>, SnapshotError> {
        let path = self.path_for(identity);
        if !path.exists() {
            return Err(SnapshotError::NotFound { identity: identity.to_string() });
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| SnapshotError::Io(format!("cannot read {}: {e}", path.display())))?;
        let doc: SnapshotDoc = serde_json::from_str(&raw).map_err(|e| SnapshotError::Corrupt {
            identity: identity.to_string(),
            reason: e.to_string(),
        })?;
        if doc.version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::Corrupt {
                identity: identity.to_string(),
                reason: format!(
                    "format version {} (supported: {SNAPSHOT_FORMAT_VERSION})",
                    doc.version
                ),
            });
        }
        Ok(doc.entries)
    }
}

/// Slug estable y legible: minúsculas, alfanumérico, guiones colapsados.
fn slug(identity: &str) -> String {
    let mut out = String::with_capacity(identity.len());
    let mut last_dash = true;
    for c in identity.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("snapshot");
    }
    out
}
