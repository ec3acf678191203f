//! Contrato de almacenamiento de snapshots.
//!
//! El core define el trait y una implementación in-memory para tests; la
//! implementación sobre filesystem vive en `accept-persistence`, igual que
//! el resto de utilidades de configuración de almacenamiento.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::env::SnapshotEntry;
use crate::errors::SnapshotError;

/// Almacenamiento de snapshots por identidad de escenario.
///
/// `persist` sobreescribe el snapshot previo de la misma identidad (eso es
/// justamente lo que pide la directiva persist). `restore` debe distinguir
/// "no hay snapshot" de "snapshot ilegible".
pub trait SnapshotStore: Send + Sync {
    fn persist(&self, identity: &str, entries: Vec<SnapshotEntry>) -> Result<(), SnapshotError>;
    fn restore(&self, identity: &str) -> Result<Vec<SnapshotEntry>, SnapshotError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn persist(&self, identity: &str, entries: Vec<SnapshotEntry>) -> Result<(), SnapshotError> {
        self.as_ref().persist(identity, entries)
    }

    fn restore(&self, identity: &str) -> Result<Vec<SnapshotEntry>, SnapshotError> {
        self.as_ref().restore(identity)
    }
}

/// Implementación en memoria para tests del runner.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    inner: Mutex<HashMap<String, Vec<SnapshotEntry>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identities(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = inner.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn persist(&self, identity: &str, entries: Vec<SnapshotEntry>) -> Result<(), SnapshotError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(identity.to_string(), entries);
        Ok(())
    }

    fn restore(&self, identity: &str) -> Result<Vec<SnapshotEntry>, SnapshotError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .get(identity)
            .cloned()
            .ok_or(SnapshotError::NotFound { identity: identity.to_string() })
    }
}
