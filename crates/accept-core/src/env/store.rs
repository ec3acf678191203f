use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{EnvError, SnapshotError};

/// Valores que sobreviven a un persist/restore. `KIND` debe ser estable entre
/// ejecuciones: es la clave del entry dentro del documento de snapshot.
pub trait Persist: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;
}

/// Un valor ya serializado dentro de un snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotEntry {
    pub kind: String,
    pub data: serde_json::Value,
}

type AnyValue = dyn Any + Send + Sync;
type SnapshotFn = fn(&AnyValue) -> Result<SnapshotEntry, SnapshotError>;
type RestoreFn = fn(serde_json::Value) -> Result<RestoredBinding, SnapshotError>;

pub(crate) struct Binding {
    value: Box<AnyValue>,
    snapshot: Option<SnapshotFn>,
}

/// Binding reconstruido desde un snapshot, listo para `TestEnv::absorb`.
pub struct RestoredBinding {
    type_id: TypeId,
    binding: Binding,
}

fn snapshot_of<T: Persist>(value: &AnyValue) -> Result<SnapshotEntry, SnapshotError> {
    let value = value
        .downcast_ref::<T>()
        .ok_or_else(|| SnapshotError::Serialize(format!("binding mismatch for kind '{}'", T::KIND)))?;
    let data = serde_json::to_value(value).map_err(|e| SnapshotError::Serialize(e.to_string()))?;
    Ok(SnapshotEntry { kind: T::KIND.to_string(), data })
}

fn restore_of<T: Persist>(data: serde_json::Value) -> Result<RestoredBinding, SnapshotError> {
    let value: T = serde_json::from_value(data)
        .map_err(|e| SnapshotError::Serialize(format!("kind '{}': {e}", T::KIND)))?;
    Ok(RestoredBinding {
        type_id: TypeId::of::<T>(),
        binding: Binding { value: Box::new(value), snapshot: Some(snapshot_of::<T>) },
    })
}

/// Tabla kind -> restaurador, poblada por los módulos durante el registro.
/// Sin restaurador para un kind, `restore` falla con `UnknownKind` en vez de
/// descartar el entry en silencio.
#[derive(Default, Clone)]
pub struct SnapshotSchema {
    restorers: IndexMap<String, RestoreFn>,
}

impl SnapshotSchema {
    pub fn add<T: Persist>(&mut self) {
        self.restorers.insert(T::KIND.to_string(), restore_of::<T>);
    }

    pub fn restore_entry(&self, entry: SnapshotEntry) -> Result<RestoredBinding, SnapshotError> {
        let restore = self
            .restorers
            .get(&entry.kind)
            .ok_or(SnapshotError::UnknownKind { kind: entry.kind.clone() })?;
        restore(entry.data)
    }

    pub fn knows(&self, kind: &str) -> bool {
        self.restorers.contains_key(kind)
    }
}

/// Bolsa de valores tipados con alcance de escenario.
///
/// `derive` crea un hijo que ve los bindings del padre; las escrituras del
/// hijo son locales y jamás vuelven al padre: la única vía de salida de un
/// escenario es el snapshot persistido. El padre queda congelado tras
/// derivar (va dentro de un `Arc`), de modo que dos escenarios concurrentes
/// jamás comparten estado mutable.
pub struct TestEnv {
    parent: Option<Arc<TestEnv>>,
    bindings: IndexMap<TypeId, Binding>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self { parent: None, bindings: IndexMap::new() }
    }

    /// Crea un entorno hijo sobre un padre congelado.
    pub fn derive(parent: &Arc<TestEnv>) -> Self {
        Self { parent: Some(Arc::clone(parent)), bindings: IndexMap::new() }
    }

    /// Liga un valor efímero (no sobrevive a persist).
    pub fn set<T: Send + Sync + 'static>(&mut self, value: T) {
        self.bindings
            .insert(TypeId::of::<T>(), Binding { value: Box::new(value), snapshot: None });
    }

    /// Liga un valor persistible: entrará en `snapshot_entries`.
    pub fn set_persistent<T: Persist>(&mut self, value: T) {
        self.bindings.insert(
            TypeId::of::<T>(),
            Binding { value: Box::new(value), snapshot: Some(snapshot_of::<T>) },
        );
    }

    /// Lee un binding. Clave no ligada es un error de programación del módulo
    /// y se señala distinto de "ligada pero `None`".
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<&T, EnvError> {
        let mut env = Some(self);
        while let Some(e) = env {
            if let Some(b) = e.bindings.get(&TypeId::of::<T>()) {
                return b
                    .value
                    .downcast_ref::<T>()
                    .ok_or(EnvError::NotBound { type_name: type_name::<T>() });
            }
            env = e.parent.as_deref();
        }
        Err(EnvError::NotBound { type_name: type_name::<T>() })
    }

    /// Acceso mutable, solo a bindings locales: los del padre están
    /// congelados por diseño del modelo de aislamiento.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Result<&mut T, EnvError> {
        self.bindings
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.value.downcast_mut::<T>())
            .ok_or(EnvError::NotBound { type_name: type_name::<T>() })
    }

    pub fn is_bound<T: Send + Sync + 'static>(&self) -> bool {
        self.get::<T>().is_ok()
    }

    pub(crate) fn is_bound_id(&self, type_id: TypeId) -> bool {
        let mut env = Some(self);
        while let Some(e) = env {
            if e.bindings.contains_key(&type_id) {
                return true;
            }
            env = e.parent.as_deref();
        }
        false
    }

    /// Entries persistibles en orden determinista (inserción, hijo primero;
    /// un binding local eclipsa al del padre con el mismo tipo).
    pub fn snapshot_entries(&self) -> Result<Vec<SnapshotEntry>, SnapshotError> {
        let mut seen: Vec<TypeId> = Vec::new();
        let mut entries = Vec::new();
        let mut env = Some(self);
        while let Some(e) = env {
            for (type_id, binding) in &e.bindings {
                if seen.contains(type_id) {
                    continue;
                }
                seen.push(*type_id);
                if let Some(snapshot) = binding.snapshot {
                    entries.push(snapshot(binding.value.as_ref())?);
                }
            }
            env = e.parent.as_deref();
        }
        Ok(entries)
    }

    /// Reincorpora bindings restaurados desde un snapshot.
    pub fn absorb(&mut self, restored: Vec<RestoredBinding>) {
        for r in restored {
            self.bindings.insert(r.type_id, r.binding);
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct RegistryStub {
        url: String,
    }

    impl Persist for RegistryStub {
        const KIND: &'static str = "registry-stub";
    }

    struct KeyPair(Option<Vec<u8>>);

    #[test]
    fn set_then_get_roundtrip() {
        let mut env = TestEnv::new();
        env.set(KeyPair(Some(vec![1, 2])));
        assert!(env.get::<KeyPair>().expect("bound").0.is_some());
    }

    #[test]
    fn unbound_key_is_distinct_from_bound_none() {
        let mut env = TestEnv::new();
        assert!(matches!(env.get::<KeyPair>(), Err(EnvError::NotBound { .. })));
        env.set(KeyPair(None));
        // Ligada con None adentro: lectura exitosa.
        assert!(env.get::<KeyPair>().expect("bound").0.is_none());
    }

    #[test]
    fn child_sees_parent_but_never_leaks_back() {
        let mut base = TestEnv::new();
        base.set(RunDirectivesProbe("base"));
        let base = Arc::new(base);

        let mut child = TestEnv::derive(&base);
        assert_eq!(child.get::<RunDirectivesProbe>().expect("inherited").0, "base");

        child.set(RunDirectivesProbe("child"));
        assert_eq!(child.get::<RunDirectivesProbe>().expect("local").0, "child");
        // El padre sigue viendo su propio valor.
        assert_eq!(base.get::<RunDirectivesProbe>().expect("frozen").0, "base");
    }

    struct RunDirectivesProbe(&'static str);

    #[test]
    fn snapshot_restore_roundtrip_on_persistable_subset() {
        let mut env = TestEnv::new();
        env.set(KeyPair(None)); // efímero, no debe entrar al snapshot
        env.set_persistent(RegistryStub { url: "http://127.0.0.1:5000".into() });

        let entries = env.snapshot_entries().expect("snapshot");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, RegistryStub::KIND);

        let mut schema = SnapshotSchema::default();
        schema.add::<RegistryStub>();

        let mut fresh = TestEnv::new();
        let restored = entries
            .into_iter()
            .map(|e| schema.restore_entry(e).expect("restore"))
            .collect();
        fresh.absorb(restored);
        assert_eq!(
            fresh.get::<RegistryStub>().expect("restored").url,
            "http://127.0.0.1:5000"
        );
        assert!(!fresh.is_bound::<KeyPair>());
    }

    #[test]
    fn unknown_kind_fails_instead_of_silent_skip() {
        let schema = SnapshotSchema::default();
        let entry = SnapshotEntry { kind: "ghost".into(), data: serde_json::json!({}) };
        assert!(matches!(
            schema.restore_entry(entry),
            Err(SnapshotError::UnknownKind { .. })
        ));
    }
}
