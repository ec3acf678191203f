//! Hooks de ciclo de vida por escenario y por suite.
//!
//! Orden documentado: el before-hook crea el entorno hijo, restaura si la
//! directiva lo pide y liga identidad + logger; el after-hook corre SIEMPRE,
//! incluso tras fallo de steps, para garantizar el intento de persistencia.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::env::{RunDirectives, ScenarioHandle, SnapshotSchema, TestEnv};
use crate::errors::{HarnessError, SnapshotError};
use crate::logger::ScenarioLogger;
use crate::snapshot::SnapshotStore;

/// Hook de suite: corre exactamente una vez antes del primer escenario;
/// su fallo es fatal para el run completo.
pub type SuiteHook = Box<dyn Fn() -> BoxFuture<'static, Result<(), HarnessError>> + Send + Sync>;

/// Before-hook: entorno hijo fresco + restore opcional + identidad + logger.
///
/// Si la directiva restore está activa y no hay snapshot previo, falla
/// fuerte: un fallback silencioso a entorno fresco enmascararía sesiones de
/// debugging.
pub(crate) fn before_scenario(
    base: &Arc<TestEnv>,
    handle: ScenarioHandle,
    logger: ScenarioLogger,
    store: &dyn SnapshotStore,
    schema: &SnapshotSchema,
) -> Result<TestEnv, HarnessError> {
    let mut env = TestEnv::derive(base);
    let directives = env.get::<RunDirectives>().copied().unwrap_or_default();

    if directives.restore {
        let identity = handle.name.clone();
        let entries = store.restore(&identity).map_err(|source| {
            HarnessError::RestoreRequired { scenario: identity.clone(), source }
        })?;
        debug!(scenario = %identity, entries = entries.len(), "restoring stub environment");
        let mut restored = Vec::with_capacity(entries.len());
        for entry in entries {
            let binding = schema.restore_entry(entry).map_err(|source| {
                HarnessError::RestoreRequired { scenario: identity.clone(), source }
            })?;
            restored.push(binding);
        }
        env.absorb(restored);
    }

    env.set(handle);
    env.set(logger);
    Ok(env)
}

/// After-hook: persistencia incondicionalmente intentada, efectiva solo con
/// la directiva persist. Devuelve si se escribió un snapshot.
pub(crate) fn after_scenario(
    env: &TestEnv,
    store: &dyn SnapshotStore,
) -> Result<bool, SnapshotError> {
    let directives = env.get::<RunDirectives>().copied().unwrap_or_default();
    if !directives.persist {
        return Ok(false);
    }
    let handle = env
        .get::<ScenarioHandle>()
        .map_err(|e| SnapshotError::Io(format!("scenario handle missing: {e}")))?;
    let entries = env.snapshot_entries()?;
    store.persist(&handle.name, entries)?;
    debug!(scenario = %handle.name, "stub environment persisted");
    Ok(true)
}
