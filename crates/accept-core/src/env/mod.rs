//! Entorno de prueba compartido entre módulos de steps.
//!
//! Rol en el harness:
//! - Cada escenario recibe un `TestEnv` propio derivado del entorno base del
//!   run. Las claves son tipos Rust; los valores, handles opacos de recursos
//!   stub (servicios emulados, credenciales, repos clonados).
//! - Una clave ligada es visible para todo módulo del mismo escenario y
//!   nunca para otros escenarios, salvo persistencia explícita.

mod handle;
mod store;

pub use handle::{RunDirectives, ScenarioHandle};
pub use store::{Persist, RestoredBinding, SnapshotEntry, SnapshotSchema, TestEnv};
