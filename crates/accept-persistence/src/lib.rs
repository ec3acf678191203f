//! accept-persistence
//!
//! Implementación sobre filesystem del contrato `SnapshotStore` de
//! `accept-core`, más carga de configuración desde variables de entorno.
//! El objetivo es que un run fallido pueda capturarse ("persist") y una
//! sesión de debugging posterior reanude contra los mismos handles
//! ("restore") sin reaprovisionar stubs.
//!
//! Módulos:
//! - `fs`: snapshots como documentos JSON versionados, uno por escenario.
//! - `config`: directorio de snapshots desde `.env` / entorno.

pub mod config;
pub mod fs;

pub use config::{init_dotenv, SnapshotConfig};
pub use fs::{FsSnapshotStore, SNAPSHOT_FORMAT_VERSION};
