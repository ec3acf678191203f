//! Configuración de persistencia desde variables de entorno.
//! Convención `ACCEPT_SNAPSHOT_DIR`, con default relativo al cwd del run.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

const SNAPSHOT_DIR_VAR: &str = "ACCEPT_SNAPSHOT_DIR";
const DEFAULT_SNAPSHOT_DIR: &str = ".acceptflow/snapshots";

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub dir: PathBuf,
}

impl SnapshotConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let dir = env::var(SNAPSHOT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_DIR));
        Self { dir }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
