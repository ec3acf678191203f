//! Errores del núcleo del harness.
//!
//! Tres familias con destinos de propagación distintos:
//! - `HarnessError`: errores de configuración/suite, fatales antes o durante
//!   el arranque del run (ningún escenario debe ejecutarse tras ellos).
//! - `StepError`: fallos de un step individual; quedan registrados en el
//!   outcome del escenario y nunca abortan a los escenarios hermanos.
//! - `SnapshotError`: fallos de persistencia; se adjuntan al after-hook del
//!   escenario, aditivos al fallo original (nunca lo enmascaran).

use std::path::PathBuf;

use thiserror::Error;

/// Lectura de una clave no ligada en el entorno. Distinto de "ligada pero
/// `None`": varios módulos guardan handles opcionales.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("no binding for {type_name} in the test environment")]
    NotBound { type_name: &'static str },
}

/// Fallos de persistencia de snapshots. `NotFound` y `Corrupt` son variantes
/// separadas a propósito: restaurar sin snapshot previo debe fallar fuerte,
/// y un snapshot ilegible no debe confundirse con uno ausente.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("no snapshot found for '{identity}'")]
    NotFound { identity: String },
    #[error("snapshot for '{identity}' is corrupt: {reason}")]
    Corrupt { identity: String, reason: String },
    #[error("no restorer registered for snapshot kind '{kind}'")]
    UnknownKind { kind: String },
    #[error("snapshot io error: {0}")]
    Io(String),
    #[error("snapshot serialization error: {0}")]
    Serialize(String),
}

/// Fallo de un step en ejecución.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),
    #[error("step '{text}' requires a {type_name} binding that no earlier step created")]
    RequiresUnbound {
        text: String,
        type_name: &'static str,
    },
    #[error("step '{text}' matches more than one pattern: {patterns:?}")]
    Ambiguous { text: String, patterns: Vec<String> },
    #[error(transparent)]
    Env(#[from] EnvError),
}

impl StepError {
    /// Atajo para aserciones dentro de handlers.
    pub fn failed(msg: impl Into<String>) -> Self {
        StepError::Failed(msg.into())
    }
}

/// Errores fatales a nivel de run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("no feature files found under {dir}")]
    NoFeatureFiles { dir: PathBuf },
    #[error("failed to read {path}: {reason}")]
    FeatureIo { path: PathBuf, reason: String },
    #[error("failed to parse {path} (line {line}): {reason}")]
    FeatureParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("invalid tag expression '{expr}': {reason}")]
    TagExpression { expr: String, reason: String },
    #[error("suite setup failed: {0}")]
    SuiteSetup(String),
    #[error("restore requested for scenario '{scenario}' but failed: {source}")]
    RestoreRequired {
        scenario: String,
        source: SnapshotError,
    },
    #[error("report sink unusable: {0}")]
    ReportSink(String),
    #[error("internal: {0}")]
    Internal(String),
}
