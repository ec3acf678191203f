//! accept-core: motor de ejecución de escenarios de aceptación.
//!
//! Núcleo del harness: entorno de prueba con alcance de escenario, registro
//! de módulos de vocabulario, runner concurrente con hooks de ciclo de vida
//! y contrato de snapshots. La implementación de snapshots sobre filesystem
//! vive en `accept-persistence`; los emisores de reporte, en
//! `accept-report`.

pub mod env;
pub mod errors;
pub mod event;
pub mod feature;
pub mod logger;
pub mod outcome;
pub mod runner;
pub mod snapshot;
pub mod step;

pub use env::{Persist, RunDirectives, ScenarioHandle, SnapshotEntry, SnapshotSchema, TestEnv};
pub use errors::{EnvError, HarnessError, SnapshotError, StepError};
pub use event::{event_channel, EventReceiver, EventSender, RunEvent};
pub use feature::{discover, parse_feature, Feature, ScenarioSpec, StepKeyword, StepSpec, TagExpr};
pub use logger::ScenarioLogger;
pub use outcome::{RunReport, ScenarioOutcome, ScenarioReport, StepResult, StepStatus};
pub use runner::{Harness, HarnessBuilder, RunOptions, SuiteHook};
pub use snapshot::{InMemorySnapshotStore, SnapshotStore};
pub use step::{Registration, StepArgs, StepDispatch, StepFn, StepModule, StepRegistry};
