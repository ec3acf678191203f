//! Runner de escenarios.
//!
//! Máquina de estados por escenario:
//! `Discovered -> Initializing (hooks, restore) -> Executing (steps en orden
//! declarado) -> Finalizing (persist) -> {Passed, Failed, Pending}`.
//!
//! Los escenarios se reparten sobre un pool acotado; los steps de un mismo
//! escenario son estrictamente secuenciales. El orden entre escenarios no
//! está especificado salvo semilla explícita.

mod engine;
mod hooks;

pub use engine::{Harness, HarnessBuilder, RunOptions};
pub use hooks::SuiteHook;
