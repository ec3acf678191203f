//! accept-report
//!
//! Emisores de resultados del run. Dos sinks independientes pueden estar
//! activos a la vez: el stream interactivo (`pretty`) y el archivo JUnit
//! (`junit`). Fallar al crear el archivo JUnit es fatal para el run; un
//! escenario fallido jamás aborta la generación del reporte.

pub mod junit;
pub mod pretty;

pub use junit::{render_junit, JUnitSink};
pub use pretty::PrettyEmitter;
