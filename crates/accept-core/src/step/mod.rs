//! Registro de módulos de vocabulario y despacho de steps.

mod registry;

pub use registry::{Registration, StepArgs, StepDispatch, StepFn, StepModule, StepRegistry};
