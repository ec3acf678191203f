//! Descubrimiento y parsing de feature files.
//!
//! El formato es el subconjunto de Gherkin que consume el runner: `Feature:`,
//! `Background:`, `Scenario:`, steps Given/When/Then/And/But, líneas de tags
//! `@...`, docstrings delimitados y tablas de datos. La *autoría* de los
//! features queda fuera del harness; aquí solo se leen.

mod discover;
mod model;
mod parser;
mod tags;

pub use discover::discover;
pub use model::{Feature, ScenarioSpec, StepKeyword, StepSpec};
pub use parser::parse_feature;
pub use tags::TagExpr;
