//! Adaptador de logging por escenario.
//!
//! Tres operaciones consumidas uniformemente por todos los módulos de steps,
//! independientes del mecanismo de reporte activo. Sin estado propio: solo
//! reenvía al sink de eventos del run, etiquetado con el escenario.

use std::fmt;

use crate::event::{EventSender, RunEvent};

#[derive(Clone)]
pub struct ScenarioLogger {
    scenario: String,
    tx: EventSender,
}

impl ScenarioLogger {
    pub fn new(scenario: impl Into<String>, tx: EventSender) -> Self {
        Self { scenario: scenario.into(), tx }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Registra una línea literal.
    pub fn log(&self, line: &str) {
        let _ = self.tx.send(RunEvent::LogLine {
            scenario: self.scenario.clone(),
            line: line.to_string(),
        });
    }

    /// Registra con formato.
    pub fn logf(&self, args: fmt::Arguments<'_>) {
        self.log(&args.to_string());
    }

    /// Imprime con formato; delega en `logf`, el sink decide la salida.
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.logf(args);
    }
}

impl fmt::Debug for ScenarioLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioLogger").field("scenario", &self.scenario).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    #[test]
    fn forwards_tagged_lines_to_the_sink() {
        let (tx, mut rx) = event_channel();
        let logger = ScenarioLogger::new("keyless verify", tx);
        logger.log("spinning up stub registry");
        logger.logf(format_args!("listening on {}", 5000));

        match rx.try_recv().expect("first line") {
            RunEvent::LogLine { scenario, line } => {
                assert_eq!(scenario, "keyless verify");
                assert_eq!(line, "spinning up stub registry");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.try_recv().expect("second line") {
            RunEvent::LogLine { line, .. } => assert_eq!(line, "listening on 5000"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
