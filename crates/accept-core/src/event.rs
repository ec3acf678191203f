//! Eventos del run hacia los emisores de reporte.
//!
//! El runner publica sobre un canal mpsc sin bloqueo; los emisores (stream
//! interactivo, archivo JUnit) consumen del otro extremo. Perder el receptor
//! no es un error del run: los `send` se ignoran deliberadamente.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::outcome::ScenarioReport;

#[derive(Debug, Clone)]
pub enum RunEvent {
    ScenarioStarted { feature: String, scenario: String },
    /// Línea emitida por un módulo de steps vía el logger adapter.
    LogLine { scenario: String, line: String },
    ScenarioFinished(ScenarioReport),
    RunFinished { passed: usize, failed: usize, pending: usize },
}

pub type EventSender = UnboundedSender<RunEvent>;
pub type EventReceiver = UnboundedReceiver<RunEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    unbounded_channel()
}
