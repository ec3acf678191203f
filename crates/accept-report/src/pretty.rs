//! Stream interactivo: un bloque por escenario, impreso completo al
//! terminar para que la concurrencia no intercale líneas de escenarios
//! distintos.

use std::collections::HashMap;

use accept_core::{EventReceiver, RunEvent, ScenarioReport, StepStatus};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub struct PrettyEmitter {
    no_colors: bool,
}

impl PrettyEmitter {
    pub fn new(no_colors: bool) -> Self {
        Self { no_colors }
    }

    /// Consume eventos hasta que el runner cierre el canal.
    pub async fn run(self, mut rx: EventReceiver) {
        let mut logs: HashMap<String, Vec<String>> = HashMap::new();
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::ScenarioStarted { .. } => {}
                RunEvent::LogLine { scenario, line } => {
                    logs.entry(scenario).or_default().push(line);
                }
                RunEvent::ScenarioFinished(report) => {
                    let lines = logs.remove(&report.scenario).unwrap_or_default();
                    self.print_scenario(&report, &lines);
                }
                RunEvent::RunFinished { passed, failed, pending } => {
                    self.print_summary(passed, failed, pending);
                }
            }
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.no_colors {
            text.to_string()
        } else {
            format!("{color}{text}{RESET}")
        }
    }

    fn print_scenario(&self, report: &ScenarioReport, logs: &[String]) {
        let header = format!("{}: {}", report.feature, report.scenario);
        println!("\n{}", self.paint(CYAN, &header));
        for step in &report.steps {
            let (mark, color) = match step.status {
                StepStatus::Passed => ("✔", GREEN),
                StepStatus::Failed => ("✘", RED),
                StepStatus::Unmatched => ("?", YELLOW),
                StepStatus::Skipped => ("-", DIM),
            };
            let line = format!("  {mark} {} {}", step.keyword, step.text);
            println!("{}", self.paint(color, &line));
            if let Some(error) = &step.error {
                println!("{}", self.paint(RED, &format!("      {error}")));
            }
        }
        if let Some(hook_error) = &report.hook_error {
            let line = format!("  ✘ after-hook: {hook_error}");
            println!("{}", self.paint(RED, &line));
        }
        for line in logs {
            println!("{}", self.paint(DIM, &format!("    | {line}")));
        }
    }

    fn print_summary(&self, passed: usize, failed: usize, pending: usize) {
        let total = passed + failed + pending;
        let summary = format!(
            "\n{total} scenarios: {} passed, {} failed, {} pending",
            self.paint(GREEN, &passed.to_string()),
            self.paint(RED, &failed.to_string()),
            self.paint(YELLOW, &pending.to_string()),
        );
        println!("{summary}");
    }
}
