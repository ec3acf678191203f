//! Resultados por step, por escenario y agregado del run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Estado terminal de un step dentro de la traza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Passed,
    Failed,
    /// Ningún matcher reconoció el texto del step.
    Unmatched,
    /// No se ejecutó: un step anterior falló o el run fue cancelado.
    Skipped,
}

/// Estado terminal de un escenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioOutcome {
    Passed,
    Failed,
    /// Al menos un step sin matcher: vocabulario incompleto, no un fallo.
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub keyword: String,
    pub text: String,
    pub status: StepStatus,
    pub error: Option<String>,
    pub duration: Duration,
}

/// Traza completa de un escenario, producida por el runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub feature: String,
    pub scenario: String,
    pub outcome: ScenarioOutcome,
    pub steps: Vec<StepResult>,
    /// Error del after-hook (persistencia), aditivo al fallo del escenario.
    pub hook_error: Option<String>,
    pub duration: Duration,
}

impl ScenarioReport {
    /// Un escenario queda en fallo si sus steps fallaron o si el after-hook
    /// falló: ambos deben ser observables.
    pub fn is_failure(&self) -> bool {
        self.outcome == ScenarioOutcome::Failed || self.hook_error.is_some()
    }
}

/// Agregado final del run, consumido por los emisores de reporte.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// Los tres conteos particionan `scenarios`: un escenario con
    /// `hook_error` cuenta solo como fallido, aunque sus steps pasaran.
    pub fn passed(&self) -> usize {
        self.count(ScenarioOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.is_failure()).count()
    }

    pub fn pending(&self) -> usize {
        self.count(ScenarioOutcome::Pending)
    }

    /// Cualquier escenario fallido falla el run completo.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, outcome: ScenarioOutcome) -> usize {
        self.scenarios
            .iter()
            .filter(|s| !s.is_failure() && s.outcome == outcome)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(outcome: ScenarioOutcome, hook_error: Option<&str>) -> ScenarioReport {
        ScenarioReport {
            feature: "f".into(),
            scenario: "s".into(),
            outcome,
            steps: Vec::new(),
            hook_error: hook_error.map(Into::into),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn hook_error_moves_a_passed_scenario_to_the_failed_bucket() {
        let report = RunReport {
            scenarios: vec![scenario(ScenarioOutcome::Passed, Some("disk full"))],
        };
        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.pending(), 0);
        assert!(report.has_failures());
    }

    #[test]
    fn bucket_counts_partition_the_scenario_set() {
        let report = RunReport {
            scenarios: vec![
                scenario(ScenarioOutcome::Passed, None),
                scenario(ScenarioOutcome::Passed, Some("write failed")),
                scenario(ScenarioOutcome::Failed, None),
                scenario(ScenarioOutcome::Pending, None),
                scenario(ScenarioOutcome::Pending, Some("write failed")),
            ],
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.pending(), 1);
        assert_eq!(
            report.passed() + report.failed() + report.pending(),
            report.scenarios.len()
        );
    }
}
