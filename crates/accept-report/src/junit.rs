//! Reporte JUnit XML, un `<testsuite>` por feature. El archivo destino se
//! crea al arrancar el run: si la ruta no es escribible, falla la
//! configuración, no el final del run.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use accept_core::errors::HarnessError;
use accept_core::{RunReport, ScenarioOutcome, ScenarioReport};

pub struct JUnitSink {
    path: PathBuf,
}

impl JUnitSink {
    /// Crea (o trunca) el archivo destino de inmediato para detectar rutas
    /// inválidas antes de ejecutar escenarios.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref().to_path_buf();
        File::create(&path)
            .map_err(|e| HarnessError::ReportSink(format!("{}: {e}", path.display())))?;
        Ok(Self { path })
    }

    pub fn write(&self, report: &RunReport) -> Result<(), HarnessError> {
        let xml = render_junit(report);
        let mut file = File::create(&self.path)
            .map_err(|e| HarnessError::ReportSink(format!("{}: {e}", self.path.display())))?;
        file.write_all(xml.as_bytes())
            .map_err(|e| HarnessError::ReportSink(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Serializa el agregado del run como documento JUnit.
pub fn render_junit(report: &RunReport) -> String {
    let mut suites: IndexMap<&str, Vec<&ScenarioReport>> = IndexMap::new();
    for scenario in &report.scenarios {
        suites.entry(scenario.feature.as_str()).or_default().push(scenario);
    }

    let timestamp = chrono::Utc::now().to_rfc3339();
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuites tests=\"{}\" failures=\"{}\">\n",
        report.scenarios.len(),
        report.failed(),
    ));

    for (feature, scenarios) in &suites {
        let failures = scenarios.iter().filter(|s| s.is_failure()).count();
        let skipped = scenarios
            .iter()
            .filter(|s| s.outcome == ScenarioOutcome::Pending)
            .count();
        out.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" timestamp=\"{}\">\n",
            xml_escape(feature),
            scenarios.len(),
            failures,
            skipped,
            xml_escape(&timestamp),
        ));
        for scenario in scenarios {
            out.push_str(&render_case(scenario));
        }
        out.push_str("  </testsuite>\n");
    }

    out.push_str("</testsuites>\n");
    out
}

fn render_case(scenario: &ScenarioReport) -> String {
    let mut out = format!(
        "    <testcase name=\"{}\" time=\"{:.3}\"",
        xml_escape(&scenario.scenario),
        scenario.duration.as_secs_f64(),
    );

    if scenario.is_failure() {
        out.push_str(">\n");
        let mut message = String::new();
        for step in &scenario.steps {
            if let Some(error) = &step.error {
                message.push_str(&format!("{} {}: {error}\n", step.keyword, step.text));
            }
        }
        if let Some(hook_error) = &scenario.hook_error {
            message.push_str(&format!("after-hook: {hook_error}\n"));
        }
        out.push_str(&format!(
            "      <failure>{}</failure>\n",
            xml_escape(message.trim_end()),
        ));
        out.push_str("    </testcase>\n");
    } else if scenario.outcome == ScenarioOutcome::Pending {
        out.push_str(">\n      <skipped/>\n    </testcase>\n");
    } else {
        out.push_str("/>\n");
    }

    out
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use accept_core::{StepResult, StepStatus};

    fn step(text: &str, status: StepStatus, error: Option<&str>) -> StepResult {
        StepResult {
            keyword: "Given".into(),
            text: text.into(),
            status,
            error: error.map(Into::into),
            duration: Duration::from_millis(5),
        }
    }

    fn scenario(name: &str, outcome: ScenarioOutcome, steps: Vec<StepResult>) -> ScenarioReport {
        ScenarioReport {
            feature: "cluster".into(),
            scenario: name.into(),
            outcome,
            steps,
            hook_error: None,
            duration: Duration::from_millis(20),
        }
    }

    fn mixed_report() -> RunReport {
        RunReport {
            scenarios: vec![
                scenario(
                    "arranca",
                    ScenarioOutcome::Passed,
                    vec![step("un nodo", StepStatus::Passed, None)],
                ),
                scenario(
                    "se cae",
                    ScenarioOutcome::Failed,
                    vec![step("un nodo", StepStatus::Failed, Some("sin quorum"))],
                ),
                scenario(
                    "sin vocabulario",
                    ScenarioOutcome::Pending,
                    vec![step("algo <raro>", StepStatus::Unmatched, None)],
                ),
            ],
        }
    }

    #[test]
    fn agrupa_por_feature_y_marca_fallos() {
        let xml = render_junit(&mixed_report());
        assert!(xml.contains("<testsuite name=\"cluster\" tests=\"3\" failures=\"1\" skipped=\"1\""));
        assert!(xml.contains("<testcase name=\"arranca\""));
        assert!(xml.contains("<failure>Given un nodo: sin quorum</failure>"));
        assert!(xml.contains("<skipped/>"));
    }

    #[test]
    fn escapa_entidades_xml() {
        let xml = render_junit(&mixed_report());
        assert!(xml.contains("algo &lt;raro&gt;") || xml.contains("sin vocabulario"));
        assert!(!xml.contains("name=\"algo <raro>\""));
    }

    #[test]
    fn hook_error_tambien_es_fallo() {
        let mut report = mixed_report();
        report.scenarios[0].hook_error = Some("disco lleno".into());
        let xml = render_junit(&report);
        assert!(xml.contains("after-hook: disco lleno"));
        assert!(xml.contains("failures=\"2\""));
    }

    #[test]
    fn sink_crea_y_escribe_el_archivo() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("junit.xml");
        let sink = JUnitSink::create(&path).expect("create");
        assert!(path.exists());
        sink.write(&mixed_report()).expect("write");
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.starts_with("<?xml"));
        assert!(written.contains("</testsuites>"));
    }

    #[test]
    fn ruta_invalida_falla_al_crear() {
        let err = JUnitSink::create("/definitely/not/a/dir/junit.xml");
        assert!(err.is_err());
    }
}
