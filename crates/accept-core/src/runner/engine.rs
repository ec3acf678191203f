use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::{OnceCell, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::env::{RunDirectives, ScenarioHandle, SnapshotSchema, TestEnv};
use crate::errors::HarnessError;
use crate::event::{event_channel, EventReceiver, EventSender, RunEvent};
use crate::feature::{discover, Feature, ScenarioSpec, StepSpec, TagExpr};
use crate::logger::ScenarioLogger;
use crate::outcome::{RunReport, ScenarioOutcome, ScenarioReport, StepResult, StepStatus};
use crate::snapshot::SnapshotStore;
use crate::step::{StepDispatch, StepModule, StepRegistry};

use super::hooks::{self, SuiteHook};

/// Política de descubrimiento, filtrado, orden y concurrencia del run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub features_dir: PathBuf,
    /// Expresión de tags; `None` ejecuta todo.
    pub tags: Option<String>,
    /// Semilla para barajar el orden de descubrimiento de forma
    /// reproducible; `None` conserva el orden de archivo.
    pub seed: Option<u64>,
    /// Tamaño del pool; `None` usa el paralelismo disponible del host.
    pub concurrency: Option<usize>,
    pub directives: RunDirectives,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("features"),
            tags: None,
            seed: None,
            concurrency: None,
            directives: RunDirectives::default(),
        }
    }
}

/// Builder del harness: módulos + opciones + hook de suite + store.
pub struct HarnessBuilder {
    registry: StepRegistry,
    options: RunOptions,
    suite_hook: Option<SuiteHook>,
}

impl HarnessBuilder {
    pub fn new(options: RunOptions) -> Self {
        Self { registry: StepRegistry::new(), options, suite_hook: None }
    }

    /// Instala un módulo de vocabulario (idempotente).
    pub fn module(mut self, module: &dyn StepModule) -> Self {
        self.registry.install(module);
        self
    }

    /// Acceso directo al registro para matchers ad hoc (tests).
    pub fn registry(&mut self) -> &mut StepRegistry {
        &mut self.registry
    }

    pub fn suite_hook(mut self, hook: SuiteHook) -> Self {
        self.suite_hook = Some(hook);
        self
    }

    pub fn build<S: SnapshotStore + 'static>(self, store: S) -> (Harness<S>, EventReceiver) {
        let (events, rx) = event_channel();
        let schema = self.registry.schema();
        let harness = Harness {
            registry: Arc::new(self.registry),
            schema,
            options: self.options,
            store: Arc::new(store),
            suite_hook: self.suite_hook,
            suite_once: OnceCell::new(),
            events,
            cancel: CancellationToken::new(),
        };
        (harness, rx)
    }
}

/// Orquestador de escenarios sobre un pool acotado.
pub struct Harness<S> {
    registry: Arc<StepRegistry>,
    schema: SnapshotSchema,
    options: RunOptions,
    store: Arc<S>,
    suite_hook: Option<SuiteHook>,
    suite_once: OnceCell<()>,
    events: EventSender,
    cancel: CancellationToken,
}

struct ScenarioTask {
    feature: Arc<Feature>,
    scenario: ScenarioSpec,
    tags: Vec<String>,
}

impl<S: SnapshotStore + 'static> Harness<S> {
    /// Token para abortar el run desde afuera. Los escenarios en vuelo
    /// saltan sus steps restantes pero alcanzan su after-hook, para no
    /// perder estado de debugging.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn store(&self) -> &S {
        self.store.as_ref()
    }

    /// Ejecuta el run completo y devuelve el agregado de outcomes.
    pub async fn run(&self) -> Result<RunReport, HarnessError> {
        let features = discover(&self.options.features_dir)?;
        let filter = TagExpr::parse(self.options.tags.as_deref().unwrap_or(""))?;

        let mut work: Vec<ScenarioTask> = Vec::new();
        for feature in features {
            let feature = Arc::new(feature);
            for scenario in &feature.scenarios {
                let tags = feature.effective_tags(scenario);
                if filter.eval(&tags) {
                    work.push(ScenarioTask {
                        feature: Arc::clone(&feature),
                        scenario: scenario.clone(),
                        tags,
                    });
                }
            }
        }

        if let Some(seed) = self.options.seed {
            let mut rng = StdRng::seed_from_u64(seed);
            work.shuffle(&mut rng);
        }
        info!(scenarios = work.len(), "run scheduled");

        // Setup de suite: exactamente una vez, fallo fatal para todo el run.
        if let Some(hook) = &self.suite_hook {
            self.suite_once.get_or_try_init(|| hook()).await?;
        }

        let concurrency = self.options.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(4)
        });
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let mut base = TestEnv::new();
        base.set(self.options.directives);
        let base = Arc::new(base);

        let mut handles = Vec::with_capacity(work.len());
        for task in work {
            let semaphore = Arc::clone(&semaphore);
            let registry = Arc::clone(&self.registry);
            let schema = self.schema.clone();
            let store = Arc::clone(&self.store);
            let events = self.events.clone();
            let cancel = self.cancel.clone();
            let base = Arc::clone(&base);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| HarnessError::Internal(format!("worker pool closed: {e}")))?;
                run_scenario(task, registry, schema, store, events, cancel, base).await
            }));
        }

        // Join en orden de planificación: el reporte agregado queda
        // determinista aunque la ejecución intercale.
        let mut report = RunReport::default();
        let mut fatal: Option<HarnessError> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(scenario_report)) => report.scenarios.push(scenario_report),
                Ok(Err(e)) => {
                    warn!(error = %e, "fatal error in scenario worker");
                    if fatal.is_none() {
                        fatal = Some(e);
                        self.cancel.cancel();
                    }
                }
                Err(join_err) => {
                    if fatal.is_none() {
                        fatal = Some(HarnessError::Internal(format!(
                            "scenario worker panicked: {join_err}"
                        )));
                        self.cancel.cancel();
                    }
                }
            }
        }
        if let Some(e) = fatal {
            return Err(e);
        }

        let _ = self.events.send(RunEvent::RunFinished {
            passed: report.passed(),
            failed: report.failed(),
            pending: report.pending(),
        });
        Ok(report)
    }
}

async fn run_scenario<S: SnapshotStore>(
    task: ScenarioTask,
    registry: Arc<StepRegistry>,
    schema: SnapshotSchema,
    store: Arc<S>,
    events: EventSender,
    cancel: CancellationToken,
    base: Arc<TestEnv>,
) -> Result<ScenarioReport, HarnessError> {
    let started = Instant::now();
    let feature_name = task.feature.name.clone();
    let scenario_name = task.scenario.name.clone();
    let _ = events.send(RunEvent::ScenarioStarted {
        feature: feature_name.clone(),
        scenario: scenario_name.clone(),
    });

    // Initializing
    let handle = ScenarioHandle::new(&scenario_name, &feature_name, task.tags.clone());
    let logger = ScenarioLogger::new(&scenario_name, events.clone());
    let mut env = hooks::before_scenario(&base, handle, logger, store.as_ref(), &schema)?;

    // Executing: Background antepuesto, luego los steps del escenario, en
    // orden declarado y secuencial.
    let steps: Vec<StepSpec> = task
        .feature
        .background
        .iter()
        .chain(task.scenario.steps.iter())
        .cloned()
        .collect();

    let mut results = Vec::with_capacity(steps.len());
    let mut outcome = ScenarioOutcome::Passed;
    let mut interrupted = false;
    for step in &steps {
        if outcome != ScenarioOutcome::Passed || cancel.is_cancelled() {
            interrupted = interrupted || cancel.is_cancelled();
            results.push(StepResult {
                keyword: step.keyword.as_str().to_string(),
                text: step.text.clone(),
                status: StepStatus::Skipped,
                error: None,
                duration: Duration::ZERO,
            });
            continue;
        }
        let step_started = Instant::now();
        let (status, error) = match registry.dispatch(&mut env, step).await {
            StepDispatch::Unmatched => {
                outcome = ScenarioOutcome::Pending;
                (StepStatus::Unmatched, None)
            }
            StepDispatch::Completed(Ok(())) => (StepStatus::Passed, None),
            StepDispatch::Completed(Err(e)) => {
                outcome = ScenarioOutcome::Failed;
                (StepStatus::Failed, Some(e.to_string()))
            }
        };
        results.push(StepResult {
            keyword: step.keyword.as_str().to_string(),
            text: step.text.clone(),
            status,
            error,
            duration: step_started.elapsed(),
        });
    }
    if interrupted && outcome == ScenarioOutcome::Passed {
        outcome = ScenarioOutcome::Failed;
    }

    // Finalizing: persist siempre intentado; su error es aditivo al fallo
    // del escenario, nunca lo reemplaza.
    let hook_error = match hooks::after_scenario(&env, store.as_ref()) {
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    };

    let report = ScenarioReport {
        feature: feature_name,
        scenario: scenario_name,
        outcome,
        steps: results,
        hook_error,
        duration: started.elapsed(),
    };
    let _ = events.send(RunEvent::ScenarioFinished(report.clone()));
    Ok(report)
}
