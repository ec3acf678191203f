//! acceptflow: runner de la suite de aceptación.
//!
//! Descubre `features/*.feature`, despacha cada step contra los módulos de
//! vocabulario registrados y emite un stream interactivo más, opcionalmente,
//! un reporte JUnit (`ACCEPT_JUNIT_REPORT`). Con `--persist` captura el
//! entorno de cada escenario; con `--restore` reanuda desde esos snapshots.

mod options;
mod vocab;

use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use accept_core::{HarnessBuilder, RunOptions};
use accept_persistence::{FsSnapshotStore, SnapshotConfig};
use accept_report::{JUnitSink, PrettyEmitter};

use options::CliOptions;
use vocab::VarsModule;

const JUNIT_REPORT_VAR: &str = "ACCEPT_JUNIT_REPORT";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let opts = match CliOptions::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{message}\n\n{}", CliOptions::usage());
            return ExitCode::from(2);
        }
    };
    if opts.help {
        println!("{}", CliOptions::usage());
        return ExitCode::SUCCESS;
    }

    match run(opts).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("acceptflow: {e}");
            ExitCode::from(2)
        }
    }
}

/// Ejecuta la suite completa; `Ok(true)` si ningún escenario falló.
async fn run(opts: CliOptions) -> Result<bool, Box<dyn std::error::Error>> {
    // El sink JUnit se crea antes de ejecutar nada: una ruta no escribible
    // es un error de configuración, no un fallo al final del run.
    let junit = match env::var(JUNIT_REPORT_VAR) {
        Ok(path) if !path.is_empty() => Some(JUnitSink::create(path)?),
        _ => None,
    };

    let store = FsSnapshotStore::create(&SnapshotConfig::from_env())?;

    let run_options = RunOptions {
        features_dir: opts.features_dir,
        tags: opts.tags,
        seed: opts.seed,
        concurrency: None,
        directives: opts.directives,
    };
    let no_colors = opts.directives.no_colors;

    let (harness, events) = HarnessBuilder::new(run_options)
        .module(&VarsModule)
        .build(store);

    // Ctrl-C corta los steps pendientes pero deja correr los after-hooks.
    let cancel = harness.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling run");
            cancel.cancel();
        }
    });

    let emitter = tokio::spawn(PrettyEmitter::new(no_colors).run(events));

    let report = harness.run().await?;
    drop(harness); // cierra el canal de eventos
    let _ = emitter.await;

    if let Some(sink) = &junit {
        sink.write(&report)?;
        info!(path = %sink.path().display(), "junit report written");
    }

    Ok(!report.has_failures())
}
