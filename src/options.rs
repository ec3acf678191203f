//! Parsing de argumentos del binario.
//!
//! Flags estilo suite de aceptación, no subcomandos: el binario hace una
//! sola cosa y los flags ajustan el run.

use std::path::PathBuf;

use accept_core::RunDirectives;

const USAGE: &str = "\
acceptflow [OPTIONS]

  --features DIR   directorio de archivos .feature (default: features)
  --tags EXPR      filtro de tags (`,` = OR, `&&` = AND, `~` = negación)
  --seed N         baraja los escenarios con semilla reproducible
                   (negativo: conserva el orden de archivo)
  --persist        captura el entorno de cada escenario al terminar
  --restore        reanuda cada escenario desde su último snapshot
  --no-colors      suprime color en la salida interactiva
  --help           imprime esta ayuda
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub features_dir: PathBuf,
    pub tags: Option<String>,
    pub seed: Option<u64>,
    pub directives: RunDirectives,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("features"),
            tags: None,
            seed: None,
            directives: RunDirectives::default(),
            help: false,
        }
    }
}

impl CliOptions {
    pub fn usage() -> &'static str {
        USAGE
    }

    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut opts = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--features" => {
                    let dir = args.next().ok_or("--features requiere un directorio")?;
                    opts.features_dir = PathBuf::from(dir);
                }
                "--tags" => {
                    let expr = args.next().ok_or("--tags requiere una expresión")?;
                    opts.tags = Some(expr);
                }
                "--seed" => {
                    let raw = args.next().ok_or("--seed requiere un número")?;
                    let seed = raw
                        .parse::<i64>()
                        .map_err(|_| format!("semilla inválida: {raw}"))?;
                    // Valor negativo: sin barajar, orden de archivo.
                    opts.seed = u64::try_from(seed).ok();
                }
                "--persist" => opts.directives.persist = true,
                "--restore" => opts.directives.restore = true,
                "--no-colors" => opts.directives.no_colors = true,
                "--help" | "-h" => opts.help = true,
                other => return Err(format!("flag desconocido: {other}")),
            }
        }
        Ok(opts)
    }
}
