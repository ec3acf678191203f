use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identidad del escenario en curso, ligada al entorno por el before-hook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioHandle {
    pub id: Uuid,
    pub name: String,
    pub feature: String,
    pub tags: Vec<String>,
}

impl ScenarioHandle {
    pub fn new(name: impl Into<String>, feature: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            feature: feature.into(),
            tags,
        }
    }
}

/// Directivas del run, ligadas una vez al entorno base y visibles desde todo
/// entorno derivado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunDirectives {
    /// Persistir el entorno stub al terminar cada escenario.
    pub persist: bool,
    /// Restaurar el último entorno persistido al inicializar cada escenario.
    pub restore: bool,
    /// Suprimir color en la salida interactiva.
    pub no_colors: bool,
}
