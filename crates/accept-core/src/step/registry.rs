use std::any::{type_name, TypeId};

use futures::future::BoxFuture;
use regex::Regex;

use crate::env::{Persist, SnapshotSchema, TestEnv};
use crate::errors::StepError;
use crate::feature::StepSpec;

/// Argumentos entregados al handler: grupos capturados por el patrón más el
/// argumento adosado del step (docstring o tabla), si lo hay.
#[derive(Debug, Clone, Default)]
pub struct StepArgs {
    pub captures: Vec<String>,
    pub docstring: Option<String>,
    pub table: Option<Vec<Vec<String>>>,
}

/// Handler de un step. Puntero a función, no closure: el registro debe ser
/// libre de estado (los módulos solo mutan el entorno en tiempo de
/// ejecución, nunca en tiempo de registro).
pub type StepFn = for<'a> fn(&'a mut TestEnv, StepArgs) -> BoxFuture<'a, Result<(), StepError>>;

/// Proveedor de vocabulario. `register` corre una vez por proceso y solo
/// puede aportar matchers y restauradores de snapshot.
pub trait StepModule: Send + Sync {
    fn name(&self) -> &'static str;
    fn register(&self, reg: &mut StepRegistry);
}

struct Requirement {
    type_id: TypeId,
    type_name: &'static str,
}

struct StepMatcher {
    pattern: Regex,
    handler: StepFn,
    requires: Vec<Requirement>,
}

/// Resultado del despacho de un step contra el registro.
pub enum StepDispatch {
    /// Ningún matcher reconoció el texto: escenario Pending.
    Unmatched,
    Completed(Result<(), StepError>),
}

/// Tabla de despacho única del proceso, ensamblada al arrancar la suite a
/// partir de la lista fija de módulos.
#[derive(Default)]
pub struct StepRegistry {
    matchers: Vec<StepMatcher>,
    schema: SnapshotSchema,
    installed: Vec<&'static str>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instala un módulo. Idempotente: una segunda instalación del mismo
    /// nombre no agrega nada.
    pub fn install(&mut self, module: &dyn StepModule) {
        if self.installed.contains(&module.name()) {
            return;
        }
        self.installed.push(module.name());
        module.register(self);
    }

    /// Registra un matcher. Un patrón inválido es un error de programación
    /// del módulo, detectado al arrancar la suite.
    pub fn step(&mut self, pattern: &str, handler: StepFn) -> Registration<'_> {
        let compiled = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid step pattern '{pattern}': {e}"));
        self.matchers.push(StepMatcher {
            pattern: compiled,
            handler,
            requires: Vec::new(),
        });
        // Recién insertado, el último siempre existe.
        let matcher = self.matchers.last_mut().expect("matcher just pushed");
        Registration { matcher }
    }

    pub fn given(&mut self, pattern: &str, handler: StepFn) -> Registration<'_> {
        self.step(pattern, handler)
    }

    pub fn when(&mut self, pattern: &str, handler: StepFn) -> Registration<'_> {
        self.step(pattern, handler)
    }

    pub fn then(&mut self, pattern: &str, handler: StepFn) -> Registration<'_> {
        self.step(pattern, handler)
    }

    /// Declara cómo reconstruir un handle persistido de tipo `T` al
    /// restaurar un snapshot.
    pub fn restorer<T: Persist>(&mut self) {
        self.schema.add::<T>();
    }

    pub fn schema(&self) -> SnapshotSchema {
        self.schema.clone()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Despacha un step contra el entorno del escenario. Cero matchers es
    /// Pending; más de uno es un fallo con ambos patrones nombrados.
    pub async fn dispatch(&self, env: &mut TestEnv, step: &StepSpec) -> StepDispatch {
        let hits: Vec<&StepMatcher> = self
            .matchers
            .iter()
            .filter(|m| m.pattern.is_match(&step.text))
            .collect();

        let matcher = match hits.as_slice() {
            [] => return StepDispatch::Unmatched,
            [one] => *one,
            many => {
                return StepDispatch::Completed(Err(StepError::Ambiguous {
                    text: step.text.clone(),
                    patterns: many.iter().map(|m| m.pattern.as_str().to_string()).collect(),
                }))
            }
        };

        // Precondiciones tipadas: dependencias entre módulos explícitas en
        // el matcher, verificadas antes de invocar el handler.
        for requirement in &matcher.requires {
            if !env.is_bound_id(requirement.type_id) {
                return StepDispatch::Completed(Err(StepError::RequiresUnbound {
                    text: step.text.clone(),
                    type_name: requirement.type_name,
                }));
            }
        }

        let captures = matcher
            .pattern
            .captures(&step.text)
            .map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        let args = StepArgs {
            captures,
            docstring: step.docstring.clone(),
            table: step.table.clone(),
        };
        StepDispatch::Completed((matcher.handler)(env, args).await)
    }
}

/// Handle de configuración del matcher recién registrado.
pub struct Registration<'r> {
    matcher: &'r mut StepMatcher,
}

impl Registration<'_> {
    /// Exige que un binding de tipo `T` exista antes de ejecutar el handler.
    pub fn requires<T: Send + Sync + 'static>(self) -> Self {
        self.matcher.requires.push(Requirement {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::StepKeyword;
    use futures::FutureExt;

    struct Cluster {
        namespace: String,
    }

    fn start_cluster(env: &mut TestEnv, _args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
        async move {
            env.set(Cluster { namespace: "acceptance".into() });
            Ok(())
        }
        .boxed()
    }

    fn use_cluster(env: &mut TestEnv, args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
        async move {
            let cluster = env.get::<Cluster>()?;
            if args.captures[0] == cluster.namespace {
                Ok(())
            } else {
                Err(StepError::failed(format!(
                    "expected namespace {}, got {}",
                    args.captures[0], cluster.namespace
                )))
            }
        }
        .boxed()
    }

    fn noop(_env: &mut TestEnv, _args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
        async move { Ok(()) }.boxed()
    }

    struct ClusterModule;

    impl StepModule for ClusterModule {
        fn name(&self) -> &'static str {
            "cluster"
        }

        fn register(&self, reg: &mut StepRegistry) {
            reg.given(r"^a cluster is running$", start_cluster);
            reg.then(r#"^the namespace is "([^"]*)"$"#, use_cluster).requires::<Cluster>();
        }
    }

    fn spec(text: &str) -> StepSpec {
        StepSpec {
            keyword: StepKeyword::Given,
            text: text.to_string(),
            docstring: None,
            table: None,
            line: 1,
        }
    }

    #[tokio::test]
    async fn dispatch_matches_and_captures() {
        let mut reg = StepRegistry::new();
        reg.install(&ClusterModule);
        let mut env = TestEnv::new();

        let d = reg.dispatch(&mut env, &spec("a cluster is running")).await;
        assert!(matches!(d, StepDispatch::Completed(Ok(()))));

        let d = reg.dispatch(&mut env, &spec(r#"the namespace is "acceptance""#)).await;
        assert!(matches!(d, StepDispatch::Completed(Ok(()))));
    }

    #[tokio::test]
    async fn unmet_precondition_is_a_distinct_error() {
        let mut reg = StepRegistry::new();
        reg.install(&ClusterModule);
        let mut env = TestEnv::new();

        let d = reg.dispatch(&mut env, &spec(r#"the namespace is "acceptance""#)).await;
        match d {
            StepDispatch::Completed(Err(StepError::RequiresUnbound { type_name, .. })) => {
                assert!(type_name.contains("Cluster"));
            }
            _ => panic!("expected RequiresUnbound"),
        }
    }

    #[tokio::test]
    async fn unknown_step_is_unmatched() {
        let reg = StepRegistry::new();
        let mut env = TestEnv::new();
        let d = reg.dispatch(&mut env, &spec("completely unknown words")).await;
        assert!(matches!(d, StepDispatch::Unmatched));
    }

    #[tokio::test]
    async fn ambiguous_match_names_both_patterns() {
        let mut reg = StepRegistry::new();
        reg.step(r"^the stub responds$", noop);
        reg.step(r"^the stub (responds|fails)$", noop);
        let mut env = TestEnv::new();

        let d = reg.dispatch(&mut env, &spec("the stub responds")).await;
        match d {
            StepDispatch::Completed(Err(StepError::Ambiguous { patterns, .. })) => {
                assert_eq!(patterns.len(), 2);
            }
            _ => panic!("expected Ambiguous"),
        }
    }

    #[test]
    fn install_is_idempotent() {
        let mut reg = StepRegistry::new();
        reg.install(&ClusterModule);
        let after_first = reg.len();
        reg.install(&ClusterModule);
        assert_eq!(reg.len(), after_first);
    }
}
