//! Vocabulario base del binario: variables nombradas con alcance de
//! escenario. Sirve de steps de humo para la suite y de plantilla para
//! módulos de dominio propios.

use std::collections::BTreeMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use accept_core::{
    Persist, ScenarioLogger, StepArgs, StepError, StepModule, StepRegistry, TestEnv,
};

/// Mapa de variables del escenario. Persistible: sobrevive a un run con
/// `--persist` y reaparece con `--restore`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vars {
    pub values: BTreeMap<String, String>,
}

impl Persist for Vars {
    const KIND: &'static str = "vars";
}

fn set_var(env: &mut TestEnv, args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
    async move {
        if !env.is_bound::<Vars>() {
            env.set_persistent(Vars::default());
        }
        let vars = env.get_mut::<Vars>()?;
        vars.values.insert(args.captures[0].clone(), args.captures[1].clone());
        Ok(())
    }
    .boxed()
}

fn set_vars_from_table(env: &mut TestEnv, args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
    async move {
        let table = args
            .table
            .ok_or_else(|| StepError::failed("this step needs a table of name/value rows"))?;
        if !env.is_bound::<Vars>() {
            env.set_persistent(Vars::default());
        }
        let vars = env.get_mut::<Vars>()?;
        for row in table {
            match row.as_slice() {
                [name, value] => {
                    vars.values.insert(name.clone(), value.clone());
                }
                other => {
                    return Err(StepError::failed(format!(
                        "expected 2 columns per row, got {}",
                        other.len()
                    )))
                }
            }
        }
        Ok(())
    }
    .boxed()
}

fn assert_var(env: &mut TestEnv, args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
    async move {
        let vars = env.get::<Vars>()?;
        let name = &args.captures[0];
        let expected = &args.captures[1];
        match vars.values.get(name) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(StepError::failed(format!(
                "variable {name} is {actual:?}, expected {expected:?}"
            ))),
            None => Err(StepError::failed(format!("variable {name} is not set"))),
        }
    }
    .boxed()
}

fn log_note(env: &mut TestEnv, args: StepArgs) -> BoxFuture<'_, Result<(), StepError>> {
    async move {
        let logger = env.get::<ScenarioLogger>()?;
        logger.logf(format_args!("note: {}", args.captures[0]));
        Ok(())
    }
    .boxed()
}

pub struct VarsModule;

impl StepModule for VarsModule {
    fn name(&self) -> &'static str {
        "vars"
    }

    fn register(&self, reg: &mut StepRegistry) {
        reg.given(r#"^the variable "([^"]+)" is set to "([^"]*)"$"#, set_var);
        reg.given(r"^the following variables are set:$", set_vars_from_table);
        reg.then(r#"^the variable "([^"]+)" equals "([^"]*)"$"#, assert_var)
            .requires::<Vars>();
        reg.when(r#"^I note "([^"]*)"$"#, log_note);
        reg.restorer::<Vars>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accept_core::{StepDispatch, StepKeyword, StepSpec};

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
    async fn set_y_assert_de_variables() {
        let mut reg = StepRegistry::new();
        reg.install(&VarsModule);
        let mut env = TestEnv::new();

        let d = reg
            .dispatch(&mut env, &spec(r#"the variable "HOST" is set to "localhost""#))
            .await;
        assert!(matches!(d, StepDispatch::Completed(Ok(()))));

        let d = reg
            .dispatch(&mut env, &spec(r#"the variable "HOST" equals "localhost""#))
            .await;
        assert!(matches!(d, StepDispatch::Completed(Ok(()))));

        let d = reg
            .dispatch(&mut env, &spec(r#"the variable "HOST" equals "remote""#))
            .await;
        assert!(matches!(d, StepDispatch::Completed(Err(StepError::Failed(_)))));
    }

    #[tokio::test]
    async fn assert_sin_bindings_es_precondicion() {
        let mut reg = StepRegistry::new();
        reg.install(&VarsModule);
        let mut env = TestEnv::new();

        let d = reg
            .dispatch(&mut env, &spec(r#"the variable "HOST" equals "localhost""#))
            .await;
        assert!(matches!(
            d,
            StepDispatch::Completed(Err(StepError::RequiresUnbound { .. }))
        ));
    }

    #[tokio::test]
    async fn tabla_de_variables() {
        let mut reg = StepRegistry::new();
        reg.install(&VarsModule);
        let mut env = TestEnv::new();

        let mut step = spec("the following variables are set:");
        step.table = Some(vec![
            vec!["IMAGE".into(), "registry/app:latest".into()],
            vec!["POLICY".into(), "default".into()],
        ]);
        let d = reg.dispatch(&mut env, &step).await;
        assert!(matches!(d, StepDispatch::Completed(Ok(()))));

        let vars = env.get::<Vars>().expect("vars bound");
        assert_eq!(vars.values.get("POLICY").map(String::as_str), Some("default"));
    }
}
