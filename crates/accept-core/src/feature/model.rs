use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    And,
    But,
}

impl StepKeyword {
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "Given" => Some(Self::Given),
            "When" => Some(Self::When),
            "Then" => Some(Self::Then),
            "And" => Some(Self::And),
            "But" => Some(Self::But),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }
}

/// Un step declarado, con su argumento opcional (docstring o tabla).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub keyword: StepKeyword,
    pub text: String,
    pub docstring: Option<String>,
    pub table: Option<Vec<Vec<String>>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    /// Tags propios del escenario, sin los heredados del feature.
    pub tags: Vec<String>,
    pub steps: Vec<StepSpec>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    /// Steps del `Background:`, antepuestos a cada escenario al ejecutar.
    pub background: Vec<StepSpec>,
    pub scenarios: Vec<ScenarioSpec>,
}

impl Feature {
    /// Tags efectivos de un escenario: los del feature más los propios.
    pub fn effective_tags(&self, scenario: &ScenarioSpec) -> Vec<String> {
        let mut tags = self.tags.clone();
        for t in &scenario.tags {
            if !tags.contains(t) {
                tags.push(t.clone());
            }
        }
        tags
    }
}
