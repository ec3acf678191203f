use crate::errors::HarnessError;

/// Expresión de filtrado por tags, sintaxis godog:
/// `@a` exige el tag, `~@a` lo excluye, `,` une con OR y `&&` con AND.
/// La expresión vacía acepta todo.
#[derive(Debug, Clone, Default)]
pub struct TagExpr {
    /// AND de grupos OR.
    conjuncts: Vec<Vec<Atom>>,
}

#[derive(Debug, Clone)]
struct Atom {
    negated: bool,
    tag: String,
}

impl TagExpr {
    pub fn parse(expr: &str) -> Result<Self, HarnessError> {
        let mut conjuncts = Vec::new();
        for part in expr.split("&&") {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let mut atoms = Vec::new();
            for raw in part.split(',') {
                let mut raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let negated = raw.starts_with('~');
                if negated {
                    raw = raw[1..].trim_start();
                }
                let tag = raw.strip_prefix('@').unwrap_or(raw);
                if tag.is_empty() {
                    return Err(HarnessError::TagExpression {
                        expr: expr.to_string(),
                        reason: "empty tag atom".to_string(),
                    });
                }
                atoms.push(Atom { negated, tag: tag.to_string() });
            }
            if !atoms.is_empty() {
                conjuncts.push(atoms);
            }
        }
        Ok(Self { conjuncts })
    }

    pub fn eval(&self, tags: &[String]) -> bool {
        self.conjuncts.iter().all(|group| {
            group.iter().any(|atom| {
                let present = tags.iter().any(|t| t == &atom.tag);
                present != atom.negated
            })
        })
    }
}
