use std::path::Path;

use crate::errors::HarnessError;

use super::model::{Feature, ScenarioSpec, StepKeyword, StepSpec};

/// Dónde deben colgarse los próximos steps.
enum Section {
    Preamble,
    Background,
    Scenario,
}

/// Parsea el texto completo de un feature file.
pub fn parse_feature(path: &Path, text: &str) -> Result<Feature, HarnessError> {
    let err = |line: usize, reason: &str| HarnessError::FeatureParse {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    };

    let mut feature: Option<Feature> = None;
    let mut section = Section::Preamble;
    let mut pending_tags: Vec<String> = Vec::new();

    let mut lines = text.lines().enumerate().peekable();
    while let Some((idx, raw)) = lines.next() {
        let lineno = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('@') {
            for tag in line.split_whitespace() {
                let tag = tag.strip_prefix('@').unwrap_or(tag);
                if tag.is_empty() {
                    return Err(err(lineno, "empty tag"));
                }
                pending_tags.push(tag.to_string());
            }
            continue;
        }

        if let Some(name) = line.strip_prefix("Feature:") {
            if feature.is_some() {
                return Err(err(lineno, "multiple Feature declarations in one file"));
            }
            feature = Some(Feature {
                name: name.trim().to_string(),
                path: path.to_path_buf(),
                tags: std::mem::take(&mut pending_tags),
                background: Vec::new(),
                scenarios: Vec::new(),
            });
            continue;
        }

        let feature_ref = match feature.as_mut() {
            Some(f) => f,
            None => return Err(err(lineno, "content before Feature declaration")),
        };

        if line.starts_with("Scenario Outline:") || line.starts_with("Scenario Template:") {
            return Err(err(lineno, "scenario outlines are not supported"));
        }

        if line.starts_with("Background:") {
            if !pending_tags.is_empty() {
                return Err(err(lineno, "tags are not allowed on Background"));
            }
            if !feature_ref.background.is_empty() || !feature_ref.scenarios.is_empty() {
                return Err(err(lineno, "Background must precede all scenarios"));
            }
            section = Section::Background;
            continue;
        }

        if let Some(name) = line.strip_prefix("Scenario:") {
            feature_ref.scenarios.push(ScenarioSpec {
                name: name.trim().to_string(),
                tags: std::mem::take(&mut pending_tags),
                steps: Vec::new(),
                line: lineno,
            });
            section = Section::Scenario;
            continue;
        }

        // Lo único restante válido es un step.
        let (keyword_word, rest) = match line.split_once(' ') {
            Some(split) => split,
            None => (line, ""),
        };
        let keyword = StepKeyword::parse(keyword_word)
            .ok_or_else(|| err(lineno, &format!("unrecognized line '{line}'")))?;

        let mut step = StepSpec {
            keyword,
            text: rest.trim().to_string(),
            docstring: None,
            table: None,
            line: lineno,
        };

        // Argumento opcional adosado: docstring delimitado o tabla.
        if let Some(&(_, next)) = lines.peek() {
            let trimmed = next.trim();
            if trimmed == "\"\"\"" || trimmed == "```" {
                let (_, opener) = lines.next().unwrap_or((idx, next));
                step.docstring = Some(read_docstring(path, &mut lines, opener)?);
            }
        }
        if step.docstring.is_none() {
            let mut rows = Vec::new();
            while let Some(&(_, next)) = lines.peek() {
                let trimmed = next.trim();
                if !trimmed.starts_with('|') {
                    break;
                }
                rows.push(parse_table_row(trimmed));
                lines.next();
            }
            if !rows.is_empty() {
                step.table = Some(rows);
            }
        }

        match section {
            Section::Background => feature_ref.background.push(step),
            Section::Scenario => {
                // `scenarios` no está vacío: Section::Scenario solo se fija al
                // haber insertado uno.
                if let Some(scenario) = feature_ref.scenarios.last_mut() {
                    scenario.steps.push(step);
                }
            }
            Section::Preamble => return Err(err(lineno, "step outside Background or Scenario")),
        }
    }

    let feature = feature.ok_or_else(|| err(0, "no Feature declaration found"))?;
    Ok(feature)
}

fn read_docstring<'a, I>(
    path: &Path,
    lines: &mut std::iter::Peekable<I>,
    opener: &str,
) -> Result<String, HarnessError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let delimiter = opener.trim();
    let indent = opener.len() - opener.trim_start().len();
    let mut content: Vec<String> = Vec::new();
    for (_, raw) in lines.by_ref() {
        if raw.trim() == delimiter {
            return Ok(content.join("\n"));
        }
        let stripped = strip_indent(raw, indent);
        content.push(stripped.to_string());
    }
    Err(HarnessError::FeatureParse {
        path: path.to_path_buf(),
        line: 0,
        reason: "unterminated docstring".to_string(),
    })
}

fn strip_indent(raw: &str, indent: usize) -> &str {
    let mut remaining = indent;
    let mut chars = raw.char_indices();
    for (i, c) in chars.by_ref() {
        if remaining == 0 || c != ' ' {
            return &raw[i..];
        }
        remaining -= 1;
    }
    ""
}

fn parse_table_row(line: &str) -> Vec<String> {
    let inner = line.trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}
