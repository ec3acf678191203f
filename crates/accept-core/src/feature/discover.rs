use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use crate::errors::HarnessError;

use super::model::Feature;
use super::parser::parse_feature;

/// Descubre y parsea todos los `*.feature` bajo `dir`, en orden de ruta
/// (determinista). Cero archivos es un error de configuración fatal.
pub fn discover(dir: &Path) -> Result<Vec<Feature>, HarnessError> {
    let pattern = dir.join("*.feature");
    let pattern = pattern.to_string_lossy();

    let mut paths: Vec<PathBuf> = glob(&pattern)
        .map_err(|e| HarnessError::Internal(format!("bad glob pattern '{pattern}': {e}")))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(HarnessError::NoFeatureFiles { dir: dir.to_path_buf() });
    }
    debug!(count = paths.len(), dir = %dir.display(), "feature files discovered");

    let mut features = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|e| HarnessError::FeatureIo {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        features.push(parse_feature(&path, &text)?);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zero_feature_files_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = discover(dir.path()).expect_err("must fail");
        assert!(matches!(err, HarnessError::NoFeatureFiles { .. }));
    }

    #[test]
    fn discovers_in_path_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, feature) in [("b.feature", "Feature: bbb\n"), ("a.feature", "Feature: aaa\n")] {
            let mut f = std::fs::File::create(dir.path().join(name)).expect("create");
            f.write_all(feature.as_bytes()).expect("write");
        }
        let features = discover(dir.path()).expect("discover");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "aaa");
        assert_eq!(features[1].name, "bbb");
    }
}
