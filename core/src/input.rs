//! file: core/src/input.rs
//! description: reading module documents from disk.

use std::path::{Path, PathBuf};

use crate::sil::{ModuleLoadError, SilModule, load_module_str};

const ISSUER: &str = "sil2cast.input";

/// Reads and builds the module document at `path`. The module's source file
/// defaults to `path` when the document does not name one.
pub fn load_module_file<P: AsRef<Path>>(path: P) -> Result<SilModule, ModuleLoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ModuleLoadError::new(ISSUER, format!("cannot read module: {}", e)).in_file(display.clone()))?;
    let mut module = load_module_str(&text).map_err(|e| e.in_file(display.clone()))?;
    if module.source_file.is_none() {
        module.source_file = Some(display);
    }
    Ok(module)
}

/// Expands glob patterns into input paths, keeping plain paths as given.
/// A pattern matching nothing is an error.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, ModuleLoadError> {
    let mut out = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let paths = glob::glob(pattern)
            .map_err(|e| ModuleLoadError::new(ISSUER, format!("invalid pattern '{}': {}", pattern, e)))?;
        let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        if matched.is_empty() {
            return Err(ModuleLoadError::new(ISSUER, format!("pattern '{}' matched no files", pattern)));
        }
        matched.sort();
        out.extend(matched);
    }
    Ok(out)
}
