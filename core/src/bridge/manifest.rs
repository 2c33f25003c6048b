//! file: core/src/bridge/manifest.rs
//! description: engine manifest types and discovery helpers.
//!
//! Each engine lives in its own subdirectory with a `manifest.json`
//! describing its name, version and how to load it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineManifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Loader hint: "inprocess" (shared library) or "external" (separate
    /// process). Defaults to external.
    #[serde(default)]
    pub kind: Option<String>,
    /// File name of the library or executable; defaults to `name`.
    #[serde(default)]
    pub entry: Option<String>,
}

impl EngineManifest {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EngineManifest, String> {
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read manifest: {}", e))?;
        serde_json::from_str(&raw).map_err(|e| format!("parse manifest: {}", e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("manifest name is empty".to_string());
        }
        match self.kind.as_deref() {
            None | Some("inprocess") | Some("external") => Ok(()),
            Some(other) => Err(format!("manifest '{}' has unknown kind '{}'", self.name, other)),
        }
    }

    pub fn prefers_inprocess(&self) -> bool {
        self.kind.as_deref() == Some("inprocess")
    }

    pub fn kind_label(&self) -> &str {
        if self.prefers_inprocess() { "inprocess" } else { "external" }
    }
}

/// Returns `(manifest, manifest_path)` for every subdirectory of `dir` that
/// holds a valid `manifest.json`. A missing directory yields no manifests.
pub fn discover_manifests_in_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<(EngineManifest, PathBuf)>, String> {
    let mut out = Vec::new();
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(out);
    }
    for entry in std::fs::read_dir(dir).map_err(|e| format!("read dir: {}", e))? {
        let entry = entry.map_err(|e| format!("read dir entry: {}", e))?;
        if !entry.file_type().map_err(|e| format!("file type: {}", e))?.is_dir() {
            continue;
        }
        let manifest_path = entry.path().join("manifest.json");
        if manifest_path.exists() {
            let manifest = EngineManifest::load_from_file(&manifest_path)?;
            manifest.validate()?;
            out.push((manifest, manifest_path));
        }
    }
    out.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    Ok(out)
}
