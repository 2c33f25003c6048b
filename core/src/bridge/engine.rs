//! file: core/src/bridge/engine.rs
//! description: analysis-engine trait and runtime engine registry.
//!
//! Defines the `AnalysisEngine` trait implemented by the external and
//! in-process adapters, and `EngineRegistry`, which turns discovered
//! manifests into engine instances.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::external::ExternalEngine;
use super::inprocess::InProcessEngine;
use super::manifest::{EngineManifest, discover_manifests_in_dir};
use crate::cast::CAstGraph;

/// What an engine reports back after ingesting a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReceipt {
    pub engine: String,
    /// Number of nodes the engine accepted.
    pub nodes: usize,
}

#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Name of the engine (e.g. "echo").
    fn name(&self) -> &str;

    /// Takes ownership of a fully lowered module.
    async fn ingest(&self, graph: &CAstGraph) -> Result<EngineReceipt, String>;
}

#[derive(Clone, Debug)]
pub struct EngineDescriptor {
    pub manifest: EngineManifest,
    /// Directory holding the manifest.
    pub path: Option<PathBuf>,
}

#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn AnalysisEngine>>,
    descriptors: HashMap<String, EngineDescriptor>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        EngineRegistry::default()
    }

    pub fn register(&mut self, engine: Arc<dyn AnalysisEngine>) {
        self.engines.insert(engine.name().to_string(), engine);
    }

    pub fn register_descriptor(&mut self, manifest: EngineManifest, path: Option<PathBuf>) {
        self.descriptors.insert(manifest.name.clone(), EngineDescriptor { manifest, path });
    }

    /// Registers every manifest found under `dir` and instantiates the
    /// engines whose entry point exists. Returns the number of manifests.
    pub fn discover(&mut self, dir: &std::path::Path) -> Result<usize, String> {
        let manifests = discover_manifests_in_dir(dir)?;
        let count = manifests.len();
        for (manifest, path) in manifests {
            let dir_path = path.parent().map(|p| p.to_path_buf());
            self.register_descriptor(manifest, dir_path);
        }
        let descriptors: Vec<EngineDescriptor> = self.descriptors.values().cloned().collect();
        for desc in &descriptors {
            self.try_register(desc);
        }
        Ok(count)
    }

    /// Instantiates the engine described by `desc`: an in-process library
    /// when the manifest asks for one and it loads, else the executable.
    pub fn try_register(&mut self, desc: &EngineDescriptor) {
        let Some(dir) = &desc.path else {
            return;
        };
        let entry = desc.manifest.entry.clone().unwrap_or_else(|| desc.manifest.name.clone());

        if desc.manifest.prefers_inprocess() {
            for candidate in library_candidates(&dir.join(&entry), &entry) {
                if !candidate.is_file() {
                    continue;
                }
                match InProcessEngine::new(&candidate) {
                    Ok(engine) => {
                        info!("registered in-process engine from {}", candidate.display());
                        self.register(Arc::new(engine));
                        return;
                    }
                    Err(e) => warn!("in-process load failed for {}: {}", candidate.display(), e),
                }
            }
        }

        let mut exe = dir.join(&entry);
        if !exe.exists() {
            let with_ext = exe.with_extension("exe");
            if with_ext.exists() {
                exe = with_ext;
            }
        }
        if exe.is_file() {
            info!("registered external engine {}", exe.display());
            self.register(Arc::new(ExternalEngine::new(desc.manifest.name.clone(), exe)));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AnalysisEngine>> {
        self.engines.get(name).cloned()
    }

    pub fn get_descriptor(&self, name: &str) -> Option<&EngineDescriptor> {
        self.descriptors.get(name)
    }

    /// Descriptors sorted by engine name.
    pub fn descriptors(&self) -> Vec<&EngineDescriptor> {
        let mut out: Vec<&EngineDescriptor> = self.descriptors.values().collect();
        out.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
        out
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Platform-specific file names a shared library `entry` may have.
fn library_candidates(base: &std::path::Path, entry: &str) -> Vec<PathBuf> {
    let prefixed = base.with_file_name(format!("lib{}", entry));
    if cfg!(target_os = "windows") {
        vec![base.with_extension("dll"), base.to_path_buf()]
    } else if cfg!(target_os = "macos") {
        vec![base.with_extension("dylib"), prefixed.with_extension("dylib"), base.to_path_buf()]
    } else {
        vec![base.with_extension("so"), prefixed.with_extension("so"), base.to_path_buf()]
    }
}
