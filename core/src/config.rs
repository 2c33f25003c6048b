//! file: core/src/config.rs
//! description: options for the lowering pass and engine discovery.
//!
//! Both option sets can be read from the environment. `from_vars` takes a
//! lookup function so callers (and tests) can supply their own variables.

use std::path::PathBuf;

pub const ENV_OUTPUT: &str = "SIL2CAST_OUTPUT";
pub const ENV_PRINT: &str = "SIL2CAST_PRINT";
pub const ENV_ENGINE_DIR: &str = "SIL2CAST_ENGINE_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowerOptions {
    /// Emit the per-instruction breakdown through the logger.
    pub print: bool,
    /// Directory receiving one debug dump per module.
    pub dump_dir: Option<PathBuf>,
    /// Reference-counting placeholders produce no node at all.
    pub drop_lifetime_markers: bool,
}

impl LowerOptions {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LowerOptions {
            print: lookup(ENV_PRINT).map(|v| is_truthy(&v)).unwrap_or(false),
            dump_dir: lookup(ENV_OUTPUT).filter(|v| !v.trim().is_empty()).map(PathBuf::from),
            drop_lifetime_markers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub engine_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { engine_dir: PathBuf::from("engines") }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENV_ENGINE_DIR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => EngineConfig { engine_dir: PathBuf::from(dir) },
            None => EngineConfig::default(),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
