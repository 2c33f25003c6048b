//! file: core/src/bridge/inprocess.rs
//! description: in-process shared-library engine adapter using `libloading`.
//!
//! The library exports three C symbols: `engine_name`, `engine_ingest_json`
//! (graph JSON in, reply JSON out) and the optional `engine_free` for the
//! returned string. Without `engine_free` the reply is released with
//! `libc::free`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libloading::{Library, Symbol};

use super::engine::{AnalysisEngine, EngineReceipt};
use crate::cast::CAstGraph;

type EngineNameFn = unsafe extern "C" fn() -> *const c_char;
type EngineIngestJsonFn = unsafe extern "C" fn(graph_json: *const c_char) -> *mut c_char;
type EngineFreeFn = unsafe extern "C" fn(ptr: *mut c_char);

pub struct InProcessEngine {
    _lib: Arc<Library>,
    name: String,
    ingest_fn: EngineIngestJsonFn,
    free_fn: Option<EngineFreeFn>,
}

impl InProcessEngine {
    pub fn new(path: &Path) -> Result<Self, String> {
        match std::fs::metadata(path) {
            Ok(m) if m.is_file() => {}
            _ => return Err(format!("library path is not a file: {}", path.display())),
        }

        unsafe {
            let lib = Library::new(path).map_err(|e| {
                format!(
                    "failed to load library {}: {}. Verify the file is a shared library for this OS and architecture.",
                    path.display(),
                    e
                )
            })?;

            let name_sym: Symbol<EngineNameFn> = lib.get(b"engine_name\0").map_err(|e| {
                format!("missing symbol 'engine_name' in {}: {}", path.display(), e)
            })?;
            let raw = (*name_sym)();
            if raw.is_null() {
                return Err(format!("engine_name returned null for library {}", path.display()));
            }
            let name = match CStr::from_ptr(raw).to_str() {
                Ok(s) if !s.trim().is_empty() => s.to_string(),
                Ok(_) => return Err(format!("engine_name returned an empty string in {}", path.display())),
                Err(e) => return Err(format!("engine_name returned invalid UTF-8 in {}: {}", path.display(), e)),
            };

            let ingest_sym: Symbol<EngineIngestJsonFn> = lib.get(b"engine_ingest_json\0").map_err(|e| {
                format!("missing symbol 'engine_ingest_json' in {}: {}", path.display(), e)
            })?;
            let ingest_fn = *ingest_sym;

            let free_fn = lib.get::<EngineFreeFn>(b"engine_free\0").ok().map(|s| *s);

            Ok(InProcessEngine { _lib: Arc::new(lib), name, ingest_fn, free_fn })
        }
    }
}

#[async_trait]
impl AnalysisEngine for InProcessEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ingest(&self, graph: &CAstGraph) -> Result<EngineReceipt, String> {
        let body = serde_json::to_string(graph).map_err(|e| format!("serialize graph: {}", e))?;
        let cbody = CString::new(body).map_err(|e| format!("graph json: {}", e))?;

        let reply = unsafe {
            let out_ptr = (self.ingest_fn)(cbody.as_ptr());
            if out_ptr.is_null() {
                return Err(format!("engine '{}' returned null", self.name));
            }
            let text = CStr::from_ptr(out_ptr).to_string_lossy().into_owned();
            match self.free_fn {
                Some(free) => free(out_ptr),
                None => libc::free(out_ptr as *mut libc::c_void),
            }
            text
        };

        let json: serde_json::Value =
            serde_json::from_str(&reply).map_err(|e| format!("invalid json from engine: {}", e))?;
        if json.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let err = json
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("engine '{}' reported failure", self.name));
            return Err(err);
        }
        let nodes = json.get("nodes").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        Ok(EngineReceipt { engine: self.name.clone(), nodes })
    }
}
