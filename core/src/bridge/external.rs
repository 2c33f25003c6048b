//! file: core/src/bridge/external.rs
//! description: external (out-of-process) engine adapter.
//!
//! `ExternalEngine` runs `<exe> ingest`, writes the graph JSON to its stdin
//! and reads `{ "ok": bool, "nodes": n, "error": "..." }` from its stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use async_trait::async_trait;

use super::engine::{AnalysisEngine, EngineReceipt};
use crate::cast::CAstGraph;

pub struct ExternalEngine {
    name: String,
    exe: PathBuf,
}

impl ExternalEngine {
    pub fn new(name: String, exe: PathBuf) -> Self {
        Self { name, exe }
    }

    pub fn exe(&self) -> &std::path::Path {
        &self.exe
    }
}

#[async_trait]
impl AnalysisEngine for ExternalEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ingest(&self, graph: &CAstGraph) -> Result<EngineReceipt, String> {
        let body = serde_json::to_vec(graph).map_err(|e| format!("serialize graph: {}", e))?;

        let mut cmd = Command::new(&self.exe);
        cmd.arg("ingest");
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        // Captured so engine diagnostics end up in the error message.
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("spawn engine '{}': {}", self.exe.display(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&body) {
                drop(stdin);
                // reap the engine; it may already have exited
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("write stdin: {}", e));
            }
            // close stdin so the engine sees EOF
            drop(stdin);
        }

        let output = child.wait_with_output().map_err(|e| format!("wait engine: {}", e))?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let reply = serde_json::from_str::<serde_json::Value>(&stdout);
        if !output.status.success() {
            if let Some(err) = reply.as_ref().ok().and_then(|j| j.get("error")).and_then(|v| v.as_str()) {
                return Err(format!("{} (engine stderr: {})", err, stderr));
            }
            return Err(format!(
                "engine '{}' exit code: {}\nstdout: {}\nstderr: {}",
                self.name, output.status, stdout, stderr
            ));
        }

        let json = reply.map_err(|e| format!("parse engine output: {}\nstdout: {}\nstderr: {}", e, stdout, stderr))?;
        if json.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            return match json.get("error").and_then(|v| v.as_str()) {
                Some(err) => Err(err.to_string()),
                None => Err(format!("engine '{}' reported failure: {}", self.name, json)),
            };
        }
        let nodes = json.get("nodes").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        Ok(EngineReceipt { engine: self.name.clone(), nodes })
    }
}
