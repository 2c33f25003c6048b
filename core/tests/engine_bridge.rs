use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sil2cast_core::bridge::{EngineManifest, ExternalEngine, discover_manifests_in_dir};
use sil2cast_core::cast::{BridgeError, CAstBuilder, CAstGraph, CAstKind, ConstValue, NodeArena, NodeRef};
use sil2cast_core::sil::{DebugLoc, InstKind, ModuleBuilder, SilModule};
use sil2cast_core::{
    AnalysisEngine, EngineReceipt, EngineRegistry, Location, LowerOptions, SilLowerer, lower_and_submit,
    lower_module, submit_module,
};

fn sample_module(name: &str) -> SilModule {
    let mut b = ModuleBuilder::new(name);
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let lit = b.add_inst(bb0, InstKind::IntegerLiteral { value: 7 }, vec![], &["Int"]);
    b.with_loc(lit.id, DebugLoc::new("main.swift", 1, 1));
    b.add_inst(bb0, InstKind::Return, vec![lit.result().expect("literal")], &[]);
    b.finish()
}

#[derive(Default)]
struct RecordingEngine {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl AnalysisEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    async fn ingest(&self, graph: &CAstGraph) -> Result<EngineReceipt, String> {
        self.seen.lock().map_err(|e| e.to_string())?.push(graph.module.clone());
        Ok(EngineReceipt { engine: self.name().to_string(), nodes: graph.nodes.len() })
    }
}

struct RejectingEngine;

#[async_trait]
impl AnalysisEngine for RejectingEngine {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn ingest(&self, _graph: &CAstGraph) -> Result<EngineReceipt, String> {
        Err("out of licenses".to_string())
    }
}

/// Refuses every construction call once `budget` nodes exist.
struct ExhaustedBuilder {
    inner: NodeArena,
    budget: usize,
}

impl ExhaustedBuilder {
    fn check(&self) -> Result<(), BridgeError> {
        if self.inner.len() >= self.budget {
            return Err(BridgeError::new("test.builder", "node budget exhausted"));
        }
        Ok(())
    }
}

impl CAstBuilder for ExhaustedBuilder {
    fn make_constant(&mut self, value: ConstValue) -> Result<NodeRef, BridgeError> {
        self.check()?;
        self.inner.make_constant(value)
    }

    fn make_node(&mut self, kind: CAstKind, children: Vec<NodeRef>) -> Result<NodeRef, BridgeError> {
        self.check()?;
        self.inner.make_node(kind, children)
    }

    fn make_named_node(&mut self, kind: CAstKind, name: &str, children: Vec<NodeRef>) -> Result<NodeRef, BridgeError> {
        self.check()?;
        self.inner.make_named_node(kind, name, children)
    }

    fn record_position(&mut self, node: NodeRef, location: &Location) -> Result<(), BridgeError> {
        self.inner.record_position(node, location)
    }
}

#[test]
fn builder_failure_aborts_the_module() {
    let module = sample_module("limited");
    let mut builder = ExhaustedBuilder { inner: NodeArena::new(), budget: 0 };
    let mut lowerer = SilLowerer::new(LowerOptions::default());

    let err = lowerer.lower(&module, &mut builder).err().expect("builder failure");
    assert!(err.message().contains("module 'limited'"), "{}", err.message());
    assert!(err.message().contains("node budget exhausted"));
    assert_eq!(err.issuer(), "test.builder");
    assert_eq!(err.location().map(|l| l.line), Some(1));
}

#[test]
fn engine_receives_the_whole_graph() {
    let engine = RecordingEngine::default();
    let (lowered, receipt) =
        lower_and_submit(&sample_module("first"), &LowerOptions::default(), &engine).expect("submitted");

    assert_eq!(receipt.engine, "recording");
    assert_eq!(receipt.nodes, lowered.graph.nodes.len());
    assert_eq!(*engine.seen.lock().expect("lock"), vec!["first".to_string()]);
}

#[test]
fn engine_is_not_called_for_malformed_modules() {
    let mut b = ModuleBuilder::new("broken");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    b.add_inst(bb0, InstKind::Load, vec![], &["Int"]);
    let module = b.finish();

    let engine = RecordingEngine::default();
    assert!(lower_and_submit(&module, &LowerOptions::default(), &engine).is_err());
    assert!(engine.seen.lock().expect("lock").is_empty());
}

#[test]
fn engine_errors_name_module_and_engine() {
    let lowered = lower_module(&sample_module("payroll"), &LowerOptions::default()).expect("lowered");
    let err = submit_module(&lowered.graph, &RejectingEngine).expect_err("rejected");
    use sil2cast_core::Sil2CastErrorExt;
    assert_eq!(err.issuer(), "sil2cast.engine.rejecting");
    assert_eq!(err.message(), "module 'payroll': out of licenses");
}

#[test]
fn invalid_graphs_are_not_submitted() {
    let lowered = lower_module(&sample_module("m"), &LowerOptions::default()).expect("lowered");
    let mut graph = lowered.graph;
    graph.nodes[0].children = vec![NodeRef(99)];

    let engine = RecordingEngine::default();
    assert!(graph.validate().is_err());
    assert!(submit_module(&graph, &engine).is_err());
    assert!(engine.seen.lock().expect("lock").is_empty());
}

#[test]
fn graph_survives_json_round_trip() {
    let lowered = lower_module(&sample_module("json"), &LowerOptions::default()).expect("lowered");
    assert_eq!(lowered.graph.positions.len(), 1);

    let text = serde_json::to_string(&lowered.graph).expect("serialize");
    let back: CAstGraph = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, lowered.graph);
    back.validate().expect("valid");

    let literal = back.nodes.iter().position(|n| n.kind == CAstKind::Constant).expect("literal");
    let literal = NodeRef(literal as u32);
    let listing = back.to_string();
    assert!(listing.starts_with("Module json\n"));
    assert!(listing.contains(&format!("      Constant = 7 {}\n", literal)), "{}", listing);
    assert!(listing.contains(&format!("        -> {}\n", literal)), "{}", listing);
    assert_eq!(listing.matches("Constant = 7").count(), 1);
}

#[test]
fn missing_external_engine_fails_cleanly() {
    let lowered = lower_module(&sample_module("m"), &LowerOptions::default()).expect("lowered");
    let engine = ExternalEngine::new("ghost".to_string(), "/no/such/engine/binary".into());
    let err = submit_module(&lowered.graph, &engine).expect_err("spawn fails");
    use sil2cast_core::Sil2CastErrorExt;
    assert!(err.message().contains("spawn engine"), "{}", err.message());
    assert!(err.message().starts_with("module 'm':"));
}

#[test]
fn registry_discovers_manifests_without_binaries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine_dir = dir.path().join("echo");
    std::fs::create_dir(&engine_dir).expect("engine dir");
    std::fs::write(
        engine_dir.join("manifest.json"),
        r#"{ "name": "echo", "version": "0.1.0", "kind": "external", "entry": "echo_engine" }"#,
    )
    .expect("manifest");
    std::fs::create_dir(dir.path().join("not-an-engine")).expect("plain dir");

    let mut registry = EngineRegistry::new();
    assert_eq!(registry.discover(dir.path()).expect("discover"), 1);
    let descriptors = registry.descriptors();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].manifest.kind_label(), "external");
    assert!(registry.registered_names().is_empty());
    assert!(registry.get("echo").is_none());

    registry.register(Arc::new(RecordingEngine::default()));
    assert_eq!(registry.registered_names(), vec!["recording".to_string()]);
}

#[test]
fn manifests_with_unknown_kind_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine_dir = dir.path().join("odd");
    std::fs::create_dir(&engine_dir).expect("engine dir");
    std::fs::write(engine_dir.join("manifest.json"), r#"{ "name": "odd", "kind": "wasm" }"#).expect("manifest");

    let err = discover_manifests_in_dir(dir.path()).expect_err("unknown kind");
    assert!(err.contains("unknown kind 'wasm'"));
    assert!(discover_manifests_in_dir(dir.path().join("missing")).expect("missing dir").is_empty());

    let manifest = EngineManifest {
        name: "lib".to_string(),
        version: String::new(),
        description: String::new(),
        kind: Some("inprocess".to_string()),
        entry: None,
    };
    assert!(manifest.prefers_inprocess());
    manifest.validate().expect("valid manifest");
}

#[cfg(unix)]
mod script_engines {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use sil2cast_core::bridge::ExternalEngine;
    use sil2cast_core::cast::CAstGraph;
    use sil2cast_core::sil::{InstKind, ModuleBuilder};
    use sil2cast_core::{BridgeError, EngineReceipt, LowerOptions, Sil2CastErrorExt, lower_module, submit_module};

    use super::sample_module;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    /// Retries while the freshly written script is still open for writing
    /// somewhere else in the test process (ETXTBSY).
    fn submit(graph: &CAstGraph, engine: &ExternalEngine) -> Result<EngineReceipt, BridgeError> {
        let mut attempts = 0;
        loop {
            match submit_module(graph, engine) {
                Err(err) if attempts < 5 && err.message().contains("Text file busy") => {
                    attempts += 1;
                    std::thread::sleep(Duration::from_millis(50));
                }
                result => return result,
            }
        }
    }

    #[test]
    fn script_engine_receives_the_graph_and_reports_nodes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = write_script(
            dir.path(),
            "count_engine",
            r#"cat > "$(dirname "$0")/received.json"
echo '{"ok":true,"nodes":42}'"#,
        );
        let lowered = lower_module(&sample_module("scripted"), &LowerOptions::default()).expect("lowered");
        let engine = ExternalEngine::new("counter".to_string(), exe);

        let receipt = submit(&lowered.graph, &engine).expect("ingested");
        assert_eq!(receipt.engine, "counter");
        assert_eq!(receipt.nodes, 42);

        let received = std::fs::read_to_string(dir.path().join("received.json")).expect("received graph");
        let received: CAstGraph = serde_json::from_str(&received).expect("graph json");
        assert_eq!(received.module, "scripted");
        assert_eq!(received, lowered.graph);
    }

    #[test]
    fn script_engine_errors_name_the_module() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = write_script(
            dir.path(),
            "picky_engine",
            r#"cat > /dev/null
echo '{"ok":false,"error":"graph too large"}'"#,
        );
        let lowered = lower_module(&sample_module("m"), &LowerOptions::default()).expect("lowered");
        let engine = ExternalEngine::new("picky".to_string(), exe);

        let err = submit(&lowered.graph, &engine).expect_err("engine refuses");
        assert_eq!(err.issuer(), "sil2cast.engine.picky");
        assert_eq!(err.message(), "module 'm': graph too large");
    }

    #[test]
    fn engine_exiting_before_reading_is_reaped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = write_script(dir.path(), "quitter", "exit 3");

        let mut b = ModuleBuilder::new("big");
        let f = b.add_function("f");
        let bb0 = b.add_block(f);
        for value in 0..20_000 {
            b.add_inst(bb0, InstKind::IntegerLiteral { value }, vec![], &["Int"]);
        }
        b.add_inst(bb0, InstKind::Return, vec![], &[]);
        let lowered = lower_module(&b.finish(), &LowerOptions::default()).expect("lowered");
        let engine = ExternalEngine::new("quitter".to_string(), exe);

        let err = submit(&lowered.graph, &engine).expect_err("engine quits");
        assert!(err.message().starts_with("module 'big':"), "{}", err.message());
        assert!(
            err.message().contains("write stdin") || err.message().contains("exit code"),
            "{}",
            err.message()
        );
    }
}
