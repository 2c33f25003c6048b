//! Hand-off of lowered modules to analysis engines.
//!
//! A module is always lowered completely before the engine sees it; a
//! lowering failure means the engine is never called for that module.

pub mod engine;
pub mod external;
pub mod inprocess;
pub mod manifest;

pub use engine::{AnalysisEngine, EngineDescriptor, EngineReceipt, EngineRegistry};
pub use external::ExternalEngine;
pub use inprocess::InProcessEngine;
pub use manifest::{EngineManifest, discover_manifests_in_dir};

use futures::executor::block_on;

use crate::cast::{BridgeError, CAstGraph};
use crate::config::LowerOptions;
use crate::error::LowerResult;
use crate::lower::{LoweredModule, lower_module};
use crate::sil::SilModule;

/// Blocks on `engine.ingest(graph)`. Failures name the module.
pub fn submit_module(graph: &CAstGraph, engine: &dyn AnalysisEngine) -> Result<EngineReceipt, BridgeError> {
    let issuer = format!("sil2cast.engine.{}", engine.name());
    graph.validate().map_err(|e| e.for_module(&graph.module))?;
    block_on(engine.ingest(graph)).map_err(|msg| BridgeError::new(issuer, msg).for_module(&graph.module))
}

/// Lowers `module` and hands the finished graph to `engine`.
pub fn lower_and_submit(
    module: &SilModule,
    options: &LowerOptions,
    engine: &dyn AnalysisEngine,
) -> LowerResult<(LoweredModule, EngineReceipt)> {
    let lowered = lower_module(module, options)?;
    let receipt = submit_module(&lowered.graph, engine)?;
    Ok((lowered, receipt))
}
