pub mod bridge;
pub mod cast;
pub mod config;
pub mod error;
pub mod input;
pub mod location;
pub mod lower;
pub mod sil;

pub use bridge::{AnalysisEngine, EngineReceipt, EngineRegistry, lower_and_submit, submit_module};
pub use cast::{BridgeError, CAstBuilder, CAstGraph, CAstKind, CAstNode, ConstValue, NodeArena, NodeRef};
pub use config::{EngineConfig, LowerOptions};
pub use error::{Level, LowerResult, Sil2CastErrorExt};
pub use input::{expand_inputs, load_module_file};
pub use location::Location;
pub use lower::{LoweredModule, LoweringStats, SilLowerer, lower_module};
pub use sil::{InstKind, ModuleBuilder, ModuleLoadError, SilModule, load_module_str};

pub fn generate_error_report(error: &dyn Sil2CastErrorExt) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("SIL2CAST | {} | {} | {}", level, location, message)
}
