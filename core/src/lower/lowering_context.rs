use std::collections::HashMap;

use crate::cast::NodeRef;
use crate::config::LowerOptions;
use crate::error::Sil2CastErrorExt;
use crate::location::Location;
use crate::sil::BlockId;

use super::debug_dump::DebugSink;
use super::err::MalformedIrError;
use super::node_map::NodeMap;
use super::scope::ScopeStack;
use super::stats::LoweringStats;
use super::symbol_table::SymbolTable;

/// Mutable state of one lowering run. Module-level parts are reset when a
/// module begins, function-level parts when a function begins.
pub struct LoweringContext {
    pub options: LowerOptions,
    pub module_name: String,
    pub function_name: Option<String>,
    pub node_map: NodeMap,
    pub symbols: SymbolTable,
    pub scopes: ScopeStack,
    pub block_labels: HashMap<BlockId, String>,
    pub stats: LoweringStats,
    pub diagnostics: Vec<Box<dyn Sil2CastErrorExt>>,
    pub current_location: Option<Location>,
    pub sink: DebugSink,
    /// Shared `Null` constant standing for every `undef` operand of a function.
    pub undef: Option<NodeRef>,
}

impl LoweringContext {
    pub fn new(options: LowerOptions) -> Self {
        LoweringContext {
            options,
            module_name: String::new(),
            function_name: None,
            node_map: NodeMap::new(),
            symbols: SymbolTable::new(),
            scopes: ScopeStack::new(),
            block_labels: HashMap::new(),
            stats: LoweringStats::default(),
            diagnostics: Vec::new(),
            current_location: None,
            sink: DebugSink::disabled(),
            undef: None,
        }
    }

    pub fn reset_module(&mut self, name: &str) {
        self.module_name = name.to_string();
        self.function_name = None;
        self.node_map.clear();
        self.symbols.clear();
        self.scopes.clear();
        self.block_labels.clear();
        self.stats = LoweringStats::default();
        self.diagnostics.clear();
        self.current_location = None;
        self.sink = DebugSink::disabled();
        self.undef = None;
    }

    pub fn begin_function(&mut self, name: &str) {
        self.function_name = Some(name.to_string());
        self.node_map.clear();
        self.symbols.clear();
        self.block_labels.clear();
        self.undef = None;
    }

    pub fn end_function(&mut self) {
        self.symbols.clear();
        self.function_name = None;
        self.current_location = None;
    }

    pub fn malformed(&self, message: impl Into<String>) -> Box<dyn Sil2CastErrorExt> {
        Box::new(
            MalformedIrError::new(&self.module_name, self.function_name.as_deref(), message)
                .at(self.current_location.clone()),
        )
    }

    pub fn block_label(&self, block: BlockId) -> Result<String, Box<dyn Sil2CastErrorExt>> {
        self.block_labels
            .get(&block)
            .cloned()
            .ok_or_else(|| self.malformed(format!("reference to unknown block {}", block)))
    }
}
