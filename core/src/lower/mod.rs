//! file: core/src/lower/mod.rs
//! description: traversal driver of the lowering pass.
//!
//! `SilLowerer` walks module -> function -> block -> instruction. Blocks are
//! visited in reverse postorder from the entry block, so every definition is
//! lowered before the uses it dominates; unreachable blocks follow in source
//! order. Each level pushes a scope frame on entry; on exit the frame is
//! folded into its composite node (`Module`, `FunctionStmt`, `BlockStmt`).
//! Block statements are appended to their function in source order. The
//! lowerer can be reused: every module starts from a fully reset state.

pub mod builtins;
pub mod debug_dump;
pub mod err;
mod lower_calls;
mod lower_memory;
mod lower_terminators;
mod lower_values;
pub mod lowering_context;
pub mod node_map;
pub mod scope;
pub mod stats;
pub mod symbol_table;
pub mod translate;

pub use debug_dump::{DebugSink, InstBreakdown};
pub use err::{MalformedIrError, UnsupportedInstruction};
pub use lowering_context::LoweringContext;
pub use stats::LoweringStats;

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::cast::{CAstBuilder, CAstGraph, CAstKind, NodeArena, NodeRef};
use crate::config::LowerOptions;
use crate::error::{LowerResult, Sil2CastErrorExt};
use crate::sil::{BlockId, FunctionId, InstId, SilModule};

use scope::ScopeKind;
use translate::Translator;

pub struct SilLowerer {
    ctx: LoweringContext,
}

impl SilLowerer {
    pub fn new(options: LowerOptions) -> Self {
        SilLowerer { ctx: LoweringContext::new(options) }
    }

    pub fn options(&self) -> &LowerOptions {
        &self.ctx.options
    }

    /// Statistics of the most recent module.
    pub fn stats(&self) -> &LoweringStats {
        &self.ctx.stats
    }

    pub fn diagnostics(&self) -> &[Box<dyn Sil2CastErrorExt>] {
        &self.ctx.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Box<dyn Sil2CastErrorExt>> {
        std::mem::take(&mut self.ctx.diagnostics)
    }

    /// Lowers `module` through `cast` and returns the `Module` root node.
    pub fn lower(&mut self, module: &SilModule, cast: &mut dyn CAstBuilder) -> LowerResult<NodeRef> {
        let mut tr = Translator::new(module, cast, &mut self.ctx);
        visit_module(&mut tr)
    }
}

fn visit_module(tr: &mut Translator<'_>) -> LowerResult<NodeRef> {
    let module = tr.module;
    tr.ctx.reset_module(&module.name);
    if let Some(dir) = tr.ctx.options.dump_dir.clone() {
        tr.ctx.sink = DebugSink::open(&dir, module);
    }
    tr.ctx.scopes.push(ScopeKind::Module, &module.name);

    for function in module.function_ids() {
        visit_function(tr, function)?;
    }

    let root = fold_scope(tr, ScopeKind::Module)?;
    tr.ctx.sink = DebugSink::disabled();
    Ok(root)
}

fn visit_function(tr: &mut Translator<'_>, id: FunctionId) -> LowerResult<()> {
    let module = tr.module;
    let function = module
        .function(id)
        .ok_or_else(|| tr.ctx.malformed(format!("unknown function {}", id)))?;
    tr.ctx.begin_function(&function.name);
    tr.ctx.stats.functions += 1;
    tr.ctx.scopes.push(ScopeKind::Function, &function.name);

    for (pos, block) in function.blocks.iter().enumerate() {
        tr.ctx.block_labels.insert(*block, format!("bb{}", pos));
    }
    declare_block_args(tr, &function.blocks)?;

    let mut folded = HashMap::with_capacity(function.blocks.len());
    for block in visit_order(module, &function.blocks) {
        let node = visit_block(tr, block)?;
        folded.insert(block, node);
    }
    for block in &function.blocks {
        if let Some(node) = folded.remove(block) {
            append(tr, node)?;
        }
    }

    let node = fold_scope(tr, ScopeKind::Function)?;
    append(tr, node)?;
    tr.ctx.end_function();
    Ok(())
}

/// Block arguments (function parameters included) become `Var` nodes named
/// by their source name or `bbN.argK`, declared before any block is visited.
fn declare_block_args(tr: &mut Translator<'_>, blocks: &[BlockId]) -> LowerResult<()> {
    let module = tr.module;
    for block in blocks {
        let data = module
            .block(*block)
            .ok_or_else(|| tr.ctx.malformed(format!("unknown block {}", block)))?;
        let label = tr.ctx.block_label(*block)?;
        for (k, arg) in data.args.iter().enumerate() {
            let value = module
                .value(*arg)
                .ok_or_else(|| tr.ctx.malformed(format!("unknown block argument {}", arg)))?;
            let name = value.name.clone().unwrap_or_else(|| format!("{}.arg{}", label, k));
            tr.ctx.symbols.declare(&name, &value.ty, None);
            let node = tr.named(CAstKind::Var, &name, Vec::new())?;
            tr.record(*arg, node)?;
        }
    }
    Ok(())
}

/// Reverse postorder of the blocks reachable from `blocks[0]`, followed by
/// the unreachable blocks in source order.
fn visit_order(module: &SilModule, blocks: &[BlockId]) -> Vec<BlockId> {
    let Some(&entry) = blocks.first() else {
        return Vec::new();
    };
    let members: HashSet<BlockId> = blocks.iter().copied().collect();
    let mut visited = HashSet::from([entry]);
    let mut postorder = Vec::with_capacity(blocks.len());
    let mut stack = vec![(entry, block_successors(module, entry), 0usize)];

    loop {
        let Some(top) = stack.last_mut() else {
            break;
        };
        let next = if top.2 < top.1.len() {
            top.2 += 1;
            Some(top.1[top.2 - 1])
        } else {
            None
        };
        match next {
            Some(succ) => {
                if members.contains(&succ) && visited.insert(succ) {
                    let succs = block_successors(module, succ);
                    stack.push((succ, succs, 0));
                }
            }
            None => {
                if let Some((block, _, _)) = stack.pop() {
                    postorder.push(block);
                }
            }
        }
    }

    postorder.reverse();
    postorder.extend(blocks.iter().copied().filter(|b| !visited.contains(b)));
    postorder
}

/// Successors of `block`, last first, so that the reverse postorder keeps
/// sibling blocks in their source successor order.
fn block_successors(module: &SilModule, block: BlockId) -> Vec<BlockId> {
    let mut succs: Vec<BlockId> = module
        .block(block)
        .map(|data| {
            data.insts
                .iter()
                .filter_map(|inst| module.inst(*inst))
                .flat_map(|inst| inst.kind.successors())
                .collect()
        })
        .unwrap_or_default();
    succs.reverse();
    succs
}

/// Lowers one block and returns its folded `BlockStmt`.
fn visit_block(tr: &mut Translator<'_>, id: BlockId) -> LowerResult<NodeRef> {
    let module = tr.module;
    let block = module
        .block(id)
        .ok_or_else(|| tr.ctx.malformed(format!("unknown block {}", id)))?;
    let label = tr.ctx.block_label(id)?;
    tr.ctx.stats.blocks += 1;
    tr.ctx.scopes.push(ScopeKind::Block, &label);

    for (index, inst) in block.insts.iter().enumerate() {
        before_visit(tr, &label, index, *inst)?;
        let node = tr.translate(*inst)?;
        after_visit(tr, node)?;
    }

    fold_scope(tr, ScopeKind::Block)
}

/// Decodes the debug location, bumps the counters and emits the
/// per-instruction breakdown to the log and the debug sink.
fn before_visit(tr: &mut Translator<'_>, block: &str, index: usize, id: InstId) -> LowerResult<()> {
    let module = tr.module;
    let inst = module
        .inst(id)
        .ok_or_else(|| tr.ctx.malformed(format!("unknown instruction {}", id)))?;
    tr.ctx.current_location = inst.loc.as_ref().and_then(|l| l.decode());
    tr.ctx.stats.instructions += 1;
    tr.ctx.stats.count_op(inst.kind.name());
    if let Some(frame) = tr.ctx.scopes.current_mut() {
        frame.visited += 1;
    }

    if tr.ctx.options.print || tr.ctx.sink.is_enabled() {
        let function = tr.ctx.function_name.clone().unwrap_or_default();
        let entry = InstBreakdown::new(module, &function, block, index, inst);
        if tr.ctx.options.print {
            for line in entry.lines() {
                log::info!("{}", line);
            }
        }
        tr.ctx.sink.write_breakdown(&entry);
    }
    Ok(())
}

fn after_visit(tr: &mut Translator<'_>, node: Option<NodeRef>) -> LowerResult<()> {
    let Some(node) = node else {
        return Ok(());
    };
    tr.record_position_of(node)?;
    append(tr, node)
}

fn append(tr: &mut Translator<'_>, node: NodeRef) -> LowerResult<()> {
    tr.ctx.scopes.append(node).map_err(|msg| tr.ctx.malformed(msg))
}

fn fold_scope(tr: &mut Translator<'_>, kind: ScopeKind) -> LowerResult<NodeRef> {
    let frame = tr.ctx.scopes.pop(kind).map_err(|msg| tr.ctx.malformed(msg))?;
    let composite = kind.composite();
    let name = frame.name.clone();
    tr.named(composite, &name, frame.children)
}

/// The result of lowering one module with a fresh arena.
pub struct LoweredModule {
    pub graph: CAstGraph,
    pub stats: LoweringStats,
    pub diagnostics: Vec<Box<dyn Sil2CastErrorExt>>,
}

/// Lowers `module` into a new `NodeArena` and snapshots the graph.
pub fn lower_module(module: &SilModule, options: &LowerOptions) -> LowerResult<LoweredModule> {
    let mut arena = NodeArena::new();
    let mut lowerer = SilLowerer::new(options.clone());
    let root = lowerer.lower(module, &mut arena)?;
    let stats = lowerer.stats().clone();
    let diagnostics = lowerer.take_diagnostics();
    let graph = arena
        .into_graph(&module.name, Uuid::new_v4(), root)
        .map_err(|e| -> Box<dyn Sil2CastErrorExt> { Box::new(e.for_module(&module.name)) })?;
    Ok(LoweredModule { graph, stats, diagnostics })
}
