//! file: core/src/sil/builder.rs
//! description: programmatic construction of `SilModule` arenas.
//!
//! `ModuleBuilder` is used by the document loader and by embedders and tests
//! that want to build modules directly. It performs no validation beyond
//! keeping the arenas consistent; lowering reports malformed shapes.

use super::ids::{BlockId, FunctionId, InstId, ValueId};
use super::kind::InstKind;
use super::module::{DebugLoc, Instruction, SilBlock, SilFunction, SilModule, ValueData, ValueOrigin};

pub struct ModuleBuilder {
    module: SilModule,
}

/// Handle returned by `ModuleBuilder::add_inst`.
#[derive(Debug, Clone)]
pub struct InstHandle {
    pub id: InstId,
    pub results: Vec<ValueId>,
}

impl InstHandle {
    /// The first result, if any.
    pub fn result(&self) -> Option<ValueId> {
        self.results.first().copied()
    }
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleBuilder { module: SilModule::new(name) }
    }

    pub fn source_file(mut self, path: impl Into<String>) -> Self {
        self.module.source_file = Some(path.into());
        self
    }

    pub fn add_function(&mut self, name: impl Into<String>) -> FunctionId {
        let id = FunctionId::from_index(self.module.functions.len());
        self.module.functions.push(SilFunction { name: name.into(), blocks: Vec::new() });
        id
    }

    pub fn add_block(&mut self, function: FunctionId) -> BlockId {
        let id = BlockId::from_index(self.module.blocks.len());
        self.module.blocks.push(SilBlock { function, label: None, args: Vec::new(), insts: Vec::new() });
        if let Some(f) = self.module.functions.get_mut(function.index()) {
            f.blocks.push(id);
        }
        id
    }

    pub fn label_block(&mut self, block: BlockId, label: impl Into<String>) {
        if let Some(b) = self.module.blocks.get_mut(block.index()) {
            b.label = Some(label.into());
        }
    }

    pub fn add_block_arg(&mut self, block: BlockId, ty: impl Into<String>, name: Option<String>) -> ValueId {
        let index = self.module.blocks.get(block.index()).map(|b| b.args.len()).unwrap_or(0);
        let id = self.push_value(ty.into(), name, ValueOrigin::BlockArg { block, index: index as u32 });
        if let Some(b) = self.module.blocks.get_mut(block.index()) {
            b.args.push(id);
        }
        id
    }

    /// Appends an instruction to `block`, creating one result value per entry
    /// of `result_types`.
    pub fn add_inst(
        &mut self,
        block: BlockId,
        kind: InstKind,
        operands: Vec<ValueId>,
        result_types: &[&str],
    ) -> InstHandle {
        let id = InstId::from_index(self.module.insts.len());
        let results: Vec<ValueId> = result_types
            .iter()
            .enumerate()
            .map(|(i, ty)| self.push_value(ty.to_string(), None, ValueOrigin::Result { inst: id, index: i as u32 }))
            .collect();
        let ty = result_types.first().map(|t| t.to_string());
        self.module.insts.push(Instruction { kind, operands, results: results.clone(), ty, loc: None });
        if let Some(b) = self.module.blocks.get_mut(block.index()) {
            b.insts.push(id);
        }
        InstHandle { id, results }
    }

    pub fn set_operands(&mut self, inst: InstId, operands: Vec<ValueId>) {
        if let Some(i) = self.module.insts.get_mut(inst.index()) {
            i.operands = operands;
        }
    }

    /// Overrides the instruction type annotation.
    pub fn with_type(&mut self, inst: InstId, ty: impl Into<String>) {
        if let Some(i) = self.module.insts.get_mut(inst.index()) {
            i.ty = Some(ty.into());
        }
    }

    pub fn with_loc(&mut self, inst: InstId, loc: DebugLoc) {
        if let Some(i) = self.module.insts.get_mut(inst.index()) {
            i.loc = Some(loc);
        }
    }

    pub fn name_value(&mut self, value: ValueId, name: impl Into<String>) {
        if let Some(v) = self.module.values.get_mut(value.index()) {
            v.name = Some(name.into());
        }
    }

    pub fn add_undef(&mut self, ty: impl Into<String>) -> ValueId {
        self.push_value(ty.into(), None, ValueOrigin::Undef)
    }

    pub fn finish(self) -> SilModule {
        self.module
    }

    fn push_value(&mut self, ty: String, name: Option<String>, origin: ValueOrigin) -> ValueId {
        let id = ValueId::from_index(self.module.values.len());
        self.module.values.push(ValueData { ty, name, origin });
        id
    }
}
