//! file: core/src/lower/lower_memory.rs
//! description: allocation, debug-info, memory-access and refcount lowering.

use crate::cast::{CAstKind, ConstValue, NodeRef};
use crate::error::LowerResult;
use crate::sil::Instruction;

use super::translate::Translator;

impl<'a> Translator<'a> {
    /// `alloc_stack` / `alloc_box`: a `New` of the allocated type. A named
    /// variable becomes `DeclStmt var [New, slot]`, and uses of the address
    /// refer to the declaration.
    pub(crate) fn lower_alloc_var(&mut self, inst: &Instruction, var_name: Option<&str>) -> LowerResult<NodeRef> {
        let ty = self.result_type(inst);
        let new = self.named(CAstKind::New, &ty, Vec::new())?;
        match var_name {
            Some(var) => {
                let slot = self.variable_slot(var, &ty, true)?;
                self.named(CAstKind::DeclStmt, var, vec![new, slot])
            }
            None => Ok(new),
        }
    }

    /// `alloc_ref`, `alloc_value_buffer`, `alloc_existential_box`: a `New`
    /// whose children are the initializer operands.
    pub(crate) fn lower_alloc(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let ty = self.result_type(inst);
        let children = self.operands_from(inst, 0)?;
        self.named(CAstKind::New, &ty, children)
    }

    pub(crate) fn lower_alloc_global(&mut self, global: &str) -> LowerResult<NodeRef> {
        self.named(CAstKind::New, global, Vec::new())
    }

    pub(crate) fn lower_project_box(&mut self, inst: &Instruction, field_index: u32) -> LowerResult<NodeRef> {
        let boxed = self.operand(inst, 0)?;
        let field = self.constant(ConstValue::Int(i64::from(field_index)))?;
        self.node(CAstKind::ObjectRef, vec![boxed, field])
    }

    /// Projections out of a buffer or an existential: `Unbox` named by the
    /// projected type.
    pub(crate) fn lower_unbox(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let ty = self.result_type(inst);
        let operand = self.operand(inst, 0)?;
        self.named(CAstKind::Unbox, &ty, vec![operand])
    }

    pub(crate) fn lower_delete(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let operand = self.operand(inst, 0)?;
        self.node(CAstKind::Delete, vec![operand])
    }

    /// `DeclStmt var [value, slot]`. A variable already declared in the
    /// function keeps its slot.
    pub(crate) fn lower_debug_value(&mut self, inst: &Instruction, var_name: &str) -> LowerResult<NodeRef> {
        let value = self.operand_id(inst, 0)?;
        let ty = self.value_type(value);
        let node = self.resolve_value(value)?;
        let slot = self.variable_slot(var_name, &ty, false)?;
        self.named(CAstKind::DeclStmt, var_name, vec![node, slot])
    }

    pub(crate) fn lower_load(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let addr = self.operand(inst, 0)?;
        match inst.kind {
            crate::sil::InstKind::LoadBorrow => self.named(CAstKind::Deref, "borrow", vec![addr]),
            _ => self.node(CAstKind::Deref, vec![addr]),
        }
    }

    /// `store`, `assign`, `store_borrow`: operands are (value, destination);
    /// the node is `Assign[destination, value]`.
    pub(crate) fn lower_store(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 2)?;
        let value = self.operand(inst, 0)?;
        let dest = self.operand(inst, 1)?;
        self.node(CAstKind::Assign, vec![dest, value])
    }

    pub(crate) fn lower_copy_addr(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 2)?;
        let src = self.operand(inst, 0)?;
        let dest = self.operand(inst, 1)?;
        self.node(CAstKind::Copy, vec![dest, src])
    }

    pub(crate) fn lower_begin_borrow(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let value = self.operand(inst, 0)?;
        self.node(CAstKind::Borrow, vec![value])
    }

    pub(crate) fn lower_begin_access(&mut self, inst: &Instruction, access: &str) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 1)?;
        let children = self.operands_from(inst, 0)?;
        self.named(CAstKind::Access, access, children)
    }

    /// Closes a borrow, access or coroutine scope opened earlier.
    pub(crate) fn lower_end_scope(&mut self, inst: &Instruction, scope: &str) -> LowerResult<NodeRef> {
        let opened = self.operand(inst, 0)?;
        self.named(CAstKind::EndScope, scope, vec![opened])
    }

    pub(crate) fn lower_mark(&mut self, inst: &Instruction, what: &str) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 1)?;
        let children = self.operands_from(inst, 0)?;
        self.named(CAstKind::Mark, what, children)
    }

    pub(crate) fn lower_index_addr(&mut self, inst: &Instruction, name: Option<&str>) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 2)?;
        let base = self.operand(inst, 0)?;
        let index = self.operand(inst, 1)?;
        match name {
            Some(n) => self.named(CAstKind::ArrayRef, n, vec![base, index]),
            None => self.node(CAstKind::ArrayRef, vec![base, index]),
        }
    }

    /// Reference counting carries no dataflow. Value-producing forms become a
    /// `Mark` over their operands; the rest become `Empty` placeholders named
    /// by the operation, or nothing when lifetime markers are dropped.
    pub(crate) fn lower_refcount(&mut self, inst: &Instruction) -> LowerResult<Option<NodeRef>> {
        let op = inst.kind.name();
        if !inst.results.is_empty() {
            self.expect_operands(inst, 1)?;
            let children = self.operands_from(inst, 0)?;
            let what = op.strip_prefix("mark_").or_else(|| op.strip_prefix("strong_")).unwrap_or(op);
            return self.named(CAstKind::Mark, what, children).map(Some);
        }
        self.operand_id(inst, 0)?;
        if self.ctx.options.drop_lifetime_markers {
            return Ok(None);
        }
        self.named(CAstKind::Empty, op, Vec::new()).map(Some)
    }
}
