//! file: core/src/lower/lower_terminators.rs
//! description: block terminators.
//!
//! Every successor edge becomes a `Goto` or `SwitchCase` child named by the
//! destination block label, in source successor order.

use crate::cast::{CAstKind, ConstValue, NodeRef};
use crate::error::LowerResult;
use crate::sil::{BlockId, Instruction};

use super::translate::Translator;

impl<'a> Translator<'a> {
    /// `return` / `throw` with their (optional) operand.
    pub(crate) fn lower_return(&mut self, inst: &Instruction, kind: CAstKind) -> LowerResult<NodeRef> {
        if kind == CAstKind::Throw {
            self.expect_operands(inst, 1)?;
        }
        let values = self.operands_from(inst, 0)?;
        self.node(kind, values)
    }

    pub(crate) fn lower_yield(&mut self, inst: &Instruction, resume: BlockId, unwind: BlockId) -> LowerResult<NodeRef> {
        let mut children = self.operands_from(inst, 0)?;
        children.push(self.edge(resume, Vec::new())?);
        children.push(self.edge(unwind, Vec::new())?);
        self.node(CAstKind::Yield, children)
    }

    pub(crate) fn lower_branch(&mut self, inst: &Instruction, dest: BlockId) -> LowerResult<NodeRef> {
        let args = self.operands_from(inst, 0)?;
        self.edge(dest, args)
    }

    /// Operands: condition, `true_args` true-edge arguments, then the
    /// false-edge arguments.
    pub(crate) fn lower_cond_branch(
        &mut self,
        inst: &Instruction,
        true_dest: BlockId,
        false_dest: BlockId,
        true_args: u32,
    ) -> LowerResult<NodeRef> {
        let true_args = true_args as usize;
        self.expect_operands(inst, 1 + true_args)?;
        let cond = self.operand(inst, 0)?;
        let all_args = self.operands_from(inst, 1)?;
        let (on_true, on_false) = all_args.split_at(true_args);
        let then_edge = self.edge(true_dest, on_true.to_vec())?;
        let else_edge = self.edge(false_dest, on_false.to_vec())?;
        self.node(CAstKind::IfStmt, vec![cond, then_edge, else_edge])
    }

    /// Operands: the switched value, then one case value per destination.
    pub(crate) fn lower_switch_value(
        &mut self,
        inst: &Instruction,
        cases: &[BlockId],
        default: Option<BlockId>,
    ) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 1 + cases.len())?;
        let mut children = vec![self.operand(inst, 0)?];
        for (i, dest) in cases.iter().enumerate() {
            let discriminant = self.operand(inst, 1 + i)?;
            children.push(self.case_edge(*dest, discriminant)?);
        }
        if let Some(dest) = default {
            let wildcard = self.constant(ConstValue::Wildcard)?;
            children.push(self.case_edge(dest, wildcard)?);
        }
        self.node(CAstKind::Switch, children)
    }

    pub(crate) fn lower_switch_enum(
        &mut self,
        inst: &Instruction,
        cases: &[(String, BlockId)],
        default: Option<BlockId>,
    ) -> LowerResult<NodeRef> {
        let mut children = vec![self.operand(inst, 0)?];
        for (case, dest) in cases {
            let discriminant = self.constant(ConstValue::Str(case.clone()))?;
            children.push(self.case_edge(*dest, discriminant)?);
        }
        if let Some(dest) = default {
            let wildcard = self.constant(ConstValue::Wildcard)?;
            children.push(self.case_edge(dest, wildcard)?);
        }
        self.node(CAstKind::Switch, children)
    }

    /// `IfStmt[InstanceOf target [value], Goto success, Goto failure]`. For
    /// the value form the success edge carries the cast value; for the
    /// address form (operands: source, destination) it carries
    /// `Assign[destination, Cast]`.
    pub(crate) fn lower_checked_cast_branch(
        &mut self,
        inst: &Instruction,
        target: &str,
        success: BlockId,
        failure: BlockId,
        carries_value: bool,
    ) -> LowerResult<NodeRef> {
        let source = self.operand_id(inst, 0)?;
        let source_ty = self.value_type(source);
        let value = self.resolve_value(source)?;
        let test = self.named(CAstKind::InstanceOf, target, vec![value])?;
        let from = self.type_literal(&source_ty)?;
        let cast = self.named(CAstKind::Cast, target, vec![value, from])?;
        let success_args = if carries_value {
            vec![cast]
        } else {
            let dest = self.operand(inst, 1)?;
            vec![self.node(CAstKind::Assign, vec![dest, cast])?]
        };
        let then_edge = self.edge(success, success_args)?;
        let else_edge = self.edge(failure, Vec::new())?;
        self.node(CAstKind::IfStmt, vec![test, then_edge, else_edge])
    }
}
