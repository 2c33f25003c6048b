//! file: core/src/lower/lower_values.rs
//! description: metatypes, aggregates, enums, existentials and conversions.

use crate::cast::{CAstKind, ConstValue, NodeRef};
use crate::error::LowerResult;
use crate::sil::Instruction;

use super::translate::Translator;

impl<'a> Translator<'a> {
    pub(crate) fn lower_type_of(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let value = self.operand(inst, 0)?;
        self.node(CAstKind::TypeOf, vec![value])
    }

    pub(crate) fn lower_copy_value(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let value = self.operand(inst, 0)?;
        self.node(CAstKind::Copy, vec![value])
    }

    /// `tuple` / `struct`: an `ObjectLiteral` named by the aggregate type with
    /// the elements in operand order.
    pub(crate) fn lower_aggregate(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let ty = self.result_type(inst);
        let elements = self.operands_from(inst, 0)?;
        self.named(CAstKind::ObjectLiteral, &ty, elements)
    }

    pub(crate) fn lower_member_ref(&mut self, inst: &Instruction, member: ConstValue) -> LowerResult<NodeRef> {
        let object = self.operand(inst, 0)?;
        let member = self.constant(member)?;
        self.node(CAstKind::ObjectRef, vec![object, member])
    }

    pub(crate) fn lower_ref_tail_addr(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let object = self.operand(inst, 0)?;
        self.named(CAstKind::ArrayRef, "tail", vec![object])
    }

    /// `enum`: an `EnumCase` named by the case, with the payload when present.
    pub(crate) fn lower_enum(&mut self, inst: &Instruction, case: &str) -> LowerResult<NodeRef> {
        let payload = self.operands_from(inst, 0)?;
        self.named(CAstKind::EnumCase, case, payload)
    }

    pub(crate) fn lower_enum_payload(&mut self, inst: &Instruction, case: &str) -> LowerResult<NodeRef> {
        let value = self.operand(inst, 0)?;
        self.named(CAstKind::EnumPayload, case, vec![value])
    }

    /// `inject_enum_addr` stores the case tag into the address.
    pub(crate) fn lower_inject_enum_addr(&mut self, inst: &Instruction, case: &str) -> LowerResult<NodeRef> {
        let addr = self.operand(inst, 0)?;
        let tag = self.named(CAstKind::EnumCase, case, Vec::new())?;
        self.node(CAstKind::Assign, vec![addr, tag])
    }

    /// Operands: the enum, one result per case, then the default result.
    /// Lowers to `ChoiceExpr[enum, ChoiceCase[case, result]...]`.
    pub(crate) fn lower_select_enum(
        &mut self,
        inst: &Instruction,
        cases: &[String],
        has_default: bool,
    ) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 1 + cases.len() + usize::from(has_default))?;
        let mut children = vec![self.operand(inst, 0)?];
        for (i, case) in cases.iter().enumerate() {
            let discriminant = self.constant(ConstValue::Str(case.clone()))?;
            let result = self.operand(inst, 1 + i)?;
            children.push(self.named(CAstKind::ChoiceCase, case, vec![discriminant, result])?);
        }
        if has_default {
            let wildcard = self.constant(ConstValue::Wildcard)?;
            let result = self.operand(inst, 1 + cases.len())?;
            children.push(self.named(CAstKind::ChoiceCase, "default", vec![wildcard, result])?);
        }
        self.node(CAstKind::ChoiceExpr, children)
    }

    /// Operands: the value, (case value, result) pairs, then the default result.
    pub(crate) fn lower_select_value(
        &mut self,
        inst: &Instruction,
        case_count: u32,
        has_default: bool,
    ) -> LowerResult<NodeRef> {
        let case_count = case_count as usize;
        self.expect_operands(inst, 1 + 2 * case_count + usize::from(has_default))?;
        let mut children = vec![self.operand(inst, 0)?];
        for i in 0..case_count {
            let discriminant = self.operand(inst, 1 + 2 * i)?;
            let result = self.operand(inst, 2 + 2 * i)?;
            children.push(self.node(CAstKind::ChoiceCase, vec![discriminant, result])?);
        }
        if has_default {
            let wildcard = self.constant(ConstValue::Wildcard)?;
            let result = self.operand(inst, 1 + 2 * case_count)?;
            children.push(self.named(CAstKind::ChoiceCase, "default", vec![wildcard, result])?);
        }
        self.node(CAstKind::ChoiceExpr, children)
    }

    /// `init_existential_*`: a `Box` named by the existential type.
    pub(crate) fn lower_box(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let ty = self.result_type(inst);
        let value = self.operand(inst, 0)?;
        self.named(CAstKind::Box, &ty, vec![value])
    }

    /// Value conversions: `kind` named by the target type, children are the
    /// operand and a `TypeLiteral` of its source type.
    pub(crate) fn lower_cast(&mut self, inst: &Instruction, kind: CAstKind) -> LowerResult<NodeRef> {
        let source = self.operand_id(inst, 0)?;
        let target = self.result_type(inst);
        let source_ty = self.value_type(source);
        let value = self.resolve_value(source)?;
        let from = self.type_literal(&source_ty)?;
        self.named(kind, &target, vec![value, from])
    }

    /// Address conversions: operands are (source, destination); the cast
    /// value is assigned to the destination.
    pub(crate) fn lower_cast_addr(&mut self, inst: &Instruction, kind: CAstKind) -> LowerResult<NodeRef> {
        self.expect_operands(inst, 2)?;
        let source = self.operand_id(inst, 0)?;
        let dest_id = self.operand_id(inst, 1)?;
        let target = inst.ty.clone().unwrap_or_else(|| self.value_type(dest_id));
        let source_ty = self.value_type(source);
        let value = self.resolve_value(source)?;
        let from = self.type_literal(&source_ty)?;
        let cast = self.named(kind, &target, vec![value, from])?;
        let dest = self.resolve_value(dest_id)?;
        self.node(CAstKind::Assign, vec![dest, cast])
    }

    pub(crate) fn lower_cond_fail(&mut self, inst: &Instruction, message: Option<&str>) -> LowerResult<NodeRef> {
        let cond = self.operand(inst, 0)?;
        self.named(CAstKind::Assert, message.unwrap_or("cond_fail"), vec![cond])
    }
}
