//! file: core/src/lower/lower_calls.rs
//! description: dynamic dispatch, apply sites and builtins.
//!
//! `apply`, `begin_apply`, `partial_apply` and `try_apply` share one
//! apply-site routine. The call is named by the static callee when operand 0
//! is a `function_ref` or a method lookup, and by the apply kind otherwise.

use crate::cast::{CAstKind, NodeRef};
use crate::error::LowerResult;
use crate::sil::{BlockId, InstKind, Instruction};

use super::builtins::{BuiltinOp, builtin_operator};
use super::translate::Translator;

impl<'a> Translator<'a> {
    pub(crate) fn lower_method_ref(&mut self, inst: &Instruction, member: &str) -> LowerResult<NodeRef> {
        let receiver = self.operand(inst, 0)?;
        self.named(CAstKind::MethodRef, member, vec![receiver])
    }

    /// Static name of the callee in operand 0, if it has one.
    fn callee_name(&self, inst: &Instruction) -> Option<String> {
        let callee = inst.operands.first()?;
        match &self.module.defining_inst(*callee)?.kind {
            InstKind::FunctionRef { function } => Some(function.clone()),
            InstKind::ClassMethod { member }
            | InstKind::ObjCMethod { member }
            | InstKind::SuperMethod { member }
            | InstKind::WitnessMethod { member } => Some(member.clone()),
            _ => None,
        }
    }

    /// `Call[callee, args...]`.
    pub(crate) fn lower_apply_site(&mut self, inst: &Instruction) -> LowerResult<NodeRef> {
        let callee = self.operand(inst, 0)?;
        let args = self.operands_from(inst, 1)?;
        let name = self.callee_name(inst).unwrap_or_else(|| inst.kind.name().to_string());
        let mut children = Vec::with_capacity(args.len() + 1);
        children.push(callee);
        children.extend(args);
        self.named(CAstKind::Call, &name, children)
    }

    /// `Try[Call, Goto normal [Call], Goto error]`. The normal edge carries
    /// the call result into the argument of the normal block.
    pub(crate) fn lower_try_apply(&mut self, inst: &Instruction, normal: BlockId, error: BlockId) -> LowerResult<NodeRef> {
        let call = self.lower_apply_site(inst)?;
        let normal = self.edge(normal, vec![call])?;
        let error = self.edge(error, Vec::new())?;
        self.node(CAstKind::Try, vec![call, normal, error])
    }

    pub(crate) fn lower_builtin(&mut self, inst: &Instruction, name: &str) -> LowerResult<NodeRef> {
        match builtin_operator(name) {
            Some(BuiltinOp::Binary(op)) if inst.operands.len() >= 2 => {
                let operator = self.named(CAstKind::Operator, op, Vec::new())?;
                let lhs = self.operand(inst, 0)?;
                let rhs = self.operand(inst, 1)?;
                self.named(CAstKind::BinaryExpr, name, vec![operator, lhs, rhs])
            }
            Some(BuiltinOp::Unary(op)) if !inst.operands.is_empty() => {
                let operator = self.named(CAstKind::Operator, op, Vec::new())?;
                let value = self.operand(inst, 0)?;
                self.named(CAstKind::UnaryExpr, name, vec![operator, value])
            }
            _ => {
                let args = self.operands_from(inst, 0)?;
                self.named(CAstKind::Call, name, args)
            }
        }
    }
}
