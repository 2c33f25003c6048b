//! file: core/src/lower/translate.rs
//! description: instruction dispatch and shared node-building helpers.
//!
//! `Translator::translate` selects exactly one routine per `InstKind`. The
//! category routines live in the `lower_*` files. Every operand is resolved
//! through the node map, so a value is never translated twice.

use crate::cast::{BridgeError, CAstBuilder, CAstKind, ConstValue, NodeRef};
use crate::error::{LowerResult, Sil2CastErrorExt};
use crate::sil::{BlockId, InstId, InstKind, Instruction, SilModule, ValueId, ValueOrigin};

use super::err::UnsupportedInstruction;
use super::lowering_context::LoweringContext;

pub struct Translator<'a> {
    pub module: &'a SilModule,
    pub cast: &'a mut dyn CAstBuilder,
    pub ctx: &'a mut LoweringContext,
}

impl<'a> Translator<'a> {
    pub fn new(module: &'a SilModule, cast: &'a mut dyn CAstBuilder, ctx: &'a mut LoweringContext) -> Self {
        Translator { module, cast, ctx }
    }

    /// Translates one instruction and records its results in the node map.
    /// Returns the node to append to the current block, if any.
    pub fn translate(&mut self, id: InstId) -> LowerResult<Option<NodeRef>> {
        let module = self.module;
        let inst = module
            .inst(id)
            .ok_or_else(|| self.ctx.malformed(format!("unknown instruction {}", id)))?;

        use InstKind::*;
        let node = match &inst.kind {
            AllocStack { var_name } | AllocBox { var_name } => {
                Some(self.lower_alloc_var(inst, var_name.as_deref())?)
            }
            AllocRef | AllocValueBuffer | AllocExistentialBox => Some(self.lower_alloc(inst)?),
            AllocGlobal { global } => Some(self.lower_alloc_global(global)?),
            ProjectBox { field_index } => Some(self.lower_project_box(inst, *field_index)?),
            ProjectValueBuffer | ProjectExistentialBox => Some(self.lower_unbox(inst)?),
            DeallocStack | DeallocBox | DeallocRef | DeallocValueBuffer | DeallocExistentialBox
            | DestroyAddr | DestroyValue | DeinitExistentialAddr | DeinitExistentialValue => {
                Some(self.lower_delete(inst)?)
            }

            DebugValue { var_name } | DebugValueAddr { var_name } => Some(self.lower_debug_value(inst, var_name)?),

            Load | LoadBorrow => Some(self.lower_load(inst)?),
            Store | Assign | StoreBorrow => Some(self.lower_store(inst)?),
            CopyAddr => Some(self.lower_copy_addr(inst)?),
            BeginBorrow => Some(self.lower_begin_borrow(inst)?),
            EndBorrow => Some(self.lower_end_scope(inst, "borrow")?),
            BeginAccess { access } | BeginUnpairedAccess { access } => Some(self.lower_begin_access(inst, access)?),
            EndAccess | EndUnpairedAccess => Some(self.lower_end_scope(inst, "access")?),
            MarkUninitialized => Some(self.lower_mark(inst, "uninitialized")?),
            MarkFunctionEscape => Some(self.lower_mark(inst, "function_escape")?),
            IndexAddr => Some(self.lower_index_addr(inst, None)?),
            TailAddr => Some(self.lower_index_addr(inst, Some("tail"))?),

            StrongRetain | StrongRelease | RetainValue | ReleaseValue | StrongPin | StrongUnpin
            | EndLifetime | MarkDependence => self.lower_refcount(inst)?,

            IntegerLiteral { value } => Some(self.constant(ConstValue::Int(*value))?),
            FloatLiteral { value } => Some(self.constant(ConstValue::Float(*value))?),
            StringLiteral { value } | ConstStringLiteral { value } => {
                Some(self.constant(ConstValue::Str(value.clone()))?)
            }
            FunctionRef { function } => Some(self.constant(ConstValue::Symbol(function.clone()))?),
            GlobalAddr { global } => Some(self.named(CAstKind::Var, global, Vec::new())?),

            ClassMethod { member } | ObjCMethod { member } | SuperMethod { member } | WitnessMethod { member } => {
                Some(self.lower_method_ref(inst, member)?)
            }

            Apply | BeginApply | PartialApply => Some(self.lower_apply_site(inst)?),
            EndApply | AbortApply => Some(self.lower_end_scope(inst, inst.kind.name())?),
            TryApply { normal, error } => Some(self.lower_try_apply(inst, *normal, *error)?),
            Builtin { name } => Some(self.lower_builtin(inst, name)?),

            Metatype => Some(self.type_literal(&self.result_type(inst))?),
            ValueMetatype | ExistentialMetatype => Some(self.lower_type_of(inst)?),

            CopyValue => Some(self.lower_copy_value(inst)?),
            Tuple | Struct => Some(self.lower_aggregate(inst)?),
            TupleExtract { index } | TupleElementAddr { index } => {
                Some(self.lower_member_ref(inst, ConstValue::Int(i64::from(*index)))?)
            }
            StructExtract { field } | StructElementAddr { field } | RefElementAddr { field } => {
                Some(self.lower_member_ref(inst, ConstValue::Str(field.clone()))?)
            }
            RefTailAddr => Some(self.lower_ref_tail_addr(inst)?),

            Enum { case } => Some(self.lower_enum(inst, case)?),
            UncheckedEnumData { case } | InitEnumDataAddr { case } | UncheckedTakeEnumDataAddr { case } => {
                Some(self.lower_enum_payload(inst, case)?)
            }
            InjectEnumAddr { case } => Some(self.lower_inject_enum_addr(inst, case)?),
            SelectEnum { cases, has_default } | SelectEnumAddr { cases, has_default } => {
                Some(self.lower_select_enum(inst, cases, *has_default)?)
            }

            InitExistentialAddr | InitExistentialValue | InitExistentialRef | InitExistentialMetatype => {
                Some(self.lower_box(inst)?)
            }
            OpenExistentialAddr | OpenExistentialValue | OpenExistentialRef | OpenExistentialMetatype
            | OpenExistentialBox | OpenExistentialBoxValue => Some(self.lower_unbox(inst)?),

            Upcast | AddressToPointer | PointerToAddress | UncheckedRefCast | UncheckedAddrCast
            | UncheckedTrivialBitCast | UncheckedBitwiseCast | UncheckedOwnershipConversion
            | RefToRawPointer | RawPointerToRef | UnmanagedToRef | RefToUnmanaged | ConvertFunction
            | ThinFunctionToPointer | PointerToThinFunction | ClassifyBridgeObject | RefToBridgeObject
            | BridgeObjectToRef | ThinToThickFunction | ThickToObjCMetatype | ObjCToThickMetatype => {
                Some(self.lower_cast(inst, CAstKind::UncheckedCast)?)
            }
            UncheckedRefCastAddr => Some(self.lower_cast_addr(inst, CAstKind::UncheckedCast)?),
            UnconditionalCheckedCast => Some(self.lower_cast(inst, CAstKind::Cast)?),
            UnconditionalCheckedCastAddr => Some(self.lower_cast_addr(inst, CAstKind::Cast)?),

            CondFail { message } => Some(self.lower_cond_fail(inst, message.as_deref())?),

            Unreachable => Some(self.node(CAstKind::Unreachable, Vec::new())?),
            Unwind => Some(self.node(CAstKind::Unwind, Vec::new())?),
            Return => Some(self.lower_return(inst, CAstKind::Return)?),
            Throw => Some(self.lower_return(inst, CAstKind::Throw)?),
            Yield { resume, unwind } => Some(self.lower_yield(inst, *resume, *unwind)?),
            Branch { dest } => Some(self.lower_branch(inst, *dest)?),
            CondBranch { true_dest, false_dest, true_args } => {
                Some(self.lower_cond_branch(inst, *true_dest, *false_dest, *true_args)?)
            }
            SwitchValue { cases, default } => Some(self.lower_switch_value(inst, cases, *default)?),
            SelectValue { case_count, has_default } => {
                Some(self.lower_select_value(inst, *case_count, *has_default)?)
            }
            SwitchEnum { cases, default } | SwitchEnumAddr { cases, default } => {
                Some(self.lower_switch_enum(inst, cases, *default)?)
            }
            CheckedCastBranch { target, success, failure } => {
                Some(self.lower_checked_cast_branch(inst, target, *success, *failure, true)?)
            }
            CheckedCastAddrBranch { target, success, failure } => {
                Some(self.lower_checked_cast_branch(inst, target, *success, *failure, false)?)
            }

            Unknown { name } => Some(self.lower_unknown(name)?),
        };

        self.record_results(inst, node)?;
        Ok(node)
    }

    fn lower_unknown(&mut self, name: &str) -> LowerResult<NodeRef> {
        let function = self.ctx.function_name.clone().unwrap_or_default();
        log::warn!("unsupported instruction '{}' in function '{}'", name, function);
        let warning = UnsupportedInstruction::new(name, &function, self.ctx.current_location.clone());
        self.ctx.diagnostics.push(warning.into());
        self.ctx.stats.unsupported += 1;
        self.named(CAstKind::Error, name, Vec::new())
    }

    /// Single-result instructions map their result to `node`; result `i` of a
    /// multi-result instruction maps to `ObjectRef[node, i]`.
    fn record_results(&mut self, inst: &Instruction, node: Option<NodeRef>) -> LowerResult<()> {
        if inst.results.is_empty() {
            return Ok(());
        }
        let Some(node) = node else {
            return Err(self.ctx.malformed(format!("'{}' produced no node for its results", inst.kind.name())));
        };
        if inst.results.len() == 1 {
            return self.record(inst.results[0], node);
        }
        for (i, result) in inst.results.iter().enumerate() {
            let index = self.constant(ConstValue::Int(i as i64))?;
            let projection = self.node(CAstKind::ObjectRef, vec![node, index])?;
            self.record(*result, projection)?;
        }
        Ok(())
    }

    pub(crate) fn record(&mut self, value: ValueId, node: NodeRef) -> LowerResult<()> {
        self.ctx
            .node_map
            .record(value, node)
            .map_err(|_| self.ctx.malformed(format!("value {} is defined twice", value)))
    }

    // ---- node construction ----

    fn bridge(&self, err: BridgeError) -> Box<dyn Sil2CastErrorExt> {
        Box::new(err.for_module(&self.ctx.module_name).at(self.ctx.current_location.clone()))
    }

    pub(crate) fn node(&mut self, kind: CAstKind, children: Vec<NodeRef>) -> LowerResult<NodeRef> {
        let node = self.cast.make_node(kind, children).map_err(|e| self.bridge(e))?;
        self.ctx.stats.nodes += 1;
        Ok(node)
    }

    pub(crate) fn named(&mut self, kind: CAstKind, name: &str, children: Vec<NodeRef>) -> LowerResult<NodeRef> {
        let node = self.cast.make_named_node(kind, name, children).map_err(|e| self.bridge(e))?;
        self.ctx.stats.nodes += 1;
        Ok(node)
    }

    pub(crate) fn constant(&mut self, value: ConstValue) -> LowerResult<NodeRef> {
        let node = self.cast.make_constant(value).map_err(|e| self.bridge(e))?;
        self.ctx.stats.nodes += 1;
        Ok(node)
    }

    pub(crate) fn type_literal(&mut self, ty: &str) -> LowerResult<NodeRef> {
        self.named(CAstKind::TypeLiteral, ty, Vec::new())
    }

    /// A `Goto` edge named by the destination label, carrying `args`.
    pub(crate) fn edge(&mut self, dest: BlockId, args: Vec<NodeRef>) -> LowerResult<NodeRef> {
        let label = self.ctx.block_label(dest)?;
        self.named(CAstKind::Goto, &label, args)
    }

    /// A `SwitchCase` edge named by the destination label, carrying the discriminant.
    pub(crate) fn case_edge(&mut self, dest: BlockId, discriminant: NodeRef) -> LowerResult<NodeRef> {
        let label = self.ctx.block_label(dest)?;
        self.named(CAstKind::SwitchCase, &label, vec![discriminant])
    }

    pub(crate) fn record_position_of(&mut self, node: NodeRef) -> LowerResult<()> {
        if let Some(loc) = self.ctx.current_location.clone() {
            self.cast.record_position(node, &loc).map_err(|e| self.bridge(e))?;
        }
        Ok(())
    }

    /// A `Constant` holding the slot of variable `name`. `fresh` declares a
    /// new variable that shadows any earlier one; otherwise an existing
    /// declaration is reused and only unknown names are declared.
    pub(crate) fn variable_slot(&mut self, name: &str, ty: &str, fresh: bool) -> LowerResult<NodeRef> {
        let existing = if fresh { None } else { self.ctx.symbols.resolve(name) };
        let handle = match existing {
            Some(handle) => handle,
            None => self.ctx.symbols.declare(name, ty, self.ctx.current_location.clone()),
        };
        let slot = self
            .ctx
            .symbols
            .get(handle)
            .map(|decl| decl.slot)
            .ok_or_else(|| self.ctx.malformed(format!("variable '{}' has no declaration", name)))?;
        self.constant(ConstValue::Int(slot as i64))
    }

    // ---- operand access ----

    pub(crate) fn resolve_value(&mut self, value: ValueId) -> LowerResult<NodeRef> {
        if let Some(node) = self.ctx.node_map.lookup(value) {
            return Ok(node);
        }
        match self.module.value(value).map(|v| v.origin) {
            Some(ValueOrigin::Undef) => {
                if let Some(node) = self.ctx.undef {
                    return Ok(node);
                }
                let node = self.constant(ConstValue::Null)?;
                self.ctx.undef = Some(node);
                Ok(node)
            }
            Some(_) => Err(self.ctx.malformed(format!("use of {} before its definition", value))),
            None => Err(self.ctx.malformed(format!("use of unknown value {}", value))),
        }
    }

    pub(crate) fn operand_id(&self, inst: &Instruction, index: usize) -> LowerResult<ValueId> {
        inst.operands.get(index).copied().ok_or_else(|| {
            self.ctx.malformed(format!(
                "'{}' expects an operand #{} but has {} operand(s)",
                inst.kind.name(),
                index,
                inst.operands.len()
            ))
        })
    }

    pub(crate) fn operand(&mut self, inst: &Instruction, index: usize) -> LowerResult<NodeRef> {
        let id = self.operand_id(inst, index)?;
        self.resolve_value(id)
    }

    pub(crate) fn operands_from(&mut self, inst: &Instruction, start: usize) -> LowerResult<Vec<NodeRef>> {
        let ids: Vec<ValueId> = inst.operands.iter().skip(start).copied().collect();
        ids.into_iter().map(|v| self.resolve_value(v)).collect()
    }

    pub(crate) fn expect_operands(&self, inst: &Instruction, count: usize) -> LowerResult<()> {
        if inst.operands.len() < count {
            return Err(self.ctx.malformed(format!(
                "'{}' expects {} operand(s) but has {}",
                inst.kind.name(),
                count,
                inst.operands.len()
            )));
        }
        Ok(())
    }

    // ---- types ----

    /// The instruction type annotation, else the type of its first result.
    pub(crate) fn result_type(&self, inst: &Instruction) -> String {
        inst.ty
            .clone()
            .or_else(|| inst.results.first().and_then(|r| self.module.value(*r)).map(|v| v.ty.clone()))
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    pub(crate) fn value_type(&self, value: ValueId) -> String {
        self.module
            .value(value)
            .map(|v| v.ty.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}
