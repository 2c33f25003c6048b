//! file: core/src/sil/loader.rs
//! description: builds a `SilModule` from a JSON module document.
//!
//! Names are resolved per function in two passes: the first creates blocks,
//! block arguments and instructions with their results; the second resolves
//! operand names, so a value may be used textually before its definition.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::builder::ModuleBuilder;
use super::doc::{InstDoc, ModuleDoc};
use super::err::ModuleLoadError;
use super::ids::{BlockId, InstId, ValueId};
use super::kind::InstKind;
use super::module::{DebugLoc, SilModule};

const ISSUER: &str = "sil2cast.loader";

/// Parses `text` as a module document and builds the module.
pub fn load_module_str(text: &str) -> Result<SilModule, ModuleLoadError> {
    let doc: ModuleDoc = serde_json::from_str(text)
        .map_err(|e| ModuleLoadError::new(ISSUER, format!("invalid module document: {}", e)))?;
    build_module(&doc)
}

pub fn build_module(doc: &ModuleDoc) -> Result<SilModule, ModuleLoadError> {
    let mut builder = ModuleBuilder::new(doc.name.clone());
    if let Some(src) = &doc.source_file {
        builder = builder.source_file(src.clone());
    }

    for func in &doc.functions {
        let fid = builder.add_function(func.name.clone());
        let mut labels: HashMap<String, BlockId> = HashMap::new();
        let mut values: HashMap<String, ValueId> = HashMap::new();

        for block in &func.blocks {
            let bid = builder.add_block(fid);
            builder.label_block(bid, block.label.clone());
            if labels.insert(block.label.clone(), bid).is_some() {
                return Err(load_error(&func.name, format!("duplicate block label '{}'", block.label)));
            }
            for arg in &block.args {
                let v = builder.add_block_arg(bid, arg.ty.clone(), arg.var.clone());
                define(&mut values, &func.name, &arg.name, v)?;
            }
        }

        let mut pending: Vec<(InstId, &InstDoc)> = Vec::new();
        for block in &func.blocks {
            let bid = labels[&block.label];
            for inst in &block.insts {
                let kind = parse_kind(inst, &labels)
                    .map_err(|msg| load_error(&func.name, format!("{}: {}", inst.op, msg)))?;
                let types: Vec<&str> = inst.results.iter().map(|r| r.ty.as_str()).collect();
                let handle = builder.add_inst(bid, kind, Vec::new(), &types);
                if let Some(ty) = &inst.ty {
                    builder.with_type(handle.id, ty.clone());
                }
                if let Some(loc) = &inst.loc {
                    builder.with_loc(handle.id, DebugLoc::new(loc.file.clone(), loc.line, loc.column));
                }
                for (doc, value) in inst.results.iter().zip(handle.results.iter()) {
                    if let Some(var) = &doc.var {
                        builder.name_value(*value, var.clone());
                    }
                    define(&mut values, &func.name, &doc.name, *value)?;
                }
                pending.push((handle.id, inst));
            }
        }

        for (id, inst) in pending {
            let mut operands = Vec::with_capacity(inst.operands.len());
            for name in &inst.operands {
                if name == "undef" {
                    operands.push(builder.add_undef("<undef>"));
                    continue;
                }
                match values.get(name) {
                    Some(v) => operands.push(*v),
                    None => {
                        return Err(load_error(
                            &func.name,
                            format!("{}: unknown value '{}'", inst.op, name),
                        ));
                    }
                }
            }
            builder.set_operands(id, operands);
        }
    }

    Ok(builder.finish())
}

fn define(
    values: &mut HashMap<String, ValueId>,
    function: &str,
    name: &str,
    value: ValueId,
) -> Result<(), ModuleLoadError> {
    if values.insert(name.to_string(), value).is_some() {
        return Err(load_error(function, format!("value '{}' defined twice", name)));
    }
    Ok(())
}

fn load_error(function: &str, message: String) -> ModuleLoadError {
    ModuleLoadError::new(ISSUER, format!("in function '{}': {}", function, message))
}

/// Typed access to an instruction's `attrs` object.
struct Attrs<'a> {
    map: &'a Map<String, Value>,
    labels: &'a HashMap<String, BlockId>,
}

impl<'a> Attrs<'a> {
    fn get(&self, key: &str) -> Result<&'a Value, String> {
        self.map.get(key).ok_or_else(|| format!("missing attribute '{}'", key))
    }

    fn string(&self, key: &str) -> Result<String, String> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("attribute '{}' must be a string", key))
    }

    fn opt_string(&self, key: &str) -> Result<Option<String>, String> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.string(key).map(Some),
        }
    }

    fn string_or(&self, key: &str, default: &str) -> Result<String, String> {
        Ok(self.opt_string(key)?.unwrap_or_else(|| default.to_string()))
    }

    fn int(&self, key: &str) -> Result<i64, String> {
        self.get(key)?
            .as_i64()
            .ok_or_else(|| format!("attribute '{}' must be an integer", key))
    }

    fn u32_or(&self, key: &str, default: u32) -> Result<u32, String> {
        match self.map.get(key) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| format!("attribute '{}' must be a small unsigned integer", key)),
        }
    }

    fn float(&self, key: &str) -> Result<f64, String> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| format!("attribute '{}' must be a number", key))
    }

    fn flag(&self, key: &str) -> bool {
        self.map.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn label(&self, name: &str) -> Result<BlockId, String> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| format!("unknown block '{}'", name))
    }

    fn block(&self, key: &str) -> Result<BlockId, String> {
        let name = self.string(key)?;
        self.label(&name)
    }

    fn opt_block(&self, key: &str) -> Result<Option<BlockId>, String> {
        match self.opt_string(key)? {
            Some(name) => self.label(&name).map(Some),
            None => Ok(None),
        }
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>, String> {
        self.get(key)?
            .as_array()
            .ok_or_else(|| format!("attribute '{}' must be an array", key))
    }

    fn strings(&self, key: &str) -> Result<Vec<String>, String> {
        self.array(key)?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("attribute '{}' must hold strings", key))
            })
            .collect()
    }

    fn blocks(&self, key: &str) -> Result<Vec<BlockId>, String> {
        self.strings(key)?.iter().map(|n| self.label(n)).collect()
    }

    /// `[["Case", "bb1"], ...]`
    fn enum_cases(&self, key: &str) -> Result<Vec<(String, BlockId)>, String> {
        self.array(key)?
            .iter()
            .map(|pair| {
                let case = pair.get(0).and_then(Value::as_str);
                let dest = pair.get(1).and_then(Value::as_str);
                match (case, dest) {
                    (Some(c), Some(d)) => Ok((c.to_string(), self.label(d)?)),
                    _ => Err(format!("attribute '{}' must hold [case, block] pairs", key)),
                }
            })
            .collect()
    }
}

fn parse_kind(inst: &InstDoc, labels: &HashMap<String, BlockId>) -> Result<InstKind, String> {
    use InstKind::*;
    let a = Attrs { map: &inst.attrs, labels };
    let kind = match inst.op.as_str() {
        "alloc_stack" => AllocStack { var_name: a.opt_string("var")? },
        "alloc_box" => AllocBox { var_name: a.opt_string("var")? },
        "alloc_ref" => AllocRef,
        "alloc_value_buffer" => AllocValueBuffer,
        "alloc_global" => AllocGlobal { global: a.string("global")? },
        "project_box" => ProjectBox { field_index: a.u32_or("field", 0)? },
        "project_value_buffer" => ProjectValueBuffer,
        "dealloc_stack" => DeallocStack,
        "dealloc_box" => DeallocBox,
        "dealloc_ref" => DeallocRef,
        "dealloc_value_buffer" => DeallocValueBuffer,
        "debug_value" => DebugValue { var_name: a.string("var")? },
        "debug_value_addr" => DebugValueAddr { var_name: a.string("var")? },
        "load" => Load,
        "store" => Store,
        "load_borrow" => LoadBorrow,
        "begin_borrow" => BeginBorrow,
        "end_borrow" => EndBorrow,
        "assign" => Assign,
        "store_borrow" => StoreBorrow,
        "mark_uninitialized" => MarkUninitialized,
        "mark_function_escape" => MarkFunctionEscape,
        "copy_addr" => CopyAddr,
        "destroy_addr" => DestroyAddr,
        "index_addr" => IndexAddr,
        "tail_addr" => TailAddr,
        "begin_access" => BeginAccess { access: a.string_or("access", "unknown")? },
        "end_access" => EndAccess,
        "begin_unpaired_access" => BeginUnpairedAccess { access: a.string_or("access", "unknown")? },
        "end_unpaired_access" => EndUnpairedAccess,
        "strong_retain" => StrongRetain,
        "strong_release" => StrongRelease,
        "retain_value" => RetainValue,
        "release_value" => ReleaseValue,
        "strong_pin" => StrongPin,
        "strong_unpin" => StrongUnpin,
        "end_lifetime" => EndLifetime,
        "mark_dependence" => MarkDependence,
        "function_ref" => FunctionRef { function: a.string("function")? },
        "global_addr" => GlobalAddr { global: a.string("global")? },
        "integer_literal" => IntegerLiteral { value: a.int("value")? },
        "float_literal" => FloatLiteral { value: a.float("value")? },
        "string_literal" => StringLiteral { value: a.string("value")? },
        "const_string_literal" => ConstStringLiteral { value: a.string("value")? },
        "class_method" => ClassMethod { member: a.string("member")? },
        "objc_method" => ObjCMethod { member: a.string("member")? },
        "super_method" => SuperMethod { member: a.string("member")? },
        "witness_method" => WitnessMethod { member: a.string("member")? },
        "apply" => Apply,
        "begin_apply" => BeginApply,
        "end_apply" => EndApply,
        "abort_apply" => AbortApply,
        "partial_apply" => PartialApply,
        "builtin" => Builtin { name: a.string("name")? },
        "metatype" => Metatype,
        "value_metatype" => ValueMetatype,
        "existential_metatype" => ExistentialMetatype,
        "copy_value" => CopyValue,
        "destroy_value" => DestroyValue,
        "tuple" => Tuple,
        "tuple_extract" => TupleExtract { index: a.u32_or("index", 0)? },
        "tuple_element_addr" => TupleElementAddr { index: a.u32_or("index", 0)? },
        "struct" => Struct,
        "struct_extract" => StructExtract { field: a.string("field")? },
        "struct_element_addr" => StructElementAddr { field: a.string("field")? },
        "ref_element_addr" => RefElementAddr { field: a.string("field")? },
        "ref_tail_addr" => RefTailAddr,
        "enum" => Enum { case: a.string("case")? },
        "unchecked_enum_data" => UncheckedEnumData { case: a.string("case")? },
        "inject_enum_addr" => InjectEnumAddr { case: a.string("case")? },
        "init_enum_data_addr" => InitEnumDataAddr { case: a.string("case")? },
        "unchecked_take_enum_data_addr" => UncheckedTakeEnumDataAddr { case: a.string("case")? },
        "select_enum" => SelectEnum { cases: a.strings("cases")?, has_default: a.flag("has_default") },
        "select_enum_addr" => SelectEnumAddr { cases: a.strings("cases")?, has_default: a.flag("has_default") },
        "init_existential_addr" => InitExistentialAddr,
        "deinit_existential_addr" => DeinitExistentialAddr,
        "init_existential_value" => InitExistentialValue,
        "deinit_existential_value" => DeinitExistentialValue,
        "open_existential_addr" => OpenExistentialAddr,
        "open_existential_value" => OpenExistentialValue,
        "init_existential_metatype" => InitExistentialMetatype,
        "open_existential_metatype" => OpenExistentialMetatype,
        "init_existential_ref" => InitExistentialRef,
        "open_existential_ref" => OpenExistentialRef,
        "alloc_existential_box" => AllocExistentialBox,
        "project_existential_box" => ProjectExistentialBox,
        "open_existential_box" => OpenExistentialBox,
        "open_existential_box_value" => OpenExistentialBoxValue,
        "dealloc_existential_box" => DeallocExistentialBox,
        "upcast" => Upcast,
        "address_to_pointer" => AddressToPointer,
        "pointer_to_address" => PointerToAddress,
        "unchecked_ref_cast" => UncheckedRefCast,
        "unchecked_ref_cast_addr" => UncheckedRefCastAddr,
        "unchecked_addr_cast" => UncheckedAddrCast,
        "unchecked_trivial_bit_cast" => UncheckedTrivialBitCast,
        "unchecked_bitwise_cast" => UncheckedBitwiseCast,
        "unchecked_ownership_conversion" => UncheckedOwnershipConversion,
        "ref_to_raw_pointer" => RefToRawPointer,
        "raw_pointer_to_ref" => RawPointerToRef,
        "unmanaged_to_ref" => UnmanagedToRef,
        "ref_to_unmanaged" => RefToUnmanaged,
        "convert_function" => ConvertFunction,
        "thin_function_to_pointer" => ThinFunctionToPointer,
        "pointer_to_thin_function" => PointerToThinFunction,
        "classify_bridge_object" => ClassifyBridgeObject,
        "ref_to_bridge_object" => RefToBridgeObject,
        "bridge_object_to_ref" => BridgeObjectToRef,
        "thin_to_thick_function" => ThinToThickFunction,
        "thick_to_objc_metatype" => ThickToObjCMetatype,
        "objc_to_thick_metatype" => ObjCToThickMetatype,
        "unconditional_checked_cast" => UnconditionalCheckedCast,
        "unconditional_checked_cast_addr" => UnconditionalCheckedCastAddr,
        "cond_fail" => CondFail { message: a.opt_string("message")? },
        "unreachable" => Unreachable,
        "return" => Return,
        "throw" => Throw,
        "yield" => Yield { resume: a.block("resume")?, unwind: a.block("unwind")? },
        "unwind" => Unwind,
        "br" => Branch { dest: a.block("dest")? },
        "cond_br" => CondBranch {
            true_dest: a.block("true_dest")?,
            false_dest: a.block("false_dest")?,
            true_args: a.u32_or("true_args", 0)?,
        },
        "switch_value" => SwitchValue { cases: a.blocks("cases")?, default: a.opt_block("default")? },
        "select_value" => SelectValue {
            case_count: a.u32_or("case_count", 0)?,
            has_default: a.flag("has_default"),
        },
        "switch_enum" => SwitchEnum { cases: a.enum_cases("cases")?, default: a.opt_block("default")? },
        "switch_enum_addr" => SwitchEnumAddr { cases: a.enum_cases("cases")?, default: a.opt_block("default")? },
        "checked_cast_br" => CheckedCastBranch {
            target: a.string("target")?,
            success: a.block("success")?,
            failure: a.block("failure")?,
        },
        "checked_cast_addr_br" => CheckedCastAddrBranch {
            target: a.string("target")?,
            success: a.block("success")?,
            failure: a.block("failure")?,
        },
        "try_apply" => TryApply { normal: a.block("normal")?, error: a.block("error")? },
        other => Unknown { name: other.to_string() },
    };
    Ok(kind)
}
