use std::collections::HashMap;
use std::path::PathBuf;

use sil2cast_core::cast::{CAstKind, NodeRef};
use sil2cast_core::config::{ENV_ENGINE_DIR, ENV_OUTPUT, ENV_PRINT};
use sil2cast_core::lower::builtins::{BuiltinOp, builtin_operator};
use sil2cast_core::lower::node_map::NodeMap;
use sil2cast_core::lower::scope::{ScopeKind, ScopeStack};
use sil2cast_core::lower::symbol_table::SymbolTable;
use sil2cast_core::lower::{MalformedIrError, UnsupportedInstruction};
use sil2cast_core::sil::ValueId;
use sil2cast_core::{EngineConfig, Level, Location, LowerOptions, generate_error_report};

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn builtin_prefixes_map_to_operators() {
    assert_eq!(builtin_operator("add_Int64"), Some(BuiltinOp::Binary("+")));
    assert_eq!(builtin_operator("fadd_FPIEEE64"), Some(BuiltinOp::Binary("+")));
    assert_eq!(builtin_operator("ssub_with_overflow_Int32"), Some(BuiltinOp::Binary("-")));
    assert_eq!(builtin_operator("cmp_slt_Int1"), Some(BuiltinOp::Binary("<")));
    assert_eq!(builtin_operator("fcmp_oeq_FPIEEE32"), Some(BuiltinOp::Binary("==")));
    assert_eq!(builtin_operator("lshr_Int8"), Some(BuiltinOp::Binary(">>>")));
    assert_eq!(builtin_operator("xor"), Some(BuiltinOp::Binary("^")));
    assert_eq!(builtin_operator("fneg_FPIEEE64"), Some(BuiltinOp::Unary("-")));
}

#[test]
fn builtin_prefix_must_end_at_a_word_boundary() {
    assert_eq!(builtin_operator("addressof"), None);
    assert_eq!(builtin_operator("ordinal_Int8"), None);
    assert_eq!(builtin_operator("int_trap"), None);
    assert_eq!(builtin_operator(""), None);
}

#[test]
fn symbol_table_assigns_slots_and_shadows() {
    let mut table = SymbolTable::new();
    assert!(table.is_empty());
    let first = table.declare("x", "Int", None);
    let loc = Location::new("a.swift".to_string(), 2, 1);
    let second = table.declare("x", "String", Some(loc.clone()));
    let other = table.declare("y", "Bool", None);

    assert_eq!(table.len(), 3);
    assert_eq!(table.resolve("x"), Some(second));
    assert_eq!(table.get(first).map(|d| d.ty.as_str()), Some("Int"));
    assert_eq!(table.get(second).map(|d| d.slot), Some(1));
    assert_eq!(table.get(second).and_then(|d| d.position.clone()), Some(loc));
    assert_eq!(table.get(other).map(|d| d.slot), Some(2));
    assert_eq!(table.resolve("z"), None);

    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.resolve("x"), None);
}

#[test]
fn node_map_rejects_a_second_definition() {
    let mut map = NodeMap::new();
    map.record(ValueId(3), NodeRef(10)).expect("first record");
    assert_eq!(map.record(ValueId(3), NodeRef(11)), Err(NodeRef(10)));
    assert_eq!(map.lookup(ValueId(3)), Some(NodeRef(10)));
    assert_eq!(map.lookup(ValueId(4)), None);
    assert_eq!(map.len(), 1);
    map.clear();
    assert!(map.is_empty());
}

#[test]
fn scope_stack_pops_in_nesting_order() {
    let mut scopes = ScopeStack::new();
    assert!(scopes.append(NodeRef(0)).is_err());

    scopes.push(ScopeKind::Module, "m");
    scopes.push(ScopeKind::Function, "f");
    scopes.append(NodeRef(1)).expect("append");
    scopes.append(NodeRef(2)).expect("append");
    assert_eq!(scopes.depth(), 2);
    assert_eq!(scopes.current().map(|f| f.name.as_str()), Some("f"));

    let err = scopes.pop(ScopeKind::Block).expect_err("wrong kind");
    assert!(err.contains("Block"));
    assert_eq!(scopes.depth(), 2, "a mismatched pop keeps the frame");

    let frame = scopes.pop(ScopeKind::Function).expect("function frame");
    assert_eq!(frame.children, vec![NodeRef(1), NodeRef(2)]);
    assert_eq!(ScopeKind::Function.composite(), CAstKind::FunctionStmt);

    scopes.pop(ScopeKind::Module).expect("module frame");
    assert!(scopes.pop(ScopeKind::Module).is_err());
}

#[test]
fn lower_options_read_from_variables() {
    let options = LowerOptions::from_vars(vars(&[(ENV_PRINT, "yes"), (ENV_OUTPUT, "/tmp/dumps")]));
    assert!(options.print);
    assert_eq!(options.dump_dir, Some(PathBuf::from("/tmp/dumps")));
    assert!(!options.drop_lifetime_markers);

    let options = LowerOptions::from_vars(vars(&[(ENV_PRINT, "0"), (ENV_OUTPUT, "  ")]));
    assert!(!options.print);
    assert_eq!(options.dump_dir, None);

    assert_eq!(LowerOptions::from_vars(vars(&[])), LowerOptions::default());
}

#[test]
fn engine_config_defaults_to_engines_dir() {
    assert_eq!(EngineConfig::from_vars(vars(&[])).engine_dir, PathBuf::from("engines"));
    let config = EngineConfig::from_vars(vars(&[(ENV_ENGINE_DIR, "/opt/engines")]));
    assert_eq!(config.engine_dir, PathBuf::from("/opt/engines"));
}

#[test]
fn error_reports_carry_level_location_and_message() {
    let err = MalformedIrError::new("m", Some("f"), "bad operand")
        .at(Some(Location::new("a.swift".to_string(), 4, 2)));
    let report = generate_error_report(&err);
    assert_eq!(report, "SIL2CAST | ERROR | a.swift:4:2 | malformed IR in module 'm', function 'f': bad operand");

    let warning = UnsupportedInstruction::new("hop_to_executor", "f", None);
    let report = generate_error_report(&warning);
    assert!(report.starts_with("SIL2CAST | WARNING | unknown location |"));
    use sil2cast_core::Sil2CastErrorExt;
    assert_eq!(warning.level(), Level::Warning);
}
