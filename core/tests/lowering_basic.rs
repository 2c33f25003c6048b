use sil2cast_core::cast::{CAstGraph, CAstKind, ConstValue, NodeArena, NodeRef};
use sil2cast_core::sil::{DebugLoc, InstKind, ModuleBuilder, SilModule};
use sil2cast_core::{Level, LowerOptions, SilLowerer, lower_module};

fn node_kind(graph: &CAstGraph, node: NodeRef) -> CAstKind {
    graph.node(node).expect("node exists").kind
}

/// The `BlockStmt` children of function `f`, block `block`.
fn block_children(graph: &CAstGraph, function: &str, block: &str) -> Vec<NodeRef> {
    let func = graph.find_named(CAstKind::FunctionStmt, function).expect("function node");
    let func = graph.node(func).expect("function");
    func.children
        .iter()
        .copied()
        .find(|c| graph.node(*c).and_then(|n| n.name.as_deref()) == Some(block))
        .and_then(|b| graph.node(b))
        .map(|b| b.children.clone())
        .expect("block node")
}

/// fn add_twice: %0 = integer_literal 1; %1 = builtin add_Int64(%0, %0); return %1
fn add_twice_module(name: &str) -> SilModule {
    let mut b = ModuleBuilder::new(name);
    let f = b.add_function("add_twice");
    let bb0 = b.add_block(f);
    let one = b.add_inst(bb0, InstKind::IntegerLiteral { value: 1 }, vec![], &["Builtin.Int64"]);
    let one = one.result().expect("literal result");
    let sum = b.add_inst(
        bb0,
        InstKind::Builtin { name: "add_Int64".to_string() },
        vec![one, one],
        &["Builtin.Int64"],
    );
    let sum = sum.result().expect("sum result");
    b.add_inst(bb0, InstKind::Return, vec![sum], &[]);
    b.finish()
}

#[test]
fn each_value_is_lowered_once() {
    let module = add_twice_module("m");
    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;

    assert_eq!(graph.count(CAstKind::Constant), 1);
    let add = graph.find_named(CAstKind::BinaryExpr, "add_Int64").expect("binary expr");
    let add = graph.node(add).expect("node");
    assert_eq!(add.children.len(), 3);
    assert_eq!(node_kind(graph, add.children[0]), CAstKind::Operator);
    assert_eq!(add.children[1], add.children[2]);
    assert_eq!(graph.node(add.children[1]).and_then(|n| n.value.clone()), Some(ConstValue::Int(1)));
    graph.validate().expect("valid graph");
}

#[test]
fn block_children_follow_instruction_order() {
    let module = add_twice_module("m");
    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;

    let kinds: Vec<CAstKind> = block_children(graph, "add_twice", "bb0")
        .into_iter()
        .map(|c| node_kind(graph, c))
        .collect();
    assert_eq!(kinds, vec![CAstKind::Constant, CAstKind::BinaryExpr, CAstKind::Return]);

    let root = graph.root_node().expect("root");
    assert_eq!(root.kind, CAstKind::Module);
    assert_eq!(root.name.as_deref(), Some("m"));
    assert_eq!(lowered.stats.instructions, 3);
    assert_eq!(lowered.stats.blocks, 1);
    assert_eq!(lowered.stats.functions, 1);
    assert_eq!(lowered.stats.nodes, graph.nodes.len());
    assert_eq!(lowered.stats.per_op.get("builtin"), Some(&1));
}

#[test]
fn function_without_blocks_lowers_to_empty_function() {
    let mut b = ModuleBuilder::new("decls");
    b.add_function("external_decl");
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let func = graph.find_named(CAstKind::FunctionStmt, "external_decl").expect("function");
    assert!(graph.node(func).expect("node").children.is_empty());
    assert_eq!(graph.root_node().expect("root").children, vec![func]);
    assert_eq!(lowered.stats.blocks, 0);
}

#[test]
fn empty_module_lowers_to_empty_module_node() {
    let module = ModuleBuilder::new("nothing").finish();
    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    assert_eq!(lowered.graph.nodes.len(), 1);
    let root = lowered.graph.root_node().expect("root");
    assert_eq!(root.kind, CAstKind::Module);
    assert!(root.children.is_empty());
}

#[test]
fn lowerer_resets_between_modules_sharing_an_arena() {
    let first = add_twice_module("first");
    let second = add_twice_module("second");

    let mut arena = NodeArena::new();
    let mut lowerer = SilLowerer::new(LowerOptions::default());
    let root1 = lowerer.lower(&first, &mut arena).expect("first module");
    let after_first = arena.len();
    let root2 = lowerer.lower(&second, &mut arena).expect("second module");

    // Same value ids in both modules; nothing from the first may be reused.
    assert_eq!(arena.len(), after_first * 2);
    assert_ne!(root1, root2);
    assert_eq!(lowerer.stats().instructions, 3);
    assert_eq!(lowerer.stats().functions, 1);
    assert!(lowerer.diagnostics().is_empty());

    let root2 = arena.get(root2).expect("root");
    assert_eq!(root2.name.as_deref(), Some("second"));
    assert!(root2.children.iter().all(|c| c.index() >= after_first));
}

#[test]
fn unknown_instruction_degrades_to_error_node() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let odd = b.add_inst(bb0, InstKind::Unknown { name: "frobnicate".to_string() }, vec![], &["T"]);
    let odd = odd.result().expect("result");
    let loc = b.add_inst(bb0, InstKind::Return, vec![odd], &[]);
    b.with_loc(loc.id, DebugLoc::new("/src/main.swift", 7, 3));
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let error = graph.find_named(CAstKind::Error, "frobnicate").expect("error node");
    assert!(graph.node(error).expect("node").children.is_empty());

    let ret = block_children(graph, "f", "bb0")[1];
    assert_eq!(graph.node(ret).expect("return").children, vec![error]);

    assert_eq!(lowered.stats.unsupported, 1);
    assert_eq!(lowered.diagnostics.len(), 1);
    assert_eq!(lowered.diagnostics[0].level(), Level::Warning);
    assert!(lowered.diagnostics[0].message().contains("frobnicate"));
}

#[test]
fn positions_are_recorded_for_located_instructions() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let lit = b.add_inst(bb0, InstKind::IntegerLiteral { value: 4 }, vec![], &["Int"]);
    b.with_loc(lit.id, DebugLoc::new("/work/swift-source/test/a.swift", 12, 5));
    let ret = b.add_inst(bb0, InstKind::Return, vec![], &[]);
    b.with_loc(ret.id, DebugLoc::new("", 0, 0));
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let children = block_children(graph, "f", "bb0");

    let pos = graph.position(children[0]).expect("literal position");
    assert_eq!(pos.line, 12);
    assert_eq!(pos.column, 5);
    assert_eq!(pos.short_file(), "swift-source/test/a.swift");
    assert!(graph.position(children[1]).is_none());
}

#[test]
fn block_arguments_become_variables() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("id");
    let bb0 = b.add_block(f);
    let bb1 = b.add_block(f);
    let x = b.add_block_arg(bb0, "Int", Some("x".to_string()));
    b.add_inst(bb0, InstKind::Branch { dest: bb1 }, vec![x], &[]);
    let y = b.add_block_arg(bb1, "Int", None);
    b.add_inst(bb1, InstKind::Return, vec![y], &[]);
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let x = graph.find_named(CAstKind::Var, "x").expect("x");
    let y = graph.find_named(CAstKind::Var, "bb1.arg0").expect("bb1 argument");

    let goto = block_children(graph, "id", "bb0")[0];
    let goto = graph.node(goto).expect("goto");
    assert_eq!(goto.kind, CAstKind::Goto);
    assert_eq!(goto.name.as_deref(), Some("bb1"));
    assert_eq!(goto.children, vec![x]);

    let ret = block_children(graph, "id", "bb1")[0];
    assert_eq!(graph.node(ret).expect("return").children, vec![y]);
}

#[test]
fn undef_operands_share_one_null_per_function() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let u1 = b.add_undef("Int");
    let u2 = b.add_undef("Int");
    let pair = b.add_inst(bb0, InstKind::Tuple, vec![u1, u2], &["(Int, Int)"]);
    let pair = pair.result().expect("tuple");
    b.add_inst(bb0, InstKind::Return, vec![pair], &[]);
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let tuple = graph.find_named(CAstKind::ObjectLiteral, "(Int, Int)").expect("tuple");
    let tuple = graph.node(tuple).expect("node");
    assert_eq!(tuple.children.len(), 2);
    assert_eq!(tuple.children[0], tuple.children[1]);
    assert_eq!(graph.node(tuple.children[0]).and_then(|n| n.value.clone()), Some(ConstValue::Null));
}

fn retain_module() -> SilModule {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let obj = b.add_block_arg(bb0, "C", Some("obj".to_string()));
    b.add_inst(bb0, InstKind::StrongRetain, vec![obj], &[]);
    let dep = b.add_inst(bb0, InstKind::MarkDependence, vec![obj, obj], &["C"]);
    let dep = dep.result().expect("dependence");
    b.add_inst(bb0, InstKind::StrongRelease, vec![obj], &[]);
    b.add_inst(bb0, InstKind::Return, vec![dep], &[]);
    b.finish()
}

#[test]
fn refcount_instructions_become_placeholders() {
    let lowered = lower_module(&retain_module(), &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let kinds: Vec<CAstKind> = block_children(graph, "f", "bb0")
        .into_iter()
        .map(|c| node_kind(graph, c))
        .collect();
    assert_eq!(kinds, vec![CAstKind::Empty, CAstKind::Mark, CAstKind::Empty, CAstKind::Return]);
    assert!(graph.find_named(CAstKind::Empty, "strong_retain").is_some());
    assert!(graph.find_named(CAstKind::Mark, "dependence").is_some());
}

#[test]
fn dropped_lifetime_markers_leave_no_nodes() {
    let options = LowerOptions { drop_lifetime_markers: true, ..LowerOptions::default() };
    let lowered = lower_module(&retain_module(), &options).expect("lowered");
    let graph = &lowered.graph;
    let kinds: Vec<CAstKind> = block_children(graph, "f", "bb0")
        .into_iter()
        .map(|c| node_kind(graph, c))
        .collect();
    assert_eq!(kinds, vec![CAstKind::Mark, CAstKind::Return]);
    assert_eq!(graph.count(CAstKind::Empty), 0);
    assert_eq!(lowered.stats.instructions, 4);
}

#[test]
fn use_before_definition_is_malformed() {
    let mut b = ModuleBuilder::new("broken");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let ret = b.add_inst(bb0, InstKind::Return, vec![], &[]);
    let lit = b.add_inst(bb0, InstKind::IntegerLiteral { value: 1 }, vec![], &["Int"]);
    b.set_operands(ret.id, vec![lit.result().expect("literal")]);
    let module = b.finish();

    let err = lower_module(&module, &LowerOptions::default()).err().expect("malformed");
    assert_eq!(err.level(), Level::Error);
    assert!(err.message().contains("module 'broken'"));
    assert!(err.message().contains("function 'f'"));
}

#[test]
fn missing_operand_is_malformed() {
    let mut b = ModuleBuilder::new("broken");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    b.add_inst(bb0, InstKind::Store, vec![], &[]);
    let module = b.finish();

    let err = lower_module(&module, &LowerOptions::default()).err().expect("malformed");
    assert!(err.message().contains("store"));
}

#[test]
fn stack_variables_become_declarations_with_slots() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let slot = b.add_inst(bb0, InstKind::AllocStack { var_name: Some("count".to_string()) }, vec![], &["*Int"]);
    let slot = slot.result().expect("slot");
    let lit = b.add_inst(bb0, InstKind::IntegerLiteral { value: 0 }, vec![], &["Int"]);
    let lit = lit.result().expect("literal");
    b.add_inst(bb0, InstKind::Store, vec![lit, slot], &[]);
    b.add_inst(bb0, InstKind::DebugValue { var_name: "zero".to_string() }, vec![lit], &[]);
    let loaded = b.add_inst(bb0, InstKind::Load, vec![slot], &["Int"]);
    let loaded = loaded.result().expect("load");
    b.add_inst(bb0, InstKind::DeallocStack, vec![slot], &[]);
    b.add_inst(bb0, InstKind::Return, vec![loaded], &[]);
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let count = graph.find_named(CAstKind::DeclStmt, "count").expect("count declaration");
    let children = block_children(graph, "f", "bb0");
    assert_eq!(children[0], count);

    let count_decl = graph.node(count).expect("count");
    assert_eq!(count_decl.children.len(), 2);
    let new = graph.node(count_decl.children[0]).expect("allocation");
    assert_eq!(new.kind, CAstKind::New);
    assert_eq!(new.name.as_deref(), Some("*Int"));
    assert_eq!(graph.node(count_decl.children[1]).expect("slot").value, Some(ConstValue::Int(0)));

    let store = graph.node(children[2]).expect("store");
    assert_eq!(store.kind, CAstKind::Assign);
    assert_eq!(store.children[0], count);
    assert_eq!(store.children[1], children[1]);

    let decl = graph.node(children[3]).expect("decl");
    assert_eq!(decl.kind, CAstKind::DeclStmt);
    assert_eq!(decl.name.as_deref(), Some("zero"));
    assert_eq!(decl.children[0], children[1]);
    assert_eq!(graph.node(decl.children[1]).expect("slot").value, Some(ConstValue::Int(1)));

    let load = graph.node(children[4]).expect("load");
    assert_eq!(load.kind, CAstKind::Deref);
    assert_eq!(load.children, vec![count]);
    assert_eq!(node_kind(graph, children[5]), CAstKind::Delete);
}

#[test]
fn debug_value_reuses_the_slot_of_a_declared_variable() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    b.add_block_arg(bb0, "Int", Some("seed".to_string()));
    let slot = b.add_inst(bb0, InstKind::AllocStack { var_name: Some("total".to_string()) }, vec![], &["*Int"]);
    let slot = slot.result().expect("slot");
    let lit = b.add_inst(bb0, InstKind::IntegerLiteral { value: 5 }, vec![], &["Int"]);
    let lit = lit.result().expect("literal");
    b.add_inst(bb0, InstKind::DebugValue { var_name: "total".to_string() }, vec![lit], &[]);
    b.add_inst(bb0, InstKind::DeallocStack, vec![slot], &[]);
    b.add_inst(bb0, InstKind::Return, vec![], &[]);
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let children = block_children(graph, "f", "bb0");
    let slot_of = |decl: NodeRef| {
        let decl = graph.node(decl).expect("decl");
        assert_eq!(decl.kind, CAstKind::DeclStmt);
        assert_eq!(decl.name.as_deref(), Some("total"));
        graph.node(decl.children[1]).expect("slot").value.clone()
    };
    // Block arguments are declared first, so `total` takes slot 1.
    assert_eq!(slot_of(children[0]), Some(ConstValue::Int(1)));
    assert_eq!(slot_of(children[2]), Some(ConstValue::Int(1)));
}

#[test]
fn values_defined_in_later_listed_blocks_lower_in_dominance_order() {
    let mut b = ModuleBuilder::new("m");
    let f = b.add_function("f");
    let bb0 = b.add_block(f);
    let bb1 = b.add_block(f);
    let bb2 = b.add_block(f);

    b.add_inst(bb0, InstKind::Branch { dest: bb2 }, vec![], &[]);
    let ret = b.add_inst(bb1, InstKind::Return, vec![], &[]);
    let lit = b.add_inst(bb2, InstKind::IntegerLiteral { value: 9 }, vec![], &["Int"]);
    let lit = lit.result().expect("literal");
    b.set_operands(ret.id, vec![lit]);
    b.add_inst(bb2, InstKind::Branch { dest: bb1 }, vec![], &[]);
    let module = b.finish();

    let lowered = lower_module(&module, &LowerOptions::default()).expect("lowered");
    let graph = &lowered.graph;
    let func = graph.find_named(CAstKind::FunctionStmt, "f").expect("function");
    let labels: Vec<Option<&str>> = graph
        .node(func)
        .expect("function node")
        .children
        .iter()
        .map(|c| graph.node(*c).expect("block").name.as_deref())
        .collect();
    assert_eq!(labels, vec![Some("bb0"), Some("bb1"), Some("bb2")]);

    let literal = block_children(graph, "f", "bb2")[0];
    let ret = graph.node(block_children(graph, "f", "bb1")[0]).expect("return");
    assert_eq!(ret.kind, CAstKind::Return);
    assert_eq!(ret.children, vec![literal]);
    assert_eq!(graph.node(literal).expect("literal").value, Some(ConstValue::Int(9)));
}
