//! file: core/src/cast/node.rs
//! description: the generic AST node model handed to analysis engines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node inside a builder's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub u32);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CAstKind {
    // structure
    Module,
    FunctionStmt,
    BlockStmt,
    DeclStmt,
    // leaves
    Constant,
    Var,
    Operator,
    TypeLiteral,
    Empty,
    Error,
    // memory
    New,
    Delete,
    Deref,
    Assign,
    Copy,
    Borrow,
    Access,
    EndScope,
    Mark,
    ObjectRef,
    ArrayRef,
    ObjectLiteral,
    // calls and dispatch
    MethodRef,
    Call,
    BinaryExpr,
    UnaryExpr,
    // types and values
    TypeOf,
    EnumCase,
    EnumPayload,
    ChoiceExpr,
    ChoiceCase,
    Box,
    Unbox,
    Cast,
    UncheckedCast,
    InstanceOf,
    Assert,
    // control flow
    Return,
    Throw,
    Yield,
    Unwind,
    Unreachable,
    Goto,
    IfStmt,
    Switch,
    SwitchCase,
    Try,
}

impl CAstKind {
    /// True for kinds that make sense with no children at all.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            CAstKind::Constant
                | CAstKind::Var
                | CAstKind::Operator
                | CAstKind::TypeLiteral
                | CAstKind::Empty
                | CAstKind::Error
        )
    }
}

impl fmt::Display for CAstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// A named program entity, such as a function or global.
    Symbol(String),
    Null,
    /// Matches any discriminant; used for default edges.
    Wildcard,
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(i) => write!(f, "{}", i),
            ConstValue::Float(x) => write!(f, "{}", x),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Str(s) => write!(f, "{:?}", s),
            ConstValue::Symbol(s) => write!(f, "@{}", s),
            ConstValue::Null => write!(f, "null"),
            ConstValue::Wildcard => write!(f, "_"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CAstNode {
    pub kind: CAstKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConstValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRef>,
}
