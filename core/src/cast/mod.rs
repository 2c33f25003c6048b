//! Generic AST: the heterogeneous node graph consumed by analysis engines.

pub mod arena;
pub mod builder;
pub mod err;
pub mod node;

pub use arena::{CAstGraph, NodeArena};
pub use builder::CAstBuilder;
pub use err::BridgeError;
pub use node::{CAstKind, CAstNode, ConstValue, NodeRef};
