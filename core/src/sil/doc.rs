//! file: core/src/sil/doc.rs
//! description: serde model of the JSON module document.
//!
//! The document mirrors the textual IR: values and blocks are referred to by
//! name (`%3`, `bb1`) and resolved to arena indices by `sil::loader`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDoc {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<BlockDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDoc {
    pub label: String,
    #[serde(default)]
    pub args: Vec<ValueDoc>,
    #[serde(default)]
    pub insts: Vec<InstDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDoc {
    /// SSA name, e.g. `%0`.
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: String,
    /// Source variable name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocDoc {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstDoc {
    pub op: String,
    #[serde(default)]
    pub results: Vec<ValueDoc>,
    /// Operand value names; `undef` denotes an undefined value.
    #[serde(default)]
    pub operands: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<LocDoc>,
}
