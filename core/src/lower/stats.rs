use std::collections::BTreeMap;

use serde::Serialize;

/// Counters collected while lowering one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoweringStats {
    pub instructions: usize,
    pub functions: usize,
    pub blocks: usize,
    pub unsupported: usize,
    pub nodes: usize,
    /// Instructions visited per op name.
    pub per_op: BTreeMap<String, usize>,
}

impl LoweringStats {
    pub fn count_op(&mut self, op: &str) {
        *self.per_op.entry(op.to_string()).or_insert(0) += 1;
    }
}
