use std::collections::HashMap;

use crate::cast::NodeRef;
use crate::sil::ValueId;

/// Value-keyed cache guaranteeing one generic AST node per source value.
#[derive(Debug, Default)]
pub struct NodeMap {
    entries: HashMap<ValueId, NodeRef>,
}

impl NodeMap {
    pub fn new() -> Self {
        NodeMap::default()
    }

    pub fn lookup(&self, value: ValueId) -> Option<NodeRef> {
        self.entries.get(&value).copied()
    }

    /// Records the node for `value`. Returns the existing node as the error
    /// when the value already has one.
    pub fn record(&mut self, value: ValueId, node: NodeRef) -> Result<(), NodeRef> {
        if let Some(existing) = self.entries.get(&value) {
            return Err(*existing);
        }
        self.entries.insert(value, node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
