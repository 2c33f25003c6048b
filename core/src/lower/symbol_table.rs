//! Per-function table of synthetic variable declarations.
//!
//! Each declaration gets the next slot in the function. A later declaration
//! of the same name shadows the earlier one; both records stay reachable
//! through their handles.

use std::collections::HashMap;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolHandle(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub ty: String,
    pub position: Option<Location>,
    pub slot: usize,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    decls: Vec<Declaration>,
    by_name: HashMap<String, SymbolHandle>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn declare(&mut self, name: &str, ty: &str, position: Option<Location>) -> SymbolHandle {
        let handle = SymbolHandle(self.decls.len());
        self.decls.push(Declaration {
            name: name.to_string(),
            ty: ty.to_string(),
            position,
            slot: handle.0,
        });
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    pub fn resolve(&self, name: &str) -> Option<SymbolHandle> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, handle: SymbolHandle) -> Option<&Declaration> {
        self.decls.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn clear(&mut self) {
        self.decls.clear();
        self.by_name.clear();
    }
}
