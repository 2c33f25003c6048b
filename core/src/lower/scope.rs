//! file: core/src/lower/scope.rs
//! description: scope accumulators for module, function and block nesting.
//!
//! The driver pushes a frame on entering a scope, the translator appends the
//! nodes it produces to the innermost frame, and on exit the frame is popped
//! and folded into one composite node that joins the parent frame.

use crate::cast::{CAstKind, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

impl ScopeKind {
    /// The node kind a frame of this scope folds into.
    pub fn composite(self) -> CAstKind {
        match self {
            ScopeKind::Module => CAstKind::Module,
            ScopeKind::Function => CAstKind::FunctionStmt,
            ScopeKind::Block => CAstKind::BlockStmt,
        }
    }
}

#[derive(Debug)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    pub name: String,
    pub children: Vec<NodeRef>,
    /// Instructions visited while this frame was innermost.
    pub visited: usize,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    pub fn push(&mut self, kind: ScopeKind, name: &str) {
        log::debug!("enter {:?} scope '{}'", kind, name);
        self.frames.push(ScopeFrame { kind, name: name.to_string(), children: Vec::new(), visited: 0 });
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> Option<&ScopeFrame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut ScopeFrame> {
        self.frames.last_mut()
    }

    /// Appends `node` to the innermost frame.
    pub fn append(&mut self, node: NodeRef) -> Result<(), String> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.children.push(node);
                Ok(())
            }
            None => Err("node emitted outside of any scope".to_string()),
        }
    }

    /// Pops the innermost frame, which must be of `kind`.
    pub fn pop(&mut self, kind: ScopeKind) -> Result<ScopeFrame, String> {
        match self.frames.pop() {
            Some(frame) if frame.kind == kind => {
                log::debug!("exit {:?} scope '{}' ({} children)", kind, frame.name, frame.children.len());
                Ok(frame)
            }
            Some(frame) => {
                let msg = format!("expected to close a {:?} scope, found {:?} '{}'", kind, frame.kind, frame.name);
                self.frames.push(frame);
                Err(msg)
            }
            None => Err(format!("expected to close a {:?} scope, but no scope is open", kind)),
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
