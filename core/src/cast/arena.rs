//! file: core/src/cast/arena.rs
//! description: in-memory `CAstBuilder` and the finished graph it produces.
//!
//! `NodeArena` appends nodes to a flat vector. A child must already exist
//! when its parent is made, so every child index is lower than its parent's
//! and the arena is acyclic by construction. `CAstGraph` is the serializable
//! snapshot handed to analysis engines.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::builder::CAstBuilder;
use super::err::BridgeError;
use super::node::{CAstKind, CAstNode, ConstValue, NodeRef};
use crate::location::Location;

const ISSUER: &str = "sil2cast.cast.arena";

#[derive(Debug, Default, Clone)]
pub struct NodeArena {
    nodes: Vec<CAstNode>,
    positions: BTreeMap<NodeRef, Location>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node: NodeRef) -> Option<&CAstNode> {
        self.nodes.get(node.index())
    }

    pub fn position(&self, node: NodeRef) -> Option<&Location> {
        self.positions.get(&node)
    }

    /// Consumes the arena into a graph rooted at `root`.
    pub fn into_graph(self, module: &str, session: Uuid, root: NodeRef) -> Result<CAstGraph, BridgeError> {
        if root.index() >= self.nodes.len() {
            return Err(BridgeError::new(ISSUER, format!("root {} is not in the arena", root)));
        }
        Ok(CAstGraph {
            module: module.to_string(),
            session,
            nodes: self.nodes,
            root,
            positions: self.positions,
        })
    }

    fn push(&mut self, node: CAstNode) -> Result<NodeRef, BridgeError> {
        for child in &node.children {
            if child.index() >= self.nodes.len() {
                return Err(BridgeError::new(
                    ISSUER,
                    format!("{} node refers to unknown child {}", node.kind, child),
                ));
            }
        }
        let id = u32::try_from(self.nodes.len())
            .map_err(|_| BridgeError::new(ISSUER, "node arena is full"))?;
        self.nodes.push(node);
        Ok(NodeRef(id))
    }
}

impl CAstBuilder for NodeArena {
    fn make_constant(&mut self, value: ConstValue) -> Result<NodeRef, BridgeError> {
        self.push(CAstNode { kind: CAstKind::Constant, name: None, value: Some(value), children: Vec::new() })
    }

    fn make_node(&mut self, kind: CAstKind, children: Vec<NodeRef>) -> Result<NodeRef, BridgeError> {
        self.push(CAstNode { kind, name: None, value: None, children })
    }

    fn make_named_node(
        &mut self,
        kind: CAstKind,
        name: &str,
        children: Vec<NodeRef>,
    ) -> Result<NodeRef, BridgeError> {
        self.push(CAstNode { kind, name: Some(name.to_string()), value: None, children })
    }

    fn record_position(&mut self, node: NodeRef, location: &Location) -> Result<(), BridgeError> {
        if node.index() >= self.nodes.len() {
            return Err(BridgeError::new(ISSUER, format!("position for unknown node {}", node)));
        }
        self.positions.insert(node, location.clone());
        Ok(())
    }
}

/// A lowered module, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CAstGraph {
    pub module: String,
    pub session: Uuid,
    pub nodes: Vec<CAstNode>,
    pub root: NodeRef,
    #[serde(default)]
    pub positions: BTreeMap<NodeRef, Location>,
}

impl CAstGraph {
    pub fn node(&self, node: NodeRef) -> Option<&CAstNode> {
        self.nodes.get(node.index())
    }

    pub fn root_node(&self) -> Option<&CAstNode> {
        self.node(self.root)
    }

    /// Children of `node`, resolved. Unknown refs are skipped.
    pub fn children(&self, node: NodeRef) -> Vec<&CAstNode> {
        self.node(node)
            .map(|n| n.children.iter().filter_map(|c| self.node(*c)).collect())
            .unwrap_or_default()
    }

    pub fn position(&self, node: NodeRef) -> Option<&Location> {
        self.positions.get(&node)
    }

    pub fn count(&self, kind: CAstKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// The first node of `kind` named `name`.
    pub fn find_named(&self, kind: CAstKind, name: &str) -> Option<NodeRef> {
        self.nodes
            .iter()
            .position(|n| n.kind == kind && n.name.as_deref() == Some(name))
            .map(|i| NodeRef(i as u32))
    }

    /// Checks the arena invariants after deserialization: every child and
    /// position refers to an earlier node and the root exists.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.root.index() >= self.nodes.len() {
            return Err(BridgeError::new(ISSUER, format!("root {} is out of range", self.root)));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(bad) = node.children.iter().find(|c| c.index() >= i) {
                return Err(BridgeError::new(
                    ISSUER,
                    format!("node #{} has forward or self reference {}", i, bad),
                ));
            }
        }
        if let Some((bad, _)) = self.positions.iter().find(|(n, _)| n.index() >= self.nodes.len()) {
            return Err(BridgeError::new(ISSUER, format!("position for unknown node {}", bad)));
        }
        Ok(())
    }

    /// Nodes reachable from the root that more than one parent refers to.
    fn shared_nodes(&self) -> HashSet<NodeRef> {
        let mut parents: HashMap<NodeRef, usize> = HashMap::new();
        let mut seen = HashSet::from([self.root]);
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let Some(n) = self.node(node) else { continue };
            for child in &n.children {
                *parents.entry(*child).or_default() += 1;
                if seen.insert(*child) {
                    stack.push(*child);
                }
            }
        }
        parents.into_iter().filter(|(_, count)| *count > 1).map(|(node, _)| node).collect()
    }

    /// A shared node is printed in full the first time, tagged with its id;
    /// later occurrences print `-> #id`.
    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: NodeRef,
        depth: usize,
        shared: &HashSet<NodeRef>,
        shown: &mut HashSet<NodeRef>,
    ) -> fmt::Result {
        let Some(n) = self.node(node) else {
            return writeln!(f, "{:indent$}<missing {}>", "", node, indent = depth * 2);
        };
        let is_shared = shared.contains(&node);
        if is_shared && !shown.insert(node) {
            return writeln!(f, "{:indent$}-> {}", "", node, indent = depth * 2);
        }
        write!(f, "{:indent$}{}", "", n.kind, indent = depth * 2)?;
        if let Some(name) = &n.name {
            write!(f, " {}", name)?;
        }
        if let Some(value) = &n.value {
            write!(f, " = {}", value)?;
        }
        if is_shared {
            write!(f, " {}", node)?;
        }
        writeln!(f)?;
        for child in &n.children {
            self.fmt_node(f, *child, depth + 1, shared, shown)?;
        }
        Ok(())
    }
}

impl fmt::Display for CAstGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared_nodes();
        self.fmt_node(f, self.root, 0, &shared, &mut HashSet::new())
    }
}
