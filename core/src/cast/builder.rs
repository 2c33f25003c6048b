use super::err::BridgeError;
use super::node::{CAstKind, ConstValue, NodeRef};
use crate::location::Location;

/// Node-construction surface of an analysis engine.
///
/// Every call may fail; a failure aborts the module being lowered.
pub trait CAstBuilder {
    fn make_constant(&mut self, value: ConstValue) -> Result<NodeRef, BridgeError>;

    fn make_node(&mut self, kind: CAstKind, children: Vec<NodeRef>) -> Result<NodeRef, BridgeError>;

    fn make_named_node(
        &mut self,
        kind: CAstKind,
        name: &str,
        children: Vec<NodeRef>,
    ) -> Result<NodeRef, BridgeError>;

    fn record_position(&mut self, node: NodeRef, location: &Location) -> Result<(), BridgeError>;
}
