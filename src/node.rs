//! Node model (§3 "Node", "Parameter", "Aggregate-control node").
//!
//! A [`Node`] is an ordered sequence of input [`Value`]s, a calculation rate,
//! a small special-index, an output arity, and a handful of scheduling flags.
//! Nodes live in a per-builder arena and are addressed by [`NodeId`], a plain
//! index rather than a lifetime-carrying reference (see DESIGN.md — this
//! sidesteps self-referential ownership entirely).

use crate::rate::{CalculationRate, ParameterRate};
use crate::value::Value;

/// A stable index into a builder's (or definition's) node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declared input port: a name plus whether it accepts a flat sequence
/// (`unexpanded`) or only a single scalar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDecl {
    pub name: &'static str,
    pub unexpanded: bool,
}

impl PortDecl {
    pub const fn scalar(name: &'static str) -> PortDecl {
        PortDecl {
            name,
            unexpanded: false,
        }
    }

    pub const fn unexpanded(name: &'static str) -> PortDecl {
        PortDecl {
            name,
            unexpanded: true,
        }
    }
}

/// Per-input bookkeeping: which declared port this input element came from,
/// and its position within that port (0 for scalar ports; 0..len for
/// unexpanded ports). This is the "auxiliary per-input table" of §4.2 that
/// lets serialization reconstruct port grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTag {
    pub port_index: usize,
    pub index_in_port: usize,
}

/// Scheduling and eligibility flags (§3 "Node").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags {
    /// No side effects / hidden state — eligible for dead-code elimination.
    pub pure: bool,
    /// Must be linearized before all later-inserted non-width-first nodes.
    pub width_first: bool,
    /// Participates in the engine's lifecycle signaling.
    pub done_flag: bool,
    /// Zero outputs; only ever a root of the dataflow.
    pub output_sink: bool,
    /// Permits an edge to a later-inserted node (feedback-bus read).
    pub input_feedback_allowed: bool,
    /// Requests a scratch buffer; the scratch-capacity pass (§4.6) appends
    /// an `OutputRef` to the capacity node as this node's last input.
    pub needs_scratch: bool,
}

/// Extra metadata distinguishing the specialized node roles from plain
/// UGens. Plain UGens (including operator nodes) carry [`NodeData::Plain`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Plain,
    /// One named external input, pre-lowering (§3 "Parameter").
    Parameter(ParameterInfo),
    /// One aggregate per used parameter rate, emitted by lowering (§4.5).
    AggregateControl(ControlInfo),
    /// The per-graph scratch-buffer capacity declaration (§4.6).
    ScratchCapacity { count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub defaults: Vec<f32>,
    pub parameter_rate: ParameterRate,
    pub lag: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Plain,
    Lag,
    Trigger,
    Audio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlInfo {
    pub kind: ControlKind,
    /// Parameters represented by this aggregate, in alphabetical name order.
    pub parameter_names: Vec<String>,
    pub starting_control_index: u32,
}

/// One node in the graph: a UGen, an operator node, a `Parameter`, or an
/// aggregate-control node.
///
/// No `PartialEq`: it would have to recurse into `Value`, which
/// deliberately has none (see `value.rs`). Tests compare specific fields
/// instead of whole nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub type_name: String,
    pub calculation_rate: CalculationRate,
    pub special_index: i16,
    pub inputs: Vec<Value>,
    pub input_tags: Vec<InputTag>,
    pub output_count: usize,
    pub flags: NodeFlags,
    pub data: NodeData,
}

impl Node {
    pub fn new(type_name: impl Into<String>, calculation_rate: CalculationRate) -> Node {
        Node {
            type_name: type_name.into(),
            calculation_rate,
            special_index: 0,
            inputs: Vec::new(),
            input_tags: Vec::new(),
            output_count: 1,
            flags: NodeFlags::default(),
            data: NodeData::Plain,
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.data, NodeData::Parameter(_))
    }

    pub fn is_scratch_capacity(&self) -> bool {
        matches!(self.data, NodeData::ScratchCapacity { .. })
    }

    /// Every `OutputRef` this node's inputs reference, in input order.
    pub fn referenced_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inputs.iter().filter_map(|value| match value {
            Value::OutputRef { node, .. } => Some(*node),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_decl_scalar_is_not_unexpanded() {
        let port = PortDecl::scalar("freq");
        assert!(!port.unexpanded);
    }

    #[test]
    fn node_defaults_to_single_output_plain_role() {
        let node = Node::new("SinOsc", CalculationRate::Audio);
        assert_eq!(node.output_count, 1);
        assert_eq!(node.data, NodeData::Plain);
        assert!(!node.is_parameter());
    }

    #[test]
    fn referenced_nodes_skips_constants() {
        let scope = crate::builder::next_scope_id();
        let mut node = Node::new("BinaryOpUGen", CalculationRate::Audio);
        node.inputs.push(Value::Constant(1.0));
        node.inputs.push(Value::output_ref(scope, NodeId(2), 0));
        let refs: Vec<_> = node.referenced_nodes().collect();
        assert_eq!(refs, vec![NodeId(2)]);
    }
}
