//! Scratch-capacity pass (§4.6): declare one capacity node ahead of the
//! first scratch-requesting node, and wire every scratch-requesting node's
//! trailing input to reference it.

use crate::node::{Node, NodeData, NodeFlags, NodeId};
use crate::rate::CalculationRate;
use crate::value::Value;

/// Drop any stale capacity node, count scratch-requesting nodes, and (if
/// any exist) insert a freshly built one immediately before the first of
/// them, with each scratch node's trailing input wired to it.
pub(crate) fn insert_capacity_node(nodes: Vec<Node>) -> Vec<Node> {
    let nodes: Vec<Node> = nodes.into_iter().filter(|n| !n.is_scratch_capacity()).collect();

    let count = nodes.iter().filter(|n| n.flags.needs_scratch).count();
    if count == 0 {
        return nodes;
    }

    let first_scratch_index = nodes
        .iter()
        .position(|n| n.flags.needs_scratch)
        .expect("count > 0 implies at least one scratch-requesting node");

    let mut capacity_node = Node::new("ScratchCapacity", CalculationRate::Scalar);
    capacity_node.output_count = 1;
    capacity_node.flags = NodeFlags {
        width_first: true,
        pure: true,
        ..NodeFlags::default()
    };
    capacity_node.inputs = vec![Value::Constant(count as f32)];
    capacity_node.data = NodeData::ScratchCapacity { count };

    let capacity_index = first_scratch_index;

    // Every node at or after `first_scratch_index` shifts down by one once
    // the capacity node is spliced in ahead of it; reindex every existing
    // `OutputRef` before appending any new ones, the same way `dce.rs`
    // rewires across a removal.
    let old_to_new: Vec<usize> = (0..nodes.len())
        .map(|i| if i < first_scratch_index { i } else { i + 1 })
        .collect();

    let mut result = Vec::with_capacity(nodes.len() + 1);
    result.extend(nodes.into_iter().map(|node| rewire(node, &old_to_new)));
    result.insert(capacity_index, capacity_node);

    let scope = crate::builder::next_scope_id();
    for node in result.iter_mut().skip(capacity_index + 1) {
        if node.flags.needs_scratch {
            node.inputs.push(Value::output_ref(scope, NodeId(capacity_index), 0));
        }
    }

    result
}

fn rewire(mut node: Node, old_to_new: &[usize]) -> Node {
    for input in &mut node.inputs {
        rewire_value(input, old_to_new);
    }
    node
}

fn rewire_value(value: &mut Value, old_to_new: &[usize]) {
    match value {
        Value::OutputRef { node, .. } => {
            *node = NodeId(old_to_new[node.index()]);
        }
        Value::Vector(items) => {
            for item in items {
                rewire_value(item, old_to_new);
            }
        }
        Value::Constant(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_node() -> Node {
        let mut node = Node::new("FFT", CalculationRate::Control);
        node.flags.needs_scratch = true;
        node
    }

    #[test]
    fn no_scratch_nodes_is_a_no_op() {
        let nodes = vec![Node::new("SinOsc", CalculationRate::Audio)];
        let result = insert_capacity_node(nodes);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].type_name, "SinOsc");
    }

    #[test]
    fn capacity_node_precedes_scratch_nodes_with_correct_count() {
        // S6: two scratch-allocating nodes.
        let nodes = vec![
            Node::new("SinOsc", CalculationRate::Audio),
            scratch_node(),
            scratch_node(),
        ];
        let result = insert_capacity_node(nodes);
        assert_eq!(result.len(), 4);
        assert!(result[1].is_scratch_capacity());
        match &result[1].data {
            NodeData::ScratchCapacity { count } => assert_eq!(*count, 2),
            _ => panic!("expected scratch capacity node"),
        }
        for node in &result[2..] {
            assert!(node.inputs.len() >= 1);
        }
    }
}
