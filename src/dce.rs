//! Dead-code elimination (§4.8): drop pure nodes with no descendants,
//! cascading to their antecedents, over an already-linearized graph.

use crate::node::{Node, NodeId};
use crate::value::Value;

/// Remove every pure, descendant-free node from a linearized graph,
/// renumbering the survivors and rewriting their `OutputRef`s. Impure or
/// output-sink nodes are always kept.
pub(crate) fn eliminate(nodes: Vec<Node>) -> Vec<Node> {
    let n = nodes.len();
    let mut descendant_count = vec![0usize; n];
    for node in &nodes {
        for referenced in node.referenced_nodes() {
            descendant_count[referenced.index()] += 1;
        }
    }

    let mut live = vec![true; n];
    // Process in reverse insertion order so that eliminating a node promptly
    // decrements its antecedents' descendant counts before they're visited.
    for i in (0..n).rev() {
        if live[i] && nodes[i].flags.pure && descendant_count[i] == 0 {
            live[i] = false;
            for referenced in nodes[i].referenced_nodes() {
                if descendant_count[referenced.index()] > 0 {
                    descendant_count[referenced.index()] -= 1;
                }
            }
        }
    }

    let mut old_to_new = vec![0usize; n];
    let mut next_index = 0usize;
    for i in 0..n {
        if live[i] {
            old_to_new[i] = next_index;
            next_index += 1;
        }
    }

    nodes
        .into_iter()
        .enumerate()
        .filter(|(i, _)| live[*i])
        .map(|(_, node)| rewire(node, &old_to_new))
        .collect()
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
    use crate::builder;
    use crate::node::NodeFlags;
    use crate::rate::CalculationRate;

    #[test]
    fn unused_pure_node_is_dropped() {
        let dead = Node::new("SinOsc", CalculationRate::Audio);
        let mut alive = Node::new("SinOsc", CalculationRate::Audio);
        alive.flags.pure = true;
        let nodes = vec![dead, alive];
        let result = eliminate(nodes);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn referenced_pure_node_is_kept() {
        let scope = builder::next_scope_id();
        let source = Node::new("SinOsc", CalculationRate::Audio);
        let mut sink = Node::new("Out", CalculationRate::Audio);
        sink.flags.output_sink = true;
        sink.inputs
            .push(Value::output_ref(scope, NodeId(0), 0));
        let nodes = vec![source, sink];
        let result = eliminate(nodes);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn impure_node_with_no_descendants_is_kept() {
        let mut node = Node::new("SendTrig", CalculationRate::Control);
        node.flags = NodeFlags {
            output_sink: true,
            ..NodeFlags::default()
        };
        let nodes = vec![node];
        let result = eliminate(nodes);
        assert_eq!(result.len(), 1);
    }
}
