//! Topological linearization (§4.7): Kahn's algorithm extended with
//! width-first ordering constraints and an insertion-order tie-break.
//!
//! Grounded on the teacher's `graph.rs::topological_sort` (adjacency map +
//! worklist + descendant removal), generalized here with the width-first
//! antecedent rule and reverse-insertion-order worklist seeding required by
//! spec.md §4.7.

use std::collections::VecDeque;

use crate::error::{CompileError, CompileResult};
use crate::node::{Node, NodeId};

/// Linearize `nodes` (already in builder insertion order) into a schedule
/// satisfying: every `OutputRef` points strictly earlier, and every
/// width-first node precedes every later-inserted non-width-first node.
/// Returns the permutation as a new node list plus the insertion-index ->
/// linearized-index map (needed to rewrite `OutputRef`s afterward).
pub(crate) fn linearize(nodes: Vec<Node>) -> CompileResult<(Vec<Node>, Vec<usize>)> {
    let n = nodes.len();
    let mut antecedents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut descendants: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, node) in nodes.iter().enumerate() {
        for referenced in node.referenced_nodes() {
            antecedents[i].push(referenced.index());
        }
    }
    let width_first_before: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..i)
                .filter(|&j| nodes[j].flags.width_first)
                .collect::<Vec<_>>()
        })
        .collect();
    for (i, node) in nodes.iter().enumerate() {
        if !node.flags.width_first {
            antecedents[i].extend(width_first_before[i].iter().copied());
        }
    }
    for i in 0..n {
        antecedents[i].sort_unstable();
        antecedents[i].dedup();
        for &a in &antecedents[i] {
            descendants[a].push(i);
        }
    }
    for d in descendants.iter_mut() {
        d.sort_unstable();
        d.dedup();
    }

    let mut remaining_antecedent_count: Vec<usize> = antecedents.iter().map(|a| a.len()).collect();

    let mut worklist: VecDeque<usize> = VecDeque::new();
    for i in (0..n).rev() {
        if remaining_antecedent_count[i] == 0 {
            worklist.push_front(i);
        }
    }

    let mut order: Vec<usize> = Vec::with_capacity(n);

    // edges_remaining[i] tracks, per node, how many antecedents still haven't
    // been emitted.
    let mut edges_remaining = remaining_antecedent_count.clone();

    while let Some(node_index) = worklist.pop_front() {
        order.push(node_index);
        for &d in &descendants[node_index] {
            edges_remaining[d] -= 1;
            if edges_remaining[d] == 0 {
                worklist.push_back(d);
            }
        }
    }

    if order.len() != n {
        return Err(CompileError::CyclicGraph {
            remaining: n - order.len(),
        });
    }

    let mut original_to_linearized = vec![0usize; n];
    for (linearized_index, &original_index) in order.iter().enumerate() {
        original_to_linearized[original_index] = linearized_index;
    }

    let linearized_nodes: Vec<Node> = order
        .iter()
        .map(|&original_index| rewire(&nodes[original_index], &original_to_linearized))
        .collect();

    Ok((linearized_nodes, original_to_linearized))
}

fn rewire(node: &Node, original_to_linearized: &[usize]) -> Node {
    let mut node = node.clone();
    for input in &mut node.inputs {
        rewire_value(input, original_to_linearized);
    }
    node
}

fn rewire_value(value: &mut crate::value::Value, original_to_linearized: &[usize]) {
    use crate::value::Value;
    match value {
        Value::OutputRef { node, .. } => {
            *node = NodeId(original_to_linearized[node.index()]);
        }
        Value::Vector(items) => {
            for item in items {
                rewire_value(item, original_to_linearized);
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
    use crate::value::Value;

    fn sink_after(nodes: &mut Vec<Node>, source: usize) {
        let scope = builder::next_scope_id();
        let mut sink = Node::new("Out", CalculationRate::Audio);
        sink.flags.output_sink = true;
        sink.inputs.push(Value::output_ref(scope, NodeId(source), 0));
        nodes.push(sink);
    }

    #[test]
    fn simple_chain_stays_in_order() {
        let mut nodes = vec![Node::new("SinOsc", CalculationRate::Audio)];
        sink_after(&mut nodes, 0);
        let (linear, _) = linearize(nodes).unwrap();
        assert_eq!(linear[0].type_name, "SinOsc");
        assert_eq!(linear[1].type_name, "Out");
    }

    #[test]
    fn width_first_node_precedes_later_non_width_first_nodes() {
        let mut capacity = Node::new("ScratchCapacity", CalculationRate::Scalar);
        capacity.flags = NodeFlags {
            width_first: true,
            pure: true,
            ..NodeFlags::default()
        };
        let unrelated = Node::new("SinOsc", CalculationRate::Audio);
        // The width-first node must be inserted first for the invariant
        // ("precedes every non-width-first node inserted after it") to
        // constrain this fixture at all.
        let nodes = vec![capacity, unrelated];
        let (linear, _) = linearize(nodes).unwrap();
        assert_eq!(linear[0].type_name, "ScratchCapacity");
        assert_eq!(linear[1].type_name, "SinOsc");
    }

    #[test]
    fn every_output_ref_points_strictly_earlier() {
        let mut nodes = vec![Node::new("SinOsc", CalculationRate::Audio)];
        sink_after(&mut nodes, 0);
        let (linear, _) = linearize(nodes).unwrap();
        for (position, node) in linear.iter().enumerate() {
            for referenced in node.referenced_nodes() {
                assert!(referenced.index() < position);
            }
        }
    }
}
