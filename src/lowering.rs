//! Parameter lowering (§4.5): group named `Parameter` nodes by rate into
//! aggregate-control nodes, then rewrite every remaining node's inputs to
//! reference the aggregate's outputs instead.

use std::collections::HashMap;

use crate::node::{ControlInfo, ControlKind, Node, NodeData};
use crate::rate::{CalculationRate, ParameterRate};
use crate::value::Value;

/// `(original parameter node index, output index within it)` -> aggregate
/// output index, used to rewrite every remaining `OutputRef`.
type RewriteMap = HashMap<(usize, usize), (usize, usize)>;

/// Output of lowering: the rewritten node list, the concatenated control
/// defaults (§4.10 "total_control_output_count... default values"), and the
/// parameter name -> starting-control-index index, in aggregate-control
/// order.
pub(crate) type LoweringResult = (Vec<Node>, Vec<f32>, Vec<(String, u32)>);

/// Replace every `Parameter` node in `nodes` with prepended aggregate
/// control nodes, rewiring all downstream references. Returns the new node
/// list with no `Parameter` nodes remaining (invariant 4, §3).
pub(crate) fn lower(nodes: Vec<Node>) -> LoweringResult {
    let mut parameter_indices: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_parameter())
        .map(|(i, _)| i)
        .collect();
    parameter_indices.sort_by_key(|&i| parameter_name(&nodes[i]));

    if parameter_indices.is_empty() {
        return (nodes, Vec::new(), Vec::new());
    }

    let mut by_rate: HashMap<ParameterRate, Vec<usize>> = HashMap::new();
    for &i in &parameter_indices {
        let rate = parameter_rate(&nodes[i]);
        by_rate.entry(rate).or_default().push(i);
    }
    for group in by_rate.values_mut() {
        group.sort_by_key(|&i| parameter_name(&nodes[i]).to_string());
    }

    let mut aggregates: Vec<Node> = Vec::new();
    let mut rewrite: RewriteMap = HashMap::new();
    let mut running_control_index: u32 = 0;
    let mut control_defaults: Vec<f32> = Vec::new();
    let mut parameter_index: Vec<(String, u32)> = Vec::new();

    for &rate in ParameterRate::LOWERING_ORDER.iter() {
        let Some(indices) = by_rate.get(&rate) else {
            continue;
        };
        if indices.is_empty() {
            continue;
        }
        let has_lag = indices.iter().any(|&i| parameter_lag(&nodes[i]) != 0.0);
        let kind = match rate {
            ParameterRate::Scalar => ControlKind::Plain,
            ParameterRate::Trigger => ControlKind::Trigger,
            ParameterRate::Audio => ControlKind::Audio,
            ParameterRate::Control => {
                if has_lag {
                    ControlKind::Lag
                } else {
                    ControlKind::Plain
                }
            }
        };

        let starting_control_index = running_control_index;
        let mut defaults: Vec<f32> = Vec::new();
        let mut lags: Vec<f32> = Vec::new();
        let mut parameter_names = Vec::new();
        let mut aggregate_output = 0usize;

        for &param_index in indices {
            let info = match &nodes[param_index].data {
                NodeData::Parameter(info) => info,
                _ => unreachable!("by_rate only contains parameter node indices"),
            };
            parameter_names.push(info.name.clone());
            // Each named parameter's absolute control index is the
            // aggregate's starting index plus how many outputs precede it
            // within this aggregate.
            parameter_index.push((info.name.clone(), starting_control_index + aggregate_output as u32));
            for (local_output, &default) in info.defaults.iter().enumerate() {
                defaults.push(default);
                lags.push(info.lag);
                rewrite.insert(
                    (param_index, local_output),
                    (aggregates.len(), aggregate_output),
                );
                aggregate_output += 1;
            }
        }

        running_control_index += defaults.len() as u32;
        control_defaults.extend_from_slice(&defaults);

        let control_calc_rate = match rate {
            ParameterRate::Scalar => CalculationRate::Scalar,
            ParameterRate::Trigger | ParameterRate::Control => CalculationRate::Control,
            ParameterRate::Audio => CalculationRate::Audio,
        };
        let mut control_node = Node::new(control_type_name(kind), control_calc_rate);
        control_node.output_count = defaults.len();
        // Aggregate control nodes are never dead-code-eliminated: they are
        // the sole addressable identity of a named external parameter, even
        // if nothing downstream currently references an output.
        control_node.flags.pure = false;
        if kind == ControlKind::Lag {
            control_node.inputs = lags.into_iter().map(Value::Constant).collect();
        }
        control_node.data = NodeData::AggregateControl(ControlInfo {
            kind,
            parameter_names,
            starting_control_index,
        });
        aggregates.push(control_node);
    }

    let aggregate_count = aggregates.len();

    // Parameters are always registered first (`add_parameter` -> `push_node`
    // runs before any constructor can reference them), so every remaining
    // node sits somewhere after all of them in the original list. Dropping
    // the parameter nodes and prepending the aggregates shifts a surviving
    // node from `original_index` to `aggregate_count + (surviving nodes
    // before it)` — not a flat `+ aggregate_count` offset, since not every
    // node before it in the original list survives. Build the old->new map
    // explicitly over the surviving nodes before rewriting any `OutputRef`.
    let mut index_map: HashMap<usize, usize> = HashMap::with_capacity(nodes.len());
    let mut next_index = aggregate_count;
    for (original_index, node) in nodes.iter().enumerate() {
        if node.is_parameter() {
            continue;
        }
        index_map.insert(original_index, next_index);
        next_index += 1;
    }

    let mut rewritten: Vec<Node> = Vec::with_capacity(aggregates.len() + nodes.len() - parameter_indices.len());
    rewritten.extend(aggregates);

    for node in nodes.into_iter() {
        if node.is_parameter() {
            continue;
        }
        rewritten.push(rewrite_node(node, &rewrite, &index_map));
    }

    (rewritten, control_defaults, parameter_index)
}

fn parameter_name(node: &Node) -> &str {
    match &node.data {
        NodeData::Parameter(info) => &info.name,
        _ => "",
    }
}

fn parameter_rate(node: &Node) -> ParameterRate {
    match &node.data {
        NodeData::Parameter(info) => info.parameter_rate,
        _ => ParameterRate::Control,
    }
}

fn parameter_lag(node: &Node) -> f32 {
    match &node.data {
        NodeData::Parameter(info) => info.lag,
        _ => 0.0,
    }
}

fn control_type_name(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Plain => "Control",
        ControlKind::Lag => "LagControl",
        ControlKind::Trigger => "TrigControl",
        ControlKind::Audio => "AudioControl",
    }
}

/// Rewrite one remaining node's `Parameter` output references through
/// `rewrite`, and every other `OutputRef` through the surviving-node
/// old->new `index_map`.
fn rewrite_node(mut node: Node, rewrite: &RewriteMap, index_map: &HashMap<usize, usize>) -> Node {
    for input in &mut node.inputs {
        rewrite_value(input, rewrite, index_map);
    }
    node
}

fn rewrite_value(value: &mut Value, rewrite: &RewriteMap, index_map: &HashMap<usize, usize>) {
    match value {
        Value::OutputRef { node, output, .. } => {
            if let Some(&(aggregate_index, aggregate_output)) = rewrite.get(&(node.index(), *output)) {
                *node = crate::node::NodeId(aggregate_index);
                *output = aggregate_output;
            } else {
                // Not a parameter reference: remap through the surviving-node
                // positions, which already account for both the removed
                // parameters before it and the prepended aggregates.
                *node = crate::node::NodeId(index_map[&node.index()]);
            }
        }
        Value::Vector(items) => {
            for item in items {
                rewrite_value(item, rewrite, index_map);
            }
        }
        Value::Constant(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ParameterInfo;

    fn parameter(name: &str, default: f32, rate: ParameterRate, lag: f32) -> Node {
        let mut node = Node::new("Control", CalculationRate::Control);
        node.output_count = 1;
        node.data = NodeData::Parameter(ParameterInfo {
            name: name.to_string(),
            defaults: vec![default],
            parameter_rate: rate,
            lag,
        });
        node
    }

    #[test]
    fn no_parameters_is_a_no_op() {
        let nodes = vec![Node::new("SinOsc", CalculationRate::Audio)];
        let (result, defaults, index) = lower(nodes);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].type_name, "SinOsc");
        assert!(defaults.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn mixed_rate_lowering_produces_scalar_then_lag_control() {
        // S5: freq (control, 440), amp (control, 0.3, lag 0.1), bus (scalar, 0)
        let nodes = vec![
            parameter("freq", 440.0, ParameterRate::Control, 0.0),
            parameter("amp", 0.3, ParameterRate::Control, 0.1),
            parameter("bus", 0.0, ParameterRate::Scalar, 0.0),
        ];
        let (result, defaults, index) = lower(nodes);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].type_name, "Control");
        assert_eq!(result[1].type_name, "LagControl");
        assert_eq!(defaults, vec![0.0, 0.3, 440.0]);
        assert_eq!(
            index,
            vec![
                ("bus".to_string(), 0),
                ("amp".to_string(), 1),
                ("freq".to_string(), 2),
            ]
        );
        match &result[0].data {
            NodeData::AggregateControl(info) => {
                assert_eq!(info.parameter_names, vec!["bus".to_string()]);
                assert_eq!(info.starting_control_index, 0);
            }
            _ => panic!("expected aggregate control"),
        }
        match &result[1].data {
            NodeData::AggregateControl(info) => {
                assert_eq!(info.parameter_names, vec!["amp".to_string(), "freq".to_string()]);
                assert_eq!(info.starting_control_index, 1);
            }
            _ => panic!("expected aggregate control"),
        }
    }

    #[test]
    fn no_parameter_node_survives_lowering() {
        let nodes = vec![
            parameter("freq", 440.0, ParameterRate::Control, 0.0),
            Node::new("SinOsc", CalculationRate::Audio),
        ];
        let (result, _, _) = lower(nodes);
        assert!(result.iter().all(|n| !n.is_parameter()));
    }
}
