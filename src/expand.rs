//! Multi-channel expansion (§4.3) and the input-binding contract (§4.2) that
//! every concrete UGen constructor in [`crate::ugens`] funnels through.
//!
//! Concrete UGens have no hand-written Rust type per class (§2 "Decorator/
//! declaration machinery" is cosmetic scaffolding, not essential); instead
//! every constructor in `ugens.rs` calls [`construct`] with its port
//! declarations and a keyword-style argument list. `construct` performs
//! width computation, per-clone expansion, input binding, and node
//! registration in one pass.

use std::collections::HashMap;

use crate::builder;
use crate::error::{CompileError, CompileResult};
use crate::node::{InputTag, Node, NodeFlags, PortDecl};
use crate::rate::CalculationRate;
use crate::value::Value;

/// Build one or more nodes of `type_name`, expanding any sequence-valued
/// port into parallel clones, and return the resulting value (a bare
/// `OutputRef` for a single single-output node, else a `Vector`).
pub(crate) fn construct(
    type_name: &'static str,
    rate: CalculationRate,
    special_index: i16,
    output_count: usize,
    flags: NodeFlags,
    ports: &'static [PortDecl],
    args: Vec<(&'static str, Value)>,
) -> CompileResult<Value> {
    let mut by_name: HashMap<&'static str, Value> = HashMap::with_capacity(args.len());
    for (name, value) in args {
        if !ports.iter().any(|p| p.name == name) {
            return Err(CompileError::UnknownPort {
                ugen: type_name.to_string(),
                port: name.to_string(),
            });
        }
        by_name.insert(name, value);
    }

    let width = expansion_width(ports, &by_name);
    let scope = builder::current_scope_id()?;

    if width == 0 {
        let node_id = bind_and_register(type_name, rate, special_index, output_count, flags, ports, &by_name, None)?;
        return Ok(single_clone_value(scope, node_id, output_count));
    }

    let mut clones = Vec::with_capacity(width);
    for i in 0..width {
        let node_id = bind_and_register(type_name, rate, special_index, output_count, flags, ports, &by_name, Some(i))?;
        clones.push(single_clone_value(scope, node_id, output_count));
    }
    Ok(Value::Vector(clones))
}

fn single_clone_value(scope: builder::ScopeId, node_id: crate::node::NodeId, output_count: usize) -> Value {
    if output_count == 1 {
        Value::output_ref(scope, node_id, 0)
    } else {
        Value::Vector(
            (0..output_count)
                .map(|output| Value::output_ref(scope, node_id, output))
                .collect(),
        )
    }
}

/// Max sequence length over expansion-eligible (non-unexpanded) ports, or 0
/// if none are sequences (§4.3 step 2).
fn expansion_width(ports: &[PortDecl], by_name: &HashMap<&'static str, Value>) -> usize {
    let mut width = 0;
    for port in ports {
        if port.unexpanded {
            continue;
        }
        if let Some(Value::Vector(items)) = by_name.get(port.name) {
            width = width.max(items.len());
        }
    }
    width
}

/// Resolve the value each port contributes to clone `index` (or the sole
/// clone, if `index` is `None`), then bind it into a node's flat input list.
fn bind_and_register(
    type_name: &'static str,
    rate: CalculationRate,
    special_index: i16,
    output_count: usize,
    flags: NodeFlags,
    ports: &'static [PortDecl],
    by_name: &HashMap<&'static str, Value>,
    index: Option<usize>,
) -> CompileResult<crate::node::NodeId> {
    let mut node = Node::new(type_name, rate);
    node.special_index = special_index;
    node.output_count = output_count;
    node.flags = flags;

    for (port_index, port) in ports.iter().enumerate() {
        let Some(value) = by_name.get(port.name) else {
            continue;
        };
        let clone_value = match index {
            None => value.clone(),
            Some(i) => per_clone_value(port, value, i),
        };
        bind_port(&mut node, port_index, port, type_name, clone_value)?;
    }

    builder::register_node(node)
}

/// One clone's contribution from a port's bound value (§4.3 step 4).
fn per_clone_value(port: &PortDecl, value: &Value, index: usize) -> Value {
    if port.unexpanded {
        // Passed through unchanged, unless the outer sequence is itself a
        // sequence of sequences, in which case index and recurse once.
        if let Value::Vector(items) = value {
            if items.iter().any(|item| matches!(item, Value::Vector(_))) {
                return items[index % items.len()].clone();
            }
        }
        value.clone()
    } else {
        match value {
            Value::Vector(items) => items[index % items.len()].clone(),
            other => other.clone(),
        }
    }
}

/// Append `value` to `node`'s flat input list for `port`, validating the
/// unexpanded contract and tagging each element (§4.2 "Input binding").
fn bind_port(
    node: &mut Node,
    port_index: usize,
    port: &PortDecl,
    type_name: &str,
    value: Value,
) -> CompileResult<()> {
    match value {
        Value::Vector(items) => {
            if !port.unexpanded {
                return Err(CompileError::SequenceOnScalarPort {
                    ugen: type_name.to_string(),
                    port: port.name.to_string(),
                });
            }
            for (index_in_port, item) in items.into_iter().enumerate() {
                node.inputs.push(item);
                node.input_tags.push(InputTag {
                    port_index,
                    index_in_port,
                });
            }
        }
        scalar => {
            node.inputs.push(scalar);
            node.input_tags.push(InputTag {
                port_index,
                index_in_port: 0,
            });
        }
    }
    Ok(())
}
