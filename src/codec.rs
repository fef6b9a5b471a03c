//! The `SCgf` binary codec (§4.11): big-endian container, constant pool,
//! control defaults, parameter name index, and per-node input specs.

use crate::error::{CompileError, CompileResult};
use crate::node::Node;
use crate::value::Value;

const MAGIC: &[u8; 4] = b"SCgf";
const VERSION: u32 = 2;
const CONSTANT_SENTINEL: u32 = 0xFFFF_FFFF;

pub(crate) fn pstring(name: &str) -> CompileResult<Vec<u8>> {
    let bytes = name.as_bytes();
    if bytes.len() > 255 {
        return Err(CompileError::NameTooLong {
            name: name.to_string(),
            len: bytes.len(),
        });
    }
    let mut out = Vec::with_capacity(1 + bytes.len());
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    Ok(out)
}

/// The graph body of one definition, excluding the leading `pstring` name
/// (§4.11 "Graph body").
pub(crate) fn graph_body(
    nodes: &[Node],
    constants: &[f32],
    control_defaults: &[f32],
    parameter_names: &[(String, u32)],
) -> CompileResult<Vec<u8>> {
    let mut out = Vec::new();

    out.extend_from_slice(&(constants.len() as u32).to_be_bytes());
    for c in constants {
        out.extend_from_slice(&c.to_be_bytes());
    }

    out.extend_from_slice(&(control_defaults.len() as u32).to_be_bytes());
    for d in control_defaults {
        out.extend_from_slice(&d.to_be_bytes());
    }

    out.extend_from_slice(&(parameter_names.len() as u32).to_be_bytes());
    for (name, starting_index) in parameter_names {
        out.extend_from_slice(&pstring(name)?);
        out.extend_from_slice(&starting_index.to_be_bytes());
    }

    out.extend_from_slice(&(nodes.len() as u32).to_be_bytes());
    for node in nodes {
        out.extend_from_slice(&node_record(node, constants)?);
    }

    out.extend_from_slice(&0u16.to_be_bytes()); // variant_count, unused

    Ok(out)
}

fn node_record(node: &Node, constants: &[f32]) -> CompileResult<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&pstring(&node.type_name)?);
    out.push(node.calculation_rate.to_byte());
    out.extend_from_slice(&(node.inputs.len() as u32).to_be_bytes());
    out.extend_from_slice(&(node.output_count as u32).to_be_bytes());
    out.extend_from_slice(&(node.special_index as u16).to_be_bytes());
    for input in &node.inputs {
        out.extend_from_slice(&input_spec(input, constants));
    }
    for _ in 0..node.output_count {
        out.push(node.calculation_rate.to_byte());
    }
    Ok(out)
}

fn input_spec(value: &Value, constants: &[f32]) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    match value {
        Value::Constant(c) => {
            let index = constants
                .iter()
                .position(|x| x == c)
                .expect("constant pool was built from the same node list being encoded") as u32;
            bytes[..4].copy_from_slice(&CONSTANT_SENTINEL.to_be_bytes());
            bytes[4..].copy_from_slice(&index.to_be_bytes());
        }
        Value::OutputRef { node, output, .. } => {
            bytes[..4].copy_from_slice(&(node.index() as u32).to_be_bytes());
            bytes[4..].copy_from_slice(&(*output as u32).to_be_bytes());
        }
        Value::Vector(_) => {
            unreachable!("Vector inputs are flattened before a node is registered")
        }
    }
    bytes
}

/// One definition record: `pstring name | graph_body`.
pub(crate) fn definition(name: &str, body: &[u8]) -> CompileResult<Vec<u8>> {
    let mut out = pstring(name)?;
    out.extend_from_slice(body);
    Ok(out)
}

/// The top-level container for N already-encoded definition records.
pub(crate) fn container(definitions: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_be_bytes());
    out.extend_from_slice(&(definitions.len() as u16).to_be_bytes());
    for definition in definitions {
        out.extend_from_slice(definition);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::CalculationRate;

    #[test]
    fn pstring_round_trips_length_prefix() {
        let encoded = pstring("freq").unwrap();
        assert_eq!(encoded, vec![4, b'f', b'r', b'e', b'q']);
    }

    #[test]
    fn name_too_long_is_rejected() {
        let result = pstring(&"x".repeat(256));
        assert!(matches!(result, Err(CompileError::NameTooLong { .. })));
    }

    #[test]
    fn container_starts_with_magic_version_and_count() {
        let nodes = vec![Node::new("SinOsc", CalculationRate::Audio)];
        let body = graph_body(&nodes, &[], &[], &[]).unwrap();
        let def = definition("test", &body).unwrap();
        let bytes = container(&[def]);
        assert_eq!(&bytes[0..4], b"SCgf");
        assert_eq!(&bytes[4..8], &2u32.to_be_bytes());
        assert_eq!(&bytes[8..10], &1u16.to_be_bytes());
    }

    #[test]
    fn constant_input_encodes_sentinel_and_pool_index() {
        let mut node = Node::new("SinOsc", CalculationRate::Audio);
        node.inputs.push(Value::Constant(440.0));
        let constants = vec![440.0];
        let record = node_record(&node, &constants).unwrap();
        // type_name pstring(6) + rate(1) + input_count(4) + output_count(4)
        // + special_index(2) = 17 bytes before the input spec.
        let input_spec_offset = 1 + 6 + 1 + 4 + 4 + 2;
        assert_eq!(
            &record[input_spec_offset..input_spec_offset + 4],
            &0xFFFF_FFFFu32.to_be_bytes()
        );
        assert_eq!(
            &record[input_spec_offset + 4..input_spec_offset + 8],
            &0u32.to_be_bytes()
        );
    }
}
