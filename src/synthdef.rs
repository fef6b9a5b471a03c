//! Definition finalization (§4.10) and the pipeline that gets there: deep
//! clone → parameter lowering (§4.5) → scratch-capacity insertion (§4.6) →
//! topological linearization (§4.7) → optional dead-code elimination
//! (§4.8) → constant-pool / control-default / parameter-index extraction →
//! cached binary body and content hash.

use crate::codec;
use crate::dce;
use crate::error::{CompileError, CompileResult};
use crate::hash::anonymous_name;
use crate::lowering;
use crate::node::{Node, NodeData};
use crate::scratch;
use crate::topo;
use crate::value::Value;

/// An immutable, finalized synth definition: a linearized node list plus the
/// pools and indices the binary codec needs, and a cached serialization.
#[derive(Debug, Clone)]
pub struct SynthDef {
    name: Option<String>,
    nodes: Vec<Node>,
    constants: Vec<f32>,
    control_defaults: Vec<f32>,
    parameter_index: Vec<(String, u32)>,
    body: Vec<u8>,
    anonymous_name: String,
}

impl SynthDef {
    /// Run the full pipeline over a builder's raw (insertion-order) node
    /// list and finalize a definition. `optimize` gates dead-code
    /// elimination (§4.8).
    pub(crate) fn from_raw_nodes(
        nodes: Vec<Node>,
        name: Option<String>,
        optimize: bool,
    ) -> CompileResult<SynthDef> {
        if let Some(name) = &name {
            if name.len() > 255 {
                return Err(CompileError::NameTooLong {
                    name: name.clone(),
                    len: name.len(),
                });
            }
        }

        let (lowered, control_defaults, parameter_index) = lowering::lower(nodes);
        let with_capacity = scratch::insert_capacity_node(lowered);
        let (linearized, _) = topo::linearize(with_capacity)?;
        let final_nodes = if optimize {
            dce::eliminate(linearized)
        } else {
            linearized
        };

        let constants = collect_constants(&final_nodes);
        let body = codec::graph_body(&final_nodes, &constants, &control_defaults, &parameter_index)?;
        let anonymous_name = anonymous_name(&body);

        tracing::debug!(
            node_count = final_nodes.len(),
            constant_count = constants.len(),
            "finalized synth definition"
        );

        Ok(SynthDef {
            name,
            nodes: final_nodes,
            constants,
            control_defaults,
            parameter_index,
            body,
            anonymous_name,
        })
    }

    /// The name used when encoding this definition: the user-chosen name if
    /// given, else the content-address anonymous name.
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.anonymous_name)
    }

    pub fn anonymous_name(&self) -> &str {
        &self.anonymous_name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A single-definition `SCgf` container (§6 "definition.bytes()").
    pub fn bytes(&self) -> CompileResult<Vec<u8>> {
        compile(&[self])
    }

    /// Human-readable listing: the definition name, then one line per
    /// linearized node (§6 "definition.dump()"). Grounded on
    /// `nanosynth/synthdef.py`'s `dump_ugens`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str(self.effective_name());
        out.push('\n');
        for (index, node) in self.nodes.iter().enumerate() {
            let inputs: Vec<String> = node.inputs.iter().map(render_input).collect();
            out.push_str(&format!(
                "{index:>4}  {}.{}  {}  (-> {} outputs)\n",
                node.type_name,
                node.calculation_rate.token(),
                inputs.join(", "),
                node.output_count
            ));
        }
        out
    }
}

fn render_input(value: &Value) -> String {
    match value {
        Value::Constant(c) => format!("{c}"),
        Value::OutputRef { node, output, .. } => format!("node[{}][{}]", node.index(), output),
        Value::Vector(items) => {
            let parts: Vec<String> = items.iter().map(render_input).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// Every unique `Constant` appearing in any node's inputs, first-seen order
/// (§4.10).
fn collect_constants(nodes: &[Node]) -> Vec<f32> {
    let mut constants = Vec::new();
    for node in nodes {
        collect_constants_from_inputs(&node.inputs, &mut constants);
    }
    constants
}

fn collect_constants_from_inputs(inputs: &[Value], constants: &mut Vec<f32>) {
    for input in inputs {
        match input {
            Value::Constant(c) => {
                if !constants.contains(c) {
                    constants.push(*c);
                }
            }
            Value::Vector(items) => collect_constants_from_inputs(items, constants),
            Value::OutputRef { .. } => {}
        }
    }
}

/// Emit the top-level `SCgf` container for one or more finalized
/// definitions (§6 `compile(definitions…) -> bytes`).
pub fn compile(definitions: &[&SynthDef]) -> CompileResult<Vec<u8>> {
    let mut encoded = Vec::with_capacity(definitions.len());
    for def in definitions {
        encoded.push(codec::definition(def.effective_name(), &def.body)?);
    }
    Ok(codec::container(&encoded))
}
