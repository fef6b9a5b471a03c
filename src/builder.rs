//! Builder / scope (§4.2, §5, §9 "Builder thread-local stack").
//!
//! A thread-local stack of active builders. Every freshly constructed node
//! reads the top of the stack (if any), records the builder's scope
//! identity, and appends itself to that builder's insertion-ordered node
//! list. A node constructed with no active builder is rejected
//! (`NoActiveBuilder` — the recommended stance per spec.md §9 Open
//! Question 3).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CompileError, CompileResult};
use crate::node::{Node, NodeId};
use crate::rate::{CalculationRate, ParameterRate};
use crate::synthdef::SynthDef;
use crate::value::Value;

/// Unique identity of one builder instance. `Value::OutputRef` carries its
/// producing builder's `ScopeId`; any later attempt to use it as an input in
/// a *different* scope is rejected before the new node is registered
/// (invariant 1, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

pub(crate) fn next_scope_id() -> ScopeId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    ScopeId(COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub(crate) struct BuilderState {
    scope_id: ScopeId,
    pub(crate) nodes: Vec<Node>,
    parameter_names: HashSet<String>,
}

thread_local! {
    static STACK: RefCell<Vec<Rc<RefCell<BuilderState>>>> = RefCell::new(Vec::new());
}

/// RAII guard popping the builder's scope off the thread-local stack when
/// dropped (covers early returns via `?` inside the construction closure).
pub struct ScopeGuard {
    active: bool,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.active {
            STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
}

/// Captures graph construction into a named definition.
pub struct SynthDefBuilder {
    state: Rc<RefCell<BuilderState>>,
}

impl SynthDefBuilder {
    pub fn new() -> SynthDefBuilder {
        SynthDefBuilder {
            state: Rc::new(RefCell::new(BuilderState {
                scope_id: next_scope_id(),
                nodes: Vec::new(),
                parameter_names: HashSet::new(),
            })),
        }
    }

    pub fn scope_id(&self) -> ScopeId {
        self.state.borrow().scope_id
    }

    /// Push this builder onto the thread-local stack; pops automatically
    /// when the returned guard drops.
    pub fn enter_scope(&self) -> ScopeGuard {
        STACK.with(|stack| stack.borrow_mut().push(self.state.clone()));
        tracing::debug!(scope = self.scope_id().0, "entered builder scope");
        ScopeGuard { active: true }
    }

    /// Register a named external input (§3 "Parameter", §4.5).
    pub fn add_parameter(
        &self,
        name: impl Into<String>,
        defaults: &[f32],
        parameter_rate: ParameterRate,
        lag: f32,
    ) -> CompileResult<Value> {
        let name = name.into();
        {
            let mut state = self.state.borrow_mut();
            if !state.parameter_names.insert(name.clone()) {
                return Err(CompileError::DuplicateParameter { name });
            }
        }
        let mut node = Node::new("Control", CalculationRate::from_parameter_rate(parameter_rate));
        node.output_count = defaults.len().max(1);
        node.flags.pure = true;
        node.data = crate::node::NodeData::Parameter(crate::node::ParameterInfo {
            name: name.clone(),
            defaults: defaults.to_vec(),
            parameter_rate,
            lag,
        });
        let _this_scope = self.scope_id();
        let id = self.push_node(node)?;
        Ok(Value::output_ref(self.scope_id(), id, 0))
    }

    /// Build the definition: clone the node arena, lower parameters, insert
    /// the scratch-capacity node, linearize, optionally eliminate dead code,
    /// and finalize (§4.5–§4.10).
    pub fn build(
        name: Option<&str>,
        optimize: bool,
        f: impl FnOnce(&SynthDefBuilder) -> CompileResult<()>,
    ) -> CompileResult<SynthDef> {
        let builder = SynthDefBuilder::new();
        let result = {
            let _scope = builder.enter_scope();
            f(&builder)
        };
        result?;
        builder.finish(name, optimize)
    }

    fn finish(&self, name: Option<&str>, optimize: bool) -> CompileResult<SynthDef> {
        if let Some(name) = name {
            if name.len() > 255 {
                return Err(CompileError::NameTooLong {
                    name: name.to_string(),
                    len: name.len(),
                });
            }
        }
        let nodes = self.state.borrow().nodes.clone();
        if nodes.is_empty() {
            return Err(CompileError::EmptyGraph);
        }
        tracing::debug!(node_count = nodes.len(), "finishing builder scope");
        SynthDef::from_raw_nodes(nodes, name.map(|s| s.to_string()), optimize)
    }

    /// Register a fully-formed node under this builder directly (used by
    /// tests and by [`crate::expand`] after multichannel expansion already
    /// produced one concrete node per channel).
    pub(crate) fn push_node(&self, node: Node) -> CompileResult<NodeId> {
        check_scope(&node, self.scope_id())?;
        let mut state = self.state.borrow_mut();
        let id = NodeId(state.nodes.len());
        state.nodes.push(node);
        Ok(id)
    }
}

impl Default for SynthDefBuilder {
    fn default() -> Self {
        SynthDefBuilder::new()
    }
}

fn check_scope(node: &Node, scope: ScopeId) -> CompileResult<()> {
    for value in &node.inputs {
        check_value_scope(value, scope)?;
    }
    Ok(())
}

fn check_value_scope(value: &Value, scope: ScopeId) -> CompileResult<()> {
    match value {
        Value::OutputRef { scope: vscope, .. } => {
            if *vscope != scope {
                return Err(CompileError::CrossScope);
            }
            Ok(())
        }
        Value::Vector(items) => {
            for item in items {
                check_value_scope(item, scope)?;
            }
            Ok(())
        }
        Value::Constant(_) => Ok(()),
    }
}

/// The currently active builder's state, or `NoActiveBuilder` if the
/// thread-local stack is empty. Used by [`crate::algebra`] and
/// [`crate::expand`], whose entry points have no explicit builder handle to
/// thread through (operator overloads can't take extra arguments).
pub(crate) fn current() -> CompileResult<Rc<RefCell<BuilderState>>> {
    STACK.with(|stack| stack.borrow().last().cloned())
        .ok_or(CompileError::NoActiveBuilder)
}

pub(crate) fn current_scope_id() -> CompileResult<ScopeId> {
    current().map(|state| state.borrow().scope_id)
}

/// Register a node under the currently active builder, scope-checking its
/// inputs first.
pub(crate) fn register_node(node: Node) -> CompileResult<NodeId> {
    let state = current()?;
    let scope = state.borrow().scope_id;
    check_scope(&node, scope)?;
    let mut state = state.borrow_mut();
    let id = NodeId(state.nodes.len());
    state.nodes.push(node);
    Ok(id)
}

/// Resolve the calculation rate of a value: scalar for constants, the
/// referenced node's rate for `OutputRef`, the max of elements for `Vector`
/// (§3 "Value").
pub(crate) fn rate_of(value: &Value) -> CompileResult<CalculationRate> {
    match value {
        Value::Constant(_) => Ok(CalculationRate::Scalar),
        Value::OutputRef { scope, node, .. } => {
            let state = current()?;
            let state = state.borrow();
            if *scope != state.scope_id {
                return Err(CompileError::CrossScope);
            }
            state
                .nodes
                .get(node.index())
                .map(|n| n.calculation_rate)
                .ok_or(CompileError::CrossScope)
        }
        Value::Vector(items) => {
            let mut rates = Vec::with_capacity(items.len());
            for item in items {
                rates.push(rate_of(item)?);
            }
            Ok(CalculationRate::max_of(rates))
        }
    }
}

impl CalculationRate {
    pub(crate) fn from_parameter_rate(rate: ParameterRate) -> CalculationRate {
        match rate {
            ParameterRate::Scalar => CalculationRate::Scalar,
            ParameterRate::Trigger => CalculationRate::Control,
            ParameterRate::Audio => CalculationRate::Audio,
            ParameterRate::Control => CalculationRate::Control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_builder_is_rejected() {
        let node = Node::new("SinOsc", CalculationRate::Audio);
        let result = register_node(node);
        assert!(matches!(result, Err(CompileError::NoActiveBuilder)));
    }

    #[test]
    fn duplicate_parameter_is_rejected() {
        let builder = SynthDefBuilder::new();
        let _scope = builder.enter_scope();
        builder
            .add_parameter("freq", &[440.0], ParameterRate::Control, 0.0)
            .unwrap();
        let result = builder.add_parameter("freq", &[220.0], ParameterRate::Control, 0.0);
        assert!(matches!(
            result,
            Err(CompileError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn cross_scope_reference_is_rejected() {
        let first = SynthDefBuilder::new();
        let value = {
            let _scope = first.enter_scope();
            first
                .add_parameter("freq", &[440.0], ParameterRate::Control, 0.0)
                .unwrap()
        };

        let second = SynthDefBuilder::new();
        let _scope = second.enter_scope();
        let mut node = Node::new("SinOsc", CalculationRate::Audio);
        node.inputs.push(value);
        let result = second.push_node(node);
        assert!(matches!(result, Err(CompileError::CrossScope)));
    }

    #[test]
    fn empty_graph_is_rejected() {
        let result = SynthDefBuilder::build(None, true, |_builder| Ok(()));
        assert!(matches!(result, Err(CompileError::EmptyGraph)));
    }
}
