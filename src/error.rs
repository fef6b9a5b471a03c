//! Error taxonomy (§7). All failures are synchronous, deterministic, and
//! report the offending node or port; there is no retry and no partial
//! result.

use thiserror::Error;

/// Every way graph construction or compilation can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// An input referenced a node from a different builder scope.
    #[error("input references a node constructed in a different builder scope")]
    CrossScope,

    /// A sequence was supplied to a port not marked unexpanded.
    #[error("port '{port}' on '{ugen}' does not accept a sequence (not unexpanded)")]
    SequenceOnScalarPort { ugen: String, port: String },

    /// A keyword argument had no matching port.
    #[error("'{ugen}' has no port named '{port}'")]
    UnknownPort { ugen: String, port: String },

    /// An input was neither a recognized value nor a domain descriptor nor a
    /// numeric scalar.
    #[error("port '{port}' on '{ugen}' received a value of an unsupported type")]
    BadValueType { ugen: String, port: String },

    /// `build` was called on a builder that registered no nodes.
    #[error("build() called on a builder with no registered nodes")]
    EmptyGraph,

    /// Two parameters with the same name were registered in one builder.
    #[error("parameter '{name}' was declared more than once")]
    DuplicateParameter { name: String },

    /// A definition name or node type name exceeded 255 bytes.
    #[error("name '{name}' is {len} bytes, exceeding the 255-byte pstring limit")]
    NameTooLong { name: String, len: usize },

    /// The topological sort could not schedule every node (defensive; should
    /// not occur for a well-formed graph).
    #[error("graph contains a cycle: {remaining} node(s) could not be scheduled")]
    CyclicGraph { remaining: usize },

    /// A value was used in a host boolean context (e.g. branching on a
    /// comparison node).
    #[error("a graph value was used in a host boolean context")]
    MisuseInContext,

    /// A node was constructed with no active builder scope.
    #[error("no active builder: nodes must be constructed inside SynthDefBuilder::build")]
    NoActiveBuilder,
}

pub type CompileResult<T> = Result<T, CompileError>;
