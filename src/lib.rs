//! # scgf-compiler
//!
//! A host-side **synthesis-graph compiler** for the SuperCollider real-time
//! audio engine: a declarative embedded DSL describing a UGen signal graph,
//! lowered to a `SCgf` binary synth-definition blob suitable for sending to
//! an external `scsynth` server over OSC.
//!
//! The compiler itself does not execute audio, schedule synths, allocate
//! buffers, or speak OSC — it is a pure function from a constructed graph
//! to a byte string. Transport, node-id allocation, and buffer management
//! are the surrounding application's job.
//!
//! ## Pipeline
//!
//! ```text
//! user construction (inside a builder scope)
//!   -> deep clone
//!   -> parameter lowering       (lowering)
//!   -> scratch-capacity pass    (scratch)
//!   -> topological linearization(topo)
//!   -> dead-code elimination    (dce, optional)
//!   -> definition finalization  (synthdef)
//!   -> binary codec             (codec)
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use scgf_compiler::prelude::*;
//!
//! let def = SynthDefBuilder::build(Some("sine"), true, |_builder| {
//!     let sine = sin_osc_ar_default(440.0)?;
//!     out_ar(0.0, sine)?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let bytes = def.bytes().unwrap();
//! assert_eq!(&bytes[0..4], b"SCgf");
//! ```
//!
//! ## Module map
//!
//! - [`rate`] / [`ops`] — the closed enumerations (calculation rate,
//!   parameter rate, operator/done-action/envelope-shape codes).
//! - [`value`] / [`algebra`] — the `Value` sum type and its operator mixin.
//! - [`node`] — the node model and per-builder arena addressing (`NodeId`).
//! - [`builder`] — the thread-local scope stack and cross-scope checks.
//! - [`expand`] — multi-channel expansion + input binding.
//! - [`lowering`] — parameter → aggregate-control lowering.
//! - [`scratch`] — the scratch-capacity insertion pass.
//! - [`topo`] — topological linearization.
//! - [`dce`] — dead-code elimination.
//! - [`envelope`] — the envelope breakpoint descriptor.
//! - [`ugens`] — a small catalog of concrete UGen constructors.
//! - [`synthdef`] — `SynthDef`, `compile()`, definition finalization.
//! - [`codec`] — the `SCgf` binary writer.
//! - [`hash`] — the anonymous-name content hash.
//! - [`error`] — the error taxonomy.

pub mod algebra;
pub mod builder;
pub mod codec;
pub mod dce;
pub mod envelope;
pub mod error;
pub mod expand;
mod hash;
pub mod lowering;
pub mod node;
pub mod ops;
pub mod rate;
pub mod scratch;
pub mod synthdef;
pub mod topo;
pub mod ugens;
pub mod value;

/// Convenient glob import of the types most call sites need.
pub mod prelude {
    pub use crate::builder::SynthDefBuilder;
    pub use crate::envelope::{Envelope, EnvelopeSegment};
    pub use crate::error::{CompileError, CompileResult};
    pub use crate::node::{NodeId, PortDecl};
    pub use crate::ops::{BinaryOperator, DoneAction, EnvelopeShape, UnaryOperator};
    pub use crate::rate::{CalculationRate, ParameterRate};
    pub use crate::synthdef::{compile, SynthDef};
    pub use crate::ugens::{
        env_gen, fft, in_ar, local_buf, out_ar, sin_osc_ar, sin_osc_ar_default, white_noise_ar,
    };
    pub use crate::value::Value;
}
