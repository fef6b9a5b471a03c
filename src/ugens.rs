//! A small catalog of concrete UGen constructors (§2 "Decorator/declaration
//! machinery is cosmetic scaffolding, not essential"; spec.md §1 treats the
//! full class catalog as "data, not design"). Every constructor here is a
//! thin wrapper over [`crate::expand::construct`] naming its ports and
//! calculation rate; none hand-writes its own node-building logic.

use crate::envelope::Envelope;
use crate::error::CompileResult;
use crate::expand::construct;
use crate::node::{NodeFlags, PortDecl};
use crate::ops::DoneAction;
use crate::rate::CalculationRate;
use crate::value::Value;

const SIN_OSC_PORTS: [PortDecl; 2] = [PortDecl::scalar("frequency"), PortDecl::scalar("phase")];

/// `SinOsc.ar(frequency, phase)`: a single-output sinusoidal oscillator.
/// Frequency/phase accept either a scalar or a sequence (multichannel
/// expansion, §4.3).
pub fn sin_osc_ar(frequency: impl Into<Value>, phase: impl Into<Value>) -> CompileResult<Value> {
    construct(
        "SinOsc",
        CalculationRate::Audio,
        0,
        1,
        NodeFlags {
            pure: true,
            ..NodeFlags::default()
        },
        &SIN_OSC_PORTS,
        vec![("frequency", frequency.into()), ("phase", phase.into())],
    )
}

/// `SinOsc.ar(frequency)`, phase defaulting to `0.0`.
pub fn sin_osc_ar_default(frequency: impl Into<Value>) -> CompileResult<Value> {
    sin_osc_ar(frequency, 0.0)
}

/// `WhiteNoise.ar()`: a zero-input, impure (stateful) noise source — never
/// eliminated by DCE even with no descendants, since it is not flagged pure.
pub fn white_noise_ar() -> CompileResult<Value> {
    construct(
        "WhiteNoise",
        CalculationRate::Audio,
        0,
        1,
        NodeFlags::default(),
        &[],
        vec![],
    )
}

const OUT_PORTS: [PortDecl; 2] = [PortDecl::scalar("bus"), PortDecl::unexpanded("channels")];

/// `Out.ar(bus, channels)`: an output-sink node writing one or more signal
/// channels to a hardware/software bus. Zero outputs (§3 "output-sink").
pub fn out_ar(bus: impl Into<Value>, channels: Value) -> CompileResult<Value> {
    let channels = match channels {
        Value::Vector(items) => Value::Vector(items),
        scalar => Value::Vector(vec![scalar]),
    };
    construct(
        "Out",
        CalculationRate::Audio,
        0,
        0,
        NodeFlags {
            output_sink: true,
            ..NodeFlags::default()
        },
        &OUT_PORTS,
        vec![("bus", bus.into()), ("channels", channels)],
    )
}

const IN_PORTS: [PortDecl; 1] = [PortDecl::scalar("bus")];

/// `In.ar(bus, channel_count)`: reads `channel_count` contiguous bus
/// channels starting at `bus`, exposed as that many outputs.
pub fn in_ar(bus: impl Into<Value>, channel_count: usize) -> CompileResult<Value> {
    construct(
        "In",
        CalculationRate::Audio,
        0,
        channel_count.max(1),
        NodeFlags {
            pure: true,
            ..NodeFlags::default()
        },
        &IN_PORTS,
        vec![("bus", bus.into())],
    )
}

const LOCAL_BUF_PORTS: [PortDecl; 2] =
    [PortDecl::scalar("num_frames"), PortDecl::scalar("num_channels")];

/// `LocalBuf.ir(num_frames, num_channels)`: declares a scratch buffer sized
/// for a companion scratch-allocating node (e.g. [`fft`]). Exercises the
/// scratch-capacity pass (§4.6) by flagging `needs_scratch`; the pass
/// appends the capacity node's `OutputRef` as the trailing input.
pub fn local_buf(num_frames: impl Into<Value>, num_channels: impl Into<Value>) -> CompileResult<Value> {
    construct(
        "LocalBuf",
        CalculationRate::Scalar,
        0,
        1,
        NodeFlags {
            pure: true,
            needs_scratch: true,
            ..NodeFlags::default()
        },
        &LOCAL_BUF_PORTS,
        vec![
            ("num_frames", num_frames.into()),
            ("num_channels", num_channels.into()),
        ],
    )
}

const FFT_PORTS: [PortDecl; 3] = [
    PortDecl::scalar("buffer"),
    PortDecl::scalar("input"),
    PortDecl::scalar("hop"),
];

/// `FFT.kr(buffer, input, hop)`: a spectral-transform node; also scratch-
/// requesting, like [`local_buf`] (two independent scratch-demanding node
/// kinds share one capacity count, per S6).
pub fn fft(buffer: Value, input: Value, hop: impl Into<Value>) -> CompileResult<Value> {
    construct(
        "FFT",
        CalculationRate::Control,
        0,
        1,
        NodeFlags {
            pure: true,
            needs_scratch: true,
            ..NodeFlags::default()
        },
        &FFT_PORTS,
        vec![("buffer", buffer), ("input", input), ("hop", hop.into())],
    )
}

const ENV_GEN_PORTS: [PortDecl; 3] = [
    PortDecl::scalar("gate"),
    PortDecl::scalar("done_action"),
    PortDecl::unexpanded("envelope"),
];

/// `EnvGen.kr(envelope, gate, done_action)`: consumes an [`Envelope`]
/// descriptor flattened to its value sequence (§4.9) at a dedicated
/// unexpanded port.
pub fn env_gen(envelope: &Envelope, gate: impl Into<Value>, done_action: DoneAction) -> CompileResult<Value> {
    construct(
        "EnvGen",
        CalculationRate::Control,
        0,
        1,
        NodeFlags {
            pure: false,
            done_flag: true,
            ..NodeFlags::default()
        },
        &ENV_GEN_PORTS,
        vec![
            ("gate", gate.into()),
            ("done_action", Value::Constant(done_action.code() as f32)),
            ("envelope", Value::Vector(envelope.to_value_sequence())),
        ],
    )
}
