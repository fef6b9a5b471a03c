//! Envelope descriptor (§4.9): not a node, a domain helper that serializes a
//! piecewise breakpoint curve to the flat value sequence an envelope
//! generator node consumes. Grounded on `nanosynth/synthdef.py`'s `Envelope`
//! (the Python original's `.data()` flattening), reshaped into a builder
//! pattern matching this crate's style.

use crate::ops::EnvelopeShape;
use crate::value::Value;

/// One breakpoint: the amplitude to reach, the time to take getting there,
/// and the curve shape. A nonzero `curvature` implicitly selects
/// `EnvelopeShape::Custom` regardless of the `shape` passed in, matching
/// spec.md §4.9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSegment {
    pub target: f32,
    pub duration: f32,
    pub shape: EnvelopeShape,
    pub curvature: f32,
}

impl EnvelopeSegment {
    pub fn new(target: f32, duration: f32, shape: EnvelopeShape) -> EnvelopeSegment {
        EnvelopeSegment {
            target,
            duration,
            shape,
            curvature: 0.0,
        }
    }

    pub fn curved(target: f32, duration: f32, curvature: f32) -> EnvelopeSegment {
        EnvelopeSegment {
            target,
            duration,
            shape: EnvelopeShape::Custom,
            curvature,
        }
    }

    fn effective_shape(&self) -> EnvelopeShape {
        if self.curvature != 0.0 {
            EnvelopeShape::Custom
        } else {
            self.shape
        }
    }
}

/// A piecewise envelope: an initial level plus an ordered list of segments,
/// with optional release/loop breakpoint indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub initial: f32,
    pub segments: Vec<EnvelopeSegment>,
    pub release_node: Option<usize>,
    pub loop_node: Option<usize>,
}

impl Envelope {
    pub fn new(initial: f32, segments: Vec<EnvelopeSegment>) -> Envelope {
        Envelope {
            initial,
            segments,
            release_node: None,
            loop_node: None,
        }
    }

    pub fn with_release(mut self, node: usize) -> Envelope {
        self.release_node = Some(node);
        self
    }

    pub fn with_loop(mut self, node: usize) -> Envelope {
        self.loop_node = Some(node);
        self
    }

    /// Flatten to `[initial, segment_count, release_or_-99, loop_or_-99,
    /// (target, duration, shape_code, curvature) * segment_count]`
    /// (spec.md §4.9). This is the value sequence bound to an envelope
    /// generator's unexpanded "envelope" port.
    pub fn to_value_sequence(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(4 + self.segments.len() * 4);
        out.push(Value::Constant(self.initial));
        out.push(Value::Constant(self.segments.len() as f32));
        out.push(Value::Constant(
            self.release_node.map(|n| n as f32).unwrap_or(-99.0),
        ));
        out.push(Value::Constant(
            self.loop_node.map(|n| n as f32).unwrap_or(-99.0),
        ));
        for segment in &self.segments {
            out.push(Value::Constant(segment.target));
            out.push(Value::Constant(segment.duration));
            out.push(Value::Constant(segment.effective_shape().code()));
            out.push(Value::Constant(segment.curvature));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattening_has_the_expected_header() {
        let envelope = Envelope::new(
            0.0,
            vec![
                EnvelopeSegment::new(1.0, 0.01, EnvelopeShape::Linear),
                EnvelopeSegment::new(0.0, 0.5, EnvelopeShape::Exponential),
            ],
        );
        let flat = envelope.to_value_sequence();
        assert_eq!(flat.len(), 4 + 2 * 4);
        assert_eq!(flat[0].as_constant(), Some(0.0));
        assert_eq!(flat[1].as_constant(), Some(2.0));
        assert_eq!(flat[2].as_constant(), Some(-99.0));
        assert_eq!(flat[3].as_constant(), Some(-99.0));
    }

    #[test]
    fn nonzero_curvature_selects_custom_shape() {
        let segment = EnvelopeSegment::curved(1.0, 0.1, 4.0);
        assert_eq!(segment.effective_shape(), EnvelopeShape::Custom);
    }

    #[test]
    fn release_and_loop_nodes_are_encoded() {
        let envelope = Envelope::new(0.0, vec![EnvelopeSegment::new(1.0, 0.1, EnvelopeShape::Linear)])
            .with_release(1)
            .with_loop(2);
        let flat = envelope.to_value_sequence();
        assert_eq!(flat[2].as_constant(), Some(1.0));
        assert_eq!(flat[3].as_constant(), Some(2.0));
    }
}
