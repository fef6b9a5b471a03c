//! Operator codes, done-action codes, and envelope-segment shapes.
//!
//! These are closed, stable integer enumerations that are passed through the
//! codec unchanged (§3 "Operator codes") — their semantics live in the
//! external engine, not here.

/// Binary operator special-index, stable across the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum BinaryOperator {
    Addition = 0,
    Subtraction = 1,
    Multiplication = 2,
    IntegerDivision = 3,
    FloatDivision = 4,
    Modulo = 5,
    Equal = 6,
    NotEqual = 7,
    LessThan = 8,
    GreaterThan = 9,
    LessThanOrEqual = 10,
    GreaterThanOrEqual = 11,
    Minimum = 12,
    Maximum = 13,
    BitwiseAnd = 14,
    BitwiseOr = 15,
    BitwiseXor = 16,
    LeftShift = 17,
    RightShift = 18,
    UnsignedRightShift = 19,
    Power = 25,
    Ring1 = 30,
    Ring2 = 31,
    Ring3 = 32,
    Ring4 = 33,
    DifSqr = 34,
    SumSqr = 35,
    SqrSum = 36,
    SqrDif = 37,
    AbsDif = 38,
    Thresh = 39,
    AmClip = 40,
    ScaleNeg = 41,
    Clip2 = 42,
    Excess = 43,
    Fold2 = 44,
    Wrap2 = 45,
}

impl BinaryOperator {
    pub fn special_index(self) -> i16 {
        self as i16
    }
}

/// Unary operator special-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum UnaryOperator {
    Negative = 0,
    Not = 1,
    BitNot = 4,
    AbsoluteValue = 5,
    Ceiling = 8,
    Floor = 9,
    FractionalPart = 10,
    Sign = 11,
    Squared = 12,
    Cubed = 13,
    SquareRoot = 14,
    Exponential = 15,
    Reciprocal = 16,
    MidiToFreq = 17,
    FreqToMidi = 18,
    MidiRatio = 19,
    RatioToMidi = 20,
    DbToAmp = 21,
    AmpToDb = 22,
    OctaveToFreq = 23,
    FreqToOctave = 24,
    Log = 25,
    Log2 = 26,
    Log10 = 27,
    Sin = 28,
    Cos = 29,
    Tan = 30,
    ArcSin = 31,
    ArcCos = 32,
    ArcTan = 33,
    SinH = 34,
    CosH = 35,
    TanH = 36,
    Distort = 44,
    SoftClip = 45,
}

impl UnaryOperator {
    pub fn special_index(self) -> i16 {
        self as i16
    }
}

/// Engine lifecycle "done-action" code. Values outside the recognized set
/// (spec.md §9 Open Question 2) still round-trip through the codec as plain
/// numeric constants — the compiler never rejects an unrecognized code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoneAction {
    Nothing,
    PauseSynth,
    FreeSynth,
    FreeSynthAndPrecedingNode,
    FreeSynthAndFollowingNode,
    FreeSynthAndAllSiblingNodes,
    FreeSynthAndEnclosingGroup,
    /// An opaque code outside the recognized surface; still valid, still
    /// passed through.
    Other(i32),
}

impl DoneAction {
    pub fn code(self) -> i32 {
        match self {
            DoneAction::Nothing => 0,
            DoneAction::PauseSynth => 1,
            DoneAction::FreeSynth => 2,
            DoneAction::FreeSynthAndPrecedingNode => 3,
            DoneAction::FreeSynthAndFollowingNode => 4,
            DoneAction::FreeSynthAndAllSiblingNodes => 13,
            DoneAction::FreeSynthAndEnclosingGroup => 14,
            DoneAction::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> DoneAction {
        match code {
            0 => DoneAction::Nothing,
            1 => DoneAction::PauseSynth,
            2 => DoneAction::FreeSynth,
            3 => DoneAction::FreeSynthAndPrecedingNode,
            4 => DoneAction::FreeSynthAndFollowingNode,
            13 => DoneAction::FreeSynthAndAllSiblingNodes,
            14 => DoneAction::FreeSynthAndEnclosingGroup,
            other => DoneAction::Other(other),
        }
    }
}

/// Envelope breakpoint curve shape (§4.9). A nonzero curvature implicitly
/// selects `Custom` at the call site that builds an `EnvelopeSegment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum EnvelopeShape {
    Step = 0,
    Linear = 1,
    Exponential = 2,
    Sine = 3,
    Welch = 4,
    Custom = 5,
    Squared = 6,
    Cubed = 7,
    Hold = 8,
}

impl EnvelopeShape {
    pub fn code(self) -> f32 {
        self as i16 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operator_codes_are_stable() {
        assert_eq!(BinaryOperator::Addition.special_index(), 0);
        assert_eq!(BinaryOperator::Power.special_index(), 25);
        assert_eq!(BinaryOperator::Wrap2.special_index(), 45);
    }

    #[test]
    fn unary_operator_codes_are_stable() {
        assert_eq!(UnaryOperator::Negative.special_index(), 0);
        assert_eq!(UnaryOperator::AbsoluteValue.special_index(), 5);
        assert_eq!(UnaryOperator::SoftClip.special_index(), 45);
    }

    #[test]
    fn done_action_round_trips_recognized_codes() {
        for &code in &[0, 1, 2, 3, 4, 13, 14] {
            assert_eq!(DoneAction::from_code(code).code(), code);
        }
    }

    #[test]
    fn done_action_passes_through_unrecognized_codes() {
        let action = DoneAction::from_code(99);
        assert!(matches!(action, DoneAction::Other(99)));
        assert_eq!(action.code(), 99);
    }

    #[test]
    fn envelope_shape_codes() {
        assert_eq!(EnvelopeShape::Linear.code(), 1.0);
        assert_eq!(EnvelopeShape::Custom.code(), 5.0);
    }
}
