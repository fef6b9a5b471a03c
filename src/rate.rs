//! Rate & Operator tables
//!
//! Small closed enumerations shared across the rest of the compiler:
//! calculation rate and parameter rate. Operator codes live in [`crate::ops`].

/// How often a node computes new output values.
///
/// Totally ordered `Scalar < Control < Audio == Demand`, used when deriving a
/// result rate from a set of operands (§3 "Calculation rate").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CalculationRate {
    /// Evaluated once, at synth start.
    Scalar = 0,
    /// One value per control block.
    Control = 1,
    /// One value per sample.
    Audio = 2,
    /// One value per demand-rate pull.
    Demand = 3,
}

impl CalculationRate {
    /// The two-letter token used in `dump()` output (`ir`/`kr`/`ar`/`dr`).
    pub fn token(self) -> &'static str {
        match self {
            CalculationRate::Scalar => "ir",
            CalculationRate::Control => "kr",
            CalculationRate::Audio => "ar",
            CalculationRate::Demand => "dr",
        }
    }

    /// The wire-format byte for this rate (identical to the `repr(u8)` value,
    /// spelled out explicitly since the codec must never depend on enum
    /// layout details).
    pub fn to_byte(self) -> u8 {
        match self {
            CalculationRate::Scalar => 0,
            CalculationRate::Control => 1,
            CalculationRate::Audio => 2,
            CalculationRate::Demand => 3,
        }
    }

    /// Derive a result rate from a set of operand rates: the maximum under
    /// the total order `Scalar < Control < Audio/Demand`.
    pub fn max_of<I: IntoIterator<Item = CalculationRate>>(rates: I) -> CalculationRate {
        rates
            .into_iter()
            .max()
            .unwrap_or(CalculationRate::Scalar)
    }
}

/// How a named external input is exposed; selects the aggregate-control
/// variant during parameter lowering (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterRate {
    Scalar,
    Trigger,
    Audio,
    Control,
}

impl ParameterRate {
    /// Fixed rate-class processing order used by parameter lowering (§4.5
    /// step 3) and by the "ordering guarantees" of §5.
    pub const LOWERING_ORDER: [ParameterRate; 4] = [
        ParameterRate::Scalar,
        ParameterRate::Trigger,
        ParameterRate::Audio,
        ParameterRate::Control,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_order() {
        assert!(CalculationRate::Scalar < CalculationRate::Control);
        assert!(CalculationRate::Control < CalculationRate::Audio);
        assert_eq!(CalculationRate::Audio, CalculationRate::Audio);
    }

    #[test]
    fn rate_tokens() {
        assert_eq!(CalculationRate::Scalar.token(), "ir");
        assert_eq!(CalculationRate::Control.token(), "kr");
        assert_eq!(CalculationRate::Audio.token(), "ar");
        assert_eq!(CalculationRate::Demand.token(), "dr");
    }

    #[test]
    fn max_of_empty_is_scalar() {
        assert_eq!(CalculationRate::max_of(Vec::new()), CalculationRate::Scalar);
    }

    #[test]
    fn max_of_picks_highest() {
        let rates = [
            CalculationRate::Scalar,
            CalculationRate::Audio,
            CalculationRate::Control,
        ];
        assert_eq!(CalculationRate::max_of(rates), CalculationRate::Audio);
    }

    #[test]
    fn lowering_order_is_fixed() {
        assert_eq!(
            ParameterRate::LOWERING_ORDER,
            [
                ParameterRate::Scalar,
                ParameterRate::Trigger,
                ParameterRate::Audio,
                ParameterRate::Control,
            ]
        );
    }
}
