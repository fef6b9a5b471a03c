//! Constant folding and algebraic identities (§4.1).
//!
//! Every arithmetic entry point (operator overloads in [`crate::value`],
//! and the explicit [`Value::min`]/[`Value::max`]/[`Value::pow`]/comparison
//! methods) funnels through [`emit_binary`] or [`emit_unary`]. Both fold
//! constants first, then apply the identity table, and only then fall back
//! to emitting a `BinaryOpUGen`/`UnaryOpUGen` node.

use crate::builder;
use crate::error::CompileResult;
use crate::node::Node;
use crate::ops::{BinaryOperator, UnaryOperator};
use crate::value::Value;

/// Fold or emit a binary operator node.
pub(crate) fn emit_binary(op: BinaryOperator, lhs: Value, rhs: Value) -> CompileResult<Value> {
    if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
        if let Some(folded) = fold_binary(op, a, b) {
            return Ok(Value::Constant(folded));
        }
    }
    if let Some(identity) = identity_binary(op, &lhs, &rhs) {
        return Ok(identity);
    }

    let rate = builder::rate_of(&lhs)?.max(builder::rate_of(&rhs)?);
    let mut node = Node::new("BinaryOpUGen", rate);
    node.special_index = op.special_index();
    node.flags.pure = true;
    node.inputs = vec![lhs, rhs];
    let id = builder::register_node(node)?;
    Ok(Value::output_ref(builder::current_scope_id()?, id, 0))
}

/// Fold or emit a unary operator node.
pub(crate) fn emit_unary(op: UnaryOperator, operand: Value) -> CompileResult<Value> {
    if let Some(a) = operand.as_constant() {
        if let Some(folded) = fold_unary(op, a) {
            return Ok(Value::Constant(folded));
        }
    }

    let rate = builder::rate_of(&operand)?;
    let mut node = Node::new("UnaryOpUGen", rate);
    node.special_index = op.special_index();
    node.flags.pure = true;
    node.inputs = vec![operand];
    let id = builder::register_node(node)?;
    Ok(Value::output_ref(builder::current_scope_id()?, id, 0))
}

/// Host-evaluable numeric semantics for the operators reachable through
/// `Value`'s operator overloads and explicit helper methods. Operators with
/// no meaningful host-side evaluation (bitwise, ring-mod family, clip/fold
/// family) are left to the engine and never folded here.
fn fold_binary(op: BinaryOperator, a: f32, b: f32) -> Option<f32> {
    match op {
        BinaryOperator::Addition => Some(a + b),
        BinaryOperator::Subtraction => Some(a - b),
        BinaryOperator::Multiplication => Some(a * b),
        BinaryOperator::FloatDivision => Some(a / b),
        BinaryOperator::IntegerDivision => Some((a / b).floor()),
        BinaryOperator::Modulo => Some(a.rem_euclid(b)),
        BinaryOperator::Power => Some(a.powf(b)),
        BinaryOperator::Minimum => Some(a.min(b)),
        BinaryOperator::Maximum => Some(a.max(b)),
        BinaryOperator::LessThan => Some(bool_to_f32(a < b)),
        BinaryOperator::GreaterThan => Some(bool_to_f32(a > b)),
        BinaryOperator::LessThanOrEqual => Some(bool_to_f32(a <= b)),
        BinaryOperator::GreaterThanOrEqual => Some(bool_to_f32(a >= b)),
        BinaryOperator::Equal => Some(bool_to_f32(a == b)),
        BinaryOperator::NotEqual => Some(bool_to_f32(a != b)),
        _ => None,
    }
}

fn fold_unary(op: UnaryOperator, a: f32) -> Option<f32> {
    match op {
        UnaryOperator::Negative => Some(-a),
        UnaryOperator::AbsoluteValue => Some(a.abs()),
        UnaryOperator::Ceiling => Some(a.ceil()),
        UnaryOperator::Floor => Some(a.floor()),
        UnaryOperator::FractionalPart => Some(a.fract()),
        UnaryOperator::Sign => Some(a.signum()),
        UnaryOperator::Squared => Some(a * a),
        UnaryOperator::Cubed => Some(a * a * a),
        UnaryOperator::SquareRoot => Some(a.sqrt()),
        UnaryOperator::Reciprocal => Some(1.0 / a),
        UnaryOperator::Sin => Some(a.sin()),
        UnaryOperator::Cos => Some(a.cos()),
        UnaryOperator::Tan => Some(a.tan()),
        _ => None,
    }
}

fn bool_to_f32(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// `a*0->0`, `a*1->a`, `a*-1->-a`, `a+0/0+a->a`, `a-0->a`, `0-a->-a`,
/// `a/1->a`, `a/-1->-a`, `a**0->1`, `a**1->a` (§4.1). Only triggers when
/// exactly one side is a known constant — both-constant cases are already
/// handled by [`fold_binary`].
fn identity_binary(op: BinaryOperator, lhs: &Value, rhs: &Value) -> Option<Value> {
    match op {
        BinaryOperator::Multiplication => {
            if let Some(b) = rhs.as_constant() {
                if b == 0.0 {
                    return Some(Value::Constant(0.0));
                }
                if b == 1.0 {
                    return Some(lhs.clone());
                }
                if b == -1.0 {
                    return Some(negate_identity(lhs));
                }
            }
            if let Some(a) = lhs.as_constant() {
                if a == 0.0 {
                    return Some(Value::Constant(0.0));
                }
                if a == 1.0 {
                    return Some(rhs.clone());
                }
                if a == -1.0 {
                    return Some(negate_identity(rhs));
                }
            }
            None
        }
        BinaryOperator::Addition => {
            if rhs.as_constant() == Some(0.0) {
                return Some(lhs.clone());
            }
            if lhs.as_constant() == Some(0.0) {
                return Some(rhs.clone());
            }
            None
        }
        BinaryOperator::Subtraction => {
            if rhs.as_constant() == Some(0.0) {
                return Some(lhs.clone());
            }
            if lhs.as_constant() == Some(0.0) {
                return Some(negate_identity(rhs));
            }
            None
        }
        BinaryOperator::FloatDivision => {
            if let Some(b) = rhs.as_constant() {
                if b == 1.0 {
                    return Some(lhs.clone());
                }
                if b == -1.0 {
                    return Some(negate_identity(lhs));
                }
            }
            None
        }
        BinaryOperator::Power => {
            if rhs.as_constant() == Some(0.0) {
                return Some(Value::Constant(1.0));
            }
            if rhs.as_constant() == Some(1.0) {
                return Some(lhs.clone());
            }
            None
        }
        _ => None,
    }
}

/// Negating a value that is itself a known constant folds directly;
/// otherwise this falls through to emitting a `UnaryOpUGen(Negative)` node
/// via the normal [`emit_unary`] path.
fn negate_identity(value: &Value) -> Value {
    if let Some(c) = value.as_constant() {
        return Value::Constant(-c);
    }
    emit_unary(UnaryOperator::Negative, value.clone())
        .expect("negate_identity used outside an active builder scope")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SynthDefBuilder;
    use crate::rate::ParameterRate;

    #[test]
    fn constant_fold_addition() {
        let result = emit_binary(BinaryOperator::Addition, Value::Constant(2.0), Value::Constant(3.0))
            .unwrap();
        assert_eq!(result.as_constant(), Some(5.0));
    }

    #[test]
    fn multiply_by_zero_identity() {
        SynthDefBuilder::build(None, true, |builder| {
            let freq = builder.add_parameter("freq", &[440.0], ParameterRate::Control, 0.0)?;
            let result = emit_binary(BinaryOperator::Multiplication, freq, Value::Constant(0.0))?;
            assert_eq!(result.as_constant(), Some(0.0));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn multiply_by_one_is_identity_passthrough() {
        SynthDefBuilder::build(None, true, |builder| {
            let freq = builder.add_parameter("freq", &[440.0], ParameterRate::Control, 0.0)?;
            let result = emit_binary(BinaryOperator::Multiplication, freq.clone(), Value::Constant(1.0))?;
            assert!(matches!(result, Value::OutputRef { .. }));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn non_identity_binary_emits_node() {
        SynthDefBuilder::build(None, true, |builder| {
            let freq = builder.add_parameter("freq", &[440.0], ParameterRate::Control, 0.0)?;
            let doubled = emit_binary(BinaryOperator::Multiplication, freq, Value::Constant(2.0))?;
            assert!(!doubled.is_constant());
            Ok(())
        })
        .unwrap();
    }
}
