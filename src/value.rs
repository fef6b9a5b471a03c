//! Value algebra (§4.1): the tagged value tree and the operator mixin that
//! lifts host arithmetic into graph nodes.
//!
//! `Value` deliberately implements no `PartialEq`/`PartialOrd`/`Into<bool>`.
//! That omission *is* the "refuse implicit boolean coercion" rule from
//! spec.md §4.1: there is no expression that type-checks as `if a value {}`,
//! so misuse is rejected at compile time rather than needing a runtime
//! `MisuseInContext` check. Comparisons are exposed as explicit methods
//! (`lt`, `gt`, `le`, `ge`, `eq_signal`, `ne_signal`) that build a signal
//! node, never a host `bool`.
//!
//! Arithmetic operator overloads (`+ - * / %` and unary `-`) call into the
//! active builder implicitly (spec.md §9 "Builder thread-local stack"). They
//! panic if there is no active builder or if an operand crosses scopes,
//! since `std::ops` traits have no channel to return a `Result`; every
//! *explicit* construction path (UGen constructors, `add_parameter`, `build`)
//! returns `Result<_, CompileError>` instead. See DESIGN.md.

use crate::algebra;
use crate::node::NodeId;
use crate::ops::BinaryOperator;

/// A scope-qualified reference to one node's output, or a bare constant, or
/// a flattened collection of either (§3 "Value").
#[derive(Debug, Clone)]
pub enum Value {
    /// A finite 32-bit float, evaluated once at graph-construction time.
    Constant(f32),
    /// One output of a node constructed in builder scope `scope`.
    OutputRef {
        scope: crate::builder::ScopeId,
        node: NodeId,
        output: usize,
    },
    /// An ordered collection, arising only from multichannel expansion.
    /// Never nested at the node-input level (flattened once).
    Vector(Vec<Value>),
}

impl Value {
    pub fn output_ref(scope: crate::builder::ScopeId, node: NodeId, output: usize) -> Value {
        Value::OutputRef {
            scope,
            node,
            output,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<f32> {
        match self {
            Value::Constant(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Value::Vector(_))
    }

    /// Flatten a possibly-nested sequence argument into a single-level
    /// `Vector`, as required before it is handed to an unexpanded port.
    pub fn flatten_sequence(values: Vec<Value>) -> Value {
        let mut flat = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::Vector(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Value::Vector(flat)
    }

    /// Absolute value; folds constants, otherwise emits a unary node.
    pub fn abs(self) -> Value {
        algebra::emit_unary(crate::ops::UnaryOperator::AbsoluteValue, self)
            .expect("Value::abs used outside an active builder scope")
    }

    /// Raise to a power. `a ** 0 == 1`, `a ** 1 == a` fold per §4.1.
    pub fn pow(self, exponent: Value) -> Value {
        algebra::emit_binary(BinaryOperator::Power, self, exponent)
            .expect("Value::pow used outside an active builder scope")
    }

    pub fn min(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::Minimum, self, other)
            .expect("Value::min used outside an active builder scope")
    }

    pub fn max(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::Maximum, self, other)
            .expect("Value::max used outside an active builder scope")
    }

    /// Signal-valued `<`. Produces a comparator node, never a host `bool`.
    pub fn lt(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::LessThan, self, other)
            .expect("Value::lt used outside an active builder scope")
    }

    pub fn gt(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::GreaterThan, self, other)
            .expect("Value::gt used outside an active builder scope")
    }

    pub fn le(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::LessThanOrEqual, self, other)
            .expect("Value::le used outside an active builder scope")
    }

    pub fn ge(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::GreaterThanOrEqual, self, other)
            .expect("Value::ge used outside an active builder scope")
    }

    pub fn eq_signal(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::Equal, self, other)
            .expect("Value::eq_signal used outside an active builder scope")
    }

    pub fn ne_signal(self, other: Value) -> Value {
        algebra::emit_binary(BinaryOperator::NotEqual, self, other)
            .expect("Value::ne_signal used outside an active builder scope")
    }
}

impl From<f32> for Value {
    fn from(constant: f32) -> Value {
        Value::Constant(constant)
    }
}

impl From<f64> for Value {
    fn from(constant: f64) -> Value {
        Value::Constant(constant as f32)
    }
}

impl From<i32> for Value {
    fn from(constant: i32) -> Value {
        Value::Constant(constant as f32)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Value>> core::ops::$trait<T> for Value {
            type Output = Value;

            fn $method(self, rhs: T) -> Value {
                algebra::emit_binary($op, self, rhs.into())
                    .expect(concat!(stringify!($method), " used outside an active builder scope"))
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOperator::Addition);
impl_binary_op!(Sub, sub, BinaryOperator::Subtraction);
impl_binary_op!(Mul, mul, BinaryOperator::Multiplication);
impl_binary_op!(Div, div, BinaryOperator::FloatDivision);
impl_binary_op!(Rem, rem, BinaryOperator::Modulo);

impl core::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        algebra::emit_unary(crate::ops::UnaryOperator::Negative, self)
            .expect("-Value used outside an active builder scope")
    }
}
