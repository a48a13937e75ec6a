//! Named relations and predicates understood by the search solver.
//!
//! An edge's `rel` text selects a [`Relation`] computing the target value
//! from the source values, in source order. `via` and `index_via` select a
//! [`Predicate`] that every source value, respectively every source search
//! index, must satisfy for the edge to be usable.

use serde_json::{Number, Value};

/// Failure evaluating a relation. Makes the edge unusable for this search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelationError {
    #[error("expected {expected} source(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("expected at least one source")]
    NoSources,

    #[error("source value {value} is not numeric")]
    NotNumeric { value: Value },

    #[error("divide by zero")]
    DivideByZero,

    #[error("result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Identity,
    Sum,
    Product,
    Subtract,
    Divide,
    Negate,
    Mean,
    Max,
    Min,
}

impl Relation {
    /// Looks up a relation by name. Surrounding whitespace is ignored.
    pub fn parse(name: &str) -> Option<Relation> {
        match name.trim() {
            "identity" | "equal" => Some(Relation::Identity),
            "sum" | "add" => Some(Relation::Sum),
            "product" | "multiply" => Some(Relation::Product),
            "subtract" => Some(Relation::Subtract),
            "divide" => Some(Relation::Divide),
            "negate" => Some(Relation::Negate),
            "mean" => Some(Relation::Mean),
            "max" => Some(Relation::Max),
            "min" => Some(Relation::Min),
            _ => None,
        }
    }

    /// Computes the target value from source values in source order.
    ///
    /// Integer operands stay integers for sum, product, subtract, negate,
    /// max and min unless the result overflows `i64`. Divide and mean always
    /// produce floats.
    pub fn evaluate(&self, args: &[Value]) -> Result<Value, RelationError> {
        match self {
            Relation::Identity => match args {
                [only] => Ok(only.clone()),
                _ => Err(RelationError::Arity { expected: 1, got: args.len() }),
            },
            Relation::Negate => match args {
                [only] => match only.as_i64().and_then(i64::checked_neg) {
                    Some(v) => Ok(Value::from(v)),
                    None => float(-as_f64(only)?),
                },
                _ => Err(RelationError::Arity { expected: 1, got: args.len() }),
            },
            Relation::Sum => fold(args, i64::checked_add, |a, b| a + b),
            Relation::Product => fold(args, i64::checked_mul, |a, b| a * b),
            Relation::Subtract => fold(args, i64::checked_sub, |a, b| a - b),
            Relation::Max => fold(args, |a, b| Some(a.max(b)), f64::max),
            Relation::Min => fold(args, |a, b| Some(a.min(b)), f64::min),
            Relation::Divide => {
                let (first, rest) = args.split_first().ok_or(RelationError::NoSources)?;
                let mut acc = as_f64(first)?;
                for arg in rest {
                    let divisor = as_f64(arg)?;
                    if divisor == 0.0 {
                        return Err(RelationError::DivideByZero);
                    }
                    acc /= divisor;
                }
                float(acc)
            }
            Relation::Mean => {
                if args.is_empty() {
                    return Err(RelationError::NoSources);
                }
                let total = args.iter().map(as_f64).sum::<Result<f64, _>>()?;
                float(total / args.len() as f64)
            }
        }
    }
}

/// Left fold over the sources, in integers while every operand is one.
fn fold(
    args: &[Value],
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, RelationError> {
    let (first, rest) = args.split_first().ok_or(RelationError::NoSources)?;

    let ints: Option<Vec<i64>> = args.iter().map(Value::as_i64).collect();
    if let Some(ints) = ints {
        let folded = ints[1..]
            .iter()
            .try_fold(ints[0], |acc, &v| int_op(acc, v));
        if let Some(v) = folded {
            return Ok(Value::from(v));
        }
    }

    let mut acc = as_f64(first)?;
    for arg in rest {
        acc = float_op(acc, as_f64(arg)?);
    }
    float(acc)
}

fn as_f64(value: &Value) -> Result<f64, RelationError> {
    value
        .as_f64()
        .ok_or_else(|| RelationError::NotNumeric { value: value.clone() })
}

fn float(v: f64) -> Result<Value, RelationError> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or(RelationError::NotFinite)
}

/// A condition on source values or source search indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Predicate {
    #[default]
    Always,
    Positive,
    Negative,
    NonNegative,
    Nonzero,
}

impl Predicate {
    pub fn parse(name: &str) -> Option<Predicate> {
        match name.trim() {
            "always" | "true" => Some(Predicate::Always),
            "positive" => Some(Predicate::Positive),
            "negative" => Some(Predicate::Negative),
            "non_negative" => Some(Predicate::NonNegative),
            "nonzero" => Some(Predicate::Nonzero),
            _ => None,
        }
    }

    pub fn holds(&self, x: f64) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Positive => x > 0.0,
            Predicate::Negative => x < 0.0,
            Predicate::NonNegative => x >= 0.0,
            Predicate::Nonzero => x != 0.0,
        }
    }

    /// True when every value is numeric and satisfies the predicate.
    /// `Always` accepts anything, numeric or not.
    pub fn holds_for_values(&self, values: &[Value]) -> bool {
        *self == Predicate::Always
            || values
                .iter()
                .all(|v| v.as_f64().is_some_and(|x| self.holds(x)))
    }

    pub fn holds_for_indices(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&i| self.holds(i as f64))
    }
}
