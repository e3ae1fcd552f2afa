//! Runtime detection of which union variant a value belongs to.
//!
//! The value tree carries no tag recording which `anyOf`/`oneOf` arm produced
//! it, so the arm is re-derived from the value's shape on every render:
//!
//! 1. const pass: a variant whose `const` equals the value wins immediately;
//! 2. shape pass, in order, skipping const variants: primitive kinds must agree
//!    with the declared type; object variants that declare const-valued children
//!    (discriminators) match only when one of those children matches, other
//!    object variants match when the value carries every declared child.
//!
//! Nothing matching, or a `null` value, selects variant 0.

use std::sync::Arc;

use serde_json::Value;

use crate::schema::{Schema, SchemaType};

/// Index of the variant best matching `value`.
pub fn detect_variant(value: &Value, variants: &[Arc<Schema>]) -> usize {
    if value.is_null() {
        return 0;
    }

    if let Some(i) = variants
        .iter()
        .position(|v| v.const_value().is_some_and(|c| values_equal(c, value)))
    {
        return i;
    }

    variants
        .iter()
        .position(|v| v.const_value().is_none() && shape_matches(value, v))
        .unwrap_or(0)
}

fn shape_matches(value: &Value, variant: &Schema) -> bool {
    match (variant.effective_type(), value) {
        (Some(SchemaType::String), Value::String(_)) => true,
        (Some(SchemaType::Number), Value::Number(_)) => true,
        (Some(SchemaType::Integer), Value::Number(n)) => is_integral(n),
        (Some(SchemaType::Boolean), Value::Bool(_)) => true,
        (Some(SchemaType::Array), Value::Array(_)) => true,
        (Some(SchemaType::Object), Value::Object(map)) => {
            let Some(props) = variant.properties() else {
                return true;
            };
            let mut discriminators = props
                .iter()
                .filter_map(|p| p.schema.const_value().map(|c| (&p.name, c)))
                .peekable();
            if discriminators.peek().is_some() {
                return discriminators
                    .any(|(name, c)| map.get(name).is_some_and(|v| values_equal(v, c)));
            }
            props.iter().all(|p| map.contains_key(&p.name))
        }
        _ => false,
    }
}

fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Strict equality on literals. Numbers compare by value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}
