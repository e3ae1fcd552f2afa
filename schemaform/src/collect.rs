//! Rebuilding the value tree from bound controls.

use serde_json::{Map, Value};

use crate::dom::{ATTR_FIELD_PATH, ATTR_PATH, ATTR_TYPE, ATTR_VARIANT_SELECTOR, Document, NodeId, Widget};
use crate::error::PathError;
use crate::path::{self, Segment};
use crate::schema::ValueType;
use crate::schema::meta::number_value;

/// Collect the current value tree from the controls under the root.
///
/// Every call starts from a fresh empty container, so the result reflects
/// only the live controls. The container is a list when the form's root is an
/// array and an object otherwise. Array fields contribute an empty list first,
/// which keeps arrays without items in the result.
///
/// Numbers are normalised: an integral value collects as a JSON integer even
/// when the bound data held it as a float, so `10.0` reads back as `10`.
pub fn collect(doc: &Document) -> Result<Value, PathError> {
    let mut root = empty_root(doc);
    for node in doc.descendants(doc.root()) {
        let Some(el) = doc.element(node) else {
            continue;
        };
        if let Some(Widget::ArrayField { .. }) = &el.widget {
            if let Some(array_path) = el.attr(ATTR_FIELD_PATH)
                && path::read(&root, array_path).is_none()
            {
                path::write(&mut root, array_path, Value::Array(Vec::new()))?;
            }
            continue;
        }
        if !el.is_control() || el.has_attr(ATTR_VARIANT_SELECTOR) {
            continue;
        }
        let Some(bound) = el.attr(ATTR_PATH) else {
            continue;
        };
        if let Some(value) = control_value(doc, node) {
            path::write(&mut root, bound, value)?;
        }
    }
    Ok(root)
}

/// Fresh root shaped like the first binding in document order.
///
/// An array field bound at the root, or a first path starting with an index,
/// seeds a list. Anything else seeds an object.
fn empty_root(doc: &Document) -> Value {
    let first = doc.descendants(doc.root()).into_iter().find_map(|node| {
        let el = doc.element(node)?;
        match &el.widget {
            Some(Widget::ArrayField { .. }) => el.attr(ATTR_FIELD_PATH).map(|p| (p, true)),
            _ if el.is_control() && !el.has_attr(ATTR_VARIANT_SELECTOR) => {
                el.attr(ATTR_PATH).map(|p| (p, false))
            }
            _ => None,
        }
    });
    let list = first.is_some_and(|(p, array_field)| {
        (array_field && p.is_empty()) || path::segments(p).first().is_some_and(Segment::is_index)
    });
    if list {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Typed value of one bound control, or `None` when it contributes nothing.
///
/// Checkboxes yield their checked state. A select left on its blank option is
/// omitted. Numeric controls parse their text, integral values becoming
/// integers, and are omitted while empty. Other boolean controls compare
/// against `"true"`. Everything else is the raw text.
pub fn control_value(doc: &Document, node: NodeId) -> Option<Value> {
    let el = doc.element(node)?;
    if el.input_type() == "checkbox" {
        return Some(Value::Bool(el.checked()));
    }

    let text = el.value();
    if el.tag == "select" && text.is_empty() {
        return None;
    }
    let ty = el
        .attr(ATTR_TYPE)
        .and_then(ValueType::parse)
        .unwrap_or(ValueType::String);
    match ty {
        ValueType::Number | ValueType::Integer => {
            if text.trim().is_empty() {
                return None;
            }
            match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(number_value(n)),
                _ => {
                    warn!(
                        "`{}` holds non-numeric text {text:?}",
                        el.attr(ATTR_PATH).unwrap_or_default()
                    );
                    Some(Value::Null)
                }
            }
        }
        ValueType::Boolean => Some(Value::Bool(text == "true")),
        ValueType::Json => Some(serde_json::from_str(text).unwrap_or(Value::Null)),
        ValueType::String => Some(Value::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FormOptions;
    use crate::render::Renderer;
    use crate::schema::Schema;
    use serde_json::json;

    fn rendered(schema: Value, value: &Value) -> Document {
        let mut doc = Document::default();
        let options = FormOptions::default();
        let mut ids = 0;
        Renderer::new(&mut doc, &options, &mut ids).render_form(&Schema::parse(&schema), value);
        doc
    }

    fn bound(doc: &Document, path: &str) -> NodeId {
        doc.find(doc.root(), |e| e.attr(ATTR_PATH) == Some(path)).unwrap()
    }

    #[test]
    fn test_round_trip_nested() {
        let schema = json!({"type": "object", "properties": {
            "name": {"type": "string"},
            "age": {"type": "integer", "minimum": 0, "maximum": 120},
            "ratio": {"type": "number"},
            "active": {"type": "boolean"},
            "color": {"type": "string", "enum": ["red", "blue"]},
            "address": {"type": "object", "properties": {
                "street": {"type": "string"},
                "zip": {"type": "string", "maxLength": 400}
            }},
            "lines": {"type": "array", "items": {"type": "object", "properties": {
                "sku": {"type": "string"},
                "qty": {"type": "integer"}
            }}},
            "tags": {"type": "array", "items": {"type": "string"}},
            "empty": {"type": "array", "items": {"type": "string"}}
        }});
        let data = json!({
            "name": "Ada",
            "age": 36,
            "ratio": 0.25,
            "active": true,
            "color": "blue",
            "address": {"street": "Main", "zip": "0150"},
            "lines": [{"sku": "A-1", "qty": 2}, {"sku": "B-2", "qty": 1}],
            "tags": ["x", "y"],
            "empty": []
        });
        let doc = rendered(schema, &data);
        assert_eq!(collect(&doc).unwrap(), data);
    }

    #[test]
    fn test_type_coercion() {
        let mut doc = rendered(
            json!({"type": "object", "properties": {
                "quantity": {"type": "integer"},
                "price": {"type": "number"},
                "flag": {"const": true},
                "tier": {"enum": [1, 2]}
            }}),
            &json!({"quantity": 1, "price": 10}),
        );
        let quantity = bound(&doc, "quantity");
        doc.set_value(quantity, "42");
        let price = bound(&doc, "price");
        doc.set_value(price, "19.99");
        let tier = bound(&doc, "tier");
        doc.set_value(tier, "2");

        let data = collect(&doc).unwrap();
        assert_eq!(data, json!({"quantity": 42, "price": 19.99, "flag": true, "tier": 2}));
        assert!(data["quantity"].is_number());
        assert!(data["flag"].is_boolean());
    }

    #[test]
    fn test_empty_number_is_omitted() {
        let mut doc = rendered(
            json!({"type": "object", "properties": {"n": {"type": "number"}, "s": {"type": "string"}}}),
            &json!({"n": 3, "s": ""}),
        );
        let n = bound(&doc, "n");
        doc.set_value(n, "");
        assert_eq!(collect(&doc).unwrap(), json!({"s": ""}));
    }

    #[test]
    fn test_variant_selector_is_skipped() {
        let doc = rendered(
            json!({"type": "object", "properties": {
                "v": {"anyOf": [{"type": "string"}, {"type": "integer"}]}
            }}),
            &json!({"v": 7}),
        );
        assert_eq!(collect(&doc).unwrap(), json!({"v": 7}));
    }

    #[test]
    fn test_root_array() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        let doc = rendered(schema.clone(), &json!(["A", "B"]));
        assert_eq!(collect(&doc).unwrap(), json!(["A", "B"]));

        let doc = rendered(schema, &json!([]));
        assert_eq!(collect(&doc).unwrap(), json!([]));

        let doc = rendered(
            json!({"type": "array", "items": {"type": "object", "properties": {"n": {"type": "integer"}}}}),
            &json!([{"n": 1}, {"n": 2}]),
        );
        assert_eq!(collect(&doc).unwrap(), json!([{"n": 1}, {"n": 2}]));
    }

    #[test]
    fn test_integral_floats_become_integers() {
        let doc = rendered(
            json!({"type": "object", "properties": {"price": {"type": "number"}}}),
            &json!({"price": 10.0}),
        );
        let data = collect(&doc).unwrap();
        assert_eq!(data, json!({"price": 10}));
        assert!(data["price"].is_i64());
    }

    #[test]
    fn test_blank_selection_is_omitted() {
        let mut doc = rendered(
            json!({"type": "object", "properties": {
                "flag": {"enum": [true, false]},
                "color": {"type": "string", "enum": ["red", "blue"]}
            }}),
            &json!({}),
        );
        assert_eq!(collect(&doc).unwrap(), json!({}));

        let flag = bound(&doc, "flag");
        doc.set_value(flag, "false");
        assert_eq!(collect(&doc).unwrap(), json!({"flag": false}));
    }

    #[test]
    fn test_collect_is_fresh_each_call() {
        let mut doc = rendered(
            json!({"type": "object", "properties": {"a": {"type": "string"}}}),
            &json!({"a": "1"}),
        );
        let first = collect(&doc).unwrap();
        let a = bound(&doc, "a");
        doc.detach(doc.closest(a, |e| e.has_attr(crate::dom::ATTR_FIELD_PATH)).unwrap());
        assert_eq!(first, json!({"a": "1"}));
        assert_eq!(collect(&doc).unwrap(), json!({}));
    }
}
