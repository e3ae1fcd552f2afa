use serde_json::{Map, Number, Value};

use super::{Schema, SchemaKind, SchemaType};

/// Property names treated as variant tags when labelling object variants.
const TAG_FIELDS: [&str; 3] = ["type", "kind", "_type"];

/// Label for a field: the schema title, or the field name in Title Case.
pub fn label_for(name: &str, schema: &Schema) -> String {
    match &schema.title {
        Some(title) => title.clone(),
        None => title_case(name),
    }
}

/// Convert a camelCase or snake_case name into space separated Title Case.
///
/// ```
/// assert_eq!(schemaform::schema::title_case("hourlyRate"), "Hourly Rate");
/// assert_eq!(schemaform::schema::title_case("first_name"), "First Name");
/// ```
pub fn title_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            continue;
        }
        if c.is_uppercase() && !word.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                words.push(std::mem::take(&mut word));
            }
        }
        word.push(c);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
        .iter()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Initial value for a freshly created field.
///
/// An explicit `default` wins. Const nodes yield their literal. Otherwise the
/// zero value of the type: `""`, `minimum` or `0`, `false`, `[]`, or an object
/// of each child's own default. Nodes without a type yield `null`.
pub fn default_value_for(schema: &Schema) -> Value {
    if let Some(default) = &schema.default {
        return default.clone();
    }
    if let SchemaKind::Const(value) = &schema.kind {
        return value.clone();
    }
    match schema.effective_type() {
        Some(SchemaType::String) => Value::String(String::new()),
        Some(SchemaType::Number) | Some(SchemaType::Integer) => {
            number_value(schema.constraints.minimum.unwrap_or(0.0))
        }
        Some(SchemaType::Boolean) => Value::Bool(false),
        Some(SchemaType::Array) => Value::Array(Vec::new()),
        Some(SchemaType::Object) => {
            let mut map = Map::new();
            for prop in schema.properties().unwrap_or_default() {
                map.insert(prop.name.clone(), default_value_for(&prop.schema));
            }
            Value::Object(map)
        }
        Some(SchemaType::Null) | None => Value::Null,
    }
}

/// Display label of a union variant. `index` is zero-based.
pub fn variant_label(variant: &Schema, index: usize) -> String {
    if let Some(title) = &variant.title {
        return title.clone();
    }
    if let Some(value) = variant.const_value() {
        return literal_text(value);
    }
    if let Some(props) = variant.properties() {
        let tag = TAG_FIELDS.iter().find_map(|tag| {
            props
                .iter()
                .find(|p| p.name == *tag)
                .and_then(|p| p.schema.const_value())
        });
        if let Some(tag) = tag {
            return literal_text(tag);
        }
    }
    match variant.effective_type() {
        Some(ty) if ty != SchemaType::Object => ty.as_str().to_string(),
        _ => format!("Option {}", index + 1),
    }
}

/// Text form of a literal: strings verbatim, everything else as JSON.
pub fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON number for `n`, integral values kept as integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Attribute text for a number, without a trailing `.0` on integral values.
pub fn number_text(n: f64) -> String {
    match number_value(n) {
        Value::Number(num) => num.to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("firstName"), "First Name");
        assert_eq!(title_case("hourly_rate"), "Hourly Rate");
        assert_eq!(title_case("URLPath"), "URL Path");
        assert_eq!(title_case("item2Name"), "Item2 Name");
        assert_eq!(title_case("name"), "Name");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_label_prefers_title() {
        let s = Schema::parse(&json!({"type": "string", "title": "Full name"}));
        assert_eq!(label_for("fullName", &s), "Full name");
        let s = Schema::parse(&json!({"type": "string"}));
        assert_eq!(label_for("fullName", &s), "Full Name");
    }

    #[test]
    fn test_default_values() {
        let d = |v| default_value_for(&Schema::parse(&v));
        assert_eq!(d(json!({"type": "string"})), json!(""));
        assert_eq!(d(json!({"type": "string", "default": "hi"})), json!("hi"));
        assert_eq!(d(json!({"type": "integer"})), json!(0));
        assert_eq!(d(json!({"type": "number", "minimum": 5})), json!(5));
        assert_eq!(d(json!({"type": "number", "minimum": 0.5})), json!(0.5));
        assert_eq!(d(json!({"type": "boolean"})), json!(false));
        assert_eq!(d(json!({"type": "array", "items": {"type": "string"}})), json!([]));
        assert_eq!(d(json!({"const": "product"})), json!("product"));
        assert_eq!(d(json!({"anyOf": [{"type": "string"}]})), Value::Null);
        assert_eq!(d(json!({})), Value::Null);
        assert_eq!(
            d(json!({
                "type": "object",
                "properties": {
                    "type": {"const": "service"},
                    "name": {"type": "string"},
                    "hourlyRate": {"type": "number"},
                    "tags": {"type": "array"}
                }
            })),
            json!({"type": "service", "name": "", "hourlyRate": 0, "tags": []})
        );
    }

    #[test]
    fn test_variant_labels() {
        let label = |v, i| variant_label(&Schema::parse(&v), i);
        assert_eq!(label(json!({"title": "Product", "type": "object"}), 0), "Product");
        assert_eq!(label(json!({"const": "red"}), 0), "red");
        assert_eq!(label(json!({"const": 3}), 0), "3");
        assert_eq!(label(json!({"type": "string"}), 0), "string");
        assert_eq!(
            label(
                json!({"type": "object", "properties": {"kind": {"const": "text"}}}),
                0
            ),
            "text"
        );
        assert_eq!(
            label(json!({"type": "object", "properties": {"a": {"type": "string"}}}), 2),
            "Option 3"
        );
        assert_eq!(label(json!({}), 0), "Option 1");
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text(0.0), "0");
        assert_eq!(number_text(120.0), "120");
        assert_eq!(number_text(-2.5), "-2.5");
    }
}
