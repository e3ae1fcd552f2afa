//! Schema model and JSON Schema parsing.
//!
//! A JSON Schema document is parsed into a [`Schema`] tree once per
//! assignment. Parsing never fails: shapes outside the supported subset
//! degrade to [`SchemaKind::Unknown`], which the renderer shows as a plain
//! text input.
//!
//! ## Supported subset
//!
//! - `type`: `string`, `number`, `integer`, `boolean`, `object`, `array`, `null`
//!   (an array of types uses its first non-`null` entry)
//! - `const`, `enum`, `anyOf`, `oneOf`, single-entry `allOf`
//! - `properties`, `required`, `items`
//! - `title`, `description`, `default`, `format`
//! - `minimum`, `maximum`, `minLength`, `maxLength`, `pattern`, `minItems`, `maxItems`
//! - local `$ref` pointers into the root document

/// Labels, defaults and variant naming derived from schema nodes.
pub mod meta;

use std::sync::Arc;

use serde_json::Value;

pub use meta::{default_value_for, label_for, title_case, variant_label};

/// Nesting limit for `$ref` resolution; deeper references degrade to `Unknown`.
const MAX_REF_DEPTH: usize = 8;

/// Declared JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaType {
    /// Parse a JSON Schema type name.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => SchemaType::String,
            "number" => SchemaType::Number,
            "integer" => SchemaType::Integer,
            "boolean" => SchemaType::Boolean,
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            "null" => SchemaType::Null,
            _ => return None,
        })
    }

    /// The JSON Schema spelling of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::Null => "null",
        }
    }
}

/// Value type attached to a bound control, used to coerce its text back
/// into a typed value on collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
    /// Literal object/array/null values carried as JSON text.
    Json,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Json => "json",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => ValueType::String,
            "number" => ValueType::Number,
            "integer" => ValueType::Integer,
            "boolean" => ValueType::Boolean,
            "json" => ValueType::Json,
            _ => return None,
        })
    }

    /// The narrowest type that holds every literal in `values`.
    pub fn of_literals<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut ty: Option<ValueType> = None;
        for value in values {
            let this = match value {
                Value::String(_) => ValueType::String,
                Value::Number(n) if n.is_f64() => ValueType::Number,
                Value::Number(_) => ValueType::Integer,
                Value::Bool(_) => ValueType::Boolean,
                _ => ValueType::Json,
            };
            ty = Some(match (ty, this) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(ValueType::Integer), ValueType::Number)
                | (Some(ValueType::Number), ValueType::Integer) => ValueType::Number,
                _ => ValueType::Json,
            });
        }
        ty.unwrap_or(ValueType::String)
    }
}

/// Which union keyword declared the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionMode {
    AnyOf,
    OneOf,
}

/// Validation constraints passed through to native controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// Named child of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Arc<Schema>,
}

/// The shape of a schema node. A node is exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Union {
        mode: UnionMode,
        variants: Vec<Arc<Schema>>,
    },
    Const(Value),
    Enum(Vec<Value>),
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object {
        /// `None` when the node declares `type: object` without `properties`.
        properties: Option<Vec<Property>>,
        required: Vec<String>,
    },
    Array {
        items: Arc<Schema>,
    },
    Unknown,
}

/// One parsed schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub format: Option<String>,
    pub declared_type: Option<SchemaType>,
    pub constraints: Constraints,
    pub kind: SchemaKind,
}

impl Default for Schema {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Schema {
    /// A node with no recognized shape.
    pub fn unknown() -> Self {
        Schema {
            title: None,
            description: None,
            default: None,
            format: None,
            declared_type: None,
            constraints: Constraints::default(),
            kind: SchemaKind::Unknown,
        }
    }

    /// Parse a schema document. `$ref` pointers resolve against `root`.
    pub fn parse(root: &Value) -> Self {
        Parser { root }.node(root, 0)
    }

    /// Union variants, `anyOf` taking precedence over `oneOf`.
    pub fn variants(&self) -> Option<&[Arc<Schema>]> {
        match &self.kind {
            SchemaKind::Union { variants, .. } => Some(variants),
            _ => None,
        }
    }

    /// Declared children of an object node.
    pub fn properties(&self) -> Option<&[Property]> {
        match &self.kind {
            SchemaKind::Object {
                properties: Some(props),
                ..
            } => Some(props),
            _ => None,
        }
    }

    /// Whether `name` is listed in this object's required set.
    pub fn is_required(&self, name: &str) -> bool {
        match &self.kind {
            SchemaKind::Object { required, .. } => required.iter().any(|r| r == name),
            _ => false,
        }
    }

    /// Literal value of a const node.
    pub fn const_value(&self) -> Option<&Value> {
        match &self.kind {
            SchemaKind::Const(v) => Some(v),
            _ => None,
        }
    }

    /// Declared type, or the type implied by the node's shape.
    pub fn effective_type(&self) -> Option<SchemaType> {
        if self.declared_type.is_some() {
            return self.declared_type;
        }
        match &self.kind {
            SchemaKind::String => Some(SchemaType::String),
            SchemaKind::Number => Some(SchemaType::Number),
            SchemaKind::Integer => Some(SchemaType::Integer),
            SchemaKind::Boolean => Some(SchemaType::Boolean),
            SchemaKind::Null => Some(SchemaType::Null),
            SchemaKind::Object { .. } => Some(SchemaType::Object),
            SchemaKind::Array { .. } => Some(SchemaType::Array),
            _ => None,
        }
    }
}

impl From<&Value> for Schema {
    fn from(value: &Value) -> Self {
        Schema::parse(value)
    }
}

struct Parser<'a> {
    root: &'a Value,
}

impl Parser<'_> {
    fn node(&self, value: &Value, depth: usize) -> Schema {
        let Some(obj) = value.as_object() else {
            return Schema::unknown();
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            let mut target = self.resolve(reference, depth);
            self.overlay(&mut target, value);
            return target;
        }

        if let Some(Value::Array(all)) = obj.get("allOf")
            && let [single] = all.as_slice()
        {
            let mut target = self.node(single, depth);
            self.overlay(&mut target, value);
            return target;
        }

        let declared_type = match obj.get("type") {
            Some(Value::String(s)) => SchemaType::parse(s),
            Some(Value::Array(types)) => {
                let names: Vec<SchemaType> = types
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(SchemaType::parse)
                    .collect();
                names
                    .iter()
                    .copied()
                    .find(|t| *t != SchemaType::Null)
                    .or_else(|| names.first().copied())
            }
            _ => None,
        };

        let kind = if let Some(Value::Array(list)) = obj.get("anyOf") {
            self.union(UnionMode::AnyOf, list, depth)
        } else if let Some(Value::Array(list)) = obj.get("oneOf") {
            self.union(UnionMode::OneOf, list, depth)
        } else if let Some(c) = obj.get("const") {
            SchemaKind::Const(c.clone())
        } else if let Some(Value::Array(values)) = obj.get("enum") {
            SchemaKind::Enum(values.clone())
        } else {
            self.typed(declared_type, value, depth)
        };

        Schema {
            title: str_field(value, "title"),
            description: str_field(value, "description"),
            default: obj.get("default").cloned(),
            format: str_field(value, "format"),
            declared_type,
            constraints: Constraints {
                minimum: obj.get("minimum").and_then(Value::as_f64),
                maximum: obj.get("maximum").and_then(Value::as_f64),
                min_length: obj.get("minLength").and_then(Value::as_u64),
                max_length: obj.get("maxLength").and_then(Value::as_u64),
                pattern: str_field(value, "pattern"),
                min_items: obj.get("minItems").and_then(Value::as_u64),
                max_items: obj.get("maxItems").and_then(Value::as_u64),
            },
            kind,
        }
    }

    fn union(&self, mode: UnionMode, list: &[Value], depth: usize) -> SchemaKind {
        SchemaKind::Union {
            mode,
            variants: list
                .iter()
                .map(|v| Arc::new(self.node(v, depth)))
                .collect(),
        }
    }

    fn typed(&self, declared: Option<SchemaType>, value: &Value, depth: usize) -> SchemaKind {
        let inferred = declared.or_else(|| {
            if value.get("properties").is_some() {
                Some(SchemaType::Object)
            } else if value.get("items").is_some() {
                Some(SchemaType::Array)
            } else {
                None
            }
        });

        match inferred {
            Some(SchemaType::String) => SchemaKind::String,
            Some(SchemaType::Number) => SchemaKind::Number,
            Some(SchemaType::Integer) => SchemaKind::Integer,
            Some(SchemaType::Boolean) => SchemaKind::Boolean,
            Some(SchemaType::Null) => SchemaKind::Null,
            Some(SchemaType::Object) => {
                let properties = value.get("properties").and_then(Value::as_object).map(|props| {
                    props
                        .iter()
                        .map(|(name, child)| Property {
                            name: name.clone(),
                            schema: Arc::new(self.node(child, depth)),
                        })
                        .collect()
                });
                let required = value
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).map(String::from).collect())
                    .unwrap_or_default();
                SchemaKind::Object {
                    properties,
                    required,
                }
            }
            Some(SchemaType::Array) => SchemaKind::Array {
                items: Arc::new(
                    value
                        .get("items")
                        .map(|items| self.node(items, depth))
                        .unwrap_or_default(),
                ),
            },
            None => SchemaKind::Unknown,
        }
    }

    fn resolve(&self, reference: &str, depth: usize) -> Schema {
        if depth >= MAX_REF_DEPTH {
            warn!("`$ref` {reference} nested deeper than {MAX_REF_DEPTH} levels, rendering as text");
            return Schema::unknown();
        }
        let pointer = reference.strip_prefix('#').unwrap_or(reference);
        match self.root.pointer(pointer) {
            Some(target) => self.node(target, depth + 1),
            None => {
                warn!("unresolved `$ref` {reference}, rendering as text");
                Schema::unknown()
            }
        }
    }

    /// Metadata written next to a `$ref`/`allOf` wins over the target's.
    fn overlay(&self, target: &mut Schema, site: &Value) {
        if let Some(title) = str_field(site, "title") {
            target.title = Some(title);
        }
        if let Some(desc) = str_field(site, "description") {
            target.description = Some(desc);
        }
        if let Some(default) = site.get("default") {
            target.default = Some(default.clone());
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}
