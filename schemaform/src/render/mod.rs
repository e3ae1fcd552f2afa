//! Schema to element tree rendering.
//!
//! [`Renderer`] turns a `(schema, value, path, required)` tuple into a
//! self-contained subtree, dispatching on the node's shape in this order:
//! union, const, enum, then declared type. Every field starts with a label
//! (required fields get a distinct mark) and, when present, a description.
//!
//! Leaf controls carry the path they bind in [`ATTR_PATH`] and their value
//! type in [`ATTR_TYPE`], which is all the collector needs to rebuild the
//! value tree.

mod array;
mod union;

pub use array::reindex;

use serde_json::Value;

use crate::dom::{ATTR_FIELD_PATH, ATTR_PATH, ATTR_TYPE, Document, NodeId, Widget};
use crate::options::FormOptions;
use crate::path;
use crate::schema::meta::{literal_text, number_text, number_value};
use crate::schema::{
    Property, Schema, SchemaKind, SchemaType, ValueType, default_value_for, label_for,
};

/// Builds fields into a [`Document`].
///
/// Control ids come from a counter owned by the form and reset on every full
/// render, so ids are unique within one pass.
pub struct Renderer<'a> {
    doc: &'a mut Document,
    options: &'a FormOptions,
    next_id: &'a mut usize,
}

impl<'a> Renderer<'a> {
    pub fn new(doc: &'a mut Document, options: &'a FormOptions, next_id: &'a mut usize) -> Self {
        Renderer {
            doc,
            options,
            next_id,
        }
    }

    fn control_id(&mut self) -> String {
        *self.next_id += 1;
        format!("{}-field-{}", self.options.id_prefix, self.next_id)
    }

    /// Render the placeholder shown while no schema is assigned.
    pub fn render_empty(&mut self) {
        let root = self.doc.root();
        self.doc.set_attr(root, "class", "schema-form schema-form-empty");
        let p = self.doc.append_element(root, "p", &[("class", "empty-state")]);
        self.doc.append_text(p, &self.options.empty_text);
    }

    /// Render a whole form for `schema` populated from `value`.
    ///
    /// An object root spreads its children directly into the form, so their
    /// paths start at the child names.
    pub fn render_form(&mut self, schema: &Schema, value: &Value) {
        let root = self.doc.root();
        self.doc.set_attr(root, "class", "schema-form");

        match schema.properties() {
            Some(props) => {
                if let Some(title) = &schema.title {
                    let h = self.doc.append_element(root, "h2", &[("class", "form-title")]);
                    self.doc.append_text(h, title);
                }
                self.description(root, schema);
                self.properties(root, schema, props, value, "");
            }
            None => {
                self.field(root, "", schema, value, "", false);
            }
        }

        if self.options.show_submit {
            let button = self
                .doc
                .append_element(root, "button", &[("type", "submit"), ("class", "submit")]);
            self.doc.append_text(button, &self.options.submit_label);
        }
    }

    /// Render one field for `schema` at `path` under `parent`.
    pub fn field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        match &schema.kind {
            SchemaKind::Union { variants, .. } if !variants.is_empty() => {
                self.union_field(parent, name, schema, variants, value, path, required)
            }
            SchemaKind::Const(literal) => {
                self.const_field(parent, name, schema, literal, path, required)
            }
            SchemaKind::Enum(values) => {
                self.enum_field(parent, name, schema, values, value, path, required)
            }
            SchemaKind::String => self.string_field(parent, name, schema, value, path, required),
            SchemaKind::Number | SchemaKind::Integer => {
                self.number_field(parent, name, schema, value, path, required)
            }
            SchemaKind::Boolean => self.boolean_field(parent, name, schema, value, path, required),
            SchemaKind::Object { properties, .. } => {
                self.object_field(parent, name, schema, properties.as_deref(), value, path, required)
            }
            SchemaKind::Array { items } => {
                self.array_field(parent, name, schema, items, value, path, required)
            }
            SchemaKind::Null => self.null_field(parent, name, schema, path, required),
            SchemaKind::Union { .. } | SchemaKind::Unknown => {
                self.text_field(parent, name, schema, value, path, required)
            }
        }
    }

    fn shell(&mut self, parent: NodeId, kind: &str, path: &str) -> NodeId {
        let class = format!("field field-{kind}");
        self.doc
            .append_element(parent, "div", &[("class", class.as_str()), (ATTR_FIELD_PATH, path)])
    }

    fn label(&mut self, parent: NodeId, tag: &str, text: &str, required: bool, for_id: Option<&str>) {
        let class = if required {
            "field-label required"
        } else {
            "field-label"
        };
        let label = self.doc.append_element(parent, tag, &[("class", class)]);
        if let Some(id) = for_id {
            self.doc.set_attr(label, "for", id);
        }
        self.doc.append_text(label, text);
        if required {
            let mark = self
                .doc
                .append_element(label, "span", &[("class", "required-mark")]);
            self.doc.append_text(mark, "*");
        }
    }

    fn description(&mut self, parent: NodeId, schema: &Schema) {
        if let Some(desc) = &schema.description {
            let p = self
                .doc
                .append_element(parent, "p", &[("class", "field-description")]);
            self.doc.append_text(p, desc);
        }
    }

    /// Shell, label and description shared by single-control fields.
    fn leaf_shell(
        &mut self,
        parent: NodeId,
        kind: &str,
        name: &str,
        schema: &Schema,
        path: &str,
        required: bool,
    ) -> (NodeId, String) {
        let id = self.control_id();
        let shell = self.shell(parent, kind, path);
        self.label(shell, "label", &label_for(name, schema), required, Some(&id));
        self.description(shell, schema);
        (shell, id)
    }

    /// Create a bound control element under `parent`.
    fn control(
        &mut self,
        parent: NodeId,
        tag: &str,
        id: &str,
        path: &str,
        ty: ValueType,
        required: bool,
    ) -> NodeId {
        let el = self.doc.append_element(
            parent,
            tag,
            &[("id", id), ("name", path), (ATTR_PATH, path), (ATTR_TYPE, ty.as_str())],
        );
        if required {
            self.doc.set_attr(el, "required", "");
        }
        el
    }

    fn properties(&mut self, parent: NodeId, owner: &Schema, props: &[Property], value: &Value, path: &str) {
        for prop in props {
            let child_value = value.get(&prop.name).unwrap_or(&Value::Null);
            self.field(
                parent,
                &prop.name,
                &prop.schema,
                child_value,
                &path::join_key(path, &prop.name),
                owner.is_required(&prop.name),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn object_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        properties: Option<&[Property]>,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let set = self.doc.append_element(
            parent,
            "fieldset",
            &[("class", "field field-object"), (ATTR_FIELD_PATH, path)],
        );
        self.label(set, "legend", &label_for(name, schema), required, None);
        self.description(set, schema);

        match properties {
            Some(props) => self.properties(set, schema, props, value, path),
            None => {
                warn!("object schema at `{path}` declares no properties");
                let p = self.doc.append_element(set, "p", &[("class", "schema-error")]);
                self.doc
                    .append_text(p, &format!("Object schema at `{path}` has no properties"));
            }
        }
        set
    }

    fn const_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        literal: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "const", name, schema, path, required);
        let text = literal_text(literal);
        let input = self.control(shell, "input", &id, path, ValueType::of_literals([literal]), false);
        self.doc.set_attr(input, "type", "hidden");
        self.doc.set_value(input, &text);
        let shown = self.doc.append_element(shell, "span", &[("class", "const-value")]);
        self.doc.append_text(shown, &text);
        shell
    }

    #[allow(clippy::too_many_arguments)]
    fn enum_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        values: &[Value],
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "enum", name, schema, path, required);
        let ty = match schema.declared_type {
            Some(SchemaType::String) => ValueType::String,
            Some(SchemaType::Integer) => ValueType::Integer,
            Some(SchemaType::Number) => ValueType::Number,
            Some(SchemaType::Boolean) => ValueType::Boolean,
            _ => ValueType::of_literals(values),
        };
        let select = self.control(shell, "select", &id, path, ty, required);
        let blank = self.doc.append_element(select, "option", &[("value", "")]);
        self.doc.append_text(blank, "-- Select --");
        for v in values {
            let text = literal_text(v);
            let opt = self.doc.append_element(select, "option", &[("value", text.as_str())]);
            self.doc.append_text(opt, &text);
        }
        let current = if value.is_null() {
            String::new()
        } else {
            literal_text(value)
        };
        self.doc.set_value(select, &current);
        shell
    }

    fn string_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "string", name, schema, path, required);
        let rules = &schema.constraints;
        let multiline = rules
            .max_length
            .is_some_and(|max| max > self.options.textarea_threshold);

        let el = if multiline {
            self.control(shell, "textarea", &id, path, ValueType::String, required)
        } else {
            let input = self.control(shell, "input", &id, path, ValueType::String, required);
            let input_type = input_type_for(schema.format.as_deref());
            self.doc.set_attr(input, "type", input_type);
            match input_type {
                "email" => self.doc.set_attr(input, "placeholder", "user@example.com"),
                "url" => self.doc.set_attr(input, "placeholder", "https://example.com"),
                _ => {}
            }
            input
        };

        if let Some(min) = rules.min_length {
            self.doc.set_attr(el, "minlength", &min.to_string());
        }
        if let Some(max) = rules.max_length {
            self.doc.set_attr(el, "maxlength", &max.to_string());
        }
        if let Some(pattern) = &rules.pattern {
            self.doc.set_attr(el, "pattern", pattern);
        }
        self.doc.set_value(el, &string_text(schema, value));
        shell
    }

    fn number_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "number", name, schema, path, required);
        let integer = schema.kind == SchemaKind::Integer;
        let ty = if integer {
            ValueType::Integer
        } else {
            ValueType::Number
        };
        let step = if integer { "1" } else { "any" };
        let (min, max) = (schema.constraints.minimum, schema.constraints.maximum);
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => literal_text(&default_value_for(schema)),
        };

        let ranged = (min.is_some() && max.is_some()) || schema.format.as_deref() == Some("range");
        let parent = if ranged {
            self.doc
                .append_element(shell, "div", &[("class", "range-pair")])
        } else {
            shell
        };

        let slider = ranged.then(|| {
            let slider = self
                .doc
                .append_element(parent, "input", &[("type", "range"), ("name", path)]);
            bounds(self.doc, slider, min, max, step);
            self.doc.set_value(slider, &text);
            slider
        });

        let number = self.control(parent, "input", &id, path, ty, required);
        self.doc.set_attr(number, "type", "number");
        bounds(self.doc, number, min, max, step);
        self.doc.set_value(number, &text);

        if let Some(slider) = slider {
            self.doc.set_widget(slider, Widget::RangeSlider { number });
            self.doc
                .set_widget(number, Widget::RangeNumber { slider, min, max });
        }
        shell
    }

    /// The checkbox itself never carries `required`.
    fn boolean_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "boolean", name, schema, path, required);
        let input = self.control(shell, "input", &id, path, ValueType::Boolean, false);
        self.doc.set_attr(input, "type", "checkbox");
        let checked = match value {
            Value::Bool(b) => *b,
            _ => default_value_for(schema).as_bool().unwrap_or(false),
        };
        self.doc.set_checked(input, checked);
        shell
    }

    fn null_field(&mut self, parent: NodeId, name: &str, schema: &Schema, path: &str, required: bool) -> NodeId {
        let shell = self.shell(parent, "null", path);
        self.label(shell, "span", &label_for(name, schema), required, None);
        let p = self.doc.append_element(shell, "p", &[("class", "null-value")]);
        self.doc.append_text(p, "No value");
        shell
    }

    fn text_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "text", name, schema, path, required);
        let input = self.control(shell, "input", &id, path, ValueType::String, required);
        self.doc.set_attr(input, "type", "text");
        let text = match value {
            Value::Null => String::new(),
            other => literal_text(other),
        };
        self.doc.set_value(input, &text);
        shell
    }
}

/// Native input type for a string `format`.
pub fn input_type_for(format: Option<&str>) -> &'static str {
    match format {
        Some("email") => "email",
        Some("uri") | Some("url") => "url",
        Some("date-time") => "datetime-local",
        Some("date") => "date",
        Some("time") => "time",
        Some("password") => "password",
        _ => "text",
    }
}

fn string_text(schema: &Schema, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => match default_value_for(schema) {
            Value::Null => String::new(),
            other => literal_text(&other),
        },
        other => literal_text(other),
    }
}

fn bounds(doc: &mut Document, el: NodeId, min: Option<f64>, max: Option<f64>, step: &str) {
    if let Some(min) = min {
        doc.set_attr(el, "min", &number_text(min));
    }
    if let Some(max) = max {
        doc.set_attr(el, "max", &number_text(max));
    }
    doc.set_attr(el, "step", step);
}

/// Variants of a union that needs a variant selector, i.e. one that is not
/// made only of const alternatives.
pub(crate) fn selectable_variants(schema: &Schema) -> Option<&[std::sync::Arc<Schema>]> {
    schema
        .variants()
        .filter(|vs| !vs.is_empty() && !vs.iter().all(|v| v.const_value().is_some()))
}

/// JSON number for a clamped control value.
pub(crate) fn clamp_text(text: &str, min: Option<f64>, max: Option<f64>) -> String {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let v = min.map_or(v, |m| v.max(m));
            let v = max.map_or(v, |m| v.min(m));
            match number_value(v) {
                Value::Number(n) => n.to_string(),
                _ => text.to_string(),
            }
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(schema: Value, value: Value) -> Document {
        let mut doc = Document::default();
        let options = FormOptions::default();
        let mut next_id = 0;
        Renderer::new(&mut doc, &options, &mut next_id)
            .render_form(&Schema::parse(&schema), &value);
        doc
    }

    fn control(doc: &Document, path: &str) -> NodeId {
        doc.find(doc.root(), |e| {
            e.attr(ATTR_PATH) == Some(path) && !e.has_attr(crate::dom::ATTR_VARIANT_SELECTOR)
        })
        .unwrap()
    }

    #[test]
    fn test_string_formats() {
        let doc = render(
            json!({"type": "object", "properties": {
                "email": {"type": "string", "format": "email"},
                "site": {"type": "string", "format": "uri"},
                "when": {"type": "string", "format": "date-time"},
                "bio": {"type": "string", "format": "email", "maxLength": 500},
                "code": {"type": "string", "minLength": 2, "maxLength": 8, "pattern": "[A-Z]+"}
            }}),
            json!({"email": "a@b.c"}),
        );
        let email = control(&doc, "email");
        assert_eq!(doc.attr(email, "type"), Some("email"));
        assert_eq!(doc.attr(email, "placeholder"), Some("user@example.com"));
        assert_eq!(doc.value(email), "a@b.c");
        assert_eq!(doc.attr(control(&doc, "site"), "type"), Some("url"));
        assert_eq!(doc.attr(control(&doc, "when"), "type"), Some("datetime-local"));
        assert_eq!(doc.element(control(&doc, "bio")).unwrap().tag, "textarea");
        let code = control(&doc, "code");
        assert_eq!(doc.attr(code, "minlength"), Some("2"));
        assert_eq!(doc.attr(code, "maxlength"), Some("8"));
        assert_eq!(doc.attr(code, "pattern"), Some("[A-Z]+"));
    }

    #[test]
    fn test_range_rendering() {
        let doc = render(
            json!({"type": "object", "properties": {
                "age": {"type": "integer", "minimum": 0, "maximum": 120},
                "price": {"type": "number", "minimum": 0}
            }}),
            json!({"age": 30}),
        );
        let slider = doc
            .find(doc.root(), |e| e.input_type() == "range")
            .unwrap();
        assert_eq!(doc.attr(slider, "min"), Some("0"));
        assert_eq!(doc.attr(slider, "max"), Some("120"));
        assert_eq!(doc.attr(slider, "step"), Some("1"));
        assert_eq!(doc.value(slider), "30");
        let age = control(&doc, "age");
        assert_eq!(doc.attr(age, "type"), Some("number"));
        assert_eq!(doc.value(age), "30");

        let price = control(&doc, "price");
        assert_eq!(doc.attr(price, "type"), Some("number"));
        assert_eq!(doc.attr(price, "step"), Some("any"));
        assert_eq!(doc.attr(price, "min"), Some("0"));
        assert_eq!(doc.attr(price, "max"), None);
        assert_eq!(doc.find_all(doc.root(), |e| e.input_type() == "range").len(), 1);
    }

    #[test]
    fn test_enum_and_const() {
        let doc = render(
            json!({"type": "object", "properties": {
                "color": {"type": "string", "enum": ["red", "green"]},
                "size": {"enum": [1, 2, 3]},
                "version": {"const": 2}
            }}),
            json!({"color": "green"}),
        );
        let color = control(&doc, "color");
        assert_eq!(doc.value(color), "green");
        assert_eq!(doc.find_all(color, |e| e.tag == "option").len(), 3);
        let size = control(&doc, "size");
        assert_eq!(doc.value(size), "");
        assert_eq!(doc.attr(size, ATTR_TYPE), Some("integer"));
        let version = control(&doc, "version");
        assert_eq!(doc.attr(version, "type"), Some("hidden"));
        assert_eq!(doc.value(version), "2");
        assert!(doc.to_html().contains("<span class=\"const-value\">2</span>"));
    }

    #[test]
    fn test_labels_and_required() {
        let doc = render(
            json!({"type": "object", "required": ["firstName"], "properties": {
                "firstName": {"type": "string", "description": "Given name"},
                "nickName": {"type": "string", "title": "Alias"}
            }}),
            json!({}),
        );
        let html = doc.to_html();
        assert!(html.contains("First Name<span class=\"required-mark\">*</span>"));
        assert!(html.contains("<p class=\"field-description\">Given name</p>"));
        assert!(html.contains(">Alias</label>"));
        assert!(doc.element(control(&doc, "firstName")).unwrap().has_attr("required"));
        assert!(!doc.element(control(&doc, "nickName")).unwrap().has_attr("required"));
    }

    #[test]
    fn test_required_mark_on_every_kind() {
        let doc = render(
            json!({"type": "object", "required": ["agree", "version", "nothing"], "properties": {
                "agree": {"type": "boolean"},
                "version": {"const": 2},
                "nothing": {"type": "null"}
            }}),
            json!({}),
        );
        let html = doc.to_html();
        assert_eq!(html.matches("<span class=\"required-mark\">*</span>").count(), 3);
        assert!(html.contains("Agree<span class=\"required-mark\">*</span>"));
        assert!(!doc.element(control(&doc, "agree")).unwrap().has_attr("required"));
        assert!(!doc.element(control(&doc, "version")).unwrap().has_attr("required"));
    }

    #[test]
    fn test_degraded_shapes() {
        let doc = render(
            json!({"type": "object", "properties": {
                "meta": {"type": "object"},
                "blob": {"type": "color"}
            }}),
            json!({"blob": "#fff"}),
        );
        assert!(doc.to_html().contains("Object schema at `meta` has no properties"));
        let blob = control(&doc, "blob");
        assert_eq!(doc.attr(blob, "type"), Some("text"));
        assert_eq!(doc.value(blob), "#fff");
    }

    #[test]
    fn test_nested_object_paths() {
        let doc = render(
            json!({"type": "object", "properties": {
                "address": {"type": "object", "required": ["city"], "properties": {
                    "city": {"type": "string"}
                }}
            }}),
            json!({"address": {"city": "Oslo"}}),
        );
        let city = control(&doc, "address.city");
        assert_eq!(doc.value(city), "Oslo");
        assert!(doc.element(city).unwrap().has_attr("required"));
    }

    #[test]
    fn test_ids_are_unique() {
        let doc = render(
            json!({"type": "object", "properties": {
                "a": {"type": "string"}, "b": {"type": "string"}, "c": {"type": "boolean"}
            }}),
            json!({}),
        );
        let ids: Vec<&str> = doc
            .find_all(doc.root(), |e| e.is_control())
            .into_iter()
            .filter_map(|n| doc.attr(n, "id"))
            .collect();
        assert_eq!(ids, vec!["sf-field-1", "sf-field-2", "sf-field-3"]);
    }

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text("150", Some(0.0), Some(120.0)), "120");
        assert_eq!(clamp_text("-1", Some(0.0), Some(120.0)), "0");
        assert_eq!(clamp_text("2.5", Some(0.0), Some(120.0)), "2.5");
        assert_eq!(clamp_text("", Some(0.0), Some(120.0)), "");
    }
}
