use std::sync::Arc;

use serde_json::Value;

use super::{Renderer, selectable_variants};
use crate::detect::detect_variant;
use crate::dom::{ATTR_FIELD_PATH, ATTR_VARIANT_SELECTOR, NodeId, Widget};
use crate::schema::meta::literal_text;
use crate::schema::{Schema, ValueType, default_value_for, label_for, variant_label};

impl Renderer<'_> {
    /// Render an `anyOf`/`oneOf` field.
    ///
    /// Unions made only of const alternatives collapse into one bound select.
    /// Others get a variant selector plus a content region holding the fields
    /// of the detected variant.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn union_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        variants: &[Arc<Schema>],
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        if selectable_variants(schema).is_none() {
            return self.const_choice(parent, name, schema, variants, value, path, required);
        }

        let id = self.control_id();
        let shell = self.shell(parent, "union", path);
        self.label(shell, "label", &label_for(name, schema), required, Some(&id));
        self.description(shell, schema);

        let selector = self.doc.append_element(
            shell,
            "select",
            &[
                ("id", id.as_str()),
                ("class", "variant-selector"),
                (crate::dom::ATTR_PATH, path),
                (ATTR_VARIANT_SELECTOR, "true"),
            ],
        );
        for (i, variant) in variants.iter().enumerate() {
            let index = i.to_string();
            let opt = self
                .doc
                .append_element(selector, "option", &[("value", index.as_str())]);
            self.doc.append_text(opt, &variant_label(variant, i));
        }

        let content = self
            .doc
            .append_element(shell, "div", &[("class", "variant-content")]);
        let selected = detect_variant(value, variants);
        self.doc.set_value(selector, &selected.to_string());
        self.doc.set_widget(selector, Widget::VariantSelector { union: shell });
        self.doc.set_widget(
            shell,
            Widget::Union {
                variants: variants.to_vec(),
                content,
                required,
            },
        );

        self.variant_content(content, &variants[selected], selected, value, path, required);
        shell
    }

    #[allow(clippy::too_many_arguments)]
    fn const_choice(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        variants: &[Arc<Schema>],
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let (shell, id) = self.leaf_shell(parent, "enum", name, schema, path, required);
        let literals: Vec<&Value> = variants.iter().filter_map(|v| v.const_value()).collect();
        let select = self.control(
            shell,
            "select",
            &id,
            path,
            ValueType::of_literals(literals.iter().copied()),
            required,
        );
        for variant in variants {
            let Some(literal) = variant.const_value() else {
                continue;
            };
            let text = literal_text(literal);
            let opt = self
                .doc
                .append_element(select, "option", &[("value", text.as_str())]);
            let shown = variant.title.clone().unwrap_or_else(|| text.clone());
            self.doc.append_text(opt, &shown);
        }
        let current = if value.is_null() {
            String::new()
        } else {
            literal_text(value)
        };
        self.doc.set_value(select, &current);
        shell
    }

    /// Render the fields of one variant into `content`.
    ///
    /// Object variants spread their children at `path.child`; any other
    /// variant becomes a single field at `path` itself.
    pub(super) fn variant_content(
        &mut self,
        content: NodeId,
        variant: &Schema,
        index: usize,
        value: &Value,
        path: &str,
        required: bool,
    ) {
        match variant.properties() {
            Some(props) => self.properties(content, variant, props, value, path),
            None => {
                self.field(content, &variant_label(variant, index), variant, value, path, required);
            }
        }
    }

    /// Replace the content of the union at `union` with variant `index`,
    /// populated from that variant's default value.
    pub fn switch_variant(&mut self, union: NodeId, index: usize) -> bool {
        let Some(Widget::Union {
            variants,
            content,
            required,
        }) = self.doc.widget(union).cloned()
        else {
            return false;
        };
        let Some(variant) = variants.get(index) else {
            return false;
        };
        let path = self
            .doc
            .attr(union, ATTR_FIELD_PATH)
            .unwrap_or_default()
            .to_string();

        debug!("switching `{path}` to variant {index}");
        self.doc.clear_children(content);
        let value = default_value_for(variant);
        self.variant_content(content, variant, index, &value, &path, required);
        true
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::dom::{ATTR_PATH, ATTR_VARIANT_SELECTOR, Document, NodeId};
    use crate::options::FormOptions;
    use crate::render::Renderer;
    use crate::schema::Schema;

    fn schema() -> Schema {
        Schema::parse(&json!({
            "type": "object",
            "properties": {
                "contact": {
                    "oneOf": [
                        {"type": "object", "title": "Email", "properties": {
                            "kind": {"const": "email"},
                            "address": {"type": "string"}
                        }},
                        {"type": "object", "title": "Phone", "properties": {
                            "kind": {"const": "phone"},
                            "number": {"type": "string"}
                        }},
                        {"type": "string", "title": "Other"}
                    ]
                },
                "mode": {"anyOf": [{"const": "fast", "title": "Fast"}, {"const": "slow"}]}
            }
        }))
    }

    fn bound(doc: &Document, path: &str) -> Option<NodeId> {
        doc.find(doc.root(), |e| {
            e.attr(ATTR_PATH) == Some(path) && !e.has_attr(ATTR_VARIANT_SELECTOR)
        })
    }

    #[test]
    fn test_detected_variant_is_rendered() {
        let mut doc = Document::default();
        let options = FormOptions::default();
        let mut ids = 0;
        Renderer::new(&mut doc, &options, &mut ids).render_form(
            &schema(),
            &json!({"contact": {"kind": "phone", "number": "555"}, "mode": "slow"}),
        );

        let selector = doc
            .find(doc.root(), |e| e.has_attr(ATTR_VARIANT_SELECTOR))
            .unwrap();
        assert_eq!(doc.value(selector), "1");
        assert_eq!(doc.value(bound(&doc, "contact.number").unwrap()), "555");
        assert_eq!(doc.value(bound(&doc, "contact.kind").unwrap()), "phone");
        assert!(bound(&doc, "contact.address").is_none());

        let mode = bound(&doc, "mode").unwrap();
        assert_eq!(doc.element(mode).unwrap().tag, "select");
        assert_eq!(doc.value(mode), "slow");
        assert!(doc.to_html().contains("<option value=\"fast\">Fast</option>"));
    }

    #[test]
    fn test_switch_discards_old_values() {
        let mut doc = Document::default();
        let options = FormOptions::default();
        let mut ids = 0;
        let mut renderer = Renderer::new(&mut doc, &options, &mut ids);
        renderer.render_form(&schema(), &json!({"contact": {"kind": "email", "address": "a@b"}}));

        let union = renderer
            .doc
            .find(renderer.doc.root(), |e| e.attr("class") == Some("field field-union"))
            .unwrap();
        assert!(renderer.switch_variant(union, 2));
        assert!(!renderer.switch_variant(union, 7));

        let other = bound(renderer.doc, "contact").unwrap();
        assert_eq!(renderer.doc.value(other), "");
        assert!(bound(renderer.doc, "contact.address").is_none());

        assert!(renderer.switch_variant(union, 0));
        let address = bound(renderer.doc, "contact.address").unwrap();
        assert_eq!(renderer.doc.value(address), "");
    }
}
