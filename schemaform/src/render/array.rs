//! Array fields and the ordered item list behind them.
//!
//! Items are positional: each carries its index in [`ATTR_INDEX`] and every
//! path below it embeds that index. After an append or a removal the list is
//! re-indexed so indices stay dense from 0, which the collector relies on.

use std::sync::Arc;

use serde_json::Value;

use super::{Renderer, selectable_variants};
use crate::detect::detect_variant;
use crate::dom::{ATTR_FIELD_PATH, ATTR_INDEX, ATTR_VARIANT, Document, NodeId, PATH_ATTRS, Widget};
use crate::path;
use crate::schema::{Schema, default_value_for, label_for, variant_label};

const ATTR_VARIANT_LABEL: &str = "data-variant-label";

impl Renderer<'_> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn array_field(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: &Schema,
        items: &Arc<Schema>,
        value: &Value,
        path: &str,
        required: bool,
    ) -> NodeId {
        let set = self.doc.append_element(
            parent,
            "fieldset",
            &[("class", "field field-array"), (ATTR_FIELD_PATH, path)],
        );
        self.label(set, "legend", &label_for(name, schema), required, None);
        self.description(set, schema);

        let list = self.doc.append_element(set, "div", &[("class", "array-items")]);
        let variants = selectable_variants(items);
        if let Some(elements) = value.as_array() {
            for (i, element) in elements.iter().enumerate() {
                let variant = variants.map(|vs| detect_variant(element, vs));
                self.array_item(list, items, element, path, i, variant);
            }
        }

        let controls = self
            .doc
            .append_element(set, "div", &[("class", "array-controls")]);
        let picker = variants.map(|vs| {
            let picker = self
                .doc
                .append_element(controls, "select", &[("class", "variant-picker")]);
            for (i, v) in vs.iter().enumerate() {
                let index = i.to_string();
                let opt = self
                    .doc
                    .append_element(picker, "option", &[("value", index.as_str())]);
                self.doc.append_text(opt, &variant_label(v, i));
            }
            self.doc.set_value(picker, "0");
            self.doc.set_widget(picker, Widget::VariantPicker);
            picker
        });
        let add_label = if picker.is_some() {
            &self.options.add_variant_label
        } else {
            &self.options.add_label
        };
        let add = self.doc.append_element(
            controls,
            "button",
            &[("type", "button"), ("class", "add-item")],
        );
        self.doc.append_text(add, add_label);
        self.doc.set_widget(add, Widget::AddItem { field: set });

        let rules = &schema.constraints;
        let limits: Vec<String> = [("Min items", rules.min_items), ("Max items", rules.max_items)]
            .into_iter()
            .filter_map(|(label, n)| n.map(|n| format!("{label}: {n}")))
            .collect();
        if !limits.is_empty() {
            let small = self
                .doc
                .append_element(set, "small", &[("class", "array-constraints")]);
            self.doc.append_text(small, &limits.join(", "));
        }

        self.doc.set_widget(
            set,
            Widget::ArrayField {
                items: items.clone(),
                max_items: rules.max_items,
                list,
                picker,
            },
        );
        set
    }

    /// Render element `index` of the array at `array_path` into `list`.
    ///
    /// `variant` selects the union arm for union-typed items.
    fn array_item(
        &mut self,
        list: NodeId,
        items: &Schema,
        value: &Value,
        array_path: &str,
        index: usize,
        variant: Option<usize>,
    ) -> NodeId {
        let item_path = path::join_index(array_path, index);
        let position = index.to_string();
        let item = self.doc.append_element(
            list,
            "div",
            &[
                ("class", "array-item"),
                (ATTR_INDEX, position.as_str()),
                (ATTR_FIELD_PATH, item_path.as_str()),
            ],
        );
        self.doc.set_widget(item, Widget::ArrayItem);

        let header = self
            .doc
            .append_element(item, "div", &[("class", "array-item-header")]);
        let label = self
            .doc
            .append_element(header, "span", &[("class", "array-item-label")]);
        let remove = self.doc.append_element(
            header,
            "button",
            &[("type", "button"), ("class", "remove-item")],
        );
        self.doc.append_text(remove, &self.options.remove_label);
        self.doc.set_widget(remove, Widget::RemoveItem { item });

        match (selectable_variants(items), variant) {
            (Some(variants), Some(v)) if v < variants.len() => {
                let arm = &variants[v];
                let arm_label = variant_label(arm, v);
                self.doc.set_attr(item, ATTR_VARIANT, &v.to_string());
                self.doc.set_attr(item, ATTR_VARIANT_LABEL, &arm_label);
                self.variant_content(item, arm, v, value, &item_path, false);
            }
            _ => {
                self.field(item, "item", items, value, &item_path, false);
            }
        }
        let text = item_label(self.doc, item, index);
        self.doc.set_text(label, &text);
        item
    }

    /// Append a default item to the array field `field`.
    ///
    /// Returns `false` without touching the list when it already holds
    /// `maxItems` items.
    pub fn append_item(&mut self, field: NodeId) -> bool {
        let Some(Widget::ArrayField {
            items,
            max_items,
            list,
            picker,
        }) = self.doc.widget(field).cloned()
        else {
            return false;
        };

        let count = item_nodes(self.doc, list).len();
        let array_path = self
            .doc
            .attr(field, ATTR_FIELD_PATH)
            .unwrap_or_default()
            .to_string();
        if let Some(max) = max_items
            && count as u64 >= max
        {
            debug!("`{array_path}` already holds {max} items, not appending");
            return false;
        }

        let (value, variant) = match selectable_variants(&items) {
            Some(variants) => {
                let chosen = picker
                    .and_then(|p| self.doc.value(p).parse::<usize>().ok())
                    .filter(|v| *v < variants.len())
                    .unwrap_or(0);
                (default_value_for(&variants[chosen]), Some(chosen))
            }
            None => (default_value_for(&items), None),
        };

        self.array_item(list, &items, &value, &array_path, count, variant);
        reindex(self.doc, field);
        true
    }
}

fn item_nodes(doc: &Document, list: NodeId) -> Vec<NodeId> {
    doc.children(list)
        .iter()
        .copied()
        .filter(|c| matches!(doc.widget(*c), Some(Widget::ArrayItem)))
        .collect()
}

fn item_label(doc: &Document, item: NodeId, index: usize) -> String {
    match doc.attr(item, ATTR_VARIANT_LABEL) {
        Some(arm) => format!("#{} {arm}", index + 1),
        None => format!("#{}", index + 1),
    }
}

/// Renumber the items of the array field `field` contiguously from 0.
///
/// Every path attribute below a moved item has its index segment rewritten,
/// along with the item's own index and header label.
pub fn reindex(doc: &mut Document, field: NodeId) {
    let Some(Widget::ArrayField { list, .. }) = doc.widget(field) else {
        return;
    };
    let list = *list;
    let array_path = doc
        .attr(field, ATTR_FIELD_PATH)
        .unwrap_or_default()
        .to_string();

    for (new, item) in item_nodes(doc, list).into_iter().enumerate() {
        let old = doc
            .attr(item, ATTR_INDEX)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(new);
        if old != new {
            trace!("`{array_path}` item {old} -> {new}");
            let nodes: Vec<NodeId> = std::iter::once(item).chain(doc.descendants(item)).collect();
            for node in nodes {
                for attr in PATH_ATTRS {
                    let rewritten = doc
                        .attr(node, attr)
                        .and_then(|p| path::reindex(p, &array_path, old, new));
                    if let Some(p) = rewritten {
                        doc.set_attr(node, attr, &p);
                    }
                }
            }
            doc.set_attr(item, ATTR_INDEX, &new.to_string());
        }

        let header_label = doc
            .children(item)
            .iter()
            .copied()
            .find(|c| doc.attr(*c, "class") == Some("array-item-header"))
            .and_then(|h| doc.children(h).first().copied());
        if let Some(label) = header_label {
            let text = item_label(doc, item, new);
            doc.set_text(label, &text);
        }
    }
}
