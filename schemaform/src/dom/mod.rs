//! Element arena standing in for the browser document.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. A render pass builds a
//! fresh [`Document`]; structural edits afterwards detach nodes rather than
//! free them, so ids handed out during a pass stay valid until the next
//! full render replaces the whole document.
//!
//! Interactive elements carry a [`Widget`] describing what happens when the
//! user edits or activates them. The form component dispatches on it.

/// HTML serialization.
pub mod html;

use std::sync::Arc;

use crate::schema::Schema;
use crate::schema::meta::number_text;

/// Marks a control bound to a value tree location.
pub const ATTR_PATH: &str = "data-path";
/// Declared value type of a bound control.
pub const ATTR_TYPE: &str = "data-type";
/// Marks union selectors, which are metadata rather than data.
pub const ATTR_VARIANT_SELECTOR: &str = "data-variant-selector";
/// Path of a non-control container (object, array, union, array item).
pub const ATTR_FIELD_PATH: &str = "data-field-path";
/// Position of an array item inside its list.
pub const ATTR_INDEX: &str = "data-index";
/// Selected variant index of a union-typed array item.
pub const ATTR_VARIANT: &str = "data-variant";

/// Attributes that hold paths and are rewritten on re-indexing.
pub const PATH_ATTRS: [&str; 3] = [ATTR_PATH, ATTR_FIELD_PATH, "name"];

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavior attached to an element.
#[derive(Debug, Clone)]
pub enum Widget {
    /// Array field container.
    ArrayField {
        items: Arc<Schema>,
        max_items: Option<u64>,
        /// Element holding the rendered items in order.
        list: NodeId,
        /// Variant picker for union-typed items.
        picker: Option<NodeId>,
    },
    /// One rendered array element.
    ArrayItem,
    /// Appends an item to the array field.
    AddItem { field: NodeId },
    /// Removes the item it belongs to.
    RemoveItem { item: NodeId },
    /// Chooses the variant of the next appended union item.
    VariantPicker,
    /// Union field container.
    Union {
        variants: Vec<Arc<Schema>>,
        /// Region holding the selected variant's fields.
        content: NodeId,
        required: bool,
    },
    /// Switches the variant of the union it belongs to.
    VariantSelector { union: NodeId },
    /// Slider half of a range pair.
    RangeSlider { number: NodeId },
    /// Number half of a range pair, clamped on edit.
    RangeNumber {
        slider: NodeId,
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// Element payload.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    /// Live `value` of inputs, selects and text areas.
    value: String,
    /// Live `checked` state of checkboxes.
    checked: bool,
    pub widget: Option<Widget>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            value: String::new(),
            checked: false,
            widget: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Whether the element is an input, select or text area.
    pub fn is_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// `type` of an input element.
    pub fn input_type(&self) -> &str {
        if self.tag == "input" {
            self.attr("type").unwrap_or("text")
        } else {
            ""
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A tree of elements and text rooted at a single `form` element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("form")
    }
}

impl Document {
    /// Create a document whose root element has tag `root_tag`.
    pub fn new(root_tag: &str) -> Self {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element(Element::new(root_tag)),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node id by its raw index.
    pub fn node(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(tag)))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (k, v) in attrs {
            self.set_attr(id, k, v);
        }
        self.append(parent, id);
        id
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeData::Text(text.to_string()));
        self.append(parent, id);
        id
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove `node` from its parent. The subtree stays intact but unreachable.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Detach every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Whether `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// All descendants of `node` in document order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First descendant of `node`, in document order, satisfying `pred`.
    pub fn find(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(&pred))
    }

    /// All descendants of `node` satisfying `pred`.
    pub fn find_all(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(&pred))
            .collect()
    }

    /// Nearest ancestor-or-self satisfying `pred`.
    pub fn closest(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.element(id).is_some_and(&pred) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.set_attr(name, value);
        }
    }

    pub fn set_widget(&mut self, node: NodeId, widget: Widget) {
        if let Some(e) = self.element_mut(node) {
            e.widget = Some(widget);
        }
    }

    pub fn widget(&self, node: NodeId) -> Option<&Widget> {
        self.element(node)?.widget.as_ref()
    }

    /// Live value of a control.
    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(Element::value).unwrap_or_default()
    }

    /// Set a control's live value, applying native sanitization.
    ///
    /// Range inputs clamp to `min`/`max` (defaults 0 and 100) and snap to
    /// `step`. Selects fall back to their first option when no option carries
    /// `value`.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        let Some(el) = self.element(node) else {
            return;
        };
        let sanitized = match el.tag.as_str() {
            "input" if el.input_type() == "range" => sanitize_range(el, value),
            "select" => {
                let options = self.find_all(node, |e| e.tag == "option");
                let known = options
                    .iter()
                    .any(|o| self.attr(*o, "value") == Some(value));
                if known {
                    value.to_string()
                } else {
                    options
                        .first()
                        .and_then(|o| self.attr(*o, "value"))
                        .unwrap_or_default()
                        .to_string()
                }
            }
            _ => value.to_string(),
        };
        if let Some(el) = self.element_mut(node) {
            el.value = sanitized;
        }
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(Element::checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(node) {
            el.checked = checked;
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        std::iter::once(node)
            .chain(self.descendants(node))
            .filter_map(|id| match &self.nodes[id.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                NodeData::Element(_) => None,
            })
            .collect()
    }

    /// Replace the text children of `node` with `text`.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        self.append_text(node, text);
    }
}

fn sanitize_range(el: &Element, value: &str) -> String {
    let min = el.attr("min").and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.0);
    let max = el
        .attr("max")
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(100.0)
        .max(min);
    let parsed = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(min + (max - min) / 2.0);
    let mut v = parsed.clamp(min, max);
    if let Some(step) = el.attr("step").and_then(|s| s.parse::<f64>().ok())
        && step > 0.0
    {
        v = (min + ((v - min) / step).round() * step).min(max);
    }
    number_text(v)
}
