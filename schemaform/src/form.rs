//! The form component.
//!
//! [`SchemaForm`] owns the current schema and data, rebuilds its document
//! when either is assigned, and turns user interactions into notifications.
//!
//! Assignments only schedule a render; the pending render runs on the next
//! [`SchemaForm::flush`], so setting the schema and then the data costs one
//! rebuild. Every rebuild replaces the whole document.
//!
//! ```
//! use schemaform::{FormEvent, SchemaForm};
//! use serde_json::json;
//!
//! let mut form = SchemaForm::new();
//! form.set_schema(&json!({
//!     "type": "object",
//!     "properties": {"quantity": {"type": "integer"}}
//! }));
//! form.set_data(json!({"quantity": 1}));
//! form.flush();
//!
//! form.on(|event| {
//!     if let FormEvent::Changed(data) = event {
//!         println!("now {data}");
//!     }
//! });
//! form.input_path("quantity", "42").unwrap();
//! assert_eq!(form.get_data().unwrap(), json!({"quantity": 42}));
//! ```

use std::{path::Path, sync::Arc};

use anyhow::bail;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collect::collect;
use crate::dom::{ATTR_FIELD_PATH, ATTR_PATH, ATTR_VARIANT_SELECTOR, Document, NodeId, Widget};
use crate::error::FormError;
use crate::options::FormOptions;
use crate::render::{Renderer, clamp_text, reindex};
use crate::schema::Schema;
use crate::{source, validity};

/// Callback receiving form notifications.
pub type EventCallback = Arc<dyn Fn(&FormEvent) + Send + Sync>;

/// Notifications raised by the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A bound control was edited. Carries freshly collected data.
    Changed(Value),
    /// The form was submitted. Carries freshly collected data.
    Submitted(Value),
    /// An array item was added or removed.
    StructureChanged,
}

impl FormEvent {
    /// Event name as seen by a host page.
    pub fn name(&self) -> &'static str {
        match self {
            FormEvent::Changed(_) => "form-change",
            FormEvent::Submitted(_) => "form-submit",
            FormEvent::StructureChanged => "structure-change",
        }
    }
}

/// Lifecycle state of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No schema assigned; only the empty-state placeholder is shown.
    Uninitialized,
    /// A schema is assigned and the document is built from it.
    Rendered,
}

/// A form rendered from a JSON Schema and bound to a value tree.
pub struct SchemaForm {
    schema: Option<Arc<Schema>>,
    data: Value,
    options: FormOptions,
    document: Document,
    next_id: usize,
    render_pending: bool,
    renders: usize,
    listeners: Vec<EventCallback>,
}

impl Default for SchemaForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaForm {
    /// Create an uninitialized form with default options.
    pub fn new() -> Self {
        Self::with_options(FormOptions::default())
    }

    /// Create an uninitialized form.
    pub fn with_options(options: FormOptions) -> Self {
        let mut form = SchemaForm {
            schema: None,
            data: Value::Null,
            options,
            document: Document::default(),
            next_id: 0,
            render_pending: false,
            renders: 0,
            listeners: Vec::new(),
        };
        form.rebuild();
        form
    }

    /// Build a rendered form for the Rust type `T`.
    pub fn for_type<T: JsonSchema>() -> anyhow::Result<Self> {
        let schema = schemars::schema_for!(T);
        let schema_json = serde_json::to_value(&schema)?;
        let mut form = Self::new();
        form.set_schema(&schema_json);
        form.flush();
        Ok(form)
    }

    /// Build a rendered form from a data file and a schema file.
    ///
    /// When `schema` is not given it is derived from the data path; see
    /// [`source::default_schema_path`]. A missing data file renders defaults.
    pub fn from_files(data: impl AsRef<Path>, schema: Option<impl AsRef<Path>>) -> anyhow::Result<Self> {
        let data = data.as_ref();
        let schema_path = match schema {
            Some(s) => s.as_ref().to_path_buf(),
            None => source::default_schema_path(data),
        };
        if !schema_path.exists() {
            bail!("Schema file does not exist: {}", schema_path.display());
        }

        let mut form = Self::new();
        form.set_schema(&source::load_value(&schema_path)?);
        if data.exists() {
            form.set_data(source::load_value(data)?);
        }
        form.flush();
        info!("loaded form from {}", schema_path.display());
        Ok(form)
    }

    /// Assign a new schema and schedule a render.
    pub fn set_schema(&mut self, schema: impl Into<Schema>) {
        self.schema = Some(Arc::new(schema.into()));
        self.schedule();
    }

    /// Assign new data and schedule a render.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
        self.schedule();
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    /// The last assigned data, not reflecting edits since.
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn state(&self) -> FormState {
        if self.schema.is_some() {
            FormState::Rendered
        } else {
            FormState::Uninitialized
        }
    }

    fn schedule(&mut self) {
        if self.render_pending {
            trace!("render already pending");
        }
        self.render_pending = true;
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_pending
    }

    /// Number of render passes run since creation, the initial one excluded.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Run the pending render, if any. Returns whether a pass ran.
    pub fn flush(&mut self) -> bool {
        if !self.render_pending {
            return false;
        }
        self.render_pending = false;
        self.renders += 1;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        let mut document = Document::default();
        self.next_id = 0;
        let mut renderer = Renderer::new(&mut document, &self.options, &mut self.next_id);
        match &self.schema {
            Some(schema) => {
                debug!("render pass {}", self.renders);
                renderer.render_form(schema, &self.data);
            }
            None => renderer.render_empty(),
        }
        self.document = document;
    }

    /// Collect the current data from the live controls.
    pub fn get_data(&self) -> Result<Value, FormError> {
        Ok(collect(&self.document)?)
    }

    /// Deserialize the current data into `T`.
    pub fn get_typed<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_value(self.get_data()?)?)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialize the live document to HTML.
    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    /// Register a notification callback.
    pub fn add_listener(&mut self, callback: EventCallback) {
        self.listeners.push(callback);
    }

    /// Register a notification closure.
    pub fn on(&mut self, callback: impl Fn(&FormEvent) + Send + Sync + 'static) {
        self.add_listener(Arc::new(callback));
    }

    fn emit(&self, event: FormEvent) {
        trace!("emit {}", event.name());
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn live(&self, node: NodeId) -> Result<(), FormError> {
        if self.document.element(node).is_some() && self.document.is_connected(node) {
            Ok(())
        } else {
            Err(FormError::UnknownNode(node.index()))
        }
    }

    fn renderer(&mut self) -> Renderer<'_> {
        Renderer::new(&mut self.document, &self.options, &mut self.next_id)
    }

    /// Type `text` into the control `node`, as a user edit.
    ///
    /// Runs the control's behavior (range pairing, variant switching) and
    /// emits [`FormEvent::Changed`] for bound controls.
    pub fn input(&mut self, node: NodeId, text: &str) -> Result<(), FormError> {
        self.live(node)?;
        let Some(el) = self.document.element(node) else {
            return Err(FormError::UnknownNode(node.index()));
        };
        if !el.is_control() || el.input_type() == "checkbox" || el.input_type() == "hidden" {
            return Err(FormError::Unsupported {
                node: node.index(),
                action: "text input",
            });
        }
        let bound = el.has_attr(ATTR_PATH);
        let widget = el.widget.clone();

        self.document.set_value(node, text);
        match widget {
            Some(Widget::RangeSlider { number }) => {
                let v = self.document.value(node).to_string();
                self.document.set_value(number, &v);
            }
            Some(Widget::RangeNumber { slider, min, max }) => {
                let clamped = clamp_text(self.document.value(node), min, max);
                self.document.set_value(node, &clamped);
                if !clamped.trim().is_empty() {
                    self.document.set_value(slider, &clamped);
                }
            }
            Some(Widget::VariantSelector { union }) => {
                let index = self.document.value(node).parse::<usize>().unwrap_or(0);
                self.renderer().switch_variant(union, index);
            }
            _ => {}
        }

        if bound {
            self.emit(FormEvent::Changed(self.get_data()?));
        }
        Ok(())
    }

    /// Type `text` into the control bound to `path`.
    pub fn input_path(&mut self, path: &str, text: &str) -> Result<(), FormError> {
        let node = self
            .control(path)
            .ok_or_else(|| FormError::UnknownPath(path.to_string()))?;
        self.input(node, text)
    }

    /// Toggle the checkbox `node`, as a user edit.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), FormError> {
        self.live(node)?;
        let is_checkbox = self
            .document
            .element(node)
            .is_some_and(|e| e.input_type() == "checkbox");
        if !is_checkbox {
            return Err(FormError::Unsupported {
                node: node.index(),
                action: "checking",
            });
        }
        self.document.set_checked(node, checked);
        self.emit(FormEvent::Changed(self.get_data()?));
        Ok(())
    }

    /// Activate the button `node`.
    ///
    /// Add and remove buttons edit their array and emit
    /// [`FormEvent::StructureChanged`]; the submit button submits. Returns
    /// whether anything changed.
    pub fn click(&mut self, node: NodeId) -> Result<bool, FormError> {
        self.live(node)?;
        match self.document.widget(node).cloned() {
            Some(Widget::AddItem { field }) => {
                let appended = self.renderer().append_item(field);
                if appended {
                    self.emit(FormEvent::StructureChanged);
                }
                Ok(appended)
            }
            Some(Widget::RemoveItem { item }) => {
                let field = self.document.parent(item).and_then(|list| {
                    self.document.closest(list, |e| {
                        matches!(e.widget, Some(Widget::ArrayField { .. }))
                    })
                });
                self.document.detach(item);
                if let Some(field) = field {
                    reindex(&mut self.document, field);
                }
                self.emit(FormEvent::StructureChanged);
                Ok(true)
            }
            _ if self.document.attr(node, "type") == Some("submit") => {
                self.submit()?;
                Ok(true)
            }
            _ => Err(FormError::Unsupported {
                node: node.index(),
                action: "clicks",
            }),
        }
    }

    /// Submit the form.
    ///
    /// Native constraint validation runs first; an invalid form is not
    /// submitted. Otherwise emits [`FormEvent::Submitted`] and returns the data.
    pub fn submit(&mut self) -> Result<Value, FormError> {
        let violations = validity::check(&self.document);
        if !violations.is_empty() {
            debug!("submission blocked by {} invalid field(s)", violations.len());
            return Err(FormError::Invalid(violations));
        }
        let data = self.get_data()?;
        self.emit(FormEvent::Submitted(data.clone()));
        Ok(data)
    }

    /// The live control bound to `path`, variant selectors excluded.
    pub fn control(&self, path: &str) -> Option<NodeId> {
        self.document.find(self.document.root(), |e| {
            e.is_control() && e.attr(ATTR_PATH) == Some(path) && !e.has_attr(ATTR_VARIANT_SELECTOR)
        })
    }

    /// The variant selector of the union field at `path`.
    pub fn variant_selector(&self, path: &str) -> Option<NodeId> {
        self.document.find(self.document.root(), |e| {
            e.attr(ATTR_PATH) == Some(path) && e.has_attr(ATTR_VARIANT_SELECTOR)
        })
    }

    /// The array field container at `path`.
    pub fn array_field(&self, path: &str) -> Option<NodeId> {
        self.document.find(self.document.root(), |e| {
            matches!(e.widget, Some(Widget::ArrayField { .. }))
                && e.attr(ATTR_FIELD_PATH) == Some(path)
        })
    }

    /// Rendered items of the array at `path`, in order.
    pub fn items(&self, path: &str) -> Vec<NodeId> {
        match self
            .array_field(path)
            .and_then(|f| self.document.widget(f))
        {
            Some(Widget::ArrayField { list, .. }) => self
                .document
                .children(*list)
                .iter()
                .copied()
                .filter(|c| matches!(self.document.widget(*c), Some(Widget::ArrayItem)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The append button of the array at `path`.
    pub fn add_button(&self, path: &str) -> Option<NodeId> {
        let field = self.array_field(path)?;
        self.document.find(field, |e| {
            matches!(e.widget, Some(Widget::AddItem { field: f }) if f == field)
        })
    }

    /// The variant picker of the union-typed array at `path`.
    pub fn variant_picker(&self, path: &str) -> Option<NodeId> {
        match self.document.widget(self.array_field(path)?) {
            Some(Widget::ArrayField { picker, .. }) => *picker,
            _ => None,
        }
    }

    /// The remove button of the array item `item`.
    pub fn remove_button(&self, item: NodeId) -> Option<NodeId> {
        self.document.find(item, |e| {
            matches!(e.widget, Some(Widget::RemoveItem { item: i }) if i == item)
        })
    }
}
