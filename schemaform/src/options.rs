//! Presentation options for rendered forms.
//!
//! Options are usually left at their defaults, but can be loaded from a TOML
//! table:
//!
//! ```toml
//! textarea_threshold = 500
//! submit_label = "Save"
//! show_submit = true
//! ```

use serde::{Deserialize, Serialize};

/// Knobs applied by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Strings whose `maxLength` exceeds this render as a text area.
    pub textarea_threshold: u64,
    /// Prefix of generated control ids.
    pub id_prefix: String,
    /// Text shown while no schema is assigned.
    pub empty_text: String,
    /// Label of the submit button.
    pub submit_label: String,
    /// Whether a submit button is rendered at the end of the form.
    pub show_submit: bool,
    /// Label of the append button of plain arrays.
    pub add_label: String,
    /// Label of the append button next to a variant picker.
    pub add_variant_label: String,
    /// Label of per-item remove buttons.
    pub remove_label: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        FormOptions {
            textarea_threshold: 200,
            id_prefix: "sf".to_string(),
            empty_text: "No schema provided".to_string(),
            submit_label: "Submit".to_string(),
            show_submit: true,
            add_label: "Add Item".to_string(),
            add_variant_label: "Add".to_string(),
            remove_label: "Remove".to_string(),
        }
    }
}

impl FormOptions {
    /// Parse options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
