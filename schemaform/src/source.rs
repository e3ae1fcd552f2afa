//! Loading schema and data documents from JSON or TOML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use serde_json::Value;

/// Derive the schema path that sits next to a data file.
///
/// `config.toml` maps to `config-schema.json` in the same directory.
pub fn default_schema_path(data: &Path) -> PathBuf {
    let stem = data
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = format!("{stem}-schema.json");
    match data.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Parse `text` as JSON or TOML according to the file extension `ext`.
///
/// Blank input yields `null`.
pub fn parse_value(text: &str, ext: &str) -> anyhow::Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value = match ext {
        "json" => serde_json::from_str(text)?,
        "toml" | "tml" => {
            let v: toml::Value = toml::from_str(text)?;
            serde_json::to_value(v)?
        }
        _ => bail!("unsupported document extension: {ext:?}"),
    };
    Ok(value)
}

/// Read a JSON or TOML document from disk.
pub fn load_value(path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_value(&text, ext).with_context(|| format!("failed to parse {}", path.display()))
}
