//! String paths addressing locations inside a value tree.
//!
//! A path is made of dotted segments for object members and bracketed
//! integer segments for array indices, e.g. `order.lines[2].sku`. The
//! renderer authors every path, and the collector writes values back through
//! the same segment splitting, so this module is the single source of truth
//! for both directions of the binding.

use serde_json::{Map, Value};

use crate::error::PathError;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access.
    Key(String),
    /// Array index access.
    Index(usize),
}

impl Segment {
    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Split a path into its segments.
///
/// Bracket segments are normalized to plain segments and any segment made
/// only of ASCII digits becomes an index. Empty components are dropped.
pub fn segments(path: &str) -> Vec<Segment> {
    path.split(['.', '[', ']'])
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(i) if s.bytes().all(|b| b.is_ascii_digit()) => Segment::Index(i),
            _ => Segment::Key(s.to_string()),
        })
        .collect()
}

/// Path of a named child below `parent`.
pub fn join_key(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Path of the element at `index` inside the array at `parent`.
pub fn join_index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Read the value at `path`, if every segment resolves.
///
/// An empty path addresses the root itself.
pub fn read<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .iter()
        .try_fold(root, |current, seg| match (current, seg) {
            (Value::Object(map), Segment::Key(k)) => map.get(k),
            (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
            (Value::Array(list), Segment::Index(i)) => list.get(*i),
            _ => None,
        })
}

/// Write `value` at `path`, creating missing intermediate containers.
///
/// A missing container becomes a list when the segment that follows it is
/// numeric and a map otherwise. Writing past the end of a list pads it with
/// `null`. An empty path replaces the root.
pub fn write(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (i, seg) in parents.iter().enumerate() {
        let next_is_index = segs[i + 1].is_index();
        current = descend(current, seg, path)?;
        if current.is_null() {
            *current = empty_container(next_is_index);
        }
    }

    let slot = descend(current, last, path)?;
    *slot = value;
    Ok(())
}

fn empty_container(list: bool) -> Value {
    if list {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn descend<'a>(current: &'a mut Value, seg: &Segment, path: &str) -> Result<&'a mut Value, PathError> {
    if current.is_null() {
        *current = empty_container(seg.is_index());
    }
    match current {
        Value::Object(map) => Ok(map.entry(seg.to_string()).or_insert(Value::Null)),
        Value::Array(list) => match seg {
            Segment::Index(i) => {
                if list.len() <= *i {
                    list.resize(*i + 1, Value::Null);
                }
                Ok(&mut list[*i])
            }
            Segment::Key(k) => Err(PathError::SegmentMismatch {
                path: path.to_string(),
                segment: k.clone(),
            }),
        },
        other => Err(PathError::NotAContainer {
            path: path.to_string(),
            segment: seg.to_string(),
            found: kind_name(other),
        }),
    }
}

/// Runtime kind of a value, named the way schema types are.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renumber the array index segment that directly follows `array_path`.
///
/// Returns `None` when `path` is not located inside element `old` of the
/// array at `array_path`.
pub fn reindex(path: &str, array_path: &str, old: usize, new: usize) -> Option<String> {
    let rest = path.strip_prefix(&join_index(array_path, old))?;
    if rest.is_empty() || rest.starts_with('.') || rest.starts_with('[') {
        Some(format!("{}{rest}", join_index(array_path, new)))
    } else {
        None
    }
}
