//! Error types for path resolution and form operations.

use thiserror::Error;

use crate::validity::Violation;

/// Errors raised while writing into a value tree through a path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    /// An intermediate location holds a primitive, so it cannot be descended into.
    #[error("cannot descend into {found} at `{path}` (segment `{segment}`)")]
    NotAContainer {
        path: String,
        segment: String,
        found: &'static str,
    },
    /// A numeric segment addressed a map or a named segment addressed a list.
    #[error("segment `{segment}` does not fit the container at `{path}`")]
    SegmentMismatch { path: String, segment: String },
}

/// Errors returned by the form component.
#[derive(Debug, Error)]
pub enum FormError {
    /// The node id does not refer to an element of the live document.
    #[error("node {0} is not part of the rendered form")]
    UnknownNode(usize),
    /// No live control is bound to the path.
    #[error("no control is bound to `{0}`")]
    UnknownPath(String),
    /// The node exists but has no behavior for the requested interaction.
    #[error("node {node} does not accept {action}")]
    Unsupported { node: usize, action: &'static str },
    /// Native constraint validation blocked the submission.
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(Vec<Violation>),
    /// A bound path could not be written.
    #[error(transparent)]
    Path(#[from] PathError),
}
