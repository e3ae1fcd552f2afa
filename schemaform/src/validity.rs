//! Native constraint validation over bound controls.
//!
//! Mirrors what a browser checks before letting a form submit: `required`,
//! `minlength`/`maxlength`, `pattern`, numeric `min`/`max`, and the shape of
//! `email`/`url` inputs. Hidden inputs and checkboxes are not validated.

use regex::Regex;
use thiserror::Error;

use crate::dom::{ATTR_PATH, ATTR_VARIANT_SELECTOR, Document, Element, NodeId};

/// Why a control is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViolationKind {
    #[error("value is required")]
    ValueMissing,
    #[error("must be at least {0} characters")]
    TooShort(usize),
    #[error("must be at most {0} characters")]
    TooLong(usize),
    #[error("must match pattern `{0}`")]
    PatternMismatch(String),
    #[error("must be at least {0}")]
    RangeUnderflow(f64),
    #[error("must be at most {0}")]
    RangeOverflow(f64),
    #[error("is not a valid {0}")]
    TypeMismatch(&'static str),
    #[error("is not a number")]
    BadInput,
}

/// An invalid control.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("`{path}` {kind}")]
pub struct Violation {
    pub node: NodeId,
    pub path: String,
    pub kind: ViolationKind,
}

/// Validate every bound control reachable from the root.
pub fn check(doc: &Document) -> Vec<Violation> {
    doc.find_all(doc.root(), |e| {
        e.is_control() && e.has_attr(ATTR_PATH) && !e.has_attr(ATTR_VARIANT_SELECTOR)
    })
    .into_iter()
    .filter_map(|node| {
        let el = doc.element(node)?;
        let kind = check_element(el)?;
        Some(Violation {
            node,
            path: el.attr(ATTR_PATH).unwrap_or_default().to_string(),
            kind,
        })
    })
    .collect()
}

fn check_element(el: &Element) -> Option<ViolationKind> {
    let input_type = el.input_type();
    if matches!(input_type, "hidden" | "checkbox") {
        return None;
    }

    let value = el.value();
    if value.is_empty() {
        return el.has_attr("required").then_some(ViolationKind::ValueMissing);
    }

    let length = value.chars().count();
    if let Some(min) = numeric_attr::<usize>(el, "minlength")
        && length < min
    {
        return Some(ViolationKind::TooShort(min));
    }
    if let Some(max) = numeric_attr::<usize>(el, "maxlength")
        && length > max
    {
        return Some(ViolationKind::TooLong(max));
    }

    if let Some(pattern) = el.attr("pattern") {
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(re) if !re.is_match(value) => {
                return Some(ViolationKind::PatternMismatch(pattern.to_string()));
            }
            Ok(_) => {}
            Err(e) => debug!("ignoring invalid pattern `{pattern}`: {e}"),
        }
    }

    match input_type {
        "number" | "range" => {
            let Ok(n) = value.trim().parse::<f64>() else {
                return Some(ViolationKind::BadInput);
            };
            if let Some(min) = numeric_attr::<f64>(el, "min")
                && n < min
            {
                return Some(ViolationKind::RangeUnderflow(min));
            }
            if let Some(max) = numeric_attr::<f64>(el, "max")
                && n > max
            {
                return Some(ViolationKind::RangeOverflow(max));
            }
        }
        "email" if !is_email(value) => return Some(ViolationKind::TypeMismatch("email")),
        "url" if !is_url(value) => return Some(ViolationKind::TypeMismatch("url")),
        _ => {}
    }
    None
}

fn numeric_attr<T: std::str::FromStr>(el: &Element, name: &str) -> Option<T> {
    el.attr(name).and_then(|s| s.parse().ok())
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_url(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
