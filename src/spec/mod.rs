//! Textual anchor, connector and overlay specs
//!
//! Specs are written in a small literal notation:
//!
//! ```text
//! Continuous
//! [0.5, 0, 0, -1, 0, 5]
//! [Top, Bottom, [1, 0.5, 1, 0]]
//! [Continuous, {faces: [top, left]}]
//! [Flowchart, {stub: [20, 30], cornerRadius: 5}]
//! ```
//!
//! Bare identifiers and quoted strings are interchangeable.

mod grammar;
pub mod lexer;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SpecError;

pub use lexer::Span;

/// A value with its byte range in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A literal in spec notation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    List(Vec<Spanned<Value>>),
    Map(Options),
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "name",
            Value::List(_) => "list",
            Value::Map(_) => "options",
        }
    }
}

/// Named options attached to an anchor, connector or overlay spec
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    entries: BTreeMap<String, Spanned<Value>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<(Spanned<String>, Spanned<Value>)>) -> Self {
        let mut options = Self::new();
        for (key, value) in entries {
            options.entries.insert(key.node, value);
        }
        options
    }

    /// Set an option programmatically
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), Spanned::new(value, 0..0));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|v| &v.node)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn invalid(&self, key: &str, expected: &str) -> SpecError {
        let (found, span) = match self.entries.get(key) {
            Some(v) => (v.node.describe(), v.span.clone()),
            None => ("nothing", 0..0),
        };
        SpecError::InvalidOption {
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn number(&self, key: &str) -> Result<Option<f64>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(*n)),
            Some(_) => Err(self.invalid(key, "number")),
        }
    }

    /// A whole number of items between 1 and `max`; fractions are truncated
    pub fn count(&self, key: &str, max: usize) -> Result<Option<usize>, SpecError> {
        match self.number(key)? {
            None => Ok(None),
            Some(n) if n >= 1.0 && n < (max + 1) as f64 => Ok(Some(n as usize)),
            Some(_) => Err(self.invalid(key, &format!("a count from 1 to {max}"))),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(key, "boolean")),
        }
    }

    pub fn text(&self, key: &str) -> Result<Option<&str>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(key, "name")),
        }
    }

    /// A number applying to both ends, or a `[source, target]` pair
    pub fn number_pair(&self, key: &str) -> Result<Option<[f64; 2]>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some([*n, *n])),
            Some(Value::List(items)) => match items.as_slice() {
                [a] => match a.node {
                    Value::Number(n) => Ok(Some([n, n])),
                    _ => Err(self.invalid(key, "number or [number, number]")),
                },
                [a, b] => match (&a.node, &b.node) {
                    (Value::Number(x), Value::Number(y)) => Ok(Some([*x, *y])),
                    _ => Err(self.invalid(key, "number or [number, number]")),
                },
                _ => Err(self.invalid(key, "number or [number, number]")),
            },
            Some(_) => Err(self.invalid(key, "number or [number, number]")),
        }
    }

    /// A list of names; a single name counts as a one-element list
    pub fn text_list(&self, key: &str) -> Result<Option<Vec<String>>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::List(items)) => items
                .iter()
                .map(|i| match &i.node {
                    Value::Str(s) => Ok(s.clone()),
                    _ => Err(self.invalid(key, "list of names")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid(key, "list of names")),
        }
    }
}

/// How an anchor is declared
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum AnchorSpec {
    /// A registered anchor type, e.g. `Top` or `[Continuous, {faces: [top]}]`
    Named { name: String, options: Options },
    /// An explicit `[x, y, ox, oy, offset_x, offset_y]` anchor
    Coords {
        x: f64,
        y: f64,
        ox: f64,
        oy: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// Candidates for a dynamic anchor
    Dynamic(Vec<AnchorSpec>),
}

impl AnchorSpec {
    pub fn named(name: impl Into<String>) -> Self {
        AnchorSpec::Named {
            name: name.into(),
            options: Options::new(),
        }
    }

    pub fn with_options(name: impl Into<String>, options: Options) -> Self {
        AnchorSpec::Named {
            name: name.into(),
            options,
        }
    }

    pub fn coords(x: f64, y: f64, ox: f64, oy: f64) -> Self {
        AnchorSpec::Coords {
            x,
            y,
            ox,
            oy,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn parse(input: &str) -> Result<Self, Vec<SpecError>> {
        let value = grammar::parse(input)?;
        Self::from_value(&value).map_err(|e| vec![e])
    }

    fn from_value(value: &Spanned<Value>) -> Result<Self, SpecError> {
        match &value.node {
            Value::Str(name) => Ok(AnchorSpec::named(name.clone())),
            Value::List(items) => {
                let numbers: Vec<f64> = items
                    .iter()
                    .filter_map(|i| match i.node {
                        Value::Number(n) => Some(n),
                        _ => None,
                    })
                    .collect();
                if !items.is_empty() && numbers.len() == items.len() {
                    return match numbers.as_slice() {
                        [x, y, ox, oy] => Ok(AnchorSpec::coords(*x, *y, *ox, *oy)),
                        [x, y, ox, oy, offset_x, offset_y] => Ok(AnchorSpec::Coords {
                            x: *x,
                            y: *y,
                            ox: *ox,
                            oy: *oy,
                            offset_x: *offset_x,
                            offset_y: *offset_y,
                        }),
                        _ => Err(SpecError::shape(
                            value.span.clone(),
                            "anchor coordinates need 4 or 6 numbers",
                        )),
                    };
                }
                if let [first, second] = items.as_slice() {
                    if let (Value::Str(name), Value::Map(options)) = (&first.node, &second.node) {
                        return Ok(AnchorSpec::with_options(name.clone(), options.clone()));
                    }
                }
                if items.is_empty() {
                    return Err(SpecError::shape(
                        value.span.clone(),
                        "a dynamic anchor needs at least one candidate",
                    ));
                }
                items
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(AnchorSpec::Dynamic)
            }
            other => Err(SpecError::shape(
                value.span.clone(),
                format!("expected an anchor name or list, found {}", other.describe()),
            )),
        }
    }
}

impl FromStr for AnchorSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(first_error)
    }
}

impl TryFrom<String> for AnchorSpec {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for AnchorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSpec::Named { name, options } if options.is_empty() => write!(f, "{}", name),
            AnchorSpec::Named { name, .. } => write!(f, "[{}, {{...}}]", name),
            AnchorSpec::Coords { x, y, ox, oy, .. } => write!(f, "[{}, {}, {}, {}]", x, y, ox, oy),
            AnchorSpec::Dynamic(candidates) => {
                let parts: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// A type name plus options, the form shared by connectors and overlays
fn named_from_value(value: &Spanned<Value>, what: &str) -> Result<(String, Options), SpecError> {
    match &value.node {
        Value::Str(name) => Ok((name.clone(), Options::new())),
        Value::List(items) => match items.as_slice() {
            [first] => match &first.node {
                Value::Str(name) => Ok((name.clone(), Options::new())),
                _ => Err(SpecError::shape(value.span.clone(), format!("expected a {} name", what))),
            },
            [first, second] => match (&first.node, &second.node) {
                (Value::Str(name), Value::Map(options)) => Ok((name.clone(), options.clone())),
                _ => Err(SpecError::shape(
                    value.span.clone(),
                    format!("expected [{}Name, {{options}}]", what),
                )),
            },
            _ => Err(SpecError::shape(
                value.span.clone(),
                format!("expected [{}Name, {{options}}]", what),
            )),
        },
        other => Err(SpecError::shape(
            value.span.clone(),
            format!("expected a {} name, found {}", what, other.describe()),
        )),
    }
}

/// How a connector is declared, e.g. `[Flowchart, {cornerRadius: 5}]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct ConnectorSpec {
    pub name: String,
    pub options: Options,
}

impl ConnectorSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Options::new(),
        }
    }

    pub fn with_options(name: impl Into<String>, options: Options) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    pub fn parse(input: &str) -> Result<Self, Vec<SpecError>> {
        let value = grammar::parse(input)?;
        let (name, options) = named_from_value(&value, "connector").map_err(|e| vec![e])?;
        Ok(Self { name, options })
    }
}

impl FromStr for ConnectorSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(first_error)
    }
}

impl TryFrom<String> for ConnectorSpec {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// How an overlay is declared, e.g. `[Arrow, {location: 1, width: 12}]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct OverlaySpec {
    pub name: String,
    pub options: Options,
}

impl OverlaySpec {
    pub fn parse(input: &str) -> Result<Self, Vec<SpecError>> {
        let value = grammar::parse(input)?;
        let (name, options) = named_from_value(&value, "overlay").map_err(|e| vec![e])?;
        Ok(Self { name, options })
    }
}

impl FromStr for OverlaySpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(first_error)
    }
}

impl TryFrom<String> for OverlaySpec {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

fn first_error(errors: Vec<SpecError>) -> SpecError {
    errors
        .into_iter()
        .next()
        .unwrap_or_else(|| SpecError::shape(0..0, "empty spec"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anchor_keyword() {
        let spec: AnchorSpec = "Continuous".parse().unwrap();
        assert_eq!(spec, AnchorSpec::named("Continuous"));
    }

    #[test]
    fn test_anchor_coords_with_offsets() {
        let spec: AnchorSpec = "[0.5, 0, 0, -1, 0, 5]".parse().unwrap();
        assert_eq!(
            spec,
            AnchorSpec::Coords {
                x: 0.5,
                y: 0.0,
                ox: 0.0,
                oy: -1.0,
                offset_x: 0.0,
                offset_y: 5.0
            }
        );
    }

    #[test]
    fn test_anchor_dynamic_mixed_candidates() {
        let spec: AnchorSpec = "[Top, [1, 0.5, 1, 0]]".parse().unwrap();
        assert_eq!(
            spec,
            AnchorSpec::Dynamic(vec![
                AnchorSpec::named("Top"),
                AnchorSpec::coords(1.0, 0.5, 1.0, 0.0)
            ])
        );
    }

    #[test]
    fn test_anchor_with_options() {
        let spec: AnchorSpec = "[Continuous, {faces: [top, left]}]".parse().unwrap();
        match spec {
            AnchorSpec::Named { name, options } => {
                assert_eq!(name, "Continuous");
                assert_eq!(
                    options.text_list("faces").unwrap(),
                    Some(vec!["top".to_string(), "left".to_string()])
                );
            }
            other => panic!("Expected named anchor, got {:?}", other),
        }
    }

    #[test]
    fn test_anchor_bad_coordinate_count() {
        let err = "[0.5, 0, 1]".parse::<AnchorSpec>().unwrap_err();
        assert!(err.to_string().contains("4 or 6 numbers"));
    }

    #[test]
    fn test_connector_spec() {
        let spec: ConnectorSpec = "[Flowchart, {stub: [20, 30], cornerRadius: 5}]"
            .parse()
            .unwrap();
        assert_eq!(spec.name, "Flowchart");
        assert_eq!(spec.options.number_pair("stub").unwrap(), Some([20.0, 30.0]));
        assert_eq!(spec.options.number("cornerRadius").unwrap(), Some(5.0));
        assert_eq!(spec.options.number("gap").unwrap(), None);
    }

    #[test]
    fn test_option_type_mismatch() {
        let spec: ConnectorSpec = "[Bezier, {curviness: big}]".parse().unwrap();
        let err = spec.options.number("curviness").unwrap_err();
        assert!(err.to_string().contains("curviness"));
    }

    #[test]
    fn test_connector_rejects_number() {
        assert!("42".parse::<ConnectorSpec>().is_err());
    }
}
