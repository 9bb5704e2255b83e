//! Opaque content values attached to nodes and metadata maps.
//!
//! The engine must neither inspect nor require a fixed schema for node
//! content (see the spec's "dynamic content typing" design note). `Content`
//! is a tagged union that round-trips through the JSON snapshot format
//! without loss — nested objects, numeric arrays, nulls, and booleans all
//! survive a save/load cycle unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An opaque, schema-less content value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Absence of a value.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// A numeric scalar (integer or float).
    Number(f64),
    /// A text scalar.
    String(String),
    /// An ordered sequence of content values.
    Sequence(Vec<Content>),
    /// A keyed structure. Uses `BTreeMap` so serialized key order is stable,
    /// which keeps snapshot round-trip comparisons in tests deterministic.
    Map(BTreeMap<String, Content>),
}

impl Content {
    /// Tokenize this content for similarity clustering (see
    /// `analysis::similarity`): flatten to text, lowercase, and split on
    /// non-word boundaries. Numbers and booleans contribute their textual
    /// form; `Null` contributes nothing.
    pub fn flatten_to_text(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut String) {
        match self {
            Content::Null => {}
            Content::Bool(b) => {
                out.push(' ');
                out.push_str(if *b { "true" } else { "false" });
            }
            Content::Number(n) => {
                out.push(' ');
                out.push_str(&n.to_string());
            }
            Content::String(s) => {
                out.push(' ');
                out.push_str(s);
            }
            Content::Sequence(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            Content::Map(map) => {
                for (key, value) in map {
                    out.push(' ');
                    out.push_str(key);
                    value.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::String(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::String(s)
    }
}

impl From<f64> for Content {
    fn from(n: f64) -> Self {
        Content::Number(n)
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Bool(b)
    }
}

/// A keyed structure of opaque values, used for `Information::metadata` and
/// `Relationship::metadata`.
pub type Metadata = BTreeMap<String, Content>;
