//! Nested key-value documents addressed by typed paths.
//!
//! A [`Document`] is a tree whose interior nodes are objects and whose leaves
//! are arbitrary non-object JSON values (scalars, arrays, null). Dot-delimited
//! strings only appear at the parsing boundary ([`DocPath::parse`]); every
//! operation below works on path segments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A path into a [`Document`], one segment per nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Parse a dot-delimited path. Empty segments are dropped, so
    /// `"a..b."` is the same path as `"a.b"`.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DocPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One node of a document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Object(Document),
    /// Never a JSON object; objects are always lifted into [`Node::Object`].
    Leaf(Value),
}

impl Node {
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Node::Object(doc) => Some(doc),
            Node::Leaf(_) => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Node::Object(doc) => doc.into_json(),
            Node::Leaf(value) => value,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Object(Document::from(map)),
            other => Node::Leaf(other),
        }
    }
}

impl From<Document> for Node {
    fn from(doc: Document) -> Self {
        Node::Object(doc)
    }
}

/// A nested configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Node>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift a JSON value into a document. `None` unless the value is an object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    pub fn into_json(self) -> Value {
        Value::Object(
            self.0
                .into_iter()
                .map(|(key, node)| (key, node.into_json()))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        self.clone().into_json()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Look up a direct child.
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Look up the node at `path`. The empty path has no node.
    pub fn get(&self, path: &DocPath) -> Option<&Node> {
        let (last, parents) = path.segments().split_last()?;
        let mut cursor = self;
        for segment in parents {
            cursor = cursor.0.get(segment)?.as_object()?;
        }
        cursor.0.get(last)
    }

    /// Look up the leaf value at `path`; objects yield `None`.
    pub fn get_value(&self, path: &DocPath) -> Option<&Value> {
        self.get(path)?.as_leaf()
    }

    pub fn contains(&self, path: &DocPath) -> bool {
        self.get(path).is_some()
    }

    /// Store `node` at `path`, creating intermediate objects as needed.
    ///
    /// Any non-object found on the way is replaced by an empty object. Setting
    /// the empty path is a no-op.
    pub fn set(&mut self, path: &DocPath, node: impl Into<Node>) {
        let Some((last, parents)) = path.segments().split_last() else {
            return;
        };
        let mut cursor = self;
        for segment in parents {
            let slot = cursor
                .0
                .entry(segment.clone())
                .or_insert_with(|| Node::Object(Document::new()));
            if let Node::Leaf(_) = slot {
                *slot = Node::Object(Document::new());
            }
            let Node::Object(next) = slot else {
                return;
            };
            cursor = next;
        }
        cursor.0.insert(last.clone(), node.into());
    }

    /// Deep-merge `overlay` into this document.
    ///
    /// Objects on both sides recurse; anything else in the overlay replaces the
    /// base value outright. Arrays are leaves and are never merged element-wise.
    pub fn merge(&mut self, overlay: Document) {
        for (key, incoming) in overlay.0 {
            match (self.0.get_mut(&key), incoming) {
                (Some(Node::Object(base)), Node::Object(over)) => base.merge(over),
                (_, incoming) => {
                    self.0.insert(key, incoming);
                }
            }
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().map(|(key, value)| (key, Node::from(value))).collect())
    }
}

/// Non-mutating form of [`Document::merge`].
pub fn deep_merge(base: &Document, overlay: &Document) -> Document {
    let mut merged = base.clone();
    merged.merge(overlay.clone());
    merged
}
