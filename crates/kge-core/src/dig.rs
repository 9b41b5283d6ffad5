//! Path-based digging into `serde_json::Value` trees.
//!
//! A path is a dot-joined list of segments:
//! - `name`: a mapping key, or an index when the current node is an array
//! - `*`: every key (or index) of the current node
//! - `name[]`: the array at `name`, expanded over its elements
//!
//! `dig` walks the path, optionally writing at the destination (`set`,
//! `mutate`) and optionally creating missing nodes on the way (`make_path`).
//! Wildcard and array segments in the middle of a path branch into every
//! child; a branch that fails is left out of the result instead of failing
//! the whole call. Destination and plain-key failures are returned as errors.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{DigError, Expected};

pub type DigResult<T> = std::result::Result<T, DigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Wildcard,
    Array(String),
}

impl Segment {
    fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw == "*" {
            return Some(Segment::Wildcard);
        }
        match raw.strip_suffix("[]") {
            Some("") => None,
            Some(name) => Some(Segment::Array(name.to_string())),
            None => Some(Segment::Key(raw.to_string())),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Wildcard => f.write_str("*"),
            Segment::Array(name) => write!(f, "{name}[]"),
        }
    }
}

/// A parsed path. The empty string parses to the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigPath {
    segments: Vec<Segment>,
}

impl DigPath {
    pub fn parse(path: &str) -> DigResult<Self> {
        if path.is_empty() {
            return Ok(Self::default());
        }
        Self::from_segments(path.split('.'))
    }

    /// Builds a path from pre-split segments (`["a", "b[]", "*"]`).
    pub fn from_segments<I, S>(segments: I) -> DigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let mut out = Vec::with_capacity(raw.len());
        for s in &raw {
            match Segment::parse(s) {
                Some(segment) => out.push(segment),
                None => {
                    return Err(DigError::InvalidPath {
                        path: raw.join("."),
                    });
                }
            }
        }
        Ok(Self { segments: out })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for DigPath {
    type Err = DigError;

    fn from_str(s: &str) -> DigResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

type Mutator<'f> = Box<dyn Fn(Value) -> Value + 'f>;
type NodeFactory<'f> = Box<dyn Fn(&Value, &str, usize) -> Value + 'f>;
type HasKey<'f> = Box<dyn Fn(&Value, &str) -> bool + 'f>;

/// How missing intermediate nodes are created.
pub enum MakePath<'f> {
    /// Insert an empty object.
    Object,
    /// Call the factory with `(parent, key, depth)`.
    With(NodeFactory<'f>),
}

impl MakePath<'_> {
    fn create(&self, parent: &Value, key: &str, depth: usize) -> Value {
        match self {
            MakePath::Object => Value::Object(Map::new()),
            MakePath::With(factory) => factory(parent, key, depth),
        }
    }
}

/// Options for [`dig`]. All of them combine freely; `set` is applied
/// before `mutate`.
#[derive(Default)]
pub struct DigOptions<'f> {
    set: Option<Value>,
    mutate: Option<Mutator<'f>>,
    make_path: Option<MakePath<'f>>,
    has: Option<HasKey<'f>>,
}

impl<'f> DigOptions<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, value: impl Into<Value>) -> Self {
        self.set = Some(value.into());
        self
    }

    pub fn mutate(mut self, f: impl Fn(Value) -> Value + 'f) -> Self {
        self.mutate = Some(Box::new(f));
        self
    }

    pub fn make_path(mut self) -> Self {
        self.make_path = Some(MakePath::Object);
        self
    }

    pub fn make_path_with(mut self, f: impl Fn(&Value, &str, usize) -> Value + 'f) -> Self {
        self.make_path = Some(MakePath::With(Box::new(f)));
        self
    }

    /// Overrides the key-existence test.
    pub fn has(mut self, f: impl Fn(&Value, &str) -> bool + 'f) -> Self {
        self.has = Some(Box::new(f));
        self
    }

    fn has_key(&self, obj: &Value, key: &str) -> bool {
        match &self.has {
            Some(has) => has(obj, key),
            None => default_has(obj, key),
        }
    }

    fn apply(&self, slot: &mut Value) {
        if let Some(value) = &self.set {
            *slot = value.clone();
        }
        if let Some(mutate) = &self.mutate {
            *slot = mutate(slot.take());
        }
    }
}

/// What a dig reached.
#[derive(Debug)]
pub enum Dug<'a> {
    /// The empty path: the root itself.
    Root(&'a mut Value),
    /// A single destination and the key it sits under.
    Found { key: String, value: &'a mut Value },
    /// Results of a wildcard segment, keyed by the branching key.
    Keyed(Vec<(String, Dug<'a>)>),
    /// Results of an array segment, in element order.
    Listed(Vec<Dug<'a>>),
}

impl<'a> Dug<'a> {
    pub fn key(&self) -> Option<&str> {
        match self {
            Dug::Found { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Dug::Root(v) | Dug::Found { value: v, .. } => Some(&**v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut Value> {
        match self {
            Dug::Root(v) | Dug::Found { value: v, .. } => Some(&mut **v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<&'a mut Value> {
        match self {
            Dug::Root(v) | Dug::Found { value: v, .. } => Some(v),
            _ => None,
        }
    }

    /// Renders the result as plain JSON: the value for a single
    /// destination, an object for wildcards, an array for array segments.
    pub fn to_json(&self) -> Value {
        match self {
            Dug::Root(v) | Dug::Found { value: v, .. } => (**v).clone(),
            Dug::Keyed(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, dug)| (key.clone(), dug.to_json()))
                    .collect(),
            ),
            Dug::Listed(items) => Value::Array(items.iter().map(Dug::to_json).collect()),
        }
    }
}

pub fn is_diggable(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Parses `path` and digs it. See [`dig_path`].
pub fn dig<'a>(root: &'a mut Value, path: &str, opts: &DigOptions<'_>) -> DigResult<Dug<'a>> {
    let path = DigPath::parse(path)?;
    dig_path(root, &path, opts)
}

/// Walks `path` from `root`, applying `opts` at every destination reached.
pub fn dig_path<'a>(
    root: &'a mut Value,
    path: &DigPath,
    opts: &DigOptions<'_>,
) -> DigResult<Dug<'a>> {
    if !is_diggable(root) {
        return Err(DigError::InvalidArgument);
    }
    descend(root, path.segments(), 0, opts)
}

fn descend<'a>(
    obj: &'a mut Value,
    segments: &[Segment],
    depth: usize,
    opts: &DigOptions<'_>,
) -> DigResult<Dug<'a>> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Dug::Root(obj));
    };
    match segment {
        Segment::Wildcard => Ok(Dug::Keyed(wildcard(obj, rest, depth, opts))),
        Segment::Array(name) => expand(obj, name, rest, depth, opts),
        Segment::Key(key) => {
            if !opts.has_key(obj, key) {
                let Some(make) = &opts.make_path else {
                    return Err(DigError::NoSuchKey { key: key.clone() });
                };
                let node = if rest.is_empty() {
                    Value::Null
                } else {
                    make.create(obj, key, depth)
                };
                insert(obj, key, node)?;
                trace!(key = %key, depth, "created missing segment");
            }
            let child = child_mut(obj, key).ok_or_else(|| DigError::NoSuchKey { key: key.clone() })?;
            if rest.is_empty() {
                opts.apply(child);
                return Ok(Dug::Found {
                    key: key.clone(),
                    value: child,
                });
            }
            if !is_diggable(child) {
                return Err(DigError::TypeMismatch {
                    key: key.clone(),
                    expected: Expected::Object,
                });
            }
            descend(child, rest, depth + 1, opts)
        }
    }
}

fn wildcard<'a>(
    obj: &'a mut Value,
    rest: &[Segment],
    depth: usize,
    opts: &DigOptions<'_>,
) -> Vec<(String, Dug<'a>)> {
    let children: Vec<(String, &'a mut Value)> = match obj {
        Value::Object(map) => map.iter_mut().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    };
    let mut found = Vec::with_capacity(children.len());
    for (key, child) in children {
        if rest.is_empty() {
            opts.apply(child);
            found.push((key.clone(), Dug::Found { key, value: child }));
        } else if is_diggable(child) {
            match descend(child, rest, depth + 1, opts) {
                Ok(dug) => found.push((key, dug)),
                Err(err) => trace!(key = %key, error = %err, "wildcard branch skipped"),
            }
        }
    }
    found
}

fn expand<'a>(
    obj: &'a mut Value,
    name: &str,
    rest: &[Segment],
    depth: usize,
    opts: &DigOptions<'_>,
) -> DigResult<Dug<'a>> {
    if !opts.has_key(obj, name) {
        return Err(DigError::NoSuchKey {
            key: name.to_string(),
        });
    }
    let Some(target) = child_mut(obj, name) else {
        return Err(DigError::NoSuchKey {
            key: name.to_string(),
        });
    };
    let Value::Array(items) = target else {
        return Err(DigError::TypeMismatch {
            key: name.to_string(),
            expected: Expected::Array,
        });
    };
    let mut found = Vec::with_capacity(items.len());
    for (index, item) in items.iter_mut().enumerate() {
        if rest.is_empty() {
            opts.apply(item);
            found.push(Dug::Found {
                key: index.to_string(),
                value: item,
            });
        } else if is_diggable(item) {
            match descend(item, rest, depth + 1, opts) {
                Ok(dug) => found.push(dug),
                Err(err) => trace!(key = %name, index, error = %err, "array branch skipped"),
            }
        }
    }
    Ok(Dug::Listed(found))
}

fn index_of(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

fn default_has(obj: &Value, key: &str) -> bool {
    match obj {
        Value::Object(map) => map.contains_key(key),
        Value::Array(items) => index_of(key).is_some_and(|i| i < items.len()),
        _ => false,
    }
}

fn child_mut<'a>(obj: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match obj {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => match index_of(key) {
            Some(i) => items.get_mut(i),
            None => None,
        },
        _ => None,
    }
}

fn insert(obj: &mut Value, key: &str, node: Value) -> DigResult<()> {
    match obj {
        Value::Object(map) => {
            map.insert(key.to_string(), node);
            Ok(())
        }
        _ => Err(DigError::TypeMismatch {
            key: key.to_string(),
            expected: Expected::Object,
        }),
    }
}
