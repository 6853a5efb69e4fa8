use crate::serialization::{to_plain, Plain};
use chrono::{DateTime, Utc};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{self, Display};

/// A parsed value. Arrays are homogeneous: every element has the same variant.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

/// A mapping from key to value. Keys are unique; ordering carries no meaning,
/// so two dictionaries with the same entries are equal.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Dictionary {
    entries: BTreeMap<String, Value>,
}

/// The root dictionary produced by a successful parse.
#[derive(Debug, PartialEq, Clone)]
pub struct Document {
    root: Value,
}

/// Anything that names a location in a document: a dotted string such as
/// `"servers.alpha.ip"`, or a sequence of key segments.
///
/// The empty string is the empty path, which designates the root itself.
pub trait KeyPath {
    fn segments(&self) -> Vec<&str>;
}

impl KeyPath for str {
    fn segments(&self) -> Vec<&str> {
        if self.is_empty() {
            Vec::new()
        } else {
            self.split('.').collect()
        }
    }
}

impl KeyPath for String {
    fn segments(&self) -> Vec<&str> {
        self.as_str().segments()
    }
}

impl<S: AsRef<str>> KeyPath for [S] {
    fn segments(&self) -> Vec<&str> {
        self.iter().map(|segment| segment.as_ref()).collect()
    }
}

impl<S: AsRef<str>> KeyPath for Vec<S> {
    fn segments(&self) -> Vec<&str> {
        self.as_slice().segments()
    }
}

impl<S: AsRef<str>, const N: usize> KeyPath for [S; N] {
    fn segments(&self) -> Vec<&str> {
        self.as_slice().segments()
    }
}

/// Narrows a [`Value`] to a concrete Rust type. Each implementation accepts
/// exactly one variant; anything else yields `None`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_datetime()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }
}

impl FromValue for Dictionary {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_dictionary().cloned()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for Plain {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.to_plain())
    }
}

impl Value {
    /// Navigates nested dictionaries along `path`. An empty path returns
    /// `self`; a missing key or a non-dictionary in the middle of the path
    /// returns `None`.
    pub fn get<P: KeyPath + ?Sized>(&self, path: &P) -> Option<&Value> {
        lookup(self, &path.segments())
    }

    /// Like [`Value::get`], then narrows the result to `T`.
    pub fn get_as<T: FromValue, P: KeyPath + ?Sized>(&self, path: &P) -> Option<T> {
        self.get(path).and_then(T::from_value)
    }

    /// Converts to the plain representation used for printing and serde.
    #[must_use]
    pub fn to_plain(&self) -> Plain {
        to_plain(self)
    }

    /// A short name for the variant, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }

    /// True when both values are the same variant, regardless of contents.
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

fn lookup<'v>(node: &'v Value, path: &[&str]) -> Option<&'v Value> {
    match path.split_first() {
        None => Some(node),
        Some((head, tail)) => match node {
            Value::Dictionary(dict) => lookup(dict.get(head)?, tail),
            _ => None,
        },
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dictionary(dict) => {
                write!(f, "{{")?;
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a single key in this dictionary (no path splitting).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Assembly-time access; documents are immutable once built.
    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.entries
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Document {
    pub(crate) fn new(root: Dictionary) -> Self {
        Self {
            root: Value::Dictionary(root),
        }
    }

    /// The root dictionary, as a [`Value::Dictionary`].
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    /// Looks up `path` from the root. See [`Value::get`].
    pub fn get<P: KeyPath + ?Sized>(&self, path: &P) -> Option<&Value> {
        self.root.get(path)
    }

    /// Looks up `path` and narrows the result to `T`; `None` if the path is
    /// missing or holds a different variant.
    pub fn get_as<T: FromValue, P: KeyPath + ?Sized>(&self, path: &P) -> Option<T> {
        self.root.get_as(path)
    }

    #[must_use]
    pub fn to_plain(&self) -> Plain {
        self.root.to_plain()
    }
}
