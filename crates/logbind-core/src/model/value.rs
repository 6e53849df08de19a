//! Dynamic values flowing through binding and projection

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use super::reflect::{object_id, ObjectRef};
use super::shape::EnumSpec;
use super::types::{
    format_time_span, ConditionExpression, Culture, Encoding, Layout, LineEndingMode, TypedLayout,
};

/// A mutable list shared between owners; iterate only over a locked snapshot
pub type SharedList = Arc<Mutex<Vec<Value>>>;

/// Tagged union of every value the engine moves around
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(Arc<str>),
    Enum(EnumValue),
    Duration(Duration),
    Layout(Layout),
    TypedLayout(TypedLayout),
    Condition(ConditionExpression),
    Encoding(Encoding),
    Culture(Culture),
    LineEnding(LineEndingMode),
    Uri(Url),
    Custom(CustomValue),
    /// Read-only sequence
    Seq(Arc<[Value]>),
    /// Mutable list, copied under its lock before iteration
    List(SharedList),
    Set(ValueSet),
    /// String-keyed map in insertion order
    Map(Arc<[(Arc<str>, Value)]>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Wrap items as a fresh mutable list
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(Mutex::new(items)))
    }

    pub fn seq(items: Vec<Value>) -> Self {
        Value::Seq(items.into())
    }

    pub fn map<K: Into<Arc<str>>>(entries: Vec<(K, Value)>) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect::<Vec<_>>()
                .into(),
        )
    }

    /// Identity of a shared container or object, if the value has one
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(object_id(obj)),
            Value::List(list) => Some(Arc::as_ptr(list) as *const () as usize),
            Value::Seq(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Set(set) => Some(Arc::as_ptr(&set.items) as *const () as usize),
            _ => None,
        }
    }

    /// Elements of an enumerable value; mutable lists are copied under lock
    pub fn snapshot_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Seq(items) => Some(items.to_vec()),
            Value::List(list) => Some(list.lock().clone()),
            Value::Set(set) => Some(set.items.to_vec()),
            _ => None,
        }
    }
}

/// Formats one element of a container; `ancestors` holds enclosing containers
type ItemFmt = fn(&Value, &mut fmt::Formatter<'_>, &mut Vec<usize>) -> fmt::Result;

impl Value {
    /// Write the elements of an enumerable from a snapshot, printing `...`
    /// in place of a container that encloses itself
    fn fmt_items(
        &self,
        f: &mut fmt::Formatter<'_>,
        ancestors: &mut Vec<usize>,
        (open, close): (&str, &str),
        each: ItemFmt,
    ) -> fmt::Result {
        f.write_str(open)?;
        let identity = self.identity().unwrap_or_default();
        if ancestors.contains(&identity) {
            f.write_str("...")?;
            return f.write_str(close);
        }

        let items = self.snapshot_items().unwrap_or_default();
        ancestors.push(identity);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            each(item, f, ancestors)?;
        }
        ancestors.pop();
        f.write_str(close)
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>, ancestors: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::Seq(_) | Value::List(_) => {
                self.fmt_items(f, ancestors, ("[", "]"), Value::fmt_debug)
            }
            Value::Set(_) => self.fmt_items(f, ancestors, ("{", "}"), Value::fmt_debug),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", k)?;
                    v.fmt_debug(f, ancestors)?;
                }
                f.write_str("}")
            }
            scalar => scalar.fmt_scalar_debug(f),
        }
    }

    fn fmt_display(&self, f: &mut fmt::Formatter<'_>, ancestors: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::Seq(_) | Value::List(_) | Value::Set(_) => {
                self.fmt_items(f, ancestors, ("", ""), Value::fmt_display)
            }
            Value::Map(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}=", k)?;
                    v.fmt_display(f, ancestors)?;
                }
                Ok(())
            }
            scalar => scalar.fmt_scalar_display(f),
        }
    }

    fn fmt_scalar_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Char(v) => write!(f, "Char({:?})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::Enum(v) => write!(f, "Enum({}::{})", v.spec.name, v),
            Value::Duration(v) => write!(f, "Duration({:?})", v),
            Value::Layout(v) => write!(f, "Layout({:?})", v.text()),
            Value::TypedLayout(v) => write!(f, "TypedLayout({:?})", v.layout().text()),
            Value::Condition(v) => write!(f, "Condition({:?})", v.text()),
            Value::Encoding(v) => write!(f, "Encoding({})", v.web_name()),
            Value::Culture(v) => write!(f, "Culture({:?})", v.name()),
            Value::LineEnding(v) => write!(f, "LineEnding({:?})", v),
            Value::Uri(v) => write!(f, "Uri({})", v),
            Value::Custom(v) => write!(f, "Custom({}: {})", v.type_name, v.text),
            Value::Object(obj) => write!(f, "Object({})", obj.type_name()),
            Value::Seq(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => Ok(()),
        }
    }

    fn fmt_scalar_display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => f.write_str(if *v { "True" } else { "False" }),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
            Value::Enum(v) => write!(f, "{}", v),
            Value::Duration(v) => f.write_str(&format_time_span(*v)),
            Value::Layout(v) => f.write_str(v.text()),
            Value::TypedLayout(v) => f.write_str(v.layout().text()),
            Value::Condition(v) => f.write_str(v.text()),
            Value::Encoding(v) => f.write_str(v.web_name()),
            Value::Culture(v) => f.write_str(v.name()),
            Value::LineEnding(v) => f.write_str(v.name()),
            Value::Uri(v) => f.write_str(v.as_str()),
            Value::Custom(v) => f.write_str(&v.text),
            Value::Object(obj) => f.write_str(&obj.render()),
            Value::Seq(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_debug(f, &mut Vec::new())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Layout(a), Value::Layout(b)) => a == b,
            (Value::TypedLayout(a), Value::TypedLayout(b)) => a.layout() == b.layout(),
            (Value::Condition(a), Value::Condition(b)) => a == b,
            (Value::Encoding(a), Value::Encoding(b)) => a == b,
            (Value::Culture(a), Value::Culture(b)) => a == b,
            (Value::LineEnding(a), Value::LineEnding(b)) => a == b,
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                a.type_name == b.type_name && (Arc::ptr_eq(&a.value, &b.value) || a.text == b.text)
            }
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || *a.lock() == *b.lock(),
            (Value::Set(a), Value::Set(b)) => a.items == b.items,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => object_id(a) == object_id(b),
            _ => false,
        }
    }
}

/// Invariant string form; `format_value` and projection rendering use it
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_display(f, &mut Vec::new())
    }
}

macro_rules! value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

value_from!(bool, Bool);
value_from!(i64, Int);
value_from!(f64, Float);
value_from!(char, Char);
value_from!(EnumValue, Enum);
value_from!(Duration, Duration);
value_from!(Layout, Layout);
value_from!(TypedLayout, TypedLayout);
value_from!(ConditionExpression, Condition);
value_from!(Encoding, Encoding);
value_from!(Culture, Culture);
value_from!(LineEndingMode, LineEnding);
value_from!(Url, Uri);
value_from!(CustomValue, Custom);
value_from!(SharedList, List);
value_from!(ValueSet, Set);
value_from!(ObjectRef, Object);

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::seq(v.into_iter().map(Into::into).collect())
    }
}

/// A member (or flags union) of a configuration enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    spec: &'static EnumSpec,
    value: i64,
}

impl EnumValue {
    pub fn new(spec: &'static EnumSpec, value: i64) -> Self {
        Self { spec, value }
    }

    pub fn spec(&self) -> &'static EnumSpec {
        self.spec
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.spec.name_of(self.value) {
            return f.write_str(name);
        }
        if self.spec.flags {
            let names: Vec<&str> = self
                .spec
                .members
                .iter()
                .filter(|(_, bit)| *bit != 0 && self.value & bit == *bit)
                .map(|(name, _)| *name)
                .collect();
            if !names.is_empty() {
                return f.write_str(&names.join(", "));
            }
        }
        write!(f, "{}", self.value)
    }
}

/// Value of a user-defined kind produced by a registered or declared converter
#[derive(Clone)]
pub struct CustomValue {
    pub type_name: &'static str,
    pub value: Arc<dyn Any + Send + Sync>,
    /// Invariant string form
    pub text: Arc<str>,
}

impl CustomValue {
    pub fn new<T: Any + Send + Sync>(type_name: &'static str, value: T, text: impl Into<Arc<str>>) -> Self {
        Self {
            type_name,
            value: Arc::new(value),
            text: text.into(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

/// Equality used when deduplicating set members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetComparer {
    #[default]
    Ordinal,
    OrdinalIgnoreCase,
}

impl SetComparer {
    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        match (self, a, b) {
            (SetComparer::OrdinalIgnoreCase, Value::Str(x), Value::Str(y)) => {
                x.to_lowercase() == y.to_lowercase()
            }
            _ => a == b,
        }
    }
}

/// Insertion-ordered set with a configurable comparer
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    comparer: SetComparer,
    items: Arc<Vec<Value>>,
}

impl ValueSet {
    pub fn new(comparer: SetComparer) -> Self {
        Self {
            comparer,
            items: Arc::new(Vec::new()),
        }
    }

    pub fn comparer(&self) -> SetComparer {
        self.comparer
    }

    /// Returns false when an equal member is already present
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        Arc::make_mut(&mut self.items).push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| self.comparer.equals(item, value))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}
