//! The `Reflect` trait and the macros that build accessor tables

use std::any::{Any, TypeId};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::shape::TypeShape;
use super::types::{ConditionExpression, Culture, Encoding, Layout, LineEndingMode, TypedLayout};
use super::value::{EnumValue, SharedList, Value, ValueSet};

/// Compiled property reader
pub type Getter = fn(&dyn Reflect) -> Result<Value, AccessError>;

/// Compiled property writer
pub type Setter = fn(&mut dyn Reflect, Value) -> Result<(), AccessError>;

/// Shared handle to a participating object; identity is the pointer address
pub type ObjectRef = Arc<dyn Reflect>;

/// Failure raised by a compiled getter or setter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("expected {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("{reason}")]
    Failed { reason: String },

    #[error("property is read-only")]
    ReadOnly,
}

impl AccessError {
    pub fn failed(reason: impl Into<String>) -> Self {
        AccessError::Failed {
            reason: reason.into(),
        }
    }
}

/// Upcasts used to recover the concrete type behind `dyn Reflect`
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A type the engine can describe, scan, bind and project
///
/// Implementors return a static [`TypeShape`]; everything else has defaults.
///
/// # Example
///
/// ```
/// use logbind_core::model::{Capabilities, PropertySpec, Reflect, TypeShape, ValueKind};
/// use logbind_core::{field_getter, field_setter};
///
/// #[derive(Default)]
/// struct ConsoleTarget {
///     name: String,
/// }
///
/// static CONSOLE_TARGET: TypeShape = TypeShape {
///     name: "ConsoleTarget",
///     capabilities: Capabilities::TARGET,
///     properties: &[PropertySpec::new("Name", ValueKind::String)
///         .get(field_getter!(ConsoleTarget, name))
///         .set(field_setter!(ConsoleTarget, name: String))],
/// };
///
/// impl Reflect for ConsoleTarget {
///     fn shape(&self) -> &'static TypeShape {
///         &CONSOLE_TARGET
///     }
/// }
///
/// assert_eq!(ConsoleTarget::default().type_name(), "ConsoleTarget");
/// ```
pub trait Reflect: AsAny {
    fn shape(&self) -> &'static TypeShape;

    /// Runtime type name; exceptions report it through the synthetic `Type` property
    fn type_name(&self) -> &str {
        self.shape().name
    }

    /// String form used when the type is projected as opaque
    fn render(&self) -> String {
        self.type_name().to_string()
    }

    /// Entries of a string-keyed map, projected directly
    fn string_map(&self) -> Option<Vec<(String, Value)>> {
        None
    }

    /// Members of a dynamic-member object, materialized on demand
    fn dynamic_members(&self) -> Option<Vec<(String, Value)>> {
        None
    }
}

/// Stable identity of a shared object
pub fn object_id(obj: &ObjectRef) -> usize {
    Arc::as_ptr(obj) as *const () as usize
}

/// Concrete type identity of a reflected object
pub fn type_key(obj: &dyn Reflect) -> TypeId {
    obj.as_any().type_id()
}

/// Recover the concrete target inside a compiled getter
///
/// # Errors
///
/// Returns [`AccessError::TypeMismatch`] when `obj` is not a `T`.
pub fn downcast_target<T: Any>(obj: &dyn Reflect) -> Result<&T, AccessError> {
    obj.as_any()
        .downcast_ref::<T>()
        .ok_or(AccessError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// Recover the concrete target inside a compiled setter
///
/// # Errors
///
/// Returns [`AccessError::TypeMismatch`] when `obj` is not a `T`.
pub fn downcast_target_mut<T: Any>(obj: &mut dyn Reflect) -> Result<&mut T, AccessError> {
    obj.as_any_mut()
        .downcast_mut::<T>()
        .ok_or(AccessError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// Typed extraction of a bound [`Value`] inside a setter
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns [`AccessError::TypeMismatch`] when the variant does not fit.
    fn from_value(value: Value) -> Result<Self, AccessError>;
}

fn mismatch<T>() -> AccessError {
    AccessError::TypeMismatch {
        expected: std::any::type_name::<T>(),
    }
}

macro_rules! from_value_variant {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, AccessError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    _ => Err(mismatch::<$ty>()),
                }
            }
        }
    };
}

from_value_variant!(bool, Bool);
from_value_variant!(i64, Int);
from_value_variant!(char, Char);
from_value_variant!(Duration, Duration);
from_value_variant!(Layout, Layout);
from_value_variant!(TypedLayout, TypedLayout);
from_value_variant!(ConditionExpression, Condition);
from_value_variant!(Encoding, Encoding);
from_value_variant!(Culture, Culture);
from_value_variant!(LineEndingMode, LineEnding);
from_value_variant!(Url, Uri);
from_value_variant!(EnumValue, Enum);
from_value_variant!(ValueSet, Set);
from_value_variant!(SharedList, List);
from_value_variant!(ObjectRef, Object);

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            _ => Err(mismatch::<String>()),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Int(v) => i32::try_from(v)
                .map_err(|_| AccessError::failed(format!("{} is out of range for Int32", v))),
            _ => Err(mismatch::<i32>()),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            _ => Err(mismatch::<f64>()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        let items: Vec<Value> = match value {
            Value::Seq(items) => items.to_vec(),
            Value::List(list) => list.lock().clone(),
            Value::Set(set) => set.iter().cloned().collect(),
            _ => return Err(mismatch::<Vec<T>>()),
        };
        items.into_iter().map(T::from_value).collect()
    }
}

/// Build a [`Getter`] from a closure-like body over `&Type`
///
/// The body's result is converted with `Value::from`.
#[macro_export]
macro_rules! getter {
    ($ty:ty, |$t:ident| $body:expr) => {{
        fn __getter(
            obj: &dyn $crate::model::Reflect,
        ) -> ::std::result::Result<$crate::model::Value, $crate::model::AccessError> {
            let $t: &$ty = $crate::model::downcast_target::<$ty>(obj)?;
            ::std::result::Result::Ok($crate::model::Value::from($body))
        }
        __getter as $crate::model::Getter
    }};
}

/// Build a [`Getter`] whose body returns `Result<Value, AccessError>`
#[macro_export]
macro_rules! try_getter {
    ($ty:ty, |$t:ident| $body:expr) => {{
        fn __getter(
            obj: &dyn $crate::model::Reflect,
        ) -> ::std::result::Result<$crate::model::Value, $crate::model::AccessError> {
            let $t: &$ty = $crate::model::downcast_target::<$ty>(obj)?;
            $body
        }
        __getter as $crate::model::Getter
    }};
}

/// Build a [`Setter`] that extracts the value as `$vty` before running the body
#[macro_export]
macro_rules! setter {
    ($ty:ty, |$t:ident, $v:ident : $vty:ty| $body:expr) => {{
        fn __setter(
            obj: &mut dyn $crate::model::Reflect,
            value: $crate::model::Value,
        ) -> ::std::result::Result<(), $crate::model::AccessError> {
            let $t: &mut $ty = $crate::model::downcast_target_mut::<$ty>(obj)?;
            let $v: $vty = <$vty as $crate::model::FromValue>::from_value(value)?;
            $body;
            ::std::result::Result::Ok(())
        }
        __setter as $crate::model::Setter
    }};
}

/// Build a [`Setter`] whose body returns `Result<(), AccessError>`
#[macro_export]
macro_rules! try_setter {
    ($ty:ty, |$t:ident, $v:ident : $vty:ty| $body:expr) => {{
        fn __setter(
            obj: &mut dyn $crate::model::Reflect,
            value: $crate::model::Value,
        ) -> ::std::result::Result<(), $crate::model::AccessError> {
            let $t: &mut $ty = $crate::model::downcast_target_mut::<$ty>(obj)?;
            let $v: $vty = <$vty as $crate::model::FromValue>::from_value(value)?;
            $body
        }
        __setter as $crate::model::Setter
    }};
}

/// Getter that clones a field
#[macro_export]
macro_rules! field_getter {
    ($ty:ty, $field:ident) => {
        $crate::getter!($ty, |target| target.$field.clone())
    };
}

/// Setter that overwrites a field
#[macro_export]
macro_rules! field_setter {
    ($ty:ty, $field:ident : $vty:ty) => {
        $crate::setter!($ty, |target, value: $vty| target.$field = value)
    };
}

/// Declare a configuration enum together with its [`EnumSpec`](crate::model::EnumSpec)
///
/// ```
/// logbind_core::config_enum! {
///     pub enum Severity { Low = 1, High = 2 }
/// }
///
/// assert_eq!(Severity::SPEC.member("high"), Some(2));
/// ```
#[macro_export]
macro_rules! config_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident = $disc:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant = $disc),+
        }

        impl $name {
            pub const SPEC: $crate::model::EnumSpec = $crate::model::EnumSpec {
                name: stringify!($name),
                members: &[$((stringify!($variant), $disc)),+],
                flags: false,
            };

            pub const KIND: $crate::model::ValueKind = $crate::model::ValueKind::Enum(&Self::SPEC);
        }

        impl ::std::convert::From<$name> for $crate::model::Value {
            fn from(value: $name) -> Self {
                $crate::model::Value::Enum($crate::model::EnumValue::new(&$name::SPEC, value as i64))
            }
        }

        impl $crate::model::FromValue for $name {
            fn from_value(
                value: $crate::model::Value,
            ) -> ::std::result::Result<Self, $crate::model::AccessError> {
                if let $crate::model::Value::Enum(ev) = &value {
                    $(
                        if ev.value() == ($disc as i64) {
                            return ::std::result::Result::Ok($name::$variant);
                        }
                    )+
                }
                ::std::result::Result::Err($crate::model::AccessError::TypeMismatch {
                    expected: stringify!($name),
                })
            }
        }
    };
}
