//! Provides a dynamic value type abstraction.
//!
//! This module gives access to a dynamically typed value which is used by
//! the template engine during execution.
//!
//! For the most part the existence of the value type can be ignored as
//! tmplfmt will perform the necessary conversions for you.  For instance
//! if you write a function that takes a `String` as argument, tmplfmt will
//! automatically convert the value (which might be a number or a string)
//! into its string form.
//!
//! # Converting Values
//!
//! Values are typically created via the [`From`] trait:
//!
//! ```
//! # use tmplfmt::value::Value;
//! let int_value = Value::from(42);
//! let none_value = Value::from(());
//! let true_value = Value::from(true);
//! ```
//!
//! Or via the [`FromIterator`] trait:
//!
//! ```
//! # use tmplfmt::value::Value;
//! // collection into a sequence
//! let value: Value = (1..10).into_iter().collect();
//!
//! // collection into a map
//! let value: Value = [("key", "value")].into_iter().collect();
//! ```
//!
//! Anything that implements [`Serialize`](serde::Serialize) can be turned
//! into a value with [`Value::from_serialize`].
//!
//! # Callables
//!
//! Values can also hold host functions.  These are created with
//! [`Value::from_function`] for plain functions and closures, and
//! [`Value::from_async_function`] for functions returning a future.  The
//! arguments of such functions are converted from values through the
//! [`ArgType`] trait.
//!
//! ```
//! # use tmplfmt::value::Value;
//! let greet = Value::from_function(|name: String| format!("Hello {name}!"));
//! assert!(greet.is_callable());
//! ```
//!
//! # Truthiness
//!
//! The engine treats `undefined`, `none`, `false`, zero, NaN and the empty
//! string as false.  Every other value, including empty sequences, empty
//! maps and all callables, is true.
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind};
use crate::functions::{AsyncFunction, BoxedFunction, Function};

pub use crate::value::argtypes::{ArgType, FunctionArgs, FunctionResult, Rest};
pub use crate::value::serialize::serializing_for_value;

mod argtypes;
mod serialize;

/// The map type used for maps and template contexts.
///
/// Maps keep their insertion order.
pub type ValueMap = IndexMap<Arc<str>, Value>;

/// Describes the kind of value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// The value is undefined.
    Undefined,
    /// The value is the none singleton (`()`)
    None,
    /// The value is a [`bool`]
    Bool,
    /// The value is a number of a supported type.
    Number,
    /// The value is a string.
    String,
    /// The value is a sequence of values.
    Seq,
    /// The value is a key/value mapping.
    Map,
    /// The value is a host function.
    Callable,
    /// The value could not be created from its serialized form.
    Invalid,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = match *self {
            ValueKind::Undefined => "undefined",
            ValueKind::None => "none",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Map => "map",
            ValueKind::Callable => "callable",
            ValueKind::Invalid => "invalid value",
        };
        write!(f, "{ty}")
    }
}

#[derive(Clone)]
pub(crate) enum ValueRepr {
    Undefined,
    None,
    Bool(bool),
    U64(u64),
    I64(i64),
    F64(f64),
    String(Arc<str>),
    Seq(Arc<Vec<Value>>),
    Map(Arc<ValueMap>),
    Callable(BoxedFunction),
    Invalid(Arc<str>),
}

/// Represents a dynamically typed value in the template engine.
#[derive(Clone)]
pub struct Value(pub(crate) ValueRepr);

impl Default for Value {
    fn default() -> Value {
        Value::UNDEFINED
    }
}

/// Formats a float the way it is shown in rendered output.
///
/// Integral floats drop their fractional part, negative zero shows as `0`
/// and the non-finite values show as `NaN`, `Infinity` and `-Infinity`.
fn fmt_f64(f: &mut fmt::Formatter<'_>, val: f64) -> fmt::Result {
    if val.is_nan() {
        f.write_str("NaN")
    } else if val.is_infinite() {
        f.write_str(if val > 0.0 { "Infinity" } else { "-Infinity" })
    } else if val == 0.0 {
        f.write_str("0")
    } else if val.fract() == 0.0 && val.abs() < 1e21 {
        write!(f, "{val:.0}")
    } else {
        write!(f, "{val}")
    }
}

/// Formats a value nested inside a map.  Strings are quoted.
fn fmt_repr(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value.0 {
        ValueRepr::String(ref s) => write!(f, "{:?}", s.as_ref()),
        ValueRepr::Undefined | ValueRepr::None => f.write_str("none"),
        _ => write!(f, "{value}"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ValueRepr::Undefined | ValueRepr::None => Ok(()),
            ValueRepr::Bool(val) => write!(f, "{val}"),
            ValueRepr::U64(val) => write!(f, "{val}"),
            ValueRepr::I64(val) => write!(f, "{val}"),
            ValueRepr::F64(val) => fmt_f64(f, val),
            ValueRepr::String(ref val) => f.write_str(val),
            ValueRepr::Seq(ref items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        ok!(f.write_str(","));
                    }
                    ok!(write!(f, "{item}"));
                }
                Ok(())
            }
            ValueRepr::Map(ref map) => {
                ok!(f.write_str("{"));
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        ok!(f.write_str(", "));
                    }
                    ok!(write!(f, "{:?}: ", key.as_ref()));
                    ok!(fmt_repr(f, value));
                }
                f.write_str("}")
            }
            ValueRepr::Callable(ref func) => write!(f, "<function {}>", func.name()),
            ValueRepr::Invalid(ref err) => write!(f, "<invalid value: {err}>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ValueRepr::Undefined => f.write_str("undefined"),
            ValueRepr::None => f.write_str("none"),
            ValueRepr::Bool(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::U64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::I64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::F64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::String(ref val) => fmt::Debug::fmt(val.as_ref(), f),
            ValueRepr::Seq(ref items) => f.debug_list().entries(items.iter()).finish(),
            ValueRepr::Map(ref map) => f
                .debug_map()
                .entries(map.iter().map(|(k, v)| (k.as_ref(), v)))
                .finish(),
            ValueRepr::Callable(ref func) => fmt::Debug::fmt(func, f),
            ValueRepr::Invalid(ref err) => write!(f, "<invalid value: {err}>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (ValueRepr::Undefined, ValueRepr::Undefined) => true,
            (ValueRepr::None, ValueRepr::None) => true,
            (ValueRepr::Bool(a), ValueRepr::Bool(b)) => a == b,
            (ValueRepr::String(a), ValueRepr::String(b)) => a == b,
            (ValueRepr::Seq(a), ValueRepr::Seq(b)) => a == b,
            (ValueRepr::Map(a), ValueRepr::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (ValueRepr::Callable(a), ValueRepr::Callable(b)) => a.ptr_eq(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b) == Some(Ordering::Equal),
                _ => false,
            },
        }
    }
}

impl Value {
    /// The undefined value.
    ///
    /// This is what a path that cannot be resolved evaluates to.
    pub const UNDEFINED: Value = Value(ValueRepr::Undefined);

    /// Creates a callable value from a function.
    ///
    /// Arguments are converted through [`ArgType`], the return value through
    /// [`FunctionResult`].  Passing more arguments than the function accepts
    /// is an [`ErrorKind::InvalidArguments`] error.
    ///
    /// ```
    /// # use tmplfmt::value::{Value, Rest};
    /// let sum = Value::from_function(|values: Rest<f64>| -> f64 {
    ///     values.iter().sum()
    /// });
    /// ```
    pub fn from_function<F, Rv, Args>(f: F) -> Value
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs,
    {
        Value(ValueRepr::Callable(BoxedFunction::new(f)))
    }

    /// Creates a callable value from an async function.
    ///
    /// The function receives its converted arguments and returns a future.
    /// The engine awaits the future before it continues rendering.
    ///
    /// ```
    /// # use tmplfmt::value::Value;
    /// let fetch = Value::from_async_function(|id: u64| async move {
    ///     format!("user-{id}")
    /// });
    /// ```
    pub fn from_async_function<F, Rv, Args>(f: F) -> Value
    where
        F: AsyncFunction<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs + Send + 'static,
    {
        Value(ValueRepr::Callable(BoxedFunction::new_async(f)))
    }

    /// Returns the kind of the value.
    pub fn kind(&self) -> ValueKind {
        match self.0 {
            ValueRepr::Undefined => ValueKind::Undefined,
            ValueRepr::None => ValueKind::None,
            ValueRepr::Bool(_) => ValueKind::Bool,
            ValueRepr::U64(_) | ValueRepr::I64(_) | ValueRepr::F64(_) => ValueKind::Number,
            ValueRepr::String(_) => ValueKind::String,
            ValueRepr::Seq(_) => ValueKind::Seq,
            ValueRepr::Map(_) => ValueKind::Map,
            ValueRepr::Callable(_) => ValueKind::Callable,
            ValueRepr::Invalid(_) => ValueKind::Invalid,
        }
    }

    /// Is this value true?
    pub fn is_true(&self) -> bool {
        match self.0 {
            ValueRepr::Undefined | ValueRepr::None | ValueRepr::Invalid(_) => false,
            ValueRepr::Bool(val) => val,
            ValueRepr::U64(val) => val != 0,
            ValueRepr::I64(val) => val != 0,
            // NaN compares unequal to zero but is false all the same
            ValueRepr::F64(val) => val != 0.0 && !val.is_nan(),
            ValueRepr::String(ref s) => !s.is_empty(),
            ValueRepr::Seq(_) | ValueRepr::Map(_) | ValueRepr::Callable(_) => true,
        }
    }

    /// Returns `true` if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self.0, ValueRepr::Undefined)
    }

    /// Returns `true` if this value is none.
    pub fn is_none(&self) -> bool {
        matches!(self.0, ValueRepr::None)
    }

    /// Returns `true` if this value can be called.
    pub fn is_callable(&self) -> bool {
        matches!(self.0, ValueRepr::Callable(_))
    }

    /// If the value is a string, return it.
    pub fn as_str(&self) -> Option<&str> {
        match self.0 {
            ValueRepr::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self.0 {
            ValueRepr::U64(val) => Some(val as f64),
            ValueRepr::I64(val) => Some(val as f64),
            ValueRepr::F64(val) => Some(val),
            _ => None,
        }
    }

    /// If the value is a sequence, return its items.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self.0 {
            ValueRepr::Seq(ref items) => Some(&items[..]),
            _ => None,
        }
    }

    /// If the value is a map, return it.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self.0 {
            ValueRepr::Map(ref map) => Some(map),
            _ => None,
        }
    }

    /// Returns the length of the contained value.
    ///
    /// Strings report their length in characters.  Values without a length
    /// return `None`.
    pub fn len(&self) -> Option<usize> {
        match self.0 {
            ValueRepr::String(ref s) => Some(s.chars().count()),
            ValueRepr::Seq(ref items) => Some(items.len()),
            ValueRepr::Map(ref map) => Some(map.len()),
            _ => None,
        }
    }

    /// Looks up an attribute by name.
    ///
    /// Maps return the entry stored under the key.  Sequences and strings
    /// support the `length` attribute and integer names as indexes.  Anything
    /// else is undefined.
    ///
    /// ```
    /// # use tmplfmt::{context, value::Value};
    /// let ctx = context! { user => context! { name => "Amy" } };
    /// let name = ctx.get_attr("user").get_attr("name");
    /// assert_eq!(name.as_str(), Some("Amy"));
    /// ```
    pub fn get_attr(&self, key: &str) -> Value {
        match self.0 {
            ValueRepr::Map(ref map) => map.get(key).cloned().unwrap_or_default(),
            ValueRepr::Seq(_) | ValueRepr::String(_) => {
                if key == "length" {
                    self.len().map(Value::from).unwrap_or_default()
                } else {
                    match key.parse::<usize>() {
                        Ok(idx) => self.get_index(idx),
                        Err(_) => Value::UNDEFINED,
                    }
                }
            }
            _ => Value::UNDEFINED,
        }
    }

    /// Looks up an item by index.
    ///
    /// Strings are indexed by character.
    pub fn get_index(&self, idx: usize) -> Value {
        match self.0 {
            ValueRepr::Seq(ref items) => items.get(idx).cloned().unwrap_or_default(),
            ValueRepr::String(ref s) => s
                .chars()
                .nth(idx)
                .map(Value::from)
                .unwrap_or_default(),
            ValueRepr::Map(ref map) => map
                .get(idx.to_string().as_str())
                .cloned()
                .unwrap_or_default(),
            _ => Value::UNDEFINED,
        }
    }

    /// Calls the value with the given arguments.
    ///
    /// Calling a value that is not callable is an
    /// [`ErrorKind::InvalidOperation`] error.  Errors produced by the function
    /// are returned unchanged.
    ///
    /// ```
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// # use tmplfmt::{args, value::Value};
    /// let upper = Value::from_function(|s: String| s.to_uppercase());
    /// let rv = upper.call(&args!("hello")).await.unwrap();
    /// assert_eq!(rv.as_str(), Some("HELLO"));
    /// # });
    /// ```
    pub fn call<'a>(
        &'a self,
        args: &'a [Value],
    ) -> impl Future<Output = Result<Value, Error>> + Send + 'a {
        async move {
            match self.0 {
                ValueRepr::Callable(ref func) => func.invoke(args).await,
                _ => Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("{} is not callable", self.kind()),
                )),
            }
        }
    }

    /// Returns the serialization error if this value is invalid.
    pub(crate) fn validate(self) -> Result<Value, Error> {
        match self.0 {
            ValueRepr::Invalid(ref err) => {
                Err(Error::new(ErrorKind::BadSerialization, err.to_string()))
            }
            _ => Ok(self),
        }
    }
}

/// Merges multiple maps into one.
///
/// Entries of later maps override entries of earlier ones.  Values that are
/// not maps are skipped.
///
/// ```
/// # use tmplfmt::{context, value::merge_maps};
/// let base = context! { a => 1, b => 2 };
/// let overrides = context! { b => 3 };
/// let merged = merge_maps([base, overrides]);
/// assert_eq!(merged.get_attr("b"), 3.into());
/// ```
pub fn merge_maps<I>(iter: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut rv = ValueMap::new();
    for value in iter {
        if let ValueRepr::Map(ref map) = value.0 {
            rv.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    Value::from(rv)
}

macro_rules! value_from {
    ($src:ty, $dst:ident) => {
        impl From<$src> for Value {
            #[inline(always)]
            fn from(val: $src) -> Self {
                Value(ValueRepr::$dst(val as _))
            }
        }
    };
}

value_from!(bool, Bool);
value_from!(u8, U64);
value_from!(u16, U64);
value_from!(u32, U64);
value_from!(u64, U64);
value_from!(usize, U64);
value_from!(i8, I64);
value_from!(i16, I64);
value_from!(i32, I64);
value_from!(i64, I64);
value_from!(f32, F64);
value_from!(f64, F64);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value(ValueRepr::None)
    }
}

impl From<char> for Value {
    fn from(val: char) -> Self {
        Value::from(val.to_string())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value(ValueRepr::String(Arc::from(val)))
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value(ValueRepr::String(Arc::from(val)))
    }
}

impl From<Arc<str>> for Value {
    fn from(val: Arc<str>) -> Self {
        Value(ValueRepr::String(val))
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(val: Cow<'a, str>) -> Self {
        Value::from(val.as_ref())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(val: Option<T>) -> Self {
        match val {
            Some(val) => val.into(),
            None => Value(ValueRepr::None),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(val: Vec<T>) -> Self {
        val.into_iter().collect()
    }
}

impl From<ValueMap> for Value {
    fn from(val: ValueMap) -> Self {
        Value(ValueRepr::Map(Arc::new(val)))
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Value(ValueRepr::Seq(Arc::new(
            iter.into_iter().map(Into::into).collect(),
        )))
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Value::from(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<ValueMap>(),
        )
    }
}
