use std::ops::{Deref, DerefMut};

use crate::error::{Error, ErrorKind};
use crate::value::{Value, ValueKind, ValueRepr};

/// A utility trait that represents the return value of functions.
///
/// It's implemented for the following types:
///
/// * `Rv` where `Rv` implements `Into<Value>`
/// * `Result<Rv, Error>` where `Rv` implements `Into<Value>`
pub trait FunctionResult {
    #[doc(hidden)]
    fn into_result(self) -> Result<Value, Error>;
}

impl<I: Into<Value>> FunctionResult for Result<I, Error> {
    fn into_result(self) -> Result<Value, Error> {
        self.map(Into::into)
    }
}

impl<I: Into<Value>> FunctionResult for I {
    fn into_result(self) -> Result<Value, Error> {
        Ok(self.into())
    }
}

/// Helper trait representing valid function arguments.
///
/// Since it's more convenient to write functions with concrete types
/// instead of values, this helper trait exists to automatically perform
/// this conversion.  It is implemented for functions up to an arity of 5
/// parameters.
///
/// For each argument the conversion is performed via the [`ArgType`]
/// trait which is implemented for many common types.
pub trait FunctionArgs: Sized {
    /// Converts to function arguments from a slice of values.
    #[doc(hidden)]
    fn from_values(values: &[Value]) -> Result<Self, Error>;
}

/// A trait implemented by all function argument types.
///
/// It's implemented for the following types:
///
/// * unsigned integers: [`u8`], [`u16`], [`u32`], [`u64`], [`usize`]
/// * signed integers: [`i8`], [`i16`], [`i32`], [`i64`]
/// * floats: [`f32`], [`f64`]
/// * bool: [`bool`] (any value, by truthiness)
/// * string: [`String`] (any value, by its string form)
/// * values: [`Value`]
///
/// The type is also implemented for optional values (`Option<T>`) which is
/// used to encode optional parameters, and for [`Rest<T>`] which collects
/// the remaining arguments of a call.
///
/// A missing [`Value`] argument is passed as undefined, which mirrors how a
/// template treats paths it cannot resolve.  All other types report a
/// missing argument as an [`ErrorKind::InvalidArguments`] error.
pub trait ArgType: Sized {
    #[doc(hidden)]
    fn from_value(value: Option<&Value>) -> Result<Self, Error>;

    #[doc(hidden)]
    fn from_values(values: &[Value], offset: usize) -> Result<(Self, usize), Error> {
        Ok((ok!(Self::from_value(values.get(offset))), 1))
    }
}

fn missing_argument() -> Error {
    Error::new(ErrorKind::InvalidArguments, "missing argument")
}

macro_rules! tuple_impls {
    ( $( $name:ident )* ) => {
        impl<$($name: ArgType,)*> FunctionArgs for ($($name,)*) {
            fn from_values(values: &[Value]) -> Result<Self, Error> {
                #![allow(non_snake_case, unused)]
                let mut idx = 0;
                $(
                    let ($name, offset) = ok!($name::from_values(values, idx));
                    idx += offset;
                )*
                if values.get(idx).is_some() {
                    Err(Error::new(ErrorKind::InvalidArguments, "too many arguments"))
                } else {
                    Ok(( $($name,)* ))
                }
            }
        }
    };
}

tuple_impls! {}
tuple_impls! { A }
tuple_impls! { A B }
tuple_impls! { A B C }
tuple_impls! { A B C D }
tuple_impls! { A B C D E }

fn unsupported_conversion(kind: ValueKind, target: &str) -> Error {
    Error::new(
        ErrorKind::InvalidArguments,
        format!("cannot convert {kind} to {target}"),
    )
}

macro_rules! primitive_int_try_from {
    ($ty:ident) => {
        impl TryFrom<Value> for $ty {
            type Error = Error;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value.0 {
                    ValueRepr::Bool(val) => TryFrom::try_from(val as u8).ok(),
                    ValueRepr::I64(val) => TryFrom::try_from(val).ok(),
                    ValueRepr::U64(val) => TryFrom::try_from(val).ok(),
                    ValueRepr::F64(val) if (val as i64 as f64 == val) => {
                        TryFrom::try_from(val as i64).ok()
                    }
                    _ => None,
                }
                .ok_or_else(|| unsupported_conversion(value.kind(), stringify!($ty)))
            }
        }

        impl ArgType for $ty {
            fn from_value(value: Option<&Value>) -> Result<Self, Error> {
                match value {
                    Some(value) => TryFrom::try_from(value.clone()),
                    None => Err(missing_argument()),
                }
            }
        }
    };
}

primitive_int_try_from!(u8);
primitive_int_try_from!(u16);
primitive_int_try_from!(u32);
primitive_int_try_from!(u64);
primitive_int_try_from!(usize);
primitive_int_try_from!(i8);
primitive_int_try_from!(i16);
primitive_int_try_from!(i32);
primitive_int_try_from!(i64);

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_number()
            .ok_or_else(|| unsupported_conversion(value.kind(), "f64"))
    }
}

impl TryFrom<Value> for f32 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        f64::try_from(value).map(|val| val as f32)
    }
}

impl ArgType for f64 {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        match value {
            Some(value) => TryFrom::try_from(value.clone()),
            None => Err(missing_argument()),
        }
    }
}

impl ArgType for f32 {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        match value {
            Some(value) => TryFrom::try_from(value.clone()),
            None => Err(missing_argument()),
        }
    }
}

impl ArgType for bool {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        match value {
            Some(value) => Ok(value.is_true()),
            None => Err(missing_argument()),
        }
    }
}

impl ArgType for String {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        match value {
            Some(value) => Ok(value.to_string()),
            None => Err(missing_argument()),
        }
    }
}

impl ArgType for Value {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        Ok(value.cloned().unwrap_or_default())
    }
}

impl<T: ArgType> ArgType for Option<T> {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        match value {
            Some(value) => {
                if value.is_undefined() || value.is_none() {
                    Ok(None)
                } else {
                    T::from_value(Some(value)).map(Some)
                }
            }
            None => Ok(None),
        }
    }
}

/// Utility type to capture remaining arguments.
///
/// In some cases you might want to have a variadic function.  In that case
/// you can define the last argument to a function this way.  The `Rest<T>`
/// type will collect all the remaining arguments here.  It's implemented
/// for all [`ArgType`]s.  The type itself deref's into the inner vector.
///
/// ```
/// # use tmplfmt::value::{Rest, Value};
/// let join = Value::from_function(|values: Rest<String>| values.join("-"));
/// ```
#[derive(Debug)]
pub struct Rest<T>(pub Vec<T>);

impl<T> Deref for Rest<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Rest<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: ArgType> ArgType for Rest<T> {
    fn from_value(value: Option<&Value>) -> Result<Self, Error> {
        Ok(Rest(ok!(value
            .iter()
            .map(|v| T::from_value(Some(v)))
            .collect::<Result<_, _>>())))
    }

    fn from_values(values: &[Value], offset: usize) -> Result<(Self, usize), Error> {
        let args = values.get(offset..).unwrap_or_default();
        Ok((
            Rest(ok!(args
                .iter()
                .map(|v| T::from_value(Some(v)))
                .collect::<Result<_, _>>())),
            args.len(),
        ))
    }
}

impl From<Value> for String {
    fn from(val: Value) -> Self {
        val.to_string()
    }
}
