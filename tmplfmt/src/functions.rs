//! Callable values and the base function library.
//!
//! Functions are plain values: anything placed into the render context or
//! registered as a global can be called from a template when it holds a
//! callable created with [`Value::from_function`] or
//! [`Value::from_async_function`].
//!
//! # Custom Functions
//!
//! A custom function is just a rust function or closure taking up to five
//! arguments that implement [`ArgType`](crate::value::ArgType) and returning
//! something that implements [`FunctionResult`].
//!
//! ```rust
//! # use tmplfmt::Environment;
//! # let mut env = Environment::new();
//! use tmplfmt::{Error, ErrorKind};
//!
//! fn read_file(name: String) -> Result<String, Error> {
//!     std::fs::read_to_string(&name)
//!         .map_err(|e| Error::new(
//!             ErrorKind::InvalidOperation,
//!             "cannot load file"
//!         ).with_source(e))
//! }
//!
//! env.add_function("read_file", read_file);
//! ```
//!
//! Async functions return a future that is awaited while rendering:
//!
//! ```rust
//! # use tmplfmt::Environment;
//! # let mut env = Environment::new();
//! env.add_async_function("presence", |user: String| async move {
//!     format!("{user} is online")
//! });
//! ```
//!
//! # Built-in Functions
//!
//! When the `builtins` feature is enabled the functions in this module are
//! registered with every [`Environment::new`](crate::Environment::new).
//! Arguments are always evaluated before a function runs, so `if` sees both
//! branches already computed.
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::Error;
use crate::value::{FunctionArgs, FunctionResult, Value};

type SyncFunc = dyn Fn(&[Value]) -> Result<Value, Error> + Sync + Send + 'static;
type AsyncFunc =
    dyn Fn(&[Value]) -> BoxFuture<'static, Result<Value, Error>> + Sync + Send + 'static;

#[derive(Clone)]
enum Callable {
    Sync(Arc<SyncFunc>),
    Async(Arc<AsyncFunc>),
}

/// A type-erased function as stored in a callable [`Value`].
#[derive(Clone)]
pub(crate) struct BoxedFunction {
    func: Callable,
    name: &'static str,
}

/// Marker that prevents foreign implementations of the function traits.
#[doc(hidden)]
pub struct SealedMarker;

/// A utility trait that represents global functions.
///
/// This trait is used by [`Value::from_function`] and
/// [`Environment::add_function`](crate::Environment::add_function).  It's
/// implemented for functions and closures of up to five arguments.
pub trait Function<Rv, Args>: Send + Sync + 'static {
    /// Calls a function with the given arguments.
    #[doc(hidden)]
    fn invoke(&self, args: Args, _: SealedMarker) -> Rv;
}

/// A utility trait that represents async global functions.
///
/// This is the async counterpart of [`Function`]: the function returns a
/// future which must be `Send` and `'static`, so arguments are passed by
/// value.
pub trait AsyncFunction<Rv, Args>: Send + Sync + 'static {
    /// The future returned by the function.
    #[doc(hidden)]
    type Future: Future<Output = Rv> + Send + 'static;

    /// Calls a function with the given arguments.
    #[doc(hidden)]
    fn invoke(&self, args: Args, _: SealedMarker) -> Self::Future;
}

macro_rules! tuple_impls {
    ( $( $name:ident )* ) => {
        impl<Func, Rv, $($name),*> Function<Rv, ($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Rv + Send + Sync + 'static,
            Rv: FunctionResult,
        {
            fn invoke(&self, args: ($($name,)*), _: SealedMarker) -> Rv {
                #[allow(non_snake_case)]
                let ($($name,)*) = args;
                (self)($($name,)*)
            }
        }

        impl<Func, Fut, Rv, $($name),*> AsyncFunction<Rv, ($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Rv> + Send + 'static,
            Rv: FunctionResult,
        {
            type Future = Fut;

            fn invoke(&self, args: ($($name,)*), _: SealedMarker) -> Fut {
                #[allow(non_snake_case)]
                let ($($name,)*) = args;
                (self)($($name,)*)
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

impl BoxedFunction {
    /// Creates a new boxed function from a sync function.
    pub fn new<F, Rv, Args>(f: F) -> BoxedFunction
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs,
    {
        BoxedFunction {
            func: Callable::Sync(Arc::new(move |args: &[Value]| -> Result<Value, Error> {
                Function::invoke(&f, ok!(Args::from_values(args)), SealedMarker).into_result()
            })),
            name: std::any::type_name::<F>(),
        }
    }

    /// Creates a new boxed function from an async function.
    ///
    /// Arguments are converted before the future is created so that the
    /// future owns everything it needs.
    pub fn new_async<F, Rv, Args>(f: F) -> BoxedFunction
    where
        F: AsyncFunction<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs + Send + 'static,
    {
        let f = Arc::new(f);
        BoxedFunction {
            func: Callable::Async(Arc::new(
                move |args: &[Value]| -> BoxFuture<'static, Result<Value, Error>> {
                    let args = Args::from_values(args);
                    let f = f.clone();
                    async move {
                        let fut = AsyncFunction::invoke(&*f, ok!(args), SealedMarker);
                        fut.await.into_result()
                    }
                    .boxed()
                },
            )),
            name: std::any::type_name::<F>(),
        }
    }

    /// Invokes the function, awaiting it if it is async.
    pub async fn invoke(&self, args: &[Value]) -> Result<Value, Error> {
        match self.func {
            Callable::Sync(ref f) => f(args),
            Callable::Async(ref f) => f(args).await,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ptr_eq(&self, other: &BoxedFunction) -> bool {
        match (&self.func, &other.func) {
            (Callable::Sync(a), Callable::Sync(b)) => Arc::ptr_eq(a, b),
            (Callable::Async(a), Callable::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for BoxedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            if self.name.is_empty() {
                "BoxedFunction"
            } else {
                self.name
            }
        )
    }
}

#[cfg(feature = "builtins")]
mod builtins {
    use super::*;

    use crate::value::Rest;

    /// Returns `then` if `cond` is true, otherwise `otherwise`.
    ///
    /// Both branches were already evaluated when this runs.  A missing
    /// branch renders as the empty string.
    #[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
    pub fn r#if(cond: Value, then: Value, otherwise: Value) -> Value {
        if cond.is_true() {
            then
        } else {
            otherwise
        }
    }

    /// Returns `true` if every argument is true.
    ///
    /// Without arguments this is `true`.
    #[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
    pub fn and(values: Rest<Value>) -> bool {
        values.iter().all(Value::is_true)
    }

    /// Returns `true` if at least one argument is true.
    #[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
    pub fn or(values: Rest<Value>) -> bool {
        values.iter().any(Value::is_true)
    }

    /// Negates the argument.
    #[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
    pub fn not(value: Value) -> bool {
        !value.is_true()
    }

    /// Joins the string forms of all arguments.
    #[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
    pub fn concat(values: Rest<Value>) -> String {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_logic() {
            assert!(and(Rest(vec![])));
            assert!(!or(Rest(vec![])));
            assert!(and(Rest(vec![Value::from(1), Value::from("x")])));
            assert!(!and(Rest(vec![Value::from(1), Value::from("")])));
            assert!(or(Rest(vec![Value::UNDEFINED, Value::from(true)])));
            assert!(not(Value::from(0)));
        }

        #[test]
        fn test_concat() {
            let values = vec![Value::from("a"), Value::from(1.0), Value::UNDEFINED, Value::from("b")];
            assert_eq!(concat(Rest(values)), "a1b");
        }

        #[test]
        fn test_if() {
            assert_eq!(r#if(Value::from(true), Value::from("Y"), Value::from("N")), Value::from("Y"));
            assert_eq!(r#if(Value::from(""), Value::from("Y"), Value::from("N")), Value::from("N"));
        }
    }
}

#[cfg(feature = "builtins")]
pub use self::builtins::*;
