// `ok!` and `some!` are less bloaty alternatives to the standard library's try operator (`?`).
// Since we do not need type conversions in this crate we can fall back to much easier match
// patterns that compile faster and produce less bloaty code.

macro_rules! ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => return Err(err),
        }
    };
}

macro_rules! some {
    ($expr:expr) => {
        match $expr {
            Some(val) => val,
            None => return None,
        }
    };
}

/// Hidden utility module for the [`context!`](crate::context!) macro.
#[doc(hidden)]
pub mod __context {
    use crate::value::{Value, ValueMap};

    #[inline(always)]
    pub fn make() -> ValueMap {
        ValueMap::default()
    }

    #[inline(always)]
    pub fn add(ctx: &mut ValueMap, key: &'static str, value: Value) {
        ctx.insert(key.into(), value);
    }

    #[inline(always)]
    pub fn build(ctx: ValueMap) -> Value {
        Value::from(ctx)
    }
}

/// Creates a template context from keys and values.
///
/// ```rust
/// # use tmplfmt::context;
/// let ctx = context!{
///     name => "Peter",
///     location => "World",
/// };
/// ```
///
/// Alternatively if the variable name matches the key name it can
/// be omitted:
///
/// ```rust
/// # use tmplfmt::context;
/// let name = "Peter";
/// let ctx = context!{ name };
/// ```
///
/// Values go through [`Value::from_serialize`](crate::Value::from_serialize)
/// so anything serializable can be passed.  Existing [`Value`](crate::Value)s,
/// callables included, are passed through unchanged:
///
/// ```rust
/// # use tmplfmt::{context, Value};
/// let ctx = context! {
///     user => context!(name => "Amy"),
///     shout => Value::from_function(|s: String| s.to_uppercase()),
/// };
/// ```
///
/// Other maps can be merged in with a leading `..`.  Keys given explicitly
/// take precedence, then merged values from left to right.
///
/// ```rust
/// # use tmplfmt::context;
/// let base = context! { a => "A", b => "B" };
/// let ctx = context! { b => "override", ..base };
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::__context::build($crate::__context::make())
    };
    (
        $($key:ident $(=> $value:expr)?),*
        $(, .. $ctx:expr),* $(,)?
    ) => {{
        let mut ctx = $crate::__context::make();
        $(
            $crate::__context_pair!(ctx, $key $(=> $value)?);
        )*
        let ctx = $crate::__context::build(ctx);
        let merge_ctx = [
            $(
                $crate::value::Value::from_serialize(&$ctx),
            )*
        ];
        if merge_ctx.is_empty() {
            ctx
        } else {
            $crate::value::merge_maps(
                merge_ctx.into_iter().rev().chain(::std::iter::once(ctx)))
        }
    }};
    (
        $(.. $ctx:expr),* $(,)?
    ) => {{
        $crate::value::merge_maps([
            $(
                $crate::value::Value::from_serialize(&$ctx),
            )*
        ].into_iter().rev())
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __context_pair {
    ($ctx:ident, $key:ident) => {{
        $crate::__context_pair!($ctx, $key => $key);
    }};
    ($ctx:ident, $key:ident => $value:expr) => {
        $crate::__context::add(
            &mut $ctx,
            stringify!($key),
            $crate::value::Value::from_serialize(&$value),
        );
    };
}

/// Creates a vector of argument values for [`Value::call`](crate::Value::call).
///
/// ```
/// # use tmplfmt::{args, Value};
/// let args = args!("a", 1, true);
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::value::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Value::from_serialize(&$arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use crate::value::{Value, ValueKind};

    #[test]
    fn test_context_merge_precedence() {
        let base = context! { a => "A", b => "B" };
        let ctx = context! { b => "override", ..base };
        assert_eq!(ctx.kind(), ValueKind::Map);
        assert_eq!(ctx.get_attr("a").as_str(), Some("A"));
        assert_eq!(ctx.get_attr("b").as_str(), Some("override"));
    }

    #[test]
    fn test_context_keeps_values() {
        let f = Value::from_function(|| "hi");
        let ctx = context! { f };
        assert!(ctx.get_attr("f").is_callable());
    }
}
