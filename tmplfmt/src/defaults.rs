use crate::value::ValueMap;

/// The capacity of the parse tree cache of a new environment.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

pub(crate) fn get_globals() -> ValueMap {
    #[allow(unused_mut)]
    let mut rv = ValueMap::new();
    #[cfg(feature = "builtins")]
    {
        use crate::functions;
        use crate::value::Value;

        rv.insert("if".into(), Value::from_function(functions::r#if));
        rv.insert("and".into(), Value::from_function(functions::and));
        rv.insert("or".into(), Value::from_function(functions::or));
        rv.insert("not".into(), Value::from_function(functions::not));
        rv.insert("concat".into(), Value::from_function(functions::concat));
    }
    rv
}
