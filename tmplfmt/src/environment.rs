use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::ast::ParseTree;
use crate::cache::TemplateCache;
use crate::defaults;
use crate::error::Error;
use crate::functions::{AsyncFunction, Function};
use crate::value::{merge_maps, FunctionArgs, FunctionResult, Value, ValueMap};
use crate::vm::Vm;

/// An abstraction that holds the engine configuration.
///
/// This object holds the globals that are visible to every template and the
/// cache of parsed templates.  Cloning an environment is cheap and the clone
/// shares the cache with the original.
///
/// There are generally two ways to construct an environment:
///
/// * [`Environment::new`] creates an environment preconfigured with the base
///   function library (`if`, `and`, `or`, `not` and `concat`).
/// * [`Environment::empty`] creates an environment without globals.
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use tmplfmt::{context, Environment};
///
/// let env = Environment::new();
/// let rv = env
///     .render_template("{if(admin, \"hi boss\", concat(\"hi \", name))}", context! {
///         admin => false,
///         name => "Amy",
///     })
///     .await
///     .unwrap();
/// assert_eq!(rv, "hi Amy");
/// # });
/// ```
#[derive(Clone)]
pub struct Environment {
    globals: ValueMap,
    cache: Arc<TemplateCache>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::empty()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Environment {
    /// Creates a new environment with sensible defaults.
    ///
    /// The environment has the base function library registered as globals
    /// and a template cache of 100 entries.
    pub fn new() -> Environment {
        Environment {
            globals: defaults::get_globals(),
            cache: Arc::default(),
        }
    }

    /// Creates a completely empty environment.
    ///
    /// This environment has no globals.  It still caches parsed templates.
    pub fn empty() -> Environment {
        Environment {
            globals: ValueMap::new(),
            cache: Arc::default(),
        }
    }

    /// Replaces the template cache with an empty one of the given capacity.
    ///
    /// Clones made before this call keep using the old cache.  A capacity
    /// of zero disables caching.
    pub fn set_cache_capacity(&mut self, capacity: usize) {
        self.cache = Arc::new(TemplateCache::new(capacity));
    }

    /// Returns the template cache.
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Adds a global variable.
    ///
    /// Globals are merged below the render context: a context entry with
    /// the same name hides the global.
    pub fn add_global<N, V>(&mut self, name: N, value: V)
    where
        N: Into<Arc<str>>,
        V: Into<Value>,
    {
        self.globals.insert(name.into(), value.into());
    }

    /// Adds a new global function.
    ///
    /// For details about functions have a look at [`functions`](crate::functions).
    /// Functions and other global variables share the same namespace.
    pub fn add_function<N, F, Rv, Args>(&mut self, name: N, f: F)
    where
        N: Into<Arc<str>>,
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs,
    {
        self.add_global(name, Value::from_function(f))
    }

    /// Adds a new async global function.
    pub fn add_async_function<N, F, Rv, Args>(&mut self, name: N, f: F)
    where
        N: Into<Arc<str>>,
        F: AsyncFunction<Rv, Args>,
        Rv: FunctionResult,
        Args: FunctionArgs + Send + 'static,
    {
        self.add_global(name, Value::from_async_function(f))
    }

    /// Removes a global function or variable by name.
    pub fn remove_global(&mut self, name: &str) {
        self.globals.shift_remove(name);
    }

    /// Returns the globals.
    pub fn globals(&self) -> &ValueMap {
        &self.globals
    }

    /// Parses a template through the cache.
    pub fn parse_template(&self, source: &str) -> Result<Arc<ParseTree>, Error> {
        self.cache.get_or_parse(source)
    }

    /// Parses and renders a template.
    ///
    /// The context is merged over the globals of the environment.  The parse
    /// tree is taken from the cache if the exact same template source was
    /// seen before.
    pub fn render_template<'a, S: Serialize>(
        &'a self,
        source: &'a str,
        ctx: S,
    ) -> impl Future<Output = Result<String, Error>> + Send + 'a {
        self.render_template_with_globals(source, ctx, true)
    }

    /// Parses and renders a template, optionally without the globals.
    ///
    /// With `include_globals` set to `false` only the entries of `ctx` are
    /// visible to the template.
    pub fn render_template_with_globals<'a, S: Serialize>(
        &'a self,
        source: &'a str,
        ctx: S,
        include_globals: bool,
    ) -> impl Future<Output = Result<String, Error>> + Send + 'a {
        let ctx = Value::from_serialize(&ctx);
        async move {
            let ctx = ok!(ctx.validate());
            let tree = ok!(self.parse_template(source));
            let ctx = if include_globals {
                merge_maps([Value::from(self.globals.clone()), ctx])
            } else {
                ctx
            };
            Vm::new(&ctx).render(&tree).await
        }
    }
}
