//! <div align=center>
//!   <p><strong>tmplfmt: a tiny formatter for injected-variable templates</strong></p>
//! </div>
//!
//! tmplfmt renders short text templates such as status lines or chat
//! replies.  A template is literal text with injected variables in braces.
//! An injected variable looks up a path in the render context and, if the
//! value found there is a function, calls it:
//!
//! ```text
//! Hello {user.name}!  You have {count(user.inbox)} new messages.
//! {if(user.admin, "admin", "member")} since {user.joined}
//! ```
//!
//! # Syntax
//!
//! * Text outside of braces is copied verbatim.  A backslash escapes the
//!   next character, so `\{` produces a literal brace.
//! * `{path}` looks up a value.  Paths use dots and brackets:
//!   `user.name`, `items[0]`, `map["key with spaces"]`.  Strings and
//!   sequences have a `length`.
//! * `{path(arg, ...)}` calls the value at `path`.  Arguments are double
//!   quoted strings (`"a \"quoted\" word"`), numbers (`42`, `1.5`) or other
//!   variables, which may be calls themselves: `{f(g(1), x)}`.
//! * Paths that cannot be resolved render as the empty string.  Writing
//!   call syntax on something that is not a function just renders the value.
//!
//! All arguments are evaluated before a function is called, left to right.
//! There are no operators, loops or assignments.
//!
//! # Example
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use tmplfmt::{context, Environment};
//!
//! let mut env = Environment::new();
//! env.add_function("upper", |s: String| s.to_uppercase());
//!
//! let rv = env
//!     .render_template("Hello {upper(name)}!", context! { name => "World" })
//!     .await
//!     .unwrap();
//! assert_eq!(rv, "Hello WORLD!");
//! # });
//! ```
//!
//! Rendering is async because functions in the context may be async.  Sync
//! functions are created with [`Value::from_function`], async ones with
//! [`Value::from_async_function`].  Errors from functions abort the render
//! and are returned unchanged.
//!
//! # Base Functions
//!
//! [`Environment::new`] registers these globals:
//!
//! * `if(cond, then, else)`: picks `then` or `else` by the truthiness of
//!   `cond`.  Both branches are evaluated before the choice is made.
//! * `and(...)` / `or(...)`: logical conjunction and disjunction.
//! * `not(value)`: logical negation.
//! * `concat(...)`: joins the string forms of all arguments.
//!
//! `undefined`, `none`, `false`, `0`, `NaN` and `""` are false, everything
//! else is true.  Context entries with the same names replace these.
//!
//! # Caching
//!
//! Every [`Environment`] keeps a bounded cache of parse trees keyed by the
//! template source, 100 entries by default.  When it is full the oldest
//! entry is dropped.  [`parse_template`] and [`render_parsed_template`] can
//! be used to manage parsing manually.
//!
//! # Optional Features
//!
//! - `builtins`: enables the base functions.  Enabled by default.
//! - `tracing`: emits [`tracing`](https://docs.rs/tracing) events for
//!   parsing, caching and rendering.
//! - `unstable_machinery`: exposes the path resolver.  No stability
//!   guarantees.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

#[macro_use]
mod macros;
#[macro_use]
mod tracing_macros;

mod cache;
mod defaults;
mod environment;
mod error;
mod parser;
mod path;
mod vm;

pub mod ast;
pub mod functions;
pub mod value;

pub use self::cache::TemplateCache;
pub use self::defaults::DEFAULT_CACHE_CAPACITY;
pub use self::environment::Environment;
pub use self::error::{Error, ErrorKind};
pub use self::parser::parse_template;
pub use self::vm::render_parsed_template;

/// Re-export for convenience.
pub use self::value::Value;

pub use self::macros::__context;

/// This module gives access to the low level machinery.
///
/// This module is only provided by the `unstable_machinery` feature and does not
/// have a stable interface.  It mostly exists for internal testing purposes and
/// for debugging.
#[cfg(feature = "unstable_machinery")]
#[cfg_attr(docsrs, doc(cfg(feature = "unstable_machinery")))]
pub mod machinery {
    #![allow(missing_docs)]
    pub use crate::path::{resolve, split_path};
}
