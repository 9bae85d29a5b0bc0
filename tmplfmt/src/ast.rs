//! The parse tree of a template.
//!
//! A tree is plain owned data.  It holds no references into the template
//! source and no links back to parents, so it can be cached and shared
//! between threads freely.
use std::fmt;

/// A parsed template.
#[derive(Clone, PartialEq, Default)]
pub struct ParseTree {
    /// The nodes in source order.
    pub nodes: Vec<Node>,
}

/// A node in the parse tree.
#[derive(Clone, PartialEq)]
pub enum Node {
    /// Literal text with escapes already resolved.
    Text(String),
    /// An injected variable: `{path}` or `{path(args...)}`.
    Var(VariableCall),
}

/// A path lookup with optional call arguments.
///
/// The path is never empty.  `args` is empty both for `{a}` and `{a()}`;
/// the two forms render the same.
#[derive(Clone, PartialEq)]
pub struct VariableCall {
    /// The identifier path, verbatim.
    pub path: String,
    /// The arguments in source order.
    pub args: Vec<Argument>,
}

/// An argument to a call.
#[derive(Clone, PartialEq)]
pub enum Argument {
    /// A quoted string with escapes resolved.
    Str(String),
    /// A numeric literal.
    Number(f64),
    /// A nested lookup.  Without parentheses it is a plain property
    /// reference that is only called if it resolves to a callable.
    Var(VariableCall),
}

impl fmt::Debug for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Var(call) => fmt::Debug::fmt(call, f),
        }
    }
}

impl fmt::Debug for VariableCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Var");
        s.field("path", &self.path);
        if !self.args.is_empty() {
            s.field("args", &self.args);
        }
        s.finish()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Str(s) => fmt::Debug::fmt(s, f),
            Argument::Number(n) => fmt::Debug::fmt(n, f),
            Argument::Var(call) => fmt::Debug::fmt(call, f),
        }
    }
}
