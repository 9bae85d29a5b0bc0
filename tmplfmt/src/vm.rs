use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::ast::{Argument, Node, ParseTree, VariableCall};
use crate::error::Error;
use crate::path::resolve;
use crate::value::Value;

/// Evaluates parse trees against a context.
///
/// Nodes and arguments are evaluated strictly left to right.  Evaluation
/// suspends only while awaiting async callables.
pub(crate) struct Vm<'ctx> {
    ctx: &'ctx Value,
}

impl<'ctx> Vm<'ctx> {
    pub fn new(ctx: &'ctx Value) -> Vm<'ctx> {
        Vm { ctx }
    }

    /// Renders a tree into a string.
    pub async fn render(&self, tree: &ParseTree) -> Result<String, Error> {
        trace!(nodes = tree.nodes.len(), "rendering template");
        let mut rv = String::new();
        for node in &tree.nodes {
            match node {
                Node::Text(text) => rv.push_str(text),
                Node::Var(call) => {
                    let value = ok!(ok!(self.eval_call(call).await).validate());
                    match value.as_str() {
                        Some(s) => rv.push_str(s),
                        None => rv.push_str(&value.to_string()),
                    }
                }
            }
        }
        Ok(rv)
    }

    /// Evaluates a single variable call.
    ///
    /// If the path resolves to a callable all arguments are evaluated first
    /// and the callable is invoked with them.  Otherwise the arguments are
    /// ignored and the resolved value is returned as is.
    fn eval_call<'a>(&'a self, call: &'a VariableCall) -> BoxFuture<'a, Result<Value, Error>> {
        async move {
            let value = resolve(self.ctx, &call.path);
            if !value.is_callable() {
                return Ok(value);
            }
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(match arg {
                    Argument::Str(s) => Value::from(s.as_str()),
                    Argument::Number(n) => Value::from(*n),
                    Argument::Var(nested) => ok!(self.eval_call(nested).await),
                });
            }
            value.call(&args).await
        }
        .boxed()
    }
}

/// Renders an already parsed template against a context.
///
/// Unlike [`Environment::render_template`](crate::Environment::render_template)
/// this neither consults a cache nor adds any globals: only what is in `ctx`
/// is visible to the template.
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use tmplfmt::{context, parse_template, render_parsed_template};
///
/// let tree = parse_template("Hello {name}!").unwrap();
/// let rv = render_parsed_template(&tree, context! { name => "World" }).await.unwrap();
/// assert_eq!(rv, "Hello World!");
/// # });
/// ```
pub fn render_parsed_template<'a, S: Serialize>(
    tree: &'a ParseTree,
    ctx: S,
) -> impl Future<Output = Result<String, Error>> + Send + 'a {
    let ctx = Value::from_serialize(&ctx);
    async move {
        let ctx = ok!(ctx.validate());
        Vm::new(&ctx).render(tree).await
    }
}
