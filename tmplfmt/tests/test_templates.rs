use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use similar_asserts::assert_eq;

use tmplfmt::value::{Rest, Value};
use tmplfmt::{context, Environment, Error, ErrorKind};

async fn render<S: Serialize>(source: &str, ctx: S) -> Result<String, Error> {
    Environment::new().render_template(source, ctx).await
}

#[tokio::test]
async fn test_plain_text() {
    assert_eq!(render("just text", ()).await.unwrap(), "just text");
    assert_eq!(render("", ()).await.unwrap(), "");
    assert_eq!(render(r"\{literal\}", ()).await.unwrap(), "{literal}");
    assert_eq!(render(r"a\\b\", ()).await.unwrap(), r"a\b");
}

#[tokio::test]
async fn test_lookups() {
    let ctx = context! {
        user => context! { name => "Amy", tags => vec!["a", "b", "c"] },
        count => 3,
        ratio => 0.5,
        flag => true,
        nothing => (),
    };
    assert_eq!(
        render(
            "{user.name} {count} {ratio} {flag} [{nothing}] [{missing}] [{user.missing.deeper}]",
            &ctx
        )
        .await
        .unwrap(),
        "Amy 3 0.5 true [] [] []"
    );
    assert_eq!(
        render("{user.tags} {user.tags[1]} {user.tags.length} {user.name.length}", &ctx)
            .await
            .unwrap(),
        "a,b,c b 3 3"
    );
}

#[tokio::test]
async fn test_call_syntax_on_plain_values() {
    let ctx = context! { user => context! { name => "Amy" } };
    assert_eq!(render("{user.name}", &ctx).await.unwrap(), "Amy");
    assert_eq!(render("{user.name()}", &ctx).await.unwrap(), "Amy");
    // arguments of non-callables are not evaluated
    assert_eq!(
        render("{user.name(boom())}", context! {
            user => context! { name => "Amy" },
            boom => Value::from_function(|| -> Result<Value, Error> {
                Err(Error::new(ErrorKind::InvalidOperation, "boom"))
            }),
        })
        .await
        .unwrap(),
        "Amy"
    );
}

#[tokio::test]
async fn test_if() {
    let ctx = context! { a => true, b => "Y", c => "N" };
    assert_eq!(render("{if(a,b,c)}", &ctx).await.unwrap(), "Y");
    assert_eq!(render("{if(not(a),b,c)}", &ctx).await.unwrap(), "N");
    assert_eq!(render("{if(missing,b)}", &ctx).await.unwrap(), "");
}

#[tokio::test]
async fn test_if_evaluates_both_branches() {
    let ctx = context! {
        a => true,
        b => "Y",
        boom => Value::from_function(|| -> Result<Value, Error> {
            Err(Error::new(ErrorKind::InvalidOperation, "boom"))
        }),
    };
    let err = render("{if(a,b,boom())}", &ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(err.detail(), Some("boom"));
}

#[tokio::test]
async fn test_logic() {
    let ctx = context! { t => true, f => false, zero => 0, empty => "", list => Vec::<i32>::new() };
    assert_eq!(
        render("{and()} {and(t, 1, \"x\")} {and(t, zero)} {or()} {or(f, empty, list)}", &ctx)
            .await
            .unwrap(),
        "true true false false true"
    );
    assert_eq!(render("{not(missing)} {not(t)}", &ctx).await.unwrap(), "true false");
}

#[tokio::test]
async fn test_concat() {
    assert_eq!(render(r#"{concat("a",1,"b")}"#, ()).await.unwrap(), "a1b");
    assert_eq!(
        render(r#"{concat(x, " ", missing, 2.5)}"#, context! { x => "y" })
            .await
            .unwrap(),
        "y 2.5"
    );
}

#[tokio::test]
async fn test_context_overrides_globals() {
    let mut ctx = BTreeMap::new();
    ctx.insert(
        "concat",
        Value::from_function(|_: Rest<Value>| "overridden"),
    );
    ctx.insert("if", Value::from("not a function"));
    assert_eq!(
        render("{concat(1, 2)} {if(1, 2, 3)}", &ctx).await.unwrap(),
        "overridden not a function"
    );
}

#[tokio::test]
async fn test_without_globals() {
    let env = Environment::new();
    let rv = env
        .render_template_with_globals("[{concat(\"a\")}]", (), false)
        .await
        .unwrap();
    assert_eq!(rv, "[]");
}

#[tokio::test]
async fn test_arguments_evaluated_left_to_right() {
    let counter = Arc::new(AtomicUsize::new(0));
    let next = {
        let counter = counter.clone();
        Value::from_function(move || counter.fetch_add(1, Ordering::SeqCst) as u64)
    };
    let ctx = context! { next };
    assert_eq!(
        render("{concat(next(), next(), concat(next(), next()))} {next}", &ctx)
            .await
            .unwrap(),
        "0123 4"
    );
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_nested_callables_in_maps() {
    let ctx = context! {
        api => context! {
            greet => Value::from_function(|name: String| format!("hi {name}")),
        },
        user => "Amy",
    };
    assert_eq!(render("{api.greet(user)}", &ctx).await.unwrap(), "hi Amy");
}

#[tokio::test]
async fn test_syntax_error() {
    let err = render("{unclosed", ()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[tokio::test]
async fn test_repeated_renders() {
    let env = Environment::new();
    let source = "{a} and {concat(b, a)}";
    let first = env.render_template(source, context! { a => 1, b => "x" }).await.unwrap();
    let second = env.render_template(source, context! { a => 1, b => "x" }).await.unwrap();
    assert_eq!(first, "1 and x1");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_deeply_nested_calls() {
    let source = format!("{{{}\"x\"{}}}", "concat(".repeat(150), ")".repeat(150));
    assert_eq!(render(&source, ()).await.unwrap(), "x");

    let source = format!("{{{}\"x\"{}}}", "concat(".repeat(20_000), ")".repeat(20_000));
    let err = render(&source, ()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}
