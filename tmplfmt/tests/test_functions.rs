use std::time::Duration;

use similar_asserts::assert_eq;

use tmplfmt::value::{Rest, Value};
use tmplfmt::{args, context, Environment, Error, ErrorKind};

#[tokio::test]
async fn test_async_function_in_context() {
    let fetch = Value::from_async_function(|id: u64| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        format!("user-{id}")
    });
    let rv = Environment::new()
        .render_template("[{fetch(42)}] [{fetch(7)}]", context! { fetch })
        .await
        .unwrap();
    assert_eq!(rv, "[user-42] [user-7]");
}

#[tokio::test]
async fn test_async_global() {
    let mut env = Environment::new();
    env.add_async_function("lookup", |key: String| async move {
        tokio::task::yield_now().await;
        key.to_uppercase()
    });
    env.add_function("wrap", |s: String| format!("<{s}>"));
    let rv = env
        .render_template("{wrap(lookup(name))}", context! { name => "amy" })
        .await
        .unwrap();
    assert_eq!(rv, "<AMY>");
}

#[tokio::test]
async fn test_async_error_propagates() {
    let fail = Value::from_async_function(|| async move {
        Err::<Value, _>(Error::new(ErrorKind::InvalidOperation, "backend down"))
    });
    let err = Environment::new()
        .render_template("before {fail()} after", context! { fail })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(err.detail(), Some("backend down"));
}

#[tokio::test]
async fn test_error_source_is_kept() {
    let read = Value::from_function(|| -> Result<Value, Error> {
        Err(Error::new(ErrorKind::InvalidOperation, "cannot load file").with_source(
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt"),
        ))
    });
    let err = Environment::new()
        .render_template("{read()}", context! { read })
        .await
        .unwrap_err();
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "missing.txt");
}

#[tokio::test]
async fn test_argument_conversion_errors() {
    let double = Value::from_function(|n: i64| n * 2);
    let env = Environment::new();

    let rv = env
        .render_template("{double(21)}", context! { double => double.clone() })
        .await
        .unwrap();
    assert_eq!(rv, "42");

    let err = env
        .render_template("{double(\"x\")}", context! { double => double.clone() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArguments);

    let err = env
        .render_template("{double()}", context! { double => double.clone() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    assert_eq!(err.detail(), Some("missing argument"));

    let err = env
        .render_template("{double(1, 2)}", context! { double })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    assert_eq!(err.detail(), Some("too many arguments"));
}

#[tokio::test]
async fn test_optional_and_rest_arguments() {
    let greet = Value::from_function(|name: Option<String>, rest: Rest<String>| {
        format!("{}:{}", name.as_deref().unwrap_or("anon"), rest.join("+"))
    });
    let env = Environment::new();
    let rv = env
        .render_template(
            "{greet()} {greet(missing)} {greet(\"a\", 1, 2)}",
            context! { greet },
        )
        .await
        .unwrap();
    assert_eq!(rv, "anon: anon: a:1+2");
}

#[tokio::test]
async fn test_functions_receive_values() {
    let describe = Value::from_function(|value: Value| value.kind().to_string());
    let ctx = context! {
        describe,
        list => vec![1, 2],
        map => context! { a => 1 },
    };
    let rv = Environment::new()
        .render_template(
            "{describe(list)} {describe(map)} {describe(1)} {describe(\"s\")} {describe(nope)}",
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(rv, "sequence map number string undefined");
}

#[tokio::test]
async fn test_function_returning_callable_is_not_called() {
    let make = Value::from_function(|| Value::from_function(|| "inner"));
    let rv = Environment::new()
        .render_template("{make()}", context! { make })
        .await
        .unwrap();
    assert!(rv.starts_with("<function"), "{rv}");
}

#[tokio::test]
async fn test_direct_call() {
    let add = Value::from_function(|a: f64, b: f64| a + b);
    assert_eq!(add.call(&args!(1, 2.5)).await.unwrap(), Value::from(3.5));

    let err = Value::from("nope").call(&[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
}

#[test]
fn test_render_future_is_send() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let rv = runtime.block_on(async {
        let mut env = Environment::new();
        env.add_async_function("slow", |n: u64| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            n + 1
        });
        tokio::spawn(async move {
            env.render_template("{slow(1)}", context! {})
                .await
                .unwrap()
        })
        .await
        .unwrap()
    });
    assert_eq!(rv, "2");
}
