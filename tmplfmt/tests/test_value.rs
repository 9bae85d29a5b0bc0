use std::collections::BTreeMap;

use serde::Serialize;
use similar_asserts::assert_eq;

use tmplfmt::value::{Value, ValueKind};
use tmplfmt::{context, Environment, ErrorKind};

#[derive(Serialize)]
struct User {
    name: String,
    roles: Vec<&'static str>,
    manager: Option<Box<User>>,
}

#[derive(Serialize)]
enum Status {
    Active,
    Away { since: u32 },
}

#[test]
fn test_struct_serialization() {
    let user = User {
        name: "Amy".into(),
        roles: vec!["admin", "ops"],
        manager: None,
    };
    let value = Value::from_serialize(&user);
    insta::assert_debug_snapshot!(value, @r###"
    {
        "name": "Amy",
        "roles": [
            "admin",
            "ops",
        ],
        "manager": none,
    }
    "###);
}

#[test]
fn test_enum_serialization() {
    assert_eq!(Value::from_serialize(&Status::Active).as_str(), Some("Active"));
    let away = Value::from_serialize(&Status::Away { since: 3 });
    assert_eq!(away.kind(), ValueKind::Map);
    assert_eq!(away.get_attr("Away").get_attr("since"), Value::from(3));
}

#[tokio::test]
async fn test_render_with_structs() {
    let user = User {
        name: "Amy".into(),
        roles: vec!["admin", "ops"],
        manager: Some(Box::new(User {
            name: "Bo".into(),
            roles: vec![],
            manager: None,
        })),
    };
    let rv = Environment::new()
        .render_template(
            "{user.name} ({user.roles}) reports to {user.manager.name} [{user.manager.roles.length}]",
            context! { user },
        )
        .await
        .unwrap();
    assert_eq!(rv, "Amy (admin,ops) reports to Bo [0]");
}

#[tokio::test]
async fn test_render_with_json() {
    let ctx = serde_json::json!({
        "items": [{"title": "first"}, {"title": "second"}],
        "key with spaces": {"inner": 1},
        "a.b": "flat wins",
        "a": {"b": "nested"},
        "num": 2.0,
    });
    let rv = Environment::new()
        .render_template(
            r#"{items[1].title} {items.0.title} {["key with spaces"].inner} {a.b} {num}"#,
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(rv, "second first 1 flat wins 2");
}

#[tokio::test]
async fn test_render_maps() {
    let mut ctx = BTreeMap::new();
    ctx.insert("map", context! { a => 1, b => "x", c => () });
    let rv = Environment::new()
        .render_template("{map}", &ctx)
        .await
        .unwrap();
    assert_eq!(rv, r#"{"a": 1, "b": "x", "c": none}"#);
}

#[tokio::test]
async fn test_unserializable_context() {
    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("nope"))
        }
    }

    let err = Environment::new()
        .render_template("{x}", context! { x => Broken })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
}

#[test]
fn test_values_serialize_back() {
    let value = context! {
        name => "Amy",
        scores => vec![1.5, 2.0],
        nothing => (),
    };
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"name":"Amy","scores":[1.5,2.0],"nothing":null}"#
    );
}
