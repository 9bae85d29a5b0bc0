use std::io::Write;
use std::process::Command;

use insta_cmd::{assert_cmd_snapshot, get_cargo_bin};
use tempfile::NamedTempFile;

fn cli() -> Command {
    let mut cmd = Command::new(get_cargo_bin("tmplfmt-cli"));
    cmd.env("HOME", env!("CARGO_MANIFEST_DIR"));
    for (key, _) in std::env::vars() {
        if key.starts_with("TMPLFMT_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn file_with_contents(contents: &str) -> NamedTempFile {
    file_with_contents_and_ext(contents, "")
}

fn file_with_contents_and_ext<X: AsRef<[u8]>>(contents: X, ext: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new()
        .prefix("tmplfmt-testfile--")
        .suffix(ext)
        .tempfile()
        .unwrap();
    f.write_all(contents.as_ref()).unwrap();
    f
}

#[test]
fn test_explicit_format() {
    let input = file_with_contents(r#"{"foo": "bar"}"#);
    let tmpl = file_with_contents(r#"Hello {foo}!"#);

    assert_cmd_snapshot!(
        cli()
            .arg("--format=json")
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello bar!

    ----- stderr -----
    "###);
}

#[test]
fn test_no_newline() {
    let input = file_with_contents(r#"{"foo": "bar"}"#);
    let tmpl = file_with_contents(r#"Hello {foo}!"#);

    assert_cmd_snapshot!(
        cli()
            .arg("--format=json")
            .arg("--no-newline")
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello bar!
    ----- stderr -----
    "###);
}

#[test]
fn test_json_detection_and_functions() {
    let input = file_with_contents_and_ext(
        r#"{"user": {"name": "Amy", "admin": false}, "items": [1, 2, 3]}"#,
        ".json",
    );
    let tmpl = file_with_contents(
        r#"{if(user.admin, "boss", concat("user ", user.name))} has {items.length} items"#,
    );

    assert_cmd_snapshot!(
        cli()
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    user Amy has 3 items

    ----- stderr -----
    "###);
}

#[test]
#[cfg(feature = "yaml")]
fn test_yaml() {
    let input = file_with_contents_and_ext("foo: bar\nlist: [a, b]\n", ".yaml");
    let tmpl = file_with_contents("{foo} {list}");

    assert_cmd_snapshot!(
        cli()
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    bar a,b

    ----- stderr -----
    "###);
}

#[test]
#[cfg(feature = "toml")]
fn test_toml_with_select() {
    let input = file_with_contents_and_ext("[values]\nname = \"Amy\"\n", ".toml");
    let tmpl = file_with_contents("Hello {name}");

    assert_cmd_snapshot!(
        cli()
            .arg("--select=values")
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello Amy

    ----- stderr -----
    "###);
}

#[test]
fn test_bad_select() {
    let input = file_with_contents_and_ext(r#"{"values": {"a": 1}}"#, ".json");
    let tmpl = file_with_contents("{a}");

    assert_cmd_snapshot!(
        cli()
            .arg("--select=values.missing")
            .arg(tmpl.path())
            .arg(input.path()),
        @r###"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    error: unable to select "missing" in "values.missing" (value was map)
    "###);
}

#[test]
fn test_string_template_and_defines() {
    assert_cmd_snapshot!(
        cli()
            .arg("--template=Hello {name}, {count} {flag}")
            .arg("-Dname=World")
            .arg("-Dcount:=42")
            .arg("-Dflag"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello World, 42 true

    ----- stderr -----
    "###);
}

#[test]
fn test_defines_override_data() {
    let input = file_with_contents_and_ext(r#"{"name": "data"}"#, ".json");

    assert_cmd_snapshot!(
        cli()
            .arg("--template={name}")
            .arg("-Dname=define")
            .arg("")
            .arg(input.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    define

    ----- stderr -----
    "###);
}

#[test]
fn test_no_globals() {
    assert_cmd_snapshot!(
        cli()
            .arg("--template=[{concat(\"a\", \"b\")}]")
            .arg("--no-globals"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    []

    ----- stderr -----
    "###);
}

#[test]
fn test_env() {
    assert_cmd_snapshot!(
        cli()
            .arg("--template={ENV.TMPLFMT_TEST_VALUE}")
            .arg("--env")
            .env("TMPLFMT_TEST_VALUE", "from env"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    from env

    ----- stderr -----
    "###);
}

#[test]
fn test_template_from_stdin() {
    assert_cmd_snapshot!(
        cli()
            .arg("-Dname=Peter")
            .pass_stdin("Hello {name}!"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello Peter!

    ----- stderr -----
    "###);
}

#[test]
fn test_syntax_error() {
    assert_cmd_snapshot!(
        cli().arg("--template=Hello {name"),
        @r###"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    error: syntax error: unterminated injected variable (at 6)
    "###);
}

#[test]
fn test_dump_ast() {
    assert_cmd_snapshot!(
        cli()
            .arg("--template=Hi {f(\"x\", 1)}")
            .arg("--dump=ast"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    [
        Text(
            "Hi ",
        ),
        Var {
            path: "f",
            args: [
                "x",
                1.0,
            ],
        },
    ]

    ----- stderr -----
    "###);
}

#[test]
fn test_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");

    assert_cmd_snapshot!(
        cli()
            .arg("--template=written")
            .arg("-o")
            .arg(&out),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    "###);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "written\n");
}

#[test]
fn test_output_file_untouched_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    std::fs::write(&out, "original").unwrap();

    let status = cli()
        .arg("--template={broken")
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(!status.success());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "original");
}

#[test]
#[cfg(feature = "toml")]
fn test_config_file() {
    let config = file_with_contents_and_ext("newline = false\nglobals = false\n", ".toml");

    assert_cmd_snapshot!(
        cli()
            .arg("--config-file")
            .arg(config.path())
            .arg("--template=[{not(x)}]"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    []
    ----- stderr -----
    "###);
}

#[test]
fn test_env_var_config() {
    assert_cmd_snapshot!(
        cli()
            .arg("--template=x")
            .env("TMPLFMT_NEWLINE", "false"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    x
    ----- stderr -----
    "###);
}
