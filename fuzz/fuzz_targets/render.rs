#![no_main]
use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, BTreeMap<String, Value>)| {
    let (source, ctx) = data;
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let env = tmplfmt::Environment::new();
    runtime.block_on(env.render_template(source, &ctx)).ok();
});
