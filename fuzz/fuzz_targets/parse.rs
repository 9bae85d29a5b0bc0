#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    if let Ok(tree) = tmplfmt::parse_template(input) {
        // parsing is deterministic
        assert_eq!(tmplfmt::parse_template(input).ok(), Some(tree));
    }
    let _ = tmplfmt::machinery::split_path(input);
});
