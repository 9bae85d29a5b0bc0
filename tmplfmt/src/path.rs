//! Resolution of identifier paths such as `user.name` or `items[0]["key"]`.
use std::borrow::Cow;

use crate::value::Value;

/// Splits a path into its segments.
///
/// `.` separates segments, `[key]` and `["key"]` / `['key']` address items.
/// Quoted keys support backslash escapes, unquoted keys are taken verbatim.
/// A leading `.`, or a `.` or `[]` followed by another `.`, by `[]` or by
/// the end of the path, produces an empty segment.  Stray brackets are
/// skipped.
pub fn split_path(path: &str) -> Vec<Cow<'_, str>> {
    let mut rv = Vec::new();
    let bytes = path.as_bytes();
    if bytes.first() == Some(&b'.') {
        rv.push(Cow::Borrowed(""));
    }

    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                let rest = &path[pos + 1..];
                if rest.is_empty() || rest.starts_with('.') || rest.starts_with("[]") {
                    rv.push(Cow::Borrowed(""));
                }
                pos += 1;
            }
            b'[' => match parse_bracket(&path[pos..]) {
                Some((segment, consumed)) => {
                    rv.push(segment);
                    pos += consumed;
                }
                None => {
                    let rest = &path[pos..];
                    if rest.starts_with("[]") {
                        let after = &rest[2..];
                        if after.is_empty() || after.starts_with('.') || after.starts_with("[]") {
                            rv.push(Cow::Borrowed(""));
                        }
                    }
                    pos += 1;
                }
            },
            b']' => pos += 1,
            _ => {
                let end = path[pos..]
                    .find(&['.', '[', ']'][..])
                    .map_or(path.len(), |offset| pos + offset);
                rv.push(Cow::Borrowed(&path[pos..end]));
                pos = end;
            }
        }
    }
    rv
}

/// Parses `[key]` or a quoted `["key"]` at the start of `s`.
///
/// Returns the segment and the number of bytes consumed.
fn parse_bracket(s: &str) -> Option<(Cow<'_, str>, usize)> {
    let inner = &s[1..];
    let quote = some!(inner.chars().next());
    if quote == '"' || quote == '\'' {
        let mut key = String::new();
        let mut chars = inner.char_indices().skip(1);
        while let Some((idx, c)) = chars.next() {
            if c == '\\' {
                key.push(some!(chars.next()).1);
            } else if c == quote {
                return if inner[idx + 1..].starts_with(']') {
                    Some((Cow::Owned(key), idx + 3))
                } else {
                    None
                };
            } else {
                key.push(c);
            }
        }
        None
    } else {
        // an unquoted key runs to the last `]` before the next `[`
        let rest = &inner[quote.len_utf8()..];
        let span = match rest.find('[') {
            Some(pos) => &inner[..quote.len_utf8() + pos],
            None => inner,
        };
        match span.rfind(']') {
            Some(end) if end > 0 => Some((Cow::Borrowed(&inner[..end]), end + 2)),
            _ => None,
        }
    }
}

fn is_deep_path(path: &str) -> bool {
    path.contains(&['.', '['][..])
}

/// Resolves a path against a root value.
///
/// A path that is itself a key of the root map resolves to that entry.
/// Otherwise the path is split with [`split_path`] and walked segment by
/// segment.  Anything that cannot be resolved is undefined; resolution never
/// fails.
pub fn resolve(root: &Value, path: &str) -> Value {
    if let Some(value) = root.as_map().and_then(|map| map.get(path)) {
        return value.clone();
    }
    if !is_deep_path(path) {
        return root.get_attr(path);
    }

    let mut segments = split_path(path).into_iter();
    let mut rv = match segments.next() {
        Some(first) => root.get_attr(&first),
        None => return Value::UNDEFINED,
    };
    for segment in segments {
        if rv.is_undefined() || rv.is_none() {
            return Value::UNDEFINED;
        }
        rv = rv.get_attr(&segment);
    }
    rv
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    fn split(path: &str) -> Vec<String> {
        split_path(path).into_iter().map(|x| x.into_owned()).collect()
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(split("a[0].b"), vec!["a", "0", "b"]);
        assert_eq!(split(r#"a["x.y"]['q\'s']"#), vec!["a", "x.y", "q's"]);
        assert_eq!(split("a..b"), vec!["a", "", "b"]);
        assert_eq!(split(".a"), vec!["", "a"]);
        assert_eq!(split("a."), vec!["a", ""]);
        assert_eq!(split("a[b]"), vec!["a", "b"]);
        assert_eq!(split("a[-1.5]"), vec!["a", "-1.5"]);
        assert_eq!(split("a[x.y].z"), vec!["a", "x.y", "z"]);
        assert_eq!(split("a[b c][0]"), vec!["a", "b c", "0"]);
        assert_eq!(split("a[]]"), vec!["a", "]"]);
        assert_eq!(split("a[]"), vec!["a", ""]);
    }

    #[test]
    fn test_resolve() {
        let root = Value::from_serialize(&serde_json::json!({
            "user": {"name": "Amy", "tags": ["x", "yz"]},
            "a.b": "literal key",
            "": {"": "empty"},
        }));
        assert_eq!(resolve(&root, "user.name").as_str(), Some("Amy"));
        assert_eq!(resolve(&root, "user.tags[1]").as_str(), Some("yz"));
        assert_eq!(resolve(&root, "user.tags.length"), Value::from(2));
        assert_eq!(resolve(&root, "user.tags[1].length"), Value::from(2));
        assert_eq!(resolve(&root, "user.name[0]").as_str(), Some("A"));
        assert_eq!(resolve(&root, "a.b").as_str(), Some("literal key"));
        assert_eq!(resolve(&root, ".").as_str(), Some("empty"));
        assert!(resolve(&root, "user.missing.deeper").is_undefined());
        assert!(resolve(&root, "user.name.first").is_undefined());
    }
}
