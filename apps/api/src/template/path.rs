//! Dotted-path lookup and display rules shared by the renderer and the
//! transform script interpreter.

use std::borrow::Cow;

use serde_json::{Number, Value};

/// Characters allowed in a `{dotted.path}` reference.
pub fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Characters allowed in a loop alias.
pub fn is_alias_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Resolves `a.b.c` against `root` by sequential property lookup.
///
/// Returns `None` (undefined) as soon as a segment is missing or an
/// intermediate value is falsy. Never panics.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(root);
    for segment in path.split('.') {
        if !is_truthy(&current) {
            return None;
        }
        current = match current {
            Cow::Borrowed(value) => lookup(value, segment)?,
            Cow::Owned(value) => Cow::Owned(lookup(&value, segment)?.into_owned()),
        };
    }
    Some(current)
}

/// One property step. Objects by key, arrays and strings by decimal index or
/// `length`. String indexes count characters.
pub fn lookup<'a>(value: &'a Value, segment: &str) -> Option<Cow<'a, Value>> {
    match value {
        Value::Object(map) => map.get(segment).map(Cow::Borrowed),
        Value::Array(items) if segment == "length" => Some(Cow::Owned(Value::from(items.len()))),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .map(Cow::Borrowed),
        Value::String(s) if segment == "length" => {
            Some(Cow::Owned(Value::from(s.chars().count())))
        }
        Value::String(s) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Cow::Owned(Value::String(c.to_string()))),
        _ => None,
    }
}

/// Resolves a path and renders it. Undefined renders as "", a null leaf as
/// `null`.
pub fn render_path(root: &Value, path: &str) -> String {
    match resolve_path(root, path) {
        Some(value) if value.is_null() => "null".to_string(),
        Some(value) => display_value(&value),
        None => String::new(),
    }
}

/// String conversion with the same shape a browser would print.
///
/// Integral numbers drop the fraction, arrays join with `,`, objects become
/// `[object Object]`. Null becomes the empty string here, which is how it
/// appears inside a joined array.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn display_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Falsy values: null, false, 0, NaN and "".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Builds a JSON number, preferring the integer representation when exact.
pub fn number(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        Some(Value::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number)
    }
}

/// Replaces every `{path}` reference in `text` with `resolve(path)`.
///
/// A `{` that does not open a well-formed reference is copied through.
pub fn replace_references(text: &str, mut resolve: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let len = after.bytes().take_while(|b| is_path_byte(*b)).count();
        if len > 0 && after.as_bytes().get(len) == Some(&b'}') {
            out.push_str(&resolve(&after[..len]));
            rest = &after[len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_nested_object_path() {
        let data = json!({"profile": {"basics": {"firstName": "Ada"}}});
        assert_eq!(render_path(&data, "profile.basics.firstName"), "Ada");
    }

    #[test]
    fn test_missing_intermediate_short_circuits() {
        let data = json!({"profile": {}});
        assert!(resolve_path(&data, "profile.basics.firstName").is_none());
        assert_eq!(render_path(&data, "nothing.at.all"), "");
    }

    #[test]
    fn test_falsy_intermediate_is_undefined() {
        let data = json!({"a": {"b": 0, "c": ""}});
        assert!(resolve_path(&data, "a.b.x").is_none());
        assert!(resolve_path(&data, "a.c.length").is_none());
        assert_eq!(render_path(&data, "a.b"), "0");
    }

    #[test]
    fn test_array_index_and_length() {
        let data = json!({"skills": [{"name": "Go"}, {"name": "Rust"}]});
        assert_eq!(render_path(&data, "skills.1.name"), "Rust");
        assert_eq!(render_path(&data, "skills.length"), "2");
        assert_eq!(render_path(&data, "skills.5.name"), "");
    }

    #[test]
    fn test_string_index_and_length() {
        let data = json!({"name": "Ada"});
        assert_eq!(render_path(&data, "name.0"), "A");
        assert_eq!(render_path(&data, "name.2"), "a");
        assert_eq!(render_path(&data, "name.3"), "");
        assert_eq!(render_path(&data, "name.length"), "3");
    }

    #[test]
    fn test_null_leaf_renders_as_null() {
        let data = json!({"basics": {"middleName": null}, "tags": ["a", null]});
        assert_eq!(render_path(&data, "basics.middleName"), "null");
        assert_eq!(render_path(&data, "basics.nickname"), "");
        assert_eq!(render_path(&data, "tags"), "a,");
    }

    #[test]
    fn test_display_rules() {
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(2.0)), "2");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(["a", null, 1])), "a,,1");
        assert_eq!(display_value(&json!({"k": 1})), "[object Object]");
    }

    #[test]
    fn test_replace_references_skips_malformed_braces() {
        let out = replace_references("{a} { b } {c-d} {{e}}", |p| format!("<{p}>"));
        assert_eq!(out, "<a> { b } {c-d} {<e>}");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("0")));
    }
}
