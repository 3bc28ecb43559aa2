//! The fixed set of functions a transform script may call.

use std::cmp::Ordering;

use serde_json::Value;

use crate::template::path::{display_value, number};
use crate::template::script::{ScriptError, MAX_VALUE_LEN};

pub const ALLOWED: &[&str] = &[
    "upper", "lower", "trim", "len", "join", "split", "pluck", "sort_by", "reverse", "slice",
    "filter_eq", "concat", "first", "last", "string", "default",
];

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, ScriptError> {
    if !ALLOWED.contains(&name) {
        return Err(ScriptError::UnknownFunction(name.to_string()));
    }
    match name {
        "upper" => Ok(Value::String(text(name, &args, 0)?.to_uppercase())),
        "lower" => Ok(Value::String(text(name, &args, 0)?.to_lowercase())),
        "trim" => Ok(Value::String(text(name, &args, 0)?.trim().to_string())),
        "string" => Ok(Value::String(text(name, &args, 0)?)),
        "len" => {
            arity(name, &args, 1, 1)?;
            let n = match &args[0] {
                Value::Array(items) => items.len(),
                Value::String(s) => s.chars().count(),
                Value::Object(map) => map.len(),
                _ => 0,
            };
            Ok(Value::from(n))
        }
        "join" => {
            arity(name, &args, 1, 2)?;
            let items = array(name, &args[0])?;
            let sep = args.get(1).map(display_value).unwrap_or_else(|| ",".to_string());
            let separators = sep.len().saturating_mul(items.len().saturating_sub(1));
            if separators > MAX_VALUE_LEN {
                return Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN));
            }
            let parts = items.iter().map(display_value).collect::<Vec<_>>();
            if separators + parts.iter().map(String::len).sum::<usize>() > MAX_VALUE_LEN {
                return Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN));
            }
            Ok(Value::String(parts.join(&sep)))
        }
        "split" => {
            arity(name, &args, 2, 2)?;
            let source = display_value(&args[0]);
            let sep = display_value(&args[1]);
            let parts: Vec<Value> = if sep.is_empty() {
                source.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                source
                    .split(sep.as_str())
                    .map(|s| Value::String(s.to_string()))
                    .collect()
            };
            Ok(Value::Array(parts))
        }
        "pluck" => {
            arity(name, &args, 2, 2)?;
            let field = display_value(&args[1]);
            let items = array(name, &args[0])?;
            Ok(Value::Array(
                items
                    .iter()
                    .map(|item| item.get(&field).cloned().unwrap_or(Value::Null))
                    .collect(),
            ))
        }
        "sort_by" => {
            arity(name, &args, 2, 2)?;
            let field = display_value(&args[1]);
            let mut items = array(name, &args[0])?.clone();
            items.sort_by(|a, b| {
                compare(
                    a.get(&field).unwrap_or(&Value::Null),
                    b.get(&field).unwrap_or(&Value::Null),
                )
            });
            Ok(Value::Array(items))
        }
        "reverse" => {
            arity(name, &args, 1, 1)?;
            let mut items = array(name, &args[0])?.clone();
            items.reverse();
            Ok(Value::Array(items))
        }
        "slice" => {
            arity(name, &args, 2, 3)?;
            let start = index(name, &args[1])?;
            match &args[0] {
                Value::Array(items) => {
                    let end = args.get(2).map(|v| index(name, v)).transpose()?;
                    let (s, e) = bounds(start, end, items.len());
                    Ok(Value::Array(items[s..e].to_vec()))
                }
                other => {
                    let chars: Vec<char> = display_value(other).chars().collect();
                    let end = args.get(2).map(|v| index(name, v)).transpose()?;
                    let (s, e) = bounds(start, end, chars.len());
                    Ok(Value::String(chars[s..e].iter().collect()))
                }
            }
        }
        "filter_eq" => {
            arity(name, &args, 3, 3)?;
            let field = display_value(&args[1]);
            let items = array(name, &args[0])?;
            Ok(Value::Array(
                items
                    .iter()
                    .filter(|item| loose_eq(item.get(&field).unwrap_or(&Value::Null), &args[2]))
                    .cloned()
                    .collect(),
            ))
        }
        "concat" => {
            if args.iter().all(Value::is_array) {
                Ok(Value::Array(
                    args.into_iter()
                        .flat_map(|v| match v {
                            Value::Array(items) => items,
                            _ => Vec::new(),
                        })
                        .collect(),
                ))
            } else {
                Ok(Value::String(args.iter().map(display_value).collect()))
            }
        }
        "first" => {
            arity(name, &args, 1, 1)?;
            Ok(array(name, &args[0])?.first().cloned().unwrap_or(Value::Null))
        }
        "last" => {
            arity(name, &args, 1, 1)?;
            Ok(array(name, &args[0])?.last().cloned().unwrap_or(Value::Null))
        }
        "default" => {
            arity(name, &args, 2, 2)?;
            let mut args = args;
            let fallback = args.pop().unwrap_or(Value::Null);
            let value = args.pop().unwrap_or(Value::Null);
            Ok(if value.is_null() { fallback } else { value })
        }
        other => Err(ScriptError::UnknownFunction(other.to_string())),
    }
}

/// Equality where numbers compare by value regardless of representation.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => display_value(a).cmp(&display_value(b)),
    }
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), ScriptError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min}-{max}")
        };
        return Err(ScriptError::Type(format!(
            "{name}() expects {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn text(name: &str, args: &[Value], i: usize) -> Result<String, ScriptError> {
    arity(name, args, i + 1, i + 1)?;
    Ok(display_value(&args[i]))
}

fn array<'a>(name: &str, value: &'a Value) -> Result<&'a Vec<Value>, ScriptError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(ScriptError::Type(format!("{name}() expects an array"))),
    }
}

fn index(name: &str, value: &Value) -> Result<i64, ScriptError> {
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0)
        .map(|f| f as i64)
        .ok_or_else(|| ScriptError::Type(format!("{name}() expects integer bounds")))
}

/// Clamps `start..end` to `0..len`, counting negative bounds from the end.
fn bounds(start: i64, end: Option<i64>, len: usize) -> (usize, usize) {
    let len = len as i64;
    let clamp = |i: i64| if i < 0 { (len + i).max(0) } else { i.min(len) };
    let s = clamp(start);
    let e = end.map_or(len, clamp).max(s);
    (s as usize, e as usize)
}

/// Exposed for the interpreter's arithmetic so results share one encoding.
pub fn num(f: f64) -> Result<Value, ScriptError> {
    number(f).ok_or_else(|| ScriptError::Type("result is not a finite number".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_helpers() {
        assert_eq!(call("upper", vec![json!("rust")]).unwrap(), json!("RUST"));
        assert_eq!(call("trim", vec![json!("  x ")]).unwrap(), json!("x"));
        assert_eq!(call("string", vec![json!(4)]).unwrap(), json!("4"));
    }

    #[test]
    fn test_join_and_pluck() {
        let skills = json!([{"name": "Go"}, {"name": "Rust"}]);
        let names = call("pluck", vec![skills, json!("name")]).unwrap();
        assert_eq!(call("join", vec![names, json!(" · ")]).unwrap(), json!("Go · Rust"));
    }

    #[test]
    fn test_sort_by_numbers_and_missing() {
        let items = json!([{"n": 3}, {"x": 1}, {"n": 1}]);
        let sorted = call("sort_by", vec![items, json!("n")]).unwrap();
        assert_eq!(sorted, json!([{"n": 1}, {"n": 3}, {"x": 1}]));
    }

    #[test]
    fn test_slice_negative_bounds() {
        assert_eq!(
            call("slice", vec![json!([1, 2, 3, 4]), json!(-2)]).unwrap(),
            json!([3, 4])
        );
        assert_eq!(
            call("slice", vec![json!("résumé"), json!(0), json!(3)]).unwrap(),
            json!("rés")
        );
    }

    #[test]
    fn test_filter_eq_compares_numbers_loosely() {
        let items = json!([{"level": 1.0}, {"level": 2}]);
        assert_eq!(
            call("filter_eq", vec![items, json!("level"), json!(1)]).unwrap(),
            json!([{"level": 1.0}])
        );
    }

    #[test]
    fn test_concat_arrays_and_strings() {
        assert_eq!(
            call("concat", vec![json!([1]), json!([2, 3])]).unwrap(),
            json!([1, 2, 3])
        );
        assert_eq!(call("concat", vec![json!("a"), json!(1)]).unwrap(), json!("a1"));
    }

    #[test]
    fn test_default_only_replaces_null() {
        assert_eq!(call("default", vec![json!(null), json!("x")]).unwrap(), json!("x"));
        assert_eq!(call("default", vec![json!(""), json!("x")]).unwrap(), json!(""));
    }

    #[test]
    fn test_join_checks_size_before_building() {
        let items = Value::Array(vec![json!(1); 1000]);
        let sep = json!("x".repeat(2048));
        assert_eq!(
            call("join", vec![items, sep]),
            Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN))
        );
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            call("eval", vec![]),
            Err(ScriptError::UnknownFunction("eval".into()))
        );
    }

    #[test]
    fn test_arity_is_checked() {
        assert!(matches!(call("len", vec![]), Err(ScriptError::Type(_))));
    }

    #[test]
    fn test_every_allowed_name_is_dispatched() {
        for name in ALLOWED {
            let result = call(name, vec![]);
            assert!(
                !matches!(result, Err(ScriptError::UnknownFunction(_))),
                "{name} is listed but not implemented"
            );
        }
    }
}
