//! Transform scripts embedded in templates as `<script>...</script>`.
//!
//! A script is a short, pure program over a single binding, `profile`:
//!
//! ```text
//! let names = pluck(profile.skills, "name")
//! profile.basics.headline = upper(profile.basics.title) + " · " + join(names, ", ")
//! if (len(profile.projects) > 3) { profile.projects = slice(profile.projects, 0, 3) }
//! return profile
//! ```
//!
//! Scripts can only read and write `profile` and their own `let` locals, and
//! can only call the builtin functions listed in `builtins::ALLOWED`. There
//! are no loops, and every run is capped in source size, nesting depth,
//! evaluation steps, the size of any single value and the total bytes its
//! evaluated values may occupy.

mod builtins;
mod lexer;
mod parser;

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::template::path::{display_value, is_truthy};
use crate::template::script::builtins::{loose_eq, num};
use crate::template::script::parser::{parse, BinaryOp, Expr, Key, Place, Stmt};

/// Upper bound on statements plus expression nodes evaluated per run.
pub const MAX_STEPS: usize = 5_000;
/// Scripts longer than this are rejected before parsing.
pub const MAX_SOURCE_LEN: usize = 32 * 1024;
/// Maximum expression nesting, checked while parsing and evaluating.
pub const MAX_DEPTH: usize = 128;
/// Largest footprint one evaluated value may have.
pub const MAX_VALUE_LEN: usize = 1024 * 1024;
/// Footprint budget shared by every value a run evaluates.
pub const MAX_ALLOCATED: usize = 64 * 1024 * 1024;

const PROFILE: &str = "profile";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("SyntaxError: {message} (at offset {offset})")]
    Syntax { message: String, offset: usize },

    #[error("SyntaxError: Identifier '{0}' has already been declared")]
    Redeclared(String),

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("{0}")]
    Thrown(String),

    #[error("TypeError: {0} is not an allowed function")]
    UnknownFunction(String),

    #[error("RangeError: script exceeded {0} evaluation steps")]
    StepLimit(usize),

    #[error("RangeError: script is longer than {0} bytes")]
    TooLarge(usize),

    #[error("RangeError: expressions nest deeper than {0} levels")]
    TooDeep(usize),

    #[error("RangeError: value is larger than {0} bytes")]
    ValueTooLarge(usize),

    #[error("RangeError: script allocated more than {0} bytes")]
    AllocationLimit(usize),
}

/// Approximate size of `value`: string bytes and object key bytes, plus one
/// per node. Returns `None` as soon as the size passes `limit`, so the walk
/// itself costs at most `limit`.
pub fn footprint(value: &Value, limit: usize) -> Option<usize> {
    fn walk(value: &Value, remaining: &mut usize) -> bool {
        let cost = 1 + match value {
            Value::String(s) => s.len(),
            Value::Object(map) => map.keys().map(String::len).sum(),
            _ => 0,
        };
        if cost > *remaining {
            return false;
        }
        *remaining -= cost;
        match value {
            Value::Array(items) => items.iter().all(|item| walk(item, remaining)),
            Value::Object(map) => map.values().all(|item| walk(item, remaining)),
            _ => true,
        }
    }

    let mut remaining = limit;
    walk(value, &mut remaining).then(|| limit - remaining)
}

/// Runs `source` with `profile` bound and returns the resulting profile.
///
/// A truthy `return` value replaces the profile; otherwise the (possibly
/// mutated) binding is returned.
pub fn run(source: &str, profile: Value) -> Result<Value, ScriptError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(ScriptError::TooLarge(MAX_SOURCE_LEN));
    }
    let program = parse(source)?;
    let mut interpreter = Interpreter::new(profile);
    let returned = match interpreter.exec_block(&program)? {
        Flow::Return(value) => value,
        Flow::Normal => None,
    };
    let profile = interpreter.scopes[0].remove(PROFILE).unwrap_or(Value::Null);
    Ok(match returned {
        Some(value) if is_truthy(&value) => value,
        _ => profile,
    })
}

enum Flow {
    Normal,
    Return(Option<Value>),
}

/// Resolved property key.
enum Prop {
    Name(String),
    Index(usize),
}

impl Prop {
    fn label(&self) -> String {
        match self {
            Prop::Name(name) => name.clone(),
            Prop::Index(i) => i.to_string(),
        }
    }

    fn array_index(&self) -> Option<usize> {
        match self {
            Prop::Index(i) => Some(*i),
            Prop::Name(name) => name.parse().ok(),
        }
    }
}

struct Interpreter {
    scopes: Vec<HashMap<String, Value>>,
    steps: usize,
    depth: usize,
    allocated: usize,
}

impl Interpreter {
    fn new(profile: Value) -> Self {
        let mut root = HashMap::new();
        root.insert(PROFILE.to_string(), profile);
        Self {
            scopes: vec![root],
            steps: 0,
            depth: 0,
            allocated: 0,
        }
    }

    fn tick(&mut self) -> Result<(), ScriptError> {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return Err(ScriptError::StepLimit(MAX_STEPS));
        }
        Ok(())
    }

    /// Counts an evaluated value against the per-value and per-run limits.
    fn charge(&mut self, value: &Value) -> Result<(), ScriptError> {
        let remaining = MAX_ALLOCATED - self.allocated;
        match footprint(value, MAX_VALUE_LEN.min(remaining)) {
            Some(size) => {
                self.allocated += size;
                Ok(())
            }
            None if remaining < MAX_VALUE_LEN => Err(ScriptError::AllocationLimit(MAX_ALLOCATED)),
            None => Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN)),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, ScriptError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_scoped(&mut self, stmts: &[Stmt]) -> Result<Flow, ScriptError> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_block(stmts);
        self.scopes.pop();
        flow
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, ScriptError> {
        self.tick()?;
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval(value)?;
                let Some(scope) = self.scopes.last_mut() else {
                    return Err(ScriptError::Reference(name.clone()));
                };
                if scope.contains_key(name) {
                    return Err(ScriptError::Redeclared(name.clone()));
                }
                scope.insert(name.clone(), value);
            }
            Stmt::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)?;
            }
            Stmt::Delete(target) => self.delete(target)?,
            Stmt::Return(value) => {
                let value = value.as_ref().map(|v| self.eval(v)).transpose()?;
                return Ok(Flow::Return(value));
            }
            Stmt::Throw(value) => {
                let value = self.eval(value)?;
                let message = match value.get("message") {
                    Some(message) => display_value(message),
                    None => display_value(&value),
                };
                return Err(ScriptError::Thrown(message));
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if is_truthy(&self.eval(cond)?) {
                    then
                } else {
                    otherwise
                };
                return self.exec_scoped(branch);
            }
        }
        Ok(Flow::Normal)
    }

    // ── variables and places ────────────────────────────────────────────────

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    fn resolve_keys(&mut self, keys: &[Key]) -> Result<Vec<Prop>, ScriptError> {
        keys.iter()
            .map(|key| match key {
                Key::Field(name) => Ok(Prop::Name(name.clone())),
                Key::Computed(expr) => {
                    let value = self.eval(expr)?;
                    Ok(match value.as_f64() {
                        Some(f) if f >= 0.0 && f.fract() == 0.0 => Prop::Index(f as usize),
                        _ => Prop::Name(display_value(&value)),
                    })
                }
            })
            .collect()
    }

    fn read_place(&mut self, place: &Place) -> Result<Value, ScriptError> {
        let props = self.resolve_keys(&place.keys)?;
        let mut current = self
            .lookup(&place.root)
            .ok_or_else(|| ScriptError::Reference(place.root.clone()))?;
        // Computed properties like `length` are produced by value, so they
        // end the borrowed walk.
        for (i, prop) in props.iter().enumerate() {
            match child(current, prop)? {
                Child::Borrowed(next) => current = next,
                Child::Owned(value) => {
                    let mut value = value;
                    for prop in &props[i + 1..] {
                        value = match child(&value, prop)? {
                            Child::Borrowed(next) => next.clone(),
                            Child::Owned(next) => next,
                        };
                    }
                    return Ok(value);
                }
            }
        }
        Ok(current.clone())
    }

    fn assign(&mut self, target: &Place, value: Value) -> Result<(), ScriptError> {
        let props = self.resolve_keys(&target.keys)?;
        let root = self
            .lookup_mut(&target.root)
            .ok_or_else(|| ScriptError::Reference(target.root.clone()))?;
        let Some((last, parents)) = props.split_last() else {
            *root = value;
            return Ok(());
        };
        let container = walk_mut(root, parents, last)?;
        set_property(container, last, value)
    }

    fn delete(&mut self, target: &Place) -> Result<(), ScriptError> {
        let props = self.resolve_keys(&target.keys)?;
        let root = self
            .lookup_mut(&target.root)
            .ok_or_else(|| ScriptError::Reference(target.root.clone()))?;
        let Some((last, parents)) = props.split_last() else {
            return Ok(());
        };
        match walk_mut(root, parents, last)? {
            Value::Object(map) => {
                map.remove(&last.label());
            }
            Value::Array(items) => {
                if let Some(slot) = last.array_index().and_then(|i| items.get_mut(i)) {
                    *slot = Value::Null;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ── expressions ─────────────────────────────────────────────────────────

    fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        self.tick()?;
        self.depth += 1;
        let result = if self.depth > MAX_DEPTH {
            Err(ScriptError::TooDeep(MAX_DEPTH))
        } else {
            self.eval_node(expr)
        };
        self.depth -= 1;
        let value = result?;
        self.charge(&value)?;
        Ok(value)
    }

    fn eval_node(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::Var(_) | Expr::Member { .. } => match Place::from_expr(expr) {
                Some(place) => self.read_place(&place),
                None => self.eval_member(expr),
            },
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                builtins::call(name, args)
            }
            Expr::Not(inner) => Ok(Value::Bool(!is_truthy(&self.eval(inner)?))),
            Expr::Neg(inner) => {
                let value = self.eval(inner)?;
                let n = to_number(&value)
                    .ok_or_else(|| ScriptError::Type(format!("cannot negate {}", type_name(&value))))?;
                num(-n)
            }
            Expr::And(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if is_truthy(&left) {
                    self.eval(rhs)
                } else {
                    Ok(left)
                }
            }
            Expr::Or(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if is_truthy(&left) {
                    Ok(left)
                } else {
                    self.eval(rhs)
                }
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if is_truthy(&self.eval(cond)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                binary(*op, &left, &right)
            }
        }
    }

    /// Member access on a non-place object, e.g. `split(x, ",")[0]`.
    fn eval_member(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        let Expr::Member { object, key } = expr else {
            return self.eval(expr);
        };
        let object = self.eval(object)?;
        let prop = self
            .resolve_keys(std::slice::from_ref(key))?
            .pop()
            .ok_or_else(|| ScriptError::Type("missing property".to_string()))?;
        Ok(match child(&object, &prop)? {
            Child::Borrowed(value) => value.clone(),
            Child::Owned(value) => value,
        })
    }
}

// ── value helpers ───────────────────────────────────────────────────────────

enum Child<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

static NULL: Value = Value::Null;

fn child<'a>(value: &'a Value, prop: &Prop) -> Result<Child<'a>, ScriptError> {
    Ok(match value {
        Value::Null => {
            return Err(ScriptError::Type(format!(
                "Cannot read properties of null (reading '{}')",
                prop.label()
            )))
        }
        Value::Object(map) => Child::Borrowed(map.get(&prop.label()).unwrap_or(&NULL)),
        Value::Array(items) => match prop {
            Prop::Name(name) if name == "length" => Child::Owned(Value::from(items.len())),
            _ => Child::Borrowed(
                prop.array_index()
                    .and_then(|i| items.get(i))
                    .unwrap_or(&NULL),
            ),
        },
        Value::String(s) => match prop {
            Prop::Name(name) if name == "length" => Child::Owned(Value::from(s.chars().count())),
            _ => Child::Owned(
                prop.array_index()
                    .and_then(|i| s.chars().nth(i))
                    .map_or(Value::Null, |c| Value::String(c.to_string())),
            ),
        },
        _ => Child::Borrowed(&NULL),
    })
}

/// Walks `parents` mutably, failing on a missing or null step.
fn walk_mut<'a>(
    root: &'a mut Value,
    parents: &[Prop],
    last: &Prop,
) -> Result<&'a mut Value, ScriptError> {
    let mut current = root;
    for (i, prop) in parents.iter().enumerate() {
        let next = match current {
            Value::Object(map) => map.get_mut(&prop.label()),
            Value::Array(items) => prop.array_index().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        current = match next {
            Some(value) if !value.is_null() => value,
            _ => {
                let pending = parents.get(i + 1).unwrap_or(last);
                return Err(ScriptError::Type(if i + 1 == parents.len() {
                    format!(
                        "Cannot set properties of undefined (setting '{}')",
                        pending.label()
                    )
                } else {
                    format!(
                        "Cannot read properties of undefined (reading '{}')",
                        pending.label()
                    )
                }));
            }
        };
    }
    Ok(current)
}

fn set_property(container: &mut Value, prop: &Prop, value: Value) -> Result<(), ScriptError> {
    match container {
        Value::Object(map) => {
            map.insert(prop.label(), value);
            Ok(())
        }
        Value::Array(items) => {
            let Some(i) = prop.array_index() else {
                return Err(ScriptError::Type(format!(
                    "Cannot set property '{}' on an array",
                    prop.label()
                )));
            };
            match i.cmp(&items.len()) {
                std::cmp::Ordering::Less => items[i] = value,
                std::cmp::Ordering::Equal => items.push(value),
                std::cmp::Ordering::Greater => {
                    return Err(ScriptError::Type(format!(
                        "index {i} is out of bounds for an array of length {}",
                        items.len()
                    )))
                }
            }
            Ok(())
        }
        Value::Null => Err(ScriptError::Type(format!(
            "Cannot set properties of undefined (setting '{}')",
            prop.label()
        ))),
        other => Err(ScriptError::Type(format!(
            "Cannot create property '{}' on {}",
            prop.label(),
            type_name(other)
        ))),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ScriptError> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => {
                num(a.as_f64().unwrap_or(f64::NAN) + b.as_f64().unwrap_or(f64::NAN))
            }
            _ => {
                let (left, right) = (display_value(left), display_value(right));
                if left.len() + right.len() > MAX_VALUE_LEN {
                    return Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN));
                }
                Ok(Value::String(left + &right))
            }
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let (Some(a), Some(b)) = (to_number(left), to_number(right)) else {
                return Err(ScriptError::Type(format!(
                    "cannot apply arithmetic to {} and {}",
                    type_name(left),
                    type_name(right)
                )));
            };
            num(match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => a / b,
            })
        }
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (left, right) {
                (Value::Number(a), Value::Number(b)) => a.as_f64().partial_cmp(&b.as_f64()),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            }
            .ok_or_else(|| {
                ScriptError::Type(format!(
                    "cannot compare {} with {}",
                    type_name(left),
                    type_name(right)
                ))
            })?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> Value {
        json!({
            "basics": {"firstName": "Ada", "title": "engineer"},
            "skills": [{"name": "Rust", "level": 3}, {"name": "Go", "level": 2}],
            "projects": []
        })
    }

    #[test]
    fn test_assignment_and_explicit_return() {
        let out = run("profile.basics.firstName = 'X'; return profile;", profile()).unwrap();
        assert_eq!(out["basics"]["firstName"], "X");
    }

    #[test]
    fn test_implicit_return_of_profile() {
        let out = run("profile.basics.title = upper(profile.basics.title)", profile()).unwrap();
        assert_eq!(out["basics"]["title"], "ENGINEER");
    }

    #[test]
    fn test_return_replacement_value() {
        let out = run("return {}", profile());
        assert!(out.is_err(), "object literals are not part of the language");

        let out = run("return profile.skills", profile()).unwrap();
        assert!(out.is_array());
    }

    #[test]
    fn test_locals_and_arithmetic() {
        let src = "let total = profile.skills[0].level + profile.skills.1.level\n\
                   profile.score = total * 2 - 1";
        assert_eq!(run(src, profile()).unwrap()["score"], json!(9));
    }

    #[test]
    fn test_string_concatenation() {
        let out = run("profile.headline = profile.basics.firstName + ', ' + len(profile.skills)", profile())
            .unwrap();
        assert_eq!(out["headline"], "Ada, 2");
    }

    #[test]
    fn test_if_else_and_logic() {
        let src = r#"
            if (len(profile.projects) == 0 && !profile.basics.missing) {
                profile.note = "no projects"
            } else {
                profile.note = "has projects"
            }
            profile.fallback = profile.basics.nickname || "n/a"
            profile.kind = profile.skills.length > 1 ? "multi" : "single"
        "#;
        let out = run(src, profile()).unwrap();
        assert_eq!(out["note"], "no projects");
        assert_eq!(out["fallback"], "n/a");
        assert_eq!(out["kind"], "multi");
    }

    #[test]
    fn test_block_scoped_let() {
        let src = "if (true) { let x = 1; profile.a = x } let x = 2; profile.b = x";
        let out = run(src, profile()).unwrap();
        assert_eq!(out["a"], json!(1));
        assert_eq!(out["b"], json!(2));
    }

    #[test]
    fn test_redeclaring_profile_fails() {
        assert_eq!(
            run("let profile = 1", profile()),
            Err(ScriptError::Redeclared("profile".into()))
        );
    }

    #[test]
    fn test_unknown_identifier_is_reference_error() {
        let err = run("profile.x = window.location", profile()).unwrap_err();
        assert_eq!(err, ScriptError::Reference("window".into()));
        assert_eq!(err.to_string(), "ReferenceError: window is not defined");
    }

    #[test]
    fn test_disallowed_function() {
        let err = run("profile.x = fetch('http://example.com')", profile()).unwrap_err();
        assert_eq!(err, ScriptError::UnknownFunction("fetch".into()));
    }

    #[test]
    fn test_throw_message() {
        let err = run("throw 'nope'", profile()).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_set_through_missing_intermediate() {
        let err = run("profile.socials.github = 'x'", profile()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Cannot set properties of undefined (setting 'github')"
        );
    }

    #[test]
    fn test_read_through_null() {
        let err = run("profile.x = profile.socials.github", profile()).unwrap_err();
        assert!(err.to_string().contains("reading 'github'"));
    }

    #[test]
    fn test_array_append_and_delete() {
        let src = "profile.skills[2] = 'Zig'; delete profile.basics.title; delete profile.skills[0]";
        let out = run(src, profile()).unwrap();
        assert_eq!(out["skills"][2], "Zig");
        assert_eq!(out["skills"][0], Value::Null);
        assert!(out["basics"].get("title").is_none());
    }

    #[test]
    fn test_array_write_past_end_fails() {
        assert!(run("profile.skills[5] = 1", profile()).is_err());
    }

    #[test]
    fn test_member_on_call_result() {
        let out = run("profile.first = split('a,b', ',')[1]", profile()).unwrap();
        assert_eq!(out["first"], "b");
    }

    #[test]
    fn test_division_by_zero_is_type_error() {
        assert!(matches!(
            run("profile.x = 1 / 0", profile()),
            Err(ScriptError::Type(_))
        ));
    }

    #[test]
    fn test_step_budget() {
        let long = "profile.n=1;".repeat(MAX_STEPS / 2 + 100);
        assert!(long.len() <= MAX_SOURCE_LEN);
        assert_eq!(run(&long, profile()), Err(ScriptError::StepLimit(MAX_STEPS)));
    }

    #[test]
    fn test_doubling_a_string_hits_the_value_limit() {
        let src = "let s = 'xxxxxxxxxx';".to_string() + &"s = s + s;".repeat(40);
        assert_eq!(run(&src, profile()), Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN)));
    }

    #[test]
    fn test_doubling_an_array_hits_the_value_limit() {
        let src = "let a = [1, 2, 3, 4];".to_string() + &"a = concat(a, a);".repeat(40);
        assert_eq!(run(&src, profile()), Err(ScriptError::ValueTooLarge(MAX_VALUE_LEN)));
    }

    #[test]
    fn test_copies_count_against_the_run_budget() {
        // 512 KiB string, then many copies of it held in separate fields.
        let mut src = "let s = 'xxxxxxxx';".to_string() + &"s = s + s;".repeat(16);
        for i in 0..200 {
            src.push_str(&format!("profile.c{i} = s;"));
        }
        assert_eq!(run(&src, profile()), Err(ScriptError::AllocationLimit(MAX_ALLOCATED)));
    }

    #[test]
    fn test_footprint_stops_at_limit() {
        let value = json!({"ab": ["xyz", 1, null]});
        assert_eq!(footprint(&value, 100), Some(1 + 2 + 1 + 4 + 1 + 1));
        assert_eq!(footprint(&value, 5), None);
    }

    #[test]
    fn test_source_size_limit() {
        let long = " ".repeat(MAX_SOURCE_LEN + 1);
        assert_eq!(run(&long, profile()), Err(ScriptError::TooLarge(MAX_SOURCE_LEN)));
    }

    #[test]
    fn test_deep_left_chain_is_bounded() {
        let long = "profile.n = 1".to_string() + &" + 1".repeat(MAX_DEPTH * 2);
        assert_eq!(run(&long, profile()), Err(ScriptError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_shadowing_in_block_is_allowed() {
        let src = "let x = 1; if (true) { let x = 2; profile.inner = x } profile.outer = x";
        let out = run(src, profile()).unwrap();
        assert_eq!(out["inner"], json!(2));
        assert_eq!(out["outer"], json!(1));
    }

    #[test]
    fn test_whole_profile_reassignment() {
        let out = run("profile = profile.basics", profile()).unwrap();
        assert_eq!(out["firstName"], "Ada");
    }

    #[test]
    fn test_null_profile_is_returned_unchanged() {
        assert_eq!(run("", Value::Null).unwrap(), Value::Null);
    }
}
