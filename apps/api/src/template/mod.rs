//! Runtime template engine for custom résumé layouts.
//!
//! Supported syntax:
//! - `{profile.basics.firstName}` interpolation
//! - `{#each profile.experience as item}...{/each}` iteration (single level)
//! - `<script>...</script>` transform blocks bound to `profile`
//!
//! Loops expand first; variables are then resolved over the whole result,
//! loop output included. Rendering never fails. Missing paths render as "",
//! a non-array loop source drops its block, and a failing script is
//! reported inline as a banner.

pub mod path;
pub mod script;

use serde_json::Value;
use tracing::{error, warn};

use crate::template::path::{is_alias_byte, is_path_byte, render_path, replace_references};

const SCRIPT_OPEN: &str = "<script>";
const SCRIPT_CLOSE: &str = "</script>";
const EACH_OPEN: &str = "{#each";
const EACH_CLOSE: &str = "{/each}";

/// Expands `template` against `data`. `data` is never modified.
pub fn render_template(template: &str, data: &Value) -> String {
    if template.is_empty() {
        return String::new();
    }

    let (clean, script_source) = extract_scripts(template);
    let mut context = data.clone();

    if let Some(source) = script_source {
        let profile = context.get("profile").cloned().unwrap_or(Value::Null);
        match script::run(&source, profile) {
            Ok(profile) => set_profile(&mut context, profile),
            Err(e) => {
                error!("Template script error: {e}");
                return format!("{}{clean}", script_error_banner(&e.to_string()));
            }
        }
    }

    let expanded: String = split_segments(&clean)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.to_string(),
            Segment::Each { path, alias, body } => expand_each(&context, path, alias, body),
        })
        .collect();
    replace_references(&expanded, |p| render_path(&context, p))
}

/// The inline error block shown in place of a rendered template.
pub fn script_error_banner(message: &str) -> String {
    format!(
        "<div class=\"text-red-500 font-bold p-4 border border-red-500\">Script Error: {message}</div>"
    )
}

fn set_profile(context: &mut Value, profile: Value) {
    match context {
        Value::Object(map) => {
            if !profile.is_null() || map.contains_key("profile") {
                map.insert("profile".to_string(), profile);
            }
        }
        _ if profile.is_null() => {}
        other => {
            let mut map = serde_json::Map::new();
            map.insert("profile".to_string(), profile);
            *other = Value::Object(map);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Script extraction
// ────────────────────────────────────────────────────────────────────────────

/// Strips every closed `<script>` region. Returns the remaining template and
/// the concatenated script bodies, or `None` when no region was found.
fn extract_scripts(template: &str) -> (String, Option<String>) {
    let mut clean = String::with_capacity(template.len());
    let mut source: Option<String> = None;
    let mut rest = template;

    while let Some(open) = rest.find(SCRIPT_OPEN) {
        let body_start = open + SCRIPT_OPEN.len();
        let Some(close) = rest[body_start..].find(SCRIPT_CLOSE) else {
            break;
        };
        clean.push_str(&rest[..open]);
        let body = &rest[body_start..body_start + close];
        let acc = source.get_or_insert_with(String::new);
        acc.push_str(body);
        acc.push('\n');
        rest = &rest[body_start + close + SCRIPT_CLOSE.len()..];
    }
    clean.push_str(rest);

    (clean, source)
}

// ────────────────────────────────────────────────────────────────────────────
// Loop expansion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Segment<'t> {
    Text(&'t str),
    Each {
        path: &'t str,
        alias: &'t str,
        body: &'t str,
    },
}

/// Splits a template into literal text and `{#each}` blocks. Each block ends
/// at the first `{/each}` after its header, so blocks never nest.
fn split_segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(found) = template[cursor..].find(EACH_OPEN) {
        let open = cursor + found;
        let header_start = open + EACH_OPEN.len();

        let parsed = parse_each_header(&template[header_start..]).and_then(|(p, a, len)| {
            let body_start = header_start + len;
            template[body_start..]
                .find(EACH_CLOSE)
                .map(|close| (p, a, body_start, body_start + close))
        });

        match parsed {
            Some((path, alias, body_start, body_end)) => {
                if open > text_start {
                    segments.push(Segment::Text(&template[text_start..open]));
                }
                segments.push(Segment::Each {
                    path,
                    alias,
                    body: &template[body_start..body_end],
                });
                cursor = body_end + EACH_CLOSE.len();
                text_start = cursor;
            }
            None => cursor = open + 1,
        }
    }

    if text_start < template.len() {
        segments.push(Segment::Text(&template[text_start..]));
    }
    segments
}

/// Parses ` PATH as ALIAS}` and returns `(path, alias, consumed_len)`.
fn parse_each_header(s: &str) -> Option<(&str, &str, usize)> {
    let mut pos = skip_whitespace(s, 0, true)?;

    let path_len = s[pos..].bytes().take_while(|b| is_path_byte(*b)).count();
    if path_len == 0 {
        return None;
    }
    let path = &s[pos..pos + path_len];
    pos = skip_whitespace(s, pos + path_len, true)?;

    pos += s[pos..].strip_prefix("as").map(|_| 2)?;
    pos = skip_whitespace(s, pos, true)?;

    let alias_len = s[pos..].bytes().take_while(|b| is_alias_byte(*b)).count();
    if alias_len == 0 {
        return None;
    }
    let alias = &s[pos..pos + alias_len];
    pos += alias_len;

    s[pos..].starts_with('}').then_some((path, alias, pos + 1))
}

fn skip_whitespace(s: &str, from: usize, required: bool) -> Option<usize> {
    let skipped: usize = s[from..]
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    if required && skipped == 0 {
        None
    } else {
        Some(from + skipped)
    }
}

fn expand_each(context: &Value, array_path: &str, alias: &str, body: &str) -> String {
    let Some(items) = path::resolve_path(context, array_path) else {
        warn!("Template warning: {array_path} is not an array");
        return String::new();
    };
    let Value::Array(items) = items.as_ref() else {
        warn!("Template warning: {array_path} is not an array");
        return String::new();
    };

    let prefix = format!("{alias}.");
    items
        .iter()
        .map(|item| {
            replace_references(body, |p| match p.strip_prefix(prefix.as_str()) {
                Some(field) => render_path(item, field),
                None => render_path(context, p),
            })
        })
        .collect()
}
