//! `{{...}}` placeholder expansion.
//!
//! Templates are scanned once, left to right. Substituted text is copied to
//! the output as-is and never scanned again, so a value that itself contains
//! `{{x}}` stays literal. A placeholder cannot span lines or contain `{{`,
//! so stray braces in front of one stay literal. Anything the resolver does
//! not know is removed.

use serde_json::Value;

/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'t> {
    Text(&'t str),
    /// The name between the braces, untrimmed.
    Placeholder(&'t str),
}

/// Split a template into literal text and placeholders.
pub fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segs = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while let Some(found) = template[i..].find("{{") {
        let first = i + found;
        let Some(len) = template[first + 2..].find("}}") else {
            break;
        };
        let close = first + 2 + len;
        // Innermost opening before the close: `{{{x}}` and `{{ a {{x}}`
        // both name `x`.
        let open = first + template[first..close].rfind("{{").unwrap_or(0);
        let name = &template[open + 2..close];
        if name.contains('\n') {
            // The closing braces are on a later line; retry one byte on.
            i = open + 1;
            continue;
        }
        if literal_start < open {
            segs.push(Segment::Text(&template[literal_start..open]));
        }
        segs.push(Segment::Placeholder(name));
        i = close + 2;
        literal_start = i;
    }

    if literal_start < template.len() {
        segs.push(Segment::Text(&template[literal_start..]));
    }
    segs
}

/// Expand every placeholder through `resolve`; unknown names become "".
pub fn expand(template: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    for seg in segments(template) {
        match seg {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => match resolve(name) {
                Some(value) => out.push_str(&value),
                None => tracing::debug!(placeholder = name, "removing unresolved placeholder"),
            },
        }
    }
    out
}

/// Resolve the data-list placeholders against an element's raw data values.
///
/// `data_list` and `data_json` only resolve when there is data; the indexed
/// forms always resolve, to "" when the index is out of range.
pub fn resolve_data(name: &str, data: &[String]) -> Option<String> {
    match name {
        "data_list" if !data.is_empty() => Some(html_list(data)),
        "data_json" if !data.is_empty() => Some(json_array(data)),
        _ => {
            if let Some(index) = indexed(name, "data_json") {
                Some(data_at(data, index, name).map(json_string).unwrap_or_default())
            } else if let Some(index) = indexed(name, "data") {
                Some(data_at(data, index, name).map(str::to_string).unwrap_or_default())
            } else {
                None
            }
        }
    }
}

/// Expand a script template for one element instance.
///
/// Only the JSON and indexed data placeholders apply; `data_list` is markup
/// and is removed like any unknown name. When `{{data_json}}` is wrapped in a pair of
/// matching quotes, the quotes are replaced too and the array is emitted as a
/// JSON string literal, so the author's quoting is not doubled.
pub fn expand_script(template: &str, data: &[String]) -> String {
    let segs = segments(template);
    let mut out = String::with_capacity(template.len());
    let mut skip_quote = false;

    for (i, seg) in segs.iter().enumerate() {
        match *seg {
            Segment::Text(mut text) => {
                if skip_quote {
                    text = &text[1..];
                    skip_quote = false;
                }
                out.push_str(text);
            }
            Segment::Placeholder("data_json") if !data.is_empty() => {
                let quote = out.chars().last().filter(|c| *c == '"' || *c == '\'');
                let closes = match (quote, segs.get(i + 1)) {
                    (Some(q), Some(Segment::Text(next))) => next.starts_with(q),
                    _ => false,
                };
                let array = json_array(data);
                if closes {
                    out.pop();
                    out.push_str(&json_string(&array));
                    skip_quote = true;
                } else {
                    out.push_str(&array);
                }
            }
            Segment::Placeholder(name) => match resolve_script_data(name, data) {
                Some(value) => out.push_str(&value),
                None => {
                    tracing::debug!(placeholder = name, "removing unresolved script placeholder")
                }
            },
        }
    }
    out
}

fn resolve_script_data(name: &str, data: &[String]) -> Option<String> {
    match name {
        "data_list" => None,
        _ => resolve_data(name, data),
    }
}

/// Parse `prefix[N]` into `N`.
fn indexed(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()
}

fn data_at<'d>(data: &'d [String], index: usize, placeholder: &str) -> Option<&'d str> {
    let value = data.get(index).map(String::as_str);
    if value.is_none() {
        tracing::debug!(placeholder, index, len = data.len(), "data index out of range");
    }
    value
}

fn html_list(data: &[String]) -> String {
    let mut out = String::from("<ul>\n");
    for item in data {
        out.push_str("<li>");
        out.push_str(item);
        out.push_str("</li>\n");
    }
    out.push_str("</ul>");
    out
}

fn json_array(data: &[String]) -> String {
    Value::from(data.to_vec()).to_string()
}

fn json_string(s: &str) -> String {
    Value::from(s).to_string()
}
