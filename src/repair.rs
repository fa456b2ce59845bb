//! Extraction and repair of near-valid JSON emitted by generative models
//!
//! Models wrap JSON in prose and code fences, leave comments in place, and
//! drop or duplicate separators. This module isolates the outermost object
//! and fixes that narrow class of defects. It is not a JSON5 parser: every
//! step is a targeted, idempotent rewrite applied once, in order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

static TRAILING_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

// The missing-separator rules only fire across a line break, so a value and
// the next token on the same line are left alone.
static STRING_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([ \t]*\r?\n\s*)""#).unwrap());

static NUMBER_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\d)([ \t]*\r?\n\s*)""#).unwrap());

static LITERAL_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(true|false|null)([ \t]*\r?\n\s*)""#).unwrap());

static CLOSE_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([}\]])([ \t]*\r?\n\s*)""#).unwrap());

static CLOSE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([}\]])([ \t]*\r?\n\s*)([{\[])").unwrap());

/// Slice from the first `{` to the last `}` inclusive.
///
/// Returns `None` when there is no such span.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Apply the repair pass to candidate JSON text
pub fn repair_json(text: &str) -> String {
    let steps: [(&str, fn(&str) -> Cow<'_, str>); 4] = [
        ("strip_code_fences", strip_code_fences),
        ("strip_comments", strip_comments),
        ("remove_trailing_commas", remove_trailing_commas),
        ("insert_missing_commas", insert_missing_commas),
    ];

    let mut current = text.to_string();
    for (name, step) in steps {
        let changed = match step(&current) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(changed) => changed,
        };
        if changed != current {
            debug!(step = name, "repair step rewrote model output");
        }
        current = changed;
    }
    current.trim().to_string()
}

/// Extract the object span from a raw response and repair it
pub fn extract_and_repair(raw: &str) -> Option<String> {
    extract_json_span(raw).map(repair_json)
}

/// Remove Markdown code-fence markers outside string literals
pub fn strip_code_fences(text: &str) -> Cow<'_, str> {
    rewrite_outside_strings(text, |run| FENCE_RE.replace_all(run, ""))
}

/// Apply `rewrite` to every run of text between string literals.
///
/// Literals are copied verbatim, escapes included. An unterminated literal
/// runs to the end of the text.
fn rewrite_outside_strings<F>(text: &str, rewrite: F) -> Cow<'_, str>
where
    F: for<'r> Fn(&'r str) -> Cow<'r, str>,
{
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }

        let run = rewrite(&text[run_start..i]);
        changed |= matches!(run, Cow::Owned(_));
        out.push_str(&run);

        let literal_start = i;
        i += 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    i += 1;
                    break;
                }
                _ => i += 1,
            }
        }
        i = i.min(bytes.len());
        out.push_str(&text[literal_start..i]);
        run_start = i;
    }

    let run = rewrite(&text[run_start..]);
    changed |= matches!(run, Cow::Owned(_));
    out.push_str(&run);

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

/// Remove `//` line comments and `/* */` block comments outside string literals
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("//") && !text.contains("/*") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                // Keep the newline so line-based separator rules still apply
                while chars.next_if(|&ch| ch != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for ch in chars.by_ref() {
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Drop commas directly before `}` or `]` outside string literals
pub fn remove_trailing_commas(text: &str) -> Cow<'_, str> {
    rewrite_outside_strings(text, |run| TRAILING_COMMA_RE.replace_all(run, "${1}"))
}

/// Insert commas that are missing between values on consecutive lines
pub fn insert_missing_commas(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);

    let rules: [(&Lazy<Regex>, &str); 5] = [
        (&STRING_STRING_RE, "\",${1}\""),
        (&NUMBER_STRING_RE, "${1},${2}\""),
        (&LITERAL_STRING_RE, "${1},${2}\""),
        (&CLOSE_STRING_RE, "${1},${2}\""),
        (&CLOSE_OPEN_RE, "${1},${2}${3}"),
    ];

    for (re, replacement) in rules {
        let changed = match re.replace_all(&current, replacement) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(changed) => changed,
        };
        current = Cow::Owned(changed);
    }

    current
}
