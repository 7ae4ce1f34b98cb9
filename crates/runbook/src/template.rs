// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation for agent-type session argv templates.
//!
//! Grounded on the teacher's regex-based `${variable}`/`${VAR:-default}`
//! interpolator, reimplemented as a hand-written scanner: the compile-time
//! `AgentType` registry has no other use for `regex`, so one substitution
//! function isn't worth the dependency.

use std::collections::HashMap;

/// Escape a string for safe use inside shell single-quoted contexts.
///
/// Single quotes in the value are replaced with `'\''` (end quote, escaped
/// literal quote, start quote), the standard shell idiom for embedding a
/// single quote inside a single-quoted string.
pub fn escape_for_shell(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Interpolate `${name}` placeholders with values from the vars map.
///
/// Also expands `${VAR:-default}` patterns from environment variables.
/// Environment variables are expanded first, then template variables.
/// Unknown template variables are left as-is.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    interpolate_inner(template, vars, false)
}

/// Interpolate `${name}` placeholders with shell-safe escaping.
///
/// Like [`interpolate`], but escapes substituted values for safe use in
/// shell contexts (single quotes are escaped using the `'\''` idiom).
/// Use this for session argv templates; use [`interpolate`] for prompts
/// and other non-shell contexts.
pub fn interpolate_shell(template: &str, vars: &HashMap<String, String>) -> String {
    interpolate_inner(template, vars, true)
}

fn interpolate_inner(template: &str, vars: &HashMap<String, String>, shell_escape: bool) -> String {
    let expanded = expand_env_defaults(template);
    expand_vars(&expanded, vars, shell_escape)
}

/// Expands `${VAR:-default}` into the environment value of `VAR`, or
/// `default` if `VAR` is unset.
fn expand_env_defaults(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(placeholder) = placeholder_at(template, i) {
            if let Some((name, rest)) = placeholder.split_once(":-") {
                if is_identifier(name) {
                    let value = std::env::var(name).unwrap_or_else(|_| rest.to_string());
                    out.push_str(&value);
                    i += placeholder.len() + 3;
                    continue;
                }
            }
        }
        // `i < bytes.len()` holds here, so the slice is non-empty.
        #[allow(clippy::unwrap_used)]
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Expands `${name}` or `${namespace.name}` from `vars`, leaving unknown
/// names untouched.
fn expand_vars(template: &str, vars: &HashMap<String, String>, shell_escape: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(name) = placeholder_at(template, i) {
            if is_var_name(name) {
                match vars.get(name) {
                    Some(val) if shell_escape => out.push_str(&escape_for_shell(val)),
                    Some(val) => out.push_str(val),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                i += name.len() + 3;
                continue;
            }
        }
        // `i < bytes.len()` holds here, so the slice is non-empty.
        #[allow(clippy::unwrap_used)]
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// If `template[i..]` begins with `${...}`, returns the text between the
/// braces (without consuming it — callers advance by `body.len() + 3`,
/// the two braces plus the opening `$`).
fn placeholder_at(template: &str, i: usize) -> Option<&str> {
    let rest = &template[i..];
    let inner = rest.strip_prefix("${")?;
    let end = inner.find('}')?;
    Some(&inner[..end])
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `name` or `namespace.name` where each dot-separated segment is an
/// identifier (segments after the first may also contain hyphens).
fn is_var_name(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut segments = s.split('.');
    let Some(first) = segments.next() else { return false };
    if !is_identifier(first) {
        return false;
    }
    segments.all(|seg| {
        !seg.is_empty()
            && seg.chars().next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false)
            && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
