// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name slugification, kept nearly verbatim from the stop-word-aware
//! slugifier that once built job display names. Used here to turn a
//! `--project` label or a working directory basename into a readable
//! default agent name before the `-{nonce}` suffix is appended.

const STOP_WORDS: &[&str] = &[
    "a",
    "an",
    "the",
    "this",
    "that",
    "these",
    "those",
    "and",
    "but",
    "or",
    "nor",
    "not",
    "so",
    "yet",
    "both",
    "each",
    "every",
    "all",
    "any",
    "few",
    "more",
    "most",
    "other",
    "some",
    "such",
    "no",
    "only",
    "own",
    "same",
    "than",
    "too",
    "very",
    "just",
    "about",
    "also",
    "its",
    "it",
    "we",
    "our",
    "currently",
    "when",
    "which",
    "what",
    // Pronouns commonly found in contractions
    "i",
    "he",
    "she",
    "they",
    "you",
    // Contraction fragments (apostrophe replaced by hyphen, e.g. "don't" -> "don-t")
    "t",
    "s",
    "d",
    "m",
    "re",
    "ve",
    "ll",
    // Left stems of common n't contractions
    "don",
    "doesn",
    "didn",
    "hasn",
    "hadn",
    "isn",
    "aren",
    "wasn",
    "weren",
    "won",
    "wouldn",
    "shouldn",
    "couldn",
    "mustn",
    "needn",
];

/// Slugify a string for use as an agent name component.
///
/// Lowercases, replaces non-alphanumeric with hyphens, removes stop words,
/// collapses hyphens, and truncates to `max_len` characters (trimming trailing hyphens).
pub fn slugify(input: &str, max_len: usize) -> String {
    let lower = input.to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    let mut filtered: Vec<&str> = Vec::new();
    for word in slug.split('-') {
        if word.is_empty() || STOP_WORDS.contains(&word) {
            continue;
        }
        if filtered.last() != Some(&word) {
            filtered.push(word);
        }
    }
    let mut result = filtered.join("-");

    let trimmed = result.trim_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    if result.len() > max_len {
        if let Some(pos) = result[..max_len].rfind('-') {
            result.truncate(pos);
        } else {
            result.truncate(max_len);
        }
    }

    let trimmed = result.trim_end_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    result
}

/// Build a default agent name from a project label or working-directory
/// basename, plus a disambiguating nonce.
///
/// Slugifies the input, truncates to 28 chars, and appends `-{nonce}`.
pub fn agent_display_name(raw: &str, nonce: &str) -> String {
    let slug = slugify(raw, 28);
    if slug.is_empty() {
        nonce.to_string()
    } else {
        format!("{slug}-{nonce}")
    }
}

/// Whether `name` is a valid agent/host name: 1-63 characters, lowercase
/// ASCII alphanumerics and hyphens, not starting or ending with a hyphen.
///
/// Hand-written rather than regex-based — the character class is small
/// enough that a scan is clearer than a pattern.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 63 {
        return false;
    }
    if name.starts_with('-') || name.ends_with('-') {
        return false;
    }
    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
