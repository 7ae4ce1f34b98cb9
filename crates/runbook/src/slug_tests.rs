// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn basic_slugify() {
    assert_eq!(slugify("Hello World", 28), "hello-world");
}

#[test]
fn stop_words_removed() {
    assert_eq!(slugify("Fix the login button", 28), "fix-login-button");
}

#[test]
fn non_alphanum_replaced() {
    assert_eq!(slugify("fix: login_button!", 28), "fix-login-button");
}

#[test]
fn multiple_hyphens_collapsed() {
    assert_eq!(slugify("foo---bar", 28), "foo-bar");
}

#[test]
fn truncation_at_word_boundary() {
    let result = slugify("Implement User Authentication System", 28);
    assert!(result.len() <= 28);
    assert!(!result.ends_with('-'));
    assert_eq!(result, "implement-user");
}

#[test]
fn truncation_single_long_word() {
    let result = slugify("abcdefghijklmnopqrstuvwxyz12345", 28);
    assert_eq!(result, "abcdefghijklmnopqrstuvwxyz12");
}

#[test]
fn empty_after_stop_word_removal() {
    assert_eq!(slugify("the a an is are", 28), "");
}

#[test]
fn already_clean_slug() {
    assert_eq!(slugify("fix-login-button", 28), "fix-login-button");
}

#[test]
fn unicode_chars_replaced() {
    assert_eq!(slugify("café résumé", 28), "caf-r-sum");
}

#[test]
fn leading_trailing_hyphens_trimmed() {
    assert_eq!(slugify("--hello--", 28), "hello");
}

#[test]
fn single_word() {
    assert_eq!(slugify("deploy", 28), "deploy");
}

#[test]
fn all_special_chars() {
    assert_eq!(slugify("!!@@##$$", 28), "");
}

#[test]
fn exact_max_len() {
    assert_eq!(
        slugify("abcdefghijklmnopqrstuvwxyz12", 28),
        "abcdefghijklmnopqrstuvwxyz12"
    );
}

#[test]
fn truncation_trims_trailing_hyphen() {
    let result = slugify("abcdefghijklmnopqrstuvwxyz1 xyz", 28);
    assert!(!result.ends_with('-'));
    assert!(result.len() <= 28);
}

#[test]
fn contractions_removed() {
    assert_eq!(slugify("Don't break the login", 28), "break-login");
    assert_eq!(slugify("Server doesn't respond", 28), "server-respond");
    assert_eq!(slugify("Can't load config", 28), "load-config");
    assert_eq!(slugify("Value isn't valid", 28), "value-valid");
    assert_eq!(slugify("Cache hasn't refreshed", 28), "cache-refreshed");
    assert_eq!(slugify("Build won't pass", 28), "build-pass");
    assert_eq!(slugify("This shouldn't fail", 28), "fail");
}

#[test]
fn contraction_it_s_removed() {
    assert_eq!(slugify("It's broken", 28), "broken");
}

#[test]
fn contraction_all_stop_words() {
    assert_eq!(slugify("they're not", 28), "");
}

#[test]
fn consecutive_duplicates_after_stop_word_removal() {
    assert_eq!(slugify("make end peek peek peek", 28), "make-end-peek");
}

#[test]
fn duplicates_separated_by_stop_words_collapsed() {
    assert_eq!(slugify("fix the fix", 28), "fix");
}

#[test]
fn consecutive_duplicates_only() {
    assert_eq!(slugify("test test test", 28), "test");
}

#[test]
fn non_consecutive_duplicates_preserved() {
    assert_eq!(slugify("foo bar foo", 28), "foo-bar-foo");
}

// agent_display_name tests

#[test]
fn display_name_normal() {
    assert_eq!(
        agent_display_name("fix-login-button", "a1b2c3d4"),
        "fix-login-button-a1b2c3d4"
    );
}

#[test]
fn display_name_empty_slug() {
    assert_eq!(agent_display_name("the a an", "a1b2c3d4"), "a1b2c3d4");
}

#[test]
fn display_name_with_special_chars() {
    assert_eq!(
        agent_display_name("Fix the Login Button!", "abcd1234"),
        "fix-login-button-abcd1234"
    );
}

#[test]
fn display_name_truncation() {
    let result = agent_display_name(
        "implement user authentication system for the app",
        "12345678",
    );
    let parts: Vec<&str> = result.rsplitn(2, '-').collect();
    assert_eq!(parts[0], "12345678");
    let slug_part = parts[1];
    assert!(slug_part.len() <= 28);
}

// is_valid_name tests

#[test]
fn valid_name_accepts_lowercase_alphanumeric_hyphen() {
    assert!(is_valid_name("my-agent-1"));
}

#[test]
fn valid_name_rejects_empty() {
    assert!(!is_valid_name(""));
}

#[test]
fn valid_name_rejects_leading_hyphen() {
    assert!(!is_valid_name("-foo"));
}

#[test]
fn valid_name_rejects_trailing_hyphen() {
    assert!(!is_valid_name("foo-"));
}

#[test]
fn valid_name_rejects_uppercase() {
    assert!(!is_valid_name("Foo"));
}

#[test]
fn valid_name_rejects_over_63_chars() {
    let name = "a".repeat(64);
    assert!(!is_valid_name(&name));
}

#[test]
fn valid_name_accepts_63_chars() {
    let name = "a".repeat(63);
    assert!(is_valid_name(&name));
}
