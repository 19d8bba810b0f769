//! Placeholder scanning for prompt text.
//!
//! A placeholder is `{name}` where `name` is one or more word characters.
//! Anything else in braces (JSON snippets, `{ }`, `{a-b}`) is plain text.
//! Input keys follow the same grammar, so every key can be referenced.
//! The scanner only reports names; substitution happens on the engine side.

use regex::Regex;
use std::sync::LazyLock;

/// `{name}` with the name captured in group 1.
pub static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("placeholder name pattern is valid"));

/// Return the distinct placeholder names in `text`, in order of first use.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in PLACEHOLDER_RE.captures_iter(text) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    names
}

/// Whether `name` can appear as `{name}` in prompt text.
pub fn is_placeholder_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}
