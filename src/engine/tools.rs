//! Name and pattern utilities

use crate::types::Name;

/// Simple glob pattern matching (supports * and ?). `*` also crosses `::`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => {
            if rest.is_empty() {
                return true; // trailing * matches everything
            }
            (0..=text.len()).any(|skip| glob_match_chars(rest, &text[skip..]))
        }
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((&p, rest)) => text.first() == Some(&p) && glob_match_chars(rest, &text[1..]),
    }
}

/// True if `name` (relative form) matches any of the patterns.
pub fn matches_any(patterns: &[String], name: &Name) -> bool {
    patterns.iter().any(|p| glob_match(p, name.relative()))
}

/// Constant segment: uppercase ASCII letter, then letters, digits or `_`.
pub fn is_valid_constant_name(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

const OPERATOR_METHODS: &[&str] = &[
    "==", "!=", "===", "=~", "!~", "<=>", "<", "<=", ">", ">=", "+", "-", "*", "/", "%", "**",
    "<<", ">>", "&", "|", "^", "~", "!", "+@", "-@", "[]", "[]=", "`",
];

/// Identifier with an optional `?`, `!` or `=` suffix, or a known operator.
pub fn is_valid_method_name(name: &str) -> bool {
    if OPERATOR_METHODS.contains(&name) {
        return true;
    }
    let body = name
        .strip_suffix(['?', '!', '='])
        .unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
