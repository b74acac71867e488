//! `{{{name}}}` placeholder substitution.

use std::collections::HashMap;

/// The literal token a variable occupies in prompt content.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{{{name}}}}}}}")
}

/// Replace every `{{{key}}}` in `content` with its bound value.
///
/// Placeholders without a binding are left as they are. Keys are applied in
/// map order, so a value that itself contains another placeholder may or may
/// not be expanded.
pub fn substitute(content: &str, bindings: &HashMap<String, String>) -> String {
    let mut output = content.to_string();
    for (name, value) in bindings {
        let token = placeholder(name);
        if output.contains(&token) {
            output = output.replace(&token, value);
        }
    }
    output
}

/// Names of the `{{{...}}}` placeholders in `content`, in order of first use.
pub fn placeholders(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("{{{") {
        let after = &rest[start + 3..];
        let Some(end) = after.find("}}}") else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !name.contains('{') && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[end + 3..];
    }
    names
}
