//! Top-level text scanning primitives shared by the flow decomposer and the
//! call resolver.
//!
//! "Top-level" means at parenthesis depth zero relative to the starting
//! position; every scan gives up when the depth goes negative, i.e. when it
//! falls off the end of the expression it was started inside.

/// Byte index of the first top-level occurrence of `needle` at or after
/// `from`. An opening parenthesis is itself found at depth zero; a closing
/// one is found once it brings the depth back to zero, so searching for `)`
/// from an opening `(` lands on its match.
pub fn top_level_find(text: &str, needle: char, from: usize) -> Option<usize> {
    let mut level = 0i32;
    for (i, c) in text.char_indices() {
        if i < from {
            continue;
        }
        if c == needle && level == 0 {
            return Some(i);
        }
        if c == '(' {
            level += 1;
        } else if c == ')' {
            level -= 1;
        }
        if c == needle && level == 0 {
            return Some(i);
        }
        if level < 0 {
            break;
        }
    }
    None
}

/// Byte index of the `}` matching the `{` at `open`, skipping nested
/// blocks. `open` must point at a `{`; `None` when the block never closes.
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text[open..].char_indices() {
        if c == '{' {
            depth += 1;
        } else if c == '}' {
            depth -= 1;
            if depth == 0 {
                return Some(open + i);
            }
        }
    }
    None
}

/// Byte index of the first top-level occurrence of a multi-character
/// `needle` at or after `from`.
pub fn top_level_find_str(text: &str, needle: &str, from: usize) -> Option<usize> {
    let first = needle.chars().next()?;
    let mut pos = from;
    while let Some(i) = top_level_find(text, first, pos) {
        if text[i..].starts_with(needle) {
            return Some(i);
        }
        pos = i + first.len_utf8();
    }
    None
}

/// Number of top-level occurrences of `needle` at or after `from`.
pub fn top_level_count(text: &str, needle: char, from: usize) -> usize {
    let mut level = 0i32;
    let mut count = 0;
    for (i, c) in text.char_indices() {
        if i < from {
            continue;
        }
        if c == '(' {
            level += 1;
        } else if c == ')' {
            level -= 1;
        } else if c == needle && level == 0 {
            count += 1;
        }
        if level < 0 {
            break;
        }
    }
    count
}

/// Split a class body into its brace-depth-zero statements, starting at
/// `from` (normally one past the opening brace of the class). Text inside
/// nested braces (method bodies) is skipped entirely; the scan stops at the
/// closing brace of the class. A trailing unterminated fragment is kept.
pub fn class_member_statements(text: &str, from: usize) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut level = 0i32;
    for (i, c) in text.char_indices() {
        if i < from {
            continue;
        }
        match c {
            '{' => level += 1,
            '}' => level -= 1,
            '\n' => {}
            ';' if level == 0 => {
                statements.push(current.trim().to_string());
                current.clear();
            }
            _ if level == 0 => current.push(c),
            _ => {}
        }
        if level < 0 {
            break;
        }
    }
    let current = current.trim();
    if !current.is_empty() {
        statements.push(current.to_string());
    }
    statements
}

/// Split a method body into resolution units at every top-level `{`, `}`
/// or `;`. Newlines are dropped; empty fragments are not emitted.
pub fn split_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut level = 0i32;
    for c in text.chars() {
        match c {
            '\n' => continue,
            '(' => {
                level += 1;
                current.push(c);
            }
            ')' => {
                level -= 1;
                current.push(c);
            }
            '{' | '}' | ';' if level <= 0 => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    statements.push(trimmed.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_find_skips_nested_parens() {
        let text = "if (sensor.isFaulty())";
        let open = top_level_find(text, '(', 0).unwrap();
        assert_eq!(open, 3);
        // the match for the outer paren is the final one, not the inner
        assert_eq!(top_level_find(text, ')', open), Some(text.len() - 1));
        // '.' only occurs inside the parens, so no top-level hit
        assert_eq!(top_level_find(text, '.', 0), None);
    }

    #[test]
    fn test_top_level_find_stops_at_enclosing_close() {
        // scanning starts inside an expression; the stray ')' ends it
        assert_eq!(top_level_find("a, b), c", ';', 0), None);
        assert_eq!(top_level_count("a, b), c", ',', 0), 1);
    }

    #[test]
    fn test_matching_brace_skips_nested_blocks() {
        let text = "{ a { b } c } d";
        assert_eq!(matching_brace(text, 0), Some(12));
        assert_eq!(matching_brace(text, 4), Some(8));
        assert_eq!(matching_brace("{ open", 0), None);
    }

    #[test]
    fn test_top_level_find_str() {
        assert_eq!(top_level_find_str("a && b", "&&", 0), Some(2));
        assert_eq!(top_level_find_str("f(a && b)", "&&", 0), None);
        assert_eq!(top_level_find_str("a == b", "==", 0), Some(2));
    }

    #[test]
    fn test_top_level_count_arguments() {
        assert_eq!(top_level_count("f(a, g(b, c), d)", ',', 2), 2);
    }

    #[test]
    fn test_class_member_statements_skip_method_bodies() {
        let body = "class T { Sensor sensor; int limit = 3; void check() { a(); b(); } }";
        let from = body.find('{').unwrap() + 1;
        let statements = class_member_statements(body, from);
        assert_eq!(statements[0], "Sensor sensor");
        assert_eq!(statements[1], "int limit = 3");
        // the method signature accumulates but never closes with ';'
        assert!(statements[2].contains("void check()"));
    }

    #[test]
    fn test_split_statements_respects_paren_depth() {
        let statements = split_statements(" if (sensor.isFaulty()) { report(); } }");
        assert_eq!(statements, vec!["if (sensor.isFaulty())", "report()"]);

        let looped = split_statements("for (int i = 0; i < n; i++) { a(i); }");
        assert_eq!(looped, vec!["for (int i = 0; i < n; i++)", "a(i)"]);
    }
}
