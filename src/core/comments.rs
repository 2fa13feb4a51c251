//! Comment text cleanup.
//!
//! Turns raw `//`, `/* … */` and javadoc comment text into plain prose:
//! markers and decorative asterisks go, tag lines (`@param`, `@return`,
//! `@author`, …) are dropped wholesale, whitespace collapses.

/// Clean raw comment text into plain prose.
pub fn clean(raw: &str) -> String {
    let mut words = Vec::new();
    for line in raw.lines() {
        let line = line
            .trim()
            .trim_start_matches("/**")
            .trim_start_matches("/*")
            .trim_start_matches("//")
            .trim_end_matches("*/")
            .trim_start_matches('*')
            .trim();
        if line.starts_with('@') {
            continue;
        }
        for word in line.split_whitespace() {
            words.push(word);
        }
    }
    words.join(" ")
}
