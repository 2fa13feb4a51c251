//! Natural-language method summaries.
//!
//! Renders a method's control-flow tree as prose: identifiers become
//! lower-case word sequences split at camel-case boundaries, statements are
//! normalized and classified (assignment, boolean predicate, member access,
//! bare expression), and loops or guarded blocks at the top level render as
//! `while <condition>: <body>` / `until <condition>: <body>` lines.

use once_cell::sync::Lazy;
use regex::Regex;

use super::entity::EntityId;
use super::flow::{FlowKind, FlowNode};
use super::project::Project;

static DOUBLE_EQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\s*=").unwrap());
static LESS_EQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\s*=").unwrap());
static GREATER_EQ: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s*=").unwrap());
static NOT_EQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\s*=").unwrap());
static PAREN_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*\)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub struct SummaryGenerator<'a> {
    project: &'a Project,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// Render a method body as prose. Top-level units are joined by
    /// newlines, nested units by commas.
    pub fn describe(&self, method: EntityId) -> String {
        let arena = self.project.arena();
        let entity = arena.get(method);
        let class_name = entity
            .parent
            .map(|parent| arena.get(parent).name.as_str())
            .unwrap_or("");
        let root = FlowNode::new(&entity.body_text);
        render_node(class_name, &root, 0)
    }
}

fn render_node(class_name: &str, node: &FlowNode, depth: u32) -> String {
    let delimiter = if depth == 0 { "\n" } else { ", " };
    let mut description = String::new();
    for child in node.children() {
        let text = if child.is_statement() {
            statement_to_text(class_name, child.raw_text())
        } else {
            let body = render_node(class_name, child, depth + 1);
            if body.is_empty() {
                body
            } else if depth == 0
                && matches!(child.kind(), FlowKind::If | FlowKind::While | FlowKind::For)
            {
                let condition = child
                    .condition()
                    .map(|c| statement_to_text(class_name, c.raw_text()))
                    .unwrap_or_default();
                match condition.strip_prefix("not ") {
                    Some(rest) => format!("until {}: {}", rest.trim(), body),
                    None => format!("while {condition}: {body}"),
                }
            } else {
                body
            }
        };
        if !text.is_empty() {
            if !description.is_empty() {
                description.push_str(delimiter);
            }
            description.push_str(&text);
        }
    }
    description
}

/// Normalize operator spacing, rewrite `this.` to the class's own name,
/// spell out logical operators, and strip parenthesized argument lists.
/// The replacement order matters: `!` spacing must happen before the
/// `!=` repair, and `not` substitution after it.
fn normalize_statement(class_name: &str, raw: &str) -> String {
    let text = raw.replace('=', " = ").replace('!', " ! ");
    let text = text.replace("this.", &format!("{class_name} "));
    let text = DOUBLE_EQ.replace_all(&text, "==");
    let text = LESS_EQ.replace_all(&text, "<=");
    let text = GREATER_EQ.replace_all(&text, ">=");
    let text = NOT_EQ.replace_all(&text, "!=");
    let text = text
        .replace("&&", " and ")
        .replace("||", " or ")
        .replace(" ! ", " not ");
    PAREN_GROUP.replace_all(&text, "").into_owned()
}

/// Render one statement as prose. Assignments become `set <lhs>` when the
/// right side is arithmetic or too short to read on its own; `.is`/`.has`
/// member accesses render predicate-first (`is faulty sensor`); other
/// member accesses keep only the trailing name.
pub fn statement_to_text(class_name: &str, raw: &str) -> String {
    let text = normalize_statement(class_name, raw);
    let rendered = if let Some(eq) = text.find(" = ") {
        let assignment = name_to_words(&text[eq + 3..]);
        let arithmetic = assignment.contains(['+', '-', '?', '*', '(', ')', '/', '%']);
        if arithmetic || assignment.len() < 3 {
            format!("set {}", name_to_words(&text[..eq]))
        } else {
            assignment
        }
    } else if let Some(dot) = text.rfind('.') {
        if text.contains(".is") || text.contains(".has") {
            format!(
                "{} {}",
                name_to_words(&text[dot + 1..]),
                name_to_words(&text[..dot])
            )
        } else {
            name_to_words(&text[dot + 1..])
        }
    } else {
        name_to_words(&text)
    };
    let rendered = rendered.replace("new ", "create ");
    WHITESPACE.replace_all(&rendered, " ").trim().to_string()
}

/// Split an identifier into lower-case words at camel-case and dot
/// boundaries. Digits are discarded, all-caps acronym tokens are kept
/// verbatim, and a leading `to`/`from` becomes `convert`.
pub fn name_to_words(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !c.is_ascii_digit()).collect();
    let chars: Vec<char> = cleaned.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let prev_lower = i > 0 && chars[i - 1].is_lowercase();
        let next_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
        if c.is_uppercase() && (prev_lower || (i > 0 && next_lower)) && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out: Vec<String> = Vec::new();
    let mut rest = words.as_slice();
    if let Some(first) = words.first() {
        if first.eq_ignore_ascii_case("to") || first.eq_ignore_ascii_case("from") {
            out.push("convert".to_string());
            rest = &words[1..];
        }
    }
    for word in rest {
        if word.chars().any(|c| c.is_lowercase()) {
            out.push(word.to_lowercase());
        } else {
            out.push(word.clone());
        }
    }
    out.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityKind;

    #[test]
    fn test_name_to_words_camel_split() {
        assert_eq!(name_to_words("isReady"), "is ready");
        assert_eq!(name_to_words("reportFailure"), "report failure");
    }

    #[test]
    fn test_name_to_words_converts_leading_to_and_from() {
        assert_eq!(name_to_words("toFahrenheit"), "convert fahrenheit");
        assert_eq!(name_to_words("fromCelsius"), "convert celsius");
    }

    #[test]
    fn test_name_to_words_keeps_acronyms_and_drops_digits() {
        assert_eq!(name_to_words("HTTPServer"), "HTTP server");
        assert_eq!(name_to_words("save2Disk"), "save disk");
    }

    #[test]
    fn test_short_assignment_renders_as_set() {
        assert_eq!(statement_to_text("T", "y = 1"), "set y");
    }

    #[test]
    fn test_arithmetic_assignment_renders_as_set() {
        assert_eq!(statement_to_text("T", "count = count + 1"), "set count");
    }

    #[test]
    fn test_readable_assignment_renders_right_side() {
        assert_eq!(
            statement_to_text("T", "total = computeSum()"),
            "compute sum"
        );
        assert_eq!(statement_to_text("T", "flag = !ready"), "not ready");
    }

    #[test]
    fn test_comparison_is_not_an_assignment() {
        assert_eq!(statement_to_text("T", "a == b"), "a == b");
    }

    #[test]
    fn test_predicate_access_renders_predicate_first() {
        assert_eq!(
            statement_to_text("T", "sensor.isFaulty()"),
            "is faulty sensor"
        );
    }

    #[test]
    fn test_member_access_keeps_trailing_name() {
        assert_eq!(statement_to_text("T", "logger.warn()"), "warn");
    }

    #[test]
    fn test_this_prefix_becomes_class_name() {
        assert_eq!(
            statement_to_text("Thermostat", "this.report()"),
            "thermostat report"
        );
    }

    #[test]
    fn test_constructor_call_renders_as_create() {
        assert_eq!(statement_to_text("T", "new Point()"), "create point");
    }

    fn describe_body(body: &str) -> String {
        let mut project = Project::new();
        let class = project.arena_mut().alloc(
            EntityKind::Class,
            "Thermostat",
            "",
            "class Thermostat { }",
            Some(0),
        );
        let method = project
            .arena_mut()
            .alloc(EntityKind::Method, "check", "void", body, None);
        project.arena_mut().attach(class, method);
        project.add_source(class);
        project.rebuild_method_index();
        SummaryGenerator::new(&project).describe(method)
    }

    #[test]
    fn test_guarded_block_renders_as_while_line() {
        assert_eq!(
            describe_body("{ if (sensor.isFaulty()) { report(); } }"),
            "while is faulty sensor: report"
        );
    }

    #[test]
    fn test_negated_loop_renders_as_until_line() {
        assert_eq!(
            describe_body("{ while (!running) { step(); } }"),
            "until running: step"
        );
    }

    #[test]
    fn test_depth_zero_newlines_and_nested_commas() {
        assert_eq!(
            describe_body("{ warmUp(); if (ready) { stepOne(); stepTwo(); } }"),
            "warm up\nwhile ready: step one, step two"
        );
    }
}
