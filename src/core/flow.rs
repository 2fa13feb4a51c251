//! Control-flow decomposition of raw method bodies.
//!
//! A method body is broken into a tree of plain statements and control
//! constructs by a single left-to-right scan: no grammar, just brace,
//! parenthesis and semicolon tracking. Two deliberate simplifications:
//! `try`/`finally` block interiors are spliced directly into the enclosing
//! level, and `catch` blocks are discarded entirely.

use once_cell::unsync::OnceCell;

use super::scan::{matching_brace, top_level_find};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Statement,
    If,
    While,
    For,
    Condition,
}

/// One node of a control-flow tree: a leaf statement, a control construct
/// with a condition child and a body, or a condition.
///
/// Children are decomposed from `raw_text` on first access and cached.
#[derive(Debug, Clone)]
pub struct FlowNode {
    kind: FlowKind,
    raw_text: String,
    condition: Option<Box<FlowNode>>,
    children: OnceCell<Vec<FlowNode>>,
}

impl FlowNode {
    /// Root node over a full method body. A surrounding brace pair is
    /// stripped before decomposition.
    pub fn new(contents: &str) -> Self {
        Self {
            kind: FlowKind::Statement,
            raw_text: strip_block(contents),
            condition: None,
            children: OnceCell::new(),
        }
    }

    fn statement(text: &str) -> Self {
        Self {
            kind: FlowKind::Statement,
            raw_text: text.trim().to_string(),
            condition: None,
            children: OnceCell::new(),
        }
    }

    fn control(kind: FlowKind, condition: &str, body: &str) -> Self {
        Self {
            kind,
            raw_text: strip_block(body),
            condition: Some(Box::new(Self {
                kind: FlowKind::Condition,
                raw_text: condition.trim().to_string(),
                condition: None,
                children: OnceCell::new(),
            })),
            children: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn is_statement(&self) -> bool {
        self.kind == FlowKind::Statement
    }

    pub fn condition(&self) -> Option<&FlowNode> {
        self.condition.as_deref()
    }

    /// Child nodes, decomposed from the raw text on first access.
    pub fn children(&self) -> &[FlowNode] {
        self.children.get_or_init(|| {
            let mut nodes = Vec::new();
            decompose_into(&self.raw_text, &mut nodes);
            nodes
        })
    }
}

/// Trim and remove one surrounding `{ … }` pair if present.
fn strip_block(contents: &str) -> String {
    let trimmed = contents.trim();
    if trimmed.starts_with('{') && trimmed.len() >= 2 {
        let inner = &trimmed[1..];
        let inner = inner.strip_suffix('}').unwrap_or_else(|| {
            let mut chars = inner.chars();
            chars.next_back();
            chars.as_str()
        });
        inner.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Single left-to-right scan over `contents`, appending decomposed nodes to
/// `out`. The accumulating buffer becomes a statement at each top-level
/// `;`; the keywords `if`/`while`/`for` capture a condition and a body,
/// `try`/`finally` splice their block interior into the current level,
/// `catch` skips its block, and `//` suppresses input to the end of line.
fn decompose_into(contents: &str, out: &mut Vec<FlowNode>) {
    let chars: Vec<(usize, char)> = contents.char_indices().collect();
    let mut pos = 0usize;
    let mut buffer = String::new();
    let mut line_comment = false;

    while pos < chars.len() {
        let (offset, mut c) = chars[pos];
        if c == '\n' {
            c = ' ';
            line_comment = false;
        }
        if line_comment {
            pos += 1;
            continue;
        }

        // byte offset the scan has consumed through, when a construct was
        // captured as a whole
        let mut consumed_to: Option<usize> = None;

        if c == '(' {
            let keyword = buffer.trim();
            if keyword == "if" || keyword == "while" || keyword == "for" {
                let kind = match keyword {
                    "if" => FlowKind::If,
                    "while" => FlowKind::While,
                    _ => FlowKind::For,
                };
                match capture_control(contents, offset) {
                    Some((condition_end, body_end)) => {
                        out.push(FlowNode::control(
                            kind,
                            &contents[offset + 1..condition_end],
                            &contents[condition_end + 1..=body_end],
                        ));
                        buffer.clear();
                        consumed_to = Some(body_end);
                    }
                    // unterminated construct: discard the rest of the input
                    None => return,
                }
            }
        }

        if consumed_to.is_none() {
            if c == ';' {
                out.push(FlowNode::statement(&buffer));
                buffer.clear();
            } else {
                buffer.push(c);
            }

            let keyword = buffer.trim();
            if keyword == "try" || keyword == "finally" {
                if let Some((start, end)) = keyword_block(contents, offset) {
                    decompose_into(&contents[start + 1..end], out);
                    buffer.clear();
                    consumed_to = Some(end);
                }
            } else if keyword == "catch" {
                if let Some((_, end)) = keyword_block(contents, offset) {
                    buffer.clear();
                    consumed_to = Some(end);
                }
            } else if keyword == "//" {
                buffer.clear();
                line_comment = true;
            }
        }

        match consumed_to {
            Some(end) => while pos < chars.len() && chars[pos].0 <= end {
                pos += 1;
            },
            None => pos += 1,
        }
    }
    // trailing unterminated buffer content is discarded
}

/// Bounds of the block following a `try`/`finally`/`catch` keyword at
/// `offset`: the opening `{` and the `}` matching it.
fn keyword_block(contents: &str, offset: usize) -> Option<(usize, usize)> {
    let start = top_level_find(contents, '{', offset)?;
    let end = matching_brace(contents, start)?;
    Some((start, end))
}

/// From the opening parenthesis of a control keyword, locate the end of the
/// condition and the end of the body. A block body runs to the `}` matching
/// its opening `{`, a single-statement body to the next top-level `;`.
fn capture_control(contents: &str, open_paren: usize) -> Option<(usize, usize)> {
    let condition_end = top_level_find(contents, ')', open_paren)?;
    let rest = &contents[condition_end + 1..];
    let body_end = if rest.trim_start().starts_with('{') {
        let open = top_level_find(contents, '{', condition_end + 1)?;
        matching_brace(contents, open)?
    } else {
        top_level_find(contents, ';', condition_end + 1)?
    };
    Some((condition_end, body_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(nodes: &[FlowNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.raw_text()).collect()
    }

    #[test]
    fn test_statements_split_on_semicolons() {
        let root = FlowNode::new("{ a(); b(); }");
        let children = root.children();
        assert_eq!(texts(children), vec!["a()", "b()"]);
        assert!(children.iter().all(|c| c.is_statement()));
    }

    #[test]
    fn test_condition_extraction() {
        let root = FlowNode::new("{ if (x > 0) { y = 1; } }");
        let children = root.children();
        assert_eq!(children.len(), 1);

        let node = &children[0];
        assert_eq!(node.kind(), FlowKind::If);
        let condition = node.condition().unwrap();
        assert_eq!(condition.kind(), FlowKind::Condition);
        assert_eq!(condition.raw_text(), "x > 0");

        let body = node.children();
        assert_eq!(body.len(), 1);
        assert!(body[0].is_statement());
        assert_eq!(body[0].raw_text(), "y = 1");
    }

    #[test]
    fn test_single_statement_body() {
        let root = FlowNode::new("while (running) step();");
        let children = root.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), FlowKind::While);
        assert_eq!(texts(children[0].children()), vec!["step()"]);
    }

    #[test]
    fn test_nested_call_in_condition_does_not_end_scan_early() {
        let root = FlowNode::new("if (sensor.isFaulty()) { report(); }");
        let children = root.children();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].condition().unwrap().raw_text(),
            "sensor.isFaulty()"
        );
        assert_eq!(texts(children[0].children()), vec!["report()"]);
    }

    #[test]
    fn test_nested_block_body_keeps_inner_statements() {
        let root = FlowNode::new("{ while (x) { if (y) { a(); } b(); } c(); }");
        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind(), FlowKind::While);
        assert_eq!(children[1].raw_text(), "c()");

        let body = children[0].children();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].kind(), FlowKind::If);
        assert_eq!(texts(body[0].children()), vec!["a()"]);
        assert_eq!(body[1].raw_text(), "b()");
    }

    #[test]
    fn test_try_finally_bodies_are_spliced() {
        let root = FlowNode::new("try { a(); } finally { b(); }");
        let children = root.children();
        assert_eq!(texts(children), vec!["a()", "b()"]);
        assert!(children.iter().all(|c| c.is_statement()));
    }

    #[test]
    fn test_catch_body_is_discarded() {
        let root = FlowNode::new("try { a(); } catch(Exception e) { c(); }");
        let children = root.children();
        assert_eq!(texts(children), vec!["a()"]);
    }

    #[test]
    fn test_try_with_nested_block_splices_whole_interior() {
        let root = FlowNode::new("try { if (x) { a(); } b(); } finally { c(); }");
        let children = root.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].kind(), FlowKind::If);
        assert_eq!(texts(children[0].children()), vec!["a()"]);
        assert_eq!(children[1].raw_text(), "b()");
        assert_eq!(children[2].raw_text(), "c()");
    }

    #[test]
    fn test_line_comment_is_skipped() {
        let root = FlowNode::new("a(); // c(); ignored\nb();");
        assert_eq!(texts(root.children()), vec!["a()", "b()"]);
    }

    #[test]
    fn test_trailing_unterminated_content_is_discarded() {
        let root = FlowNode::new("a(); dangling text");
        assert_eq!(texts(root.children()), vec!["a()"]);
    }

    #[test]
    fn test_children_computed_once() {
        let root = FlowNode::new("{ a(); }");
        let first = root.children().as_ptr();
        let second = root.children().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_statement_leaves_have_no_children() {
        let root = FlowNode::new("{ a(); }");
        assert!(root.children()[0].children().is_empty());
    }
}
