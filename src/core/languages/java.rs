use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::core::comments;
use crate::core::entity::{EntityArena, EntityId, EntityKind};
use crate::error::{CodetellError, Result};

use super::SourceParser;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Java-specific parser using Tree-sitter.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser
            .set_language(&java_language)
            .map_err(|e| CodetellError::Parser(format!("Failed to set Java language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl SourceParser for JavaParser {
    fn parse(
        &mut self,
        content: &str,
        _file_path: &Path,
        arena: &mut EntityArena,
    ) -> Result<EntityId> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| CodetellError::Parser("Failed to parse Java code".to_string()))?;
        let root = tree.root_node();

        // exactly one top-level type declaration per source unit
        let mut types = Vec::new();
        let mut leading_comments = String::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    types.push(child);
                }
                "line_comment" | "block_comment" if types.is_empty() => {
                    push_comment(&mut leading_comments, node_text(child, content));
                }
                _ => {}
            }
        }
        if types.is_empty() {
            return Err(CodetellError::Structure(
                "no top-level class declaration in source unit".to_string(),
            ));
        }
        if types.len() > 1 {
            return Err(CodetellError::Structure(format!(
                "{} top-level class declarations in source unit, expected exactly one",
                types.len()
            )));
        }

        let class = self.build_class(types[0], content, arena)?;
        arena.append_comments(class, &leading_comments);
        Ok(class)
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_name(&self) -> &str {
        "java"
    }
}

impl JavaParser {
    /// Build the class entity and its members. A member that fails with an
    /// argument-shape error is skipped without aborting the class.
    fn build_class(&self, node: Node, source: &str, arena: &mut EntityArena) -> Result<EntityId> {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();
        let class = arena.alloc(
            EntityKind::Class,
            name,
            "",
            node_text(node, source),
            Some(node.start_byte()),
        );

        let body = find_child_by_kinds(node, &["class_body", "interface_body", "enum_body"]);
        let Some(body) = body else {
            return Ok(class);
        };

        let mut pending_comments = String::new();
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "line_comment" | "block_comment" => {
                    push_comment(&mut pending_comments, node_text(child, source));
                    continue;
                }
                "method_declaration" | "constructor_declaration" => {
                    match self.build_method(child, source, arena) {
                        Ok(method) => {
                            arena.attach(class, method);
                            arena.append_comments(method, &pending_comments);
                        }
                        Err(err @ CodetellError::ArgumentShape(_)) => {
                            tracing::warn!("skipping malformed member: {err}");
                        }
                        Err(err) => return Err(err),
                    }
                }
                "field_declaration" => {
                    for field in build_fields(child, source, arena) {
                        arena.attach(class, field);
                        arena.append_comments(field, &pending_comments);
                    }
                }
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    let nested = self.build_class(child, source, arena)?;
                    arena.attach(class, nested);
                    arena.append_comments(nested, &pending_comments);
                }
                _ => {}
            }
            pending_comments.clear();
        }
        Ok(class)
    }

    fn build_method(&self, node: Node, source: &str, arena: &mut EntityArena) -> Result<EntityId> {
        let raw = node_text(node, source);
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();

        let kind = if node.kind() == "constructor_declaration" {
            EntityKind::Constructor
        } else {
            EntityKind::Method
        };
        let declared_type = if kind == EntityKind::Constructor {
            "constructor".to_string()
        } else {
            let declared = node
                .child_by_field_name("type")
                .map(|n| base_type(&node_text(n, source)))
                .unwrap_or_else(|| "void".to_string());
            type_or_variable(declared, &raw)
        };

        let body_text = node
            .child_by_field_name("body")
            .map(|n| normalize_body(&node_text(n, source)))
            .unwrap_or_default();

        let method = arena.alloc(kind, name.clone(), declared_type, body_text, Some(node.start_byte()));

        if let Some(parameters) = node.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            for parameter in parameters.named_children(&mut cursor) {
                if !matches!(parameter.kind(), "formal_parameter" | "spread_parameter") {
                    continue;
                }
                let parameter_type = parameter
                    .child_by_field_name("type")
                    .map(|n| base_type(&node_text(n, source)));
                let parameter_name = parameter
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source));
                if parameter_type.is_none() && parameter_name.is_none() {
                    return Err(CodetellError::ArgumentShape(format!(
                        "malformed parameter declaration in {name}"
                    )));
                }
                let parameter_type = type_or_variable(parameter_type.unwrap_or_default(), &raw);
                let argument = arena.alloc(
                    EntityKind::Argument,
                    parameter_name.unwrap_or_default(),
                    parameter_type,
                    "",
                    None,
                );
                arena.attach(method, argument);
            }
        }
        Ok(method)
    }
}

fn build_fields(node: Node, source: &str, arena: &mut EntityArena) -> Vec<EntityId> {
    let field_type = node
        .child_by_field_name("type")
        .map(|n| base_type(&node_text(n, source)))
        .unwrap_or_default();
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        if let Some(name) = child.child_by_field_name("name") {
            fields.push(arena.alloc(
                EntityKind::Field,
                node_text(name, source),
                field_type.clone(),
                "",
                Some(child.start_byte()),
            ));
        }
    }
    fields
}

fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

fn find_child_by_kinds<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            return Some(child);
        }
    }
    None
}

fn push_comment(buffer: &mut String, raw: String) {
    let cleaned = comments::clean(&raw);
    if cleaned.is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(&cleaned);
}

/// Collapse a method body onto one line: comments removed first so the
/// newline collapse cannot glue code onto a line comment.
fn normalize_body(raw: &str) -> String {
    let text = BLOCK_COMMENT.replace_all(raw, "");
    let text = LINE_COMMENT.replace_all(&text, "");
    let text = text.replace('\n', " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Drop generic arguments from a declared type: `List<Sensor>` -> `List`.
fn base_type(declared: &str) -> String {
    declared
        .split('<')
        .next()
        .unwrap_or(declared)
        .trim()
        .to_string()
}

/// A name declared as a type parameter of its own member (`<T> T get()`)
/// is replaced by the synthetic `Variable` placeholder.
fn type_or_variable(declared: String, member_text: &str) -> String {
    if member_text.contains(&format!("<{declared}>")) {
        "Variable".to_string()
    } else {
        declared
    }
}
