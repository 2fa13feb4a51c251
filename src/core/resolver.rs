//! Heuristic call resolution.
//!
//! For one method, produces the ordered, identity-deduplicated list of
//! project entities its body textually invokes: methods, constructors and
//! plain class references. There is no symbol table: resolution works from
//! the statement text alone, tracking inferred variable types in a single
//! mutable map threaded through the pass. Misses are silent; an unmatched
//! call falls back to the current context entity so the graph stays
//! connected.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::entity::{EntityId, EntityKind};
use super::project::Project;
use super::scan::{
    class_member_statements, split_statements, top_level_count, top_level_find,
    top_level_find_str,
};

/// Infix probe order. This is a fixed heuristic split order, not operator
/// precedence: `a + b * c` splits on `+` because it is probed first.
const INFIX_OPERATORS: [&str; 8] = ["&&", "||", "==", "!=", "+", "-", "*", "/"];

static DECLARATION_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s<>,]+").unwrap());

pub struct CallResolver<'a> {
    project: &'a Project,
}

impl<'a> CallResolver<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// Ordered, duplicate-free list of entities `method` invokes. Includes
    /// class references produced by receiver switching; see
    /// [`called_methods`](Self::called_methods) for the method-only view.
    pub fn resolve(&self, method: EntityId) -> Vec<EntityId> {
        let arena = self.project.arena();
        let class = arena.get(method).parent;

        // variable table scoped to this single method's pass
        let mut variables = HashMap::new();
        if let Some(class) = class {
            self.seed_field_types(class, &mut variables);
        }

        let body = arena.get(method).body_text.trim();
        let body = body.strip_prefix('{').unwrap_or(body);

        let mut resolved = Vec::new();
        for statement in split_statements(body) {
            for call in self.statement_calls(&statement, &mut variables, class, class) {
                if !resolved.contains(&call) {
                    resolved.push(call);
                }
            }
        }
        resolved
    }

    /// The resolved call list filtered to methods and constructors.
    pub fn called_methods(&self, method: EntityId) -> Vec<EntityId> {
        self.resolve(method)
            .into_iter()
            .filter(|&id| self.project.arena().is_method(id))
            .collect()
    }

    /// Seed the variable table from the enclosing class's top-level member
    /// declarations: `<Type> <name> [= …]` with no `(` in the declaration
    /// part, where `<Type>` is a known project class.
    fn seed_field_types(&self, class: EntityId, variables: &mut HashMap<String, EntityId>) {
        let body = &self.project.arena().get(class).body_text;
        let start = body.find('{').map(|i| i + 1).unwrap_or(0);
        for statement in class_member_statements(body, start) {
            let declaration = statement
                .split_once('=')
                .map(|(lhs, _)| lhs)
                .unwrap_or(&statement);
            if declaration.contains('(') {
                continue;
            }
            let words: Vec<&str> = DECLARATION_SPLIT
                .split(declaration.trim())
                .filter(|w| !w.is_empty())
                .collect();
            if words.len() >= 2 {
                if let Some(class) = self.project.class(words[words.len() - 2]) {
                    variables.insert(words[words.len() - 1].to_string(), class);
                }
            }
        }
    }

    /// Resolve one statement. An assignment resolves both sides and, when
    /// the right side resolved to something typed as a known class, binds
    /// the left side's trailing identifier to that class for the rest of
    /// the pass.
    fn statement_calls(
        &self,
        text: &str,
        variables: &mut HashMap<String, EntityId>,
        context: Option<EntityId>,
        default_context: Option<EntityId>,
    ) -> Vec<EntityId> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let mut calls = Vec::new();
        if let Some(eq) = assignment_split(text) {
            let lhs = text[..eq].trim();
            let rhs_calls =
                self.statement_calls(&text[eq + 1..], variables, context, default_context);
            calls.extend(self.statement_calls(lhs, variables, context, default_context));
            if let Some(&last) = rhs_calls.last() {
                let declared = &self.project.arena().get(last).declared_type;
                if let Some(class) = self.project.class(declared) {
                    let name = lhs.rsplit(' ').next().unwrap_or(lhs);
                    variables.insert(name.to_string(), class);
                }
            }
            calls.extend(rhs_calls);
        } else {
            calls.extend(self.recognize(text, context, variables, default_context));
        }
        calls
    }

    /// Recognize the entities referenced by a single (assignment-free)
    /// expression. Branches are tried in a fixed order; the first that
    /// structurally applies wins.
    fn recognize(
        &self,
        text: &str,
        mut context: Option<EntityId>,
        variables: &mut HashMap<String, EntityId>,
        default_context: Option<EntityId>,
    ) -> Vec<EntityId> {
        let arena = self.project.arena();
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let mut found = Vec::new();

        // bare identifier: static class reference
        if !text.contains('(') && !text.contains('.') {
            if let Some(class) = self.project.class(text) {
                found.push(class);
            }
            return found;
        }

        // constructor invocation
        if text.starts_with("new ") {
            if let Some(open) = text.find('(') {
                let close = top_level_find(text, ')', open);
                let inside_is_empty = close
                    .map(|c| text[open + 1..c].trim().is_empty())
                    .unwrap_or(true);
                let mut arg_count = top_level_count(text, ',', open + 1) + 1;
                if inside_is_empty {
                    arg_count = 0;
                }
                let class_name = text[4..open].trim();
                let constructor = self.project.class(class_name).and_then(|class| {
                    self.find_callable_child(class, class_name, arg_count)
                });
                match constructor {
                    Some(constructor) => found.push(constructor),
                    None => {
                        // no arity match: still resolve nested arguments
                        if let Some(close) = close {
                            let mut pos = open;
                            for _ in 0..arg_count {
                                let end = top_level_find(text, ',', pos + 1).unwrap_or(close);
                                found.extend(self.statement_calls(
                                    &text[pos + 1..end],
                                    variables,
                                    default_context,
                                    default_context,
                                ));
                                pos = end;
                            }
                        }
                    }
                }
            }
            return found;
        }

        // infix operators, fixed probe order
        for op in INFIX_OPERATORS {
            let pos = if op.len() == 1 {
                top_level_find(text, op.as_bytes()[0] as char, 0)
            } else {
                top_level_find_str(text, op, 0)
            };
            if let Some(pos) = pos {
                if pos < text.len() - 1 {
                    found.extend(self.statement_calls(
                        &text[..pos],
                        variables,
                        default_context,
                        default_context,
                    ));
                    found.extend(self.statement_calls(
                        &text[pos + op.len()..],
                        variables,
                        default_context,
                        default_context,
                    ));
                }
                return found;
            }
        }

        let open = top_level_find(text, '(', 0);
        let anchor = open.unwrap_or(text.len().saturating_sub(1));
        let close = top_level_find(text, ')', anchor);

        // parenthesized sub-expression not anchored at the end: a call
        // result used inline, split into head, arguments, tail
        if let Some(open) = open {
            if close != Some(text.len() - 1) && top_level_find(text, ' ', 0).is_some() {
                found.extend(self.recognize(&text[..open], default_context, variables, default_context));
                if let Some(close) = close {
                    found.extend(self.recognize(
                        &text[open + 1..close],
                        default_context,
                        variables,
                        default_context,
                    ));
                    found.extend(self.recognize(
                        &text[close + 1..],
                        default_context,
                        variables,
                        default_context,
                    ));
                }
                return found;
            }
        }

        // member access: switch context to the receiver's class
        if let Some(dot) = top_level_find(text, '.', 0) {
            let receiver = text[..dot].trim();
            if let Some(&bound) = variables.get(receiver) {
                context = Some(bound);
                found.push(bound);
            } else {
                let inner = self.recognize(receiver, context, variables, default_context);
                if let Some(&last) = inner.last() {
                    let entity = arena.get(last);
                    if entity.kind == EntityKind::Class {
                        context = Some(last);
                    } else if let Some(class) = self.project.class(&entity.declared_type) {
                        context = Some(class);
                    }
                }
                found.extend(inner);
            }
            found.extend(self.recognize(&text[dot + 1..], context, variables, default_context));
            return found;
        }

        // plain call against the current context
        let inside_is_empty = match close {
            Some(close) if anchor + 1 <= close => text[anchor + 1..close].trim().is_empty(),
            _ => true,
        };
        let mut arg_count = top_level_count(text, ',', anchor + 1) + 1;
        if close.is_none() || anchor >= text.len() - 1 || inside_is_empty {
            arg_count = 0;
        }
        let method_name = text[..anchor].trim();
        let target =
            context.and_then(|context| self.find_callable_child(context, method_name, arg_count));
        let mut pos = anchor;
        for _ in 0..arg_count {
            let end = match top_level_find(text, ',', pos + 1).or(close) {
                Some(end) => end,
                None => break,
            };
            found.extend(self.statement_calls(
                &text[pos + 1..end],
                variables,
                default_context,
                default_context,
            ));
            pos = end;
        }
        match target {
            Some(method) => found.push(method),
            // best-effort fallback: yield the context entity unchanged
            None => {
                if let Some(context) = context {
                    found.push(context);
                }
            }
        }
        found
    }

    /// Last method/constructor child of `parent` matching both name and
    /// exact argument count. Field and argument children never match.
    fn find_callable_child(
        &self,
        parent: EntityId,
        name: &str,
        arg_count: usize,
    ) -> Option<EntityId> {
        let arena = self.project.arena();
        arena
            .get(parent)
            .children
            .iter()
            .copied()
            .filter(|&child| {
                let entity = arena.get(child);
                arena.is_method(child)
                    && entity.name == name
                    && entity.children.len() == arg_count
            })
            .last()
    }
}

/// Byte index of the assignment `=`, if the statement's first top-level
/// `=` is a plain assignment rather than part of `==`, `!=`, `<=` or `>=`.
fn assignment_split(text: &str) -> Option<usize> {
    let i = top_level_find(text, '=', 0)?;
    let prev = text[..i].chars().next_back();
    let next = text[i + 1..].chars().next();
    if matches!(prev, Some('!') | Some('<') | Some('>')) || next == Some('=') {
        return None;
    }
    Some(i)
}
