use serde::{Deserialize, Serialize};

/// Stable handle for a [`CodeEntity`] inside an [`EntityArena`].
///
/// Assigned once at construction and never reused, so "same entity"
/// comparisons (deduplication, matrix lookups) are identity comparisons,
/// never structural name/type equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    Method,
    Constructor,
    Argument,
    Field,
}

/// Structural descriptor of a class, method, constructor, argument or field
/// produced by a language parser.
///
/// A method's children are exactly its formal arguments in declaration
/// order; a class's children are its members in source order. Structure is
/// immutable once built; only `comments` may be appended afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntity {
    pub kind: EntityKind,
    pub name: String,
    /// Declared/return type. `"constructor"` for constructors, the
    /// synthetic `"Variable"` placeholder for generic parameter types.
    pub declared_type: String,
    /// Raw member source. For methods this is the normalized body starting
    /// at its opening brace; empty for non-methods except classes, which
    /// carry their full declaration text.
    pub body_text: String,
    /// Byte position in the original source, `None` for synthetic nodes.
    pub source_offset: Option<usize>,
    pub comments: String,
    pub children: Vec<EntityId>,
    pub parent: Option<EntityId>,
}

/// Flat arena owning every entity of a project.
#[derive(Debug, Default)]
pub struct EntityArena {
    entities: Vec<CodeEntity>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(
        &mut self,
        kind: EntityKind,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        body_text: impl Into<String>,
        source_offset: Option<usize>,
    ) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(CodeEntity {
            kind,
            name: name.into(),
            declared_type: declared_type.into(),
            body_text: body_text.into(),
            source_offset,
            comments: String::new(),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    /// Attach `child` under `parent`, preserving insertion order.
    pub fn attach(&mut self, parent: EntityId, child: EntityId) {
        self.entities[child.0].parent = Some(parent);
        self.entities[parent.0].children.push(child);
    }

    pub fn get(&self, id: EntityId) -> &CodeEntity {
        &self.entities[id.0]
    }

    pub fn append_comments(&mut self, id: EntityId, text: &str) {
        let comments = &mut self.entities[id.0].comments;
        if !comments.is_empty() && !text.is_empty() {
            comments.push(' ');
        }
        comments.push_str(text);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Methods and constructors are the callable entities.
    pub fn is_method(&self, id: EntityId) -> bool {
        matches!(
            self.get(id).kind,
            EntityKind::Method | EntityKind::Constructor
        )
    }

    /// Dotted path from the outermost entity down to `id`,
    /// e.g. `Thermostat.check`.
    pub fn qualified_name(&self, id: EntityId) -> String {
        let mut parts = vec![self.get(id).name.clone()];
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            let entity = self.get(parent);
            if !entity.name.is_empty() {
                parts.push(entity.name.clone());
            }
            current = entity.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Depth-first flattening of the subtree rooted at `id`, `id` first.
    pub fn collapse(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = vec![id];
        let mut pos = 0;
        while pos < out.len() {
            out.extend(self.get(out[pos]).children.iter().copied());
            pos += 1;
        }
        out
    }
}
