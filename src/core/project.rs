use std::collections::HashMap;

use super::entity::{EntityArena, EntityId, EntityKind};

/// A loaded project: the entity arena, the class lookup table and the
/// stable method index the call graph is keyed by.
///
/// Method indices are assigned once per [`rebuild_method_index`] pass and
/// never reused; rebuilding the whole index is the unit of invalidation.
///
/// [`rebuild_method_index`]: Project::rebuild_method_index
#[derive(Debug, Default)]
pub struct Project {
    arena: EntityArena,
    classes: HashMap<String, EntityId>,
    class_order: Vec<EntityId>,
    methods: Vec<EntityId>,
    method_ids: HashMap<EntityId, usize>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &EntityArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut EntityArena {
        &mut self.arena
    }

    /// Look up a project class by name.
    pub fn class(&self, name: &str) -> Option<EntityId> {
        self.classes.get(name).copied()
    }

    /// Register every class entity found under `root` (the root itself and
    /// nested classes), keyed by qualified name. Registration order is
    /// preserved so the method index stays deterministic.
    pub fn add_source(&mut self, root: EntityId) {
        for id in self.arena.collapse(root) {
            if self.arena.get(id).kind == EntityKind::Class {
                let key = self.arena.qualified_name(id);
                if self.classes.insert(key, id).is_none() {
                    self.class_order.push(id);
                }
            }
        }
    }

    /// Rebuild the stable zero-based method index from the registered
    /// classes, in registration order then source order.
    pub fn rebuild_method_index(&mut self) {
        self.methods.clear();
        self.method_ids.clear();
        for &class in &self.class_order {
            for id in self.arena.collapse(class) {
                if self.arena.is_method(id) {
                    self.method_ids.insert(id, self.methods.len());
                    self.methods.push(id);
                }
            }
        }
    }

    /// Methods in stable index order.
    pub fn methods(&self) -> &[EntityId] {
        &self.methods
    }

    pub fn method_index(&self, id: EntityId) -> Option<usize> {
        self.method_ids.get(&id).copied()
    }

    /// First method whose dotted qualified name contains `query`.
    pub fn search_for_method(&self, query: &str) -> Option<EntityId> {
        self.methods
            .iter()
            .copied()
            .find(|&id| self.arena.qualified_name(id).contains(query))
    }
}
