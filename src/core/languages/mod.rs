//! Language-specific source parsers.
//!
//! Each language gets its own module that turns raw source text into an
//! entity tree; the analysis core only ever sees the flattened entities,
//! never a language's syntax tree.

mod java;

pub use java::JavaParser;

use std::path::Path;

use crate::error::Result;

use super::entity::{EntityArena, EntityId};

/// Trait that all language parsers must implement
pub trait SourceParser {
    /// Parse one source file into an entity tree allocated in `arena`,
    /// returning the file's single top-level class.
    fn parse(
        &mut self,
        content: &str,
        file_path: &Path,
        arena: &mut EntityArena,
    ) -> Result<EntityId>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
