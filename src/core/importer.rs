//! Project import: walk source directories, keep files whose extension is
//! configured, hand each to the parser for that extension, and register the
//! resulting entity trees.
//!
//! Per-file failures are isolated: a file that fails to parse is logged and
//! skipped, it never aborts the scan.

use std::path::Path;

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::config::ParsingConfig;
use crate::error::Result;

use super::languages::{JavaParser, SourceParser};
use super::project::Project;

pub struct SourceImporter {
    parsers: Vec<Box<dyn SourceParser>>,
    extensions: Vec<String>,
    max_file_size: u64,
    respect_gitignore: bool,
}

impl SourceImporter {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let parsers: Vec<Box<dyn SourceParser>> = vec![Box::new(JavaParser::new()?)];
        Ok(Self {
            parsers,
            extensions: config
                .file_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
            max_file_size: config.max_file_size,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Import every parseable file under `root` into `project` and rebuild
    /// the method index. Returns the number of files imported.
    pub fn import(&mut self, root: &Path, project: &mut Project) -> Result<usize> {
        let mut imported = 0;
        let walker = WalkBuilder::new(root)
            .git_ignore(self.respect_gitignore)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable path: {err}");
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if self.import_file(entry.path(), project) {
                imported += 1;
            }
        }

        project.rebuild_method_index();
        debug!("imported {imported} source files from {}", root.display());
        Ok(imported)
    }

    fn import_file(&mut self, path: &Path, project: &mut Project) -> bool {
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(extension) => extension.to_ascii_lowercase(),
            None => return false,
        };
        if !self.extensions.contains(&extension) {
            return false;
        }
        let parser = self
            .parsers
            .iter_mut()
            .find(|p| p.file_extensions().contains(&extension.as_str()));
        let Some(parser) = parser else {
            return false;
        };

        if let Ok(metadata) = std::fs::metadata(path) {
            if metadata.len() > self.max_file_size {
                warn!("skipping oversized file: {}", path.display());
                return false;
            }
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("skipping unreadable file {}: {err}", path.display());
                return false;
            }
        };
        match parser.parse(&content, path, project.arena_mut()) {
            Ok(root) => {
                project.add_source(root);
                true
            }
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn importer() -> SourceImporter {
        SourceImporter::new(&Config::default().parsing).unwrap()
    }

    #[test]
    fn test_import_registers_classes_and_methods() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Sensor.java"),
            "class Sensor { boolean isFaulty() { return true; } }",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Thermostat.java"),
            "class Thermostat { Sensor sensor; void check() { } }",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not source").unwrap();

        let mut project = Project::new();
        let imported = importer().import(dir.path(), &mut project).unwrap();
        assert_eq!(imported, 2);
        assert!(project.class("Sensor").is_some());
        assert!(project.class("Thermostat").is_some());
        assert_eq!(project.methods().len(), 2);
    }

    #[test]
    fn test_configured_extensions_filter_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Sensor.java"), "class Sensor { }").unwrap();

        let mut config = Config::default().parsing;
        config.file_extensions = vec!["kt".to_string()];
        let mut importer = SourceImporter::new(&config).unwrap();

        let mut project = Project::new();
        let imported = importer.import(dir.path(), &mut project).unwrap();
        assert_eq!(imported, 0);
        assert!(project.class("Sensor").is_none());
    }

    #[test]
    fn test_broken_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.java"), "class A { } class B { }").unwrap();
        std::fs::write(dir.path().join("Fine.java"), "class Fine { void go() { } }").unwrap();

        let mut project = Project::new();
        let imported = importer().import(dir.path(), &mut project).unwrap();
        assert_eq!(imported, 1);
        assert!(project.class("Fine").is_some());
        assert!(project.class("A").is_none());
    }
}
