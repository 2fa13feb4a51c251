mod comments;
mod engine;
mod entity;
mod flow;
mod graph;
mod importer;
mod project;
mod rank;
mod resolver;
mod scan;
mod summary;

// Language-specific parsers
mod languages;

pub use entity::{CodeEntity, EntityArena, EntityId, EntityKind};
pub use flow::{FlowKind, FlowNode};
pub use graph::{CallEdge, CallGraph, CallGraphExport};
pub use importer::SourceImporter;
pub use languages::{JavaParser, SourceParser};
pub use project::Project;
pub use rank::{PowerIteration, RankIntegrator, RankSolver};
pub use resolver::CallResolver;
pub use summary::SummaryGenerator;

// Export the main engine
pub use engine::Engine;
