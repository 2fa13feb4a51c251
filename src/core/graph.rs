//! Method-level call graph.
//!
//! A dense N×N adjacency matrix over the project's stable method index:
//! `matrix[i][j] == 1.0` when method `i` invokes method `j`. The diagonal is
//! fixed at 1 so every method has at least one outgoing edge and the rank
//! solver never sees a dangling row.

use serde::Serialize;

use super::entity::EntityId;
use super::project::Project;
use super::resolver::CallResolver;

pub struct CallGraph {
    methods: Vec<EntityId>,
    matrix: Vec<Vec<f64>>,
}

impl CallGraph {
    /// Resolve every method in the project and assemble the adjacency
    /// matrix. Callees that resolve to non-project entities were already
    /// filtered out by the resolver; callees without a method index (stale
    /// handles) are skipped.
    pub fn build(project: &Project) -> Self {
        let methods = project.methods().to_vec();
        let n = methods.len();
        let mut matrix = vec![vec![0.0; n]; n];
        let resolver = CallResolver::new(project);
        for (row, &method) in methods.iter().enumerate() {
            matrix[row][row] = 1.0;
            for callee in resolver.called_methods(method) {
                if let Some(col) = project.method_index(callee) {
                    matrix[row][col] = 1.0;
                }
            }
        }
        Self { methods, matrix }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn methods(&self) -> &[EntityId] {
        &self.methods
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// Methods invoked by the method at `row`, excluding the implicit
    /// diagonal self-edge.
    pub fn callees(&self, row: usize) -> Vec<EntityId> {
        self.matrix[row]
            .iter()
            .enumerate()
            .filter(|&(col, &cell)| cell != 0.0 && col != row)
            .map(|(col, _)| self.methods[col])
            .collect()
    }

    /// Serializable view with qualified method names and an explicit edge
    /// list, diagonal edges omitted.
    pub fn export(&self, project: &Project) -> CallGraphExport {
        let arena = project.arena();
        let methods = self
            .methods
            .iter()
            .map(|&id| arena.qualified_name(id))
            .collect();
        let mut edges = Vec::new();
        for (row, cells) in self.matrix.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                if cell != 0.0 && col != row {
                    edges.push(CallEdge { from: row, to: col });
                }
            }
        }
        CallGraphExport { methods, edges }
    }
}

#[derive(Debug, Serialize)]
pub struct CallGraphExport {
    pub methods: Vec<String>,
    pub edges: Vec<CallEdge>,
}

#[derive(Debug, Serialize)]
pub struct CallEdge {
    pub from: usize,
    pub to: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityKind;

    fn thermostat_project() -> Project {
        let mut project = Project::new();
        let sensor = project.arena_mut().alloc(
            EntityKind::Class,
            "Sensor",
            "",
            "class Sensor { boolean isFaulty() { return true; } }",
            Some(0),
        );
        let is_faulty =
            project
                .arena_mut()
                .alloc(EntityKind::Method, "isFaulty", "boolean", "{ return true; }", None);
        project.arena_mut().attach(sensor, is_faulty);
        let thermostat = project.arena_mut().alloc(
            EntityKind::Class,
            "Thermostat",
            "",
            "class Thermostat { Sensor sensor; void check() { if (sensor.isFaulty()) { report(); } } void report() { } }",
            Some(0),
        );
        let check = project.arena_mut().alloc(
            EntityKind::Method,
            "check",
            "void",
            "{ if (sensor.isFaulty()) { report(); } }",
            None,
        );
        let report = project
            .arena_mut()
            .alloc(EntityKind::Method, "report", "void", "{ }", None);
        project.arena_mut().attach(thermostat, check);
        project.arena_mut().attach(thermostat, report);
        project.add_source(sensor);
        project.add_source(thermostat);
        project.rebuild_method_index();
        project
    }

    #[test]
    fn test_diagonal_is_one() {
        let project = thermostat_project();
        let graph = CallGraph::build(&project);
        assert_eq!(graph.len(), 3);
        for i in 0..graph.len() {
            assert_eq!(graph.matrix()[i][i], 1.0);
        }
    }

    #[test]
    fn test_edges_follow_resolution() {
        let project = thermostat_project();
        let graph = CallGraph::build(&project);
        let arena = project.arena();

        let check_row = graph
            .methods()
            .iter()
            .position(|&id| arena.get(id).name == "check")
            .unwrap();
        let callee_names: Vec<&str> = graph
            .callees(check_row)
            .iter()
            .map(|&id| arena.get(id).name.as_str())
            .collect();
        assert_eq!(callee_names, vec!["isFaulty", "report"]);

        let report_row = graph
            .methods()
            .iter()
            .position(|&id| arena.get(id).name == "report")
            .unwrap();
        assert!(graph.callees(report_row).is_empty());
    }

    #[test]
    fn test_export_names_and_edges() {
        let project = thermostat_project();
        let graph = CallGraph::build(&project);
        let export = graph.export(&project);
        assert_eq!(
            export.methods,
            vec!["Sensor.isFaulty", "Thermostat.check", "Thermostat.report"]
        );
        assert_eq!(export.edges.len(), 2);
        assert!(export.edges.iter().all(|e| e.from != e.to));
    }

    #[test]
    fn test_empty_project_builds_empty_graph() {
        let project = Project::new();
        let graph = CallGraph::build(&project);
        assert!(graph.is_empty());
        assert!(graph.matrix().is_empty());
    }
}
