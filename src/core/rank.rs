//! Method importance ranking over the call graph.
//!
//! A pluggable [`RankSolver`] scores the adjacency matrix; the shipped
//! implementation is plain PageRank power iteration. [`RankIntegrator`]
//! normalizes the scores to sum 1 and keys them by method name. A solver
//! failure is not fatal to the pipeline: it logs a warning and yields an
//! empty rank map.

use std::collections::HashMap;

use tracing::warn;

use crate::config::RankingConfig;
use crate::error::{CodetellError, Result};

use super::graph::CallGraph;
use super::project::Project;

/// Scores a square adjacency matrix. One score per row, ordering preserved.
pub trait RankSolver {
    fn solve(&self, adjacency: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// PageRank by power iteration.
#[derive(Debug, Clone, Copy)]
pub struct PowerIteration {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl From<&RankingConfig> for PowerIteration {
    fn from(config: &RankingConfig) -> Self {
        Self {
            damping: config.damping_factor,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }
}

impl RankSolver for PowerIteration {
    fn solve(&self, adjacency: &[Vec<f64>]) -> Result<Vec<f64>> {
        let n = adjacency.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        if adjacency.iter().any(|row| row.len() != n) {
            return Err(CodetellError::Solver(
                "adjacency matrix is not square".to_string(),
            ));
        }

        let out_weight: Vec<f64> = adjacency.iter().map(|row| row.iter().sum()).collect();
        let base = (1.0 - self.damping) / n as f64;
        let mut rank = vec![1.0 / n as f64; n];

        for _ in 0..self.max_iterations {
            let mut next = vec![base; n];
            for (i, row) in adjacency.iter().enumerate() {
                if out_weight[i] == 0.0 {
                    continue;
                }
                let share = self.damping * rank[i] / out_weight[i];
                for (j, &cell) in row.iter().enumerate() {
                    if cell != 0.0 {
                        next[j] += share * cell;
                    }
                }
            }
            let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
            rank = next;
            if delta < self.tolerance {
                return Ok(rank);
            }
        }
        Err(CodetellError::Solver(format!(
            "power iteration did not converge within {} iterations",
            self.max_iterations
        )))
    }
}

/// Runs a solver over a call graph and turns the raw scores into a
/// normalized per-method rank map.
pub struct RankIntegrator<S: RankSolver> {
    solver: S,
}

impl<S: RankSolver> RankIntegrator<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Rank map keyed by method name, scores normalized to sum 1.
    /// A solver failure degrades to an empty map.
    pub fn rank_methods(&self, project: &Project, graph: &CallGraph) -> HashMap<String, f64> {
        let scores = match self.solver.solve(graph.matrix()) {
            Ok(scores) => scores,
            Err(err) => {
                warn!("rank solver failed, continuing without ranks: {err}");
                return HashMap::new();
            }
        };
        let total: f64 = scores.iter().sum();
        let arena = project.arena();
        graph
            .methods()
            .iter()
            .zip(scores)
            .map(|(&id, score)| {
                let normalized = if total > 0.0 { score / total } else { 0.0 };
                (arena.get(id).name.clone(), normalized)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityKind;

    fn solver() -> PowerIteration {
        PowerIteration {
            damping: 0.85,
            max_iterations: 1000,
            tolerance: 1e-9,
        }
    }

    #[test]
    fn test_uniform_graph_ranks_equally() {
        let adjacency = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let ranks = solver().solve(&adjacency).unwrap();
        for rank in &ranks {
            assert!((rank - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_frequently_called_method_ranks_highest() {
        // rows 0..3 all call row 3
        let adjacency = vec![
            vec![1.0, 0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ];
        let ranks = solver().solve(&adjacency).unwrap();
        let top = ranks
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(top, 3);
    }

    #[test]
    fn test_empty_matrix_yields_no_scores() {
        assert!(solver().solve(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_non_square_matrix_is_a_solver_error() {
        let adjacency = vec![vec![1.0, 0.0]];
        assert!(matches!(
            solver().solve(&adjacency),
            Err(CodetellError::Solver(_))
        ));
    }

    fn two_method_project() -> (Project, CallGraph) {
        let mut project = Project::new();
        let class = project.arena_mut().alloc(
            EntityKind::Class,
            "A",
            "",
            "class A { void caller() { callee(); } void callee() { } }",
            Some(0),
        );
        let caller =
            project
                .arena_mut()
                .alloc(EntityKind::Method, "caller", "void", "{ callee(); }", None);
        let callee = project
            .arena_mut()
            .alloc(EntityKind::Method, "callee", "void", "{ }", None);
        project.arena_mut().attach(class, caller);
        project.arena_mut().attach(class, callee);
        project.add_source(class);
        project.rebuild_method_index();
        let graph = CallGraph::build(&project);
        (project, graph)
    }

    #[test]
    fn test_integrator_normalizes_to_sum_one() {
        let (project, graph) = two_method_project();
        let ranks = RankIntegrator::new(solver()).rank_methods(&project, &graph);
        assert_eq!(ranks.len(), 2);
        let total: f64 = ranks.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(ranks["callee"] > ranks["caller"]);
    }

    #[test]
    fn test_solver_failure_degrades_to_empty_map() {
        let (project, graph) = two_method_project();
        let stubborn = PowerIteration {
            damping: 0.85,
            max_iterations: 0,
            tolerance: 1e-9,
        };
        let ranks = RankIntegrator::new(stubborn).rank_methods(&project, &graph);
        assert!(ranks.is_empty());
    }
}
