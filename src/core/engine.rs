use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;

use super::graph::CallGraph;
use super::importer::SourceImporter;
use super::project::Project;
use super::rank::{PowerIteration, RankIntegrator};
use super::resolver::CallResolver;
use super::summary::SummaryGenerator;

/// Main orchestration engine: loads a project from disk and drives the
/// analysis pipeline for each CLI command.
pub struct Engine {
    config: Config,
    importer: SourceImporter,
}

impl Engine {
    /// Create a new engine instance
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);

        let importer = SourceImporter::new(&config.parsing)?;
        Ok(Self { config, importer })
    }

    /// Write a default configuration file into `path` (or the current
    /// directory).
    pub async fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let target = path
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Codetell.toml");
        if target.exists() {
            anyhow::bail!("{} already exists", target.display());
        }
        Config::default().save(&target)?;
        info!("Wrote {}", target.display());
        Ok(())
    }

    /// Print the natural-language description of one method.
    pub async fn describe(&mut self, method: &str, path: Option<PathBuf>) -> Result<()> {
        let project = self.load_project(path)?;
        let target = project
            .search_for_method(method)
            .ok_or_else(|| anyhow::anyhow!("no method matching '{method}'"))?;

        let description = SummaryGenerator::new(&project).describe(target);
        let qualified = project.arena().qualified_name(target);
        let comments = project.arena().get(target).comments.clone();
        if self.json_output() {
            let value = serde_json::json!({
                "method": qualified,
                "comments": comments,
                "description": description,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{qualified}:");
            if !comments.is_empty() {
                println!("// {comments}");
            }
            println!("{description}");
        }
        Ok(())
    }

    /// Print methods ordered by normalized importance.
    pub async fn rank(&mut self, path: Option<PathBuf>, top: usize) -> Result<()> {
        let project = self.load_project(path)?;
        let graph = CallGraph::build(&project);
        let solver = PowerIteration::from(&self.config.ranking);
        let ranks = RankIntegrator::new(solver).rank_methods(&project, &graph);

        let mut ordered: Vec<(String, f64)> = ranks.into_iter().collect();
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ordered.truncate(top);

        if self.json_output() {
            println!("{}", serde_json::to_string_pretty(&ordered)?);
        } else {
            for (name, score) in ordered {
                println!("{score:.6}  {name}");
            }
        }
        Ok(())
    }

    /// Print the resolved call list of one method.
    pub async fn calls(&mut self, method: &str, path: Option<PathBuf>) -> Result<()> {
        let project = self.load_project(path)?;
        let target = project
            .search_for_method(method)
            .ok_or_else(|| anyhow::anyhow!("no method matching '{method}'"))?;

        let resolver = CallResolver::new(&project);
        let arena = project.arena();
        let called: Vec<String> = resolver
            .called_methods(target)
            .iter()
            .map(|&id| arena.qualified_name(id))
            .collect();

        if self.json_output() {
            println!("{}", serde_json::to_string_pretty(&called)?);
        } else {
            for name in called {
                println!("{name}");
            }
        }
        Ok(())
    }

    /// Export the project call graph as JSON.
    pub async fn graph(&mut self, path: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
        let project = self.load_project(path)?;
        let graph = CallGraph::build(&project);
        let export = graph.export(&project);
        let serialized = serde_json::to_string_pretty(&export)?;
        match output {
            Some(file) => {
                std::fs::write(&file, serialized)?;
                info!("Wrote call graph to {}", file.display());
            }
            None => println!("{serialized}"),
        }
        Ok(())
    }

    fn load_project(&mut self, path: Option<PathBuf>) -> Result<Project> {
        let sources = match path {
            Some(path) => vec![path],
            None => self.config.project.source_dirs.clone(),
        };
        let mut project = Project::new();
        let mut imported = 0;
        for dir in &sources {
            imported += self.importer.import(dir, &mut project)?;
        }
        info!(
            "Imported {imported} files, {} methods across {} entities",
            project.methods().len(),
            project.arena().len()
        );
        Ok(project)
    }

    fn json_output(&self) -> bool {
        self.config.output.format == "json"
    }
}
