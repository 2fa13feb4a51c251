use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CodetellError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source code parsing configuration
    pub parsing: ParsingConfig,

    /// Method ranking settings
    pub ranking: RankingConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Source directories to analyze
    pub source_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// File extensions to parse
    pub file_extensions: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: u64,

    /// Honor .gitignore files while walking source directories
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// PageRank damping factor
    pub damping_factor: f64,

    /// Iteration cap before the solver gives up
    pub max_iterations: usize,

    /// L1 convergence threshold
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format ("text" or "json")
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "Unnamed Project".to_string(),
                source_dirs: vec![PathBuf::from("src")],
            },
            parsing: ParsingConfig {
                file_extensions: vec!["java".to_string()],
                max_file_size: 1024 * 1024, // 1MB
                respect_gitignore: true,
            },
            ranking: RankingConfig {
                // the iteration error shrinks by roughly the damping factor
                // per step, so 1e-8 needs a bit over a hundred iterations
                damping_factor: 0.85,
                max_iterations: 500,
                tolerance: 1e-8,
            },
            output: OutputConfig {
                format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| CodetellError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CodetellError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["Codetell.toml", "codetell.toml", ".codetell.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.parsing.file_extensions, vec!["java"]);
        assert_eq!(parsed.ranking.damping_factor, 0.85);
    }

    #[test]
    fn test_missing_path_falls_back_to_default() {
        let config = Config::load_or_default(Some("does-not-exist.toml")).unwrap();
        assert_eq!(config.output.format, "text");
    }
}
