//! Configuration management for Spectra CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spectra::prelude::{SolverOptions, SpectralConfig};
use std::path::{Path, PathBuf};

/// File name searched for in the current and parent directories.
pub const CONFIG_FILE: &str = "spectra.toml";

/// Spectra project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub spectral: SpectralSection,
    #[serde(default)]
    pub solver: SolverOptions,
    #[serde(default)]
    pub communities: CommunitiesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Only analyse the N most depended-on nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralSection {
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_eigenpairs")]
    pub eigenpairs: usize,
    #[serde(default = "default_trivial_tolerance")]
    pub trivial_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitiesConfig {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_modularity_gain: Option<f64>,
}

// Default value functions
fn default_sigma() -> f64 { SpectralConfig::default().sigma }
fn default_eigenpairs() -> usize { SpectralConfig::default().eigenpairs }
fn default_trivial_tolerance() -> f64 { SpectralConfig::default().trivial_tolerance }
fn default_count() -> usize { SpectralConfig::default().communities }

impl Default for SpectralSection {
    fn default() -> Self {
        Self {
            sigma: default_sigma(),
            eigenpairs: default_eigenpairs(),
            trivial_tolerance: default_trivial_tolerance(),
        }
    }
}

impl Default for CommunitiesConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            min_modularity_gain: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub top_n: Option<usize>,
    pub sigma: Option<f64>,
    pub eigenpairs: Option<usize>,
    pub communities: Option<usize>,
    pub min_modularity_gain: Option<f64>,
}

impl Config {
    /// Load `path` if given, else spectra.toml from the current or parent
    /// directories, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let found = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };
        match found {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Pipeline configuration with `overrides` applied.
    pub fn spectral_config(&self, overrides: &Overrides) -> SpectralConfig {
        SpectralConfig {
            top_n: overrides.top_n.or(self.ranking.top_n),
            sigma: overrides.sigma.unwrap_or(self.spectral.sigma),
            eigenpairs: overrides.eigenpairs.unwrap_or(self.spectral.eigenpairs),
            communities: overrides.communities.unwrap_or(self.communities.count),
            min_modularity_gain: overrides
                .min_modularity_gain
                .or(self.communities.min_modularity_gain),
            trivial_tolerance: self.spectral.trivial_tolerance,
            solver: self.solver.clone(),
        }
    }
}

/// Find spectra.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.spectral_config(&Overrides::default()),
            SpectralConfig::default()
        );
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::parse(
            "[spectral]\nsigma = 0.25\n\n[solver]\nmax_restarts = 5\n\n[communities]\ncount = 4\n",
        )
        .unwrap();
        assert_eq!(config.spectral.sigma, 0.25);
        assert_eq!(config.spectral.eigenpairs, 3);
        assert_eq!(config.solver.max_restarts, 5);
        assert_eq!(config.solver.tolerance, 1e-8);
        assert_eq!(config.communities.count, 4);
    }

    #[test]
    fn flags_override_file() {
        let config = Config::parse("[ranking]\ntop_n = 50\n\n[communities]\ncount = 4\n").unwrap();
        let overrides = Overrides {
            communities: Some(6),
            sigma: Some(1.0),
            ..Default::default()
        };
        let spectral = config.spectral_config(&overrides);
        assert_eq!(spectral.top_n, Some(50));
        assert_eq!(spectral.communities, 6);
        assert_eq!(spectral.sigma, 1.0);
    }

    #[test]
    fn default_config_round_trips() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("[spectral]"));
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[spectral]\neigenpairs = 5\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.spectral.eigenpairs, 5);
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
