//! End-to-end spectral pipeline.
//!
//! One run goes graph → ranking → node selection → connectivity →
//! Laplacian → eigenpairs → layout and communities. Every matrix is derived
//! fresh from a node index taken at the start of the run; nothing is cached
//! between runs.

use crate::community::{BisectionConfig, Community, CommunityAssigner};
use crate::embedding::{EmbeddingProjector, DEFAULT_TRIVIAL_TOLERANCE};
use crate::ranking::DegreeRanker;
use serde::{Deserialize, Serialize};
use spectra_core::eigen::{EigenSolver, SolverOptions};
use spectra_core::error::{GraphError, Result, SpectraError};
use spectra_core::laplacian::LaplacianBuilder;
use spectra_core::symmetrize::ConnectivityMatrix;
use spectra_core::topology::DependencyGraph;
use spectra_core::types::{NodeIndexMap, RankedNode};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

fn default_sigma() -> f64 { 0.5 }
fn default_eigenpairs() -> usize { 3 }
fn default_communities() -> usize { 2 }
fn default_trivial_tolerance() -> f64 { DEFAULT_TRIVIAL_TOLERANCE }

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Restrict the analysis to the N most depended-on nodes.
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Affinity shift `σ`.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Eigenpairs requested for the layout (`k`).
    #[serde(default = "default_eigenpairs")]
    pub eigenpairs: usize,
    /// Upper bound on the number of communities.
    #[serde(default = "default_communities")]
    pub communities: usize,
    #[serde(default)]
    pub min_modularity_gain: Option<f64>,
    /// Distance from `σ` under which an eigenvalue is treated as trivial.
    #[serde(default = "default_trivial_tolerance")]
    pub trivial_tolerance: f64,
    #[serde(default)]
    pub solver: SolverOptions,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            top_n: None,
            sigma: default_sigma(),
            eigenpairs: default_eigenpairs(),
            communities: default_communities(),
            min_modularity_gain: None,
            trivial_tolerance: default_trivial_tolerance(),
            solver: SolverOptions::default(),
        }
    }
}

impl SpectralConfig {
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_eigenpairs(mut self, k: usize) -> Self {
        self.eigenpairs = k;
        self
    }

    pub fn with_communities(mut self, count: usize) -> Self {
        self.communities = count;
        self
    }

    pub fn with_min_modularity_gain(mut self, threshold: f64) -> Self {
        self.min_modularity_gain = Some(threshold);
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(SpectraError::invalid_config(
                "sigma",
                self.sigma.to_string(),
                "must be positive and finite",
            ));
        }
        if self.eigenpairs < 2 {
            return Err(SpectraError::out_of_range(
                "eigenpairs",
                2.0,
                f64::MAX,
                self.eigenpairs as f64,
            ));
        }
        if self.communities == 0 {
            return Err(SpectraError::out_of_range("communities", 1.0, f64::MAX, 0.0));
        }
        if self.top_n == Some(0) {
            return Err(SpectraError::out_of_range("top_n", 1.0, f64::MAX, 0.0));
        }
        if !(self.trivial_tolerance >= 0.0 && self.trivial_tolerance.is_finite()) {
            return Err(SpectraError::invalid_config(
                "trivial_tolerance",
                self.trivial_tolerance.to_string(),
                "must be non-negative and finite",
            ));
        }
        if let Some(threshold) = self.min_modularity_gain {
            if !threshold.is_finite() {
                return Err(SpectraError::invalid_config(
                    "min_modularity_gain",
                    threshold.to_string(),
                    "must be finite",
                ));
            }
        }
        self.solver.validate()
    }
}

/// Layout coordinates of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Size of the graph a report was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    /// Nodes that entered the spectral stages.
    pub selected: usize,
}

/// Solver and bisection bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub iterations: usize,
    pub residual: f64,
    pub linear_iterations: usize,
    pub trivial_pairs: usize,
    pub bisections: usize,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralReport {
    pub graph: GraphSummary,
    /// Full ranking, descending in-degree.
    pub ranking: Vec<RankedNode>,
    /// One entry per selected node, in insertion order.
    pub positions: Vec<NodePosition>,
    pub communities: Vec<Community>,
    pub assignments: BTreeMap<String, usize>,
    pub modularity: f64,
    /// Affinity eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    pub diagnostics: Diagnostics,
}

/// Runs the whole chain with one configuration.
#[derive(Debug, Clone, Default)]
pub struct SpectralPipeline {
    config: SpectralConfig,
}

impl SpectralPipeline {
    pub fn new(config: SpectralConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Node index over the selected nodes, in insertion order.
    pub fn select<G: DependencyGraph>(&self, graph: &G, ranking: &[RankedNode]) -> NodeIndexMap {
        let names = match self.config.top_n {
            Some(n) => {
                let top: HashSet<&str> = ranking.iter().take(n).map(|r| r.name.as_str()).collect();
                graph
                    .node_names()
                    .into_iter()
                    .filter(|name| top.contains(name.as_str()))
                    .collect()
            }
            None => graph.node_names(),
        };
        NodeIndexMap::new(names, graph.revision())
    }

    pub fn run<G: DependencyGraph>(&self, graph: &G) -> Result<SpectralReport> {
        self.config.validate()?;
        if graph.node_count() == 0 {
            return Err(GraphError::EmptyGraph.into());
        }

        let ranking = DegreeRanker::new(graph).rank_by_in_degree();
        let index = self.select(graph, &ranking);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            selected = index.len(),
            "Ranked graph"
        );

        let connectivity = ConnectivityMatrix::from_graph(graph, &index)?;
        let laplacian = LaplacianBuilder::new(connectivity.clone());
        info!(isolated = laplacian.isolated().len(), "Built Laplacian");

        let embedding = EmbeddingProjector::new(self.config.sigma)
            .with_trivial_tolerance(self.config.trivial_tolerance)
            .embed(
                &laplacian,
                &EigenSolver::new(self.config.solver.clone()),
                self.config.eigenpairs,
            )?;
        info!(
            eigenpairs = embedding.eigenvalues.len(),
            iterations = embedding.iterations,
            residual = embedding.residual,
            "Computed spectral embedding"
        );

        let assignment = CommunityAssigner::new(BisectionConfig {
            communities: self.config.communities,
            sigma: self.config.sigma,
            min_modularity_gain: self.config.min_modularity_gain,
        })
        .with_solver(self.config.solver.clone())
        .assign(&connectivity)?;
        info!(
            communities = assignment.num_communities(),
            modularity = assignment.modularity,
            "Assigned communities"
        );

        let positions = embedding
            .named_positions(&index)?
            .into_iter()
            .map(|(name, p)| NodePosition {
                name: name.to_string(),
                x: p.x,
                y: p.y,
            })
            .collect();

        Ok(SpectralReport {
            graph: GraphSummary {
                nodes: graph.node_count(),
                edges: graph.edge_count(),
                components: graph.connected_components(),
                selected: index.len(),
            },
            ranking,
            positions,
            communities: assignment.communities(&index)?,
            assignments: assignment.assignments(&index)?.into_iter().collect(),
            modularity: assignment.modularity,
            eigenvalues: embedding.eigenvalues,
            diagnostics: Diagnostics {
                iterations: embedding.iterations,
                residual: embedding.residual,
                linear_iterations: embedding.linear_iterations,
                trivial_pairs: embedding.trivial,
                bisections: assignment.bisections,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology_impl::PetDependencyGraph;
    use spectra_core::error::{ConfigError, SolverError};

    #[test]
    fn default_config_is_valid() {
        assert!(SpectralConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_configs() {
        let bad = [
            SpectralConfig::default().with_sigma(0.0),
            SpectralConfig::default().with_eigenpairs(1),
            SpectralConfig::default().with_communities(0),
            SpectralConfig::default().with_top_n(0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SpectraError::Config(_))),
                "{:?}",
                config
            );
        }
        let err = SpectralConfig::default().with_eigenpairs(1).validate().unwrap_err();
        assert!(matches!(
            err,
            SpectraError::Config(ConfigError::OutOfRange { ref field, .. }) if field == "eigenpairs"
        ));
    }

    #[test]
    fn empty_graph_is_rejected() {
        let err = SpectralPipeline::default()
            .run(&PetDependencyGraph::new())
            .unwrap_err();
        assert!(matches!(err, SpectraError::Graph(GraphError::EmptyGraph)));
    }

    #[test]
    fn top_n_selects_in_insertion_order() {
        let g = PetDependencyGraph::from_edges([("a", "c"), ("b", "c"), ("a", "d"), ("e", "a")]);
        let pipeline = SpectralPipeline::new(SpectralConfig::default().with_top_n(3));
        let ranking = DegreeRanker::new(&g).rank_by_in_degree();
        let index = pipeline.select(&g, &ranking);
        assert_eq!(index.names(), &["a", "c", "d"]);
    }

    #[test]
    fn tiny_graph_lacks_spectrum() {
        let g = PetDependencyGraph::from_edges([("a", "b")]);
        let err = SpectralPipeline::default().run(&g).unwrap_err();
        assert!(matches!(
            err,
            SpectraError::Solver(SolverError::InsufficientSpectrum { .. })
        ));
    }

    #[test]
    fn report_covers_every_selected_node() {
        let g = PetDependencyGraph::from_edges([
            ("a", "b"), ("b", "c"), ("c", "a"),
            ("d", "e"), ("e", "f"), ("f", "d"),
            ("c", "d"),
        ]);
        let report = SpectralPipeline::default().run(&g).unwrap();
        assert_eq!(report.graph.selected, 6);
        assert_eq!(report.positions.len(), 6);
        assert_eq!(report.assignments.len(), 6);
        assert_eq!(report.communities.len(), 2);
        assert_eq!(report.assignments["a"], report.assignments["b"]);
        assert_ne!(report.assignments["a"], report.assignments["f"]);
        assert!(report.diagnostics.residual < 1e-6);
    }

    #[test]
    fn disjoint_triangles_get_layout_and_labels() {
        let g = PetDependencyGraph::from_edges([
            ("a", "b"), ("b", "c"), ("c", "a"),
            ("x", "y"), ("y", "z"), ("z", "x"),
        ]);
        let report = SpectralPipeline::new(SpectralConfig::default().with_communities(2))
            .run(&g)
            .unwrap();
        assert_eq!(report.diagnostics.trivial_pairs, 2);
        assert_eq!(report.eigenvalues.len(), 4);
        assert_eq!(report.positions.len(), 6);
        assert_eq!(report.communities.len(), 2);
        let labels = &report.assignments;
        assert_eq!(labels["a"], labels["c"]);
        assert_eq!(labels["x"], labels["z"]);
        assert_ne!(labels["a"], labels["x"]);
        assert!((report.modularity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn long_path_converges_with_defaults() {
        let names: Vec<String> = (0..400).map(|i| format!("n{}", i)).collect();
        let g = PetDependencyGraph::from_edges(names.windows(2).map(|w| (w[0].as_str(), w[1].as_str())));
        let report = SpectralPipeline::default().run(&g).unwrap();
        assert_eq!(report.positions.len(), 400);
        assert_eq!(report.diagnostics.trivial_pairs, 1);
        assert_eq!(report.communities.len(), 2);
        assert!(report.diagnostics.residual < 1e-6);
        // the first axis of a path is monotone: the two ends sit on opposite sides
        let first = report.positions[0].x;
        let last = report.positions[399].x;
        assert!(first * last < 0.0, "{} {}", first, last);
    }
}
