//! Community detection via recursive spectral bisection.
//!
//! Groups of node positions sit on a worklist, starting with the whole node
//! set. The largest pending group is popped first (ties go to the group with
//! the lowest position) and is either terminal or split in two:
//!
//! - a disconnected group gives up the component holding its lowest
//!   position (a cut of weight zero);
//! - a connected group is split by the sign of its Fiedler vector,
//!   `D^-1/2` times the second eigenvector of its own affinity matrix.
//!
//! A group is terminal when it has one member, when the number of live
//! groups already equals the requested count, when the split is one-sided,
//! or when the modularity gain of the split does not exceed the configured
//! threshold. Terminal groups are labelled `0..` by their lowest position.

use serde::{Deserialize, Serialize};
use spectra_core::eigen::{canonicalize_sign, EigenSolver, SolverOptions, StartVector};
use spectra_core::error::{Result, SpectraError};
use spectra_core::laplacian::{affinity_target, LaplacianBuilder};
use spectra_core::modularity::{modularity_gain, partition_modularity};
use spectra_core::symmetrize::ConnectivityMatrix;
use spectra_core::types::NodeIndexMap;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::debug;

/// A detected community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub members: Vec<String>,
    pub size: usize,
}

/// Bisection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BisectionConfig {
    /// Upper bound on the number of communities.
    pub communities: usize,
    /// Affinity shift used for every sub-solve.
    pub sigma: f64,
    /// Reject splits whose modularity gain is at or below this value.
    pub min_modularity_gain: Option<f64>,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            communities: 2,
            sigma: 0.5,
            min_modularity_gain: None,
        }
    }
}

/// Outcome of a full bisection run.
#[derive(Debug, Clone, Serialize)]
pub struct CommunityAssignment {
    /// Label per node position.
    pub labels: Vec<usize>,
    /// Members of each label, ascending; `groups[label]`.
    pub groups: Vec<Vec<usize>>,
    /// Splits that were accepted.
    pub bisections: usize,
    /// Modularity of the final partition.
    pub modularity: f64,
    /// Identity of the node index the positions refer to.
    pub index_id: u64,
}

impl CommunityAssignment {
    pub fn num_communities(&self) -> usize {
        self.groups.len()
    }

    /// Named communities. `index` must be the one the connectivity was built over.
    pub fn communities(&self, index: &NodeIndexMap) -> Result<Vec<Community>> {
        index.ensure_same(self.index_id)?;
        Ok(self
            .groups
            .iter()
            .enumerate()
            .map(|(id, members)| {
                let members: Vec<String> = members
                    .iter()
                    .filter_map(|&i| index.name(i).map(str::to_string))
                    .collect();
                Community {
                    id,
                    size: members.len(),
                    members,
                }
            })
            .collect())
    }

    /// Node name to label.
    pub fn assignments(&self, index: &NodeIndexMap) -> Result<HashMap<String, usize>> {
        index.ensure_same(self.index_id)?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter_map(|(i, &label)| Some((index.name(i)?.to_string(), label)))
            .collect())
    }
}

/// Split `members` by the sign of `vector` (`>= 0` first) after applying the
/// largest-entry-positive convention, so `vector` and `-vector` agree.
pub fn partition_by_sign(members: &[usize], vector: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let mut v = vector.to_vec();
    canonicalize_sign(&mut v);
    let mut non_negative = Vec::new();
    let mut negative = Vec::new();
    for (&member, &x) in members.iter().zip(&v) {
        if x >= 0.0 {
            non_negative.push(member);
        } else {
            negative.push(member);
        }
    }
    (non_negative, negative)
}

/// Worklist entry ordered by size, then by lowest position.
type Pending = (usize, Reverse<usize>, Vec<usize>);

fn pending(group: Vec<usize>) -> Pending {
    (group.len(), Reverse(group.first().copied().unwrap_or(usize::MAX)), group)
}

/// Assigns community labels by worklist bisection.
#[derive(Debug, Clone, Default)]
pub struct CommunityAssigner {
    config: BisectionConfig,
    solver: EigenSolver,
}

impl CommunityAssigner {
    pub fn new(config: BisectionConfig) -> Self {
        Self {
            solver: Self::sub_solver(SolverOptions::default(), config.sigma),
            config,
        }
    }

    /// Solver used for the Fiedler vectors.
    pub fn with_solver(mut self, options: SolverOptions) -> Self {
        self.solver = Self::sub_solver(options, self.config.sigma);
        self
    }

    /// A custom start vector only fits one dimension, so sub-solves always
    /// start from all-ones. The shift defaults to just below `σ`.
    fn sub_solver(options: SolverOptions, sigma: f64) -> EigenSolver {
        EigenSolver::new(
            options
                .with_start(StartVector::Ones)
                .or_target(affinity_target(sigma)),
        )
    }

    pub fn config(&self) -> &BisectionConfig {
        &self.config
    }

    pub fn assign(&self, connectivity: &ConnectivityMatrix) -> Result<CommunityAssignment> {
        if self.config.communities == 0 {
            return Err(SpectraError::out_of_range(
                "communities",
                1.0,
                f64::MAX,
                0.0,
            ));
        }
        let n = connectivity.dim();
        let mut queue: BinaryHeap<Pending> = BinaryHeap::new();
        if n > 0 {
            queue.push(pending((0..n).collect()));
        }
        let mut terminal: Vec<Vec<usize>> = Vec::new();
        let mut bisections = 0;

        while let Some((_, _, group)) = queue.pop() {
            let live = terminal.len() + queue.len() + 1;
            if group.len() <= 1 || live >= self.config.communities {
                terminal.push(group);
                continue;
            }

            let Some((left, right)) = self.bisect(connectivity, &group)? else {
                debug!(size = group.len(), "One-sided split, group is terminal");
                terminal.push(group);
                continue;
            };

            let gain = modularity_gain(connectivity, &group, &left, &right);
            if let Some(threshold) = self.config.min_modularity_gain {
                if gain <= threshold {
                    debug!(size = group.len(), gain, threshold, "Split rejected as insignificant");
                    terminal.push(group);
                    continue;
                }
            }

            debug!(left = left.len(), right = right.len(), gain, "Bisected group");
            bisections += 1;
            queue.push(pending(left));
            queue.push(pending(right));
        }

        terminal.sort_by_key(|g| g.first().copied().unwrap_or(usize::MAX));
        let mut labels = vec![0; n];
        for (label, group) in terminal.iter().enumerate() {
            for &i in group {
                labels[i] = label;
            }
        }
        let modularity = partition_modularity(connectivity, &labels);

        Ok(CommunityAssignment {
            labels,
            groups: terminal,
            bisections,
            modularity,
            index_id: connectivity.index_id(),
        })
    }

    /// Two non-empty halves of `group` (ascending), or `None` for a one-sided split.
    fn bisect(
        &self,
        connectivity: &ConnectivityMatrix,
        group: &[usize],
    ) -> Result<Option<(Vec<usize>, Vec<usize>)>> {
        let restricted = connectivity.restrict(group)?;

        let components = restricted.components();
        if components.len() > 1 {
            let first: Vec<usize> = components[0].iter().map(|&i| group[i]).collect();
            let mut rest: Vec<usize> = components[1..]
                .iter()
                .flatten()
                .map(|&i| group[i])
                .collect();
            rest.sort_unstable();
            return Ok(Some((first, rest)));
        }

        let builder = LaplacianBuilder::new(restricted);
        let affinity = builder.affinity(self.config.sigma)?;
        let pairs = self.solver.smallest(&affinity, 2)?;
        let scale = builder.inverse_sqrt_degree_values();
        let fiedler: Vec<f64> = pairs.vectors[1]
            .iter()
            .zip(&scale)
            .map(|(v, s)| v * s)
            .collect();

        let (left, right) = partition_by_sign(group, &fiedler);
        if left.is_empty() || right.is_empty() {
            return Ok(None);
        }
        Ok(Some((left, right)))
    }
}
