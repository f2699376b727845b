//! Newman modularity over a symmetric connectivity matrix.
//!
//! Used as the cut-quality measure for spectral bisection: a split is only
//! worth keeping when it raises modularity by more than a caller-chosen
//! significance threshold.
//!
//! For total degree `2m = Σ d_i`, the contribution of a group `S` is
//! `Q(S) = (Σ_{i,j∈S} C_ij) / 2m - (d_S / 2m)^2`, and the modularity of a
//! partition is the sum over its groups.

use crate::symmetrize::ConnectivityMatrix;
use std::collections::HashMap;

/// Modularity contribution of one group (positions in the connectivity index).
pub fn group_modularity(connectivity: &ConnectivityMatrix, members: &[usize]) -> f64 {
    let degrees = connectivity.degrees();
    let m2: f64 = degrees.iter().sum();
    if m2 == 0.0 {
        return 0.0;
    }

    let mut inside = vec![false; connectivity.dim()];
    for &i in members {
        if i < inside.len() {
            inside[i] = true;
        }
    }

    let mut internal = 0.0;
    for (r, c, v) in connectivity.matrix().triplets() {
        if inside[r] && inside[c] {
            internal += v;
        }
    }
    let degree: f64 = members
        .iter()
        .filter_map(|&i| degrees.get(i))
        .sum();

    internal / m2 - (degree / m2).powi(2)
}

/// Modularity change from splitting `whole` into `left` and `right`.
pub fn modularity_gain(
    connectivity: &ConnectivityMatrix,
    whole: &[usize],
    left: &[usize],
    right: &[usize],
) -> f64 {
    group_modularity(connectivity, left) + group_modularity(connectivity, right)
        - group_modularity(connectivity, whole)
}

/// Modularity of a full labelling (`labels[i]` is the group of position `i`).
pub fn partition_modularity(connectivity: &ConnectivityMatrix, labels: &[usize]) -> f64 {
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    groups
        .values()
        .map(|members| group_modularity(connectivity, members))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseMatrix;
    use crate::symmetrize::AdjacencyMatrix;
    use crate::types::NodeIndexMap;

    fn connectivity(n: usize, edges: &[(usize, usize)]) -> ConnectivityMatrix {
        let index = NodeIndexMap::new((0..n).map(|i| i.to_string()).collect(), 0);
        let a = SparseMatrix::from_triplets(n, edges.iter().map(|&(r, c)| (r, c, 1.0))).unwrap();
        AdjacencyMatrix::from_matrix(a, &index)
            .unwrap()
            .symmetrize()
            .unwrap()
    }

    #[test]
    fn empty_graph_has_zero_modularity() {
        let c = connectivity(3, &[]);
        assert_eq!(partition_modularity(&c, &[0, 1, 2]), 0.0);
    }

    #[test]
    fn two_pairs() {
        // Q = 2 * (1/2 - (2/4)^2) = 0.5
        let c = connectivity(4, &[(0, 1), (2, 3)]);
        let q = partition_modularity(&c, &[0, 0, 1, 1]);
        assert!((q - 0.5).abs() < 1e-12, "modularity = {}", q);
    }

    #[test]
    fn single_community_is_zero() {
        let c = connectivity(3, &[(0, 1), (1, 2), (2, 0)]);
        let q = partition_modularity(&c, &[0, 0, 0]);
        assert!(q.abs() < 1e-12, "modularity = {}", q);
    }

    #[test]
    fn splitting_two_triangles_gains_half() {
        let c = connectivity(
            6,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)],
        );
        let gain = modularity_gain(&c, &[0, 1, 2, 3, 4, 5], &[0, 1, 2], &[3, 4, 5]);
        assert!((gain - 0.5).abs() < 1e-12, "gain = {}", gain);
    }

    #[test]
    fn bad_split_loses_modularity() {
        let c = connectivity(4, &[(0, 1), (2, 3)]);
        let gain = modularity_gain(&c, &[0, 1], &[0], &[1]);
        assert!(gain < 0.0, "gain = {}", gain);
    }
}
