//! Shared helpers for integration tests
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tristream::{LocalCounts, VertexId};

/// Random graph with planted dense communities, as a shuffled edge stream
/// without duplicates or self-loops
pub fn clustered_graph(communities: u64, community_size: u64, extra: usize, seed: u64) -> Vec<(VertexId, VertexId)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    let mut push = |u: VertexId, v: VertexId, edges: &mut Vec<(VertexId, VertexId)>| {
        if u != v && seen.insert((u.min(v), u.max(v))) {
            edges.push((u, v));
        }
    };

    for c in 0..communities {
        let base = c * community_size;
        for i in 0..community_size {
            for j in (i + 1)..community_size {
                if rng.gen_bool(0.5) {
                    push(base + i, base + j, &mut edges);
                }
            }
        }
    }
    let vertices = communities * community_size;
    for _ in 0..extra {
        let u = rng.gen_range(0..vertices);
        let v = rng.gen_range(0..vertices);
        push(u, v, &mut edges);
    }

    // Fisher-Yates so that communities interleave in the stream
    for i in (1..edges.len()).rev() {
        let j = rng.gen_range(0..=i);
        edges.swap(i, j);
    }
    edges
}

/// Exact per-vertex triangle counts of a simple graph
pub fn exact_local_counts(edges: &[(VertexId, VertexId)]) -> LocalCounts {
    let mut adjacency: HashMap<VertexId, HashSet<VertexId>> = HashMap::new();
    let mut counts = LocalCounts::default();
    for &(u, v) in edges {
        if u == v {
            continue;
        }
        counts.entry(u).or_insert(0.0);
        counts.entry(v).or_insert(0.0);
        if let (Some(nu), Some(nv)) = (adjacency.get(&u), adjacency.get(&v)) {
            if nu.contains(&v) {
                continue;
            }
            let common: Vec<VertexId> = nu.intersection(nv).copied().collect();
            for w in common {
                *counts.entry(u).or_insert(0.0) += 1.0;
                *counts.entry(v).or_insert(0.0) += 1.0;
                *counts.entry(w).or_insert(0.0) += 1.0;
            }
        }
        adjacency.entry(u).or_default().insert(v);
        adjacency.entry(v).or_default().insert(u);
    }
    counts
}

pub fn exact_global_count(edges: &[(VertexId, VertexId)]) -> f64 {
    exact_local_counts(edges).values().sum::<f64>() / 3.0
}
