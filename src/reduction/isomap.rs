use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array2;

use super::{OUTPUT_DIMENSIONS, ReductionError, Reducer, top_eigenpairs};

/// Neighbours per point in the k-NN graph.
const NEIGHBORS: usize = 5;

/// Isometric mapping.
///
/// Builds a k-nearest-neighbour graph over Euclidean distances, joins any
/// disconnected components through their closest pair of points, takes
/// all-pairs shortest paths as geodesic distances and embeds those with
/// classical multidimensional scaling.
pub struct IsomapReducer;

impl Reducer for IsomapReducer {
    fn reduce(&self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
        let samples = features.nrows();
        if samples < 2 {
            return Err(ReductionError::InsufficientSamples {
                required: 2,
                found: samples,
            });
        }

        let distances = pairwise_distances(features);
        let mut graph = neighbor_graph(&distances, NEIGHBORS.min(samples - 1));
        connect_components(&mut graph, &distances);
        let geodesic = shortest_paths(&graph);
        classical_mds(&geodesic)
    }
}

type Graph = Vec<Vec<(usize, f64)>>;

fn pairwise_distances(features: &Array2<f64>) -> Array2<f64> {
    let n = features.nrows();
    let mut distances = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = features
                .row(i)
                .iter()
                .zip(features.row(j).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

/// Undirected k-NN graph; ties are broken by point index.
fn neighbor_graph(distances: &Array2<f64>, k: usize) -> Graph {
    let n = distances.nrows();
    let mut graph: Graph = vec![Vec::new(); n];
    for i in 0..n {
        let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
        others.sort_by(|&a, &b| {
            distances[[i, a]]
                .total_cmp(&distances[[i, b]])
                .then(a.cmp(&b))
        });
        for &j in others.iter().take(k) {
            add_edge(&mut graph, i, j, distances[[i, j]]);
        }
    }
    graph
}

fn add_edge(graph: &mut Graph, a: usize, b: usize, weight: f64) {
    if !graph[a].iter().any(|&(node, _)| node == b) {
        graph[a].push((b, weight));
        graph[b].push((a, weight));
    }
}

/// Component index of every node.
fn components(graph: &Graph) -> Vec<usize> {
    let mut component = vec![usize::MAX; graph.len()];
    let mut next = 0;
    for start in 0..graph.len() {
        if component[start] != usize::MAX {
            continue;
        }
        let mut stack = vec![start];
        component[start] = next;
        while let Some(node) = stack.pop() {
            for &(neighbor, _) in &graph[node] {
                if component[neighbor] == usize::MAX {
                    component[neighbor] = next;
                    stack.push(neighbor);
                }
            }
        }
        next += 1;
    }
    component
}

/// Links every pair of components through their closest pair of points.
fn connect_components(graph: &mut Graph, distances: &Array2<f64>) {
    let component = components(graph);
    let count = component.iter().copied().max().map_or(0, |max| max + 1);
    if count <= 1 {
        return;
    }

    let n = graph.len();
    let mut closest: Vec<Option<(usize, usize, f64)>> = vec![None; count * count];
    for i in 0..n {
        for j in (i + 1)..n {
            let (ci, cj) = (component[i], component[j]);
            if ci == cj {
                continue;
            }
            let slot = &mut closest[ci.min(cj) * count + ci.max(cj)];
            let d = distances[[i, j]];
            if slot.is_none_or(|(_, _, best)| d < best) {
                *slot = Some((i, j, d));
            }
        }
    }

    for (i, j, d) in closest.into_iter().flatten() {
        add_edge(graph, i, j, d);
    }
}

#[derive(PartialEq)]
struct Visit {
    cost: f64,
    node: usize,
}

impl Eq for Visit {}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest visit first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// All-pairs shortest path lengths, one Dijkstra run per source.
fn shortest_paths(graph: &Graph) -> Array2<f64> {
    let n = graph.len();
    let mut result = Array2::from_elem((n, n), f64::INFINITY);

    for source in 0..n {
        let mut heap = BinaryHeap::new();
        result[[source, source]] = 0.0;
        heap.push(Visit {
            cost: 0.0,
            node: source,
        });

        while let Some(Visit { cost, node }) = heap.pop() {
            if cost > result[[source, node]] {
                continue;
            }
            for &(next, weight) in &graph[node] {
                let candidate = cost + weight;
                if candidate < result[[source, next]] {
                    result[[source, next]] = candidate;
                    heap.push(Visit {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }
    }
    result
}

/// Classical MDS: double-center the squared distances and keep the top
/// two eigenpairs, scaled by the square root of their eigenvalues.
fn classical_mds(distances: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
    let n = distances.nrows();
    let squared = distances.mapv(|d| d * d);

    let row_means: Vec<f64> = squared.rows().into_iter().map(|r| r.sum() / n as f64).collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;

    let centered = Array2::from_shape_fn((n, n), |(i, j)| {
        -0.5 * (squared[[i, j]] - row_means[i] - row_means[j] + grand_mean)
    });

    let (values, vectors) = top_eigenpairs(&centered, OUTPUT_DIMENSIONS.min(n))?;

    let mut coords = Array2::zeros((n, OUTPUT_DIMENSIONS));
    for (c, value) in values.iter().enumerate() {
        let scale = value.max(0.0).sqrt();
        for i in 0..n {
            coords[[i, c]] = vectors[[i, c]] * scale;
        }
    }
    Ok(coords)
}
