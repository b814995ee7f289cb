use std::{cmp::Ordering, collections::BinaryHeap};

use super::{Node, extended::ExtendedGraph};

#[derive(Clone, Copy, PartialEq)]
struct QueueEntry {
    dist: f64,
    node: Node,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    // inverted: BinaryHeap is a max-heap, we need the closest node on top
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest distances over the penalized arc lengths of a
/// layered graph. Arcs never leave their slice, so a run only ever explores
/// the start node's layer.
pub struct ShortestPaths {
    dist: Vec<f64>,
}

impl ShortestPaths {
    pub fn run(graph: &ExtendedGraph, start: Node) -> Self {
        let mut dist = vec![f64::INFINITY; graph.node_capacity()];
        let mut heap = BinaryHeap::new();

        dist[start as usize] = 0.0;
        heap.push(QueueEntry {
            dist: 0.0,
            node: start,
        });

        while let Some(QueueEntry { dist: d, node: u }) = heap.pop() {
            if d > dist[u as usize] {
                continue;
            }
            for &a in graph.node(u).out_arcs() {
                let arc = graph.arc(a);
                let next = d + arc.length_with_penalty;
                if next < dist[arc.target as usize] {
                    dist[arc.target as usize] = next;
                    heap.push(QueueEntry {
                        dist: next,
                        node: arc.target,
                    });
                }
            }
        }

        Self { dist }
    }

    pub fn reached(&self, v: Node) -> bool {
        self.dist[v as usize].is_finite()
    }

    pub fn dist_to(&self, v: Node) -> Option<f64> {
        self.reached(v).then(|| self.dist[v as usize])
    }
}
