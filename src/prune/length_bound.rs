use itertools::Itertools;

use super::*;
use crate::graph::{Arc, Node, NumArcs, ShortestPaths};

/// Tolerance for comparisons against the demand's length bound; keeps
/// near-equal boundary values from being rejected spuriously.
pub const LENGTH_EPS: f64 = 1e-9;

/// Deletes every arc that no source-target route within the demand's length
/// bound can use: shortest distance source -> tail, plus the arc's penalized
/// length, plus shortest distance head -> target. An unreachable leg is a
/// valid pruning signal, not an error. Distances are recomputed per arc on
/// the current graph, so earlier deletions in the same sweep are accounted
/// for.
pub struct LengthBound;

impl PruningPass for LengthBound {
    const NAME: &str = "LengthBound";

    fn apply(&mut self, graph: &mut ExtendedGraph, ctx: &PassContext) -> NumArcs {
        let demand = ctx.demand;
        let mut deleted = 0;

        for a in graph.arc_ids().collect_vec() {
            let slice = graph.arc(a).slice;
            let terminals = (
                graph.find_node(demand.source, slice),
                graph.find_node(demand.target, slice),
            );

            let keep = match terminals {
                (Some(source), Some(target)) => distance_through(graph, source, a, target)
                    .is_some_and(|dist| dist < demand.max_length + LENGTH_EPS),
                _ => false,
            };

            if !keep {
                graph.erase_arc(a);
                deleted += 1;
            }
        }

        deleted
    }
}

/// Length of the shortest source-target walk forced through `a`, or None if
/// one of the legs is unreachable.
fn distance_through(graph: &ExtendedGraph, source: Node, a: Arc, target: Node) -> Option<f64> {
    let arc = graph.arc(a);
    let to_tail = ShortestPaths::run(graph, source).dist_to(arc.source)?;
    let from_head = ShortestPaths::run(graph, arc.target).dist_to(target)?;
    Some(to_tail + arc.length_with_penalty + from_head)
}
