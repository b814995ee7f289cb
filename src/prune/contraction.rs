use itertools::Itertools;

use super::*;
use crate::graph::{NodeLabel, NumArcs, extended::ExtendedGraph};

/// Merges all surviving copies of the demand's source into one canonical
/// node, and likewise for the target, preserving every incident arc. Possible
/// self-loops are left in place: the non-routable pass already removed all
/// arcs entering the source or leaving the target, so none can appear on a
/// simple path.
pub struct ContractTerminals;

impl PruningPass for ContractTerminals {
    const NAME: &str = "ContractTerminals";

    fn apply(&mut self, graph: &mut ExtendedGraph, ctx: &PassContext) -> NumArcs {
        contract_label(graph, ctx.demand.source);
        contract_label(graph, ctx.demand.target);
        0
    }
}

/// The first copy in arena order survives and becomes the canonical node.
fn contract_label(graph: &mut ExtendedGraph, label: NodeLabel) {
    let mut copies = graph.nodes_with_label(label).collect_vec().into_iter();
    let Some(canonical) = copies.next() else {
        return;
    };

    graph.mark_contracted(canonical);
    for dying in copies {
        graph.contract(canonical, dying);
    }
}
