use itertools::Itertools;

use super::*;
use crate::graph::NumArcs;

/// Deletes arcs that can never lie on a simple source-target path: the slot
/// block does not fit the demand's load, the arc enters the source, or the
/// arc leaves the target.
pub struct NonRoutable;

impl PruningPass for NonRoutable {
    const NAME: &str = "NonRoutable";

    fn apply(&mut self, graph: &mut ExtendedGraph, ctx: &PassContext) -> NumArcs {
        let demand = ctx.demand;
        let mut deleted = 0;

        for a in graph.arc_ids().collect_vec() {
            let arc = graph.arc(a);
            let tail = graph.node(arc.source).label;
            let head = graph.node(arc.target).label;

            if !ctx.instance.has_enough_space(arc.link, arc.slice, demand)
                || tail == demand.target
                || head == demand.source
            {
                graph.erase_arc(a);
                deleted += 1;
            }
        }

        deleted
    }
}
