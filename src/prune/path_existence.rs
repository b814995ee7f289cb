use itertools::Itertools;

use super::*;
use crate::graph::NumArcs;

/// Deletes every arc of a slice layer that is missing a copy of the demand's
/// source or target: such a layer cannot carry any route. Sweeps until a full
/// sweep deletes nothing; the arc set only shrinks, so this terminates.
pub struct PathExistence;

impl PruningPass for PathExistence {
    const NAME: &str = "PathExistence";

    fn apply(&mut self, graph: &mut ExtendedGraph, ctx: &PassContext) -> NumArcs {
        let demand = ctx.demand;
        let mut total = 0;

        loop {
            let mut deleted = 0;
            for a in graph.arc_ids().collect_vec() {
                let slice = graph.arc(a).slice;
                if graph.find_node(demand.source, slice).is_none()
                    || graph.find_node(demand.target, slice).is_none()
                {
                    graph.erase_arc(a);
                    deleted += 1;
                }
            }

            total += deleted;
            if deleted == 0 {
                return total;
            }
        }
    }
}
