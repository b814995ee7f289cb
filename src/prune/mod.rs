pub mod contraction;
pub mod length_bound;
pub mod non_routable;
pub mod path_existence;

pub use contraction::ContractTerminals;
pub use length_bound::LengthBound;
pub use non_routable::NonRoutable;
pub use path_existence::PathExistence;

use log::info;

use crate::{
    errors::InvariantCheck,
    graph::{NumArcs, extended::ExtendedGraph},
    instance::{Demand, Instance, PreprocessingLevel},
};

/// Read-only state shared by one pass application on one demand's graph.
pub struct PassContext<'a> {
    pub instance: &'a Instance,
    pub demand: &'a Demand,
}

/// One pruning pass over a single demand graph.
/// Applying a pass must never grow the graph, and must never delete an arc
/// that lies on some slice-consistent source-target path within the demand's
/// length bound.
pub trait PruningPass {
    const NAME: &str;

    /// Returns the number of arcs the pass deleted.
    fn apply(&mut self, graph: &mut ExtendedGraph, ctx: &PassContext) -> NumArcs;
}

/// Drives the pruning passes over all demand graphs of a batch, in the
/// schedule selected by the preprocessing level, and contracts the terminals
/// once the pass pipeline has converged.
#[derive(Default)]
pub struct Pruner;

impl Pruner {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&mut self, instance: &Instance, demands: &[Demand], graphs: &mut [ExtendedGraph]) {
        assert_eq!(demands.len(), graphs.len());
        let level = instance.input().preprocessing;

        self.sweep(&mut NonRoutable, instance, demands, graphs);

        if level >= PreprocessingLevel::Partial {
            self.sweep(&mut PathExistence, instance, demands, graphs);
            let mut keep_pruning = self.sweep(&mut LengthBound, instance, demands, graphs) > 0;

            if level >= PreprocessingLevel::Full {
                // the passes feed each other: a length deletion can strand a
                // slice layer and vice versa
                while keep_pruning {
                    self.sweep(&mut PathExistence, instance, demands, graphs);
                    keep_pruning = self.sweep(&mut LengthBound, instance, demands, graphs) > 0;
                }
            }
        }

        self.sweep(&mut ContractTerminals, instance, demands, graphs);
    }

    /// Applies one pass to every demand graph; returns the total number of
    /// arcs deleted.
    pub fn sweep<P: PruningPass>(
        &mut self,
        pass: &mut P,
        instance: &Instance,
        demands: &[Demand],
        graphs: &mut [ExtendedGraph],
    ) -> NumArcs {
        demands
            .iter()
            .zip(graphs.iter_mut())
            .map(|(demand, graph)| self.apply_pass(pass, graph, &PassContext { instance, demand }))
            .sum()
    }

    fn apply_pass<P: PruningPass>(
        &mut self,
        pass: &mut P,
        graph: &mut ExtendedGraph,
        ctx: &PassContext,
    ) -> NumArcs {
        let before_nodes = graph.number_of_nodes();
        let before_arcs = graph.number_of_arcs();

        let deleted = pass.apply(graph, ctx);
        debug_assert!(graph.is_correct().is_ok());
        debug_assert_eq!(deleted, before_arcs - graph.number_of_arcs());

        info!(
            "{} demand #{}: n {} -> {}, m {} -> {}",
            P::NAME,
            ctx.demand.id,
            before_nodes,
            graph.number_of_nodes(),
            before_arcs,
            graph.number_of_arcs()
        );

        deleted
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        engine::build_demand_graph,
        instance::{Input, PartitionPolicy},
        testing::{ring_instance, unit_demand},
    };

    #[test]
    fn full_pipeline_on_a_ring() {
        // 4-node ring, unit lengths, 4 slices: the demand 0 -> 2 (load 1,
        // max length 3) admits the 2-hop routes over both sides of the ring
        // on every slice layer
        let instance = ring_instance(4, 4, vec![unit_demand(0, 0, 2, 3.0)], Input::default());
        let demand = instance.demands()[0];
        let mut graph = build_demand_graph(&instance, &demand);
        assert_eq!(graph.number_of_arcs(), 32);

        Pruner::new().run(&instance, &[demand], std::slice::from_mut(&mut graph));

        // per slice: 0->1, 1->2, 0->3, 3->2
        assert_eq!(graph.number_of_arcs(), 16);
        let contracted = graph.nodes().filter(|(_, n)| n.is_contracted()).count();
        assert_eq!(contracted, 2);
        assert_eq!(graph.number_of_nodes(), 10);
    }

    #[test]
    fn ring_with_tight_length_bound_prunes_everything() {
        let instance = ring_instance(4, 4, vec![unit_demand(0, 0, 2, 1.0)], Input::default());
        let demand = instance.demands()[0];
        let mut graph = build_demand_graph(&instance, &demand);

        Pruner::new().run(&instance, &[demand], std::slice::from_mut(&mut graph));
        assert_eq!(graph.number_of_arcs(), 0);
    }

    #[test]
    fn converged_pipeline_is_idempotent() {
        let mut input = Input::default();
        input.hop_penalty = 1.0;
        let instance = ring_instance(5, 3, vec![unit_demand(0, 0, 2, 4.0)], input);
        let demand = instance.demands()[0];
        let mut graph = build_demand_graph(&instance, &demand);

        let mut pruner = Pruner::new();
        pruner.sweep(&mut NonRoutable, &instance, &[demand], std::slice::from_mut(&mut graph));
        pruner.sweep(&mut PathExistence, &instance, &[demand], std::slice::from_mut(&mut graph));
        let mut guard = 0;
        loop {
            let deleted = pruner.sweep(&mut LengthBound, &instance, &[demand], std::slice::from_mut(&mut graph))
                + pruner.sweep(&mut PathExistence, &instance, &[demand], std::slice::from_mut(&mut graph));
            if deleted == 0 {
                break;
            }
            guard += 1;
            assert!(guard < 100, "alternation must reach a fixed point");
        }

        // re-running either pass after convergence deletes nothing
        assert_eq!(
            pruner.sweep(&mut PathExistence, &instance, &[demand], std::slice::from_mut(&mut graph)),
            0
        );
        assert_eq!(
            pruner.sweep(&mut LengthBound, &instance, &[demand], std::slice::from_mut(&mut graph)),
            0
        );
    }

    #[test]
    fn hard_partition_restricts_slices_per_load_class() {
        let mut input = Input::default();
        input.partition_policy = PartitionPolicy::Hard;
        input.partition_load = 1;
        input.partition_slice = 2;

        let low = unit_demand(0, 0, 1, 100.0);
        let mut high = unit_demand(1, 0, 1, 100.0);
        high.load = 3;

        let instance = ring_instance(2, 4, vec![low, high], input);
        let low_graph = build_demand_graph(&instance, &instance.demands()[0]);
        let high_graph = build_demand_graph(&instance, &instance.demands()[1]);

        assert!(low_graph.arcs().all(|(_, a)| a.slice < 2));
        assert!(high_graph.arcs().all(|(_, a)| a.slice >= 2));
        assert!(low_graph.number_of_arcs() > 0);
        assert!(high_graph.number_of_arcs() > 0);
    }
}
