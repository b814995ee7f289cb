pub mod coeff;
pub mod commit;

use std::time::{Duration, Instant};

use log::info;
use serde::Serialize;

use crate::{
    graph::{
        Arc, CompactGraph, LinkLabel, Node, NodeLabel, NumSlices, SliceIndex,
        extended::ExtendedGraph,
    },
    instance::{Demand, DemandId, Fiber, Input, Instance, Load, PartitionPolicy},
    prune::Pruner,
};

/// Solver-facing description of one decision variable (one surviving arc).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Variable {
    pub var_id: u32,
    pub demand: DemandId,
    pub link: LinkLabel,
    pub slice: SliceIndex,
    pub length: f64,
    pub length_with_penalty: f64,
    pub coefficient: f64,
}

/// Builds one layered graph per batch demand, prunes each to the smallest
/// graph still containing every feasible route, and exposes dense variable
/// ids, node ordinals and objective coefficients to an external solver. After
/// the solver has marked its arc selection, [`RsaEngine::commit`] writes the
/// slot assignments back into the shared instance and advances the batch
/// cursor.
///
/// Single-use: one engine per routing round. The instance is only borrowed
/// during construction and at commit; occupancy maxima and slot counts are
/// snapshotted here since occupancy is frozen for the round.
pub struct RsaEngine {
    input: Input,
    demands: Vec<Demand>,
    graphs: Vec<ExtendedGraph>,
    compact: CompactGraph,
    loads: Vec<Load>,
    source_index: Vec<Option<Node>>,
    target_index: Vec<Option<Node>>,
    /// var id -> (demand position, arc handle)
    var_table: Vec<(usize, Arc)>,
    link_slot_counts: Vec<NumSlices>,
    max_used_slice_per_link: Vec<Option<SliceIndex>>,
    max_used_slice_global: Option<SliceIndex>,
    construction_time: Duration,
    preprocessing_time: Duration,
}

impl RsaEngine {
    pub fn new(instance: &Instance) -> Self {
        let input = *instance.input();

        let start = Instant::now();
        let compact = build_compact_graph(instance);
        let demands = instance.next_demands().to_vec();

        let mut loads = Vec::new();
        for demand in &demands {
            if !loads.contains(&demand.load) {
                loads.push(demand.load);
            }
        }

        let mut graphs: Vec<_> = demands
            .iter()
            .map(|demand| build_demand_graph(instance, demand))
            .collect();
        let construction_time = start.elapsed();
        info!(
            "built {} demand graphs in {:.3}s",
            graphs.len(),
            construction_time.as_secs_f64()
        );

        let start = Instant::now();
        Pruner::new().run(instance, &demands, &mut graphs);
        let preprocessing_time = start.elapsed();
        info!(
            "preprocessing converged in {:.3}s",
            preprocessing_time.as_secs_f64()
        );

        let mut engine = Self {
            input,
            demands,
            graphs,
            compact,
            loads,
            source_index: Vec::new(),
            target_index: Vec::new(),
            var_table: Vec::new(),
            link_slot_counts: instance.fibers().iter().map(Fiber::number_of_slices).collect(),
            max_used_slice_per_link: instance
                .fibers()
                .iter()
                .map(Fiber::max_used_slice_position)
                .collect(),
            max_used_slice_global: instance.max_used_slice_position(),
            construction_time,
            preprocessing_time,
        };
        engine.assign_indices();
        engine
    }

    /// Assigns every surviving arc a dense variable id (demand order, then
    /// arc arena order) and every node its graph-local ordinal; records the
    /// canonical terminal ordinals per demand. Ids stay stable for the
    /// engine's lifetime.
    fn assign_indices(&mut self) {
        for (d, graph) in self.graphs.iter_mut().enumerate() {
            for a in graph.arc_ids().collect::<Vec<_>>() {
                graph.arc_mut(a).var_id = Some(self.var_table.len() as u32);
                self.var_table.push((d, a));
            }

            graph.assign_local_indices();
            let demand = &self.demands[d];
            self.source_index.push(local_index_of(graph, demand.source));
            self.target_index.push(local_index_of(graph, demand.target));
        }
    }

    pub fn number_of_demands(&self) -> usize {
        self.demands.len()
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    pub fn demand(&self, d: usize) -> &Demand {
        &self.demands[d]
    }

    pub fn graph(&self, d: usize) -> &ExtendedGraph {
        &self.graphs[d]
    }

    pub fn graphs(&self) -> &[ExtendedGraph] {
        &self.graphs
    }

    pub fn compact(&self) -> &CompactGraph {
        &self.compact
    }

    pub fn number_of_variables(&self) -> u32 {
        self.var_table.len() as u32
    }

    /// Graph-local ordinal of the canonical source node, None if the graph
    /// pruned to nothing.
    pub fn source_node_index(&self, d: usize) -> Option<Node> {
        self.source_index[d]
    }

    pub fn target_node_index(&self, d: usize) -> Option<Node> {
        self.target_index[d]
    }

    /// Distinct loads of the batch, in first-seen order.
    pub fn loads_to_be_routed(&self) -> &[Load] {
        &self.loads
    }

    pub fn total_load_to_be_routed(&self) -> u64 {
        self.demands.iter().map(|d| u64::from(d.load)).sum()
    }

    pub fn graph_construction_time(&self) -> Duration {
        self.construction_time
    }

    pub fn preprocessing_time(&self) -> Duration {
        self.preprocessing_time
    }

    /// The dense variable table handed to the solver.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.var_table.iter().enumerate().map(|(id, &(d, a))| {
            let arc = self.graphs[d].arc(a);
            Variable {
                var_id: id as u32,
                demand: self.demands[d].id,
                link: arc.link,
                slice: arc.slice,
                length: arc.length,
                length_with_penalty: arc.length_with_penalty,
                coefficient: self.coefficient(d, a),
            }
        })
    }
}

fn local_index_of(graph: &ExtendedGraph, label: NodeLabel) -> Option<Node> {
    graph
        .nodes()
        .find(|(_, node)| node.label == label)
        .map(|(_, node)| node.local_index)
}

fn build_compact_graph(instance: &Instance) -> CompactGraph {
    let mut graph = CompactGraph::new();
    for label in instance.node_labels() {
        graph.add_node(label);
    }
    for fiber in instance.fibers() {
        graph.add_edge(fiber.index(), fiber.source(), fiber.target(), fiber.length());
    }
    graph
}

/// Materializes the layered graph of one demand: per free slot below the
/// link's slice limit, a pair of opposite-direction arcs, gated by the
/// spectrum-partition policy. Endpoint nodes are created lazily and shared.
pub fn build_demand_graph(instance: &Instance, demand: &Demand) -> ExtendedGraph {
    let input = instance.input();
    let mut graph = ExtendedGraph::new();

    for fiber in instance.fibers() {
        let limit = instance.slice_limit_on(fiber.index());
        for slice in 0..limit {
            if fiber.is_slice_used(slice) || !slice_admitted(input, demand, slice) {
                continue;
            }
            add_arc(&mut graph, demand, input, fiber.source(), fiber.target(), fiber.index(), slice, fiber.length());
            add_arc(&mut graph, demand, input, fiber.target(), fiber.source(), fiber.index(), slice, fiber.length());
        }
    }

    graph
}

/// Hard partitioning confines each load class to its spectrum region; the
/// other policies admit every free slice.
fn slice_admitted(input: &Input, demand: &Demand, slice: SliceIndex) -> bool {
    match input.partition_policy {
        PartitionPolicy::NoPartition | PartitionPolicy::Soft => true,
        PartitionPolicy::Hard => {
            if demand.load <= input.partition_load {
                slice < input.partition_slice
            } else {
                slice >= input.partition_slice
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn add_arc(
    graph: &mut ExtendedGraph,
    demand: &Demand,
    input: &Input,
    tail: NodeLabel,
    head: NodeLabel,
    link: LinkLabel,
    slice: SliceIndex,
    length: f64,
) {
    let source = graph.node_or_insert(tail, slice);
    let target = graph.node_or_insert(head, slice);
    let length_with_penalty = if tail == demand.source {
        length
    } else {
        length + input.hop_penalty
    };
    graph.add_arc(source, target, link, slice, length, length_with_penalty);
}
