use super::RsaEngine;
use crate::{
    graph::{Arc, NumSlices, SliceIndex},
    instance::{Load, ObjectiveMetric, PartitionPolicy},
};

impl RsaEngine {
    /// Objective coefficient of arc `a` of demand graph `d` under the metric
    /// selected for the run. Pure and read-only: repeated calls without state
    /// change yield identical values.
    pub fn coefficient(&self, d: usize, a: Arc) -> f64 {
        let graph = &self.graphs[d];
        let arc = graph.arc(a);
        let demand = &self.demands[d];
        let leaves_source = graph.node(arc.source).label == demand.source;

        match self.input.objective {
            ObjectiveMetric::Zero => 0.0,
            ObjectiveMetric::SliceAtOrigin => slice_at_origin(
                arc.slice,
                self.link_slot_counts[arc.link as usize],
                leaves_source,
                demand.load,
                self.input.partition_policy,
                self.input.partition_load,
            ),
            ObjectiveMetric::LinkMaxUsedSlice => {
                max_with_used(arc.slice, self.max_used_slice_per_link[arc.link as usize])
            }
            ObjectiveMetric::HopCount => 1.0,
            ObjectiveMetric::WeightedHopCount => f64::from(demand.load),
            ObjectiveMetric::PathLength => arc.length,
            ObjectiveMetric::GlobalMaxUsedSlice => {
                if leaves_source {
                    max_with_used(arc.slice, self.max_used_slice_global)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Metric "1": spectrum position of the arcs leaving the origin, counted from
/// the bottom. Under a partition policy, high-load demands count from the top
/// of the link instead, steering the two classes apart. Other arcs cost
/// nothing.
fn slice_at_origin(
    slice: SliceIndex,
    slot_count: NumSlices,
    leaves_source: bool,
    load: Load,
    policy: PartitionPolicy,
    partition_load: Load,
) -> f64 {
    if !leaves_source {
        return 0.0;
    }

    let from_bottom = f64::from(slice + 1);
    match policy {
        PartitionPolicy::NoPartition => from_bottom,
        PartitionPolicy::Soft | PartitionPolicy::Hard => {
            if load <= partition_load {
                from_bottom
            } else {
                f64::from(slot_count - slice)
            }
        }
    }
}

/// Metrics "1p" and "8": the slot position the arc would push the relevant
/// used maximum to.
fn max_with_used(slice: SliceIndex, max_used: Option<SliceIndex>) -> f64 {
    f64::from(max_used.map_or(slice, |m| slice.max(m)))
}
