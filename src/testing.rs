use rand::Rng;

use crate::{
    graph::{NodeLabel, NumNodes, NumSlices},
    instance::{Demand, DemandId, Fiber, Input, Instance},
};

/// Load-1 demand, the bread and butter of the small test topologies.
pub fn unit_demand(id: DemandId, source: NodeLabel, target: NodeLabel, max_length: f64) -> Demand {
    Demand::new(id, source, target, 1, max_length)
}

/// Ring of `n` nodes with unit-length links `i -- (i + 1) % n`, `slices`
/// slots each.
pub fn ring_instance(n: NumNodes, slices: NumSlices, demands: Vec<Demand>, input: Input) -> Instance {
    let fibers = (0..n)
        .map(|i| Fiber::new(i, i, (i + 1) % n, 1.0, slices))
        .collect();
    Instance::new(n, fibers, demands, input)
}

/// Path of `n` nodes with unit-length links, `slices` slots each.
pub fn path_instance(n: NumNodes, slices: NumSlices, demands: Vec<Demand>, input: Input) -> Instance {
    let fibers = (0..n - 1)
        .map(|i| Fiber::new(i, i, i + 1, 1.0, slices))
        .collect();
    Instance::new(n, fibers, demands, input)
}

/// Triangle 0 - 1 - 2 with 4 slots per link and the given lengths for the
/// links (0,1), (1,2) and (0,2).
pub fn weighted_triangle_instance(lengths: [f64; 3], demands: Vec<Demand>, input: Input) -> Instance {
    let fibers = vec![
        Fiber::new(0, 0, 1, lengths[0], 4),
        Fiber::new(1, 1, 2, lengths[1], 4),
        Fiber::new(2, 0, 2, lengths[2], 4),
    ];
    Instance::new(3, fibers, demands, input)
}

/// Random multigraph topology with a full-batch demand set; loads 1..=3,
/// lengths 1..=5, generous length bounds.
pub fn random_instance(
    rng: &mut impl Rng,
    nodes: NumNodes,
    links: u32,
    slices: NumSlices,
    demands: u32,
) -> Instance {
    assert!(nodes >= 2);

    let fibers = (0..links)
        .map(|i| {
            let source = rng.gen_range(0..nodes);
            let mut target = rng.gen_range(0..nodes);
            while target == source {
                target = rng.gen_range(0..nodes);
            }
            Fiber::new(i, source, target, rng.gen_range(1..=5) as f64, slices)
        })
        .collect();

    let demands = (0..demands)
        .map(|id| {
            let source = rng.gen_range(0..nodes);
            let mut target = rng.gen_range(0..nodes);
            while target == source {
                target = rng.gen_range(0..nodes);
            }
            Demand::new(id, source, target, rng.gen_range(1..=3), 100.0)
        })
        .collect::<Vec<_>>();

    let mut input = Input::default();
    input.demands_at_once = demands.len();
    Instance::new(nodes, fibers, demands, input)
}
