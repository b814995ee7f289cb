pub mod demand;
pub mod fiber;

pub use demand::Demand;
pub use fiber::Fiber;

use std::str::FromStr;

use crate::{
    errors::ConfigError,
    graph::{LinkLabel, NodeLabel, NumNodes, NumSlices, SliceIndex},
};

pub type DemandId = u32;
/// Width of a demand's contiguous slot block
pub type Load = NumSlices;

/// Spectrum-partition policy: reserves spectrum regions by demand load class
/// to fight fragmentation. `Soft` only steers the objective; `Hard` also
/// restricts which slices are materialized at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionPolicy {
    NoPartition,
    Soft,
    Hard,
}

impl FromStr for PartitionPolicy {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "none" => Ok(Self::NoPartition),
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigError::UnknownPartitionPolicy(token.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreprocessingLevel {
    None,
    Partial,
    Full,
}

impl FromStr for PreprocessingLevel {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "none" => Ok(Self::None),
            "partial" => Ok(Self::Partial),
            "full" => Ok(Self::Full),
            _ => Err(ConfigError::UnknownPreprocessingLevel(token.to_owned())),
        }
    }
}

/// Objective metric selected for the run; determines the per-arc coefficient
/// handed to the solver. Selector tokens follow the conventional numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectiveMetric {
    /// "0": constant zero, pure feasibility
    Zero,
    /// "1": spectrum position of the arcs leaving the origin
    SliceAtOrigin,
    /// "1p": slice the arc would push the link's used maximum to
    LinkMaxUsedSlice,
    /// "2": hop count
    HopCount,
    /// "2p": hop count weighted by the demand's load
    WeightedHopCount,
    /// "4": physical path length
    PathLength,
    /// "8": slice the arc would push the network-wide used maximum to
    GlobalMaxUsedSlice,
}

impl FromStr for ObjectiveMetric {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "0" => Ok(Self::Zero),
            "1" => Ok(Self::SliceAtOrigin),
            "1p" => Ok(Self::LinkMaxUsedSlice),
            "2" => Ok(Self::HopCount),
            "2p" => Ok(Self::WeightedHopCount),
            "4" => Ok(Self::PathLength),
            "8" => Ok(Self::GlobalMaxUsedSlice),
            _ => Err(ConfigError::UnknownObjectiveMetric(token.to_owned())),
        }
    }
}

/// Run configuration consumed by the engine. Owned by the instance, copied
/// into the engine at construction.
#[derive(Clone, Copy, Debug)]
pub struct Input {
    /// Demands routed per round
    pub demands_at_once: usize,
    pub partition_policy: PartitionPolicy,
    /// Load threshold separating the partition's low and high classes
    pub partition_load: Load,
    /// First slice of the partition's high region
    pub partition_slice: SliceIndex,
    pub preprocessing: PreprocessingLevel,
    /// Added to an arc's length-bound weight when it does not leave the
    /// demand's source
    pub hop_penalty: f64,
    pub blocking_allowed: bool,
    pub objective: ObjectiveMetric,
    /// Optional cap on the number of slices considered per link
    pub global_slice_limit: Option<NumSlices>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            demands_at_once: 1,
            partition_policy: PartitionPolicy::NoPartition,
            partition_load: 0,
            partition_slice: 0,
            preprocessing: PreprocessingLevel::Full,
            hop_penalty: 0.0,
            blocking_allowed: false,
            objective: ObjectiveMetric::SliceAtOrigin,
            global_slice_limit: None,
        }
    }
}

/// Shared network state: topology, slot occupancy, the demand list and the
/// batch cursor. Read-only while an engine builds and prunes; mutated exactly
/// once per round, at commit.
#[derive(Clone)]
pub struct Instance {
    nb_nodes: NumNodes,
    fibers: Vec<Fiber>,
    demands: Vec<Demand>,
    input: Input,
    next_demand_index: usize,
    demands_at_once: usize,
    was_blocked: bool,
}

impl Instance {
    /// Demand ids are expected to equal their position in `demands`; fiber
    /// indices their position in `fibers`.
    pub fn new(nb_nodes: NumNodes, fibers: Vec<Fiber>, demands: Vec<Demand>, input: Input) -> Self {
        debug_assert!(fibers.iter().enumerate().all(|(i, f)| f.index() as usize == i));
        debug_assert!(demands.iter().enumerate().all(|(i, d)| d.id as usize == i));
        Self {
            nb_nodes,
            fibers,
            demands,
            input,
            next_demand_index: 0,
            demands_at_once: input.demands_at_once,
            was_blocked: false,
        }
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.nb_nodes
    }

    pub fn number_of_links(&self) -> u32 {
        self.fibers.len() as u32
    }

    pub fn number_of_demands(&self) -> usize {
        self.demands.len()
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn fiber(&self, link: LinkLabel) -> &Fiber {
        &self.fibers[link as usize]
    }

    pub fn fibers(&self) -> &[Fiber] {
        &self.fibers
    }

    #[cfg(test)]
    pub(crate) fn fiber_mut(&mut self, link: LinkLabel) -> &mut Fiber {
        &mut self.fibers[link as usize]
    }

    pub fn demand(&self, id: DemandId) -> &Demand {
        &self.demands[id as usize]
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    /// The batch routed next: a window of `demands_at_once` demands starting
    /// at the cursor, clamped to the demand list.
    pub fn next_demands(&self) -> &[Demand] {
        let start = self.next_demand_index.min(self.demands.len());
        let end = start.saturating_add(self.demands_at_once).min(self.demands.len());
        &self.demands[start..end]
    }

    pub fn next_demand_index(&self) -> usize {
        self.next_demand_index
    }

    pub fn set_next_demand_index(&mut self, index: usize) {
        self.next_demand_index = index;
    }

    pub fn demands_at_once(&self) -> usize {
        self.demands_at_once
    }

    pub fn set_demands_at_once(&mut self, demands_at_once: usize) {
        self.demands_at_once = demands_at_once;
    }

    /// Set by the surrounding solver when a demand of the current round could
    /// not be routed; read back at commit time.
    pub fn record_blocking(&mut self) {
        self.was_blocked = true;
    }

    pub fn was_blocked(&self) -> bool {
        self.was_blocked
    }

    /// Whether slot `slice` on `link` can serve as the top slot of the
    /// demand's contiguous block, i.e. slots `slice-load+1 ..= slice` all
    /// exist and are free.
    pub fn has_enough_space(&self, link: LinkLabel, slice: SliceIndex, demand: &Demand) -> bool {
        let Some(first) = (slice + 1).checked_sub(demand.load) else {
            return false;
        };
        let fiber = self.fiber(link);
        (first..=slice).all(|s| !fiber.is_slice_used(s))
    }

    /// Marks the block of `demand`'s load ending at `slice` on `link` as used
    /// by that demand.
    pub fn assign_slices(&mut self, link: LinkLabel, slice: SliceIndex, demand: DemandId) {
        let load = self.demands[demand as usize].load;
        let first = (slice + 1).saturating_sub(load);
        let fiber = &mut self.fibers[link as usize];
        for s in first..=slice {
            fiber.assign_slice(s, demand);
        }
    }

    /// Number of slices of `link` the engine may materialize arcs for.
    pub fn slice_limit_on(&self, link: LinkLabel) -> NumSlices {
        let slices = self.fiber(link).number_of_slices();
        self.input.global_slice_limit.map_or(slices, |cap| slices.min(cap))
    }

    pub fn global_slice_limit(&self) -> NumSlices {
        self.fibers
            .iter()
            .map(|f| self.slice_limit_on(f.index()))
            .max()
            .unwrap_or(0)
    }

    pub fn max_used_slice_position_on(&self, link: LinkLabel) -> Option<SliceIndex> {
        self.fiber(link).max_used_slice_position()
    }

    /// Highest used slot position across the whole network.
    pub fn max_used_slice_position(&self) -> Option<SliceIndex> {
        self.fibers
            .iter()
            .filter_map(Fiber::max_used_slice_position)
            .max()
    }

    pub fn node_labels(&self) -> impl Iterator<Item = NodeLabel> + '_ {
        0..self.nb_nodes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_link_instance(slices: NumSlices, demands: Vec<Demand>, input: Input) -> Instance {
        let fibers = vec![
            Fiber::new(0, 0, 1, 1.0, slices),
            Fiber::new(1, 1, 2, 1.0, slices),
        ];
        Instance::new(3, fibers, demands, input)
    }

    #[test]
    fn space_check_respects_block_bottom() {
        let demand = Demand::new(0, 0, 2, 3, 100.0);
        let instance = two_link_instance(4, vec![demand], Input::default());

        // a load-3 block ending below slot 2 would leave the spectrum
        assert!(!instance.has_enough_space(0, 0, &demand));
        assert!(!instance.has_enough_space(0, 1, &demand));
        assert!(instance.has_enough_space(0, 2, &demand));
        assert!(instance.has_enough_space(0, 3, &demand));
    }

    #[test]
    fn space_check_sees_occupied_slots() {
        let demand = Demand::new(0, 0, 2, 2, 100.0);
        let mut instance = two_link_instance(4, vec![demand], Input::default());
        instance.fiber_mut(0).assign_slice(1, 9);

        assert!(!instance.has_enough_space(0, 1, &demand));
        assert!(!instance.has_enough_space(0, 2, &demand));
        assert!(instance.has_enough_space(0, 3, &demand));
        assert!(instance.has_enough_space(1, 1, &demand));
    }

    #[test]
    fn assign_slices_writes_the_whole_block() {
        let demand = Demand::new(0, 0, 2, 3, 100.0);
        let mut instance = two_link_instance(4, vec![demand], Input::default());

        instance.assign_slices(0, 3, 0);
        assert_eq!(instance.fiber(0).assignment(0), None);
        for s in 1..=3 {
            assert_eq!(instance.fiber(0).assignment(s), Some(0));
        }
        assert_eq!(instance.max_used_slice_position(), Some(3));
        assert_eq!(instance.max_used_slice_position_on(1), None);
    }

    #[test]
    fn slice_limits_honor_the_cap() {
        let demand = Demand::new(0, 0, 2, 1, 100.0);
        let mut input = Input::default();
        let instance = two_link_instance(8, vec![demand], input);
        assert_eq!(instance.slice_limit_on(0), 8);
        assert_eq!(instance.global_slice_limit(), 8);

        input.global_slice_limit = Some(5);
        let instance = two_link_instance(8, vec![demand], input);
        assert_eq!(instance.slice_limit_on(0), 5);
        assert_eq!(instance.global_slice_limit(), 5);
    }

    #[test]
    fn batch_window_is_clamped() {
        let demands = (0..5)
            .map(|id| Demand::new(id, 0, 2, 1, 100.0))
            .collect::<Vec<_>>();
        let mut input = Input::default();
        input.demands_at_once = 2;
        let mut instance = two_link_instance(4, demands, input);

        assert_eq!(instance.next_demands().len(), 2);
        instance.set_next_demand_index(4);
        assert_eq!(instance.next_demands().len(), 1);
        instance.set_next_demand_index(17);
        assert!(instance.next_demands().is_empty());
    }

    #[test]
    fn selector_parsing() {
        assert_eq!("hard".parse(), Ok(PartitionPolicy::Hard));
        assert_eq!("1p".parse(), Ok(ObjectiveMetric::LinkMaxUsedSlice));
        assert_eq!("partial".parse(), Ok(PreprocessingLevel::Partial));
        assert!(PreprocessingLevel::Partial < PreprocessingLevel::Full);

        assert!("medium".parse::<PreprocessingLevel>().is_err());
        assert!("3".parse::<ObjectiveMetric>().is_err());
        assert!("firm".parse::<PartitionPolicy>().is_err());
    }
}
