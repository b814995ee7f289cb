use super::DemandId;
use crate::graph::{LinkLabel, NodeLabel, NumSlices, SliceIndex};

/// A physical link. The shape (endpoints, length, slot count) is immutable;
/// slot occupancy is the only mutable part and belongs to the owning
/// instance.
#[derive(Clone, Debug)]
pub struct Fiber {
    index: LinkLabel,
    source: NodeLabel,
    target: NodeLabel,
    length: f64,
    slots: Vec<Option<DemandId>>,
}

impl Fiber {
    pub fn new(index: LinkLabel, source: NodeLabel, target: NodeLabel, length: f64, nb_slices: NumSlices) -> Self {
        Self {
            index,
            source,
            target,
            length,
            slots: vec![None; nb_slices as usize],
        }
    }

    pub fn index(&self) -> LinkLabel {
        self.index
    }

    pub fn source(&self) -> NodeLabel {
        self.source
    }

    pub fn target(&self) -> NodeLabel {
        self.target
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn number_of_slices(&self) -> NumSlices {
        self.slots.len() as NumSlices
    }

    pub fn is_slice_used(&self, slice: SliceIndex) -> bool {
        self.slots[slice as usize].is_some()
    }

    pub fn assignment(&self, slice: SliceIndex) -> Option<DemandId> {
        self.slots[slice as usize]
    }

    pub(crate) fn assign_slice(&mut self, slice: SliceIndex, demand: DemandId) {
        self.slots[slice as usize] = Some(demand);
    }

    /// Highest used slot position, if any slot is used at all.
    pub fn max_used_slice_position(&self) -> Option<SliceIndex> {
        self.slots
            .iter()
            .rposition(|slot| slot.is_some())
            .map(|pos| pos as SliceIndex)
    }
}
