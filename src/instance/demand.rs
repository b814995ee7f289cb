use super::{DemandId, Load};
use crate::graph::NodeLabel;

/// A traffic demand: `load` contiguous slots at the same position on every
/// link of a source-target path whose total length stays within `max_length`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Demand {
    pub id: DemandId,
    pub source: NodeLabel,
    pub target: NodeLabel,
    pub load: Load,
    pub max_length: f64,
}

impl Demand {
    pub fn new(id: DemandId, source: NodeLabel, target: NodeLabel, load: Load, max_length: f64) -> Self {
        Self {
            id,
            source,
            target,
            load,
            max_length,
        }
    }
}
