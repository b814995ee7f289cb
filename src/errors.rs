use std::error::Error;

use thiserror::Error as ThisError;

/// Trait for checking invariants in datastructures
pub trait InvariantCheck<E: Error> {
    fn is_correct(&self) -> Result<(), E>;
}

/// Rejected run-configuration selectors. These abort startup; a bad selector
/// is a configuration mistake, not a runtime condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("unknown objective metric selector {0:?}")]
    UnknownObjectiveMetric(String),
    #[error("unknown partition policy selector {0:?}")]
    UnknownPartitionPolicy(String),
    #[error("unknown preprocessing level selector {0:?}")]
    UnknownPreprocessingLevel(String),
}

/// Violated invariants of the layered graph store.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum GraphInvariantError {
    #[error("arc {0} connects nodes of different slices")]
    MixedSliceArc(u32),
    #[error("arc {0} has a freed endpoint or is not registered at both endpoints")]
    DanglingArc(u32),
    #[error("the (label, slice) lookup table disagrees with the node arena")]
    StaleLookup,
}
