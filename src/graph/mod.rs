pub mod compact;
pub mod extended;
pub mod shortest_path;

/// Handle into the node arena of one layered graph
pub type Node = u32;
/// Handle into the arc arena of one layered graph
pub type Arc = u32;
pub type NumNodes = Node;
pub type NumArcs = Arc;

/// Label of a physical node; shared by all layered copies of that node
pub type NodeLabel = u32;
/// Index of a physical link in the instance
pub type LinkLabel = u32;
/// Position of a frequency slot on a link
pub type SliceIndex = u32;
pub type NumSlices = SliceIndex;

pub use compact::{CompactEdge, CompactGraph, CompactNode};
pub use extended::{ExtArc, ExtNode, ExtendedGraph};
pub use shortest_path::ShortestPaths;
