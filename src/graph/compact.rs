use super::{LinkLabel, Node, NodeLabel, NumArcs, NumNodes};

#[derive(Clone, Copy, Debug)]
pub struct CompactNode {
    pub id: Node,
    pub label: NodeLabel,
}

#[derive(Clone, Copy, Debug)]
pub struct CompactEdge {
    pub id: u32,
    pub label: LinkLabel,
    pub source: NodeLabel,
    pub target: NodeLabel,
    pub length: f64,
}

/// Plain undirected mirror of the physical topology, independent of any
/// demand or slice. Serves topology-level queries for the solver's
/// cut-generation side; carries no routing logic.
#[derive(Clone, Default)]
pub struct CompactGraph {
    nodes: Vec<CompactNode>,
    edges: Vec<CompactEdge>,
}

impl CompactGraph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_node(&mut self, label: NodeLabel) -> Node {
        let id = self.nodes.len() as Node;
        self.nodes.push(CompactNode { id, label });
        id
    }

    pub fn add_edge(&mut self, label: LinkLabel, source: NodeLabel, target: NodeLabel, length: f64) -> u32 {
        let id = self.edges.len() as u32;
        self.edges.push(CompactEdge {
            id,
            label,
            source,
            target,
            length,
        });
        id
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.nodes.len() as NumNodes
    }

    pub fn number_of_edges(&self) -> u32 {
        self.edges.len() as u32
    }

    pub fn nodes(&self) -> &[CompactNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CompactEdge] {
        &self.edges
    }

    pub fn degree(&self, label: NodeLabel) -> NumNodes {
        self.edges
            .iter()
            .filter(|e| e.source == label || e.target == label)
            .count() as NumNodes
    }

    /// Number of edges with exactly one endpoint inside `labels`.
    pub fn cut_cardinality(&self, labels: &[NodeLabel]) -> NumArcs {
        self.edges
            .iter()
            .filter(|e| labels.contains(&e.source) != labels.contains(&e.target))
            .count() as NumArcs
    }
}
