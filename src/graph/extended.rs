use fxhash::FxHashMap;
use smallvec::SmallVec;

use super::{Arc, LinkLabel, Node, NodeLabel, NumArcs, NumNodes, SliceIndex};
use crate::{
    errors::{GraphInvariantError, InvariantCheck},
    instance::DemandId,
};

type ArcList = SmallVec<[Arc; 4]>;

/// Node of a layered graph: one copy of a physical node per slice.
/// `slice == None` is the degenerate value carried by a canonical node after
/// terminal contraction.
#[derive(Clone, Debug)]
pub struct ExtNode {
    pub label: NodeLabel,
    pub slice: Option<SliceIndex>,
    /// Graph-local ordinal, assigned once pruning has converged.
    pub local_index: Node,
    out_arcs: ArcList,
    in_arcs: ArcList,
}

impl ExtNode {
    pub fn is_contracted(&self) -> bool {
        self.slice.is_none()
    }

    pub fn out_arcs(&self) -> &[Arc] {
        &self.out_arcs
    }

    pub fn in_arcs(&self) -> &[Arc] {
        &self.in_arcs
    }
}

/// Directed arc between two nodes of the same slice, mirroring one direction
/// of a physical link at that slice.
#[derive(Clone, Debug)]
pub struct ExtArc {
    pub source: Node,
    pub target: Node,
    pub link: LinkLabel,
    pub slice: SliceIndex,
    pub length: f64,
    /// `length`, plus the hop penalty on arcs not leaving the demand's
    /// source. Input to the length-bound pruning only, never an objective.
    pub length_with_penalty: f64,
    /// Dense solver variable id, assigned once pruning has converged.
    pub var_id: Option<u32>,
    /// Demand occupying this arc in the committed solution, if any.
    pub on_path: Option<DemandId>,
}

/// Arena-backed layered digraph. Nodes and arcs live in slot vectors addressed
/// by dense `u32` handles; erased slots go to a free list and may be reused.
/// Iteration is in arena order, which makes every downstream index assignment
/// deterministic.
#[derive(Clone, Default)]
pub struct ExtendedGraph {
    nodes: Vec<Option<ExtNode>>,
    arcs: Vec<Option<ExtArc>>,
    free_nodes: Vec<Node>,
    free_arcs: Vec<Arc>,
    by_label_slice: FxHashMap<(NodeLabel, SliceIndex), Node>,
    num_nodes: NumNodes,
    num_arcs: NumArcs,
}

impl ExtendedGraph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.num_nodes
    }

    pub fn number_of_arcs(&self) -> NumArcs {
        self.num_arcs
    }

    /// Upper bound on node handles, including freed slots. Sized for
    /// handle-indexed scratch arrays.
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// ** Panics on a freed handle **
    pub fn node(&self, v: Node) -> &ExtNode {
        self.nodes[v as usize].as_ref().expect("stale node handle")
    }

    fn node_mut(&mut self, v: Node) -> &mut ExtNode {
        self.nodes[v as usize].as_mut().expect("stale node handle")
    }

    /// ** Panics on a freed handle **
    pub fn arc(&self, a: Arc) -> &ExtArc {
        self.arcs[a as usize].as_ref().expect("stale arc handle")
    }

    pub fn arc_mut(&mut self, a: Arc) -> &mut ExtArc {
        self.arcs[a as usize].as_mut().expect("stale arc handle")
    }

    pub fn has_arc(&self, a: Arc) -> bool {
        self.arcs.get(a as usize).is_some_and(|slot| slot.is_some())
    }

    pub fn find_node(&self, label: NodeLabel, slice: SliceIndex) -> Option<Node> {
        self.by_label_slice.get(&(label, slice)).copied()
    }

    /// Returns the node `(label, slice)`, creating it if absent. There is
    /// never more than one node per `(label, slice)` pair.
    pub fn node_or_insert(&mut self, label: NodeLabel, slice: SliceIndex) -> Node {
        if let Some(v) = self.find_node(label, slice) {
            return v;
        }

        let record = ExtNode {
            label,
            slice: Some(slice),
            local_index: 0,
            out_arcs: ArcList::new(),
            in_arcs: ArcList::new(),
        };
        let v = match self.free_nodes.pop() {
            Some(v) => {
                self.nodes[v as usize] = Some(record);
                v
            }
            None => {
                self.nodes.push(Some(record));
                (self.nodes.len() - 1) as Node
            }
        };
        self.by_label_slice.insert((label, slice), v);
        self.num_nodes += 1;
        v
    }

    /// ** Panics if an endpoint does not live on `slice` **
    pub fn add_arc(
        &mut self,
        source: Node,
        target: Node,
        link: LinkLabel,
        slice: SliceIndex,
        length: f64,
        length_with_penalty: f64,
    ) -> Arc {
        assert_eq!(self.node(source).slice, Some(slice));
        assert_eq!(self.node(target).slice, Some(slice));

        let record = ExtArc {
            source,
            target,
            link,
            slice,
            length,
            length_with_penalty,
            var_id: None,
            on_path: None,
        };
        let a = match self.free_arcs.pop() {
            Some(a) => {
                self.arcs[a as usize] = Some(record);
                a
            }
            None => {
                self.arcs.push(Some(record));
                (self.arcs.len() - 1) as Arc
            }
        };
        self.node_mut(source).out_arcs.push(a);
        self.node_mut(target).in_arcs.push(a);
        self.num_arcs += 1;
        a
    }

    /// Unlinks the arc from both endpoints and frees its slot. Endpoint nodes
    /// stay, even if this leaves them isolated.
    pub fn erase_arc(&mut self, a: Arc) {
        let arc = self.arcs[a as usize].take().expect("stale arc handle");
        self.node_mut(arc.source).out_arcs.retain(|x| *x != a);
        self.node_mut(arc.target).in_arcs.retain(|x| *x != a);
        self.free_arcs.push(a);
        self.num_arcs -= 1;
    }

    /// Turns `v` into a canonical terminal: its slice becomes the degenerate
    /// marker and it leaves the `(label, slice)` lookup.
    pub fn mark_contracted(&mut self, v: Node) {
        let node = self.nodes[v as usize].as_mut().expect("stale node handle");
        if let Some(slice) = node.slice.take() {
            self.by_label_slice.remove(&(node.label, slice));
        }
    }

    /// Redirects every arc incident to `dying` onto `survivor`, then frees
    /// the `dying` slot. Arcs between the two become self-loops and are kept.
    pub fn contract(&mut self, survivor: Node, dying: Node) {
        assert_ne!(survivor, dying);
        let dead = self.nodes[dying as usize].take().expect("stale node handle");
        if let Some(slice) = dead.slice {
            self.by_label_slice.remove(&(dead.label, slice));
        }

        for &a in &dead.out_arcs {
            self.arcs[a as usize].as_mut().expect("stale arc handle").source = survivor;
        }
        for &a in &dead.in_arcs {
            self.arcs[a as usize].as_mut().expect("stale arc handle").target = survivor;
        }

        let surviving = self.nodes[survivor as usize]
            .as_mut()
            .expect("stale node handle");
        surviving.out_arcs.extend(dead.out_arcs);
        surviving.in_arcs.extend(dead.in_arcs);

        self.free_nodes.push(dying);
        self.num_nodes -= 1;
    }

    /// Assigns graph-local ordinals `0..number_of_nodes()` in arena order.
    pub fn assign_local_indices(&mut self) {
        let mut next = 0;
        for slot in &mut self.nodes {
            if let Some(node) = slot.as_mut() {
                node.local_index = next;
                next += 1;
            }
        }
    }

    pub fn node_ids(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i as Node))
    }

    pub fn arc_ids(&self) -> impl Iterator<Item = Arc> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i as Arc))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (Node, &ExtNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (i as Node, node)))
    }

    pub fn arcs(&self) -> impl Iterator<Item = (Arc, &ExtArc)> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|arc| (i as Arc, arc)))
    }

    pub fn nodes_with_label(&self, label: NodeLabel) -> impl Iterator<Item = Node> + '_ {
        self.nodes().filter_map(move |(v, node)| (node.label == label).then_some(v))
    }

    pub fn arcs_with_link(&self, link: LinkLabel) -> impl Iterator<Item = Arc> + '_ {
        self.arcs().filter_map(move |(a, arc)| (arc.link == link).then_some(a))
    }
}

impl InvariantCheck<GraphInvariantError> for ExtendedGraph {
    fn is_correct(&self) -> Result<(), GraphInvariantError> {
        let live_node = |v: Node| self.nodes.get(v as usize).and_then(|slot| slot.as_ref());

        for (a, arc) in self.arcs() {
            let (Some(source), Some(target)) = (live_node(arc.source), live_node(arc.target))
            else {
                return Err(GraphInvariantError::DanglingArc(a));
            };
            for endpoint in [source, target] {
                if endpoint.slice.is_some_and(|s| s != arc.slice) {
                    return Err(GraphInvariantError::MixedSliceArc(a));
                }
            }
            if !source.out_arcs.contains(&a) || !target.in_arcs.contains(&a) {
                return Err(GraphInvariantError::DanglingArc(a));
            }
        }

        for (&(label, slice), &v) in &self.by_label_slice {
            let matches = live_node(v).is_some_and(|n| n.label == label && n.slice == Some(slice));
            if !matches {
                return Err(GraphInvariantError::StaleLookup);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    fn arc_pair(graph: &mut ExtendedGraph, u: NodeLabel, v: NodeLabel, link: LinkLabel, slice: SliceIndex) -> (Arc, Arc) {
        let s = graph.node_or_insert(u, slice);
        let t = graph.node_or_insert(v, slice);
        let fwd = graph.add_arc(s, t, link, slice, 1.0, 1.0);
        let bwd = graph.add_arc(t, s, link, slice, 1.0, 1.0);
        (fwd, bwd)
    }

    #[test]
    fn no_duplicate_nodes_per_label_slice() {
        let mut graph = ExtendedGraph::new();
        let a = graph.node_or_insert(3, 1);
        let b = graph.node_or_insert(3, 1);
        let c = graph.node_or_insert(3, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.number_of_nodes(), 2);
        assert!(graph.is_correct().is_ok());
    }

    #[test]
    fn erase_arc_unlinks_endpoints() {
        let mut graph = ExtendedGraph::new();
        let (fwd, bwd) = arc_pair(&mut graph, 0, 1, 0, 0);
        assert_eq!(graph.number_of_arcs(), 2);

        graph.erase_arc(fwd);
        assert_eq!(graph.number_of_arcs(), 1);
        assert!(!graph.has_arc(fwd));
        assert!(graph.has_arc(bwd));

        let u = graph.find_node(0, 0).unwrap();
        assert!(graph.node(u).out_arcs().is_empty());
        assert_eq!(graph.node(u).in_arcs(), &[bwd]);
        assert!(graph.is_correct().is_ok());
    }

    #[test]
    fn freed_arc_slot_is_reused() {
        let mut graph = ExtendedGraph::new();
        let (fwd, _) = arc_pair(&mut graph, 0, 1, 0, 0);
        graph.erase_arc(fwd);

        let u = graph.find_node(0, 0).unwrap();
        let v = graph.find_node(1, 0).unwrap();
        let again = graph.add_arc(u, v, 0, 0, 2.0, 2.0);
        assert_eq!(again, fwd);
        assert_eq!(graph.number_of_arcs(), 2);
        assert!(graph.is_correct().is_ok());
    }

    #[test]
    fn contract_redirects_incident_arcs() {
        // label 0 appears on slices 0 and 1; both copies keep their arcs
        let mut graph = ExtendedGraph::new();
        arc_pair(&mut graph, 0, 1, 0, 0);
        arc_pair(&mut graph, 0, 1, 0, 1);

        let copies = graph.nodes_with_label(0).collect_vec();
        assert_eq!(copies.len(), 2);
        let (canonical, dying) = (copies[0], copies[1]);

        graph.mark_contracted(canonical);
        graph.contract(canonical, dying);

        assert_eq!(graph.number_of_nodes(), 3);
        assert_eq!(graph.number_of_arcs(), 4);
        assert!(graph.node(canonical).is_contracted());
        assert_eq!(graph.node(canonical).out_arcs().len(), 2);
        assert_eq!(graph.node(canonical).in_arcs().len(), 2);
        assert_eq!(graph.find_node(0, 0), None);
        assert_eq!(graph.find_node(0, 1), None);
        assert!(graph.is_correct().is_ok());
    }

    #[test]
    fn contract_keeps_self_loops() {
        let mut graph = ExtendedGraph::new();
        let (fwd, bwd) = arc_pair(&mut graph, 0, 1, 0, 0);
        let u = graph.find_node(0, 0).unwrap();
        let v = graph.find_node(1, 0).unwrap();

        graph.mark_contracted(u);
        graph.contract(u, v);

        assert_eq!(graph.number_of_arcs(), 2);
        for a in [fwd, bwd] {
            assert_eq!(graph.arc(a).source, u);
            assert_eq!(graph.arc(a).target, u);
        }
        assert!(graph.is_correct().is_ok());
    }

    #[test]
    fn lookup_by_label_and_link() {
        let mut graph = ExtendedGraph::new();
        arc_pair(&mut graph, 0, 1, 0, 0);
        arc_pair(&mut graph, 1, 2, 1, 0);
        arc_pair(&mut graph, 1, 2, 1, 1);

        assert_eq!(graph.nodes_with_label(1).count(), 2);
        assert_eq!(graph.nodes_with_label(7).count(), 0);
        assert_eq!(graph.arcs_with_link(1).count(), 4);
        let (fwd, _) = arc_pair(&mut graph, 2, 0, 2, 0);
        graph.erase_arc(fwd);
        assert_eq!(graph.arcs_with_link(2).count(), 1);
    }

    #[test]
    fn local_indices_are_dense_after_erasures() {
        let mut graph = ExtendedGraph::new();
        arc_pair(&mut graph, 0, 1, 0, 0);
        arc_pair(&mut graph, 1, 2, 1, 0);
        let dying = graph.find_node(1, 0).unwrap();
        let survivor = graph.find_node(0, 0).unwrap();
        graph.contract(survivor, dying);

        graph.assign_local_indices();
        let mut ordinals = graph.nodes().map(|(_, n)| n.local_index).collect_vec();
        ordinals.sort_unstable();
        assert_eq!(ordinals, (0..graph.number_of_nodes()).collect_vec());
    }
}
