use std::io::Write;

use crate::graph::extended::{ExtNode, ExtendedGraph};

/// Produces a minimalistic DOT representation of a layered demand graph.
/// Contracted terminals render with a `_contracted` suffix in place of their
/// slice.
pub trait DotWriter {
    fn try_write_dot<W: Write>(&self, writer: W) -> Result<(), std::io::Error>;
}

impl DotWriter for ExtendedGraph {
    fn try_write_dot<W: Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        writeln!(writer, "digraph G {{")?;
        for (_, node) in self.nodes() {
            writeln!(writer, "  {};", node_name(node))?;
        }
        for (_, arc) in self.arcs() {
            writeln!(
                writer,
                "  {} -> {} [label=\"l{} s{}\"];",
                node_name(self.node(arc.source)),
                node_name(self.node(arc.target)),
                arc.link,
                arc.slice
            )?;
        }
        writeln!(writer, "}}")
    }
}

fn node_name(node: &ExtNode) -> String {
    match node.slice {
        Some(slice) => format!("v{}s{}", node.label, slice),
        None => format!("v{}s_contracted", node.label),
    }
}
