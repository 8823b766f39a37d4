//! Resolves a related node for dynamic parameter substitution. Grounded on
//! `original_source/src/binding.c`.

use serde::{Deserialize, Serialize};

use super::filter::Filter;
use crate::graph::Graph;
use crate::types::{Color, NodeId, Size};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Binding {
    NodeBySize { size: Size, exclude: bool },
    NeighborBySize { size: Size, exclude: bool },
    NeighborByColor { color: Color, exclude: bool },
    NeighborByDegree { degree: usize, exclude: bool },
}

impl Binding {
    /// `from` is ignored by `NodeBySize`, matching `bind_node_by_size`
    /// scanning every node in the graph regardless of the passed-in node.
    pub fn resolve(&self, graph: &Graph, from: NodeId) -> Option<NodeId> {
        match *self {
            Binding::NodeBySize { size, exclude } => {
                let filter = Filter::BySize { size, exclude };
                graph.node_ids().into_iter().find(|id| filter.test(graph, *id))
            }
            Binding::NeighborBySize { size, exclude } => {
                first_neighbor(graph, from, Filter::BySize { size, exclude })
            }
            Binding::NeighborByColor { color, exclude } => {
                first_neighbor(graph, from, Filter::ByColor { color, exclude })
            }
            Binding::NeighborByDegree { degree, exclude } => {
                first_neighbor(graph, from, Filter::ByDegree { degree, exclude })
            }
        }
    }
}

fn first_neighbor(graph: &Graph, from: NodeId, filter: Filter) -> Option<NodeId> {
    let node = graph.get_node(from)?;
    for eid in &node.edges {
        let edge = graph.get_edge(*eid)?;
        let peer = edge.peer(from);
        if filter.test(graph, peer) {
            return Some(peer);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::{Abstraction, ConnectedComponents};
    use crate::graph::graph_from_grid;

    #[test]
    fn neighbor_by_color_finds_adjacent_component() {
        let grid = vec![vec![1, 0, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        let color1 = out.nodes().find(|(_, n)| n.subnodes[0].color == 1).unwrap().0;
        let bound = Binding::NeighborByColor { color: Color::Literal(2), exclude: false }.resolve(&out, color1);
        assert!(bound.is_some());
        assert_eq!(out.get_node(bound.unwrap()).unwrap().subnodes[0].color, 2);
    }

    #[test]
    fn node_by_size_ignores_from() {
        let grid = vec![vec![1, 1, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        let any = out.node_ids()[0];
        let found = Binding::NodeBySize { size: Size::Literal(1), exclude: false }.resolve(&out, any);
        assert!(found.is_some());
    }
}
