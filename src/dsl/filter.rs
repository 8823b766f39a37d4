//! Direct and neighbour-relative node predicates. Grounded on
//! `original_source/filter.c` (`filter_by_color`, `filter_by_size`,
//! `filter_by_degree`) and `original_source/src/binding.c`'s
//! `bind_neighbor_*` family, generalized here into filter predicates as
//! named by the `by_neighbor_*` row of the filter table.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::types::{Color, NodeId, Size};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Filter {
    ByColor { color: Color, exclude: bool },
    BySize { size: Size, exclude: bool },
    ByDegree { degree: usize, exclude: bool },
    ByNeighborColor { color: Color, exclude: bool },
    ByNeighborSize { size: Size, exclude: bool },
    ByNeighborDegree { degree: usize, exclude: bool },
}

impl Filter {
    pub fn test(&self, graph: &Graph, node: NodeId) -> bool {
        match *self {
            Filter::ByColor { color, exclude } => test_color(graph, node, color, exclude),
            Filter::BySize { size, exclude } => test_size(graph, node, size, exclude),
            Filter::ByDegree { degree, exclude } => test_degree(graph, node, degree, exclude),
            Filter::ByNeighborColor { color, exclude } => any_neighbor(graph, node, |g, peer| test_color(g, peer, color, exclude)),
            Filter::ByNeighborSize { size, exclude } => any_neighbor(graph, node, |g, peer| test_size(g, peer, size, exclude)),
            Filter::ByNeighborDegree { degree, exclude } => any_neighbor(graph, node, |g, peer| test_degree(g, peer, degree, exclude)),
        }
    }
}

fn any_neighbor(graph: &Graph, node: NodeId, pred: impl Fn(&Graph, NodeId) -> bool) -> bool {
    let Some(n) = graph.get_node(node) else { return false };
    n.edges.iter().any(|eid| {
        graph
            .get_edge(*eid)
            .map(|edge| pred(graph, edge.peer(node)))
            .unwrap_or(false)
    })
}

fn test_color(graph: &Graph, node: NodeId, color: Color, exclude: bool) -> bool {
    let Some(n) = graph.get_node(node) else { return false };
    let resolved = graph.resolve_color(color);
    if graph.is_multicolor {
        let present = n.subnodes.iter().any(|sn| sn.color == resolved);
        present != exclude
    } else {
        let first = n.subnodes.first().map(|sn| sn.color == resolved).unwrap_or(false);
        first != exclude
    }
}

/// `MAX_SIZE`/`MIN_SIZE` ignore the exclude flag, matching `filter_by_size`
/// in the source engine, which returns the comparison unconditionally for
/// those two sentinels; `exclude` is honoured for `Odd` and literal sizes.
fn test_size(graph: &Graph, node: NodeId, size: Size, exclude: bool) -> bool {
    let Some(n) = graph.get_node(node) else { return false };
    let count = n.n_subnodes();
    match size {
        Size::Odd => {
            if exclude {
                count % 2 == 0
            } else {
                count % 2 != 0
            }
        }
        Size::Max => count == graph.derived_properties().max_size,
        Size::Min => count == graph.derived_properties().min_size,
        Size::Literal(s) => {
            if exclude {
                count != s as usize
            } else {
                count == s as usize
            }
        }
    }
}

fn test_degree(graph: &Graph, node: NodeId, degree: usize, exclude: bool) -> bool {
    let Some(n) = graph.get_node(node) else { return false };
    if exclude {
        n.n_edges() != degree
    } else {
        n.n_edges() == degree
    }
}

/// An AND-conjunction of filters, replacing the source engine's linked
/// `filter_call_t` chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterChain(pub Vec<Filter>);

impl FilterChain {
    pub fn matches(&self, graph: &Graph, node: NodeId) -> bool {
        self.0.iter().all(|f| f.test(graph, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::{Abstraction, ConnectedComponents};
    use crate::graph::graph_from_grid;

    #[test]
    fn by_color_matches_literal() {
        let grid = vec![vec![1, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let node = g.node_ids()[0];
        assert!(Filter::ByColor { color: Color::Literal(1), exclude: false }.test(&g, node));
        assert!(!Filter::ByColor { color: Color::Literal(2), exclude: false }.test(&g, node));
    }

    #[test]
    fn by_size_max_ignores_exclude() {
        let grid = vec![vec![1, 1, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        for (id, node) in out.nodes() {
            let expect = node.n_subnodes() == out.derived_properties().max_size;
            assert_eq!(Filter::BySize { size: Size::Max, exclude: true }.test(&out, id), expect);
        }
    }

    #[test]
    fn by_neighbor_color_checks_edges() {
        let grid = vec![vec![1, 0, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        let color1 = out.nodes().find(|(_, n)| n.subnodes[0].color == 1).unwrap().0;
        assert!(Filter::ByNeighborColor { color: Color::Literal(2), exclude: false }.test(&out, color1));
        assert!(!Filter::ByNeighborColor { color: Color::Literal(9), exclude: false }.test(&out, color1));
    }
}
