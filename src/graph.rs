//! The node/subnode/edge multigraph that abstractions build and the DSL
//! operates over. Grounded on `original_source/src/graph.h` and
//! `original_source/src/image.c`.

use std::cell::Cell;
use std::collections::HashMap;

use crate::arena::Arena;
use crate::errors::{GPError, GPResult};
use crate::types::{Coordinate, EdgeDirection, EdgeId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnode {
    pub coord: Coordinate,
    pub color: u8,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// The node's own identifying coordinate (distinct from its subnodes'
    /// coordinates) — e.g. `(pri, sec)` for a per-pixel node, `(color,
    /// component_index)` for a connected-components node. This is the key
    /// `add_node` also stores the node under in the graph's coordinate index.
    pub coord: Coordinate,
    pub subnodes: Vec<Subnode>,
    pub edges: Vec<EdgeId>,
}

impl Node {
    pub fn n_subnodes(&self) -> usize {
        self.subnodes.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub direction: EdgeDirection,
}

impl Edge {
    /// The node on the other side of this edge from `from`.
    pub fn peer(&self, from: NodeId) -> NodeId {
        if self.a == from {
            self.b
        } else {
            self.a
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedProperties {
    pub histogram: [usize; 10],
    pub background_color: u8,
    pub most_common_color: u8,
    pub least_common_color: u8,
    pub min_size: usize,
    pub max_size: usize,
}

/// `NODES_ALLOC`/`EDGES_ALLOC` in `graph.h` size the source engine's node
/// and edge arenas; this crate keeps the same ceilings.
pub const NODES_ALLOC: usize = 1024;
pub const EDGES_ALLOC: usize = 4096;

#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Arena<Node>,
    edges: Arena<Edge>,
    index: HashMap<Coordinate, NodeId>,
    /// Width/height of the grid this graph was abstracted from (needed to
    /// reconstruct a grid via `undo_abstraction` and to bounds-check moves).
    pub width: usize,
    pub height: usize,
    /// True when a node may hold subnodes of more than one colour (the
    /// "no abstraction" graph); false for per-colour connected-components
    /// graphs. Mirrors `graph_t::is_multicolor`, which `filter_by_color`
    /// branches on.
    pub is_multicolor: bool,
    derived: Cell<Option<DerivedProperties>>,
}

impl Graph {
    pub fn new(width: usize, height: usize, is_multicolor: bool) -> Self {
        Graph {
            nodes: Arena::with_capacity("node", NODES_ALLOC),
            edges: Arena::with_capacity("edge", EDGES_ALLOC),
            index: HashMap::new(),
            width,
            height,
            is_multicolor,
            derived: Cell::new(None),
        }
    }

    pub fn add_node(&mut self, coord: Coordinate, subnodes: Vec<Subnode>) -> GPResult<NodeId> {
        self.derived.set(None);
        let node = Node { coord, subnodes, edges: Vec::new() };
        let idx = self.nodes.insert(node)?;
        let node_id = NodeId(idx);
        self.index.insert(coord, node_id);
        Ok(node_id)
    }

    pub fn remove_node(&mut self, id: NodeId) {
        self.derived.set(None);
        if let Some(node) = self.nodes.get(id.0).cloned() {
            for edge_id in node.edges {
                self.remove_edge(edge_id);
            }
        }
        self.nodes.remove(id.0);
        self.index.retain(|_, v| *v != id);
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.derived.set(None);
        self.nodes.get_mut(id.0)
    }

    pub fn node_by_coord(&self, coord: Coordinate) -> Option<NodeId> {
        self.index.get(&coord).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(|(id, _)| id).collect()
    }

    pub fn add_edge(&mut self, a: NodeId, b: NodeId, direction: EdgeDirection) -> GPResult<EdgeId> {
        let edge = Edge { a, b, direction };
        let idx = self.edges.insert(edge)?;
        let edge_id = EdgeId(idx);
        if let Some(node) = self.get_node_mut(a) {
            node.edges.push(edge_id);
        }
        if let Some(node) = self.get_node_mut(b) {
            node.edges.push(edge_id);
        }
        Ok(edge_id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) {
        if let Some(edge) = self.edges.get(id.0).cloned() {
            for end in [edge.a, edge.b] {
                if let Some(node) = self.nodes.get_mut(end.0) {
                    node.edges.retain(|e| *e != id);
                }
            }
        }
        self.edges.remove(id.0);
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.get_node(a)
            .map(|node| node.edges.iter().any(|eid| self.get_edge(*eid).map(|e| e.peer(a) == b).unwrap_or(false)))
            .unwrap_or(false)
    }

    /// Recomputes and caches colour/size derived properties if dirty.
    /// `if (counts[0] > 0) background = 0 else background = most_common` is
    /// preserved literally from `graph.h`'s `get_derived_properties`, as is
    /// the non-strict `>=`/`<=` tie-break that favours the highest colour
    /// index.
    pub fn derived_properties(&self) -> DerivedProperties {
        if let Some(props) = self.derived.get() {
            return props;
        }
        let props = self.compute_derived_properties();
        self.derived.set(Some(props));
        props
    }

    /// Same computation as `derived_properties`, without populating the
    /// cache; both exist for symmetry but `derived_properties` should
    /// normally be preferred.
    pub fn compute_derived_properties(&self) -> DerivedProperties {
        let mut histogram = [0usize; 10];
        let mut min_size = usize::MAX;
        let mut max_size = 0usize;
        for (_, node) in self.nodes() {
            let n = node.n_subnodes();
            min_size = min_size.min(n);
            max_size = max_size.max(n);
            for sn in &node.subnodes {
                if (sn.color as usize) < 10 {
                    histogram[sn.color as usize] += 1;
                }
            }
        }
        if min_size == usize::MAX {
            min_size = 0;
        }
        let mut max_count = 0usize;
        let mut most_common = 0u8;
        let mut min_count = usize::MAX;
        let mut least_common = 0u8;
        for color in 0..10u8 {
            let count = histogram[color as usize];
            if count >= max_count {
                max_count = count;
                most_common = color;
            }
            if count > 0 && count <= min_count {
                min_count = count;
                least_common = color;
            }
        }
        let background_color = if histogram[0] > 0 { 0 } else { most_common };
        DerivedProperties {
            histogram,
            background_color,
            most_common_color: most_common,
            least_common_color: least_common,
            min_size,
            max_size,
        }
    }

    pub fn resolve_color(&self, color: crate::types::Color) -> u8 {
        use crate::types::Color;
        match color {
            Color::Literal(c) => c,
            Color::Background => self.derived_properties().background_color,
            Color::MostCommon => self.derived_properties().most_common_color,
            Color::LeastCommon => self.derived_properties().least_common_color,
        }
    }
}

/// A dense, row-major colour grid: the external representation tasks are
/// loaded as and compared against.
pub type Grid = Vec<Vec<u8>>;

/// Builds the initial per-pixel graph from a raw grid: one node per cell,
/// one subnode each, linked to its left neighbor (`EdgeDirection::Horizontal`)
/// and top neighbor (`EdgeDirection::Vertical`) when present. Mirrors
/// `graph_from_grid`/`new_grid` in `image.c`, which calls
/// `add_edge(left_node, node, EDGE_HORIZONTAL)` when `col > 0` and
/// `add_edge(top_node, node, EDGE_VERTICAL)` when `row > 0`.
pub fn graph_from_grid(grid: &Grid) -> GPResult<Graph> {
    let height = grid.len();
    let width = grid.first().map(|r| r.len()).unwrap_or(0);
    let mut graph = Graph::new(width, height, true);
    for (pri, row) in grid.iter().enumerate() {
        for (sec, &color) in row.iter().enumerate() {
            let coord = Coordinate::new(pri as i16, sec as i16);
            let node_id = graph.add_node(coord, vec![Subnode { coord, color }])?;
            if sec > 0 {
                let left = graph.node_by_coord(Coordinate::new(pri as i16, sec as i16 - 1)).expect("left neighbor already inserted");
                graph.add_edge(left, node_id, EdgeDirection::Horizontal)?;
            }
            if pri > 0 {
                let top = graph.node_by_coord(Coordinate::new(pri as i16 - 1, sec as i16)).expect("top neighbor already inserted");
                graph.add_edge(top, node_id, EdgeDirection::Vertical)?;
            }
        }
    }
    Ok(graph)
}

/// Renders a graph back into a grid, per `undo_abstraction` in `image.c`:
/// the background grid is filled first, then every subnode is written in
/// node declaration order, so later nodes win on overlap.
pub fn undo_abstraction(graph: &Graph, background: u8) -> GPResult<Grid> {
    let mut grid = vec![vec![background; graph.width]; graph.height];
    for (_, node) in graph.nodes() {
        for sn in &node.subnodes {
            let (pri, sec) = (sn.coord.pri, sn.coord.sec);
            if pri < 0 || sec < 0 || pri as usize >= graph.height || sec as usize >= graph.width {
                return Err(GPError::OutOfBounds { coord: sn.coord });
            }
            grid[pri as usize][sec as usize] = sn.color;
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        vec![vec![0, 1, 1], vec![0, 0, 2], vec![3, 3, 3]]
    }

    #[test]
    fn graph_from_grid_has_one_node_per_pixel() {
        let grid = sample_grid();
        let graph = graph_from_grid(&grid).unwrap();
        assert_eq!(graph.nodes().count(), 9);
        for (_, node) in graph.nodes() {
            assert_eq!(node.n_subnodes(), 1);
        }
    }

    #[test]
    fn graph_from_grid_links_row_and_column_neighbors() {
        // spec.md §8 scenario 1: a 2x2 grid produces 4 nodes with 4 pairwise
        // HORIZONTAL/VERTICAL edges (each interior edge shared by two nodes).
        let grid = vec![vec![2, 2], vec![1, 1]];
        let graph = graph_from_grid(&grid).unwrap();
        assert_eq!(graph.nodes().count(), 4);
        let total_incidences: usize = graph.nodes().map(|(_, n)| n.n_edges()).sum();
        assert_eq!(total_incidences, 8); // 4 edges, each touching 2 nodes
        for (_, node) in graph.nodes() {
            assert_eq!(node.n_edges(), 2);
        }
    }

    #[test]
    fn removing_a_node_drops_only_its_incident_edges() {
        // spec.md §8 scenario 2.
        let grid = vec![vec![2, 2], vec![1, 1]];
        let mut graph = graph_from_grid(&grid).unwrap();
        let corner = graph.node_by_coord(Coordinate::new(0, 0)).unwrap();
        let opposite = graph.node_by_coord(Coordinate::new(1, 1)).unwrap();
        let opposite_edges_before = graph.get_node(opposite).unwrap().n_edges();

        graph.remove_node(corner);

        assert_eq!(graph.nodes().count(), 3);
        assert_eq!(graph.get_node(opposite).unwrap().n_edges(), opposite_edges_before);
        let total_incidences: usize = graph.nodes().map(|(_, n)| n.n_edges()).sum();
        assert_eq!(total_incidences, 4); // 2 surviving edges among the remaining 3 nodes
    }

    #[test]
    fn derived_properties_force_background_to_zero_when_present() {
        let grid = vec![vec![0, 5], vec![5, 5]];
        let graph = graph_from_grid(&grid).unwrap();
        let props = graph.derived_properties();
        assert_eq!(props.background_color, 0);
        assert_eq!(props.most_common_color, 5);
    }

    #[test]
    fn derived_properties_ties_favor_highest_index() {
        let grid = vec![vec![3, 7]];
        let graph = graph_from_grid(&grid).unwrap();
        let props = graph.derived_properties();
        // colour 0 absent, tie between 3 and 7 -> background falls back to
        // most_common, which the non-strict `>=` tie-break resolves to 7.
        assert_eq!(props.most_common_color, 7);
        assert_eq!(props.background_color, 7);
    }

    #[test]
    fn undo_abstraction_round_trips_no_abstraction() {
        let grid = sample_grid();
        let graph = graph_from_grid(&grid).unwrap();
        let rebuilt = undo_abstraction(&graph, 0).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn undo_abstraction_errors_on_out_of_bounds_subnode() {
        let mut graph = Graph::new(2, 2, true);
        graph.add_node(Coordinate::new(0, 0), vec![Subnode { coord: Coordinate::new(5, 5), color: 1 }]).unwrap();
        assert!(matches!(undo_abstraction(&graph, 0), Err(GPError::OutOfBounds { .. })));
    }
}
