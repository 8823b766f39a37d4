//! Pure grid<->graph transforms. Grounded on
//! `original_source/src/image.c`'s `get_no_abstraction_graph`,
//! `_connected_components_graph`, and `_link_nodes_without_intermediary`.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::errors::GPResult;
use crate::graph::{Graph, Subnode};
use crate::types::{Coordinate, EdgeDirection};

#[typetag::serde(tag = "kind")]
pub trait Abstraction: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, grid: &Graph) -> GPResult<Graph>;
}

/// One output node holding every input subnode, in input traversal order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoAbstraction;

#[typetag::serde]
impl Abstraction for NoAbstraction {
    fn name(&self) -> &'static str {
        "no_abstraction"
    }

    fn apply(&self, grid: &Graph) -> GPResult<Graph> {
        let mut subnodes = Vec::new();
        for (_, node) in grid.nodes() {
            subnodes.extend(node.subnodes.iter().copied());
        }
        let mut out = Graph::new(grid.width, grid.height, true);
        out.add_node(Coordinate::new(0, 0), subnodes)?;
        Ok(out)
    }
}

/// Per-colour 4-connected components, with configurable background
/// exclusion. The four named constructors correspond to the four
/// `get_connected_components_graph*` entry points in `image.c`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectedComponents {
    pub remove_all_bg: bool,
    pub remove_bg_edges: bool,
    pub remove_bg_corners: bool,
}

impl ConnectedComponents {
    pub fn plain() -> Self {
        ConnectedComponents { remove_all_bg: false, remove_bg_edges: false, remove_bg_corners: false }
    }

    pub fn remove_all_background() -> Self {
        ConnectedComponents { remove_all_bg: true, remove_bg_edges: false, remove_bg_corners: false }
    }

    pub fn remove_background_edges() -> Self {
        ConnectedComponents { remove_all_bg: false, remove_bg_edges: true, remove_bg_corners: false }
    }

    pub fn remove_background_corners() -> Self {
        ConnectedComponents { remove_all_bg: false, remove_bg_edges: false, remove_bg_corners: true }
    }

    fn is_excluded(&self, coord: Coordinate, color: u8, background: u8, width: usize, height: usize) -> bool {
        if color != background {
            return false;
        }
        if self.remove_all_bg {
            return true;
        }
        let on_pri_edge = coord.pri == 0 || coord.pri as usize == height - 1;
        let on_sec_edge = coord.sec == 0 || coord.sec as usize == width - 1;
        if self.remove_bg_edges && (on_pri_edge || on_sec_edge) {
            return true;
        }
        if self.remove_bg_corners && on_pri_edge && on_sec_edge {
            return true;
        }
        false
    }
}

#[typetag::serde]
impl Abstraction for ConnectedComponents {
    fn name(&self) -> &'static str {
        "connected_components"
    }

    fn apply(&self, grid: &Graph) -> GPResult<Graph> {
        let background = grid.derived_properties().background_color;
        let width = grid.width;
        let height = grid.height;

        let cell_color = |pri: i16, sec: i16| -> Option<u8> {
            grid.node_by_coord(Coordinate::new(pri, sec))
                .and_then(|id| grid.get_node(id))
                .and_then(|n| n.subnodes.first())
                .map(|sn| sn.color)
        };

        let mut visited: HashSet<(i16, i16)> = HashSet::new();
        let mut out = Graph::new(width, height, false);
        let mut component_idx: Vec<i16> = vec![0; 10];
        let mut components: Vec<(u8, Vec<Subnode>)> = Vec::new();

        for pri in 0..height as i16 {
            for sec in 0..width as i16 {
                if visited.contains(&(pri, sec)) {
                    continue;
                }
                let color = match cell_color(pri, sec) {
                    Some(c) => c,
                    None => continue,
                };
                if self.is_excluded(Coordinate::new(pri, sec), color, background, width, height) {
                    visited.insert((pri, sec));
                    continue;
                }
                let mut queue = VecDeque::new();
                queue.push_back((pri, sec));
                visited.insert((pri, sec));
                let mut subnodes = Vec::new();
                while let Some((p, s)) = queue.pop_front() {
                    subnodes.push(Subnode { coord: Coordinate::new(p, s), color });
                    for (dp, ds) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                        let (np, ns) = (p + dp, s + ds);
                        if np < 0 || ns < 0 || np as usize >= height || ns as usize >= width {
                            continue;
                        }
                        if visited.contains(&(np, ns)) {
                            continue;
                        }
                        if cell_color(np, ns) != Some(color) {
                            continue;
                        }
                        visited.insert((np, ns));
                        queue.push_back((np, ns));
                    }
                }
                components.push((color, subnodes));
            }
        }

        let mut node_ids = Vec::new();
        for (color, subnodes) in components {
            let idx = component_idx[color as usize];
            component_idx[color as usize] += 1;
            let coord = Coordinate::new(color as i16, idx);
            let id = out.add_node(coord, subnodes)?;
            node_ids.push(id);
        }

        for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                if let Some(direction) = visible_without_intermediary(&cell_color, background, &out, node_ids[i], node_ids[j]) {
                    out.add_edge(node_ids[i], node_ids[j], direction)?;
                }
            }
        }

        Ok(out)
    }
}

/// Two components are linked when some pair of their subnodes shares a row
/// or column and every strictly-between cell in the original grid is
/// background. Mirrors `_link_nodes_without_intermediary` in `image.c`.
fn visible_without_intermediary(
    cell_color: &dyn Fn(i16, i16) -> Option<u8>,
    background: u8,
    out: &Graph,
    a: crate::types::NodeId,
    b: crate::types::NodeId,
) -> Option<EdgeDirection> {
    let node_a = out.get_node(a)?;
    let node_b = out.get_node(b)?;
    for sa in &node_a.subnodes {
        for sb in &node_b.subnodes {
            if sa.coord.pri == sb.coord.pri && sa.coord.sec != sb.coord.sec {
                let (lo, hi) = (sa.coord.sec.min(sb.coord.sec), sa.coord.sec.max(sb.coord.sec));
                if ((lo + 1)..hi).all(|sec| cell_color(sa.coord.pri, sec) == Some(background)) {
                    return Some(EdgeDirection::Vertical);
                }
            }
            if sa.coord.sec == sb.coord.sec && sa.coord.pri != sb.coord.pri {
                let (lo, hi) = (sa.coord.pri.min(sb.coord.pri), sa.coord.pri.max(sb.coord.pri));
                if ((lo + 1)..hi).all(|pri| cell_color(pri, sa.coord.sec) == Some(background)) {
                    return Some(EdgeDirection::Horizontal);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_from_grid;

    #[test]
    fn no_abstraction_produces_single_node() {
        let grid = vec![vec![0, 1], vec![2, 3]];
        let g = graph_from_grid(&grid).unwrap();
        let out = NoAbstraction.apply(&g).unwrap();
        assert_eq!(out.nodes().count(), 1);
        let (_, node) = out.nodes().next().unwrap();
        assert_eq!(node.n_subnodes(), 4);
    }

    #[test]
    fn connected_components_groups_same_color_cells() {
        let grid = vec![vec![0, 1, 1], vec![0, 0, 2], vec![3, 3, 3]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        // components: color0 (3 cells), color1 (2 cells), color2 (1 cell), color3 (3 cells)
        assert_eq!(out.nodes().count(), 4);
    }

    #[test]
    fn remove_all_background_drops_background_components() {
        let grid = vec![vec![0, 0], vec![1, 1]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::remove_all_background().apply(&g).unwrap();
        assert_eq!(out.nodes().count(), 1);
    }

    #[test]
    fn linked_components_get_an_edge_across_background() {
        let grid = vec![vec![1, 0, 2]];
        let g = graph_from_grid(&grid).unwrap();
        let out = ConnectedComponents::plain().apply(&g).unwrap();
        // color1 node and color2 node should see each other across the single background cell
        assert!(out.nodes().any(|(_, n)| n.n_edges() >= 1));
    }
}
