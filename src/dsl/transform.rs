//! Node-level mutations applied to a filtered node. `update_color`,
//! `move_node`, and `extend_node` are grounded on
//! `original_source/src/transform.c`; `move_node_max` and `rotate_node` are
//! not present there and are designed here in the same idiom (direction
//! sweep / bounds-and-collision check built from the same primitives).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::binding::Binding;
use crate::errors::{GPError, GPResult};
use crate::graph::{Graph, Subnode};
use crate::types::{CardinalDirection, Color, Coordinate, Direction, NodeId, Rotation};

/// A colour parameter may be constant or resolved dynamically from a
/// binding relative to the node being transformed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ColorParam {
    Constant(Color),
    Bound(Binding),
}

/// A direction parameter may be constant or resolved dynamically via
/// `get_relative_pos(node, bound_node)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DirectionParam {
    Constant(Direction),
    Bound(Binding),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Transform {
    UpdateColor { color: ColorParam },
    MoveNode { direction: DirectionParam },
    ExtendNode { direction: DirectionParam, overlap: bool },
    MoveNodeMax { direction: DirectionParam },
    RotateNode { rotation: Rotation },
}

impl Transform {
    pub fn apply(&self, graph: &mut Graph, node: NodeId) -> GPResult<()> {
        match *self {
            Transform::UpdateColor { color } => {
                let resolved = resolve_color(graph, node, color)?;
                update_color(graph, node, resolved)
            }
            Transform::MoveNode { direction } => {
                let dir = resolve_direction(graph, node, direction)?;
                move_node(graph, node, dir)
            }
            Transform::ExtendNode { direction, overlap } => {
                let dir = resolve_direction(graph, node, direction)?;
                extend_node(graph, node, dir, overlap)
            }
            Transform::MoveNodeMax { direction } => {
                let dir = resolve_direction(graph, node, direction)?;
                move_node_max(graph, node, dir)
            }
            Transform::RotateNode { rotation } => rotate_node(graph, node, rotation),
        }
    }
}

fn resolve_color(graph: &Graph, node: NodeId, param: ColorParam) -> GPResult<u8> {
    match param {
        ColorParam::Constant(c) => Ok(graph.resolve_color(c)),
        ColorParam::Bound(binding) => {
            let bound = binding.resolve(graph, node).ok_or(GPError::NoMatch)?;
            graph
                .get_node(bound)
                .and_then(|n| n.subnodes.first())
                .map(|sn| sn.color)
                .ok_or(GPError::NoMatch)
        }
    }
}

fn resolve_direction(graph: &Graph, node: NodeId, param: DirectionParam) -> GPResult<Direction> {
    match param {
        DirectionParam::Constant(d) => Ok(d),
        DirectionParam::Bound(binding) => {
            let bound = binding.resolve(graph, node).ok_or(GPError::NoMatch)?;
            match get_relative_pos(graph, node, bound) {
                Some(CardinalDirection::Up) => Ok(Direction::Up),
                Some(CardinalDirection::Down) => Ok(Direction::Down),
                Some(CardinalDirection::Left) => Ok(Direction::Left),
                Some(CardinalDirection::Right) => Ok(Direction::Right),
                None => Err(GPError::NoMatch),
            }
        }
    }
}

/// The cardinal direction from `node` to `other` when they share a row or
/// column; `None` (`NO_DIRECTION`) otherwise. This implements the pairwise
/// shared-axis comparison the source engine's `get_relative_pos` describes,
/// rather than its literal (buggy) inner-loop-index reuse.
fn get_relative_pos(graph: &Graph, node: NodeId, other: NodeId) -> Option<CardinalDirection> {
    let a = graph.get_node(node)?;
    let b = graph.get_node(other)?;
    for sa in &a.subnodes {
        for sb in &b.subnodes {
            if sa.coord.pri == sb.coord.pri && sa.coord.sec != sb.coord.sec {
                return Some(if sb.coord.sec > sa.coord.sec { CardinalDirection::Right } else { CardinalDirection::Left });
            }
            if sa.coord.sec == sb.coord.sec && sa.coord.pri != sb.coord.pri {
                return Some(if sb.coord.pri > sa.coord.pri { CardinalDirection::Down } else { CardinalDirection::Up });
            }
        }
    }
    None
}

fn in_bounds(graph: &Graph, coord: Coordinate) -> bool {
    coord.pri >= 0 && coord.sec >= 0 && (coord.pri as usize) < graph.height && (coord.sec as usize) < graph.width
}

/// Coordinates occupied by any node other than `exclude`, used for
/// collision checks. Mirrors `check_collision`'s bitset in `transform.c`.
fn occupied(graph: &Graph, exclude: NodeId) -> HashSet<Coordinate> {
    let mut set = HashSet::new();
    for (id, node) in graph.nodes() {
        if id == exclude {
            continue;
        }
        for sn in &node.subnodes {
            set.insert(sn.coord);
        }
    }
    set
}

/// Colour-only change; subnode coordinates are untouched.
fn update_color(graph: &mut Graph, node: NodeId, color: u8) -> GPResult<()> {
    let n = graph.get_node_mut(node).ok_or(GPError::NoMatch)?;
    for sn in n.subnodes.iter_mut() {
        sn.color = color;
    }
    Ok(())
}

/// Unconditional translation of every subnode; no bounds or collision
/// check, matching `move_node` in `transform.c`.
fn move_node(graph: &mut Graph, node: NodeId, direction: Direction) -> GPResult<()> {
    let (dp, ds) = direction.delta();
    let n = graph.get_node_mut(node).ok_or(GPError::NoMatch)?;
    for sn in n.subnodes.iter_mut() {
        sn.coord.pri += dp;
        sn.coord.sec += ds;
    }
    Ok(())
}

/// Repeatedly steps each original subnode in `direction`, accumulating new
/// subnodes along the ray until bounds or (unless `overlap`) a collision
/// stops it, then appends them to the node. Mirrors `extend_node`'s
/// per-subnode ray walk.
fn extend_node(graph: &mut Graph, node: NodeId, direction: Direction, overlap: bool) -> GPResult<()> {
    let (dp, ds) = direction.delta();
    let blocked = occupied(graph, node);
    let original: Vec<Subnode> = graph.get_node(node).ok_or(GPError::NoMatch)?.subnodes.clone();
    let max_steps = graph.width.max(graph.height);

    let mut extension = Vec::new();
    for sn in &original {
        let mut cur = sn.coord;
        for _ in 0..max_steps {
            let next = Coordinate::new(cur.pri + dp, cur.sec + ds);
            if !in_bounds(graph, next) {
                break;
            }
            if !overlap && blocked.contains(&next) {
                break;
            }
            extension.push(Subnode { coord: next, color: sn.color });
            cur = next;
        }
    }

    let n = graph.get_node_mut(node).ok_or(GPError::NoMatch)?;
    n.subnodes.extend(extension);
    Ok(())
}

/// Not present in the source engine: sweeps `move_node` repeatedly in
/// `direction` until any subnode would leave the grid or collide with
/// another node, then applies the largest valid number of steps as one
/// translation.
fn move_node_max(graph: &mut Graph, node: NodeId, direction: Direction) -> GPResult<()> {
    let (dp, ds) = direction.delta();
    let blocked = occupied(graph, node);
    let subnodes: Vec<Subnode> = graph.get_node(node).ok_or(GPError::NoMatch)?.subnodes.clone();
    let max_steps = graph.width.max(graph.height) as i16;

    let mut steps = 0i16;
    'outer: while steps < max_steps {
        for sn in &subnodes {
            let next = Coordinate::new(sn.coord.pri + dp * (steps + 1), sn.coord.sec + ds * (steps + 1));
            if !in_bounds(graph, next) || blocked.contains(&next) {
                break 'outer;
            }
        }
        steps += 1;
    }

    if steps == 0 {
        return Ok(());
    }
    let n = graph.get_node_mut(node).ok_or(GPError::NoMatch)?;
    for sn in n.subnodes.iter_mut() {
        sn.coord.pri += dp * steps;
        sn.coord.sec += ds * steps;
    }
    Ok(())
}

/// Rotates every subnode about the node's (floor-averaged) centroid.
/// Subnodes whose rotated position falls outside the grid are silently
/// dropped, matching the acknowledged-unresolved behaviour of the closest
/// source-engine equivalent.
fn rotate_node(graph: &mut Graph, node: NodeId, rotation: Rotation) -> GPResult<()> {
    let n = graph.get_node(node).ok_or(GPError::NoMatch)?;
    if n.subnodes.is_empty() {
        return Ok(());
    }
    let sum_pri: i32 = n.subnodes.iter().map(|sn| sn.coord.pri as i32).sum();
    let sum_sec: i32 = n.subnodes.iter().map(|sn| sn.coord.sec as i32).sum();
    let count = n.subnodes.len() as i32;
    let cp = sum_pri / count;
    let cs = sum_sec / count;

    let rotated: Vec<Subnode> = n
        .subnodes
        .iter()
        .filter_map(|sn| {
            let (rp, rs) = (sn.coord.pri as i32 - cp, sn.coord.sec as i32 - cs);
            let (np, ns) = match rotation {
                Rotation::ClockWise => (cp + rs, cs - rp),
                Rotation::CounterClockWise => (cp - rs, cs + rp),
                Rotation::DoubleClockWise => (cp - rp, cs - rs),
            };
            let coord = Coordinate::new(np as i16, ns as i16);
            if in_bounds(graph, coord) {
                Some(Subnode { coord, color: sn.color })
            } else {
                None
            }
        })
        .collect();

    let n = graph.get_node_mut(node).ok_or(GPError::NoMatch)?;
    n.subnodes = rotated;
    Ok(())
}
