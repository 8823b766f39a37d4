//! Enumerates DSL candidates that are consistent with every training graph
//! of a task: a Cartesian product over each operator's argument slots,
//! keeping only combinations that match something in every example.
//! Grounded on the commented-out `generate_parameters` sketch in
//! `original_source/src/task.c`, reshaped into plain iterator combinators
//! (no semantic deduplication of equivalent candidates, matching the
//! source's own unfinished state there).

use super::binding::Binding;
use super::filter::{Filter, FilterChain};
use super::transform::{ColorParam, DirectionParam, Transform};
use crate::graph::Graph;
use crate::types::{Color, Direction, Rotation, Size};

fn candidate_colors() -> Vec<Color> {
    let mut colors: Vec<Color> = (0..10u8).map(Color::Literal).collect();
    colors.push(Color::Background);
    colors.push(Color::MostCommon);
    colors.push(Color::LeastCommon);
    colors
}

fn candidate_sizes(max_observed: u16) -> Vec<Size> {
    let mut sizes: Vec<Size> = (1..=max_observed.max(1)).map(Size::Literal).collect();
    sizes.push(Size::Max);
    sizes.push(Size::Min);
    sizes.push(Size::Odd);
    sizes
}

fn candidate_degrees(max_observed: usize) -> Vec<usize> {
    (0..=max_observed).collect()
}

fn max_subnodes(graphs: &[&Graph]) -> u16 {
    graphs
        .iter()
        .flat_map(|g| g.nodes().map(|(_, n)| n.n_subnodes()))
        .max()
        .unwrap_or(1) as u16
}

fn max_degree(graphs: &[&Graph]) -> usize {
    graphs.iter().flat_map(|g| g.nodes().map(|(_, n)| n.n_edges())).max().unwrap_or(0)
}

fn matches_every_graph(graphs: &[&Graph], chain: &FilterChain) -> bool {
    graphs.iter().all(|g| g.node_ids().iter().any(|id| chain.matches(g, *id)))
}

/// Single-predicate filters, plus the spec's required two-predicate AND
/// conjunctions, each kept only if they still match at least one node in
/// every training graph.
pub fn enumerate_filters(graphs: &[&Graph]) -> Vec<FilterChain> {
    let colors = candidate_colors();
    let sizes = candidate_sizes(max_subnodes(graphs));
    let degrees = candidate_degrees(max_degree(graphs));

    let mut singles = Vec::new();
    for &exclude in &[false, true] {
        for &color in &colors {
            singles.push(Filter::ByColor { color, exclude });
            singles.push(Filter::ByNeighborColor { color, exclude });
        }
        for &size in &sizes {
            singles.push(Filter::BySize { size, exclude });
            singles.push(Filter::ByNeighborSize { size, exclude });
        }
        for &degree in &degrees {
            singles.push(Filter::ByDegree { degree, exclude });
            singles.push(Filter::ByNeighborDegree { degree, exclude });
        }
    }

    let mut result = Vec::new();
    for f in &singles {
        let chain = FilterChain(vec![*f]);
        if matches_every_graph(graphs, &chain) {
            result.push(chain);
        }
    }
    for i in 0..singles.len() {
        for j in (i + 1)..singles.len() {
            let chain = FilterChain(vec![singles[i], singles[j]]);
            if matches_every_graph(graphs, &chain) {
                result.push(chain);
            }
        }
    }
    result
}

pub fn enumerate_bindings(graphs: &[&Graph]) -> Vec<Binding> {
    let colors = candidate_colors();
    let sizes = candidate_sizes(max_subnodes(graphs));
    let degrees = candidate_degrees(max_degree(graphs));

    let mut bindings = Vec::new();
    for &exclude in &[false, true] {
        for &size in &sizes {
            bindings.push(Binding::NodeBySize { size, exclude });
            bindings.push(Binding::NeighborBySize { size, exclude });
        }
        for &color in &colors {
            bindings.push(Binding::NeighborByColor { color, exclude });
        }
        for &degree in &degrees {
            bindings.push(Binding::NeighborByDegree { degree, exclude });
        }
    }
    bindings.retain(|b| graphs.iter().all(|g| g.node_ids().iter().any(|id| b.resolve(g, *id).is_some())));
    bindings
}

pub fn enumerate_transforms(bindings: &[Binding]) -> Vec<Transform> {
    let colors = candidate_colors();
    let mut transforms = Vec::new();

    for &color in &colors {
        transforms.push(Transform::UpdateColor { color: ColorParam::Constant(color) });
    }
    for &binding in bindings {
        transforms.push(Transform::UpdateColor { color: ColorParam::Bound(binding) });
    }

    for &direction in &Direction::ALL {
        transforms.push(Transform::MoveNode { direction: DirectionParam::Constant(direction) });
        transforms.push(Transform::MoveNodeMax { direction: DirectionParam::Constant(direction) });
        for &overlap in &[false, true] {
            transforms.push(Transform::ExtendNode { direction: DirectionParam::Constant(direction), overlap });
        }
    }
    for &binding in bindings {
        transforms.push(Transform::MoveNode { direction: DirectionParam::Bound(binding) });
        transforms.push(Transform::MoveNodeMax { direction: DirectionParam::Bound(binding) });
        for &overlap in &[false, true] {
            transforms.push(Transform::ExtendNode { direction: DirectionParam::Bound(binding), overlap });
        }
    }

    for &rotation in &[Rotation::ClockWise, Rotation::CounterClockWise, Rotation::DoubleClockWise] {
        transforms.push(Transform::RotateNode { rotation });
    }

    transforms
}
