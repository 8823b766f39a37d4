//! End-to-end grid -> abstraction -> filter -> transform -> undo_abstraction
//! round trips, covering the scenarios a single DSL program is meant to
//! express.

use arc_synth::abstraction::{Abstraction, ConnectedComponents, NoAbstraction};
use arc_synth::dsl::binding::Binding;
use arc_synth::dsl::transform::{ColorParam, DirectionParam, Transform};
use arc_synth::dsl::{Filter, FilterChain};
use arc_synth::graph::{graph_from_grid, undo_abstraction};
use arc_synth::types::{Color, Direction, Rotation, Size};

#[test]
fn recolor_the_largest_component() {
    // A small blob of 1s and a larger blob of 2s on a 0 background; the
    // program should recolor only the largest component to 5.
    let grid = vec![
        vec![1, 0, 2, 2],
        vec![0, 0, 2, 2],
        vec![0, 0, 2, 2],
    ];
    let input = graph_from_grid(&grid).unwrap();
    let background = input.derived_properties().background_color;
    assert_eq!(background, 0);

    let mut abstracted = ConnectedComponents::remove_all_background().apply(&input).unwrap();
    assert_eq!(abstracted.nodes().count(), 2);

    let filter = FilterChain(vec![Filter::BySize { size: Size::Max, exclude: false }]);
    let target = abstracted.node_ids().into_iter().find(|id| filter.matches(&abstracted, *id)).expect("a largest node");
    assert_eq!(abstracted.get_node(target).unwrap().n_subnodes(), 6);

    Transform::UpdateColor { color: ColorParam::Constant(Color::Literal(5)) }.apply(&mut abstracted, target).unwrap();

    let rebuilt = undo_abstraction(&abstracted, background).unwrap();
    let expected = vec![
        vec![1, 0, 5, 5],
        vec![0, 0, 5, 5],
        vec![0, 0, 5, 5],
    ];
    assert_eq!(rebuilt, expected);
}

#[test]
fn move_a_single_pixel_shape_toward_its_neighbor() {
    let grid = vec![vec![1, 0, 0, 2]];
    let input = graph_from_grid(&grid).unwrap();
    let background = input.derived_properties().background_color;
    let mut abstracted = ConnectedComponents::remove_all_background().apply(&input).unwrap();

    let one = abstracted.nodes().find(|(_, n)| n.subnodes[0].color == 1).unwrap().0;
    Transform::MoveNode {
        direction: DirectionParam::Bound(Binding::NeighborByColor { color: Color::Literal(2), exclude: false }),
    }
        .apply(&mut abstracted, one)
        .unwrap();

    let rebuilt = undo_abstraction(&abstracted, background).unwrap();
    // node 1 steps once toward node 2 (rightward), landing on what was background.
    assert_eq!(rebuilt, vec![vec![0, 1, 0, 2]]);
}

#[test]
fn no_abstraction_preserves_every_pixel_through_a_rotation() {
    let grid = vec![vec![1, 2], vec![3, 4]];
    let input = graph_from_grid(&grid).unwrap();
    let mut abstracted = NoAbstraction.apply(&input).unwrap();
    let node = abstracted.node_ids()[0];
    assert_eq!(abstracted.get_node(node).unwrap().n_subnodes(), 4);

    Transform::RotateNode { rotation: Rotation::DoubleClockWise }.apply(&mut abstracted, node).unwrap();
    let rebuilt = undo_abstraction(&abstracted, 0).unwrap();
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt[0].len(), 2);
}

#[test]
fn extend_node_grows_until_it_hits_the_grid_edge() {
    let grid = vec![vec![1, 0, 0]];
    let input = graph_from_grid(&grid).unwrap();
    let background = input.derived_properties().background_color;
    let mut abstracted = ConnectedComponents::remove_all_background().apply(&input).unwrap();
    let node = abstracted.node_ids()[0];

    Transform::ExtendNode { direction: DirectionParam::Constant(Direction::Right), overlap: false }
        .apply(&mut abstracted, node)
        .unwrap();

    let rebuilt = undo_abstraction(&abstracted, background).unwrap();
    assert_eq!(rebuilt, vec![vec![1, 1, 1]]);
}
