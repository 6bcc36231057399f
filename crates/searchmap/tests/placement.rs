//! Automatic placement tests

use searchmap::prelude::*;
use searchmap::{PlacementConfig, Rect};

const BORDER: i32 = 10;

fn padded(graph: &Graph, id: NodeId) -> Rect {
    graph.node(id).unwrap().bounds().padded(BORDER)
}

fn assert_no_overlap(graph: &Graph, placed: NodeId) {
    let area = padded(graph, placed);
    for other in graph.nodes().filter(|n| n.id() != placed) {
        assert!(
            !area.intersects(&other.bounds().padded(BORDER)),
            "{} at {} overlaps {} at {}",
            placed,
            graph.node(placed).unwrap().location(),
            other.id(),
            other.location()
        );
    }
}

#[test]
fn test_child_of_offset_node_clears_both_nodes() {
    let mut graph = Graph::new();
    let mut renderer = HeadlessRenderer::new();
    let r = graph.create_node(NodeKind::text("R"), Location::new(0, 0));
    let c = graph.create_node(NodeKind::text("C"), Location::new(600, 100));
    graph.set_root(Some(r)).unwrap();
    graph.set_parent(c, Some(r), &mut renderer).unwrap();

    let n = graph.create_node(NodeKind::text("N"), Location::new(600, 100));
    graph.set_parent(n, Some(c), &mut renderer).unwrap();
    graph.place_node(n, &mut renderer).unwrap();

    assert_no_overlap(&graph, n);
    assert_eq!(graph.node(r).unwrap().location(), Location::new(0, 0));
}

#[test]
fn test_many_children_never_overlap() {
    let mut map = SearchMap::new(HeadlessRenderer::new());
    map.display();
    let root = map.add_node(NodeKind::title("Hub"), None, None).unwrap();
    let mut placed = Vec::new();
    for i in 0..8 {
        let id = map
            .add_node(NodeKind::text(format!("child {}", i)), Some(root), None)
            .unwrap();
        placed.push(id);
    }
    for id in placed {
        for other in map.graph().nodes().filter(|n| n.id() != id) {
            assert!(!padded(map.graph(), id).intersects(&other.bounds().padded(BORDER)));
        }
    }
}

#[test]
fn test_small_nodes_use_the_grid() {
    let config = GraphConfig::new().with_default_node_size(40, 20);
    let mut graph = Graph::with_config(config);
    let mut renderer = HeadlessRenderer::new();
    let root = graph.create_node(NodeKind::text("r"), Location::new(100, 100));
    let child = graph.create_node(NodeKind::text("c"), Location::new(100, 100));
    graph.set_parent(child, Some(root), &mut renderer).unwrap();

    let at = graph.place_node(child, &mut renderer).unwrap();

    // ring 4 is the first one clearing the parent, away from the origin
    assert_eq!(at, Location::new(140, 140));
    assert_no_overlap(&graph, child);
}

#[test]
fn test_negative_quadrant_places_toward_negative() {
    let config = GraphConfig::new().with_default_node_size(40, 20);
    let mut graph = Graph::with_config(config);
    let mut renderer = HeadlessRenderer::new();
    let root = graph.create_node(NodeKind::text("r"), Location::new(-500, -500));
    let child = graph.create_node(NodeKind::text("c"), Location::new(-500, -500));
    graph.set_parent(child, Some(root), &mut renderer).unwrap();

    let at = graph.place_node(child, &mut renderer).unwrap();
    assert_eq!(at, Location::new(-540, -540));
    assert_no_overlap(&graph, child);
}

#[test]
fn test_crowded_spot_pushes_neighbors_away() {
    let config = GraphConfig::new().with_placement(PlacementConfig {
        min_radius: 50,
        ..PlacementConfig::default()
    });
    let mut graph = Graph::with_config(config);
    let mut renderer = HeadlessRenderer::new();
    let root = graph.create_node(NodeKind::text("r"), Location::new(0, 0));
    graph.set_root(Some(root)).unwrap();
    let first = graph.create_node(NodeKind::text("a"), Location::new(300, 300));
    let second = graph.create_node(NodeKind::text("b"), Location::new(320, 320));
    graph.set_parent(first, Some(root), &mut renderer).unwrap();

    let child = graph.create_node(NodeKind::text("c"), Location::new(0, 0));
    graph.set_parent(child, Some(root), &mut renderer).unwrap();
    graph.place_node(child, &mut renderer).unwrap();

    assert_no_overlap(&graph, child);
    assert_ne!(graph.node(first).unwrap().location(), Location::new(300, 300));
    assert_ne!(graph.node(second).unwrap().location(), Location::new(320, 320));
}

#[test]
fn test_placement_grows_the_canvas() {
    let config = GraphConfig::new().with_canvas_size(600, 600);
    let mut graph = Graph::with_config(config);
    let mut renderer = HeadlessRenderer::new();
    let root = graph.create_node(NodeKind::text("r"), Location::new(0, 0));
    graph.set_root(Some(root)).unwrap();
    graph.display(&mut renderer);
    let child = graph.create_node(NodeKind::text("c"), Location::new(0, 0));
    graph.set_parent(child, Some(root), &mut renderer).unwrap();

    graph.place_node(child, &mut renderer).unwrap();

    assert!(graph.width() > 600);
    assert_eq!(renderer.drawing_zone_size(), (graph.width(), graph.height()));
}

#[test]
fn test_far_away_parent_is_pulled_back_and_still_places() {
    let mut map = SearchMap::new(HeadlessRenderer::new());
    map.display();
    let root = map.add_node(NodeKind::title("Root"), None, None).unwrap();
    let far = map.add_node(NodeKind::text("far"), Some(root), None).unwrap();
    let placed = map.graph().node(far).unwrap().location();

    map.move_node(far, Location::new(2_000_000_000, -2_000_000_000)).unwrap();
    let corner = Location::new(searchmap::COORDINATE_LIMIT, -searchmap::COORDINATE_LIMIT);
    assert_eq!(map.graph().node(far).unwrap().location(), corner);

    let child = map.add_node(NodeKind::text("child"), Some(far), None).unwrap();
    assert_no_overlap(map.graph(), child);
    assert!(map.graph().node(child).unwrap().location().is_within_limit());
    assert!(map.graph().validate().is_empty());
    assert!(map.undo());
    assert!(map.undo());
    assert_eq!(map.graph().node(far).unwrap().location(), placed);
}
