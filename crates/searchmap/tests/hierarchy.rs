//! Hierarchy tests: parents, siblings and node deletion
//!
//! Every test finishes by checking that the graph reports no consistency
//! violation.

use searchmap::prelude::*;

fn node(graph: &mut Graph, x: i32, y: i32) -> NodeId {
    graph.create_node(NodeKind::text("n"), Location::new(x, y))
}

fn assert_consistent(graph: &Graph) {
    let problems = graph.validate();
    assert!(problems.is_empty(), "graph is inconsistent: {:?}", problems);
}

// =============================================================================
// Parent / child
// =============================================================================

mod parents {
    use super::*;

    #[test]
    fn test_child_is_listed_by_parent() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let root = node(&mut graph, 0, 0);
        let a = node(&mut graph, 800, 0);
        let b = node(&mut graph, 800, 400);
        graph.set_root(Some(root)).unwrap();
        graph.set_parent(a, Some(root), &mut renderer).unwrap();
        graph.set_parent(b, Some(root), &mut renderer).unwrap();

        let children: Vec<NodeId> = graph.node(root).unwrap().children().collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(graph.children_of(root), vec![a, b]);
        assert_eq!(graph.parent_of(b), Some(root));
        assert_eq!(graph.parent_of(root), None);
        assert!(graph.children_of(NodeId(77)).is_empty());
        assert_consistent(&graph);
    }

    #[test]
    fn test_set_parent_then_none_restores_state() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);

        graph.set_parent(b, Some(a), &mut renderer).unwrap();
        assert_eq!(graph.connection_count(), 1);
        graph.set_parent(b, None, &mut renderer).unwrap();

        assert_eq!(graph.node(b).unwrap().parent(), None);
        assert_eq!(graph.node(a).unwrap().child_count(), 0);
        assert_eq!(graph.node(b).unwrap().connection_to_parent(), None);
        assert_eq!(graph.connection_count(), 0);
        assert_consistent(&graph);
    }

    #[test]
    fn test_same_parent_is_a_no_op() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.set_parent(b, Some(a), &mut renderer).unwrap();
        let connection = graph.node(b).unwrap().connection_to_parent();

        graph.set_parent(b, Some(a), &mut renderer).unwrap();
        assert_eq!(graph.node(b).unwrap().connection_to_parent(), connection);
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_reparent_onto_own_child_swaps() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let top = node(&mut graph, 0, 0);
        let x = node(&mut graph, 800, 0);
        let y = node(&mut graph, 1600, 0);
        graph.set_root(Some(top)).unwrap();
        graph.set_parent(x, Some(top), &mut renderer).unwrap();
        graph.set_parent(y, Some(x), &mut renderer).unwrap();

        graph.set_parent(x, Some(y), &mut renderer).unwrap();

        assert_eq!(graph.node(y).unwrap().parent(), Some(top));
        assert_eq!(graph.node(x).unwrap().parent(), Some(y));
        assert!(!graph.is_descendant(y, x));
        assert_consistent(&graph);
    }

    #[test]
    fn test_reparent_onto_grandchild_has_no_cycle() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        let c = node(&mut graph, 1600, 0);
        graph.set_root(Some(a)).unwrap();
        graph.set_parent(b, Some(a), &mut renderer).unwrap();
        graph.set_parent(c, Some(b), &mut renderer).unwrap();

        graph.set_parent(a, Some(c), &mut renderer).unwrap();

        assert_eq!(graph.node(c).unwrap().parent(), None);
        assert_eq!(graph.root(), Some(c));
        assert_consistent(&graph);
    }

    #[test]
    fn test_sibling_becoming_parent_reuses_connection() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.add_sibling(b, a, &mut renderer).unwrap();
        let shared = graph.node(a).unwrap().sibling_connection(b).unwrap();

        graph.set_parent(b, Some(a), &mut renderer).unwrap();

        assert_eq!(graph.node(b).unwrap().connection_to_parent(), Some(shared));
        let connection = graph.connection(shared).unwrap();
        assert_eq!(connection.from(), a);
        assert_eq!(connection.to(), b);
        assert!(connection.is_bold());
        assert!(!graph.node(a).unwrap().is_sibling_of(b));
        assert_eq!(graph.connection_count(), 1);
        assert_consistent(&graph);
    }
}

// =============================================================================
// Siblings
// =============================================================================

mod siblings {
    use super::*;

    #[test]
    fn test_sibling_relation_is_symmetric_with_one_owner() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.add_sibling(a, b, &mut renderer).unwrap();

        let na = graph.node(a).unwrap();
        let nb = graph.node(b).unwrap();
        assert_eq!(na.owns_sibling_connection(b), Some(true));
        assert_eq!(nb.owns_sibling_connection(a), Some(false));
        assert_eq!(na.sibling_connection(b), nb.sibling_connection(a));
        assert_consistent(&graph);
    }

    #[test]
    fn test_add_then_remove_leaves_nothing() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.add_sibling(a, b, &mut renderer).unwrap();
        assert_eq!(graph.siblings_of(b), vec![a]);
        graph.remove_sibling(a, b, &mut renderer).unwrap();

        assert_eq!(graph.node(a).unwrap().siblings().count(), 0);
        assert_eq!(graph.node(b).unwrap().siblings().count(), 0);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_remove_from_either_side() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.add_sibling(a, b, &mut renderer).unwrap();
        graph.remove_sibling(b, a, &mut renderer).unwrap();
        assert!(!graph.node(a).unwrap().is_sibling_of(b));
    }

    #[test]
    fn test_duplicate_sibling_is_rejected() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let a = node(&mut graph, 0, 0);
        let b = node(&mut graph, 800, 0);
        graph.add_sibling(a, b, &mut renderer).unwrap();

        for (x, y) in [(a, b), (b, a)] {
            let err = graph.add_sibling(x, y, &mut renderer).unwrap_err();
            assert!(matches!(err, SearchMapError::AlreadyConnected { .. }));
        }
        assert_eq!(graph.connection_count(), 1);
    }
}

// =============================================================================
// Deletion
// =============================================================================

mod deletion {
    use super::*;

    #[test]
    fn test_deleting_root_promotes_first_child() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let root = node(&mut graph, 0, 0);
        let c1 = node(&mut graph, 800, 0);
        let c2 = node(&mut graph, 800, 400);
        graph.set_root(Some(root)).unwrap();
        graph.set_parent(c1, Some(root), &mut renderer).unwrap();
        graph.set_parent(c2, Some(root), &mut renderer).unwrap();

        graph.delete_node(root, &mut renderer).unwrap();

        assert_eq!(graph.root(), Some(c1));
        assert_eq!(graph.node(c1).unwrap().parent(), None);
        assert_eq!(graph.node(c2).unwrap().parent(), Some(c1));
        assert!(!graph.contains(root));
        assert_consistent(&graph);
    }

    #[test]
    fn test_deleting_inner_node_lifts_children() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let root = node(&mut graph, 0, 0);
        let mid = node(&mut graph, 800, 0);
        let leaf = node(&mut graph, 1600, 0);
        graph.set_root(Some(root)).unwrap();
        graph.set_parent(mid, Some(root), &mut renderer).unwrap();
        graph.set_parent(leaf, Some(mid), &mut renderer).unwrap();

        graph.delete_node(mid, &mut renderer).unwrap();

        assert_eq!(graph.node(leaf).unwrap().parent(), Some(root));
        assert_eq!(graph.connection_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn test_deleting_node_severs_siblings_and_artifacts() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let root = node(&mut graph, 0, 0);
        let other = node(&mut graph, 800, 0);
        graph.set_root(Some(root)).unwrap();
        graph.add_sibling(root, other, &mut renderer).unwrap();
        graph.display(&mut renderer);
        assert_eq!(renderer.live_count(), 3);

        graph.delete_node(other, &mut renderer).unwrap();

        assert!(!graph.node(root).unwrap().is_sibling_of(other));
        assert_eq!(renderer.live_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn test_deleting_last_node_clears_root() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let root = node(&mut graph, 0, 0);
        graph.set_root(Some(root)).unwrap();
        graph.delete_node(root, &mut renderer).unwrap();
        assert_eq!(graph.root(), None);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_deleting_unknown_node_fails() {
        let mut graph = Graph::new();
        let mut renderer = HeadlessRenderer::new();
        let err = graph.delete_node(NodeId(5), &mut renderer).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
