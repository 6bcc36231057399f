//! Undo and redo through an editing session

use searchmap::prelude::*;

fn session() -> (SearchMap<HeadlessRenderer>, NodeId) {
    let mut map = SearchMap::new(HeadlessRenderer::new());
    map.display();
    let root = map.add_node(NodeKind::title("Root"), None, None).unwrap();
    (map, root)
}

// =============================================================================
// Node scope
// =============================================================================

mod node_edits {
    use super::*;

    #[test]
    fn test_move_is_undone_and_redone() {
        let (mut map, root) = session();
        map.move_node(root, Location::new(120, -40)).unwrap();

        assert!(map.undo());
        assert_eq!(map.graph().node(root).unwrap().location(), Location::ORIGIN);
        assert!(map.redo());
        assert_eq!(map.graph().node(root).unwrap().location(), Location::new(120, -40));
    }

    #[test]
    fn test_resize_and_colors_are_undone() {
        let (mut map, root) = session();
        let (w, h) = {
            let node = map.graph().node(root).unwrap();
            (node.width(), node.height())
        };
        map.resize_node(root, 900, 400).unwrap();
        map.set_node_colors(root, Color::BLACK, Color::WHITE).unwrap();

        map.undo();
        assert_eq!(map.graph().node(root).unwrap().fill_color(), Color::WHITE);
        map.undo();
        let node = map.graph().node(root).unwrap();
        assert_eq!((node.width(), node.height()), (w, h));
    }

    #[test]
    fn test_node_undo_rerenders_connections() {
        let (mut map, root) = session();
        let child = map.add_node(NodeKind::text("c"), Some(root), None).unwrap();
        let lines_before = map.renderer().line_count();
        map.move_node(child, Location::new(2000, 0)).unwrap();

        map.undo();
        assert_eq!(map.renderer().line_count(), lines_before);
        let connection = map
            .graph()
            .connection(map.graph().connection_between(root, child).unwrap())
            .unwrap();
        assert_eq!(
            connection.cached_to_location(),
            map.graph().node(child).unwrap().location()
        );
    }
}

// =============================================================================
// Graph scope
// =============================================================================

mod graph_edits {
    use super::*;

    #[test]
    fn test_delete_is_undone() {
        let (mut map, root) = session();
        let a = map.add_node(NodeKind::text("a"), Some(root), None).unwrap();
        let b = map.add_node(NodeKind::text("b"), Some(a), None).unwrap();

        map.delete_node(a).unwrap();
        assert_eq!(map.graph().node(b).unwrap().parent(), Some(root));

        map.undo();
        assert_eq!(map.graph().node(a).unwrap().parent(), Some(root));
        assert_eq!(map.graph().node(b).unwrap().parent(), Some(a));
        assert!(map.graph().validate().is_empty());
        // three nodes and two lines on screen
        assert_eq!(map.renderer().live_count(), 5);
    }

    #[test]
    fn test_sibling_edits_are_undone() {
        let (mut map, root) = session();
        let a = map.add_node(NodeKind::text("a"), Some(root), None).unwrap();
        let b = map.add_node(NodeKind::text("b"), Some(root), None).unwrap();

        map.add_sibling(a, b).unwrap();
        map.undo();
        assert!(!map.graph().node(a).unwrap().is_sibling_of(b));
        map.redo();
        assert!(map.graph().node(a).unwrap().is_sibling_of(b));
    }

    #[test]
    fn test_redo_of_last_node_deletion() {
        let (mut map, root) = session();
        map.delete_node(root).unwrap();
        assert_eq!(map.graph().node_count(), 0);

        assert!(map.undo());
        assert!(map.graph().contains(root));

        assert!(map.redo());
        assert!(!map.graph().contains(root));
        assert_eq!(map.graph().root(), None);
        assert_eq!(map.renderer().live_count(), 0);
    }

    #[test]
    fn test_redo_restores_detached_nodes_without_root() {
        let (mut map, root) = session();
        let loose: Vec<NodeId> = (0..3)
            .map(|i| {
                map.add_node(NodeKind::text("loose"), None, Some(Location::new(2000, i * 600)))
                    .unwrap()
            })
            .collect();
        map.delete_node(root).unwrap();
        assert_eq!(map.graph().root(), None);

        map.undo();
        assert_eq!(map.graph().root(), Some(root));
        map.redo();
        assert_eq!(map.graph().root(), None);
        assert!(!map.graph().contains(root));
        for id in loose {
            assert!(map.graph().contains(id));
        }
        assert!(map.graph().validate().is_empty());
    }

    #[test]
    fn test_undo_of_first_node_is_a_no_op() {
        let (mut map, root) = session();
        // the snapshot before the root existed holds nothing
        assert!(map.undo());
        assert!(map.graph().contains(root));
    }
}

// =============================================================================
// Connection scope
// =============================================================================

mod connection_edits {
    use super::*;

    #[test]
    fn test_connection_edit_is_undone() {
        let (mut map, root) = session();
        let child = map.add_node(NodeKind::text("c"), Some(root), None).unwrap();
        let id = map.graph().connection_between(root, child).unwrap();
        let before = map.graph().connection(id).unwrap().clone();

        map.edit_connection_point(root, child, ConnectionAction::EditControlPoint, Location::new(-400, 900))
            .unwrap();
        map.set_connection_colors(root, child, Some(Color::BLACK), None)
            .unwrap();
        assert!(map.graph().connection(id).unwrap().is_customized_by_user());

        map.undo();
        map.undo();
        let after = map.graph().connection(id).unwrap();
        assert_eq!(after.points(), before.points());
        assert_eq!(after.inner_color(), None);
        assert!(!after.is_customized_by_user());

        map.redo();
        assert!(map.graph().connection(id).unwrap().is_customized_by_user());
    }
}

// =============================================================================
// History management
// =============================================================================

mod history {
    use super::*;

    #[test]
    fn test_group_is_one_step() {
        let (mut map, root) = session();
        map.begin_group();
        map.move_node(root, Location::new(10, 0)).unwrap();
        map.resize_node(root, 300, 300).unwrap();
        map.end_group();

        let depth = map.history().undo_len();
        map.undo();
        assert_eq!(map.history().undo_len(), depth - 1);
        let node = map.graph().node(root).unwrap();
        assert_eq!(node.location(), Location::ORIGIN);
        assert_ne!(node.width(), 300);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let (mut map, root) = session();
        map.move_node(root, Location::new(10, 0)).unwrap();
        map.undo();
        assert!(map.history().can_redo());
        map.move_node(root, Location::new(20, 0)).unwrap();
        assert!(!map.history().can_redo());
        assert!(!map.redo());
    }

    #[test]
    fn test_clear_history() {
        let (mut map, root) = session();
        map.move_node(root, Location::new(10, 0)).unwrap();
        map.clear_history();
        assert!(!map.undo());
        assert_eq!(map.graph().node(root).unwrap().location(), Location::new(10, 0));
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let mut map = SearchMap::with_config(
            HeadlessRenderer::new(),
            GraphConfig::default(),
            HistoryConfig { max_depth: 2 },
        );
        let root = map.add_node(NodeKind::text("r"), None, None).unwrap();
        for x in 1..=4 {
            map.move_node(root, Location::new(x * 10, 0)).unwrap();
        }
        assert_eq!(map.history().undo_len(), 2);
        map.undo();
        map.undo();
        assert_eq!(map.graph().node(root).unwrap().location(), Location::new(20, 0));
        assert!(!map.undo());
    }
}
