//! Tunable constants of the graph engine
//!
//! Every algorithm reads its constants from one of these structs so hosts can
//! adjust them; the defaults match the behavior expected by the editor UI.

/// Constants of the curved connection geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Magnitude of the tangent pushed out of each exit side
    pub tangent_length: i32,
    /// Larger values give flatter curves
    pub smoothness: i32,
    /// Radius around an endpoint that grabs the endpoint instead of the control point
    pub edit_radius: f64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            tangent_length: 100,
            smoothness: 4,
            edit_radius: 30.0,
        }
    }
}

/// Constants of the automatic node placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Free margin kept around every node
    pub border: i32,
    /// Smallest search radius around the parent
    pub min_radius: i32,
    /// Distance used when the parent has no other child
    pub default_distance: i32,
    /// Side of one occupancy grid cell
    pub grid_step: i32,
    /// Bound on the cascading displacement recursion
    pub max_displacement_depth: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            border: 10,
            min_radius: 300,
            default_distance: 300,
            grid_step: 10,
            max_displacement_depth: 64,
        }
    }
}

/// Undo history configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    /// Maximum number of revert groups kept on each stack
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub initial_width: i32,
    pub initial_height: i32,
    pub default_node_width: i32,
    pub default_node_height: i32,
    pub connection: ConnectionConfig,
    pub placement: PlacementConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            initial_width: 4096,
            initial_height: 4096,
            default_node_width: 500,
            default_node_height: 250,
            connection: ConnectionConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas_size(mut self, width: i32, height: i32) -> Self {
        self.initial_width = width.max(1);
        self.initial_height = height.max(1);
        self
    }

    pub fn with_default_node_size(mut self, width: i32, height: i32) -> Self {
        self.default_node_width = width.max(1);
        self.default_node_height = height.max(1);
        self
    }

    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.default_node_width, 500);
        assert_eq!(config.default_node_height, 250);
        assert_eq!(config.placement.border, 10);
        assert_eq!(config.placement.min_radius, 300);
        assert_eq!(HistoryConfig::default().max_depth, 100);
    }

    #[test]
    fn test_builders_clamp_to_positive() {
        let config = GraphConfig::new()
            .with_canvas_size(0, -5)
            .with_default_node_size(120, 0);
        assert_eq!(config.initial_width, 1);
        assert_eq!(config.initial_height, 1);
        assert_eq!(config.default_node_width, 120);
        assert_eq!(config.default_node_height, 1);
    }
}
