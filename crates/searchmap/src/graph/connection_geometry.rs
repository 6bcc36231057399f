//! Geometry of curved connections
//!
//! Computes where a connection leaves a node rectangle, the Bézier points of a
//! fresh connection, and how a connection the user customized follows its
//! nodes when they move.

use tracing::{debug, trace};

use super::{Connection, Graph, Node};
use crate::core::{
    Color, ConnectionAction, ConnectionConfig, ConnectionId, Location, NodeId, Renderer, Result,
    SearchMapError, Side, Vector,
};

/// Points of a freshly computed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveGeometry {
    pub points: [Location; 4],
    pub start_side: Side,
    pub end_side: Side,
}

/// Where a ray from the node center along `(dx, dy)` leaves the node rectangle
///
/// Fails with `NotFound` on the zero direction.
pub fn find_intersect(node: &Node, dx: i32, dy: i32) -> Result<(Location, Side)> {
    if dx == 0 && dy == 0 {
        return Err(SearchMapError::not_found(format!(
            "no exit direction from node {}",
            node.id()
        )));
    }

    let center = node.location();
    let half_width = node.width() / 2;
    let half_height = node.height() / 2;

    if dx != 0 {
        // offset along y when the ray reaches the left or right side
        let y_offset = dy as f64 * half_width as f64 / (dx as f64).abs();
        if y_offset.abs() <= half_height as f64 {
            let side = if dx > 0 { Side::Right } else { Side::Left };
            let exit = Location::new(
                center.x + dx.signum() * half_width,
                center.y + y_offset.round() as i32,
            );
            return Ok((exit, side));
        }
    }

    let x_offset = dx as f64 * half_height as f64 / (dy as f64).abs();
    let side = if dy > 0 { Side::Bottom } else { Side::Top };
    let exit = Location::new(
        center.x + x_offset.round() as i32,
        center.y + dy.signum() * half_height,
    );
    Ok((exit, side))
}

/// Exit point of `node` toward `target`
pub fn border_point_toward(node: &Node, target: Location) -> Result<Location> {
    let v = node.location().vector_to(target);
    find_intersect(node, v.dx, v.dy).map(|(point, _)| point)
}

/// Shared control point of a curve leaving `start` through `start_side` and
/// entering `end` through `end_side`
fn control_point(
    start: Location,
    start_side: Side,
    end: Location,
    end_side: Side,
    config: &ConnectionConfig,
) -> Location {
    let tangent = config.tangent_length.max(1);
    let smoothness = config.smoothness.max(1);
    let length = start.distance(end);
    let pull = start_side.tangent(tangent) + end_side.tangent(tangent);
    let factor = length / (smoothness as f64 * tangent as f64);
    start.midpoint(end).translate(pull.scale(factor))
}

/// Bézier points of a connection from `from` to `to`
///
/// Fails with `NotFound` when both nodes share the same center.
pub fn curve_between(from: &Node, to: &Node, config: &ConnectionConfig) -> Result<CurveGeometry> {
    let axis = from.location().vector_to(to.location());
    let (start, start_side) = find_intersect(from, axis.dx, axis.dy)?;
    let (end, end_side) = find_intersect(to, -axis.dx, -axis.dy)?;
    let control = control_point(start, start_side, end, end_side, config);

    trace!(
        from = %from.id(),
        to = %to.id(),
        %start,
        %control,
        %end,
        "Computed connection curve"
    );

    Ok(CurveGeometry {
        points: [start, control, control, end],
        start_side,
        end_side,
    })
}

/// Points used when no curve can be computed yet, straight between the centers
pub(crate) fn degenerate_points(from: &Node, to: &Node) -> [Location; 4] {
    let a = from.location();
    let b = to.location();
    let mid = a.midpoint(b);
    [a, mid, mid, b]
}

/// Shift of a control point coordinate caused by its endpoints moving
///
/// `value` is placed between the old endpoint coordinates; the endpoint that
/// moved most on this axis drags the point proportionally to that placement.
fn control_shift(old_start: i32, old_end: i32, value: i32, start_delta: i32, end_delta: i32) -> i32 {
    if start_delta == 0 && end_delta == 0 {
        return 0;
    }
    let span = old_end - old_start;
    let fraction = if span == 0 {
        0.0
    } else {
        ((value - old_start) as f64 / span as f64).clamp(0.0, 1.0)
    };
    if end_delta.abs() >= start_delta.abs() {
        (end_delta as f64 * fraction).round() as i32
    } else {
        (start_delta as f64 * (1.0 - fraction)).round() as i32
    }
}

/// Endpoint of a customized connection after its node moved by `delta`
fn follow_endpoint(
    connection: &mut Connection,
    index: usize,
    node: &Node,
    delta: Vector,
    toward: Location,
    fallback: Location,
) -> Location {
    if let Some(pinned) = connection.user_imposed()[index] {
        let moved = pinned.translate(delta);
        connection.set_user_imposed(index, Some(moved));
        return moved;
    }
    border_point_toward(node, toward)
        .or_else(|_| border_point_toward(node, fallback))
        .unwrap_or_else(|_| connection.points()[index].translate(delta))
}

/// Recompute a connection after its nodes moved or resized
///
/// Uncustomized connections are recomputed from scratch. Customized ones keep
/// their shape: pinned endpoints follow their node, the control point is
/// dragged by the endpoint that moved the most, and free endpoints are
/// re-derived toward the control point. Running this twice without moving any
/// node changes nothing.
pub fn adapt_connection(connection: &mut Connection, from: &Node, to: &Node, config: &ConnectionConfig) {
    if !connection.is_customized_by_user() {
        let points = match curve_between(from, to, config) {
            Ok(curve) => curve.points,
            Err(_) => {
                trace!(from = %from.id(), to = %to.id(), "Colocated nodes, straight connection");
                degenerate_points(from, to)
            }
        };
        connection.set_points(points);
        connection.set_cached_locations(from.location(), to.location());
        return;
    }

    let from_delta = connection.cached_from_location().vector_to(from.location());
    let to_delta = connection.cached_to_location().vector_to(to.location());
    let old = *connection.points();

    let mut controls = [old[1], old[2]];
    for control in controls.iter_mut() {
        control.x += control_shift(old[0].x, old[3].x, control.x, from_delta.dx, to_delta.dx);
        control.y += control_shift(old[0].y, old[3].y, control.y, from_delta.dy, to_delta.dy);
    }
    for (offset, control) in controls.iter().enumerate() {
        if connection.user_imposed()[offset + 1].is_some() {
            connection.set_user_imposed(offset + 1, Some(*control));
        }
    }

    let start = follow_endpoint(connection, 0, from, from_delta, controls[0], to.location());
    let end = follow_endpoint(connection, 3, to, to_delta, controls[1], from.location());

    connection.set_points([start, controls[0], controls[1], end]);
    connection.set_cached_locations(from.location(), to.location());
}

/// What a drag starting at `point` edits on `connection`
///
/// The grab radius around each endpoint shrinks as the view zooms in and never
/// exceeds a third of the endpoint distance, so short connections keep a
/// reachable control point.
pub fn action_at_location(
    connection: &Connection,
    point: Location,
    zoom: f64,
    config: &ConnectionConfig,
) -> ConnectionAction {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    let start = connection.start();
    let end = connection.end();
    let radius = (config.edit_radius / zoom).min(start.distance(end) / 3.0);

    if point.distance(start) <= radius {
        ConnectionAction::EditConnector1
    } else if point.distance(end) <= radius {
        ConnectionAction::EditConnector2
    } else {
        ConnectionAction::EditControlPoint
    }
}

/// Apply a user edit to `connection`, pinning the edited points
///
/// Endpoints are projected back onto their node border along the direction
/// from the node center to `location`.
pub fn edit_connection(
    connection: &mut Connection,
    from: &Node,
    to: &Node,
    action: ConnectionAction,
    location: Location,
) -> Result<()> {
    let mut points = *connection.points();
    match action {
        ConnectionAction::EditConnector1 => {
            let on_border = border_point_toward(from, location)?;
            points[0] = on_border;
            connection.set_user_imposed(0, Some(on_border));
        }
        ConnectionAction::EditConnector2 => {
            let on_border = border_point_toward(to, location)?;
            points[3] = on_border;
            connection.set_user_imposed(3, Some(on_border));
        }
        ConnectionAction::EditControlPoint => {
            points[1] = location;
            points[2] = location;
            connection.set_user_imposed(1, Some(location));
            connection.set_user_imposed(2, Some(location));
        }
    }
    // free endpoints face the control points, as a later refresh would place them
    points[0] = follow_endpoint(connection, 0, from, Vector::default(), points[1], to.location());
    points[3] = follow_endpoint(connection, 3, to, Vector::default(), points[2], from.location());
    connection.set_points(points);
    connection.set_customized_by_user(true);
    connection.set_cached_locations(from.location(), to.location());
    Ok(())
}

impl Graph {
    fn require_connection(&self, a: NodeId, b: NodeId) -> Result<ConnectionId> {
        self.connection_between(a, b)
            .ok_or(SearchMapError::UnknownConnection { from: a, to: b })
    }

    /// What a drag at `point` edits on the connection joining `a` and `b`
    pub fn connection_action_at(
        &self,
        a: NodeId,
        b: NodeId,
        point: Location,
        zoom: f64,
    ) -> Result<ConnectionAction> {
        let id = self.require_connection(a, b)?;
        let connection = self
            .connections
            .get(&id)
            .ok_or(SearchMapError::UnknownConnection { from: a, to: b })?;
        Ok(action_at_location(connection, point, zoom, &self.config.connection))
    }

    /// Pin a point of the connection joining `a` and `b` where the user dropped it
    ///
    /// The action is relative to the stored direction of the connection, which
    /// runs from parent to child or from the owning sibling.
    pub fn edit_connection_point(
        &mut self,
        a: NodeId,
        b: NodeId,
        action: ConnectionAction,
        location: Location,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let id = self.require_connection(a, b)?;
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(SearchMapError::UnknownConnection { from: a, to: b })?;
        let (from, to) = (connection.from(), connection.to());
        let (Some(from_node), Some(to_node)) = (self.nodes.get(&from), self.nodes.get(&to)) else {
            return Err(SearchMapError::UnknownConnection { from, to });
        };
        edit_connection(connection, from_node, to_node, action, location)?;
        debug!(connection = %id, ?action, %location, "Connection edited by user");
        self.sync_connection(id, renderer);
        Ok(())
    }

    /// Drop every user customization and recompute the curve
    pub fn reset_connection(&mut self, a: NodeId, b: NodeId, renderer: &mut dyn Renderer) -> Result<()> {
        let id = self.require_connection(a, b)?;
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.set_customized_by_user(false);
        }
        self.refresh_connection(id)?;
        self.sync_connection(id, renderer);
        Ok(())
    }

    pub fn set_connection_colors(
        &mut self,
        a: NodeId,
        b: NodeId,
        inner: Option<Color>,
        shadow: Option<Color>,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let id = self.require_connection(a, b)?;
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.set_colors(inner, shadow);
        }
        self.sync_connection(id, renderer);
        Ok(())
    }
}
