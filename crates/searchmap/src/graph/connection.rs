//! Curved connections between two nodes
//!
//! A connection is a cubic Bézier curve `[p0, p1, p2, p3]` where `p0` lies on
//! the border of the `from` node, `p3` on the border of the `to` node, and the
//! two middle points share one control point. Parent connections run from the
//! parent to the child; sibling connections run from their owner to the other
//! sibling.

use serde::{Deserialize, Serialize};

use crate::core::{Color, Location, NodeId, RenderId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    from: NodeId,
    to: NodeId,
    points: [Location; 4],
    /// Points the user pinned, index-aligned with `points`
    #[serde(default)]
    user_imposed: [Option<Location>; 4],
    #[serde(default)]
    customized_by_user: bool,
    #[serde(default)]
    inner_color: Option<Color>,
    #[serde(default)]
    shadow_color: Option<Color>,
    #[serde(default)]
    bold: bool,
    /// Endpoint node centers when the points were last computed
    from_location: Location,
    to_location: Location,
    #[serde(skip)]
    render_id: Option<RenderId>,
}

impl Connection {
    pub(crate) fn new(
        from: NodeId,
        to: NodeId,
        points: [Location; 4],
        from_location: Location,
        to_location: Location,
    ) -> Self {
        Self {
            from,
            to,
            points,
            user_imposed: [None; 4],
            customized_by_user: false,
            inner_color: None,
            shadow_color: None,
            bold: false,
            from_location,
            to_location,
            render_id: None,
        }
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    /// True if the connection joins `a` and `b`, in either direction
    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn points(&self) -> &[Location; 4] {
        &self.points
    }

    /// Endpoint on the `from` node
    pub fn start(&self) -> Location {
        self.points[0]
    }

    /// Endpoint on the `to` node
    pub fn end(&self) -> Location {
        self.points[3]
    }

    pub fn control_point(&self) -> Location {
        self.points[1]
    }

    pub fn user_imposed(&self) -> &[Option<Location>; 4] {
        &self.user_imposed
    }

    pub fn is_customized_by_user(&self) -> bool {
        self.customized_by_user
    }

    pub fn inner_color(&self) -> Option<Color> {
        self.inner_color
    }

    pub fn shadow_color(&self) -> Option<Color> {
        self.shadow_color
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn cached_from_location(&self) -> Location {
        self.from_location
    }

    pub fn cached_to_location(&self) -> Location {
        self.to_location
    }

    pub fn render_id(&self) -> Option<RenderId> {
        self.render_id
    }

    pub(crate) fn set_points(&mut self, points: [Location; 4]) {
        self.points = points.map(|p| p.clamped());
    }

    pub(crate) fn set_cached_locations(&mut self, from: Location, to: Location) {
        self.from_location = from;
        self.to_location = to;
    }

    pub(crate) fn set_user_imposed(&mut self, index: usize, location: Option<Location>) {
        if let Some(slot) = self.user_imposed.get_mut(index) {
            *slot = location.map(|p| p.clamped());
        }
    }

    pub(crate) fn set_customized_by_user(&mut self, customized: bool) {
        self.customized_by_user = customized;
        if !customized {
            self.user_imposed = [None; 4];
        }
    }

    pub(crate) fn set_colors(&mut self, inner: Option<Color>, shadow: Option<Color>) {
        self.inner_color = inner;
        self.shadow_color = shadow;
    }

    pub(crate) fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub(crate) fn set_render_id(&mut self, id: RenderId) {
        self.render_id = Some(id);
    }

    pub(crate) fn take_render_id(&mut self) -> Option<RenderId> {
        self.render_id.take()
    }

    /// Swap both ends, keeping the drawn curve identical
    pub(crate) fn reverse(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        std::mem::swap(&mut self.from_location, &mut self.to_location);
        self.points.reverse();
        self.user_imposed.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Connection {
        Connection::new(
            NodeId(1),
            NodeId(2),
            [
                Location::new(0, 0),
                Location::new(5, 5),
                Location::new(5, 5),
                Location::new(10, 0),
            ],
            Location::new(-100, 0),
            Location::new(100, 0),
        )
    }

    #[test]
    fn test_reverse_keeps_curve() {
        let mut c = sample();
        c.set_user_imposed(0, Some(Location::new(1, 1)));
        c.reverse();
        assert_eq!(c.from(), NodeId(2));
        assert_eq!(c.to(), NodeId(1));
        assert_eq!(c.start(), Location::new(10, 0));
        assert_eq!(c.end(), Location::new(0, 0));
        assert_eq!(c.user_imposed()[3], Some(Location::new(1, 1)));
        assert_eq!(c.cached_from_location(), Location::new(100, 0));
        assert!(c.joins(NodeId(1), NodeId(2)));
    }

    #[test]
    fn test_clearing_customization_drops_pins() {
        let mut c = sample();
        c.set_user_imposed(1, Some(Location::new(3, 3)));
        c.set_customized_by_user(true);
        assert!(c.is_customized_by_user());
        c.set_customized_by_user(false);
        assert!(c.user_imposed().iter().all(Option::is_none));
    }

    #[test]
    fn test_out_of_range_pin_is_ignored() {
        let mut c = sample();
        c.set_user_imposed(7, Some(Location::ORIGIN));
        assert!(c.user_imposed().iter().all(Option::is_none));
    }
}
