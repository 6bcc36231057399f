//! Automatic placement of new child nodes
//!
//! A child is placed on the first free spot of an occupancy grid centered on
//! its parent, scanning outward in growing rings on the side facing away from
//! the origin. When the grid has no room, the child goes to a default spot and
//! the nodes in its way are pushed aside.

use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use super::Graph;
use crate::core::{Location, NodeId, Rect, Renderer, Result, SearchMapError, Vector, COORDINATE_LIMIT};

/// Upper bound on cells per grid side; larger radii use coarser cells
const MAX_GRID_CELLS: i32 = 1024;
/// Growth applied to a displacement factor that still leaves an overlap
const DISPLACEMENT_GROWTH: f64 = 1.1;

/// Blocked cells over a square window, queried through a summed-area table
#[derive(Debug)]
struct OccupancyGrid {
    origin: Location,
    step: i32,
    cells: i32,
    blocked: Vec<bool>,
    sums: Vec<u32>,
}

impl OccupancyGrid {
    fn new(center: Location, radius: i32, step: i32) -> Self {
        let span = radius.max(0).saturating_mul(2);
        let step = step.max(1).max(ceil_div(span, MAX_GRID_CELLS));
        let cells = ceil_div(span, step).clamp(1, MAX_GRID_CELLS);
        let half = i32::try_from(i64::from(cells) * i64::from(step) / 2).unwrap_or(i32::MAX);
        let size = (cells * cells) as usize;
        Self {
            origin: Location::new(center.x.saturating_sub(half), center.y.saturating_sub(half)),
            step,
            cells,
            blocked: vec![false; size],
            sums: Vec::new(),
        }
    }

    /// Cell range covering `rect`, rounded outward and clamped to the grid
    fn cell_range(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let step = i64::from(self.step);
        let narrow = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let floor = |v: i32, o: i32| narrow((i64::from(v) - i64::from(o)).div_euclid(step));
        let ceil = |v: i32, o: i32| narrow(-(i64::from(o) - i64::from(v)).div_euclid(step));
        (
            floor(rect.left, self.origin.x),
            floor(rect.top, self.origin.y),
            ceil(rect.right, self.origin.x),
            ceil(rect.bottom, self.origin.y),
        )
    }

    fn block(&mut self, rect: &Rect) {
        let (x0, y0, x1, y1) = self.cell_range(rect);
        let (x0, x1) = (x0.clamp(0, self.cells), x1.clamp(0, self.cells));
        let (y0, y1) = (y0.clamp(0, self.cells), y1.clamp(0, self.cells));
        for y in y0..y1 {
            for x in x0..x1 {
                self.blocked[(y * self.cells + x) as usize] = true;
            }
        }
    }

    fn seal(&mut self) {
        let n = self.cells as usize;
        let mut sums = vec![0u32; (n + 1) * (n + 1)];
        for y in 0..n {
            for x in 0..n {
                let cell = u32::from(self.blocked[y * n + x]);
                sums[(y + 1) * (n + 1) + x + 1] =
                    cell + sums[y * (n + 1) + x + 1] + sums[(y + 1) * (n + 1) + x] - sums[y * (n + 1) + x];
            }
        }
        self.sums = sums;
    }

    /// True when `rect` lies inside the grid and touches no blocked cell
    fn is_free(&self, rect: &Rect) -> bool {
        let (x0, y0, x1, y1) = self.cell_range(rect);
        if x0 < 0 || y0 < 0 || x1 > self.cells || y1 > self.cells {
            return false;
        }
        let w = (self.cells + 1) as usize;
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
        let total = self.sums[y1 * w + x1] + self.sums[y0 * w + x0]
            - self.sums[y0 * w + x1]
            - self.sums[y1 * w + x0];
        total == 0
    }
}

/// `value / divisor` rounded up, for a non-negative value and positive divisor
fn ceil_div(value: i32, divisor: i32) -> i32 {
    value / divisor + i32::from(value % divisor != 0)
}

/// Direction away from the origin on one axis
fn outward(coordinate: i32) -> i32 {
    if coordinate >= 0 {
        1
    } else {
        -1
    }
}

/// `sign`, flipped when going `reach` that way from `anchor` leaves the plane
fn inside_plane(anchor: i32, sign: i32, reach: i32) -> i32 {
    let end = i64::from(anchor) + i64::from(sign) * i64::from(reach);
    if end.abs() > i64::from(COORDINATE_LIMIT) {
        -sign
    } else {
        sign
    }
}

impl Graph {
    fn padded_bounds(&self, id: NodeId) -> Option<Rect> {
        let border = self.config.placement.border;
        self.nodes.get(&id).map(|n| n.bounds().padded(border))
    }

    /// Largest and mean distance from `parent` to its children other than `node`
    fn child_distances(&self, parent: NodeId, node: NodeId) -> Result<(i32, i32)> {
        let placement = &self.config.placement;
        let p = self.require(parent)?;
        let distances: Vec<f64> = p
            .children()
            .filter(|c| *c != node)
            .filter_map(|c| self.nodes.get(&c))
            .map(|c| p.location().distance(c.location()))
            .collect();
        if distances.is_empty() {
            return Ok((placement.min_radius, placement.default_distance));
        }
        let max = distances.iter().copied().fold(0.0, f64::max);
        let mean = distances.iter().sum::<f64>() / distances.len() as f64;
        Ok((
            (max.ceil() as i32).max(placement.min_radius),
            mean.round() as i32,
        ))
    }

    /// Find a spot for a child around its parent and move it there
    ///
    /// Returns the chosen location. Parentless nodes stay where they are. The
    /// padded footprint of a placed node never overlaps another padded node
    /// footprint, even if neighbors have to be pushed aside.
    pub fn place_node(&mut self, id: NodeId, renderer: &mut dyn Renderer) -> Result<Location> {
        let node = self.require(id)?;
        let Some(parent) = node.parent() else {
            return Ok(node.location());
        };
        let (radius, mean) = self.child_distances(parent, id)?;

        let location = match self.find_free_location(id, parent, radius) {
            Ok(location) => {
                self.require_mut(id)?.set_location(location);
                location
            }
            Err(e) if e.is_not_found() => {
                debug!(node = %id, %parent, radius, "No room around parent, freeing an area");
                self.free_area_for_node(id, parent, mean, renderer)?
            }
            Err(e) => return Err(e),
        };

        debug!(node = %id, %location, "Placed node");
        self.increase_size_if_location_not_available(id, renderer);
        Ok(location)
    }

    fn find_free_location(&self, id: NodeId, parent: NodeId, radius: i32) -> Result<Location> {
        let placement = &self.config.placement;
        let node = self.require(id)?;
        let center = self.require(parent)?.location();
        let sx = inside_plane(center.x, outward(center.x), radius);
        let sy = inside_plane(center.y, outward(center.y), radius);

        let mut grid = OccupancyGrid::new(center, radius, placement.grid_step);
        let step = grid.step;

        // the quadrant facing the origin stays empty
        let extent = grid.cells.saturating_mul(step);
        let far = Location::new(
            grid.origin.x.saturating_add(extent),
            grid.origin.y.saturating_add(extent),
        );
        let (qx0, qx1) = if sx > 0 { (grid.origin.x, center.x) } else { (center.x, far.x) };
        let (qy0, qy1) = if sy > 0 { (grid.origin.y, center.y) } else { (center.y, far.y) };
        grid.block(&Rect {
            left: qx0,
            top: qy0,
            right: qx1,
            bottom: qy1,
        });

        for other in self.nodes.values().filter(|n| n.id() != id) {
            grid.block(&other.bounds().padded(placement.border));
        }
        grid.seal();

        let fits = |x: i32, y: i32| {
            let offset = |sign: i32, cells: i32| sign * cells.saturating_mul(step);
            let candidate = center.translate(Vector::new(offset(sx, x), offset(sy, y)));
            let footprint = Rect::centered(candidate, node.width(), node.height()).padded(placement.border);
            (candidate.is_within_limit() && grid.is_free(&footprint)).then_some(candidate)
        };

        for ring in 0..=grid.cells {
            let hit = (0..=ring)
                .find_map(|y| fits(ring, y))
                .or_else(|| (0..=ring).find_map(|x| fits(x, ring)));
            if let Some(location) = hit {
                trace!(node = %id, ring, %location, "Grid spot found");
                return Ok(location);
            }
        }

        Err(SearchMapError::not_found(format!(
            "no free spot within {} of node {}",
            radius, parent
        )))
    }

    /// Put `id` diagonally from its parent and push overlapping nodes away
    ///
    /// Each node moves at most once; the cascade stops after the configured
    /// depth. Returns the location given to `id`.
    pub fn free_area_for_node(
        &mut self,
        id: NodeId,
        parent: NodeId,
        distance: i32,
        renderer: &mut dyn Renderer,
    ) -> Result<Location> {
        let provisional = self.require(id)?.location();
        let anchor = self.require(parent)?.location();
        let target = anchor.translate(Vector::new(
            inside_plane(anchor.x, outward(provisional.x), distance) * distance,
            inside_plane(anchor.y, outward(provisional.y), distance) * distance,
        ));
        self.require_mut(id)?.set_location(target);

        let mut settled = BTreeSet::from([id]);
        let mut moved = Vec::new();
        self.push_overlapping(id, 0, &mut settled, &mut moved);

        for displaced in moved {
            self.increase_size_if_location_not_available(displaced, renderer);
            self.refresh(displaced, true, renderer)?;
        }
        Ok(target)
    }

    fn push_overlapping(
        &mut self,
        pusher: NodeId,
        depth: usize,
        settled: &mut BTreeSet<NodeId>,
        moved: &mut Vec<NodeId>,
    ) {
        if depth >= self.config.placement.max_displacement_depth {
            warn!(node = %pusher, depth, "Displacement cascade cut short");
            return;
        }
        let Some(area) = self.padded_bounds(pusher) else {
            return;
        };
        let in_the_way: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|other| !settled.contains(other))
            .filter(|other| self.padded_bounds(*other).is_some_and(|r| r.intersects(&area)))
            .collect();

        for other in in_the_way {
            if settled.contains(&other) {
                continue;
            }
            let Some(destination) = self.displacement(pusher, other, settled) else {
                continue;
            };
            trace!(node = %other, by = %pusher, %destination, depth, "Displacing node");
            if let Some(node) = self.nodes.get_mut(&other) {
                node.set_location(destination);
            }
            settled.insert(other);
            moved.push(other);
            self.push_overlapping(other, depth + 1, settled, moved);
        }
    }

    /// New location for `other` so that it clears `pusher` and every settled node
    fn displacement(&self, pusher: NodeId, other: NodeId, settled: &BTreeSet<NodeId>) -> Option<Location> {
        let border = self.config.placement.border;
        let p = self.nodes.get(&pusher)?;
        let o = self.nodes.get(&other)?;

        let mut direction = p.location().vector_to(o.location());
        if direction.is_zero() {
            direction = Vector::new(1, 1);
        }

        let reach_x = (p.width() + o.width()) as f64 / 2.0 + 2.0 * border as f64 + 1.0;
        let reach_y = (p.height() + o.height()) as f64 / 2.0 + 2.0 * border as f64 + 1.0;
        let factor_x = if direction.dx == 0 { f64::INFINITY } else { reach_x / direction.dx.abs() as f64 };
        let factor_y = if direction.dy == 0 { f64::INFINITY } else { reach_y / direction.dy.abs() as f64 };
        let mut factor = factor_x.min(factor_y).max(1.0);

        let pusher_area = p.bounds().padded(border);
        let footprint = |at: Location| Rect::centered(at, o.width(), o.height()).padded(border);
        let mut destination = p.location().translate(direction.scale(factor));
        for _ in 0..64 {
            if !footprint(destination).intersects(&pusher_area) {
                break;
            }
            factor *= DISPLACEMENT_GROWTH;
            destination = p.location().translate(direction.scale(factor));
        }

        let settled_areas: Vec<Rect> = settled.iter().filter_map(|s| self.padded_bounds(*s)).collect();
        if settled_areas.iter().any(|r| r.intersects(&footprint(destination))) {
            let hull = settled_areas
                .iter()
                .skip(1)
                .fold(settled_areas[0], |acc, r| acc.union(r));
            destination = if direction.dx.abs() >= direction.dy.abs() {
                let x = if direction.dx >= 0 {
                    hull.right + o.width() / 2 + border
                } else {
                    hull.left - (o.width() - o.width() / 2) - border
                };
                Location::new(x, destination.y)
            } else {
                let y = if direction.dy >= 0 {
                    hull.bottom + o.height() / 2 + border
                } else {
                    hull.top - (o.height() - o.height() / 2) - border
                };
                Location::new(destination.x, y)
            };
        }
        Some(destination)
    }
}
