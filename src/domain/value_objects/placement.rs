//! Placement model - normalized map coordinates and layout constraints
//!
//! Both axes run from 0 to 100 with the origin in the top-left corner.
//! North maps to low `y`, south to high `y`, west to low `x`, east to high `x`.
//!
//! Location markers must keep a minimum separation of [`MIN_SEPARATION`] on at
//! least one axis and stay inside the `[10, 90]` band so pins are not clipped at
//! the map edge. The separation is requested from the extraction model up
//! front; [`spread_points`] repairs whatever the model gets wrong.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest coordinate a location marker may occupy
pub const LOCATION_MIN_COORD: f64 = 10.0;
/// Highest coordinate a location marker may occupy
pub const LOCATION_MAX_COORD: f64 = 90.0;
/// Minimum distance between two markers on at least one axis
pub const MIN_SEPARATION: f64 = 15.0;
/// Maximum uniform jitter applied to decoration anchors, per axis
pub const DECORATION_JITTER: f64 = 5.0;

/// Extra distance added when nudging, so float rounding never lands a
/// repaired marker a hair short of [`MIN_SEPARATION`]
const NUDGE_MARGIN: f64 = 1e-3;

/// Fallback grid used when nudging cannot resolve a crowded layout.
/// Neighbouring cells are 16 units apart.
const FALLBACK_GRID: [f64; 6] = [10.0, 26.0, 42.0, 58.0, 74.0, 90.0];

/// A point in normalized map space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp into the location band. Non-finite coordinates land on the centre line.
    pub fn clamped_to_location_bounds(self) -> Self {
        Self {
            x: clamp_coord(self.x),
            y: clamp_coord(self.y),
        }
    }

    pub fn is_within_location_bounds(&self) -> bool {
        (LOCATION_MIN_COORD..=LOCATION_MAX_COORD).contains(&self.x)
            && (LOCATION_MIN_COORD..=LOCATION_MAX_COORD).contains(&self.y)
    }

    /// True when the two points are at least [`MIN_SEPARATION`] apart on either axis
    pub fn is_separated_from(&self, other: &MapPoint) -> bool {
        (self.x - other.x).abs() >= MIN_SEPARATION || (self.y - other.y).abs() >= MIN_SEPARATION
    }

    /// Offset both axes by independent uniform noise in `[-amount, amount]`
    pub fn jittered<R: Rng>(self, rng: &mut R, amount: f64) -> Self {
        Self {
            x: self.x + rng.gen_range(-amount..=amount),
            y: self.y + rng.gen_range(-amount..=amount),
        }
    }

    fn distance_squared(&self, other: &MapPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

fn clamp_coord(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(LOCATION_MIN_COORD, LOCATION_MAX_COORD)
    } else {
        (LOCATION_MIN_COORD + LOCATION_MAX_COORD) / 2.0
    }
}

/// Check the pairwise separation invariant over a whole layout
#[cfg(test)]
pub fn all_separated(points: &[MapPoint]) -> bool {
    points.iter().enumerate().all(|(i, a)| {
        points[i + 1..]
            .iter()
            .all(|b| a.is_separated_from(b))
    })
}

/// Return a layout that satisfies the bounds and separation invariants.
///
/// Points are processed in order; a point that collides with an already placed
/// one is first nudged along whichever axis needs the smaller move, then moved
/// to the nearest free integer lattice point. If the greedy pass paints itself
/// into a corner the whole set is snapped onto a 6x6 grid, which holds up to 36
/// markers. Larger sets come back clamped but otherwise untouched.
pub fn spread_points(points: &[MapPoint]) -> Vec<MapPoint> {
    let clamped: Vec<MapPoint> = points
        .iter()
        .map(|p| p.clamped_to_location_bounds())
        .collect();

    if let Some(spread) = greedy_spread(&clamped) {
        return spread;
    }

    tracing::debug!(
        count = clamped.len(),
        "Greedy marker spread failed, snapping layout to grid"
    );

    match snap_to_grid(&clamped) {
        Some(snapped) => snapped,
        None => {
            tracing::warn!(
                count = clamped.len(),
                "Too many markers to satisfy minimum separation"
            );
            clamped
        }
    }
}

fn collides(point: &MapPoint, placed: &[MapPoint]) -> bool {
    placed.iter().any(|other| !point.is_separated_from(other))
}

fn greedy_spread(points: &[MapPoint]) -> Option<Vec<MapPoint>> {
    let mut placed = Vec::with_capacity(points.len());
    for point in points {
        let resolved = if collides(point, &placed) {
            nudge(point, &placed).or_else(|| nearest_free_lattice_point(point, &placed))?
        } else {
            *point
        };
        placed.push(resolved);
    }
    Some(placed)
}

/// Move `point` away from the first marker it collides with, along one axis only
fn nudge(point: &MapPoint, placed: &[MapPoint]) -> Option<MapPoint> {
    let blocker = placed.iter().find(|other| !point.is_separated_from(other))?;

    let away_x = if point.x >= blocker.x { 1.0 } else { -1.0 };
    let away_y = if point.y >= blocker.y { 1.0 } else { -1.0 };
    let step = MIN_SEPARATION + NUDGE_MARGIN;

    let mut candidates = [
        MapPoint::new(blocker.x + away_x * step, point.y),
        MapPoint::new(point.x, blocker.y + away_y * step),
        MapPoint::new(blocker.x - away_x * step, point.y),
        MapPoint::new(point.x, blocker.y - away_y * step),
    ];
    candidates.sort_by(|a, b| {
        a.distance_squared(point)
            .total_cmp(&b.distance_squared(point))
    });

    candidates
        .into_iter()
        .find(|c| c.is_within_location_bounds() && !collides(c, placed))
}

fn nearest_free_lattice_point(point: &MapPoint, placed: &[MapPoint]) -> Option<MapPoint> {
    let lo = LOCATION_MIN_COORD as i32;
    let hi = LOCATION_MAX_COORD as i32;

    (lo..=hi)
        .flat_map(|x| (lo..=hi).map(move |y| MapPoint::new(x as f64, y as f64)))
        .filter(|candidate| !collides(candidate, placed))
        .min_by(|a, b| {
            a.distance_squared(point)
                .total_cmp(&b.distance_squared(point))
        })
}

fn snap_to_grid(points: &[MapPoint]) -> Option<Vec<MapPoint>> {
    let mut free: Vec<MapPoint> = FALLBACK_GRID
        .iter()
        .flat_map(|&x| FALLBACK_GRID.iter().map(move |&y| MapPoint::new(x, y)))
        .collect();

    if points.len() > free.len() {
        return None;
    }

    let mut snapped = Vec::with_capacity(points.len());
    for point in points {
        let (index, _) = free.iter().enumerate().min_by(|(_, a), (_, b)| {
            a.distance_squared(point)
                .total_cmp(&b.distance_squared(point))
        })?;
        snapped.push(free.swap_remove(index));
    }
    Some(snapped)
}

/// A fixed semantic region used as the base point for a decoration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorZone {
    pub label: &'static str,
    pub point: MapPoint,
}

/// Anchor zones indexed by roster slot
pub const DECORATION_ANCHORS: [AnchorZone; 4] = [
    AnchorZone {
        label: "south-east waterside",
        point: MapPoint::new(80.0, 80.0),
    },
    AnchorZone {
        label: "central",
        point: MapPoint::new(50.0, 50.0),
    },
    AnchorZone {
        label: "west roaming",
        point: MapPoint::new(25.0, 70.0),
    },
    AnchorZone {
        label: "north-east",
        point: MapPoint::new(75.0, 20.0),
    },
];

/// Anchor for a roster slot; slots past the table wrap around
pub fn decoration_anchor(slot: usize) -> AnchorZone {
    DECORATION_ANCHORS[slot % DECORATION_ANCHORS.len()]
}
