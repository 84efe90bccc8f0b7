//! Collision detection between the vessel hull and circular obstacles
//!
//! The hull is approximated by a circle. Checks run against the true state,
//! not the navigator's estimate.

use glam::DVec2;

use super::obstacle::Obstacle;

/// Which obstacle list a contact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Static,
    Dynamic,
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub kind: ObstacleKind,
    /// Index into the obstacle list of that kind
    pub index: usize,
    /// Negative when overlapping
    pub clearance: f64,
}

/// Gap between two circles; negative means they overlap
#[inline]
pub fn clearance(a_pos: DVec2, a_radius: f64, b_pos: DVec2, b_radius: f64) -> f64 {
    a_pos.distance(b_pos) - a_radius - b_radius
}

/// Strict overlap test, touching circles do not collide
#[inline]
pub fn circles_overlap(a_pos: DVec2, a_radius: f64, b_pos: DVec2, b_radius: f64) -> bool {
    clearance(a_pos, a_radius, b_pos, b_radius) < 0.0
}

/// First obstacle in list order that overlaps the hull
pub fn first_collision<O: Obstacle>(
    hull_pos: DVec2,
    hull_radius: f64,
    obstacles: &[O],
    kind: ObstacleKind,
) -> Option<Contact> {
    obstacles.iter().enumerate().find_map(|(index, o)| {
        let gap = clearance(hull_pos, hull_radius, o.position(), o.radius());
        (gap < 0.0).then_some(Contact {
            kind,
            index,
            clearance: gap,
        })
    })
}

/// First collision checking static obstacles before dynamic ones
pub fn vessel_collision<S: Obstacle, D: Obstacle>(
    hull_pos: DVec2,
    hull_radius: f64,
    static_obstacles: &[S],
    dynamic_obstacles: &[D],
) -> Option<Contact> {
    first_collision(hull_pos, hull_radius, static_obstacles, ObstacleKind::Static)
        .or_else(|| first_collision(hull_pos, hull_radius, dynamic_obstacles, ObstacleKind::Dynamic))
}
