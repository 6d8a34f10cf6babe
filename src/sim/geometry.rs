//! Axis-aligned rectangle and vector helpers
//!
//! The whole collision layer works on AABBs; everything above it (platform
//! queries, bullet terrain tests, hazard overlap) goes through these
//! primitives.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, stored as min corner + size.
/// The coordinate system is canvas-style (+y down), so `y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rect from a center point and half-extents.
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            x: center.x - half.x,
            y: center.y - half.y,
            w: half.x * 2.0,
            h: half.y * 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict AABB overlap test. Rects that only share an edge do not count
    /// as intersecting, so a body resting exactly on a platform top is not
    /// re-resolved every tick.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Rect translated by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    /// Rect grown by `margin` on every side.
    pub fn inflated(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2.0,
            h: self.h + margin * 2.0,
        }
    }
}

/// Normalize a vector, falling back to the given unit vector when the input
/// is degenerate (zero or near-zero length). Aim and knockback math must
/// never divide by zero.
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO {
        fallback
    } else {
        n
    }
}

/// Squared distance from a point to the closest point on a segment.
/// Used by the AI's incoming-bullet prediction.
pub fn point_segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}
