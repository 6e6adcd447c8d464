//! Mug slide scoring
//!
//! Closed-form slide: power maps to travel distance through a power curve,
//! the angle deflects the mug sideways, and the landing point is scored
//! against concentric target rings. Geometry comes from the presentation
//! layer; the default table uses table units with the launch origin at the
//! near edge and the far edge at negative y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// A slide input: power (0-100) and deflection from straight (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub power: f32,
    pub angle: f32,
}

impl Shot {
    pub fn new(power: f32, angle: f32) -> Self {
        Self { power, angle }
    }
}

/// Axis-aligned playing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableBounds {
    pub min: Vec2,
    pub max: Vec2,
}

/// Target center and ring radii, innermost first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRings {
    pub center: Vec2,
    pub radii: [f32; 4],
}

impl TargetRings {
    pub fn new(center: Vec2, mut radii: [f32; 4]) -> Self {
        radii.sort_by(|a, b| a.total_cmp(b));
        Self { center, radii }
    }

    /// Score an on-table landing point
    pub fn classify(&self, point: Vec2) -> SlideOutcome {
        let dist = point.distance(self.center);
        Ring::ALL
            .iter()
            .zip(self.radii.iter())
            .find(|(_, radius)| dist <= **radius)
            .map(|(ring, _)| SlideOutcome::Ring(*ring))
            .unwrap_or(SlideOutcome::Miss)
    }
}

/// Table layout used for landing resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableGeometry {
    /// Where the mug starts
    pub origin: Vec2,
    pub bounds: TableBounds,
    pub target: TargetRings,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::new(TABLE_LENGTH, TABLE_WIDTH, TARGET_CENTER_PERCENTAGE, RING_RADII)
    }
}

impl TableGeometry {
    /// Table of the given size with the target at `target_percentage` of its length
    pub fn new(length: f32, width: f32, target_percentage: f32, radii: [f32; 4]) -> Self {
        let half_width = width / 2.0;
        Self {
            origin: Vec2::ZERO,
            bounds: TableBounds {
                min: Vec2::new(-half_width, -length),
                max: Vec2::new(half_width, 0.0),
            },
            target: TargetRings::new(Vec2::new(0.0, -length * target_percentage), radii),
        }
    }

    /// Default layout with the target placed where the tuning expects it
    pub fn for_tuning(tuning: &Tuning) -> Self {
        Self::new(
            TABLE_LENGTH,
            TABLE_WIDTH,
            tuning.target_center_percentage(),
            RING_RADII,
        )
    }

    /// Distance from the origin to the far edge
    pub fn travel_length(&self) -> f32 {
        self.origin.y - self.bounds.min.y
    }

    /// Reaching the far edge counts as leaving the table
    pub fn on_table(&self, point: Vec2) -> bool {
        let TableBounds { min, max } = self.bounds;
        point.x >= min.x && point.x <= max.x && point.y > min.y && point.y <= max.y
    }
}

/// Target rings, innermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ring {
    Bullseye,
    Inner,
    Middle,
    Outer,
}

impl Ring {
    pub const ALL: [Ring; 4] = [Ring::Bullseye, Ring::Inner, Ring::Middle, Ring::Outer];

    pub fn points(&self) -> u32 {
        match self {
            Ring::Bullseye => 100,
            Ring::Inner => 50,
            Ring::Middle => 20,
            Ring::Outer => 10,
        }
    }
}

/// Where a slide ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideOutcome {
    /// Left the table
    Foul,
    /// On the table but outside every ring
    Miss,
    Ring(Ring),
}

impl SlideOutcome {
    pub fn points(&self) -> u32 {
        match self {
            SlideOutcome::Foul | SlideOutcome::Miss => 0,
            SlideOutcome::Ring(ring) => ring.points(),
        }
    }
}

/// A resolved slide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideResult {
    pub shot: Shot,
    /// Travel distance along the slide direction
    pub distance: f32,
    pub landing: Vec2,
    pub outcome: SlideOutcome,
}

impl SlideResult {
    pub fn points(&self) -> u32 {
        self.outcome.points()
    }
}

/// Travel distance for a power value, clamped to the power meter
pub fn travel_distance(power: f32, tuning: &Tuning, travel_length: f32) -> f32 {
    let power = power.clamp(0.0, MAX_POWER);
    travel_length * (power / tuning.foul_power()).powf(tuning.physics_exponent())
}

/// Inverse of `travel_distance`
pub fn power_for_distance(distance: f32, tuning: &Tuning, travel_length: f32) -> f32 {
    let fraction = (distance / travel_length).max(0.0);
    tuning.foul_power() * fraction.powf(1.0 / tuning.physics_exponent())
}

/// Compute the landing point of a shot and score it
pub fn resolve_slide(shot: Shot, tuning: &Tuning, geometry: &TableGeometry) -> SlideResult {
    let distance = travel_distance(shot.power, tuning, geometry.travel_length());
    let angle = shot.angle.to_radians();
    let landing = geometry.origin + Vec2::new(distance * angle.sin(), -distance * angle.cos());

    let outcome = if geometry.on_table(landing) {
        geometry.target.classify(landing)
    } else {
        SlideOutcome::Foul
    };

    SlideResult {
        shot,
        distance,
        landing,
        outcome,
    }
}

/// Power from the power meter fill fraction (0-1)
pub fn power_from_meter(fill: f32) -> f32 {
    fill.clamp(0.0, 1.0) * MAX_POWER
}

/// Angle from the angle indicator offset relative to the meter center (-0.5 to 0.5)
pub fn angle_from_meter(offset: f32) -> f32 {
    offset.clamp(-0.5, 0.5) * 2.0 * MAX_ANGLE_DEGREES
}
