use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A position on the warehouse floor, in floor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean_distance(self.x, self.y, other.x, other.y)
    }

    /// Point on the segment `self -> other`, `fraction` 0 is `self`, 1 is `other`.
    pub fn lerp(&self, other: &Point, fraction: f64) -> Point {
        Point {
            x: lerp(self.x, other.x, fraction),
            y: lerp(self.y, other.y, fraction),
        }
    }
}

pub fn lerp(from: f64, to: f64, fraction: f64) -> f64 {
    from + (to - from) * fraction
}

pub fn euclidean_distance(x_1: f64, y_1: f64, x_2: f64, y_2: f64) -> f64 {
    let dx = x_2 - x_1;
    let dy = y_2 - y_1;
    (dx.powi(2) + dy.powi(2)).sqrt()
}
