use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo::Point;

/// One visited location of an optimized route.
///
/// `sku` is `None` for waypoints that are not picks (start, end, staging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    /// 1-based position in visit order.
    pub sequence: u32,
    pub location_code: String,
    pub sku: Option<String>,
    pub x: f64,
    pub y: f64,
    pub leg_distance: f64,
    pub cumulative_distance: f64,
}

impl RouteStop {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pick(&self) -> bool {
        self.sku.is_some()
    }

    /// Coarse zone of the stop: the first character of its location code.
    pub fn zone(&self) -> Option<char> {
        self.location_code.chars().next()
    }
}

/// A stop as it is handed to [`crate::route::RouteModel::through`], before
/// sequence and distances are known.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub location_code: String,
    pub sku: Option<String>,
    pub position: Point,
}

impl Waypoint {
    pub fn pick<S: Into<String>, K: Into<String>>(
        location_code: S,
        sku: K,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            location_code: location_code.into(),
            sku: Some(sku.into()),
            position: Point::new(x, y),
        }
    }

    pub fn pass<S: Into<String>>(location_code: S, x: f64, y: f64) -> Self {
        Self {
            location_code: location_code.into(),
            sku: None,
            position: Point::new(x, y),
        }
    }
}
