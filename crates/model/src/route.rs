use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo::Point;

use crate::{
    stop::{RouteStop, Waypoint},
    ExampleData,
};

/// An optimized route as returned by the optimization service.
///
/// A `RouteModel` is never mutated after construction. Callers that need to
/// mark a stop (highlighting, playback) keep an index next to it.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteModel {
    ordered_stops: Vec<RouteStop>,
    total_distance: f64,
    strategy: String,
}

impl RouteModel {
    pub fn empty<S: Into<String>>(strategy: S) -> Self {
        Self {
            ordered_stops: vec![],
            total_distance: 0.0,
            strategy: strategy.into(),
        }
    }

    /// Builds a route that visits `waypoints` in order, with straight-line
    /// legs between consecutive waypoints.
    pub fn through<S: Into<String>>(strategy: S, waypoints: Vec<Waypoint>) -> Self {
        let mut ordered_stops = Vec::with_capacity(waypoints.len());
        let mut cumulative_distance = 0.0;
        let mut previous = None;

        for (index, waypoint) in waypoints.into_iter().enumerate() {
            let leg_distance = previous
                .map(|from: Point| from.distance_to(&waypoint.position))
                .unwrap_or(0.0);
            cumulative_distance += leg_distance;
            previous = Some(waypoint.position);

            ordered_stops.push(RouteStop {
                sequence: index as u32 + 1,
                location_code: waypoint.location_code,
                sku: waypoint.sku,
                x: waypoint.position.x,
                y: waypoint.position.y,
                leg_distance,
                cumulative_distance,
            });
        }

        Self {
            ordered_stops,
            total_distance: cumulative_distance,
            strategy: strategy.into(),
        }
    }

    pub fn ordered_stops(&self) -> &[RouteStop] {
        &self.ordered_stops
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn len(&self) -> usize {
        self.ordered_stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_stops.is_empty()
    }

    /// Routes with fewer than two stops have no path to draw.
    pub fn is_degenerate(&self) -> bool {
        self.ordered_stops.len() < 2
    }

    pub fn first(&self) -> Option<&RouteStop> {
        self.ordered_stops.first()
    }

    pub fn last(&self) -> Option<&RouteStop> {
        self.ordered_stops.last()
    }

    pub fn picks(&self) -> impl Iterator<Item = &RouteStop> {
        self.ordered_stops.iter().filter(|stop| stop.is_pick())
    }

    /// Checks sequence numbering and the distance bookkeeping of every stop.
    /// An empty result means the route is consistent.
    pub fn violations(&self, tolerance: f64) -> Vec<RouteViolation> {
        let mut violations = vec![];
        let mut running = 0.0;

        for (index, stop) in self.ordered_stops.iter().enumerate() {
            if stop.sequence as usize != index + 1 {
                violations.push(RouteViolation::Sequence {
                    index,
                    sequence: stop.sequence,
                });
            }
            if stop.leg_distance < 0.0 {
                violations.push(RouteViolation::NegativeLeg {
                    index,
                    leg_distance: stop.leg_distance,
                });
            }
            if index == 0 && stop.leg_distance != 0.0 {
                violations.push(RouteViolation::FirstLeg {
                    leg_distance: stop.leg_distance,
                });
            }
            running += stop.leg_distance;
            if (stop.cumulative_distance - running).abs() > tolerance {
                violations.push(RouteViolation::Cumulative {
                    index,
                    expected: running,
                    actual: stop.cumulative_distance,
                });
            }
        }

        if let Some(last) = self.ordered_stops.last() {
            if (last.cumulative_distance - self.total_distance).abs() > tolerance {
                violations.push(RouteViolation::Total {
                    expected: last.cumulative_distance,
                    actual: self.total_distance,
                });
            }
        }

        violations
    }
}

impl ExampleData for RouteModel {
    fn example_data() -> Self {
        RouteModel::through(
            "enhanced_two_opt",
            vec![
                Waypoint::pass("R001", 0.0, 0.0),
                Waypoint::pick("A01", "SKU-APPLE", 10.0, 0.0),
                Waypoint::pick("A07", "SKU-BREAD", 10.0, 12.0),
                Waypoint::pick("B03", "SKU-RICE", 22.0, 12.0),
                Waypoint::pick("C02", "SKU-MILK", 34.0, 4.0),
                Waypoint::pass("P001", 40.0, 0.0),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteViolation {
    Sequence { index: usize, sequence: u32 },
    NegativeLeg { index: usize, leg_distance: f64 },
    FirstLeg { leg_distance: f64 },
    Cumulative { index: usize, expected: f64, actual: f64 },
    Total { expected: f64, actual: f64 },
}

impl fmt::Display for RouteViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteViolation::Sequence { index, sequence } => {
                write!(f, "stop {index} has sequence {sequence}")
            }
            RouteViolation::NegativeLeg {
                index,
                leg_distance,
            } => write!(f, "stop {index} has negative leg distance {leg_distance}"),
            RouteViolation::FirstLeg { leg_distance } => {
                write!(f, "first stop has leg distance {leg_distance}")
            }
            RouteViolation::Cumulative {
                index,
                expected,
                actual,
            } => write!(
                f,
                "stop {index} has cumulative distance {actual}, expected {expected}"
            ),
            RouteViolation::Total { expected, actual } => {
                write!(f, "total distance is {actual}, expected {expected}")
            }
        }
    }
}

/// A stop as it appears in the optimize response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStop {
    /// Sent by some service versions; stops are renumbered by array position.
    pub sequence: Option<i64>,
    #[serde(alias = "location")]
    pub location_code: String,
    pub sku: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub leg_distance: f64,
    pub cumulative_distance: f64,
}

/// Body of a successful `POST /api/optimize`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub ordered_stops: Vec<ResponseStop>,
    pub total_distance: f64,
    #[serde(default)]
    pub strategy: String,
}

impl From<OptimizeResponse> for RouteModel {
    fn from(response: OptimizeResponse) -> Self {
        let ordered_stops = response
            .ordered_stops
            .into_iter()
            .enumerate()
            .map(|(index, stop)| RouteStop {
                sequence: index as u32 + 1,
                location_code: stop.location_code,
                sku: stop.sku,
                x: stop.x,
                y: stop.y,
                leg_distance: stop.leg_distance,
                cumulative_distance: stop.cumulative_distance,
            })
            .collect();

        Self {
            ordered_stops,
            total_distance: response.total_distance,
            strategy: response.strategy,
        }
    }
}
