use std::{borrow::Cow, convert::Infallible, fmt, str::FromStr};

use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::ExampleData;

/// Name of the optimization algorithm. Unknown names are forwarded unchanged,
/// the service decides whether it accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    NearestNeighbor,
    #[default]
    EnhancedTwoOpt,
    OrOpt,
    Hybrid,
    Other(String),
}

impl Strategy {
    pub const KNOWN: [Strategy; 4] = [
        Strategy::NearestNeighbor,
        Strategy::EnhancedTwoOpt,
        Strategy::OrOpt,
        Strategy::Hybrid,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Strategy::NearestNeighbor => "nearest_neighbor",
            Strategy::EnhancedTwoOpt => "enhanced_two_opt",
            Strategy::OrOpt => "or_opt",
            Strategy::Hybrid => "hybrid",
            Strategy::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Strategy::Other(_))
    }
}

impl From<String> for Strategy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "nearest_neighbor" => Strategy::NearestNeighbor,
            "enhanced_two_opt" => Strategy::EnhancedTwoOpt,
            "or_opt" => Strategy::OrOpt,
            "hybrid" => Strategy::Hybrid,
            _ => Strategy::Other(value),
        }
    }
}

impl From<&str> for Strategy {
    fn from(value: &str) -> Self {
        Strategy::from(value.to_owned())
    }
}

impl From<Strategy> for String {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for Strategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Strategy::from(s))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl JsonSchema for Strategy {
    fn schema_name() -> String {
        "Strategy".to_owned()
    }

    fn schema_id() -> Cow<'static, str> {
        Cow::Borrowed("Strategy")
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// Route constraints. Fields left as `None` are filled in by the service,
/// unless [`RouteConstraints::with_defaults`] is applied first.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteConstraints {
    pub max_capacity: Option<u32>,
    pub max_time_minutes: Option<u32>,
    pub avoid_blocked_zones: Option<bool>,
    pub allow_aisle_crossing: Option<bool>,
}

impl RouteConstraints {
    pub const DEFAULT_MAX_CAPACITY: u32 = 100;
    pub const DEFAULT_MAX_TIME_MINUTES: u32 = 60;
    pub const DEFAULT_AVOID_BLOCKED_ZONES: bool = true;
    pub const DEFAULT_ALLOW_AISLE_CROSSING: bool = false;

    pub fn full_defaults() -> Self {
        Self::default().with_defaults()
    }

    pub fn with_defaults(self) -> Self {
        Self {
            max_capacity: self.max_capacity.or(Some(Self::DEFAULT_MAX_CAPACITY)),
            max_time_minutes: self
                .max_time_minutes
                .or(Some(Self::DEFAULT_MAX_TIME_MINUTES)),
            avoid_blocked_zones: self
                .avoid_blocked_zones
                .or(Some(Self::DEFAULT_AVOID_BLOCKED_ZONES)),
            allow_aisle_crossing: self
                .allow_aisle_crossing
                .or(Some(Self::DEFAULT_ALLOW_AISLE_CROSSING)),
        }
    }
}

/// Penalty weights of the service's cost function.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostWeights {
    pub distance_weight: Option<f64>,
    pub aisle_crossing_penalty: Option<f64>,
    pub turn_penalty: Option<f64>,
    pub blocked_zone_penalty: Option<f64>,
    pub capacity_violation_penalty: Option<f64>,
}

impl CostWeights {
    pub const DEFAULT_DISTANCE_WEIGHT: f64 = 1.0;
    pub const DEFAULT_AISLE_CROSSING_PENALTY: f64 = 5.0;
    pub const DEFAULT_TURN_PENALTY: f64 = 2.0;
    pub const DEFAULT_BLOCKED_ZONE_PENALTY: f64 = 100.0;
    pub const DEFAULT_CAPACITY_VIOLATION_PENALTY: f64 = 50.0;

    pub fn full_defaults() -> Self {
        Self::default().with_defaults()
    }

    pub fn with_defaults(self) -> Self {
        Self {
            distance_weight: self
                .distance_weight
                .or(Some(Self::DEFAULT_DISTANCE_WEIGHT)),
            aisle_crossing_penalty: self
                .aisle_crossing_penalty
                .or(Some(Self::DEFAULT_AISLE_CROSSING_PENALTY)),
            turn_penalty: self.turn_penalty.or(Some(Self::DEFAULT_TURN_PENALTY)),
            blocked_zone_penalty: self
                .blocked_zone_penalty
                .or(Some(Self::DEFAULT_BLOCKED_ZONE_PENALTY)),
            capacity_violation_penalty: self
                .capacity_violation_penalty
                .or(Some(Self::DEFAULT_CAPACITY_VIOLATION_PENALTY)),
        }
    }
}

/// Body of `POST /api/optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub skus: Vec<String>,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<RouteConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<CostWeights>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
}

impl ExampleData for OptimizeRequest {
    fn example_data() -> Self {
        Self {
            skus: ["SKU-APPLE", "SKU-RICE", "SKU-MILK", "SKU-BREAD", "SKU-PASTA"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            strategy: Strategy::EnhancedTwoOpt,
            constraints: Some(RouteConstraints::full_defaults()),
            weights: Some(CostWeights::full_defaults()),
            start_location: Some("R001".to_owned()),
            end_location: Some("P001".to_owned()),
        }
    }
}
