use std::error;
use std::fmt;

use model::request::{CostWeights, OptimizeRequest, RouteConstraints, Strategy};

/// Rejected user input. Raised before any request is built, so it never
/// reaches the [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoSkus,
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        "VALIDATION"
    }
}

impl error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::NoSkus => write!(f, "no SKUs"),
        }
    }
}

/// Splits a comma separated SKU list, trimming whitespace and dropping
/// empty entries. Order and duplicates are kept.
pub fn parse_skus(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|sku| !sku.is_empty())
        .map(str::to_owned)
        .collect()
}

fn location(code: &str) -> Option<String> {
    let code = code.trim();
    (!code.is_empty()).then(|| code.to_owned())
}

/// Turns raw form input into an [`OptimizeRequest`].
#[derive(Debug, Clone, Default)]
pub struct RouteRequestBuilder {
    skus: String,
    strategy: Strategy,
    start_location: Option<String>,
    end_location: Option<String>,
    constraints: Option<RouteConstraints>,
    weights: Option<CostWeights>,
    full_settings: bool,
}

impl RouteRequestBuilder {
    pub fn new<S: Into<String>>(skus: S) -> Self {
        Self {
            skus: skus.into(),
            ..Default::default()
        }
    }

    pub fn strategy<S: Into<Strategy>>(mut self, strategy: S) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Blank codes leave the start to the service.
    pub fn start_location(mut self, code: &str) -> Self {
        self.start_location = location(code);
        self
    }

    pub fn end_location(mut self, code: &str) -> Self {
        self.end_location = location(code);
        self
    }

    pub fn constraints(mut self, constraints: RouteConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn weights(mut self, weights: CostWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Always send complete constraints and weights, filling every field
    /// the caller left open with its documented default.
    pub fn full_settings(mut self, full_settings: bool) -> Self {
        self.full_settings = full_settings;
        self
    }

    pub fn build(&self) -> Result<OptimizeRequest, ValidationError> {
        let skus = parse_skus(&self.skus);
        if skus.is_empty() {
            return Err(ValidationError::NoSkus);
        }

        let (constraints, weights) = if self.full_settings {
            (
                Some(self.constraints.clone().unwrap_or_default().with_defaults()),
                Some(self.weights.clone().unwrap_or_default().with_defaults()),
            )
        } else {
            (self.constraints.clone(), self.weights.clone())
        };

        Ok(OptimizeRequest {
            skus,
            strategy: self.strategy.clone(),
            constraints,
            weights,
            start_location: self.start_location.clone(),
            end_location: self.end_location.clone(),
        })
    }
}
