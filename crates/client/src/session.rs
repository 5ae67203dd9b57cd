use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use model::{request::OptimizeRequest, route::RouteModel, stop::RouteStop};

use crate::{request::RouteRequestBuilder, ApiClient, ApiError, ValidationError};

/// Anything that turns an optimize request into a route.
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<RouteModel, ApiError>;
}

#[async_trait]
impl RouteService for ApiClient {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<RouteModel, ApiError> {
        ApiClient::optimize(self, request).await
    }
}

#[derive(Debug, Clone)]
pub enum SessionError {
    Validation(ValidationError),
    Api(ApiError),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Validation(why) => why.kind(),
            SessionError::Api(why) => why.kind().as_str(),
        }
    }
}

impl error::Error for SessionError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SessionError::Validation(why) => Some(why),
            SessionError::Api(why) => Some(why),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::Validation(why) => write!(f, "Invalid input: {why}"),
            SessionError::Api(why) => write!(f, "{why}"),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(value: ValidationError) -> Self {
        SessionError::Validation(value)
    }
}

impl From<ApiError> for SessionError {
    fn from(value: ApiError) -> Self {
        SessionError::Api(value)
    }
}

/// Caller-side state of the optimize workflow: the current route, the most
/// recent error and the highlighted stop.
///
/// Only the latest outcome is kept. A new route clears the error, a new error
/// replaces the previous one and drops the route.
pub struct OptimizeSession<S> {
    service: S,
    route: Option<Arc<RouteModel>>,
    error: Option<SessionError>,
    highlighted: Option<usize>,
}

impl<S: RouteService> OptimizeSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            route: None,
            error: None,
            highlighted: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn optimize(
        &mut self,
        builder: &RouteRequestBuilder,
    ) -> Result<Arc<RouteModel>, SessionError> {
        let outcome = match builder.build() {
            Ok(request) => self
                .service
                .optimize(&request)
                .await
                .map_err(SessionError::from),
            Err(why) => Err(SessionError::from(why)),
        };

        self.highlighted = None;
        match outcome {
            Ok(route) => {
                let route = Arc::new(route);
                self.route = Some(route.clone());
                self.error = None;
                Ok(route)
            }
            Err(why) => {
                log::warn!("optimization failed ({}): {why}", why.kind());
                self.route = None;
                self.error = Some(why.clone());
                Err(why)
            }
        }
    }

    pub fn route(&self) -> Option<&Arc<RouteModel>> {
        self.route.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Marks the stop at `index`. Returns `false` if there is no such stop.
    pub fn highlight(&mut self, index: usize) -> bool {
        let exists = self
            .route
            .as_ref()
            .is_some_and(|route| index < route.len());
        if exists {
            self.highlighted = Some(index);
        }
        exists
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn highlighted(&self) -> Option<&RouteStop> {
        let index = self.highlighted?;
        self.route.as_ref()?.ordered_stops().get(index)
    }
}
