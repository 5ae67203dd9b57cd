use std::sync::Arc;
use std::time::{Duration, Instant};

use model::{
    health::{HealthResponse, HealthStatus},
    request::OptimizeRequest,
    route::{OptimizeResponse, RouteModel},
};
use reqwest::{
    header::{ACCEPT, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, ORIGIN},
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{ApiConfig, HEALTH_PATH, OPTIMIZE_PATH},
    health::HealthReport,
    ApiError,
};

/// Tolerance used when checking the distance bookkeeping of decoded routes.
const ROUTE_TOLERANCE: f64 = 1e-6;

/// Client of the route optimization service.
///
/// Every call is a single attempt. Retrying is up to the caller, as is
/// making sure only one optimize call is in flight at a time.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Requests an optimized route using the configured timeout.
    pub async fn optimize(&self, request: &OptimizeRequest) -> Result<RouteModel, ApiError> {
        self.send(OPTIMIZE_PATH, request, self.config.timeout, None)
            .await
    }

    /// Like [`ApiClient::optimize`], but the caller may abort the request
    /// with `cancel`. An aborted request fails with [`ApiError::Aborted`].
    pub async fn optimize_with_cancel(
        &self,
        request: &OptimizeRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteModel, ApiError> {
        self.send(OPTIMIZE_PATH, request, self.config.timeout, Some(cancel))
            .await
    }

    /// Posts `payload` to `endpoint` (a path below the API base) and decodes
    /// the answer as a route.
    pub async fn send<B>(
        &self,
        endpoint: &str,
        payload: &B,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<RouteModel, ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response: OptimizeResponse =
            self.post_json(endpoint, payload, timeout, cancel).await?;
        let route = RouteModel::from(response);
        log::debug!("received route with {} stops.", route.len());

        for violation in route.violations(ROUTE_TOLERANCE) {
            log::warn!("inconsistent route from {endpoint}: {violation}");
        }
        Ok(route)
    }

    /// Posts `payload` as JSON and decodes the JSON answer into `T`.
    pub async fn post_json<T, B>(
        &self,
        endpoint: &str,
        payload: &B,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let result = self.try_post_json(endpoint, payload, timeout, cancel).await;
        if let Err(why) = &result {
            log::warn!("{} error: {why}", why.kind());
        }
        result
    }

    async fn try_post_json<T, B>(
        &self,
        endpoint: &str,
        payload: &B,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let base = self.config.checked_base()?;
        let url = format!("{}{endpoint}", base.base);
        log::info!("Requesting endpoint '{url}'.");

        let deadline = time::timeout(
            timeout,
            self.exchange(&url, payload, base.cross_origin.as_deref(), timeout),
        );
        let result = match cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ApiError::Aborted { endpoint: url.clone() });
                }
                result = deadline => result,
            },
            None => deadline.await,
        };
        let (status, body) = result.map_err(|_| ApiError::Timeout {
            endpoint: url.clone(),
            timeout,
        })??;

        if !status.is_success() {
            return Err(ApiError::Http {
                endpoint: url,
                status,
                message: server_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|why| ApiError::Http {
            endpoint: url,
            status,
            message: format!("failed to decode response: {why}"),
        })
    }

    /// Performs the request and reads the body. Cross-origin rules are
    /// applied before the status is looked at.
    async fn exchange<B>(
        &self,
        url: &str,
        payload: &B,
        cross_origin: Option<&str>,
        timeout: Duration,
    ) -> Result<(StatusCode, String), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .json(payload);
        if let Some(origin) = cross_origin {
            request = request.header(ORIGIN, origin);
        }

        let response = request
            .send()
            .await
            .map_err(|why| transport_error(url, why, timeout))?;

        if let Some(origin) = cross_origin {
            allow_origin(url, &response, origin)?;
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|why| transport_error(url, why, timeout))?;
        Ok((status, body))
    }

    /// Checks `GET /actuator/health`. Never fails: every problem is reported
    /// as a `DOWN` status with an error text. The whole exchange, body
    /// included, is bounded by the health timeout, and the cross-origin rule
    /// of optimize calls applies here too.
    pub async fn health(&self) -> HealthReport {
        let base = match self.config.checked_base() {
            Ok(base) => base,
            Err(ApiError::Config { .. }) => {
                return HealthReport::down("API not configured", None)
            }
            Err(why) => return HealthReport::down(why.to_string(), None),
        };
        let endpoint = format!("{}{HEALTH_PATH}", base.base);

        let started = Instant::now();
        let checked = time::timeout(
            self.config.health_timeout,
            self.check_health(&endpoint, base.cross_origin.as_deref(), started),
        )
        .await;
        checked.unwrap_or_else(|_| {
            log::warn!("health check of '{endpoint}' timed out.");
            HealthReport::down("health check timed out", None)
        })
    }

    async fn check_health(
        &self,
        endpoint: &str,
        cross_origin: Option<&str>,
        started: Instant,
    ) -> HealthReport {
        let mut request = self
            .http
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store");
        if let Some(origin) = cross_origin {
            request = request.header(ORIGIN, origin);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(why) => return HealthReport::down(why.to_string(), None),
        };
        let response_time = started.elapsed();

        if let Some(origin) = cross_origin {
            if let Err(why) = allow_origin(endpoint, &response, origin) {
                return HealthReport::down(why.to_string(), Some(response_time));
            }
        }
        if !response.status().is_success() {
            return HealthReport::down(
                format!("HTTP {}", response.status().as_u16()),
                Some(response_time),
            );
        }

        let status = response
            .json::<HealthResponse>()
            .await
            .ok()
            .and_then(|body| body.status)
            .unwrap_or(HealthStatus::Up);
        match status {
            HealthStatus::Up => HealthReport::up(response_time),
            HealthStatus::Down => {
                HealthReport::down("service reported DOWN", Some(response_time))
            }
        }
    }
}

/// Fails with [`ApiError::Cors`] unless the response allows `origin`.
fn allow_origin(url: &str, response: &reqwest::Response, origin: &str) -> Result<(), ApiError> {
    let allowed = response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "*" || value == origin);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Cors {
            endpoint: url.to_owned(),
            origin: origin.to_owned(),
        })
    }
}

fn transport_error(url: &str, why: reqwest::Error, timeout: Duration) -> ApiError {
    if why.is_timeout() {
        ApiError::Timeout {
            endpoint: url.to_owned(),
            timeout,
        }
    } else {
        ApiError::Network {
            endpoint: url.to_owned(),
            source: Arc::new(why),
        }
    }
}

/// Best-effort server message: the `message` or `error` field of a JSON
/// body, else the raw body, else the status text.
pub(crate) fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(text)) = fields.get(key) {
                if !text.is_empty() {
                    return text.clone();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_owned();
    }

    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
