use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::ApiError;

pub const API_BASE_VAR: &str = "PICK_API";
pub const PAGE_ORIGIN_VAR: &str = "PICK_PAGE_ORIGIN";
pub const TIMEOUT_VAR: &str = "PICK_TIMEOUT_MS";
pub const DEV_VAR: &str = "PICK_DEV";

pub const LOCALHOST_FALLBACK: &str = "http://localhost:8080";

pub const HEALTH_PATH: &str = "/actuator/health";
pub const OPTIMIZE_PATH: &str = "/api/optimize";
pub const LAYOUT_PATH: &str = "/api/layout";

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

/// Settings of an [`crate::ApiClient`]. Built once at start-up and handed to
/// the client, which never reads the environment itself.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the optimization service, e.g. `https://pick.example.com`.
    pub api_base: Option<String>,
    /// Origin of the page (or host application) the client runs in.
    pub page_origin: Option<String>,
    pub timeout: Duration,
    pub health_timeout: Duration,
    /// Use [`LOCALHOST_FALLBACK`] when no base is configured. Local development only.
    pub allow_localhost_fallback: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            page_origin: None,
            timeout: Self::DEFAULT_TIMEOUT,
            health_timeout: Self::DEFAULT_HEALTH_TIMEOUT,
            allow_localhost_fallback: false,
        }
    }
}

/// A validated API base.
#[derive(Debug, Clone)]
pub struct ApiBase {
    /// The base without trailing slashes, ready for appending paths.
    pub base: String,
    pub url: Url,
    /// The page origin to announce, when the page and the API are cross-origin.
    pub cross_origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub health: String,
    pub optimize: String,
    pub layout: String,
}

impl ApiConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(12_000);
    pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new<S: Into<String>>(api_base: S) -> Self {
        Self {
            api_base: Some(api_base.into()),
            ..Default::default()
        }
    }

    pub fn with_page_origin<S: Into<String>>(mut self, page_origin: S) -> Self {
        self.page_origin = Some(page_origin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, health_timeout: Duration) -> Self {
        self.health_timeout = health_timeout;
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).and_then(non_blank);

        let timeout = match var(TIMEOUT_VAR) {
            Some(millis) => match millis.trim().parse() {
                Ok(millis) => Duration::from_millis(millis),
                Err(why) => {
                    log::warn!(
                        "{TIMEOUT_VAR}='{millis}' is not a number of milliseconds ({why}), \
                        using {} ms.",
                        Self::DEFAULT_TIMEOUT.as_millis()
                    );
                    Self::DEFAULT_TIMEOUT
                }
            },
            None => Self::DEFAULT_TIMEOUT,
        };
        let allow_localhost_fallback = var(DEV_VAR)
            .is_some_and(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true"));

        Self {
            api_base: var(API_BASE_VAR),
            page_origin: var(PAGE_ORIGIN_VAR),
            timeout,
            health_timeout: Self::DEFAULT_HEALTH_TIMEOUT,
            allow_localhost_fallback,
        }
    }

    /// The configured base, with trailing slashes removed.
    pub fn base_url(&self) -> Result<(String, Url), ApiError> {
        let base = match self.api_base.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => base,
            _ if self.allow_localhost_fallback => {
                log::warn!("{API_BASE_VAR} not configured, using {LOCALHOST_FALLBACK}.");
                LOCALHOST_FALLBACK
            }
            _ => {
                return Err(ApiError::Config {
                    reason: format!("{API_BASE_VAR} is not set"),
                })
            }
        };
        let base = base.trim_end_matches('/').to_owned();

        let url = Url::parse(&base).map_err(|why| ApiError::Config {
            reason: format!("'{base}' is not a valid URL: {why}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApiError::Config {
                reason: format!("'{base}' is not an http(s) URL"),
            });
        }

        Ok((base, url))
    }

    /// Validates the base and checks it against the page origin. Runs before
    /// any request is issued.
    pub fn checked_base(&self) -> Result<ApiBase, ApiError> {
        let (base, url) = self.base_url()?;

        let page_origin = self
            .page_origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty());
        let Some(page_origin) = page_origin else {
            return Ok(ApiBase {
                base,
                url,
                cross_origin: None,
            });
        };
        let page = Url::parse(page_origin).map_err(|why| ApiError::Config {
            reason: format!("page origin '{page_origin}' is not a valid URL: {why}"),
        })?;

        if page.scheme() == "https" && url.scheme() == "http" {
            return Err(ApiError::MixedContent {
                api_base: base,
                page_origin: page.origin().ascii_serialization(),
            });
        }

        let cross_origin = (page.origin() != url.origin())
            .then(|| page.origin().ascii_serialization());
        Ok(ApiBase {
            base,
            url,
            cross_origin,
        })
    }

    pub fn endpoints(&self) -> Result<Endpoints, ApiError> {
        let (base, _) = self.base_url()?;
        Ok(Endpoints {
            health: format!("{base}{HEALTH_PATH}"),
            optimize: format!("{base}{OPTIMIZE_PATH}"),
            layout: format!("{base}{LAYOUT_PATH}"),
        })
    }
}
