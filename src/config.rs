use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderMap;

use crate::error::Error;

/// Default Duphlux API base URL.
pub const DEFAULT_BASE_URL: &str = "https://duphlux.com/webservice/authe";

/// Deployment environment selecting which credential slot signs requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Live,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Environment::Live),
            "test" => Ok(Environment::Test),
            other => Err(Error::Configuration(format!(
                "invalid environment: {other}"
            ))),
        }
    }
}

/// API access token.
///
/// `Debug` and `Display` render `[REDACTED]` in place of the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken {
    value: String,
}

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken([REDACTED])")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for ApiToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ApiToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Per-environment credential slots.
///
/// Replaces the original process-wide token statics: credentials travel with
/// the configuration object instead of hiding in global state.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub live_access_token: Option<ApiToken>,
    pub test_access_token: Option<ApiToken>,
}

impl Credentials {
    pub fn for_environment(&self, environment: Environment) -> Option<&ApiToken> {
        match environment {
            Environment::Live => self.live_access_token.as_ref(),
            Environment::Test => self.test_access_token.as_ref(),
        }
    }
}

/// Configuration for the verification client.
#[derive(Debug, Clone)]
pub struct DuphluxConfig {
    pub base_url: String,
    pub environment: Environment,
    /// Explicit token override. Takes precedence over the credential slots.
    pub token: Option<ApiToken>,
    pub credentials: Credentials,
    /// TLS peer verification for the default transport. Enabled by default.
    pub verify_peer: bool,
    /// Transport-level request timeout. None dispatches without a deadline.
    pub timeout: Option<Duration>,
    /// Extra headers merged after the three fixed service headers.
    pub extra_headers: HeaderMap,
}

impl DuphluxConfig {
    /// Configuration with an explicit token for the given environment.
    pub fn new(token: impl Into<ApiToken>, environment: Environment) -> Self {
        Self {
            token: Some(token.into()),
            environment,
            ..Self::default()
        }
    }

    /// Read configuration from environment variables.
    ///
    /// Expects:
    /// - `DUPHLUX_BASE_URL`: service base URL (default: the public API)
    /// - `DUPHLUX_ENVIRONMENT`: `live` or `test` (default: `live`)
    /// - `DUPHLUX_LIVE_ACCESS_TOKEN` / `DUPHLUX_TEST_ACCESS_TOKEN`: credential
    ///   slots; the one matching the environment is required
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("DUPHLUX_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let environment = match std::env::var("DUPHLUX_ENVIRONMENT") {
            Ok(raw) => raw.parse::<Environment>()?,
            Err(_) => Environment::Live,
        };
        let credentials = Credentials {
            live_access_token: std::env::var("DUPHLUX_LIVE_ACCESS_TOKEN")
                .ok()
                .map(ApiToken::new),
            test_access_token: std::env::var("DUPHLUX_TEST_ACCESS_TOKEN")
                .ok()
                .map(ApiToken::new),
        };

        let config = Self {
            base_url,
            environment,
            credentials,
            ..Self::default()
        };
        config.resolve_token()?;

        Ok(config)
    }

    /// The token the client will sign requests with: the explicit override
    /// when present, otherwise the slot matching the environment.
    pub fn resolve_token(&self) -> Result<&ApiToken, Error> {
        self.token
            .as_ref()
            .or_else(|| self.credentials.for_environment(self.environment))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no {} access token configured",
                    self.environment
                ))
            })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_token(mut self, token: impl Into<ApiToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_live_access_token(mut self, token: impl Into<ApiToken>) -> Self {
        self.credentials.live_access_token = Some(token.into());
        self
    }

    pub fn with_test_access_token(mut self, token: impl Into<ApiToken>) -> Self {
        self.credentials.test_access_token = Some(token.into());
        self
    }

    pub fn with_verify_peer(mut self, verify_peer: bool) -> Self {
        self.verify_peer = verify_peer;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_extra_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers = headers;
        self
    }
}

impl Default for DuphluxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            environment: Environment::Live,
            token: None,
            credentials: Credentials::default(),
            verify_peer: true,
            timeout: None,
            extra_headers: HeaderMap::new(),
        }
    }
}
