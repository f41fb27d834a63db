//! File and environment configuration.
//!
//! ```yaml
//! rootUrl: https://catalog.example.com
//! oauth2:
//!   clientId: messaging-client
//!   clientSecret: secret
//!   tokenUrl: https://auth.example.com/oauth2/token
//!   scopes: [message.read, message.write]
//!   authMethod: basic            # or requestBody
//!   refreshThresholdSecs: 60     # optional
//!   defaultTtlSecs: 300          # optional
//! requestTimeoutSecs: 30         # optional
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::client::{
    BeerClient, BeerClientError, ClientAuthMethod, OAuth2Config, OAuth2Error, SecureString,
};

const ENV_ROOT_URL: &str = "BEER_CLIENT_ROOT_URL";
const ENV_CLIENT_ID: &str = "BEER_CLIENT_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "BEER_CLIENT_CLIENT_SECRET";
const ENV_TOKEN_URL: &str = "BEER_CLIENT_TOKEN_URL";
const ENV_SCOPES: &str = "BEER_CLIENT_SCOPES";
const ENV_AUTH_METHOD: &str = "BEER_CLIENT_AUTH_METHOD";
const ENV_REQUEST_TIMEOUT_SECS: &str = "BEER_CLIENT_REQUEST_TIMEOUT_SECS";

/// Errors raised while loading or applying a [`BeerClientConfig`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ConfigError {
    /// The configuration file cannot be read.
    #[display("Cannot read configuration file '{path}': {source}")]
    #[from(skip)]
    Io {
        /// The file path.
        path: String,
        /// The I/O error.
        source: std::io::Error,
    },

    /// The YAML document does not match the configuration shape.
    #[display("Invalid YAML configuration: {reason}")]
    #[from(skip)]
    Yaml {
        /// Parser message.
        reason: String,
    },

    /// A required environment variable is not set.
    #[display("Missing environment variable {name}")]
    #[from(skip)]
    MissingVariable {
        /// Variable name.
        name: &'static str,
    },

    /// A value is present but unusable.
    #[display("Invalid '{field}': {reason}")]
    #[from(skip)]
    Invalid {
        /// Configuration key or variable name.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },

    /// The OAuth2 registration was rejected.
    #[display("Invalid OAuth2 configuration: {_0}")]
    OAuth2(OAuth2Error),

    /// The client could not be built.
    #[display("Cannot build client: {_0}")]
    Client(BeerClientError),
}

/// Client settings, usually loaded from YAML or the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BeerClientConfig {
    /// Catalog root URL.
    pub root_url: String,

    /// Client registration at the authorization server.
    pub oauth2: OAuth2Settings,

    /// Total timeout of each catalog request, in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// OAuth2 client-credentials registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OAuth2Settings {
    /// Client id.
    pub client_id: String,

    /// Client secret.
    pub client_secret: SecureString,

    /// Token endpoint URL.
    pub token_url: String,

    /// Requested scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// How credentials are presented to the token endpoint.
    #[serde(default)]
    pub auth_method: ClientAuthMethod,

    /// Refresh a cached token expiring within this many seconds.
    #[serde(default)]
    pub refresh_threshold_secs: Option<u64>,

    /// Token lifetime assumed when the token endpoint omits `expires_in`.
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
}

impl BeerClientConfig {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML, unknown keys or missing required keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Yaml {
            reason: err.to_string(),
        })
    }

    /// Reads and parses a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or as [`from_yaml_str`](Self::from_yaml_str).
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reads the `BEER_CLIENT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVariable { name })
        };

        let scopes = lookup(ENV_SCOPES)
            .map(|scopes| {
                scopes
                    .split(',')
                    .map(str::trim)
                    .filter(|scope| !scope.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let auth_method = lookup(ENV_AUTH_METHOD)
            .map(|value| parse_auth_method(&value))
            .transpose()?
            .unwrap_or_default();
        let request_timeout_secs = lookup(ENV_REQUEST_TIMEOUT_SECS)
            .map(|value| {
                value.trim().parse::<u64>().map_err(|err| ConfigError::Invalid {
                    field: ENV_REQUEST_TIMEOUT_SECS,
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            root_url: required(ENV_ROOT_URL)?,
            oauth2: OAuth2Settings {
                client_id: required(ENV_CLIENT_ID)?,
                client_secret: required(ENV_CLIENT_SECRET)?.into(),
                token_url: required(ENV_TOKEN_URL)?,
                scopes,
                auth_method,
                refresh_threshold_secs: None,
                default_ttl_secs: None,
            },
            request_timeout_secs,
        })
    }

    /// Checks the settings without contacting any server.
    ///
    /// # Errors
    ///
    /// Fails if a URL is not absolute http(s), the client id or secret is
    /// empty, or the request timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("rootUrl", &self.root_url)?;
        check_http_url("oauth2.tokenUrl", &self.oauth2.token_url)?;

        if self.oauth2.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "oauth2.clientId",
                reason: "must not be empty".to_string(),
            });
        }
        if self.oauth2.client_secret.as_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "oauth2.clientSecret",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "requestTimeoutSecs",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Builds the OAuth2 registration.
    ///
    /// # Errors
    ///
    /// Fails if the registration is rejected.
    pub fn to_oauth2_config(&self) -> Result<OAuth2Config, ConfigError> {
        let settings = &self.oauth2;
        let mut builder = OAuth2Config::client_credentials(
            settings.client_id.clone(),
            settings.client_secret.clone(),
            &settings.token_url,
        )?
        .add_scopes(settings.scopes.iter().cloned())
        .with_auth_method(settings.auth_method);

        if let Some(secs) = settings.refresh_threshold_secs {
            builder = builder.with_refresh_threshold(Duration::from_secs(secs));
        }
        if let Some(secs) = settings.default_ttl_secs {
            builder = builder.with_default_ttl(Duration::from_secs(secs));
        }

        Ok(builder.build()?)
    }
}

impl BeerClient {
    /// Validates `config` and builds a client with its own token provider.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the client cannot be built.
    pub fn from_config(config: &BeerClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = Self::builder()
            .with_root_url(&config.root_url)?
            .with_oauth2(config.to_oauth2_config()?)?;
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.with_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build()?)
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::Invalid {
        field,
        reason: format!("'{value}' is not an absolute URL: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(())
}

fn parse_auth_method(value: &str) -> Result<ClientAuthMethod, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "basic" => Ok(ClientAuthMethod::Basic),
        "requestbody" | "request_body" | "post" => Ok(ClientAuthMethod::RequestBody),
        other => Err(ConfigError::Invalid {
            field: ENV_AUTH_METHOD,
            reason: format!("unknown method '{other}', expected 'basic' or 'requestBody'"),
        }),
    }
}
