//! Endpoint configuration for the component interfaces.
//!
//! Both configs deserialize from camelCase JSON with defaults for everything
//! but the host URL, so a minimal document is `{"instance": "..."}` or
//! `{"platformUrl": "..."}`.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::http::Headers;

pub const PRODUCTION_INSTANCE: &str = "https://wenet.u-hopper.com/prod";
pub const DEVELOPMENT_INSTANCE: &str = "https://wenet.u-hopper.com/dev";

pub const COMPONENT_PATH_TASK_MANAGER: &str = "/task_manager";
pub const COMPONENT_PATH_SERVICE: &str = "/service";
/// Service API path used when calls are authorized with an OAuth2 token
/// instead of a component API key.
pub const COMPONENT_PATH_OAUTH: &str = "/api/service";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskManagerConfig {
    #[serde(default = "default_instance")]
    pub instance: String,
    #[serde(default = "default_task_manager_path")]
    pub component_path: String,
    #[serde(default)]
    pub base_headers: Headers,
}

impl TaskManagerConfig {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            component_path: COMPONENT_PATH_TASK_MANAGER.to_string(),
            base_headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_headers.insert(name.into(), value.into());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(&self) -> String {
        join(&self.instance, &self.component_path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("instance", &self.instance)?;
        validate_path("componentPath", &self.component_path)
    }
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self::new(PRODUCTION_INSTANCE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceApiConfig {
    pub platform_url: String,
    #[serde(default = "default_service_path")]
    pub component_path: String,
    #[serde(default)]
    pub extra_headers: Headers,
}

impl ServiceApiConfig {
    pub fn new(platform_url: impl Into<String>) -> Self {
        Self {
            platform_url: platform_url.into(),
            component_path: COMPONENT_PATH_SERVICE.to_string(),
            extra_headers: Headers::new(),
        }
    }

    /// Route calls through the OAuth2 path.
    pub fn oauth(mut self) -> Self {
        self.component_path = COMPONENT_PATH_OAUTH.to_string();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(&self) -> String {
        join(&self.platform_url, &self.component_path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("platformUrl", &self.platform_url)?;
        validate_path("componentPath", &self.component_path)
    }
}

fn default_instance() -> String {
    PRODUCTION_INSTANCE.to_string()
}

fn default_task_manager_path() -> String {
    COMPONENT_PATH_TASK_MANAGER.to_string()
}

fn default_service_path() -> String {
    COMPONENT_PATH_SERVICE.to_string()
}

fn join(host: &str, path: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), path)
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("[{value}] is not an http(s) URL"),
        })
    }
}

fn validate_path(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("[{value}] must start with '/'"),
        })
    }
}
