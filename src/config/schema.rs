//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the router and the
//! `nav-router` binary. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Router behaviour (url scheme, fallback path).
    pub router: RouterConfig,

    /// Route table, registered in order.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How the router maps urls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Literal prefix in front of every path (e.g. "#!"). Empty selects
    /// history-API urls.
    pub prefix: String,

    /// Path to dispatch when a url matches no route.
    pub otherwise: Option<String>,

    /// Whether `go` and `reload` rewrite the location after commit.
    pub update_location: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefix: "#!".to_string(),
            otherwise: None,
            update_location: true,
        }
    }
}

impl RouterConfig {
    /// Url mode implied by the prefix.
    pub fn mode(&self) -> UrlMode {
        if self.prefix.is_empty() {
            UrlMode::History
        } else {
            UrlMode::Hash
        }
    }
}

/// Where the router keeps its state in the browser url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    /// Path lives in the fragment, behind the prefix.
    Hash,
    /// Path is the real url path.
    History,
}

/// One route of the table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route name; dots imply the parent.
    pub name: String,

    /// Url segment owned by the route.
    #[serde(default)]
    pub url: String,

    /// Explicit parent name.
    #[serde(default)]
    pub parent: Option<String>,

    /// Abstract routes are ancestors only.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Display title (defaults to the name).
    #[serde(default)]
    pub title: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
