//! Application manifest domain types
//!
//! Only the fields the push needs are modelled; everything else in the
//! manifest is passed through to cf untouched.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;

use super::deployment::HealthCheckType;

/// Parsed application manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub applications: Vec<ApplicationDescriptor>,
}

impl ManifestDocument {
    /// The descriptor single-app resolution works on
    pub fn first(&self) -> Option<&ApplicationDescriptor> {
        self.applications.first()
    }
}

/// One entry of the `applications` list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationDescriptor {
    #[serde(default)]
    pub name: String,
    pub path: Option<String>,
    #[serde(default)]
    pub buildpacks: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    pub health_check_type: Option<HealthCheckType>,
    pub health_check_http_endpoint: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timeout: Option<String>,
    pub stack: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub no_route: bool,
    #[serde(default)]
    pub random_route: bool,
}

impl ApplicationDescriptor {
    /// Manifest timeout in seconds; unset or unparseable counts as zero
    pub fn timeout_secs(&self) -> i64 {
        self.timeout
            .as_deref()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the artifact path is a glob cf would have to expand
    pub fn has_wildcard_path(&self) -> bool {
        self.path.as_deref().is_some_and(|p| p.contains('*'))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub route: String,
}

/// Rendered manifest copy without routes
///
/// The file is removed when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct NoRouteManifest(Arc<TempPath>);

impl NoRouteManifest {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<TempPath> for NoRouteManifest {
    fn from(path: TempPath) -> Self {
        Self(Arc::new(path))
    }
}

/// Accept `timeout: 80` as well as `timeout: "80"`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
