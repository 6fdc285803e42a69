//! Application manifest loading
//!
//! Reads a cf application manifest, substitutes `((variables))` from an
//! optional vars file and derives the no-route variant used by `--no-route`.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::domain::{ManifestDocument, NoRouteManifest};
use crate::error::ManifestError;

/// `((name))` placeholders of cf manifest variables
static PLACEHOLDER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Result of loading a manifest
#[derive(Debug, Clone)]
pub struct ParsedManifest {
    pub document: ManifestDocument,
    /// Manifest after variable substitution
    pub rendered: Value,
}

/// Source of parsed application manifests
pub trait ManifestProvider {
    /// Parse the manifest at `path`, substituting variables from `vars_file`
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the manifest or vars file cannot be read
    /// or parsed, or the manifest has no usable application.
    fn parse(&self, path: &Path, vars_file: Option<&Path>)
        -> Result<ParsedManifest, ManifestError>;

    /// Persist a copy of `parsed` with every route removed and `no-route: true` set
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::WriteNoRoute`] when the copy cannot be written.
    fn write_no_route(&self, parsed: &ParsedManifest) -> Result<NoRouteManifest, ManifestError>;
}

/// Manifest provider for YAML files on disk
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlManifestProvider;

impl ManifestProvider for YamlManifestProvider {
    fn parse(
        &self,
        path: &Path,
        vars_file: Option<&Path>,
    ) -> Result<ParsedManifest, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let vars = match vars_file {
            Some(vars_path) => load_vars(vars_path)?,
            None => Mapping::new(),
        };
        let content = substitute_vars(&content, &vars)?;

        let rendered: Value =
            serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let document: ManifestDocument =
            serde_yaml::from_value(rendered.clone()).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if document.applications.is_empty() {
            return Err(ManifestError::NoApplications {
                path: path.to_path_buf(),
            });
        }
        if let Some(index) = document
            .applications
            .iter()
            .position(|app| app.name.trim().is_empty())
        {
            return Err(ManifestError::MissingName {
                path: path.to_path_buf(),
                index,
            });
        }

        Ok(ParsedManifest { document, rendered })
    }

    fn write_no_route(&self, parsed: &ParsedManifest) -> Result<NoRouteManifest, ManifestError> {
        let mut no_route = parsed.rendered.clone();
        if let Some(apps) = no_route
            .get_mut("applications")
            .and_then(Value::as_sequence_mut)
        {
            for app in apps.iter_mut().filter_map(Value::as_mapping_mut) {
                app.remove("routes");
                app.remove("random-route");
                app.insert(Value::from("no-route"), Value::Bool(true));
            }
        }

        let yaml = serde_yaml::to_string(&no_route)
            .map_err(|e| ManifestError::WriteNoRoute(e.to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("no-route-manifest-")
            .suffix(".yml")
            .tempfile()
            .map_err(|e| ManifestError::WriteNoRoute(e.to_string()))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| ManifestError::WriteNoRoute(e.to_string()))?;

        let manifest = NoRouteManifest::from(file.into_temp_path());
        debug!("Wrote no-route manifest to {}", manifest.path().display());
        Ok(manifest)
    }
}

fn load_vars(path: &Path) -> Result<Mapping, ManifestError> {
    let vars_error = |message: String| ManifestError::VarsFile {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| vars_error(e.to_string()))?;
    match serde_yaml::from_str::<Value>(&content).map_err(|e| vars_error(e.to_string()))? {
        Value::Mapping(vars) => Ok(vars),
        Value::Null => Ok(Mapping::new()),
        _ => Err(vars_error("expected a mapping of variable names to values".to_string())),
    }
}

/// Replace `((name))` placeholders; every placeholder must have a value
fn substitute_vars(content: &str, vars: &Mapping) -> Result<String, ManifestError> {
    let placeholder = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\(\(([A-Za-z0-9_.\-]+)\)\)"))
        .as_ref()
        .map_err(|e| ManifestError::Pattern(e.to_string()))?;

    let mut missing: Vec<String> = Vec::new();
    let rendered = placeholder.replace_all(content, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => render_scalar(value),
            None => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    if !missing.is_empty() {
        return Err(ManifestError::UnresolvedVariables { names: missing });
    }
    Ok(rendered.into_owned())
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const MANIFEST: &str = r#"
applications:
- name: myApp
  path: build/libs/app.jar
  buildpacks:
  - java_buildpack
  - go_buildpack
  services:
  - service1
  - service2
  routes:
  - route: myapp.example.com
"#;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_complete_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "manifest.yml", MANIFEST);

        let parsed = YamlManifestProvider.parse(&path, None).unwrap();
        let app = parsed.document.first().unwrap();
        assert_eq!(app.name, "myApp");
        assert_eq!(app.buildpacks, vec!["java_buildpack", "go_buildpack"]);
        assert_eq!(app.services, vec!["service1", "service2"]);
        assert_eq!(app.routes.len(), 1);
    }

    #[test]
    fn test_parse_multi_application_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "multi.yml",
            "applications:\n- name: myApp\n- name: myApp2\n",
        );

        let parsed = YamlManifestProvider.parse(&path, None).unwrap();
        assert_eq!(parsed.document.applications.len(), 2);
        assert_eq!(parsed.document.applications[1].name, "myApp2");
    }

    #[test]
    fn test_no_route_manifest_strips_routes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "manifest.yml", MANIFEST);

        let parsed = YamlManifestProvider.parse(&path, None).unwrap();
        let manifest = YamlManifestProvider.write_no_route(&parsed).unwrap();
        let content = fs::read_to_string(manifest.path()).unwrap();
        let no_route: ManifestDocument = serde_yaml::from_str(&content).unwrap();
        let app = no_route.first().unwrap();
        assert!(app.no_route);
        assert!(app.routes.is_empty());
        assert_eq!(app.services, vec!["service1", "service2"]);
    }

    #[test]
    fn test_no_route_manifest_is_not_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "manifest.yml",
            "applications:\n- name: ((app))\n  routes:\n  - route: ((host))\n",
        );
        let vars = write(&dir, "vars.yml", "app: svc1\nhost: secret.example.com\n");

        let parsed = YamlManifestProvider.parse(&path, Some(&vars)).unwrap();
        let manifest = YamlManifestProvider.write_no_route(&parsed).unwrap();
        let rendered_path = manifest.path().to_path_buf();
        assert!(fs::read_to_string(&rendered_path).unwrap().contains("svc1"));

        drop(manifest);
        assert!(!rendered_path.exists());
    }

    #[test]
    fn test_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "invalid.yml", "applications:\n- name: [unclosed\n");

        let err = YamlManifestProvider.parse(&path, None).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_missing_manifest() {
        let err = YamlManifestProvider
            .parse(Path::new("/nonexistent/manifest.yml"), None)
            .unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_manifest_without_applications() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.yml", "applications: []\n");

        let err = YamlManifestProvider.parse(&path, None).unwrap_err();
        assert!(matches!(err, ManifestError::NoApplications { .. }));
    }

    #[test]
    fn test_application_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "noname.yml", "applications:\n- name: a\n- path: x\n");

        let err = YamlManifestProvider.parse(&path, None).unwrap_err();
        assert!(matches!(err, ManifestError::MissingName { index: 1, .. }));
    }

    #[test]
    fn test_vars_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "manifest.yml",
            "applications:\n- name: ((app))\n  timeout: ((timeout))\n",
        );
        let vars = write(&dir, "vars.yml", "app: svc1\ntimeout: 90\n");

        let parsed = YamlManifestProvider.parse(&path, Some(&vars)).unwrap();
        let app = parsed.document.first().unwrap();
        assert_eq!(app.name, "svc1");
        assert_eq!(app.timeout_secs(), 90);
    }

    #[test]
    fn test_unresolved_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "manifest.yml",
            "applications:\n- name: ((app))\n  stack: ((stack))\n  path: ((app))\n",
        );
        let vars = write(&dir, "vars.yml", "other: value\n");

        let err = YamlManifestProvider.parse(&path, Some(&vars)).unwrap_err();
        match err {
            ManifestError::UnresolvedVariables { names } => {
                assert_eq!(names, vec!["app", "stack"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_vars_file_must_be_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "manifest.yml", MANIFEST);
        let vars = write(&dir, "vars.yml", "- a\n- b\n");

        let err = YamlManifestProvider.parse(&path, Some(&vars)).unwrap_err();
        assert!(matches!(err, ManifestError::VarsFile { .. }));
    }
}
