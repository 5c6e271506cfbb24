//! Configuration management.
//!
//! This module discovers the project root, loads `s-project.json`, and turns
//! it into the per-session settings a sync needs:
//!
//! - **Project root**: nearest ancestor of the working directory holding
//!   `s-project.json` (or `--project`)
//! - **Store settings**: bucket name and region from `custom.meta`, with
//!   `METASYNC_BUCKET` / `METASYNC_BUCKET_REGION` taking priority
//! - **Target checks**: stage/region existence when the project declares
//!   its `stages`

mod target;

pub use target::{region_token, SyncTarget, REMOTE_PREFIX};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project file name.
pub const PROJECT_FILE: &str = "s-project.json";

/// Supplies the settings of one sync session.
pub trait ConfigSource {
    /// Bucket name and region.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if either setting is missing or empty.
    fn store_settings(&self) -> Result<StoreSettings>;

    /// Check that the target's stage and region exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Identity` for an unknown stage or region.
    fn check_target(&self, target: &SyncTarget) -> Result<()>;
}

/// Where remote copies are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSettings {
    /// Bucket name.
    pub name: String,
    /// Bucket region.
    pub region: String,
}

/// `s-project.json`, reduced to the fields metasync reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Project name (informational).
    #[serde(default)]
    pub name: Option<String>,
    /// Plugin settings.
    #[serde(default)]
    pub custom: Option<CustomSection>,
    /// Declared stages. When absent, stages and regions are not checked.
    #[serde(default)]
    pub stages: Option<BTreeMap<String, StageConfig>>,
}

/// The `custom` section of the project file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomSection {
    #[serde(default)]
    pub meta: Option<MetaConfig>,
}

/// `custom.meta`: the bucket that holds remote copies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// One declared stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Find the nearest directory at or above `start` holding the project file.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(PROJECT_FILE).is_file() {
            return Some(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}

/// Resolve the project root.
///
/// Priority:
/// 1. `explicit` (from `--project`), which must hold the project file
/// 2. Walk up from the current directory
///
/// # Errors
///
/// Returns `Error::ProjectNotFound` if no project file is found.
pub fn resolve_project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if dir.join(PROJECT_FILE).is_file() {
            return Ok(dir.to_path_buf());
        }
        return Err(Error::ProjectNotFound {
            cwd: dir.to_path_buf(),
        });
    }

    let cwd = std::env::current_dir()?;
    find_project_root(&cwd).ok_or(Error::ProjectNotFound { cwd })
}

/// Load `s-project.json` from the project root.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read or parsed.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig> {
    let path = root.join(PROJECT_FILE);
    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// [`ConfigSource`] backed by the project file plus overrides.
#[derive(Debug, Clone, Default)]
pub struct ProjectSource {
    config: ProjectConfig,
    bucket_override: Option<String>,
    region_override: Option<String>,
}

impl ProjectSource {
    /// Source using the project file only.
    #[must_use]
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            bucket_override: None,
            region_override: None,
        }
    }

    /// Source using the project file, with `METASYNC_BUCKET` and
    /// `METASYNC_BUCKET_REGION` taking priority when set.
    #[must_use]
    pub fn from_env(config: ProjectConfig) -> Self {
        Self::new(config).with_overrides(
            non_empty_env("METASYNC_BUCKET"),
            non_empty_env("METASYNC_BUCKET_REGION"),
        )
    }

    /// Override the bucket name and/or region.
    #[must_use]
    pub fn with_overrides(mut self, bucket: Option<String>, region: Option<String>) -> Self {
        self.bucket_override = bucket;
        self.region_override = region;
        self
    }

    /// Project name from `s-project.json`, if declared.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.config.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

impl ConfigSource for ProjectSource {
    fn store_settings(&self) -> Result<StoreSettings> {
        let meta = self.config.custom.as_ref().and_then(|c| c.meta.as_ref());

        if meta.is_none() && (self.bucket_override.is_none() || self.region_override.is_none()) {
            return Err(Error::Config(format!(
                "Meta Sync config must be defined in {PROJECT_FILE} (custom.meta)"
            )));
        }

        let pick = |over: &Option<String>, from_file: Option<&String>, property: &str| {
            over.clone()
                .or_else(|| from_file.cloned())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    Error::Config(format!("Missing config property \"{property}\" in custom.meta"))
                })
        };

        Ok(StoreSettings {
            name: pick(&self.bucket_override, meta.and_then(|m| m.name.as_ref()), "name")?,
            region: pick(&self.region_override, meta.and_then(|m| m.region.as_ref()), "region")?,
        })
    }

    fn check_target(&self, target: &SyncTarget) -> Result<()> {
        let (Some(stages), Some(stage)) = (self.config.stages.as_ref(), target.stage()) else {
            return Ok(());
        };

        let Some(stage_config) = stages.get(stage) else {
            return Err(Error::Identity(format!(
                "Stage {stage} doesn't exist in this project"
            )));
        };

        if let Some(region) = target.region() {
            if !stage_config.regions.iter().any(|r| r == region) {
                return Err(Error::Identity(format!(
                    "Region {region} doesn't exist in stage {stage}"
                )));
            }
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(json: &str) -> ProjectConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_store_settings_from_meta() {
        let source = ProjectSource::new(config(
            r#"{"custom": {"meta": {"name": "my-bucket", "region": "eu-west-1"}}}"#,
        ));
        assert_eq!(
            source.store_settings().unwrap(),
            StoreSettings {
                name: "my-bucket".into(),
                region: "eu-west-1".into()
            }
        );
    }

    #[test]
    fn test_project_name() {
        let named = ProjectSource::new(config(r#"{"name": "billing-api"}"#));
        assert_eq!(named.project_name(), Some("billing-api"));
        assert_eq!(ProjectSource::new(config(r#"{"name": " "}"#)).project_name(), None);
        assert_eq!(ProjectSource::new(config("{}")).project_name(), None);
    }

    #[test]
    fn test_missing_meta_is_config_error() {
        let err = ProjectSource::new(config(r#"{"name": "svc"}"#))
            .store_settings()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("custom.meta"));
    }

    #[test]
    fn test_empty_property_is_config_error() {
        let err = ProjectSource::new(config(
            r#"{"custom": {"meta": {"name": "b", "region": ""}}}"#,
        ))
        .store_settings()
        .unwrap_err();
        assert!(err.to_string().contains("\"region\""));
    }

    #[test]
    fn test_overrides_take_priority() {
        let source = ProjectSource::new(config(
            r#"{"custom": {"meta": {"name": "file-bucket", "region": "eu-west-1"}}}"#,
        ))
        .with_overrides(Some("env-bucket".into()), None);

        let settings = source.store_settings().unwrap();
        assert_eq!(settings.name, "env-bucket");
        assert_eq!(settings.region, "eu-west-1");
    }

    #[test]
    fn test_overrides_alone_are_enough() {
        let source = ProjectSource::new(ProjectConfig::default())
            .with_overrides(Some("b".into()), Some("us-east-1".into()));
        assert!(source.store_settings().is_ok());
    }

    #[test]
    fn test_check_target_without_declared_stages() {
        let source = ProjectSource::new(ProjectConfig::default());
        let target = SyncTarget::select(Some("anything"), Some("eu-west-1")).unwrap();
        assert!(source.check_target(&target).is_ok());
    }

    #[test]
    fn test_check_target_against_declared_stages() {
        let source = ProjectSource::new(config(
            r#"{"stages": {"dev": {"regions": ["us-east-1"]}, "prod": {}}}"#,
        ));

        let ok = SyncTarget::select(Some("dev"), Some("us-east-1")).unwrap();
        assert!(source.check_target(&ok).is_ok());
        assert!(source.check_target(&SyncTarget::Common).is_ok());

        let unknown_stage = SyncTarget::select(Some("qa"), None).unwrap();
        assert!(matches!(
            source.check_target(&unknown_stage),
            Err(Error::Identity(_))
        ));

        let unknown_region = SyncTarget::select(Some("prod"), Some("us-east-1")).unwrap();
        let err = source.check_target(&unknown_region).unwrap_err();
        assert!(err.to_string().contains("Region us-east-1 doesn't exist in stage prod"));
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{}").unwrap();
        let nested = temp_dir.path().join("functions").join("api");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_project_root(&nested).unwrap(),
            temp_dir.path().to_path_buf()
        );
    }

    #[test]
    fn test_resolve_explicit_project_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_project_root(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[test]
    fn test_load_project_config_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "{oops").unwrap();
        let err = load_project_config(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
