//! Sync target identity.
//!
//! One identity is selected per session from the optional stage and region.
//! It names both the local variables file and the remote object, so the two
//! sides always refer to the same document.

use serde::Serialize;

use crate::error::{Error, Result};

/// Key prefix under which variables files are stored in the bucket.
///
/// The spelling matches the keys already present in existing buckets and
/// must not change, or those copies stop being found.
pub const REMOTE_PREFIX: &str = "_servereless_meta_sync/variables/";

/// Which variables file a session reconciles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SyncTarget {
    /// Variables shared by every stage.
    Common,
    /// Variables of one stage.
    Stage { stage: String },
    /// Variables of one region within a stage.
    StageRegion { stage: String, region: String },
}

impl SyncTarget {
    /// Select the identity from the command-line selectors.
    ///
    /// Blank selectors count as absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::Identity` if a region is given without a stage, or if
    /// a selector contains characters that cannot appear in a file name.
    pub fn select(stage: Option<&str>, region: Option<&str>) -> Result<Self> {
        let stage = stage.map(str::trim).filter(|s| !s.is_empty());
        let region = region.map(str::trim).filter(|r| !r.is_empty());

        for (what, value) in [("stage", stage), ("region", region)] {
            if let Some(value) = value {
                if !value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(Error::Identity(format!(
                        "{what} '{value}' may only contain letters, digits, '-' and '_'"
                    )));
                }
            }
        }

        match (stage, region) {
            (None, None) => Ok(Self::Common),
            (Some(stage), None) => Ok(Self::Stage {
                stage: stage.to_string(),
            }),
            (Some(stage), Some(region)) => Ok(Self::StageRegion {
                stage: stage.to_string(),
                region: region.to_string(),
            }),
            (None, Some(_)) => Err(Error::Identity(
                "Stage is required when you specify a region".to_string(),
            )),
        }
    }

    /// The stage, if the target is stage-scoped.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Common => None,
            Self::Stage { stage } | Self::StageRegion { stage, .. } => Some(stage),
        }
    }

    /// The region, if the target is region-scoped.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::StageRegion { region, .. } => Some(region),
            Self::Common | Self::Stage { .. } => None,
        }
    }

    /// Variables file name, shared by the local file and the remote key.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Common => "s-variables-common.json".to_string(),
            Self::Stage { stage } => format!("s-variables-{stage}.json"),
            Self::StageRegion { stage, region } => {
                format!("s-variables-{stage}-{}.json", region_token(region))
            }
        }
    }

    /// Object key of the remote copy.
    #[must_use]
    pub fn remote_key(&self) -> String {
        format!("{REMOTE_PREFIX}{}", self.file_name())
    }
}

/// File name token for a region: the name with dashes removed.
#[must_use]
pub fn region_token(region: &str) -> String {
    region.replace('-', "")
}
