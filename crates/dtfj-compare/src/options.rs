use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog;

/// Recursion below this depth compares identity members only.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest accepted `max_depth`. Comparison recurses on the native stack,
/// and a few levels of the entity graph cost a handful of frames each.
pub const MAX_DEPTH_LIMIT: usize = 128;

/// Tuning for one comparison run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareOptions {
    pub max_depth: usize,
    /// Per-entity mask adjustments keyed by entity name (`JavaThread`, ...).
    pub masks: BTreeMap<String, MaskOverride>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            masks: BTreeMap::new(),
        }
    }
}

/// Members to add to / remove from an entity's default mask, by flag name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskOverride {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionsError {
    UnknownEntity { entity: String },
    UnknownMember { entity: String, member: String },
    ZeroDepth,
    DepthTooLarge { max_depth: usize },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity { entity } => {
                write!(f, "compare.masks: unknown entity '{entity}'")
            }
            Self::UnknownMember { entity, member } => {
                write!(f, "compare.masks.{entity}: unknown member '{member}'")
            }
            Self::ZeroDepth => write!(f, "compare.max_depth must be at least 1"),
            Self::DepthTooLarge { max_depth } => write!(
                f,
                "compare.max_depth {max_depth} exceeds the limit of {MAX_DEPTH_LIMIT}"
            ),
        }
    }
}

impl std::error::Error for OptionsError {}

impl CompareOptions {
    /// Reads the `compare` section of a merged config document; an absent
    /// section yields the defaults.
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let opts = match cfg.pointer("/compare") {
            None | Some(Value::Null) => Self::default(),
            Some(v) => serde_json::from_value(v.clone()).context("invalid compare section")?,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// `max_depth` must lie in `1..=MAX_DEPTH_LIMIT`, and every overridden
    /// entity and member name must exist in the catalog.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_depth == 0 {
            return Err(OptionsError::ZeroDepth);
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(OptionsError::DepthTooLarge {
                max_depth: self.max_depth,
            });
        }
        let entries = catalog();
        for (entity, ov) in &self.masks {
            let entry = entries
                .iter()
                .find(|e| e.entity == entity.as_str())
                .ok_or_else(|| OptionsError::UnknownEntity {
                    entity: entity.clone(),
                })?;
            for member in ov.include.iter().chain(ov.exclude.iter()) {
                if !entry.members.contains(&member.as_str()) {
                    return Err(OptionsError::UnknownMember {
                        entity: entity.clone(),
                        member: member.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
