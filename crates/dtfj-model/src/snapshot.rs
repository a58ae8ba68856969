use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{
    Access, ImageAddressSpace, ImageProcess, JavaClass, JavaHeap, JavaMonitor, JavaObject,
    JavaRuntime, JavaThread,
};

/// Which DTFJ implementation produced a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// The DDR reader, the side under test.
    Ddr,
    /// The jextract-based reader, the reference baseline.
    Jextract,
    Other(String),
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ddr => write!(f, "ddr"),
            Self::Jextract => write!(f, "jextract"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Everything one provider read out of one dump.
///
/// A snapshot is immutable once loaded. Entities refer to each other by id;
/// [`crate::SnapshotIndex`] resolves them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub provider: ProviderKind,
    #[serde(default)]
    pub address_spaces: Vec<ImageAddressSpace>,
    #[serde(default = "crate::not_captured")]
    pub process: Access<ImageProcess>,
    #[serde(default = "crate::not_captured")]
    pub runtime: Access<JavaRuntime>,
    #[serde(default)]
    pub classes: Vec<JavaClass>,
    #[serde(default)]
    pub objects: Vec<JavaObject>,
    #[serde(default)]
    pub threads: Vec<JavaThread>,
    #[serde(default)]
    pub monitors: Vec<JavaMonitor>,
    #[serde(default)]
    pub heaps: Vec<JavaHeap>,
}

impl Snapshot {
    pub fn empty(provider: ProviderKind) -> Self {
        Self {
            provider,
            address_spaces: Vec::new(),
            process: crate::not_captured(),
            runtime: crate::not_captured(),
            classes: Vec::new(),
            objects: Vec::new(),
            threads: Vec::new(),
            monitors: Vec::new(),
            heaps: Vec::new(),
        }
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot: {}", path.display()))?;
    let snap: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parse snapshot json: {}", path.display()))?;
    Ok(snap)
}

pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(snapshot).context("serialize snapshot failed")?;
    fs::write(path, json).with_context(|| format!("write snapshot: {}", path.display()))?;
    Ok(())
}
