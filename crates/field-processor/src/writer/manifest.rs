//! JSON manifest describing an export directory.
//!
//! The layout matches what the ray tracer's config reader expects: a
//! `source_dir` plus one block per exported field naming its data file and
//! axis files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ocean_common::OceanResult;

use super::ExportFormat;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One exported field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub data: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    /// Axis order of the flattened data, slowest first
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
}

/// Manifest for one export directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub source_dir: String,
    pub format: ExportFormat,
    #[serde(flatten)]
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(source_dir: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            source_dir: source_dir.into(),
            format,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    /// Write `manifest.json` into `dir`.
    pub fn write(&self, dir: &Path) -> OceanResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    /// Read `manifest.json` from `dir`.
    pub fn read(dir: &Path) -> OceanResult<Self> {
        let contents = std::fs::read_to_string(dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&contents)?)
    }
}
