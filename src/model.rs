use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decoded step library manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub format_version: String,

    #[serde(default)]
    pub generated_at_timestamp: i64,

    #[serde(default)]
    pub steplib_source: String,

    #[serde(default)]
    pub download_locations: Vec<DownloadLocation>,

    #[serde(default)]
    pub assets_download_base_uri: String,

    pub steps: BTreeMap<String, StepRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadLocation {
    #[serde(rename = "type")]
    pub kind: String,
    pub src: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepRecord {
    /// Lookup key of this step. Not part of the payload; filled in on load.
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub info: StepInfo,

    #[serde(default)]
    pub latest_version_number: String,

    /// Version string to version details. Only the keys are used here.
    #[serde(default)]
    pub versions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StepInfo {
    #[serde(default)]
    pub asset_urls: AssetUrls,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetUrls {
    #[serde(rename = "icon.svg", default)]
    pub icon_svg: Option<String>,
}

impl Manifest {
    /// Decode a manifest and stamp every step record with its key.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let mut manifest: Manifest = serde_json::from_slice(bytes)?;
        manifest.stamp_names();
        Ok(manifest)
    }

    fn stamp_names(&mut self) {
        for (name, record) in self.steps.iter_mut() {
            record.name = name.clone();
        }
    }

    pub fn step_names(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.get(name)
    }
}

impl StepRecord {
    pub fn version_names(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }
}
