//! Shared JSON fixtures: section configs and the host layouts they bind against.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    sections: HashMap<String, SectionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SectionEntry {
    Config(String),
    WithHost { config: String, host: String },
}

impl SectionEntry {
    fn config(&self) -> &str {
        match self {
            SectionEntry::Config(path) => path,
            SectionEntry::WithHost { config, .. } => config,
        }
    }

    fn host(&self) -> Option<&str> {
        match self {
            SectionEntry::Config(_) => None,
            SectionEntry::WithHost { host, .. } => Some(host),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(name: &str) -> Result<&'a SectionEntry> {
    MANIFEST
        .sections
        .get(name)
        .ok_or_else(|| anyhow!("unknown section fixture '{name}'"))
}

/// Element layout a test host presents to a section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostLayout {
    /// Element references that resolve.
    pub elements: Vec<String>,
    /// Group query → members, in document order.
    #[serde(default)]
    pub groups: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub path_lengths: HashMap<String, f32>,
    /// Element → `[top, height]` in document pixels.
    #[serde(default)]
    pub regions: HashMap<String, [f64; 2]>,
}

pub mod sections {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.sections.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(name)?.config())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(name)?.config())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(name)?.config()))
    }

    /// Host layout paired with a section, if the manifest names one.
    pub fn host(name: &str) -> Result<Option<HostLayout>> {
        match lookup(name)?.host() {
            Some(rel) => super::load_json(rel).map(Some),
            None => Ok(None),
        }
    }

    pub fn host_path(name: &str) -> Result<Option<PathBuf>> {
        Ok(lookup(name)?.host().map(resolve_path))
    }
}
