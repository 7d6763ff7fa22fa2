//! stagecraft-page
//!
//! Runs every narrative section of one page. Sections are bound in registration
//! order, each claims the elements it writes to, and a section whose elements are
//! already claimed is not bound. Host input fans out to all sections and one
//! `step` per animation frame merges their outputs into a `PageFrame`.

pub mod claims;
pub mod frame;

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use stagecraft_core::{
    Choreographer, Interaction, LayoutProbe, SectionConfig, TargetResolver,
};

pub use crate::claims::Claims;
pub use crate::frame::{PageEvent, PageFrame};

/// Every section of a page, keyed by section id in page order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    pub sections: IndexMap<String, SectionConfig>,
}

impl PageConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("page config parse")
    }
}

#[derive(Debug, Default)]
pub struct Page {
    pub epoch: u64,
    /// Bound sections keyed by id, in registration order.
    sections: IndexMap<String, Choreographer>,
    claims: Claims,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every section of `config` in order. Sections that cannot be bound are
    /// skipped with a warning.
    pub fn from_config(config: &PageConfig, resolver: &mut dyn TargetResolver) -> Self {
        let mut page = Self::new();
        for (id, section) in &config.sections {
            page = page.with_section(id, section, resolver);
        }
        page
    }

    /// Register a section, or log why it was skipped.
    pub fn with_section(
        mut self,
        id: &str,
        config: &SectionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> Self {
        if let Err(err) = self.add_section(id, config, resolver) {
            log::warn!("section '{id}' skipped: {err:#}");
        }
        self
    }

    /// Bind and register a section. Fails when the id is taken, the section cannot
    /// be bound, or another section already owns one of its elements.
    pub fn add_section(
        &mut self,
        id: &str,
        config: &SectionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> Result<()> {
        if self.sections.contains_key(id) {
            bail!("section id '{id}' is already registered");
        }
        let section = Choreographer::try_bind(config, resolver)
            .with_context(|| format!("binding section '{id}'"))?;
        let handles = section.handles();
        if let Some((handle, owner)) = self.claims.first_conflict(&handles) {
            bail!("element '{handle}' is already owned by section '{owner}'");
        }
        self.claims.claim(id, &handles);
        log::debug!("section '{id}' registered with {} elements", handles.len());
        self.sections.insert(id.to_string(), section);
        Ok(())
    }

    /// Parse a section config and register it.
    pub fn add_section_json(
        &mut self,
        id: &str,
        json: &str,
        resolver: &mut dyn TargetResolver,
    ) -> Result<()> {
        let config = SectionConfig::from_json_str(json)
            .with_context(|| format!("section '{id}' config"))?;
        self.add_section(id, &config, resolver)
    }

    /// Tear a section down and release its elements. Its final writes are lost;
    /// use `teardown` first when the host still needs them.
    pub fn remove_section(&mut self, id: &str) -> Result<()> {
        let mut section = self
            .sections
            .shift_remove(id)
            .ok_or_else(|| anyhow!("unknown section '{id}'"))?;
        section.teardown();
        self.claims.release(id);
        Ok(())
    }

    pub fn section(&self, id: &str) -> Option<&Choreographer> {
        self.sections.get(id)
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section owning `handle`, if any.
    pub fn owner_of(&self, handle: &str) -> Option<&str> {
        self.claims.owner_of(handle)
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        for section in self.sections.values_mut() {
            section.on_scroll(scroll_y);
        }
    }

    pub fn on_resize(&mut self, width: f64, height: f64, probe: &mut dyn LayoutProbe) {
        for section in self.sections.values_mut() {
            section.on_resize(width, height, probe);
        }
    }

    /// Pointer/focus transition on the root of section `id`.
    pub fn on_interaction(&mut self, id: &str, interaction: Interaction, now_ms: f64) -> Result<()> {
        self.section_mut(id)?.on_interaction(interaction, now_ms);
        Ok(())
    }

    /// Pointer/focus transition on an element; routed to the section owning it.
    pub fn on_element_interaction(
        &mut self,
        handle: &str,
        interaction: Interaction,
        now_ms: f64,
    ) -> Option<&str> {
        let owner = self.claims.owner_of(handle)?.to_string();
        let (_, id, section) = self.sections.get_full_mut(owner.as_str())?;
        if section.root() != handle {
            return None;
        }
        section.on_interaction(interaction, now_ms);
        Some(id.as_str())
    }

    /// Manual selection in section `id`.
    pub fn select(&mut self, id: &str, index: i64, now_ms: f64) -> Result<()> {
        self.section_mut(id)?.select(index, now_ms);
        Ok(())
    }

    pub fn teardown(&mut self, id: &str) -> Result<()> {
        self.section_mut(id)?.teardown();
        Ok(())
    }

    pub fn teardown_all(&mut self) {
        for section in self.sections.values_mut() {
            section.teardown();
        }
    }

    /// Run one frame of every section and merge their outputs.
    pub fn step(&mut self, now_ms: f64, probe: &mut dyn LayoutProbe) -> Result<PageFrame> {
        if !now_ms.is_finite() {
            bail!("frame clock is not finite: {now_ms}");
        }
        self.epoch = self.epoch.wrapping_add(1);

        let mut frame = PageFrame::new(self.epoch, now_ms);
        for (id, section) in self.sections.iter_mut() {
            let out = section.update(now_ms, probe);
            frame.merge(id, out);
        }
        Ok(frame)
    }

    fn section_mut(&mut self, id: &str) -> Result<&mut Choreographer> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown section '{id}'"))
    }
}
