//! Host-facing traits and the field binding table.
//!
//! Element references in a section config (selectors, ids, whatever the host
//! understands) are resolved once at bind time into opaque `TargetHandle`s. All
//! later output is keyed by handle.

use serde::{Deserialize, Serialize};

/// Opaque element handle (small string key).
pub type TargetHandle = String;

/// A set of elements in a config: one group query or an explicit ordered list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementGroup {
    Query(String),
    List(Vec<String>),
}

/// Resolves element references to handles. Adapters (wasm, tests) implement this.
pub trait TargetResolver {
    fn resolve(&mut self, element_ref: &str) -> Option<TargetHandle>;

    /// Resolve a group reference (e.g. a class selector) to every matching element,
    /// in document order. Defaults to the single-element lookup.
    fn resolve_all(&mut self, group_ref: &str) -> Vec<TargetHandle> {
        self.resolve(group_ref).into_iter().collect()
    }
}

/// Layout rectangle in document coordinates (pixels).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

/// Layout measurements the core cannot compute itself.
///
/// Returning `None` means "not laid out yet"; the core retries on the next frame.
pub trait LayoutProbe {
    fn path_length(&mut self, target: &str) -> Option<f32>;
    fn region_rect(&mut self, target: &str) -> Option<Rect>;
}

/// Probe that never has measurements; useful for timer-only sections.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl LayoutProbe for NoLayout {
    fn path_length(&mut self, _target: &str) -> Option<f32> {
        None
    }
    fn region_rect(&mut self, _target: &str) -> Option<Rect> {
        None
    }
}

/// One bound content field.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingRow {
    pub field: String,
    pub handle: TargetHandle,
}

/// Content fields of a section that resolved to live elements.
#[derive(Default, Debug, Clone)]
pub struct BindingTable {
    pub rows: Vec<BindingRow>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn get(&self, field: &str) -> Option<&BindingRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    /// Insert or update a binding row for a field.
    pub fn upsert(&mut self, field: &str, handle: TargetHandle) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.field == field) {
            row.handle = handle;
        } else {
            self.rows.push(BindingRow {
                field: field.to_string(),
                handle,
            });
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = &TargetHandle> {
        self.rows.iter().map(|r| &r.handle)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolve an element group to its present members, in order. Absent members are
/// dropped, so positions renumber the way a selector query would.
pub fn resolve_group(
    resolver: &mut dyn TargetResolver,
    group: Option<&ElementGroup>,
) -> Vec<TargetHandle> {
    let Some(group) = group else {
        return Vec::new();
    };
    match group {
        ElementGroup::Query(q) => resolver.resolve_all(q),
        ElementGroup::List(refs) => refs
            .iter()
            .filter_map(|r| {
                let handle = resolver.resolve(r);
                if handle.is_none() {
                    log::debug!("optional element '{r}' not present; skipping");
                }
                handle
            })
            .collect(),
    }
}

/// Resolve an optional element reference.
pub fn resolve_opt(
    resolver: &mut dyn TargetResolver,
    element_ref: Option<&str>,
) -> Option<TargetHandle> {
    let r = element_ref?;
    let handle = resolver.resolve(r);
    if handle.is_none() {
        log::debug!("optional element '{r}' not present; skipping");
    }
    handle
}
