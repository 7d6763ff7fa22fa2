//! In-memory host used by the integration tests: resolves element references
//! from a `HostLayout`, answers layout probes, and keeps the last value written
//! to every `(target, property)` pair.
#![allow(dead_code)]

use std::collections::HashMap;

use stagecraft_core::{
    Choreographer, CoreEvent, LayoutProbe, Outputs, Property, Rect, SectionConfig, TargetHandle,
    TargetResolver, Value,
};
use stagecraft_test_fixtures::{sections, HostLayout};

pub const FRAME_MS: f64 = 16.0;

#[derive(Debug, Default)]
pub struct TestHost {
    pub layout: HostLayout,
    /// While false, every probe answers "not laid out yet".
    pub laid_out: bool,
    pub state: HashMap<(TargetHandle, Property), Value>,
    pub events: Vec<CoreEvent>,
}

impl TestHost {
    pub fn new(layout: HostLayout) -> Self {
        Self {
            layout,
            laid_out: true,
            ..Default::default()
        }
    }

    pub fn with_elements(elements: &[&str]) -> Self {
        Self::new(HostLayout {
            elements: elements.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn with_group(mut self, query: &str, members: &[&str]) -> Self {
        self.layout.groups.insert(
            query.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn apply(&mut self, out: &Outputs) {
        for change in &out.changes {
            self.state.insert(
                (change.target.clone(), change.property.clone()),
                change.value.clone(),
            );
        }
        self.events.extend(out.events.iter().cloned());
    }

    pub fn value(&self, target: &str, property: Property) -> Option<&Value> {
        self.state.get(&(target.to_string(), property))
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.value(target, Property::Content).and_then(|v| v.as_text())
    }

    pub fn scalar(&self, target: &str, property: Property) -> Option<f32> {
        self.value(target, property).and_then(|v| v.as_scalar())
    }

    pub fn is_tagged(&self, target: &str, class: &str) -> bool {
        self.value(target, Property::class(class)) == Some(&Value::Flag(true))
    }

    pub fn settled(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::StageSettled { index } => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&CoreEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl TargetResolver for TestHost {
    fn resolve(&mut self, element_ref: &str) -> Option<TargetHandle> {
        self.layout
            .elements
            .iter()
            .any(|e| e == element_ref)
            .then(|| element_ref.to_string())
    }

    fn resolve_all(&mut self, group_ref: &str) -> Vec<TargetHandle> {
        match self.layout.groups.get(group_ref) {
            Some(members) => members.clone(),
            None => self.resolve(group_ref).into_iter().collect(),
        }
    }
}

impl LayoutProbe for TestHost {
    fn path_length(&mut self, target: &str) -> Option<f32> {
        if !self.laid_out {
            return None;
        }
        self.layout.path_lengths.get(target).copied()
    }

    fn region_rect(&mut self, target: &str) -> Option<Rect> {
        if !self.laid_out {
            return None;
        }
        self.layout
            .regions
            .get(target)
            .map(|[top, height]| Rect {
                top: *top,
                height: *height,
            })
    }
}

/// Load a fixture section and bind it against its host layout.
pub fn bind_fixture(name: &str) -> (Choreographer, TestHost, SectionConfig) {
    let json = sections::json(name).expect("fixture json");
    let config = SectionConfig::from_json_str(&json).expect("fixture config");
    let layout = sections::host(name)
        .expect("host layout")
        .expect("fixture pairs a host");
    let mut host = TestHost::new(layout);
    let ch = Choreographer::try_bind(&config, &mut host).expect("fixture binds");
    (ch, host, config)
}

/// One frame: update, then apply the writes to the host.
pub fn frame(ch: &mut Choreographer, host: &mut TestHost, now_ms: f64) {
    let out = ch.update(now_ms, host).clone();
    host.apply(&out);
}

/// Frames every `FRAME_MS` over `[from, to]`; returns the time after the last one.
pub fn run(ch: &mut Choreographer, host: &mut TestHost, from: f64, to: f64) -> f64 {
    let mut t = from;
    while t <= to {
        frame(ch, host, t);
        t += FRAME_MS;
    }
    t
}
