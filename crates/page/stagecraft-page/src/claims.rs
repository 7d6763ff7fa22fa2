//! Exclusive element ownership across sections.

use hashbrown::HashMap;

use stagecraft_core::TargetHandle;

/// Element handle → id of the section writing to it.
#[derive(Debug, Default, Clone)]
pub struct Claims {
    owners: HashMap<TargetHandle, String>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// First handle in `handles` that some section already owns.
    pub fn first_conflict<'a>(&'a self, handles: &'a [TargetHandle]) -> Option<(&'a str, &'a str)> {
        handles.iter().find_map(|h| {
            self.owners
                .get(h)
                .map(|owner| (h.as_str(), owner.as_str()))
        })
    }

    pub fn claim(&mut self, section: &str, handles: &[TargetHandle]) {
        for h in handles {
            self.owners.insert(h.clone(), section.to_string());
        }
    }

    /// Drop every claim held by `section`.
    pub fn release(&mut self, section: &str) {
        self.owners.retain(|_, owner| owner != section);
    }

    pub fn owner_of(&self, handle: &str) -> Option<&str> {
        self.owners.get(handle).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
