//! Session-lifetime result store
//!
//! Maps image identifier to the most recent verdict. Entries are created on
//! the first successful detection, overwritten by later ones and never
//! evicted during the session.

use std::collections::HashMap;

use dfd_common::Verdict;

#[derive(Debug, Default)]
pub struct ResultStore {
    verdicts: HashMap<String, Verdict>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `verdict` for `image_id`, returning the replaced verdict if any
    pub fn insert(&mut self, image_id: &str, verdict: Verdict) -> Option<Verdict> {
        self.verdicts.insert(image_id.to_string(), verdict)
    }

    pub fn get(&self, image_id: &str) -> Option<&Verdict> {
        self.verdicts.get(image_id)
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Copy of all entries, sorted by identifier for stable output
    pub fn snapshot(&self) -> Vec<(String, Verdict)> {
        let mut entries: Vec<(String, Verdict)> = self
            .verdicts
            .iter()
            .map(|(id, v)| (id.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
