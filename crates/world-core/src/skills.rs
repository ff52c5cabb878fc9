//! Skill levels and experience. Opaque to the movement core; the actor
//! carries one so downstream progression systems have a single home for it.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Skills {
    levels: BTreeMap<String, u16>,
}

impl Skills {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, skill: &str) -> u16 {
        self.levels.get(skill).copied().unwrap_or(1)
    }

    pub fn set_level(&mut self, skill: &str, level: u16) {
        self.levels.insert(skill.to_string(), level);
    }
}
