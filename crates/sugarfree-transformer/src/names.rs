//! Collision-free names for generated variables.

use rustc_hash::FxHashSet;
use smol_str::{format_smolstr, SmolStr};

/// Tracks every identifier spelled anywhere in the source and hands out
/// names that collide with none of them.
#[derive(Debug, Clone, Default)]
pub struct NameManager {
    used: FxHashSet<SmolStr>,
}

impl NameManager {
    /// Creates an empty name manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken.
    pub fn insert(&mut self, name: &str) {
        if !self.used.contains(name) {
            self.used.insert(SmolStr::new(name));
        }
    }

    /// Claims `base`, or `base2`, `base3`, … if it is taken.
    pub fn claim(&mut self, base: &str) -> SmolStr {
        let mut name = SmolStr::new(base);
        let mut suffix = 2;
        while self.used.contains(&name) {
            name = format_smolstr!("{base}{suffix}");
            suffix += 1;
        }
        self.used.insert(name.clone());
        name
    }

    /// Claims the first of `{base}1`, `{base}2`, … that is free.
    pub fn claim_numbered(&mut self, base: &str) -> SmolStr {
        let mut n = 1;
        loop {
            let name = format_smolstr!("{base}{n}");
            if !self.used.contains(&name) {
                self.used.insert(name.clone());
                return name;
            }
            n += 1;
        }
    }

    /// Claims a variable name for the module `path`: its last path component
    /// with non-word characters dropped, prefixed with `_`.
    pub fn claim_for_path(&mut self, path: &str) -> SmolStr {
        let component = path.rsplit('/').next().unwrap_or(path);
        let word: String = component
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        self.claim(&format!("_{word}"))
    }
}
