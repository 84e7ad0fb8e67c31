//! Blueprint parsing — the declarative map from path segments to levels.
//!
//! A blueprint is a path pattern like `data/:language/:genre/:year`. Literal
//! segments form the base directory; segments prefixed with `:` name the
//! hierarchy levels, in depth order (level 0 sits directly under the base).
//!
//! The parser preserves segment order and does nothing else: it does not
//! check level names for uniqueness (duplicates are a caller error that
//! surfaces as confusing output, not a crash here) and it does not touch
//! the filesystem.

use thiserror::Error;

/// Marker that distinguishes a level segment from a base segment.
const LEVEL_MARKER: char = ':';

#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("Blueprint '{0}' declares no levels (no ':name' segments)")]
    NoLevels(String),
}

/// Parsed blueprint: fixed base path plus ordered level names.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    /// Literal path components preceding the first level.
    pub base: Vec<String>,
    /// Level names in hierarchy order; index = depth under the base.
    pub levels: Vec<String>,
}

impl Blueprint {
    /// Parse a pattern like `data/:language/:genre/:year`.
    ///
    /// Every `/`-separated segment is classified independently: a segment
    /// starting with `:` contributes its remainder to `levels`, anything
    /// else goes to `base`. Order is preserved on both sides.
    pub fn parse(pattern: &str) -> Result<Self, BlueprintError> {
        let mut base = Vec::new();
        let mut levels = Vec::new();

        for segment in pattern.split('/') {
            if let Some(name) = segment.strip_prefix(LEVEL_MARKER) {
                levels.push(name.to_string());
            } else {
                base.push(segment.to_string());
            }
        }

        if levels.is_empty() {
            return Err(BlueprintError::NoLevels(pattern.to_string()));
        }

        Ok(Self { base, levels })
    }

    /// The base directory the blueprint is anchored at.
    pub fn base_directory(&self) -> String {
        self.base.join("/")
    }

    /// Index of a level by name, or `None` for unknown names.
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == name)
    }
}
