//! Collection naming: pluralization of level names in output documents.
//!
//! A level called `genre` produces a collection key `genres`, `category`
//! produces `categories`, and so on. The transform is a pluggable strategy
//! so the core stays decoupled from any linguistic library: the default is
//! a small English rule table, and disabling pluralization swaps in the
//! identity transform.

/// Strategy for naming a level's collection in output documents.
pub trait Pluralize: Sync {
    fn pluralize(&self, name: &str) -> String;
}

/// Default strategy: a simple English rule table.
///
/// - consonant + `y` → `ies` (`category` → `categories`)
/// - sibilant endings (`s`, `x`, `z`, `ch`, `sh`) → `es` (`match` → `matches`)
/// - everything else → `s` (`genre` → `genres`)
///
/// Irregular nouns are out of scope; a level named `person` comes out as
/// `persons`. Callers needing better English can provide their own strategy.
#[derive(Debug, Default)]
pub struct RuleTable;

impl Pluralize for RuleTable {
    fn pluralize(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        if let Some(stem) = name.strip_suffix('y') {
            let before = stem.chars().next_back();
            if before.is_some_and(|c| !is_vowel(c)) {
                return format!("{stem}ies");
            }
        }

        let sibilant = name.ends_with('s')
            || name.ends_with('x')
            || name.ends_with('z')
            || name.ends_with("ch")
            || name.ends_with("sh");
        if sibilant {
            return format!("{name}es");
        }

        format!("{name}s")
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// No-op strategy used when pluralization is disabled.
#[derive(Debug, Default)]
pub struct Identity;

impl Pluralize for Identity {
    fn pluralize(&self, name: &str) -> String {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_nouns_take_s() {
        let rules = RuleTable;
        assert_eq!(rules.pluralize("genre"), "genres");
        assert_eq!(rules.pluralize("year"), "years");
        assert_eq!(rules.pluralize("language"), "languages");
    }

    #[test]
    fn consonant_y_becomes_ies() {
        let rules = RuleTable;
        assert_eq!(rules.pluralize("category"), "categories");
        assert_eq!(rules.pluralize("country"), "countries");
    }

    #[test]
    fn vowel_y_takes_plain_s() {
        assert_eq!(RuleTable.pluralize("day"), "days");
    }

    #[test]
    fn sibilant_endings_take_es() {
        let rules = RuleTable;
        assert_eq!(rules.pluralize("match"), "matches");
        assert_eq!(rules.pluralize("box"), "boxes");
        assert_eq!(rules.pluralize("class"), "classes");
        assert_eq!(rules.pluralize("dish"), "dishes");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(RuleTable.pluralize(""), "");
    }

    #[test]
    fn identity_leaves_names_alone() {
        assert_eq!(Identity.pluralize("genre"), "genre");
        assert_eq!(Identity.pluralize("category"), "category");
    }
}
