//! Output assembly: turning a filtered tree into nested result documents.
//!
//! Assembly is split into two phases so no result slot is ever mutated by
//! an in-flight load:
//!
//! 1. **Draft phase** — [`Assembler::assemble`] walks the tree and builds a
//!    [`Draft`] mirroring the final document, with a pending-load marker in
//!    every slot that needs file contents. Each referenced path is
//!    registered in a shared [`LoadQueue`], deduplicated by path: a file
//!    referenced from two collections is read exactly once per run.
//! 2. **Finalize phase** — after the caller settles the whole queue into a
//!    [`ReadCache`], [`finalize`] resolves the draft into a
//!    `serde_json::Value`. Mapping-derived slots are written at their fixed
//!    index, so key order survives regardless of load order; list-derived
//!    slots keep dispatch order unless a sort rule applies, in which case
//!    each resolved item is folded in through [`merge_sorted`].
//!
//! Loaded records optionally get a `<level>_id` field: the SHA-256 of the
//! file's path, placed ahead of the record's own fields. Nested nodes carry
//! a `<parentLevel>_id` back-reference to the key they live under.

use crate::config::{SortOrder, SortRule};
use crate::naming::Pluralize;
use crate::tree::Tree;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Key of the top-level collection in every endpoint document.
const RESULTS_KEY: &str = "results";

/// Run-scoped queue of pending content loads, deduplicated by path.
#[derive(Debug, Default)]
pub struct LoadQueue {
    order: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path; repeated registrations are no-ops.
    pub fn register(&mut self, path: &Path) {
        if self.seen.insert(path.to_path_buf()) {
            self.order.push(path.to_path_buf());
        }
    }

    /// Unique paths in first-registration order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolved contents of every queued load, keyed by path.
pub type ReadCache = HashMap<PathBuf, Value>;

/// A result document with unresolved load slots.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    /// Ordered fields of a result node.
    Object(Vec<(String, Draft)>),
    /// A collection; `sort` is set only for leaf-list collections, which
    /// are folded into sorted order during finalization.
    List {
        items: Vec<Draft>,
        sort: Option<SortRule>,
    },
    /// Slot awaiting one file's contents.
    Pending { path: PathBuf, level: String },
    Str(String),
    Null,
}

/// Walks filtered trees into [`Draft`] documents.
pub struct Assembler<'a> {
    /// Directory leaf references are relative to.
    pub base_directory: &'a Path,
    /// Display-level names, root first.
    pub level_names: &'a [String],
    /// Sort rules keyed by level name.
    pub sort: &'a BTreeMap<String, SortRule>,
    pub pluralizer: &'a dyn Pluralize,
}

impl Assembler<'_> {
    /// Assemble the subtree rooted at `level`.
    ///
    /// `root` is the mapping key this node was reached through, recorded as
    /// a `<parent_level>_id` back-reference; both are `None` at the true
    /// root, whose collection is named `results` instead of a pluralized
    /// level name. Returns `None` for an absent subtree with levels still
    /// to assemble.
    pub fn assemble(
        &self,
        tree: &Tree,
        level: usize,
        parent_level: Option<&str>,
        root: Option<&str>,
        queue: &mut LoadQueue,
    ) -> Option<Draft> {
        if tree.is_empty() && level < self.level_names.len() {
            return None;
        }

        let level_name = self
            .level_names
            .get(level)
            .map(String::as_str)
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let (Some(root), Some(parent)) = (root, parent_level) {
            fields.push((format!("{parent}_id"), Draft::Str(root.to_string())));
        }

        let node_name = if root.is_some() {
            self.pluralizer.pluralize(level_name)
        } else {
            RESULTS_KEY.to_string()
        };

        match tree {
            Tree::Empty => {}
            Tree::Files(files) => {
                let items = files
                    .iter()
                    .map(|file| self.pending(file, level_name, queue))
                    .collect();
                fields.push((
                    node_name,
                    Draft::List {
                        items,
                        sort: self.sort.get(level_name).cloned(),
                    },
                ));
            }
            Tree::File(file) => {
                let items = vec![self.pending(file, level_name, queue)];
                fields.push((node_name, Draft::List { items, sort: None }));
            }
            Tree::Branch(children) => {
                // Natural key order comes free from the BTreeMap; a sort
                // rule on this level can only flip it.
                let mut keys: Vec<&String> = children.keys().collect();
                if let Some(rule) = self.sort.get(level_name) {
                    if rule.order == SortOrder::Descending {
                        keys.reverse();
                    }
                }

                let items = keys
                    .into_iter()
                    .map(|key| match &children[key] {
                        // A direct file reference resolves in place at this
                        // index; key order is preserved no matter when the
                        // load completes.
                        Tree::File(file) => self.pending(file, level_name, queue),
                        subtree => self
                            .assemble(subtree, level + 1, Some(level_name), Some(key), queue)
                            .unwrap_or(Draft::Null),
                    })
                    .collect();
                fields.push((node_name, Draft::List { items, sort: None }));
            }
        }

        Some(Draft::Object(fields))
    }

    fn pending(&self, file: &str, level_name: &str, queue: &mut LoadQueue) -> Draft {
        let path = self.base_directory.join(file);
        queue.register(&path);
        Draft::Pending {
            path,
            level: level_name.to_string(),
        }
    }
}

/// Resolve a draft against the settled read cache.
pub fn finalize(draft: &Draft, cache: &ReadCache, inject_ids: bool) -> Value {
    match draft {
        Draft::Object(fields) => {
            let mut map = Map::new();
            for (key, value) in fields {
                map.insert(key.clone(), finalize(value, cache, inject_ids));
            }
            Value::Object(map)
        }
        Draft::List { items, sort: None } => Value::Array(
            items
                .iter()
                .map(|item| finalize(item, cache, inject_ids))
                .collect(),
        ),
        Draft::List {
            items,
            sort: Some(rule),
        } => {
            // Fold each resolved item into an already-sorted accumulator,
            // the way the loads would have settled one by one.
            let mut sorted = Vec::with_capacity(items.len());
            for item in items {
                sorted = merge_sorted(sorted, vec![finalize(item, cache, inject_ids)], rule);
            }
            Value::Array(sorted)
        }
        Draft::Pending { path, level } => {
            // Every pending path was registered in the queue; a miss would
            // be a bug in the draft phase, not user error.
            let fields = cache.get(path).cloned().unwrap_or(Value::Null);
            if inject_ids {
                with_id(level, path, fields)
            } else {
                fields
            }
        }
        Draft::Str(s) => Value::String(s.clone()),
        Draft::Null => Value::Null,
    }
}

/// Prepend the content-addressed id to a loaded record's fields.
fn with_id(level: &str, path: &Path, fields: Value) -> Value {
    match fields {
        Value::Object(existing) => {
            let mut map = Map::new();
            map.insert(format!("{level}_id"), Value::String(content_id(path)));
            map.extend(existing);
            Value::Object(map)
        }
        // Raw text content has no field mapping to extend.
        other => other,
    }
}

/// Stable content-addressed identifier for a file: SHA-256 of its path.
pub fn content_id(path: &Path) -> String {
    format!("{:x}", Sha256::digest(path.to_string_lossy().as_bytes()))
}

/// Merge two already-sorted sequences in linear time.
///
/// Ties take from the first sequence, so folding a newly-resolved item into
/// an accumulator keeps earlier items ahead of equal later ones.
pub fn merge_sorted(a: Vec<Value>, b: Vec<Value>, rule: &SortRule) -> Vec<Value> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();

    loop {
        match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => {
                if compare(x, y, rule) != Ordering::Greater {
                    merged.extend(a.next());
                } else {
                    merged.extend(b.next());
                }
            }
            (Some(_), None) => merged.extend(a.next()),
            (None, Some(_)) => merged.extend(b.next()),
            (None, None) => break,
        }
    }

    merged
}

/// Compare two items under a sort rule: by a named field when the rule has
/// one, by the raw values otherwise. Numbers compare numerically, strings
/// lexically; mixed or unordered types compare equal (stable no-ops).
pub fn compare(a: &Value, b: &Value, rule: &SortRule) -> Ordering {
    let (key_a, key_b) = match &rule.field {
        Some(field) => (
            a.get(field).unwrap_or(&Value::Null),
            b.get(field).unwrap_or(&Value::Null),
        ),
        None => (a, b),
    };

    let ordering = match (key_a, key_b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    };

    match rule.order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}
