//! The content tree and its core transformations.
//!
//! Everything the compiler does is a reshaping of one recursive structure,
//! [`Tree`], which mirrors the scanned directory hierarchy:
//!
//! - [`Tree::Branch`] — a directory with named children
//! - [`Tree::Files`] — a directory whose children are all leaf files
//! - [`Tree::File`] — a direct reference to a single file (introduced by the
//!   endpoint builder and aggregator, never by the scanner)
//! - [`Tree::Empty`] — an empty directory, or "no contribution" after filtering
//!
//! Node depth corresponds exactly to blueprint level index. The deepest
//! level is represented by the files themselves, so a directory at the
//! second-deepest level holds a [`Tree::Files`] list — lists only ever
//! appear at the maximum configured depth.
//!
//! Three operations live here:
//!
//! - [`merge`] — typed structural merge of two trees (key union, list concat)
//! - [`filter_levels`] — prune a tree down to a set of display levels,
//!   folding elided levels into their parents (level elision)
//! - [`aggregate`] — bucket a tree below a target depth by cumulative path,
//!   producing one independent group per bucket
//!
//! Branches use `BTreeMap` so every walk, merge and fold is deterministic:
//! when an elided level merges three or more siblings, they fold
//! left-to-right in key order.

use std::collections::{BTreeMap, BTreeSet};

/// One node of the content hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// Directory with named children.
    Branch(BTreeMap<String, Tree>),
    /// Directory containing only leaf files (paths relative to the base).
    Files(Vec<String>),
    /// A single literal file reference.
    File(String),
    /// Empty directory, or a node filtered down to nothing.
    Empty,
}

impl Tree {
    /// Fresh branch node.
    pub fn branch() -> Self {
        Tree::Branch(BTreeMap::new())
    }

    /// Whether this node contributes nothing to output.
    pub fn is_empty(&self) -> bool {
        matches!(self, Tree::Empty)
    }

    /// Child lookup by path segments, descending through branches.
    pub fn get(&self, segments: &[&str]) -> Option<&Tree> {
        let mut node = self;
        for segment in segments {
            match node {
                Tree::Branch(children) => node = children.get(*segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Merge `value` into this tree at a nested key path, creating
    /// intermediate branches as needed. An existing value at the final key
    /// is structurally merged, not overwritten — multiple physical branches
    /// may map to the same logical endpoint key.
    pub fn merge_at(&mut self, segments: &[String], value: Tree) {
        debug_assert!(!segments.is_empty());

        let mut node = self;
        for segment in &segments[..segments.len() - 1] {
            let children = match node {
                Tree::Branch(children) => children,
                // A non-branch on the way down cannot happen for well-formed
                // keys; normalize rather than panic.
                other => {
                    *other = Tree::branch();
                    match other {
                        Tree::Branch(children) => children,
                        _ => unreachable!(),
                    }
                }
            };
            node = children.entry(segment.clone()).or_insert_with(Tree::branch);
        }

        let last = &segments[segments.len() - 1];
        match node {
            Tree::Branch(children) => {
                let merged = match children.remove(last) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                children.insert(last.clone(), merged);
            }
            other => {
                let mut children = BTreeMap::new();
                children.insert(last.clone(), value);
                *other = Tree::Branch(children);
            }
        }
    }
}

/// Structural merge of two trees.
///
/// Branch keys are unioned, with colliding children merged recursively;
/// colliding leaf lists concatenate left-then-right, preserving each side's
/// relative order. `Empty` is the identity. Mismatched shapes cannot arise
/// from a well-formed snapshot (lists only exist at max depth); if they do,
/// the right operand wins.
pub fn merge(a: Tree, b: Tree) -> Tree {
    match (a, b) {
        (Tree::Empty, b) => b,
        (a, Tree::Empty) => a,
        (Tree::Branch(mut left), Tree::Branch(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                left.insert(key, merged);
            }
            Tree::Branch(left)
        }
        (Tree::Files(mut left), Tree::Files(right)) => {
            left.extend(right);
            Tree::Files(left)
        }
        (_, b) => b,
    }
}

/// Prune a (sub)tree so only the chosen display levels survive.
///
/// `current_level` is the depth of the node whose value `tree` is; its
/// children sit at `current_level + 1`, and that index decides their fate:
///
/// 1. Leaf lists (and empty nodes) survive unchanged when the next level is
///    displayed, otherwise they filter to [`Tree::Empty`].
/// 2. A branch whose next level is displayed keeps its keys and recurses.
/// 3. A branch whose next level is elided recurses into every child, drops
///    empty results, and folds the survivors into one merged value —
///    siblings that lived under different buckets of the skipped level are
///    silently combined. Zero survivors yield an empty branch (not
///    `Empty`); a single survivor passes through unmerged.
pub fn filter_levels(tree: &Tree, display_levels: &BTreeSet<usize>, current_level: usize) -> Tree {
    let next_displayed = display_levels.contains(&(current_level + 1));

    let children = match tree {
        Tree::Branch(children) => children,
        // Leaf lists, single files and empty nodes: rule 1.
        leaf => {
            return if next_displayed {
                leaf.clone()
            } else {
                Tree::Empty
            };
        }
    };

    if next_displayed {
        let filtered = children
            .iter()
            .map(|(key, child)| {
                (
                    key.clone(),
                    filter_levels(child, display_levels, current_level + 1),
                )
            })
            .collect();
        return Tree::Branch(filtered);
    }

    // Level elision: fold surviving children upward, left-to-right.
    let survivors: Vec<Tree> = children
        .values()
        .map(|child| filter_levels(child, display_levels, current_level + 1))
        .filter(|child| !child.is_empty())
        .collect();

    match survivors.len() {
        0 => Tree::branch(),
        1 => survivors.into_iter().next().unwrap(),
        _ => survivors.into_iter().reduce(merge).unwrap(),
    }
}

/// Bucket a tree by cumulative path, one group per distinct key at
/// `target_level`.
///
/// Descends one level per call, appending each traversed key to the
/// cumulative path. Once past the target level, the remaining subtree is
/// recorded wholesale under the accumulated path — it later becomes its own
/// independently assembled and paginated root. Leaf files encountered at or
/// above the target become single-item groups keyed by
/// `cumulative/file-stem` (extension stripped) holding the literal file
/// reference.
pub fn aggregate(
    tree: &Tree,
    target_level: usize,
    cumulative_path: &[String],
    current_level: usize,
    groups: &mut BTreeMap<String, Tree>,
) {
    if tree.is_empty() {
        return;
    }

    if current_level > target_level {
        groups.insert(cumulative_path.join("/"), tree.clone());
        return;
    }

    match tree {
        Tree::Files(files) => {
            for file in files {
                groups.insert(
                    single_item_key(cumulative_path, file),
                    Tree::File(file.clone()),
                );
            }
        }
        Tree::File(file) => {
            groups.insert(
                single_item_key(cumulative_path, file),
                Tree::File(file.clone()),
            );
        }
        Tree::Branch(children) => {
            for (key, child) in children {
                let mut path = cumulative_path.to_vec();
                path.push(key.clone());
                aggregate(child, target_level, &path, current_level + 1, groups);
            }
        }
        Tree::Empty => {}
    }
}

/// Group key for a single-item group: the cumulative path plus the file's
/// base name with its extension stripped.
fn single_item_key(cumulative_path: &[String], file: &str) -> String {
    let base_name = file.rsplit('/').next().unwrap_or(file);
    let mut segments = cumulative_path.to_vec();
    segments.push(file_stem(base_name).to_string());
    segments.join("/")
}

/// Strip the final extension from a path.
pub fn file_stem(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}
