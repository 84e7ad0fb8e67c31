//! Endpoint tree construction: re-rooting the content hierarchy.
//!
//! A compilation request may root its output at any blueprint level. The
//! builder locates every subtree sitting at that depth by matching the path
//! index against "one segment per level down to the root," filters each
//! subtree to the requested display levels, and merges the results into a
//! single composite tree keyed root-first.
//!
//! Two physical branches can map to the same logical key (the `ghosts`
//! genre exists under several languages); their filtered subtrees are
//! structurally merged rather than overwritten.

use crate::scan::PathIndex;
use crate::tree::{file_stem, filter_levels, Tree};
use std::collections::BTreeSet;

/// Display-level names for a request rooted at `base_level`: the root name
/// moves to the front, the rest keep blueprint order.
pub fn reorder_levels(levels: &[String], base_level: usize) -> Vec<String> {
    let mut reordered = levels.to_vec();
    let root = reordered.remove(base_level);
    reordered.insert(0, root);
    reordered
}

/// Build the composite endpoint tree for a request rooted at `base_level`.
///
/// `display` holds indices into the reordered level list; index 0 (the
/// root itself) is always present. Matches are paths with exactly
/// `base_level + 1` segments:
///
/// - a matched directory contributes its filtered subtree under a composite
///   key: the matched root name first, then each ancestor segment whose
///   reordered index is displayed;
/// - a matched file (the root is the deepest level) becomes a leaf endpoint
///   keyed by the whole match path with its extension stripped.
pub fn build_endpoint_tree(
    paths: &PathIndex,
    tree: &Tree,
    base_level: usize,
    display: &BTreeSet<usize>,
) -> Tree {
    let mut endpoint_tree = Tree::branch();

    for (path, kind) in paths {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() != base_level + 1 {
            continue;
        }

        if kind.is_file() {
            endpoint_tree.merge_at(
                &[file_stem(path).to_string()],
                Tree::File(path.clone()),
            );
            continue;
        }

        let subtree = tree.get(&segments).cloned().unwrap_or(Tree::Empty);
        let filtered = filter_levels(&subtree, display, base_level);

        // Ancestor at blueprint depth i sits at reordered index i + 1.
        let mut key = vec![segments[base_level].to_string()];
        for (depth, ancestor) in segments[..base_level].iter().enumerate() {
            if display.contains(&(depth + 1)) {
                key.push(ancestor.to_string());
            }
        }
        endpoint_tree.merge_at(&key, filtered);
    }

    endpoint_tree
}
