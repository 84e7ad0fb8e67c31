//! Filesystem scanning: the one-shot snapshot every compilation runs from.
//!
//! Walks the blueprint's base directory eagerly and produces a [`Snapshot`]
//! holding two views of the same hierarchy:
//!
//! - a flat [`PathIndex`] mapping every relative path to a file/directory
//!   descriptor, used by the endpoint builder's glob matching;
//! - a recursive [`Tree`] in which directories become branches and a
//!   directory of leaf files becomes a [`Tree::Files`] list.
//!
//! ## Directory Structure
//!
//! For a blueprint like `data/:language/:genre/:year`, the deepest level is
//! the files themselves:
//!
//! ```text
//! data/                            # Base directory
//! ├── english/                     # :language
//! │   ├── ghosts/                  # :genre
//! │   │   ├── 2005.yml             # :year (one record per file)
//! │   │   └── 2016.yml
//! │   └── science-fiction/
//! │       └── 2016.yml
//! └── french/
//!     └── ghosts/
//!         └── 2016.yml
//! ```
//!
//! Hidden entries (names starting with `.`) are excluded, directories and
//! all. The snapshot is immutable for the lifetime of a run: files changing
//! on disk between the walk and the content loads surface as load errors,
//! never as silent inconsistencies.
//!
//! ## Validation
//!
//! A directory containing both files and subdirectories violates the depth
//! invariant (leaf lists only at the maximum configured depth) and fails
//! the scan.

use crate::tree::Tree;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Directory contains both files and subdirectories: {0}")]
    MixedContent(PathBuf),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
}

/// Whether an indexed path is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

impl PathKind {
    pub fn is_file(self) -> bool {
        matches!(self, PathKind::File)
    }
}

/// Flat index of every relative path under the base directory.
pub type PathIndex = BTreeMap<String, PathKind>;

/// Immutable result of one walk: the path index and the content tree.
#[derive(Debug)]
pub struct Snapshot {
    pub paths: PathIndex,
    pub tree: Tree,
}

/// Walk `base` and build the snapshot.
pub fn walk(base: &Path) -> Result<Snapshot, ScanError> {
    let mut paths = PathIndex::new();
    let mut tree = Tree::branch();

    let walker = WalkDir::new(base)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.file_name()));

    for entry in walker {
        let entry = entry?;
        let segments = relative_segments(entry.path().strip_prefix(base).unwrap_or(entry.path()))?;
        let relative = segments.join("/");

        if entry.file_type().is_dir() {
            paths.insert(relative, PathKind::Directory);
            insert_directory(&mut tree, &segments)?;
        } else {
            paths.insert(relative.clone(), PathKind::File);
            push_file(&mut tree, &segments, relative)?;
        }
    }

    Ok(Snapshot { paths, tree })
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn relative_segments(path: &Path) -> Result<Vec<String>, ScanError> {
    path.components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| ScanError::NonUtf8Path(path.to_path_buf()))
        })
        .collect()
}

/// Record a directory in the tree as an empty node; its parent chain is
/// promoted to branches on the way down.
fn insert_directory(tree: &mut Tree, segments: &[String]) -> Result<(), ScanError> {
    let parent = descend(tree, &segments[..segments.len() - 1])?;
    let children = match parent {
        Tree::Branch(children) => children,
        Tree::Empty => {
            *parent = Tree::branch();
            match parent {
                Tree::Branch(children) => children,
                _ => unreachable!(),
            }
        }
        // Parent already holds leaf files.
        _ => return Err(ScanError::MixedContent(PathBuf::from(segments.join("/")))),
    };
    children
        .entry(segments[segments.len() - 1].clone())
        .or_insert(Tree::Empty);
    Ok(())
}

/// Append a file to its parent directory's leaf list.
fn push_file(tree: &mut Tree, segments: &[String], relative: String) -> Result<(), ScanError> {
    let parent = descend(tree, &segments[..segments.len() - 1])?;
    match parent {
        Tree::Empty => *parent = Tree::Files(vec![relative]),
        Tree::Files(files) => files.push(relative),
        Tree::Branch(children) if children.is_empty() => {
            *parent = Tree::Files(vec![relative]);
        }
        // Parent already holds subdirectories.
        _ => return Err(ScanError::MixedContent(PathBuf::from(segments.join("/")))),
    }
    Ok(())
}

fn descend<'a>(tree: &'a mut Tree, segments: &[String]) -> Result<&'a mut Tree, ScanError> {
    let mut node = tree;
    for segment in segments {
        if node.is_empty() {
            *node = Tree::branch();
        }
        let children = match node {
            Tree::Branch(children) => children,
            _ => return Err(ScanError::MixedContent(PathBuf::from(segments.join("/")))),
        };
        node = children.entry(segment.clone()).or_insert(Tree::Empty);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_fixtures() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for dir in [
            "english/ghosts",
            "english/science-fiction",
            "french/ghosts",
        ] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        for file in [
            "english/ghosts/2005.yml",
            "english/ghosts/2016.yml",
            "english/science-fiction/2016.yml",
            "french/ghosts/2016.yml",
        ] {
            fs::write(tmp.path().join(file), "title: test").unwrap();
        }
        tmp
    }

    #[test]
    fn indexes_files_and_directories() {
        let tmp = setup_fixtures();
        let snapshot = walk(tmp.path()).unwrap();

        assert_eq!(snapshot.paths.get("english"), Some(&PathKind::Directory));
        assert_eq!(
            snapshot.paths.get("english/ghosts"),
            Some(&PathKind::Directory)
        );
        assert_eq!(
            snapshot.paths.get("english/ghosts/2005.yml"),
            Some(&PathKind::File)
        );
        // 5 directories + 4 files
        assert_eq!(snapshot.paths.len(), 9);
    }

    #[test]
    fn tree_mirrors_the_hierarchy() {
        let tmp = setup_fixtures();
        let snapshot = walk(tmp.path()).unwrap();

        assert_eq!(
            snapshot.tree.get(&["english", "ghosts"]),
            Some(&Tree::Files(vec![
                "english/ghosts/2005.yml".to_string(),
                "english/ghosts/2016.yml".to_string(),
            ]))
        );
        assert_eq!(
            snapshot.tree.get(&["french", "ghosts"]),
            Some(&Tree::Files(vec!["french/ghosts/2016.yml".to_string()]))
        );
    }

    #[test]
    fn empty_directories_become_empty_nodes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("english/empty")).unwrap();

        let snapshot = walk(tmp.path()).unwrap();
        assert_eq!(snapshot.tree.get(&["english", "empty"]), Some(&Tree::Empty));
    }

    #[test]
    fn hidden_entries_are_excluded() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("english/ghosts/.hidden.yml"), "x").unwrap();
        fs::create_dir_all(tmp.path().join(".git/objects")).unwrap();
        fs::write(tmp.path().join(".git/objects/abc"), "x").unwrap();

        let snapshot = walk(tmp.path()).unwrap();
        assert!(!snapshot.paths.keys().any(|p| p.contains(".git")));
        assert!(!snapshot.paths.keys().any(|p| p.contains(".hidden")));
        assert_eq!(
            snapshot.tree.get(&["english", "ghosts"]),
            Some(&Tree::Files(vec![
                "english/ghosts/2005.yml".to_string(),
                "english/ghosts/2016.yml".to_string(),
            ]))
        );
    }

    #[test]
    fn files_are_listed_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("ghosts")).unwrap();
        // Created out of order; the walker sorts by file name.
        fs::write(tmp.path().join("ghosts/2016.yml"), "x").unwrap();
        fs::write(tmp.path().join("ghosts/2005.yml"), "x").unwrap();

        let snapshot = walk(tmp.path()).unwrap();
        assert_eq!(
            snapshot.tree.get(&["ghosts"]),
            Some(&Tree::Files(vec![
                "ghosts/2005.yml".to_string(),
                "ghosts/2016.yml".to_string(),
            ]))
        );
    }

    #[test]
    fn mixed_content_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("ghosts/sub")).unwrap();
        fs::write(tmp.path().join("ghosts/2005.yml"), "x").unwrap();

        assert!(matches!(walk(tmp.path()), Err(ScanError::MixedContent(_))));
    }
}
