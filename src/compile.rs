//! Compilation orchestration: one request in, a map of output documents out.
//!
//! [`Api`] owns the parsed blueprint and the run-wide toggles. One call to
//! [`Api::compile`] performs a full request against an immutable snapshot:
//!
//! 1. resolve the root level and display levels (unknown names are
//!    configuration errors, caught before any file is read);
//! 2. build the endpoint tree and draft the main collection;
//! 3. run one aggregation per `group-by` level and draft each group;
//! 4. settle the deduplicated load queue in parallel — the first failing
//!    load aborts the run, so no partial output is ever written;
//! 5. finalize every draft against the read cache and paginate.
//!
//! Each request gets its own queue and cache; nothing is shared across
//! requests beyond the snapshot itself.

use crate::assemble::{finalize, Assembler, Draft, LoadQueue, ReadCache};
use crate::blueprint::{Blueprint, BlueprintError};
use crate::config::EndpointSpec;
use crate::content::{self, LoadError};
use crate::endpoint::{build_endpoint_tree, reorder_levels};
use crate::naming::{Identity, Pluralize, RuleTable};
use crate::paginate::{document_key, paginate};
use crate::scan::Snapshot;
use crate::tree::{aggregate, Tree};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown root level '{0}'")]
    UnknownRootLevel(String),
    #[error("Unknown display level '{0}'")]
    UnknownLevel(String),
    #[error("Unknown grouping level '{0}'")]
    UnknownGroupLevel(String),
    #[error("items-per-page must be at least 1")]
    InvalidItemsPerPage,
}

/// Run-wide settings, normally lifted straight from [`SiteConfig`].
///
/// [`SiteConfig`]: crate::config::SiteConfig
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub blueprint: String,
    pub output: PathBuf,
    pub pluralize: bool,
    pub inject_ids: bool,
}

/// A configured compiler, valid for any number of requests against any
/// number of snapshots of the same blueprint.
pub struct Api {
    blueprint: Blueprint,
    base_directory: PathBuf,
    output: PathBuf,
    pluralize: bool,
    inject_ids: bool,
}

/// Request parameters resolved against the blueprint.
struct Resolved {
    base_level: usize,
    /// Indices into the reordered level list; 0 is always present.
    display: BTreeSet<usize>,
    /// Names of the displayed levels, in index order. Filtered-tree depth
    /// corresponds to position in this list.
    display_names: Vec<String>,
    /// Output name of the main collection.
    collection_name: String,
}

/// A drafted aggregator group awaiting finalization.
enum GroupDraft {
    /// One literal file: written as the raw loaded document, unpaginated.
    Single(Draft),
    /// A subtree assembled into its own collection.
    Collection(Draft),
}

impl Api {
    pub fn new(options: ApiOptions) -> Result<Self, CompileError> {
        let blueprint = Blueprint::parse(&options.blueprint)?;
        let base_directory = PathBuf::from(blueprint.base_directory());
        Ok(Self {
            blueprint,
            base_directory,
            output: options.output,
            pluralize: options.pluralize,
            inject_ids: options.inject_ids,
        })
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn output_directory(&self) -> &Path {
        &self.output
    }

    fn pluralizer(&self) -> &dyn Pluralize {
        if self.pluralize {
            &RuleTable
        } else {
            &Identity
        }
    }

    fn resolve(&self, request: &EndpointSpec) -> Result<Resolved, CompileError> {
        if request.items_per_page == 0 {
            return Err(CompileError::InvalidItemsPerPage);
        }

        let base_level = match &request.root {
            Some(name) => self
                .blueprint
                .level_index(name)
                .ok_or_else(|| CompileError::UnknownRootLevel(name.clone()))?,
            None => 0,
        };
        let level_names = reorder_levels(&self.blueprint.levels, base_level);

        let mut display = BTreeSet::new();
        display.insert(0);
        match &request.levels {
            Some(requested) => {
                for name in requested {
                    let index = level_names
                        .iter()
                        .position(|level| level == name)
                        .ok_or_else(|| CompileError::UnknownLevel(name.clone()))?;
                    display.insert(index);
                }
            }
            None => display.extend(0..level_names.len()),
        }

        let display_names = display
            .iter()
            .map(|&index| level_names[index].clone())
            .collect();

        let collection_name = request
            .path
            .clone()
            .unwrap_or_else(|| self.pluralizer().pluralize(&level_names[0]));

        Ok(Resolved {
            base_level,
            display,
            display_names,
            collection_name,
        })
    }

    /// Compile one request into its output documents, keyed by relative
    /// output path.
    pub fn compile(
        &self,
        snapshot: &Snapshot,
        request: &EndpointSpec,
    ) -> Result<BTreeMap<String, Value>, CompileError> {
        let resolved = self.resolve(request)?;
        let endpoint_tree = build_endpoint_tree(
            &snapshot.paths,
            &snapshot.tree,
            resolved.base_level,
            &resolved.display,
        );

        let mut queue = LoadQueue::new();
        let assembler = Assembler {
            base_directory: &self.base_directory,
            level_names: &resolved.display_names,
            sort: &request.sort,
            pluralizer: self.pluralizer(),
        };

        let main = assembler.assemble(&endpoint_tree, 0, None, None, &mut queue);

        let mut groups: Vec<(String, GroupDraft)> = Vec::new();
        for group_name in &request.group_by {
            let target = resolved
                .display_names
                .iter()
                .position(|name| name == group_name)
                .ok_or_else(|| CompileError::UnknownGroupLevel(group_name.clone()))?;

            let mut buckets = BTreeMap::new();
            aggregate(&endpoint_tree, target, &[], 0, &mut buckets);

            for (key, subtree) in buckets {
                match subtree {
                    Tree::File(file) => {
                        let path = self.base_directory.join(&file);
                        queue.register(&path);
                        // The file stands in for the deepest displayed level.
                        let level = resolved
                            .display_names
                            .last()
                            .cloned()
                            .unwrap_or_default();
                        groups.push((key, GroupDraft::Single(Draft::Pending { path, level })));
                    }
                    subtree => {
                        if let Some(draft) = assembler.assemble(
                            &subtree,
                            target + 1,
                            Some(group_name),
                            None,
                            &mut queue,
                        ) {
                            groups.push((key, GroupDraft::Collection(draft)));
                        }
                    }
                }
            }
        }

        let cache = settle(&queue)?;

        let mut documents = BTreeMap::new();
        let results = extract_results(main.map(|draft| finalize(&draft, &cache, self.inject_ids)));
        paginate(
            &results,
            &resolved.collection_name,
            request.items_per_page,
            &mut documents,
        );

        for (key, draft) in groups {
            match draft {
                GroupDraft::Single(draft) => {
                    documents.insert(
                        document_key(&key, 1),
                        finalize(&draft, &cache, self.inject_ids),
                    );
                }
                GroupDraft::Collection(draft) => {
                    let results =
                        extract_results(Some(finalize(&draft, &cache, self.inject_ids)));
                    paginate(&results, &key, request.items_per_page, &mut documents);
                }
            }
        }

        Ok(documents)
    }

    /// Remove any previous output directory and recreate it empty.
    pub fn reset_output(&self) -> Result<(), CompileError> {
        match fs::remove_dir_all(&self.output) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        fs::create_dir_all(&self.output)?;
        Ok(())
    }

    /// Write compiled documents under the output directory as pretty JSON.
    pub fn write(&self, documents: &BTreeMap<String, Value>) -> Result<(), CompileError> {
        for (key, document) in documents {
            let path = self.output.join(key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, serde_json::to_string_pretty(document)?)?;
        }
        Ok(())
    }
}

/// Read and parse every queued path in parallel. The first error aborts
/// the whole run.
fn settle(queue: &LoadQueue) -> Result<ReadCache, CompileError> {
    queue
        .paths()
        .par_iter()
        .map(|path| content::load(path).map(|fields| (path.clone(), fields)))
        .collect::<Result<ReadCache, LoadError>>()
        .map_err(CompileError::from)
}

/// Pull the result list out of a finalized root document.
fn extract_results(document: Option<Value>) -> Vec<Value> {
    match document {
        Some(Value::Object(mut fields)) => match fields.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
