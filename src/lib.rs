//! # Strata
//!
//! A static JSON API compiler. Your filesystem is the data source: a
//! directory hierarchy of content files is compiled into a tree of paginated
//! JSON documents that any static file server can serve as a read-only REST
//! API.
//!
//! The shape of the hierarchy is declared once, as a *blueprint*:
//!
//! ```text
//! blueprint = "data/:language/:genre/:year"
//!
//! data/
//! ├── english/                 # :language
//! │   ├── ghosts/              # :genre
//! │   │   ├── 2005.yml         # :year — one record per file
//! │   │   └── 2016.yml
//! │   └── science-fiction/
//! │       └── 2016.yml
//! └── french/
//!     └── ghosts/
//!         └── 2016.yml
//! ```
//!
//! Each compilation request can re-root the hierarchy at any level ("movies
//! by genre"), elide levels (drop the language layer and merge its
//! branches), group by a level ("one document per director"), sort, and
//! paginate. The output is plain JSON files with `previousPage`/`nextPage`
//! links — no server process, no database, no query language.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      data/      →  Snapshot        (path index + content tree)
//! 2. Compile   Snapshot   →  documents       (filter → assemble → paginate)
//! 3. Write     documents  →  output/         (pretty JSON files)
//! ```
//!
//! The scan happens exactly once per run; every `[[endpoint]]` request in
//! the config compiles against the same immutable snapshot. Content files
//! are read in parallel, at most once each per request, and nothing is
//! written until every read has succeeded — a failing run leaves no partial
//! output.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`blueprint`] | Path-pattern parser: `data/:genre/:year` → base + level names |
//! | [`scan`] | Walks the base directory into a path index and content tree |
//! | [`tree`] | The content tree, level filtering (elision), merging, aggregation |
//! | [`endpoint`] | Re-roots the hierarchy at any level into a composite endpoint tree |
//! | [`assemble`] | Two-phase output assembly: drafts with pending loads, then finalization |
//! | [`content`] | Per-extension content parsing: YAML, front-matter markdown, raw text |
//! | [`paginate`] | Slices result lists into linked, paginated documents |
//! | [`naming`] | Pluggable pluralization of level names |
//! | [`config`] | `strata.toml` loading and validation |
//! | [`compile`] | Orchestration: one request in, a map of output documents out |
//!
//! # Design Decisions
//!
//! ## Two-Phase Assembly
//!
//! Result documents are first drafted with a pending-load marker in every
//! slot that needs file contents, while a run-scoped queue collects the
//! referenced paths (deduplicated, so a file shared by two collections is
//! read once). Only after the whole queue settles are drafts finalized.
//! Mapping-derived collections keep key order because slots are
//! index-addressed; sorted collections fold items in through a linear
//! sorted merge. No result list is ever mutated by an in-flight read.
//!
//! ## The Filesystem Is the Query Planner
//!
//! There is no runtime query engine: every access pattern you want to serve
//! is one `[[endpoint]]` table in the config, compiled ahead of time. The
//! price is output size (one document tree per request); the payoff is that
//! serving is `GET` on a static file.
//!
//! ## Deterministic Output
//!
//! Branches are ordered maps and multi-way merges fold left-to-right in key
//! order, so two runs over the same content produce byte-identical output.
//! This keeps builds diffable and the output directory friendly to
//! content-addressed deployment.

pub mod assemble;
pub mod blueprint;
pub mod compile;
pub mod config;
pub mod content;
pub mod endpoint;
pub mod naming;
pub mod paginate;
pub mod scan;
pub mod tree;
