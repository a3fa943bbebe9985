//! # docver
//!
//! Metadata engine for versioned documentation sites. Given a site with one
//! in-development version and any number of released versions, docver works
//! out what every document is called, where it is served, which sidebar it
//! belongs to and what comes before and after it. The result is a route tree,
//! one JSON payload per document and a compact global index a client-side
//! renderer can navigate with.
//!
//! # Architecture
//!
//! ```text
//! 1. Catalog   docver.toml     →  VersionCatalog     (versions, paths, URL segments)
//! 2. Scan      docs per version →  Registry           (global id → RawDocument)
//! 3. Sidebars  sidebars.json   →  Sidebars + Order    (normalized trees, prev/next)
//! 4. Link      registry + order →  LinkedContent      (docs with neighbours)
//! 5. Emit      linked content  →  routes, payloads, global data
//! ```
//!
//! Stages 2, 3 and 5 run one task per version on rayon; each task returns its
//! result and the merge happens on one thread, so outputs are identical across
//! runs regardless of scheduling.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `docver.toml` loading, legacy option migration, validation |
//! | [`versions`] | Version catalog: disk layout, URL segments, global id scoping |
//! | [`scan`] | Document discovery and the registry |
//! | [`metadata`] | `DocumentExtractor` trait and the markdown/front-matter extractor |
//! | [`sidebar`] | Sidebar file parsing and normalization into links and categories |
//! | [`order`] | Previous/next and sidebar membership from sidebar position |
//! | [`linker`] | Joins documents with their order, builds reverse indices |
//! | [`generate`] | Route tree, data payloads, global index; writes the output |
//! | [`pipeline`] | Runs the stages end to end |
//! | [`naming`] | URL joining, slug resolution, id prefixes, data file names |
//! | [`types`] | Types shared between stages and serialized for the client |
//! | [`output`] | CLI output formatting |
//!
//! # Ids
//!
//! Every document has an *unversioned id* (`guides/install`), unique inside
//! its version, and a *global id* unique across the corpus. The current
//! version owns the bare id space; released versions prefix theirs with
//! `version-<name>/`. Everything after scanning looks documents up by global
//! id only, so two versions can never see each other's documents.

pub mod config;
pub mod generate;
pub mod linker;
pub mod metadata;
pub mod naming;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod sidebar;
pub mod types;
pub mod versions;

#[cfg(test)]
pub(crate) mod test_helpers;
