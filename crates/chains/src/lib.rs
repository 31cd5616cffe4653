//! Known networks and chain metadata for the bursar wallet service.
//!
//! # Modules
//!
//! - [`registry`] - the static table of known CENNZnet networks and the
//!   `is_chain_supported` check
//! - [`metadata`] - chain metadata definitions and their memoized
//!   expansion into queryable [`subxt::Metadata`]
//! - [`releases`] - lookups of published metadata releases for chains
//!   whose stored definition is outdated

pub mod metadata;
pub mod registry;
pub mod releases;

pub use metadata::{ChainSpec, MetadataCache, MetadataDef};
pub use registry::{default_genesis_hash, is_chain_supported, known_endpoints};
pub use releases::{MetadataFetched, ReleaseClient, RuntimeTypes};
