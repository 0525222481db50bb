//! # graphloom
//!
//! Incrementally assembles tabular results from a semantic-web query service
//! into a deduplicated, typed property graph suitable for visual exploration.
//!
//! ## Architecture
//!
//! - **Value decoding** (`value`): tagged RDF terms → native typed values
//! - **Result rows** (`results`): fixed-shape rows with typed accessors
//! - **Row mapping** (`mapper`): decoded rows → idempotent upsert instructions
//! - **Graph store** (`graph`): append-only deduplicated nodes and edges
//! - **Incorporation** (`incorporate`): decode → map → upsert → one layout pass
//! - **Batch queue** (`queue`): serialized execution of overlapping batches
//! - **Service client** (`service`): query construction, transport, autocomplete
//!
//! Rendering and layout stay external: the host hands in a
//! [`LayoutEngine`](incorporate::LayoutEngine) and reads the store's
//! [`elements()`](graph::store::GraphStore::elements) snapshot.
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use graphloom::explorer::{Explorer, ExplorerConfig};
//! use graphloom::incorporate::NoLayout;
//!
//! let explorer = Explorer::new(ExplorerConfig::default(), Arc::new(NoLayout)).unwrap();
//! explorer.expand("Q42").unwrap();
//! assert!(explorer.store().node_count() > 0);
//! ```

pub mod error;
pub mod explorer;
pub mod graph;
pub mod incorporate;
pub mod mapper;
pub mod queue;
pub mod results;
pub mod service;
pub mod value;
