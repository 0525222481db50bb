//! Batch incorporation: decode → map → upsert → layout.
//!
//! A batch is one complete query result set. Decoding happens before any
//! store mutation, so a row that fails to decode aborts the batch atomically;
//! upserts are total functions and cannot fail; the layout collaborator runs
//! exactly once per batch, after all mutations, and a layout failure leaves
//! the store mutated but the visual positions stale.

use std::sync::Arc;

use crate::error::{LayoutError, LoomResult};
use crate::graph::store::GraphStore;
use crate::mapper::RowMapper;
use crate::results::{DecodedRow, ResultRow};
use crate::value::{DecodeObserver, TracingObserver};

/// Node separation handed to the layout engine, in layout units.
pub const DEFAULT_NODE_SEPARATION: u32 = 120;

/// External layout collaborator, invoked as a black box once per batch.
pub trait LayoutEngine: Send + Sync {
    /// Recompute positions for the whole graph with the given node separation.
    fn run(&self, store: &GraphStore, node_separation: u32) -> Result<(), LayoutError>;
}

/// Layout engine that does nothing. For headless hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl LayoutEngine for NoLayout {
    fn run(&self, _store: &GraphStore, _node_separation: u32) -> Result<(), LayoutError> {
        Ok(())
    }
}

/// Outcome of one incorporation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncorporationReport {
    /// Rows decoded and mapped.
    pub rows: usize,
    /// Nodes actually inserted.
    pub nodes_added: usize,
    /// Node specs that were structural no-ops (id already present).
    pub nodes_seen: usize,
    /// Edges actually inserted.
    pub edges_added: usize,
    /// Edge specs that were structural no-ops.
    pub edges_seen: usize,
}

/// Drives batches of result rows into a [`GraphStore`].
#[derive(Clone)]
pub struct Incorporator {
    mapper: RowMapper,
    observer: Arc<dyn DecodeObserver>,
    layout: Arc<dyn LayoutEngine>,
    node_separation: u32,
}

impl Incorporator {
    /// Create an incorporator over the given mapper and layout collaborator.
    pub fn new(mapper: RowMapper, layout: Arc<dyn LayoutEngine>) -> Self {
        Self {
            mapper,
            observer: Arc::new(TracingObserver),
            layout,
            node_separation: DEFAULT_NODE_SEPARATION,
        }
    }

    /// Replace the degraded-decode observer.
    pub fn with_observer(mut self, observer: Arc<dyn DecodeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the node separation passed to the layout engine.
    pub fn with_node_separation(mut self, node_separation: u32) -> Self {
        self.node_separation = node_separation;
        self
    }

    /// Incorporate one batch of rows into `store`.
    ///
    /// Decode failures abort before any mutation. A layout failure is logged
    /// and propagated; the applied upserts stand.
    pub fn incorporate(
        &self,
        rows: &[ResultRow],
        store: &GraphStore,
    ) -> LoomResult<IncorporationReport> {
        // Decode every row up front; the batch is atomic at this stage.
        let mut decoded = Vec::with_capacity(rows.len());
        for row in rows {
            decoded.push(DecodedRow::decode(row, self.observer.as_ref())?);
        }

        // Map in the rows' original sequence.
        let mut mapped = Vec::with_capacity(decoded.len());
        for row in &decoded {
            mapped.push(self.mapper.map_row(row)?);
        }

        // Apply all node specs, then all edge specs, in mapper output order.
        let mut report = IncorporationReport {
            rows: rows.len(),
            ..Default::default()
        };
        for elements in &mapped {
            for spec in &elements.nodes {
                if store.upsert_node(spec.clone()) {
                    report.nodes_added += 1;
                } else {
                    report.nodes_seen += 1;
                }
            }
        }
        for elements in &mapped {
            if let Some(edge) = &elements.edge {
                if store.upsert_edge(edge.clone()) {
                    report.edges_added += 1;
                } else {
                    report.edges_seen += 1;
                }
            }
        }

        tracing::info!(
            rows = report.rows,
            nodes_added = report.nodes_added,
            edges_added = report.edges_added,
            "incorporated result batch"
        );

        // One layout pass per batch, after the whole batch is applied.
        if let Err(e) = self.layout.run(store, self.node_separation) {
            tracing::warn!(error = %e, "layout failed after incorporation, positions are stale");
            return Err(e.into());
        }

        Ok(report)
    }
}

impl std::fmt::Debug for Incorporator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Incorporator")
            .field("mapper", &self.mapper)
            .field("node_separation", &self.node_separation)
            .finish()
    }
}
