//! Trace ledger for debug instantiations.
//!
//! Records what traced primitives saw and emitted, per run.

use crate::handle::InstanceId;
use smallvec::SmallVec;
use std::sync::Arc;

/// A recorded trace entry
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// Which `execute` call this happened in, starting at 1
    pub run: u64,
    pub node: InstanceId,
    pub kind: TraceKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceKind {
    /// A primitive was asked to fire with these input values
    Request {
        specification: Arc<str>,
        inputs: SmallVec<[i64; 2]>,
    },
    /// A primitive wrote `output` and fired control output `control_out`
    Emit { output: i64, control_out: usize },
}

#[derive(Debug, Default)]
pub struct TraceLedger {
    entries: Vec<TraceEntry>,
}

impl TraceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, run: u64, node: InstanceId, kind: TraceKind) {
        self.entries.push(TraceEntry { run, node, kind });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries_for_run(&self, run: u64) -> Vec<&TraceEntry> {
        self.entries.iter().filter(|e| e.run == run).collect()
    }

    pub fn entries_for_node(&self, node: InstanceId) -> Vec<&TraceEntry> {
        self.entries.iter().filter(|e| e.node == node).collect()
    }

    /// Input values of every request, in firing order.
    pub fn requests(&self) -> impl Iterator<Item = (InstanceId, &[i64])> {
        self.entries.iter().filter_map(|e| match &e.kind {
            TraceKind::Request { inputs, .. } => Some((e.node, inputs.as_slice())),
            TraceKind::Emit { .. } => None,
        })
    }
}
