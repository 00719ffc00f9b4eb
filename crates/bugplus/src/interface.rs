//! Fixed-shape pin sets of an instance.

use crate::handle::{ControlInId, ControlOutId, DataInId, DataOutId, InstanceId};

/// The interface of a primitive or composite instance.
///
/// Arity is fixed when the instance is created. `register` and
/// `call_counter` are the only per-instance mutable state outside of
/// variables.
#[derive(Debug, Clone)]
pub struct Interface {
    pub(crate) data_inputs: Vec<DataInId>,
    pub(crate) data_output: DataOutId,
    /// Primitives own their control input. A composite borrows the control
    /// input of the internal node it exposes, so this stays `None` until the
    /// corresponding directive has been replayed.
    pub(crate) control_input: Option<ControlInId>,
    pub(crate) control_outputs: Vec<ControlOutId>,
    /// One join node per external control output (composites only)
    pub(crate) return_nodes: Vec<InstanceId>,
    pub(crate) register: i64,
    pub(crate) call_counter: u32,
}

impl Interface {
    pub fn data_inputs(&self) -> &[DataInId] {
        &self.data_inputs
    }

    pub fn data_output(&self) -> DataOutId {
        self.data_output
    }

    pub fn control_input(&self) -> Option<ControlInId> {
        self.control_input
    }

    pub fn control_outputs(&self) -> &[ControlOutId] {
        &self.control_outputs
    }

    pub fn return_nodes(&self) -> &[InstanceId] {
        &self.return_nodes
    }

    pub fn register(&self) -> i64 {
        self.register
    }

    pub fn call_counter(&self) -> u32 {
        self.call_counter
    }

    pub fn num_data_in(&self) -> usize {
        self.data_inputs.len()
    }

    pub fn num_control_out(&self) -> usize {
        self.control_outputs.len()
    }
}
