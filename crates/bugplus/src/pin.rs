//! Pin records.
//!
//! Data pins reference a [`Variable`](crate::variable::Variable); control pins
//! form the directed execution graph.

use crate::handle::{ControlInId, DataInId, DataOutId, InstanceId, VariableId};
use smallvec::SmallVec;

/// Data-input pin
#[derive(Debug, Clone)]
pub struct DataInPin {
    pub(crate) owner: InstanceId,
    /// Set once the pin has been explicitly wired, never cleared
    pub(crate) connected: bool,
    pub(crate) variable: Option<VariableId>,
    /// Internal pins this external input feeds (composite interface bridge)
    pub(crate) interface_inputs: SmallVec<[DataInId; 2]>,
}

impl DataInPin {
    pub(crate) fn new(owner: InstanceId) -> Self {
        Self {
            owner,
            connected: false,
            variable: None,
            interface_inputs: SmallVec::new(),
        }
    }

    pub fn owner(&self) -> InstanceId {
        self.owner
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn variable(&self) -> Option<VariableId> {
        self.variable
    }

    pub fn interface_inputs(&self) -> &[DataInId] {
        &self.interface_inputs
    }
}

/// Data-output pin
#[derive(Debug, Clone)]
pub struct DataOutPin {
    pub(crate) owner: InstanceId,
    pub(crate) connected: bool,
    pub(crate) variable: Option<VariableId>,
    /// The enclosing composite's output this pin also feeds
    pub(crate) interface_output: Option<DataOutId>,
}

impl DataOutPin {
    pub(crate) fn new(owner: InstanceId) -> Self {
        Self {
            owner,
            connected: false,
            variable: None,
            interface_output: None,
        }
    }

    pub fn owner(&self) -> InstanceId {
        self.owner
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn variable(&self) -> Option<VariableId> {
        self.variable
    }

    pub fn interface_output(&self) -> Option<DataOutId> {
        self.interface_output
    }
}

/// Control-input pin. Executing it runs `node`.
#[derive(Debug, Clone, Copy)]
pub struct ControlInPin {
    pub(crate) node: InstanceId,
}

impl ControlInPin {
    pub fn node(&self) -> InstanceId {
        self.node
    }
}

/// Control-output pin. Without a target, reaching it ends the run.
#[derive(Debug, Clone, Copy)]
pub struct ControlOutPin {
    pub(crate) owner: InstanceId,
    pub(crate) target: Option<ControlInId>,
}

impl ControlOutPin {
    pub fn owner(&self) -> InstanceId {
        self.owner
    }

    pub fn target(&self) -> Option<ControlInId> {
        self.target
    }
}
