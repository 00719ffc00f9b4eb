//! Typed handles into a [`Graph`](crate::graph::Graph).
//!
//! Pins and instances are append-only and indexed directly. Variables can be
//! merged away or released, so their handles carry a generation.

use crate::arena::SlotId;
use std::fmt;

/// Handle to a shared integer cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VariableId(pub(crate) SlotId);

/// Handle to a data-input pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct DataInId(pub(crate) u32);

/// Handle to a data-output pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct DataOutId(pub(crate) u32);

/// Handle to a control-input pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ControlInId(pub(crate) u32);

/// Handle to a control-output pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ControlOutId(pub(crate) u32);

/// Handle to an instance (primitive, composite or join node).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u32);

impl DataInId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl DataOutId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl ControlInId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl ControlOutId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl InstanceId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
