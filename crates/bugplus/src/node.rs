//! Runtime node records.

use crate::handle::{ControlInId, ControlOutId, InstanceId};
use crate::interface::Interface;
use crate::primitive::Primitive;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Closed set of node kinds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Native behaviour
    Primitive {
        primitive: Primitive,
        interface: Interface,
    },
    /// Behaviour is the wiring of the sub-instances in `bugs`
    Program {
        interface: Interface,
        bugs: FxHashMap<String, InstanceId>,
    },
    /// Forwards control to one external control output of its program
    Join {
        control_in: ControlInId,
        control_out: ControlOutId,
    },
}

/// A node in a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone)]
pub struct Instance {
    /// Identifier of the specification this node was built from.
    /// Join nodes carry their program's identifier.
    pub(crate) specification: Arc<str>,
    pub(crate) parent: Option<InstanceId>,
    /// Role name inside the parent program
    pub(crate) role: Option<String>,
    pub(crate) trace: bool,
    pub(crate) kind: NodeKind,
}

impl Instance {
    pub fn specification(&self) -> &str {
        &self.specification
    }

    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_traced(&self) -> bool {
        self.trace
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn interface(&self) -> Option<&Interface> {
        match &self.kind {
            NodeKind::Primitive { interface, .. } | NodeKind::Program { interface, .. } => {
                Some(interface)
            }
            NodeKind::Join { .. } => None,
        }
    }

    pub(crate) fn interface_mut(&mut self) -> Option<&mut Interface> {
        match &mut self.kind {
            NodeKind::Primitive { interface, .. } | NodeKind::Program { interface, .. } => {
                Some(interface)
            }
            NodeKind::Join { .. } => None,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match &self.kind {
            NodeKind::Primitive { primitive, .. } => Some(*primitive),
            _ => None,
        }
    }

    /// Sub-instances by role, empty for anything but a program.
    pub fn bugs(&self) -> Option<&FxHashMap<String, InstanceId>> {
        match &self.kind {
            NodeKind::Program { bugs, .. } => Some(bugs),
            _ => None,
        }
    }

    pub fn bug(&self, role: &str) -> Option<InstanceId> {
        self.bugs()?.get(role).copied()
    }

    /// Roles in lexicographic order.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self
            .bugs()
            .map(|bugs| bugs.keys().map(String::as_str).collect())
            .unwrap_or_default();
        roles.sort_unstable();
        roles
    }

    pub fn control_input(&self) -> Option<ControlInId> {
        match &self.kind {
            NodeKind::Join { control_in, .. } => Some(*control_in),
            _ => self.interface()?.control_input,
        }
    }
}
