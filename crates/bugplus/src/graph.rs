//! Arena-backed object graph of one instantiated program.
//!
//! Every pin, variable and node of a program lives here and is addressed by
//! handle. Variables are the only records that get released, so they sit in
//! a generational [`Arena`]. Everything else is append-only.
//!
//! Data pins that are transitively connected always share one variable.
//! `connect` unions two pin classes by re-pointing the absorbed variable's
//! readers and writers at the surviving one.

use crate::arena::Arena;
use crate::handle::{ControlInId, ControlOutId, DataInId, DataOutId, InstanceId, VariableId};
use crate::interface::Interface;
use crate::node::{Instance, NodeKind};
use crate::pin::{ControlInPin, ControlOutPin, DataInPin, DataOutPin};
use crate::primitive::{PinReading, Primitive};
use crate::variable::Variable;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct Graph {
    variables: Arena<Variable>,
    data_ins: Vec<DataInPin>,
    data_outs: Vec<DataOutPin>,
    control_ins: Vec<ControlInPin>,
    control_outs: Vec<ControlOutPin>,
    instances: Vec<Instance>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("instances", &self.instances.len())
            .field("variables", &self.variables.len())
            .field("data_pins", &(self.data_ins.len() + self.data_outs.len()))
            .field("control_pins", &(self.control_ins.len() + self.control_outs.len()))
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ----------------------------------------------------------------------
    // Lookup
    // ----------------------------------------------------------------------

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.index())
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id.index())
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(index, instance)| (InstanceId(index as u32), instance))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn interface(&self, id: InstanceId) -> Option<&Interface> {
        self.instance(id)?.interface()
    }

    pub(crate) fn interface_mut(&mut self, id: InstanceId) -> Option<&mut Interface> {
        self.instance_mut(id)?.interface_mut()
    }

    pub(crate) fn interfaces_mut(&mut self) -> impl Iterator<Item = &mut Interface> {
        self.instances.iter_mut().filter_map(Instance::interface_mut)
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    /// Number of live variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn contains_data_in(&self, pin: DataInId) -> bool {
        pin.index() < self.data_ins.len()
    }

    pub fn contains_data_out(&self, pin: DataOutId) -> bool {
        pin.index() < self.data_outs.len()
    }

    pub fn contains_control_in(&self, pin: ControlInId) -> bool {
        pin.index() < self.control_ins.len()
    }

    pub fn contains_control_out(&self, pin: ControlOutId) -> bool {
        pin.index() < self.control_outs.len()
    }

    pub fn data_in(&self, pin: DataInId) -> Option<&DataInPin> {
        self.data_ins.get(pin.index())
    }

    pub fn data_out(&self, pin: DataOutId) -> Option<&DataOutPin> {
        self.data_outs.get(pin.index())
    }

    pub fn control_in(&self, pin: ControlInId) -> Option<&ControlInPin> {
        self.control_ins.get(pin.index())
    }

    pub fn control_out(&self, pin: ControlOutId) -> Option<&ControlOutPin> {
        self.control_outs.get(pin.index())
    }

    // Unchecked lookups for handles this graph minted itself. Panic on a
    // foreign handle.

    pub(crate) fn data_in_pin(&self, pin: DataInId) -> &DataInPin {
        &self.data_ins[pin.index()]
    }

    pub(crate) fn data_out_pin(&self, pin: DataOutId) -> &DataOutPin {
        &self.data_outs[pin.index()]
    }

    pub(crate) fn control_in_pin(&self, pin: ControlInId) -> &ControlInPin {
        &self.control_ins[pin.index()]
    }

    pub(crate) fn control_out_pin(&self, pin: ControlOutId) -> &ControlOutPin {
        &self.control_outs[pin.index()]
    }

    /// Current value seen through a data input, if it has a variable.
    pub fn input_value(&self, pin: DataInId) -> Option<i64> {
        let var = self.data_in(pin)?.variable?;
        self.variable(var).map(Variable::value)
    }

    pub fn output_value(&self, pin: DataOutId) -> Option<i64> {
        let var = self.data_out(pin)?.variable?;
        self.variable(var).map(Variable::value)
    }

    pub(crate) fn reading(&self, pin: DataInId) -> PinReading {
        let record = self.data_in_pin(pin);
        PinReading {
            connected: record.connected,
            value: self.input_value(pin).unwrap_or(0),
        }
    }

    // ----------------------------------------------------------------------
    // Construction
    // ----------------------------------------------------------------------

    fn next_instance_id(&self) -> InstanceId {
        InstanceId(self.instances.len() as u32)
    }

    fn alloc_variable(&mut self, value: i64) -> VariableId {
        VariableId(self.variables.alloc(Variable::new(value)))
    }

    fn new_data_in(&mut self, owner: InstanceId) -> DataInId {
        let id = DataInId(self.data_ins.len() as u32);
        self.data_ins.push(DataInPin::new(owner));
        id
    }

    fn new_data_out(&mut self, owner: InstanceId) -> DataOutId {
        let id = DataOutId(self.data_outs.len() as u32);
        self.data_outs.push(DataOutPin::new(owner));
        id
    }

    fn new_control_in(&mut self, node: InstanceId) -> ControlInId {
        let id = ControlInId(self.control_ins.len() as u32);
        self.control_ins.push(ControlInPin { node });
        id
    }

    fn new_control_out(&mut self, owner: InstanceId) -> ControlOutId {
        let id = ControlOutId(self.control_outs.len() as u32);
        self.control_outs.push(ControlOutPin {
            owner,
            target: None,
        });
        id
    }

    fn attach_reader(&mut self, pin: DataInId, var: VariableId) {
        if let Some(cell) = self.variables.get_mut(var.0) {
            cell.add_reader(pin);
        }
        self.data_ins[pin.index()].variable = Some(var);
    }

    fn attach_writer(&mut self, pin: DataOutId, var: VariableId) {
        if let Some(cell) = self.variables.get_mut(var.0) {
            cell.add_writer(pin);
        }
        self.data_outs[pin.index()].variable = Some(var);
    }

    fn ensure_input_variable(&mut self, pin: DataInId) -> VariableId {
        match self.data_in_pin(pin).variable {
            Some(var) => var,
            None => {
                let var = self.alloc_variable(0);
                self.attach_reader(pin, var);
                var
            }
        }
    }

    fn ensure_output_variable(&mut self, pin: DataOutId) -> VariableId {
        match self.data_out_pin(pin).variable {
            Some(var) => var,
            None => {
                let var = self.alloc_variable(0);
                self.attach_writer(pin, var);
                var
            }
        }
    }

    /// Primitive node: every input owns a fresh variable, the output owns a
    /// fresh variable and counts as connected.
    pub(crate) fn add_primitive(
        &mut self,
        primitive: Primitive,
        specification: Arc<str>,
        trace: bool,
    ) -> InstanceId {
        let id = self.next_instance_id();
        let register = 0;

        let data_inputs = (0..primitive.num_data_in())
            .map(|_| {
                let pin = self.new_data_in(id);
                let var = self.alloc_variable(primitive.initial_input_value(register));
                self.attach_reader(pin, var);
                pin
            })
            .collect();

        let data_output = self.new_data_out(id);
        let var = self.alloc_variable(0);
        self.attach_writer(data_output, var);
        self.data_outs[data_output.index()].connected = true;

        let control_input = self.new_control_in(id);
        let control_outputs = (0..primitive.num_control_out())
            .map(|_| self.new_control_out(id))
            .collect();

        self.instances.push(Instance {
            specification,
            parent: None,
            role: None,
            trace,
            kind: NodeKind::Primitive {
                primitive,
                interface: Interface {
                    data_inputs,
                    data_output,
                    control_input: Some(control_input),
                    control_outputs,
                    return_nodes: Vec::new(),
                    register,
                    call_counter: 0,
                },
            },
        });
        id
    }

    /// Program node plus one join node per external control output.
    ///
    /// Data inputs start without a variable. The data output owns one but is
    /// only marked connected once an internal output is exposed through it.
    pub(crate) fn add_program(
        &mut self,
        specification: Arc<str>,
        num_data_in: usize,
        num_control_out: usize,
        trace: bool,
    ) -> InstanceId {
        let id = self.next_instance_id();

        let data_inputs = (0..num_data_in).map(|_| self.new_data_in(id)).collect();
        let data_output = self.new_data_out(id);
        let var = self.alloc_variable(0);
        self.attach_writer(data_output, var);
        let control_outputs: Vec<ControlOutId> =
            (0..num_control_out).map(|_| self.new_control_out(id)).collect();

        self.instances.push(Instance {
            specification: specification.clone(),
            parent: None,
            role: None,
            trace,
            kind: NodeKind::Program {
                interface: Interface {
                    data_inputs,
                    data_output,
                    control_input: None,
                    control_outputs: control_outputs.clone(),
                    return_nodes: Vec::new(),
                    register: 0,
                    call_counter: 0,
                },
                bugs: FxHashMap::default(),
            },
        });

        let return_nodes = control_outputs
            .into_iter()
            .map(|control_out| {
                let join = self.next_instance_id();
                let control_in = self.new_control_in(join);
                self.instances.push(Instance {
                    specification: specification.clone(),
                    parent: Some(id),
                    role: None,
                    trace,
                    kind: NodeKind::Join {
                        control_in,
                        control_out,
                    },
                });
                join
            })
            .collect();

        if let Some(interface) = self.interface_mut(id) {
            interface.return_nodes = return_nodes;
        }
        id
    }

    /// Register `child` under `role` in `parent`, returning any displaced node.
    pub(crate) fn adopt(
        &mut self,
        parent: InstanceId,
        role: &str,
        child: InstanceId,
    ) -> Option<InstanceId> {
        if let Some(instance) = self.instance_mut(child) {
            instance.parent = Some(parent);
            instance.role = Some(role.to_string());
        }
        match &mut self.instance_mut(parent)?.kind {
            NodeKind::Program { bugs, .. } => bugs.insert(role.to_string(), child),
            _ => None,
        }
    }

    // ----------------------------------------------------------------------
    // Data wiring
    // ----------------------------------------------------------------------

    /// Wire `output` into `input`, unioning their variable classes.
    pub(crate) fn connect(&mut self, input: DataInId, output: DataOutId) {
        let in_var = self.data_in_pin(input).variable;
        let out_var = self.data_out_pin(output).variable;
        match (in_var, out_var) {
            (Some(a), Some(b)) if a == b => {}
            (Some(absorbed), Some(survivor)) => self.merge(absorbed, survivor),
            (None, Some(var)) => self.attach_reader(input, var),
            // The input's class may already be shared, so the output joins it.
            (Some(var), None) => self.attach_writer(output, var),
            (None, None) => {
                let var = self.alloc_variable(0);
                self.attach_reader(input, var);
                self.attach_writer(output, var);
            }
        }
        self.data_ins[input.index()].connected = true;
    }

    /// Move every reader and writer of `absorbed` onto `survivor` and free
    /// `absorbed`. The survivor keeps its value.
    fn merge(&mut self, absorbed: VariableId, survivor: VariableId) {
        let Some(old) = self.variables.free(absorbed.0) else {
            return;
        };
        log::debug!(
            "merging variable {:?} into {:?} ({} readers, {} writers)",
            absorbed,
            survivor,
            old.readers.len(),
            old.writers.len()
        );
        for reader in &old.readers {
            self.data_ins[reader.index()].variable = Some(survivor);
        }
        for writer in &old.writers {
            self.data_outs[writer.index()].variable = Some(survivor);
        }
        if let Some(cell) = self.variables.get_mut(survivor.0) {
            for reader in old.readers {
                cell.add_reader(reader);
            }
            for writer in old.writers {
                cell.add_writer(writer);
            }
        }
    }

    /// Store `value` and refresh every pin bridged from one of its readers,
    /// through all nesting levels.
    pub(crate) fn set_value(&mut self, var: VariableId, value: i64) {
        let mut pending: SmallVec<[VariableId; 8]> = SmallVec::new();
        let mut seen = FxHashSet::default();
        pending.push(var);

        while let Some(var) = pending.pop() {
            if !seen.insert(var) {
                continue;
            }
            let Some(cell) = self.variables.get_mut(var.0) else {
                continue;
            };
            cell.value = value;
            for reader in &cell.readers {
                for bridged in &self.data_ins[reader.index()].interface_inputs {
                    if let Some(next) = self.data_ins[bridged.index()].variable {
                        pending.push(next);
                    }
                }
            }
        }
    }

    /// Write through a data input, creating its variable if absent.
    pub(crate) fn write_input(&mut self, pin: DataInId, value: i64) {
        let var = match self.data_in_pin(pin).variable {
            Some(var) => var,
            None => {
                let var = self.alloc_variable(value);
                self.attach_reader(pin, var);
                var
            }
        };
        self.set_value(var, value);
    }

    /// Write a primitive's result and push it outward through every
    /// enclosing program's data output.
    pub(crate) fn write_output(&mut self, pin: DataOutId, value: i64) {
        let var = self.ensure_output_variable(pin);
        self.set_value(var, value);

        let mut current = pin;
        while let Some(next) = self.data_out_pin(current).interface_output {
            let var = self.ensure_output_variable(next);
            self.set_value(var, value);
            if !self.data_out_pin(next).connected {
                break;
            }
            current = next;
        }
    }

    /// Bridge an external program input to an internal sub-node input.
    pub(crate) fn expose_data_in(&mut self, external: DataInId, internal: DataInId) {
        self.ensure_input_variable(internal);
        let bridges = &mut self.data_ins[external.index()].interface_inputs;
        if !bridges.contains(&internal) {
            bridges.push(internal);
        }
        self.data_ins[internal.index()].connected = true;
    }

    /// Route an internal sub-node output to the program's data output.
    pub(crate) fn expose_data_out(&mut self, external: DataOutId, internal: DataOutId) {
        self.ensure_output_variable(external);
        self.data_outs[internal.index()].interface_output = Some(external);
        self.data_outs[external.index()].connected = true;
    }

    /// Drop the input's variable reference. The `connected` flag stays set.
    pub(crate) fn disconnect_input(&mut self, pin: DataInId) {
        let Some(var) = self.data_ins[pin.index()].variable.take() else {
            return;
        };
        if let Some(cell) = self.variables.get_mut(var.0) {
            cell.remove_reader(pin);
            if cell.is_orphan() {
                self.variables.free(var.0);
            }
        }
    }

    pub(crate) fn disconnect_output(&mut self, pin: DataOutId) {
        let Some(var) = self.data_outs[pin.index()].variable.take() else {
            return;
        };
        if let Some(cell) = self.variables.get_mut(var.0) {
            cell.remove_writer(pin);
            if cell.is_orphan() {
                self.variables.free(var.0);
            }
        }
    }

    // ----------------------------------------------------------------------
    // Control wiring
    // ----------------------------------------------------------------------

    pub(crate) fn set_flow_target(&mut self, out: ControlOutId, target: ControlInId) {
        self.control_outs[out.index()].target = Some(target);
    }

    pub(crate) fn unset_flow_target(&mut self, out: ControlOutId) {
        self.control_outs[out.index()].target = None;
    }

    pub(crate) fn set_control_input(&mut self, program: InstanceId, control_in: ControlInId) {
        if let Some(interface) = self.interface_mut(program) {
            interface.control_input = Some(control_in);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adder(graph: &mut Graph) -> InstanceId {
        graph.add_primitive(Primitive::Adder, Arc::from("+"), false)
    }

    fn pins(graph: &Graph, id: InstanceId) -> (Vec<DataInId>, DataOutId) {
        let interface = graph.interface(id).unwrap();
        (interface.data_inputs().to_vec(), interface.data_output())
    }

    #[test]
    fn primitive_pins_start_with_own_variables() {
        let mut graph = Graph::new();
        let node = adder(&mut graph);
        let (inputs, output) = pins(&graph, node);

        assert_eq!(graph.variable_count(), 3);
        assert!(!graph.data_in_pin(inputs[0]).is_connected());
        assert!(graph.data_out_pin(output).is_connected());
        assert_ne!(graph.data_in_pin(inputs[0]).variable(), graph.data_in_pin(inputs[1]).variable());
    }

    #[test]
    fn connect_merges_existing_classes() {
        let mut graph = Graph::new();
        let a = adder(&mut graph);
        let b = adder(&mut graph);
        let (_, a_out) = pins(&graph, a);
        let (b_in, b_out) = pins(&graph, b);

        graph.connect(b_in[0], a_out);
        // b.in0 already shares a.out's cell, which now gets absorbed whole
        graph.connect(b_in[0], b_out);

        let shared = graph.data_out_pin(b_out).variable();
        assert_eq!(graph.data_in_pin(b_in[0]).variable(), shared);
        assert_eq!(graph.data_out_pin(a_out).variable(), shared);

        let cell = graph.variable(shared.unwrap()).unwrap();
        assert_eq!(cell.readers().len(), 1);
        assert_eq!(cell.writers().len(), 2);
        // 6 initial cells, two merged away
        assert_eq!(graph.variable_count(), 4);
    }

    #[test]
    fn merged_cell_keeps_output_value() {
        let mut graph = Graph::new();
        let a = adder(&mut graph);
        let b = adder(&mut graph);
        let (_, a_out) = pins(&graph, a);
        let (b_in, _) = pins(&graph, b);

        graph.write_input(b_in[0], 9);
        graph.write_output(a_out, 4);
        graph.connect(b_in[0], a_out);

        assert_eq!(graph.input_value(b_in[0]), Some(4));
        assert!(graph.data_in_pin(b_in[0]).is_connected());
    }

    #[test]
    fn set_value_reaches_bridged_pins() {
        let mut graph = Graph::new();
        let outer = graph.add_program(Arc::from("p"), 1, 0, false);
        let inner = adder(&mut graph);
        let external = graph.interface(outer).unwrap().data_inputs()[0];
        let (inner_in, _) = pins(&graph, inner);

        graph.expose_data_in(external, inner_in[1]);
        graph.write_input(external, 12);

        assert_eq!(graph.input_value(inner_in[1]), Some(12));
        assert!(graph.data_in_pin(inner_in[1]).is_connected());
    }

    #[test]
    fn output_pushes_through_nested_programs() {
        let mut graph = Graph::new();
        let outer = graph.add_program(Arc::from("outer"), 0, 0, false);
        let middle = graph.add_program(Arc::from("middle"), 0, 0, false);
        let leaf = adder(&mut graph);
        let outer_out = graph.interface(outer).unwrap().data_output();
        let middle_out = graph.interface(middle).unwrap().data_output();
        let (_, leaf_out) = pins(&graph, leaf);

        graph.expose_data_out(middle_out, leaf_out);
        graph.expose_data_out(outer_out, middle_out);
        graph.write_output(leaf_out, 7);

        assert_eq!(graph.output_value(middle_out), Some(7));
        assert_eq!(graph.output_value(outer_out), Some(7));
    }

    #[test]
    fn disconnect_releases_orphaned_variable() {
        let mut graph = Graph::new();
        let node = adder(&mut graph);
        let (inputs, _) = pins(&graph, node);
        let before = graph.variable_count();

        graph.disconnect_input(inputs[0]);

        assert_eq!(graph.variable_count(), before - 1);
        assert_eq!(graph.input_value(inputs[0]), None);
    }

    #[test]
    fn program_has_one_join_per_control_out() {
        let mut graph = Graph::new();
        let program = graph.add_program(Arc::from("p"), 2, 3, false);
        let interface = graph.interface(program).unwrap();

        assert_eq!(interface.num_data_in(), 2);
        assert_eq!(interface.return_nodes().len(), 3);
        assert!(interface.control_input().is_none());
        assert!(!graph.data_out_pin(interface.data_output()).is_connected());
        for (join, out) in interface.return_nodes().iter().zip(interface.control_outputs()) {
            match graph.instance(*join).unwrap().kind() {
                NodeKind::Join { control_out, .. } => assert_eq!(control_out, out),
                other => panic!("expected join, got {other:?}"),
            }
        }
    }
}
