//! An instantiated, runnable program.
//!
//! A `Program` owns its whole graph, so separate instantiations never share
//! variables, registers or call counters. Registers and counters persist
//! across [`Program::execute`] calls until reset explicitly.

use crate::config::EngineConfig;
use crate::engine::{Exit, Run};
use crate::error::{BuildIssue, ExecError, PinError};
use crate::graph::Graph;
use crate::handle::{ControlInId, ControlOutId, DataInId, DataOutId, InstanceId};
use crate::interface::Interface;
use crate::node::NodeKind;
use crate::trace::TraceLedger;

/// Result of [`Program::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub exit: Exit,
    /// Root output value, when the root's data output is connected
    pub output: Option<i64>,
}

#[derive(Debug)]
pub struct Program {
    graph: Graph,
    root: InstanceId,
    data_inputs: Vec<DataInId>,
    data_out: DataOutId,
    control_outs: Vec<ControlOutId>,
    config: EngineConfig,
    trace: TraceLedger,
    issues: Vec<BuildIssue>,
    runs: u64,
}

impl Program {
    pub(crate) fn new(
        graph: Graph,
        root: InstanceId,
        config: EngineConfig,
        issues: Vec<BuildIssue>,
    ) -> Self {
        let (data_inputs, data_out, control_outs) = match graph.interface(root) {
            Some(iface) => (
                iface.data_inputs().to_vec(),
                iface.data_output(),
                iface.control_outputs().to_vec(),
            ),
            None => (Vec::new(), DataOutId(u32::MAX), Vec::new()),
        };
        Self {
            graph,
            root,
            data_inputs,
            data_out,
            control_outs,
            config,
            trace: TraceLedger::new(),
            issues,
            runs: 0,
        }
    }

    pub fn root(&self) -> InstanceId {
        self.root
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn specification(&self) -> &str {
        self.graph
            .instance(self.root)
            .map_or("", |root| root.specification())
    }

    /// Directives skipped while building this program.
    pub fn issues(&self) -> &[BuildIssue] {
        &self.issues
    }

    pub fn trace(&self) -> &TraceLedger {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Number of `execute` calls so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    // ----------------------------------------------------------------------
    // Root interface
    // ----------------------------------------------------------------------

    pub fn control_in(&self) -> Option<ControlInId> {
        self.graph.interface(self.root)?.control_input()
    }

    pub fn control_outs(&self) -> &[ControlOutId] {
        &self.control_outs
    }

    pub fn data_inputs(&self) -> &[DataInId] {
        &self.data_inputs
    }

    pub fn data_out(&self) -> DataOutId {
        self.data_out
    }

    pub fn set_input_value(&mut self, index: usize, value: i64) -> Result<(), PinError> {
        self.set_instance_input(self.root, index, value)
    }

    pub fn output_value(&self) -> Result<i64, PinError> {
        self.instance_output(self.root)
    }

    // ----------------------------------------------------------------------
    // Any instance
    // ----------------------------------------------------------------------

    fn interface_of(&self, node: InstanceId) -> Result<&Interface, PinError> {
        self.graph
            .instance(node)
            .ok_or(PinError::UnknownInstance(node))?
            .interface()
            .ok_or(PinError::NoInterface(node))
    }

    fn interface_of_mut(&mut self, node: InstanceId) -> Result<&mut Interface, PinError> {
        self.graph
            .instance_mut(node)
            .ok_or(PinError::UnknownInstance(node))?
            .interface_mut()
            .ok_or(PinError::NoInterface(node))
    }

    /// Resolve a sub-instance by role path, e.g. `"outer/inner"`.
    pub fn bug(&self, path: &str) -> Option<InstanceId> {
        path.split('/')
            .try_fold(self.root, |node, role| self.graph.instance(node)?.bug(role))
    }

    pub fn set_instance_input(
        &mut self,
        node: InstanceId,
        index: usize,
        value: i64,
    ) -> Result<(), PinError> {
        let inputs = self.interface_of(node)?.data_inputs();
        let Some(pin) = inputs.get(index).copied() else {
            log::warn!("{node}: data input {index} out of range (arity {})", inputs.len());
            return Err(PinError::InputOutOfRange {
                node,
                index,
                arity: inputs.len(),
            });
        };
        self.graph.write_input(pin, value);
        Ok(())
    }

    pub fn instance_output(&self, node: InstanceId) -> Result<i64, PinError> {
        let pin = self.interface_of(node)?.data_output();
        if !self.graph.data_out_pin(pin).is_connected() {
            log::warn!("{node}: data output was never connected");
            return Err(PinError::OutputUnconnected(node));
        }
        self.graph
            .output_value(pin)
            .ok_or(PinError::OutputUnconnected(node))
    }

    pub fn internal_state(&self, node: InstanceId) -> Result<i64, PinError> {
        Ok(self.interface_of(node)?.register())
    }

    /// Set the register and write the same value into the first data input,
    /// so a bit node's next firing reads it.
    pub fn set_internal_state(&mut self, node: InstanceId, value: i64) -> Result<(), PinError> {
        let interface = self.interface_of_mut(node)?;
        let Some(first) = interface.data_inputs.first().copied() else {
            log::warn!("{node}: no data input to hold the internal state");
            return Err(PinError::NoDataInputs(node));
        };
        interface.register = value;
        self.graph.write_input(first, value);
        Ok(())
    }

    pub fn call_counter(&self, node: InstanceId) -> Result<u32, PinError> {
        Ok(self.interface_of(node)?.call_counter())
    }

    pub fn set_call_counter(&mut self, node: InstanceId, count: u32) -> Result<(), PinError> {
        self.interface_of_mut(node)?.call_counter = count;
        Ok(())
    }

    pub fn reset_call_counters(&mut self) {
        for interface in self.graph.interfaces_mut() {
            interface.call_counter = 0;
        }
    }

    /// Register of every primitive, in creation order.
    pub fn registers(&self) -> Vec<(InstanceId, i64)> {
        self.graph
            .instances()
            .filter_map(|(id, instance)| match instance.kind() {
                NodeKind::Primitive { interface, .. } => Some((id, interface.register())),
                _ => None,
            })
            .collect()
    }

    pub fn set_trace(&mut self, node: InstanceId, enabled: bool) -> Result<(), PinError> {
        let instance = self
            .graph
            .instance_mut(node)
            .ok_or(PinError::UnknownInstance(node))?;
        instance.trace = enabled;
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Rewiring
    // ----------------------------------------------------------------------

    /// Wire `output` into `input`, merging their variables.
    pub fn connect(&mut self, input: DataInId, output: DataOutId) -> Result<(), PinError> {
        if !self.graph.contains_data_in(input) || !self.graph.contains_data_out(output) {
            return Err(PinError::UnknownPin);
        }
        self.graph.connect(input, output);
        Ok(())
    }

    pub fn disconnect_input(&mut self, pin: DataInId) -> Result<(), PinError> {
        if !self.graph.contains_data_in(pin) {
            return Err(PinError::UnknownPin);
        }
        self.graph.disconnect_input(pin);
        Ok(())
    }

    pub fn disconnect_output(&mut self, pin: DataOutId) -> Result<(), PinError> {
        if !self.graph.contains_data_out(pin) {
            return Err(PinError::UnknownPin);
        }
        self.graph.disconnect_output(pin);
        Ok(())
    }

    /// Drop the external data pins of a program node. Primitives keep theirs.
    pub fn unset_pins(&mut self, node: InstanceId) -> Result<(), PinError> {
        let instance = self
            .graph
            .instance(node)
            .ok_or(PinError::UnknownInstance(node))?;
        let NodeKind::Program { interface, .. } = instance.kind() else {
            return Ok(());
        };
        let inputs = interface.data_inputs().to_vec();
        let output = interface.data_output();
        for pin in inputs {
            self.graph.disconnect_input(pin);
        }
        self.graph.disconnect_output(output);
        Ok(())
    }

    pub fn set_flow_target(&mut self, out: ControlOutId, target: ControlInId) -> Result<(), PinError> {
        if !self.graph.contains_control_out(out) || !self.graph.contains_control_in(target) {
            return Err(PinError::UnknownPin);
        }
        self.graph.set_flow_target(out, target);
        Ok(())
    }

    pub fn unset_flow_target(&mut self, out: ControlOutId) -> Result<(), PinError> {
        if !self.graph.contains_control_out(out) {
            return Err(PinError::UnknownPin);
        }
        self.graph.unset_flow_target(out);
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Execution
    // ----------------------------------------------------------------------

    /// Invoke the root control input once and run to a terminal control
    /// output.
    pub fn execute(&mut self) -> Result<Exit, ExecError> {
        let entry = self.control_in().ok_or(ExecError::NoControlInput)?;
        self.runs += 1;
        log::debug!("run {} of `{}`", self.runs, self.specification());
        let mut run = Run {
            graph: &mut self.graph,
            config: &self.config,
            ledger: &mut self.trace,
            run: self.runs,
        };
        run.execute(self.root, entry)
    }

    pub fn step(&mut self) -> Result<Step, ExecError> {
        let exit = self.execute()?;
        let output = self
            .interface_of(self.root)
            .ok()
            .map(Interface::data_output)
            .filter(|pin| self.graph.data_out_pin(*pin).is_connected())
            .and_then(|pin| self.graph.output_value(pin));
        Ok(Step { exit, output })
    }
}
