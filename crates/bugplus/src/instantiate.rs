//! Statement replay: turns a shared template into a fresh graph.
//!
//! Directives are applied phase by phase (see [`Phase`](crate::statement::Phase)).
//! Sub-nodes are built depth first, so by the time a program wires its
//! edges every child already has its own interface fully exposed.
//!
//! A directive that names an unknown role or specification, or a pin index
//! outside the declared arity, is skipped and recorded as a [`BuildIssue`].
//! Only an unresolvable root or runaway nesting aborts the whole build.

use crate::error::{BuildIssue, InstantiateError, PinKind};
use crate::graph::Graph;
use crate::handle::{ControlOutId, DataInId, InstanceId};
use crate::library::Library;
use crate::specification::{Implementation, Specification};
use crate::statement::{replay_order, Statement};
use std::sync::Arc;

pub(crate) struct Replay<'a> {
    library: &'a Library,
    graph: &'a mut Graph,
    max_depth: usize,
    trace: bool,
    issues: Vec<BuildIssue>,
}

impl<'a> Replay<'a> {
    pub fn new(library: &'a Library, graph: &'a mut Graph, max_depth: usize, trace: bool) -> Self {
        Self {
            library,
            graph,
            max_depth,
            trace,
            issues: Vec::new(),
        }
    }

    pub fn into_issues(self) -> Vec<BuildIssue> {
        self.issues
    }

    pub fn instantiate(
        &mut self,
        spec: &'a Specification,
        implementation: usize,
        depth: usize,
    ) -> Result<InstanceId, InstantiateError> {
        if depth > self.max_depth {
            return Err(InstantiateError::NestingTooDeep {
                specification: spec.identifier().to_string(),
                limit: self.max_depth,
            });
        }

        match spec.implementation(implementation)? {
            Implementation::Primitive(primitive) => {
                Ok(self
                    .graph
                    .add_primitive(*primitive, spec.identifier_arc(), self.trace))
            }
            Implementation::Program(program) => {
                let name = spec.identifier_arc();
                let id = self.graph.add_program(
                    name.clone(),
                    spec.num_data_in(),
                    spec.num_control_out(),
                    self.trace,
                );
                for statement in replay_order(program.statements()) {
                    self.apply(id, &name, statement, depth)?;
                }
                Ok(id)
            }
        }
    }

    fn apply(
        &mut self,
        program: InstanceId,
        name: &Arc<str>,
        statement: &Statement,
        depth: usize,
    ) -> Result<(), InstantiateError> {
        match statement {
            Statement::NewBug {
                specification,
                role,
            } => {
                let library = self.library;
                let Some(spec) = library.get(specification) else {
                    self.issue(BuildIssue::UnknownSpecification {
                        program: name.clone(),
                        role: role.clone(),
                        specification: specification.clone(),
                    });
                    return Ok(());
                };
                if spec.implementations().is_empty() {
                    self.issue(BuildIssue::MissingImplementation {
                        program: name.clone(),
                        role: role.clone(),
                        specification: specification.clone(),
                    });
                    return Ok(());
                }
                let child = self.instantiate(spec, 0, depth + 1)?;
                if self.graph.adopt(program, role, child).is_some() {
                    self.issue(BuildIssue::DuplicateRole {
                        program: name.clone(),
                        role: role.clone(),
                    });
                }
            }
            Statement::DataFlow {
                source,
                target,
                input,
            } => {
                let (Some(src), Some(dst)) = (
                    self.role(program, name, source),
                    self.role(program, name, target),
                ) else {
                    return Ok(());
                };
                let Some(output) = self.graph.interface(src).map(|i| i.data_output()) else {
                    return Ok(());
                };
                if let Some(pin) = self.data_input(name, target, dst, *input) {
                    self.graph.connect(pin, output);
                }
            }
            Statement::ControlFlow {
                source,
                output,
                target,
            } => {
                let (Some(src), Some(dst)) = (
                    self.role(program, name, source),
                    self.role(program, name, target),
                ) else {
                    return Ok(());
                };
                let Some(out) = self.control_output(name, source, src, *output) else {
                    return Ok(());
                };
                match self.graph.instance(dst).and_then(|i| i.control_input()) {
                    Some(control_in) => self.graph.set_flow_target(out, control_in),
                    None => self.issue(BuildIssue::NoControlInput {
                        program: name.clone(),
                        role: target.clone(),
                    }),
                }
            }
            Statement::ExposeDataIn {
                role,
                input,
                external,
            } => {
                let Some(bug) = self.role(program, name, role) else {
                    return Ok(());
                };
                let Some(internal) = self.data_input(name, role, bug, *input) else {
                    return Ok(());
                };
                let externals = self
                    .graph
                    .interface(program)
                    .map(|i| i.data_inputs().to_vec())
                    .unwrap_or_default();
                match externals.get(*external) {
                    Some(pin) => self.graph.expose_data_in(*pin, internal),
                    None => self.issue(BuildIssue::PinOutOfRange {
                        program: name.clone(),
                        role: None,
                        pin: PinKind::DataIn,
                        index: *external,
                        arity: externals.len(),
                    }),
                }
            }
            Statement::ExposeDataOut { role } => {
                let Some(bug) = self.role(program, name, role) else {
                    return Ok(());
                };
                let external = self.graph.interface(program).map(|i| i.data_output());
                let internal = self.graph.interface(bug).map(|i| i.data_output());
                if let (Some(external), Some(internal)) = (external, internal) {
                    self.graph.expose_data_out(external, internal);
                }
            }
            Statement::ExposeControlOut {
                role,
                output,
                external,
            } => {
                let Some(bug) = self.role(program, name, role) else {
                    return Ok(());
                };
                let Some(out) = self.control_output(name, role, bug, *output) else {
                    return Ok(());
                };
                let returns = self
                    .graph
                    .interface(program)
                    .map(|i| i.return_nodes().to_vec())
                    .unwrap_or_default();
                let join = returns
                    .get(*external)
                    .and_then(|join| self.graph.instance(*join))
                    .and_then(|join| join.control_input());
                match join {
                    Some(control_in) => self.graph.set_flow_target(out, control_in),
                    None => self.issue(BuildIssue::PinOutOfRange {
                        program: name.clone(),
                        role: None,
                        pin: PinKind::ControlOut,
                        index: *external,
                        arity: returns.len(),
                    }),
                }
            }
            Statement::ExposeControlIn { role } => {
                let Some(bug) = self.role(program, name, role) else {
                    return Ok(());
                };
                match self.graph.instance(bug).and_then(|i| i.control_input()) {
                    Some(control_in) => self.graph.set_control_input(program, control_in),
                    None => self.issue(BuildIssue::NoControlInput {
                        program: name.clone(),
                        role: role.clone(),
                    }),
                }
            }
        }
        Ok(())
    }

    fn issue(&mut self, issue: BuildIssue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    fn role(&mut self, program: InstanceId, name: &Arc<str>, role: &str) -> Option<InstanceId> {
        let found = self.graph.instance(program).and_then(|p| p.bug(role));
        if found.is_none() {
            self.issue(BuildIssue::UnknownRole {
                program: name.clone(),
                role: role.to_string(),
            });
        }
        found
    }

    fn data_input(
        &mut self,
        name: &Arc<str>,
        role: &str,
        bug: InstanceId,
        index: usize,
    ) -> Option<DataInId> {
        let inputs = self
            .graph
            .interface(bug)
            .map(|i| i.data_inputs().to_vec())
            .unwrap_or_default();
        let pin = inputs.get(index).copied();
        if pin.is_none() {
            self.issue(BuildIssue::PinOutOfRange {
                program: name.clone(),
                role: Some(role.to_string()),
                pin: PinKind::DataIn,
                index,
                arity: inputs.len(),
            });
        }
        pin
    }

    fn control_output(
        &mut self,
        name: &Arc<str>,
        role: &str,
        bug: InstanceId,
        index: usize,
    ) -> Option<ControlOutId> {
        let outputs = self
            .graph
            .interface(bug)
            .map(|i| i.control_outputs().to_vec())
            .unwrap_or_default();
        let pin = outputs.get(index).copied();
        if pin.is_none() {
            self.issue(BuildIssue::PinOutOfRange {
                program: name.clone(),
                role: Some(role.to_string()),
                pin: PinKind::ControlOut,
                index,
                arity: outputs.len(),
            });
        }
        pin
    }
}
