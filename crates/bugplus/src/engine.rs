//! Token-passing interpreter.
//!
//! Control is handed from node to node along control edges. Each step
//! fires one node and yields the control output it chose; the loop then
//! continues at that pin's target. A control output without a target ends
//! the run.
//!
//! The loop is a trampoline instead of native recursion, so an unbounded
//! chain surfaces as [`ExecError::StackExhausted`] after
//! `max_chain_depth` steps rather than overflowing the thread's stack.

use crate::config::EngineConfig;
use crate::error::ExecError;
use crate::graph::Graph;
use crate::handle::{ControlInId, ControlOutId, InstanceId};
use crate::node::NodeKind;
use crate::primitive::{PinReading, PrimitiveFault};
use crate::trace::{TraceKind, TraceLedger};
use smallvec::SmallVec;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// The control output without a target that was reached
    pub control_out: ControlOutId,
    /// Position of `control_out` among the root's external control outputs
    pub exit_index: Option<usize>,
    /// Nodes fired, join nodes included
    pub steps: usize,
}

pub(crate) struct Run<'a> {
    pub graph: &'a mut Graph,
    pub config: &'a EngineConfig,
    pub ledger: &'a mut TraceLedger,
    /// Ordinal of this run, recorded in trace entries
    pub run: u64,
}

impl Run<'_> {
    pub fn execute(&mut self, root: InstanceId, entry: ControlInId) -> Result<Exit, ExecError> {
        let limit = self.config.max_chain_depth;
        let mut current = entry;
        let mut steps = 0;

        loop {
            if steps >= limit {
                log::warn!("run {} aborted after {} steps", self.run, steps);
                return Err(ExecError::StackExhausted { depth: limit });
            }
            steps += 1;

            let node = self.graph.control_in_pin(current).node();
            let fired = self.fire(node)?;

            match self.graph.control_out_pin(fired).target() {
                Some(next) => current = next,
                None => {
                    let exit_index = self
                        .graph
                        .interface(root)
                        .and_then(|iface| iface.control_outputs().iter().position(|o| *o == fired));
                    log::debug!(
                        "run {} finished after {} steps at {:?} (exit {:?})",
                        self.run,
                        steps,
                        fired,
                        exit_index
                    );
                    return Ok(Exit {
                        control_out: fired,
                        exit_index,
                        steps,
                    });
                }
            }
        }
    }

    /// Run one node's behaviour and return the control output it fires.
    fn fire(&mut self, node: InstanceId) -> Result<ControlOutId, ExecError> {
        let instance = self
            .graph
            .instance(node)
            .ok_or(ExecError::NotExecutable(node))?;

        let (primitive, interface) = match &instance.kind {
            NodeKind::Join { control_out, .. } => return Ok(*control_out),
            NodeKind::Program { .. } => return Err(ExecError::NotExecutable(node)),
            NodeKind::Primitive {
                primitive,
                interface,
            } => (*primitive, interface),
        };
        let traced = instance.trace;
        let specification = instance.specification.clone();
        let data_output = interface.data_output;
        let inputs: SmallVec<[PinReading; 2]> = interface
            .data_inputs
            .iter()
            .map(|pin| self.graph.reading(*pin))
            .collect();

        if traced {
            let values: SmallVec<[i64; 2]> = inputs.iter().map(|r| r.value).collect();
            log::info!(
                "request: {}({})",
                specification,
                values
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.ledger.record(
                self.run,
                node,
                TraceKind::Request {
                    specification,
                    inputs: values,
                },
            );
        }

        let evaluation = primitive.evaluate(&inputs).map_err(|fault| match fault {
            PrimitiveFault::InvalidBit(value) => ExecError::InvalidBit { node, value },
        })?;

        if let Some(register) = evaluation.register {
            let limit = self.config.call_limit;
            let interface = self
                .graph
                .interface_mut(node)
                .ok_or(ExecError::NotExecutable(node))?;
            interface.register = register;
            interface.call_counter = interface.call_counter.saturating_add(1);
            if interface.call_counter >= limit {
                return Err(ExecError::CallLimit { node, limit });
            }
        }

        self.graph.write_output(data_output, evaluation.output);

        if traced {
            self.ledger.record(
                self.run,
                node,
                TraceKind::Emit {
                    output: evaluation.output,
                    control_out: evaluation.control_out,
                },
            );
        }

        self.graph
            .interface(node)
            .and_then(|iface| iface.control_outputs().get(evaluation.control_out).copied())
            .ok_or(ExecError::NotExecutable(node))
    }
}
