//! Batch evaluation of one program over many input vectors.
//!
//! A case sets the root inputs, runs once and records what came out. A
//! failing case is reported, never propagated, so a search loop can score a
//! whole batch even when some candidates diverge.

use crate::error::Error;
use crate::program::Program;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub inputs: Vec<i64>,
    pub output: Option<i64>,
    pub exit_index: Option<usize>,
    pub steps: usize,
    pub error: Option<String>,
    /// Failed on a loop guard (call ceiling or chain depth)
    pub diverged: bool,
}

impl CaseReport {
    fn failed(inputs: &[i64], err: &Error) -> Self {
        let diverged = matches!(err, Error::Exec(exec) if exec.is_divergence());
        Self {
            inputs: inputs.to_vec(),
            output: None,
            exit_index: None,
            steps: 0,
            error: Some(err.to_string()),
            diverged,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs cases against one program in order.
///
/// Registers and call counters carry over from case to case, the same as
/// repeated [`Program::execute`] calls. The trace ledger is cleared before
/// every case, so a traced program only holds the entries of the last one.
#[derive(Debug)]
pub struct Driver {
    program: Program,
    reset_counters: bool,
}

impl Driver {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            reset_counters: false,
        }
    }

    /// Clear call counters before each case, so one long case cannot exhaust
    /// the ceiling for the ones after it.
    pub fn reset_counters_between_cases(mut self, reset: bool) -> Self {
        self.reset_counters = reset;
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    pub fn run_case(&mut self, inputs: &[i64]) -> CaseReport {
        match self.try_case(inputs) {
            Ok(report) => report,
            Err(err) => {
                log::debug!("case {inputs:?} failed: {err}");
                CaseReport::failed(inputs, &err)
            }
        }
    }

    fn try_case(&mut self, inputs: &[i64]) -> Result<CaseReport, Error> {
        self.program.clear_trace();
        if self.reset_counters {
            self.program.reset_call_counters();
        }
        for (index, value) in inputs.iter().enumerate() {
            self.program.set_input_value(index, *value)?;
        }
        let step = self.program.step()?;
        Ok(CaseReport {
            inputs: inputs.to_vec(),
            output: step.output,
            exit_index: step.exit.exit_index,
            steps: step.exit.steps,
            error: None,
            diverged: false,
        })
    }

    pub fn run_cases(&mut self, cases: &[Vec<i64>]) -> Vec<CaseReport> {
        cases.iter().map(|inputs| self.run_case(inputs)).collect()
    }
}

/// Sum `score` over successful cases; every failed case contributes
/// `penalty` instead.
pub fn reward(cases: &[CaseReport], penalty: f64, score: impl Fn(&CaseReport) -> f64) -> f64 {
    cases
        .iter()
        .map(|case| if case.is_ok() { score(case) } else { penalty })
        .sum()
}
