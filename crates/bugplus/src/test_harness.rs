//! Assertion helpers for driving programs in tests.
//!
//! Every helper panics with a message naming the program and what was
//! expected, so a failing assertion reads without a debugger.

use crate::error::ExecError;
use crate::handle::InstanceId;
use crate::library::Library;
use crate::program::{Program, Step};

pub struct TestProgram {
    program: Program,
}

impl TestProgram {
    /// Instantiate `identifier`, panicking if the library cannot build it.
    pub fn new(library: &Library, identifier: &str) -> Self {
        match library.instantiate(identifier) {
            Ok(program) => Self { program },
            Err(err) => panic!("cannot instantiate `{identifier}`: {err}"),
        }
    }

    /// Same as [`TestProgram::new`] with every node traced.
    pub fn debug(library: &Library, identifier: &str) -> Self {
        match library.instantiate_debug(identifier) {
            Ok(program) => Self { program },
            Err(err) => panic!("cannot instantiate `{identifier}`: {err}"),
        }
    }

    pub fn from_program(program: Program) -> Self {
        Self { program }
    }

    /// Set the root inputs from index 0 onward.
    pub fn with_inputs(&mut self, inputs: &[i64]) -> &mut Self {
        for (index, value) in inputs.iter().enumerate() {
            if let Err(err) = self.program.set_input_value(index, *value) {
                panic!("`{}`: {err}", self.program.specification());
            }
        }
        self
    }

    pub fn run(&mut self) -> Step {
        match self.program.step() {
            Ok(step) => step,
            Err(err) => panic!("`{}` failed: {err}", self.program.specification()),
        }
    }

    /// Run and expect a failure.
    pub fn run_err(&mut self) -> ExecError {
        match self.program.step() {
            Ok(step) => panic!(
                "`{}` expected to fail but ended at {:?}",
                self.program.specification(),
                step.exit
            ),
            Err(err) => err,
        }
    }

    /// Run and check the root output.
    pub fn assert_output(&mut self, expected: i64) -> Step {
        let step = self.run();
        assert_eq!(
            step.output,
            Some(expected),
            "`{}` expected output {} but got {:?}",
            self.program.specification(),
            expected,
            step.output
        );
        step
    }

    /// Run and check which external control output was reached.
    pub fn assert_exit(&mut self, expected: usize) -> Step {
        let step = self.run();
        assert_eq!(
            step.exit.exit_index,
            Some(expected),
            "`{}` expected exit {} but got {:?}",
            self.program.specification(),
            expected,
            step.exit.exit_index
        );
        step
    }

    pub fn assert_register(&self, path: &str, expected: i64) {
        let node = self.node(path);
        let actual = match self.program.internal_state(node) {
            Ok(value) => value,
            Err(err) => panic!("`{path}`: {err}"),
        };
        assert_eq!(
            actual, expected,
            "Register '{}' expected {} but got {}",
            path, expected, actual
        );
    }

    /// Assert the template replayed without skipped directives.
    pub fn assert_clean(&self) {
        assert!(
            self.program.issues().is_empty(),
            "`{}` replayed with issues: {:?}",
            self.program.specification(),
            self.program.issues()
        );
    }

    pub fn node(&self, path: &str) -> InstanceId {
        match self.program.bug(path) {
            Some(node) => node,
            None => panic!("`{}` has no bug at '{path}'", self.program.specification()),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::arithmetic_library;

    #[test]
    fn harness_drives_increment() {
        let library = arithmetic_library();
        let mut test = TestProgram::new(&library, "++");
        test.assert_clean();
        test.with_inputs(&[4]).assert_output(5);
        test.with_inputs(&[-1]).assert_exit(0);
    }

    #[test]
    #[should_panic(expected = "expected output 3")]
    fn wrong_output_panics() {
        let library = arithmetic_library();
        TestProgram::new(&library, ":=").with_inputs(&[2]).assert_output(3);
    }
}
