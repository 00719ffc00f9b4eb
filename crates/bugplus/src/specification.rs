//! Node types and their implementations.

use crate::error::LibraryError;
use crate::primitive::Primitive;
use crate::statement::Statement;
use std::sync::Arc;

/// A named node type with fixed arity.
#[derive(Debug, Clone)]
pub struct Specification {
    identifier: Arc<str>,
    num_data_in: usize,
    num_control_out: usize,
    implementations: Vec<Implementation>,
}

#[derive(Debug, Clone)]
pub enum Implementation {
    Primitive(Primitive),
    Program(ProgramImplementation),
}

impl Specification {
    /// Native specification with its single implementation.
    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            identifier: Arc::from(primitive.identifier()),
            num_data_in: primitive.num_data_in(),
            num_control_out: primitive.num_control_out(),
            implementations: vec![Implementation::Primitive(primitive)],
        }
    }

    /// Program specification without implementations yet.
    pub fn program(identifier: impl Into<Arc<str>>, num_data_in: usize, num_control_out: usize) -> Self {
        Self {
            identifier: identifier.into(),
            num_data_in,
            num_control_out,
            implementations: Vec::new(),
        }
    }

    /// Program specification with one finished implementation.
    pub fn composite(
        identifier: impl Into<Arc<str>>,
        num_data_in: usize,
        num_control_out: usize,
        implementation: ProgramImplementation,
    ) -> Self {
        Self {
            implementations: vec![Implementation::Program(implementation)],
            ..Self::program(identifier, num_data_in, num_control_out)
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn identifier_arc(&self) -> Arc<str> {
        self.identifier.clone()
    }

    pub fn num_data_in(&self) -> usize {
        self.num_data_in
    }

    pub fn num_control_out(&self) -> usize {
        self.num_control_out
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.implementations.first(), Some(Implementation::Primitive(_)))
    }

    pub fn implementations(&self) -> &[Implementation] {
        &self.implementations
    }

    /// Append an empty program implementation and return it for building.
    pub fn add_implementation(&mut self) -> Result<&mut ProgramImplementation, LibraryError> {
        if self.is_primitive() {
            log::warn!("cannot add a program implementation to native `{}`", self.identifier);
            return Err(LibraryError::NativeSpecification(self.identifier.to_string()));
        }
        self.implementations
            .push(Implementation::Program(ProgramImplementation::default()));
        match self.implementations.last_mut() {
            Some(Implementation::Program(program)) => Ok(program),
            _ => Err(LibraryError::NativeSpecification(self.identifier.to_string())),
        }
    }

    pub fn implementation(&self, index: usize) -> Result<&Implementation, LibraryError> {
        self.implementations.get(index).ok_or_else(|| {
            log::warn!(
                "`{}` has no implementation {} ({} available)",
                self.identifier,
                index,
                self.implementations.len()
            );
            self.out_of_range(index)
        })
    }

    pub fn implementation_mut(&mut self, index: usize) -> Result<&mut Implementation, LibraryError> {
        let err = self.out_of_range(index);
        self.implementations.get_mut(index).ok_or(err)
    }

    /// The program implementation at `index`, for further building.
    pub fn program_mut(&mut self, index: usize) -> Result<&mut ProgramImplementation, LibraryError> {
        let identifier = self.identifier.to_string();
        match self.implementation_mut(index)? {
            Implementation::Program(program) => Ok(program),
            Implementation::Primitive(_) => Err(LibraryError::NativeSpecification(identifier)),
        }
    }

    fn out_of_range(&self, index: usize) -> LibraryError {
        LibraryError::ImplementationOutOfRange {
            specification: self.identifier.to_string(),
            index,
            available: self.implementations.len(),
        }
    }
}

/// Recorded construction log of a composite node.
///
/// Builder calls only record; nothing is validated until an instantiation
/// replays the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramImplementation {
    statements: Vec<Statement>,
}

impl ProgramImplementation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn add_bug(&mut self, specification: &str, role: &str) -> &mut Self {
        self.push(Statement::NewBug {
            specification: specification.to_string(),
            role: role.to_string(),
        })
    }

    pub fn add_data_flow(&mut self, source: &str, target: &str, input: usize) -> &mut Self {
        self.push(Statement::DataFlow {
            source: source.to_string(),
            target: target.to_string(),
            input,
        })
    }

    pub fn add_control_flow(&mut self, source: &str, output: usize, target: &str) -> &mut Self {
        self.push(Statement::ControlFlow {
            source: source.to_string(),
            output,
            target: target.to_string(),
        })
    }

    pub fn connect_data_in_interface(&mut self, role: &str, input: usize, external: usize) -> &mut Self {
        self.push(Statement::ExposeDataIn {
            role: role.to_string(),
            input,
            external,
        })
    }

    pub fn connect_data_out_interface(&mut self, role: &str) -> &mut Self {
        self.push(Statement::ExposeDataOut {
            role: role.to_string(),
        })
    }

    pub fn connect_control_in_interface(&mut self, role: &str) -> &mut Self {
        self.push(Statement::ExposeControlIn {
            role: role.to_string(),
        })
    }

    pub fn connect_control_out_interface(
        &mut self,
        role: &str,
        output: usize,
        external: usize,
    ) -> &mut Self {
        self.push(Statement::ExposeControlOut {
            role: role.to_string(),
            output,
            external,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_specification_is_closed() {
        let mut spec = Specification::primitive(Primitive::Adder);
        assert_eq!(spec.identifier(), "+");
        assert_eq!((spec.num_data_in(), spec.num_control_out()), (2, 2));
        assert!(matches!(
            spec.add_implementation(),
            Err(LibraryError::NativeSpecification(_))
        ));
        assert_eq!(spec.implementations().len(), 1);
    }

    #[test]
    fn builder_records_in_issue_order() {
        let mut spec = Specification::program("inc", 1, 2);
        spec.add_implementation()
            .unwrap()
            .add_bug("+", "a")
            .add_data_flow("a", "b", 1)
            .connect_control_in_interface("a");

        let Implementation::Program(program) = spec.implementation(0).unwrap() else {
            panic!("expected a program implementation");
        };
        assert_eq!(program.statements().len(), 3);
        assert!(matches!(&program.statements()[1], Statement::DataFlow { input: 1, .. }));
    }

    #[test]
    fn implementation_index_is_checked() {
        let spec = Specification::program("p", 0, 1);
        assert_eq!(
            spec.implementation(0).unwrap_err(),
            LibraryError::ImplementationOutOfRange {
                specification: "p".into(),
                index: 0,
                available: 0,
            }
        );
    }
}
