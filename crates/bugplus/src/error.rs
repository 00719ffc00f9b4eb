//! Error types, grouped by the phase that raises them.

use crate::handle::InstanceId;
use std::fmt;
use std::sync::Arc;

/// Registry errors. The registry is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    DuplicateSpecification(String),
    UnknownSpecification(String),
    ImplementationOutOfRange {
        specification: String,
        index: usize,
        available: usize,
    },
    /// `add_implementation` on a primitive specification
    NativeSpecification(String),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::DuplicateSpecification(id) => {
                write!(f, "specification `{id}` already exists in the library")
            }
            LibraryError::UnknownSpecification(id) => {
                write!(f, "specification `{id}` is not in the library")
            }
            LibraryError::ImplementationOutOfRange {
                specification,
                index,
                available,
            } => write!(
                f,
                "specification `{specification}` has {available} implementation(s), index {index} is out of range"
            ),
            LibraryError::NativeSpecification(id) => {
                write!(f, "specification `{id}` is native and cannot take program implementations")
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// Pin access errors on an instantiated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    InputOutOfRange {
        node: InstanceId,
        index: usize,
        arity: usize,
    },
    /// The data output was never wired, or has been disconnected
    OutputUnconnected(InstanceId),
    NoDataInputs(InstanceId),
    /// Join nodes have no interface
    NoInterface(InstanceId),
    UnknownInstance(InstanceId),
    /// A pin handle minted by another graph
    UnknownPin,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::InputOutOfRange { node, index, arity } => write!(
                f,
                "data input {index} of {node} is out of range (arity {arity})"
            ),
            PinError::OutputUnconnected(node) => {
                write!(f, "data output of {node} is not connected")
            }
            PinError::NoDataInputs(node) => write!(f, "{node} has no data inputs"),
            PinError::NoInterface(node) => write!(f, "{node} has no interface"),
            PinError::UnknownInstance(node) => write!(f, "{node} does not belong to this graph"),
            PinError::UnknownPin => f.write_str("pin does not belong to this graph"),
        }
    }
}

impl std::error::Error for PinError {}

/// Fatal instantiation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantiateError {
    Library(LibraryError),
    NestingTooDeep {
        specification: String,
        limit: usize,
    },
}

impl fmt::Display for InstantiateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstantiateError::Library(err) => write!(f, "cannot instantiate: {err}"),
            InstantiateError::NestingTooDeep {
                specification,
                limit,
            } => write!(
                f,
                "instantiating `{specification}` nests programs deeper than {limit} levels"
            ),
        }
    }
}

impl std::error::Error for InstantiateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstantiateError::Library(err) => Some(err),
            InstantiateError::NestingTooDeep { .. } => None,
        }
    }
}

impl From<LibraryError> for InstantiateError {
    fn from(err: LibraryError) -> Self {
        InstantiateError::Library(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    DataIn,
    ControlOut,
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKind::DataIn => f.write_str("data input"),
            PinKind::ControlOut => f.write_str("control output"),
        }
    }
}

/// A directive that could not be replayed. Only that directive is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildIssue {
    UnknownRole {
        program: Arc<str>,
        role: String,
    },
    UnknownSpecification {
        program: Arc<str>,
        role: String,
        specification: String,
    },
    MissingImplementation {
        program: Arc<str>,
        role: String,
        specification: String,
    },
    /// `role == None` addresses the program's own interface
    PinOutOfRange {
        program: Arc<str>,
        role: Option<String>,
        pin: PinKind,
        index: usize,
        arity: usize,
    },
    /// The later sub-node replaced the earlier one
    DuplicateRole {
        program: Arc<str>,
        role: String,
    },
    /// Control edge or exposure aimed at a program without a control input
    NoControlInput {
        program: Arc<str>,
        role: String,
    },
}

impl fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildIssue::UnknownRole { program, role } => {
                write!(f, "{program}: no sub-node with role `{role}`")
            }
            BuildIssue::UnknownSpecification {
                program,
                role,
                specification,
            } => write!(
                f,
                "{program}: role `{role}` uses unknown specification `{specification}`"
            ),
            BuildIssue::MissingImplementation {
                program,
                role,
                specification,
            } => write!(
                f,
                "{program}: role `{role}` uses `{specification}`, which has no implementation"
            ),
            BuildIssue::PinOutOfRange {
                program,
                role,
                pin,
                index,
                arity,
            } => match role {
                Some(role) => write!(
                    f,
                    "{program}: {pin} {index} of `{role}` is out of range (arity {arity})"
                ),
                None => write!(
                    f,
                    "{program}: external {pin} {index} is out of range (arity {arity})"
                ),
            },
            BuildIssue::DuplicateRole { program, role } => {
                write!(f, "{program}: role `{role}` defined twice, keeping the later one")
            }
            BuildIssue::NoControlInput { program, role } => {
                write!(f, "{program}: `{role}` has no exposed control input")
            }
        }
    }
}

impl std::error::Error for BuildIssue {}

/// Fatal run failures. Graph state is left as mutated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    InvalidBit { node: InstanceId, value: i64 },
    CallLimit { node: InstanceId, limit: u32 },
    /// Control chain longer than the configured depth
    StackExhausted { depth: usize },
    /// The program never exposed a control input
    NoControlInput,
    /// Control reached a node without native behaviour
    NotExecutable(InstanceId),
}

impl ExecError {
    /// The run hit one of the loop guards rather than a malformed input.
    pub fn is_divergence(&self) -> bool {
        matches!(
            self,
            ExecError::CallLimit { .. } | ExecError::StackExhausted { .. }
        )
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::InvalidBit { node, value } => {
                write!(f, "{node}: bit input must be 0 or 1, got {value}")
            }
            ExecError::CallLimit { node, limit } => {
                write!(f, "{node}: too many calls (limit {limit})")
            }
            ExecError::StackExhausted { depth } => {
                write!(f, "control chain exceeded {depth} steps")
            }
            ExecError::NoControlInput => f.write_str("program has no control input"),
            ExecError::NotExecutable(node) => write!(f, "{node} cannot be executed"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Any engine error, for callers that do not care about the phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Library(LibraryError),
    Instantiate(InstantiateError),
    Pin(PinError),
    Exec(ExecError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Library(err) => err.fmt(f),
            Error::Instantiate(err) => err.fmt(f),
            Error::Pin(err) => err.fmt(f),
            Error::Exec(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Library(err) => Some(err),
            Error::Instantiate(err) => Some(err),
            Error::Pin(err) => Some(err),
            Error::Exec(err) => Some(err),
        }
    }
}

impl From<LibraryError> for Error {
    fn from(err: LibraryError) -> Self {
        Error::Library(err)
    }
}

impl From<InstantiateError> for Error {
    fn from(err: InstantiateError) -> Self {
        Error::Instantiate(err)
    }
}

impl From<PinError> for Error {
    fn from(err: PinError) -> Self {
        Error::Pin(err)
    }
}

impl From<ExecError> for Error {
    fn from(err: ExecError) -> Self {
        Error::Exec(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = LibraryError::DuplicateSpecification("++".into());
        assert_eq!(err.to_string(), "specification `++` already exists in the library");

        let issue = BuildIssue::PinOutOfRange {
            program: Arc::from("max"),
            role: Some("-_001".into()),
            pin: PinKind::DataIn,
            index: 3,
            arity: 2,
        };
        assert_eq!(
            issue.to_string(),
            "max: data input 3 of `-_001` is out of range (arity 2)"
        );
    }

    #[test]
    fn divergence_classification() {
        assert!(ExecError::StackExhausted { depth: 10 }.is_divergence());
        assert!(ExecError::CallLimit { node: InstanceId(0), limit: 20 }.is_divergence());
        assert!(!ExecError::InvalidBit { node: InstanceId(0), value: 3 }.is_divergence());
    }
}
